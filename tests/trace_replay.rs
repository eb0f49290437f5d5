use std::fs;

use roofkit::{replay, run_trace, Config, Point, Trace};

fn square_trace() -> Trace {
    Trace {
        points: vec![
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            Point::new(200.0, 200.0),
            Point::new(100.0, 200.0),
        ],
        lines: vec![[Point::new(100.0, 150.0), Point::new(200.0, 150.0)]],
    }
}

#[test]
fn test_run_trace_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    fs::write(&path, serde_json::to_string(&square_trace()).unwrap()).unwrap();

    let report = run_trace(&path, &Config::default()).unwrap();
    assert_eq!(report.vertex_count, 4);
    assert!((report.metrics.area_ft2 - 1136.456).abs() < 0.01);
    assert!((report.metrics.perimeter_ft - 134.846).abs() < 0.01);
    assert_eq!(report.lines.len(), 1);
    assert!((report.total_line_length_ft - 33.711).abs() < 0.01);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.estimate.lines.len(), 5);
    assert!(report.estimate.total_cost > 0.0);
}

#[test]
fn test_off_image_clicks_are_skipped() {
    let mut trace = square_trace();
    trace.points.push(Point::new(700.0, 10.0));
    trace.lines.push([Point::new(10.0, 10.0), Point::new(10.0, -5.0)]);

    let report = replay(&trace, &Config::default());
    assert_eq!(report.vertex_count, 4);
    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.skipped, 2);
}

#[test]
fn test_lines_only_trace_has_no_estimate() {
    let trace = Trace {
        points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        lines: vec![[Point::new(0.0, 0.0), Point::new(0.0, 100.0)]],
    };
    let report = replay(&trace, &Config::default());
    assert_eq!(report.metrics.area_ft2, 0.0);
    assert!(report.estimate.is_empty());
    assert!(report.total_line_length_ft > 0.0);
}

#[test]
fn test_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_trace(&dir.path().join("missing.json"), &Config::default()).is_err());

    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();
    let err = run_trace(&path, &Config::default()).unwrap_err();
    assert!(err.to_string().contains("failed to parse trace"));
}

#[test]
fn test_pricing_window_comes_from_config() {
    let mut config = Config::default();
    config.pricing.stale_after_days = 0;
    let report = replay(&square_trace(), &config);
    assert!(report.estimate.total_cost > 0.0);

    let default_report = replay(&square_trace(), &Config::default());
    assert!((report.estimate.total_cost - default_report.estimate.total_cost).abs() < 1e-9);
}
