use std::path::PathBuf;

use anyhow::{bail, Context};
use roofkit::{init_logging, run_trace, Config, BUILD_DATE, VERSION};
use roofkit_core::{format_area, format_length};

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let Some(arg) = std::env::args().nth(1) else {
        bail!("usage: roofkit <trace.json>");
    };
    if arg == "--version" {
        println!("roofkit {} (built {})", VERSION, BUILD_DATE);
        return Ok(());
    }

    let config = match Config::default_path() {
        Ok(path) => Config::load_or_default(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        Err(e) => {
            tracing::warn!("No config directory, using defaults: {}", e);
            Config::default()
        }
    };
    let system = config.display.measurement_system;

    let report = run_trace(&PathBuf::from(arg), &config)?;

    println!("Vertices:  {}", report.vertex_count);
    println!("Area:      {}", format_area(&report.metrics, system));
    println!(
        "Perimeter: {}",
        format_length(report.metrics.perimeter_ft, report.metrics.perimeter_m, system)
    );
    for (i, line) in report.lines.iter().enumerate() {
        println!(
            "Line {}:    {}",
            i + 1,
            format_length(line.length_ft(), line.length_m(), system)
        );
    }
    println!(
        "Lines:     {}",
        format_length(report.total_line_length_ft, report.total_line_length_m, system)
    );
    if report.skipped > 0 {
        println!("Skipped:   {} off-image clicks", report.skipped);
    }

    if report.estimate.is_empty() {
        println!("\nNo roof area traced; nothing to estimate.");
        return Ok(());
    }

    println!("\nMaterials:");
    for line in &report.estimate.lines {
        println!(
            "  {:>3} {:<8} {:<70} ${:>9.2}",
            line.quantity, line.unit, line.name, line.total_cost
        );
    }
    println!("  Total: ${:.2}", report.estimate.total_cost);
    println!(
        "  With 20% buffer: ${:.2}",
        report.estimate.buffered_total()
    );

    Ok(())
}
