//! Session state aggregate.
//!
//! Everything one measuring session knows lives in [`SessionState`]: the
//! address, resolved location, aerial image, capture geometry, workflow step,
//! and the current snapshot pointer. Operations mutate the aggregate and
//! return the side effects the caller must apply to the local cache, which
//! keeps the state transitions testable without any storage.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use roofkit_capture::{
    CaptureMode, CaptureState, ClickOutcome, DrawingSurface, PointerEvent, RenderedRect,
};
use roofkit_core::constants::MIN_POLYGON_VERTICES;
use roofkit_core::{Point, ValidationError};

use crate::services::{AerialImage, GeocodeResult};
use crate::snapshot::{Coordinates, SavedMeasurementSnapshot};

/// Message shown after a stored snapshot was materialised.
pub const LOAD_NOTICE: &str = "Previous measurements loaded for this address!";

/// Ordered workflow stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Address = 1,
    AerialView = 2,
    Measure = 3,
    Review = 4,
}

impl WorkflowStep {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowStep::Address => "Enter Address",
            WorkflowStep::AerialView => "Get Aerial View",
            WorkflowStep::Measure => "Measure Roof Area",
            WorkflowStep::Review => "Measure Cappings",
        };
        write!(f, "{}", label)
    }
}

/// Side effect requested by a session operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Overwrite the local cache entry with this snapshot
    PersistSnapshot(SavedMeasurementSnapshot),
    /// Remove the local cache entry
    DeleteCache,
}

/// Identifies one address search. Results for an older ticket are stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    address: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// One measuring session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    address: String,
    location: Option<GeocodeResult>,
    aerial_image: Option<AerialImage>,
    step: WorkflowStep,
    capture: CaptureState,
    surface: DrawingSurface,
    current_snapshot: Option<SavedMeasurementSnapshot>,
    search_generation: u64,
    loading: bool,
    error: Option<String>,
    load_notice: Option<String>,
    save_notice: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn location(&self) -> Option<&GeocodeResult> {
        self.location.as_ref()
    }

    pub fn aerial_image(&self) -> Option<&AerialImage> {
        self.aerial_image.as_ref()
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn mode(&self) -> CaptureMode {
        self.capture.mode()
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn current_snapshot(&self) -> Option<&SavedMeasurementSnapshot> {
        self.current_snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn load_notice(&self) -> Option<&str> {
        self.load_notice.as_deref()
    }

    pub fn save_notice(&self) -> Option<&str> {
        self.save_notice.as_deref()
    }

    /// Steps only move forward here; backward moves are explicit.
    fn advance_to(&mut self, step: WorkflowStep) {
        self.step = self.step.max(step);
    }

    /// Full session reset. Clears the address too.
    pub fn clear_all(&mut self) -> Vec<Effect> {
        let generation = self.search_generation;
        let surface = self.surface.clone();
        *self = Self::default();
        self.search_generation = generation;
        self.surface = surface;
        vec![Effect::DeleteCache]
    }

    /// Starts a new address search.
    ///
    /// Everything from the previous search is discarded before the ticket is
    /// handed out, so nothing stale can leak into the new result.
    pub fn begin_search(&mut self) -> Result<(SearchTicket, Vec<Effect>), ValidationError> {
        let address = self.address.trim().to_string();
        if address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }

        let effects = self.clear_all();
        self.address = address.clone();
        self.loading = true;
        self.search_generation += 1;

        Ok((
            SearchTicket {
                generation: self.search_generation,
                address,
            },
            effects,
        ))
    }

    /// True while `ticket` belongs to the most recent search.
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.search_generation
    }

    pub fn apply_location(&mut self, location: GeocodeResult) -> Vec<Effect> {
        self.location = Some(location);
        self.sync()
    }

    /// Loads a stored snapshot straight into the live state.
    ///
    /// Records stored without an outline keep their stored area and
    /// perimeter as the live metrics.
    pub fn materialize_snapshot(&mut self, snapshot: SavedMeasurementSnapshot) -> Vec<Effect> {
        self.capture
            .restore_measured(snapshot.points.clone(), &snapshot.lines, snapshot.metrics);
        self.capture.set_mode(if snapshot.has_lines() {
            CaptureMode::Lines
        } else {
            CaptureMode::Area
        });
        self.advance_to(WorkflowStep::Measure);
        self.current_snapshot = Some(snapshot);
        self.load_notice = Some(LOAD_NOTICE.to_string());
        self.save_notice = None;
        self.error = None;
        self.sync()
    }

    /// No stored snapshot: the user starts drawing on the aerial view.
    pub fn mark_not_found(&mut self) {
        self.advance_to(WorkflowStep::AerialView);
    }

    pub fn apply_aerial_image(&mut self, image: AerialImage) {
        self.aerial_image = Some(image);
    }

    pub fn finish_search(&mut self) {
        self.loading = false;
    }

    /// Records a failed operation. The session stays usable.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    pub fn toggle_drawing(&mut self) -> bool {
        self.capture.toggle_drawing()
    }

    pub fn set_drawing_enabled(&mut self, enabled: bool) {
        self.capture.set_drawing_enabled(enabled);
    }

    pub fn set_rendered_rect(&mut self, rect: RenderedRect) {
        self.surface.set_rendered_rect(rect);
    }

    /// Applies a raw pointer click on the drawing surface.
    pub fn click(&mut self, event: &PointerEvent) -> (ClickOutcome, Vec<Effect>) {
        let outcome = self.capture.click(&self.surface, event);
        let effects = self.after_click(&outcome);
        (outcome, effects)
    }

    /// Applies an already-mapped surface point.
    pub fn apply_point(&mut self, point: Point) -> (ClickOutcome, Vec<Effect>) {
        let outcome = self.capture.apply_point(point);
        let effects = self.after_click(&outcome);
        (outcome, effects)
    }

    fn after_click(&mut self, outcome: &ClickOutcome) -> Vec<Effect> {
        match outcome {
            ClickOutcome::Ignored(_) | ClickOutcome::SegmentStarted(_) => Vec::new(),
            ClickOutcome::VertexAdded { count } => {
                if *count >= MIN_POLYGON_VERTICES {
                    self.advance_to(WorkflowStep::Measure);
                }
                self.sync()
            }
            ClickOutcome::SegmentCompleted(_) => self.sync(),
        }
    }

    pub fn clear_drawing(&mut self) -> Vec<Effect> {
        self.capture.clear_drawing();
        self.sync()
    }

    pub fn clear_lines(&mut self) -> Vec<Effect> {
        self.capture.clear_lines();
        self.sync()
    }

    /// Area capture to line capture. Lines always start empty.
    pub fn go_to_next_step(&mut self) -> Vec<Effect> {
        if !self.capture.go_to_next_mode() {
            return Vec::new();
        }
        self.advance_to(WorkflowStep::Review);
        self.sync()
    }

    /// Line capture back to area capture. Existing lines are discarded.
    pub fn go_to_previous_step(&mut self) -> Vec<Effect> {
        if !self.capture.go_to_previous_mode() {
            return Vec::new();
        }
        if self.step > WorkflowStep::Measure {
            self.step = WorkflowStep::Measure;
        }
        self.sync()
    }

    /// Restores geometry from a cached snapshot without taking it as current.
    pub fn restore_geometry(&mut self, snapshot: &SavedMeasurementSnapshot) {
        let points = if snapshot.metrics.has_area() {
            snapshot.points.clone()
        } else {
            Vec::new()
        };
        self.capture
            .restore_measured(points, &snapshot.lines, snapshot.metrics);
    }

    /// Restores a cached snapshot in full, including the current pointer and
    /// the location it was measured at.
    pub fn restore_snapshot(&mut self, snapshot: SavedMeasurementSnapshot) {
        self.capture
            .restore_measured(snapshot.points.clone(), &snapshot.lines, snapshot.metrics);
        if self.address.trim().is_empty() {
            self.address = snapshot.address.clone();
        }
        self.location = Some(GeocodeResult {
            latitude: snapshot.coordinates.lat,
            longitude: snapshot.coordinates.lng,
            formatted_address: snapshot.address.clone(),
        });
        if snapshot.has_measurements() {
            self.advance_to(WorkflowStep::Measure);
            if snapshot.has_lines() {
                self.capture.set_mode(CaptureMode::Lines);
            }
        }
        self.current_snapshot = Some(snapshot);
    }

    /// Materialises the live state, if there is anything worth keeping.
    pub fn snapshot(&self) -> Option<SavedMeasurementSnapshot> {
        let location = self.location.as_ref()?;
        if !self.capture.has_measurements() {
            return None;
        }
        let mut snapshot = SavedMeasurementSnapshot::from_capture(
            location.formatted_address.clone(),
            Coordinates::new(location.latitude, location.longitude),
            &self.capture,
            Utc::now(),
        );
        snapshot.id = self
            .current_snapshot
            .as_ref()
            .filter(|s| s.address == snapshot.address)
            .and_then(|s| s.id.clone());
        Some(snapshot)
    }

    /// Mirrors the live state into the current snapshot and the cache.
    ///
    /// Once nothing measurable is left the pointer is dropped, so a save
    /// cannot resend geometry the user has cleared. The cache entry stays
    /// until the next reset or search.
    fn sync(&mut self) -> Vec<Effect> {
        match self.snapshot() {
            Some(snapshot) => {
                self.current_snapshot = Some(snapshot.clone());
                vec![Effect::PersistSnapshot(snapshot)]
            }
            None => {
                self.current_snapshot = None;
                Vec::new()
            }
        }
    }

    pub fn record_saved(&mut self, id: &str) {
        if let Some(snapshot) = self.current_snapshot.as_mut() {
            snapshot.id = Some(id.to_string());
        }
        self.save_notice = Some(format!("Measurements saved successfully! ID: {}", id));
        self.load_notice = None;
        self.error = None;
    }

    pub fn record_save_failed(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.save_notice = None;
        self.load_notice = None;
    }
}
