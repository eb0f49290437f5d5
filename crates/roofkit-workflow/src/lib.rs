//! # RoofKit Workflow
//!
//! Sequences a measuring session (address, aerial view, area capture, line
//! capture and review) and keeps the live measurements, the local snapshot
//! cache, and the remote store consistent.
//!
//! ## Architecture
//!
//! ```text
//! WorkflowController
//!   ├── SessionState (address, location, step, CaptureState, snapshot pointer)
//!   │     └── Effect (PersistSnapshot | DeleteCache)
//!   ├── LocalSnapshotStore (memory or file backed)
//!   └── Geocoder / AerialImagery / MeasurementRepository (async, time-bounded)
//! ```

pub mod controller;
pub mod services;
pub mod session;
pub mod snapshot;
pub mod store;

pub use controller::{Collaborators, SearchOutcome, WorkflowController};
pub use services::{
    AerialImage, AerialImagery, GeocodeResult, Geocoder, InMemoryRepository,
    MeasurementRepository, StaticMapImagery, StoredMeasurement,
};
pub use session::{Effect, SearchTicket, SessionState, WorkflowStep, LOAD_NOTICE};
pub use snapshot::{Coordinates, SavedMeasurementSnapshot};
pub use store::{FileSnapshotStore, LocalSnapshotStore, MemorySnapshotStore};
