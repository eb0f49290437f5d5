//! Workflow/persistence controller.
//!
//! Owns the [`SessionState`] and the injected collaborators, applies the
//! effects session operations return, and bounds every external call with the
//! configured timeout.
//!
//! An address search is split into three phases so a caller can run several
//! concurrently and still have the most recent one win:
//!
//! 1. [`WorkflowController::begin_search`] invalidates the session and hands
//!    out a [`SearchTicket`]
//! 2. [`WorkflowController::resolve_search`] talks to the collaborators and
//!    never touches session state
//! 3. [`WorkflowController::complete_search`] applies the outcome, unless a
//!    newer search has started in the meantime
//!
//! [`WorkflowController::submit_address`] runs all three in sequence.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use roofkit_capture::{ClickOutcome, PointerEvent, RenderedRect};
use roofkit_core::{Point, Result, ServiceError, ValidationError};
use roofkit_settings::{Config, ServiceSettings};

use crate::services::{
    AerialImage, AerialImagery, GeocodeResult, Geocoder, MeasurementRepository, StaticMapImagery,
    StoredMeasurement,
};
use crate::session::{Effect, SearchTicket, SessionState};
use crate::snapshot::SavedMeasurementSnapshot;
use crate::store::{FileSnapshotStore, LocalSnapshotStore, MemorySnapshotStore};

const GEOCODER: &str = "geocoder";
const IMAGERY: &str = "aerial imagery";
const STORE: &str = "measurement store";

/// The injected external capabilities.
#[derive(Clone)]
pub struct Collaborators {
    pub geocoder: Arc<dyn Geocoder>,
    pub imagery: Arc<dyn AerialImagery>,
    pub repository: Arc<dyn MeasurementRepository>,
    pub cache: Arc<dyn LocalSnapshotStore>,
}

impl Collaborators {
    /// Uses an in-process cache; swap it with [`Collaborators::with_cache`].
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        imagery: Arc<dyn AerialImagery>,
        repository: Arc<dyn MeasurementRepository>,
    ) -> Self {
        Self {
            geocoder,
            imagery,
            repository,
            cache: Arc::new(MemorySnapshotStore::new()),
        }
    }

    /// Static-map imagery and a file cache, both taken from `config`.
    pub fn from_config(
        geocoder: Arc<dyn Geocoder>,
        repository: Arc<dyn MeasurementRepository>,
        config: &Config,
    ) -> Self {
        Self {
            geocoder,
            imagery: Arc::new(StaticMapImagery::from_settings(&config.services)),
            repository,
            cache: Arc::new(FileSnapshotStore::from_settings(&config.storage)),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn LocalSnapshotStore>) -> Self {
        self.cache = cache;
        self
    }
}

/// Settled collaborator results of one search.
#[derive(Debug)]
pub struct SearchOutcome {
    pub location: GeocodeResult,
    /// First stored snapshot found, if any
    pub snapshot: Option<SavedMeasurementSnapshot>,
    pub image: Result<AerialImage>,
}

/// Drives one measuring session.
pub struct WorkflowController {
    session: SessionState,
    collaborators: Collaborators,
    services: ServiceSettings,
    cache_key: String,
}

impl WorkflowController {
    /// Creates the controller and restores cached geometry.
    ///
    /// Only vertices and lines come back from the cache; the snapshot pointer
    /// stays empty until a search or [`WorkflowController::reload_from_cache`].
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        let mut controller = Self {
            session: SessionState::new(),
            collaborators,
            services: config.services.clone(),
            cache_key: config.storage.cache_key.clone(),
        };

        match controller.read_cache() {
            Ok(Some(snapshot)) => {
                tracing::info!("Restoring cached geometry for {}", snapshot.address);
                controller.session.restore_geometry(&snapshot);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable measurement cache: {}", e),
        }

        controller
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.session.set_address(address);
    }

    pub fn toggle_drawing(&mut self) -> bool {
        self.session.toggle_drawing()
    }

    pub fn set_rendered_rect(&mut self, rect: RenderedRect) {
        self.session.set_rendered_rect(rect);
    }

    fn read_cache(&self) -> Result<Option<SavedMeasurementSnapshot>> {
        match self.collaborators.cache.get(&self.cache_key)? {
            Some(json) => Ok(Some(SavedMeasurementSnapshot::from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn apply_effects(&self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::PersistSnapshot(snapshot) => {
                    let json = snapshot.to_json()?;
                    self.collaborators.cache.set(&self.cache_key, &json)?;
                    tracing::debug!("Cached snapshot for {}", snapshot.address);
                }
                Effect::DeleteCache => {
                    self.collaborators.cache.delete(&self.cache_key)?;
                    tracing::debug!("Deleted cached snapshot");
                }
            }
        }
        Ok(())
    }

    /// Invalidates the session for the current address and starts a search.
    pub fn begin_search(&mut self) -> Result<SearchTicket> {
        let (ticket, effects) = self.session.begin_search()?;
        tracing::info!(
            "Search #{} started for '{}'",
            ticket.generation(),
            ticket.address()
        );
        if let Err(e) = self.apply_effects(effects) {
            // A stale cache entry could resurface on the next start
            tracing::error!("Could not clear cached measurements: {}", e);
            self.session.fail(e.to_string());
            return Err(e);
        }
        Ok(ticket)
    }

    /// Queries the collaborators for a ticket. Does not touch the session.
    pub async fn resolve_search(&self, ticket: &SearchTicket) -> Result<SearchOutcome> {
        let location = bounded(
            GEOCODER,
            self.services.geocode_timeout(),
            self.collaborators.geocoder.resolve_address(ticket.address()),
        )
        .await?;
        tracing::info!(
            "Geocoded '{}' to {:.6}, {:.6}",
            location.formatted_address,
            location.latitude,
            location.longitude
        );

        let snapshot = self
            .lookup_snapshot(ticket.address(), &location.formatted_address)
            .await;

        let image = bounded(
            IMAGERY,
            self.services.imagery_timeout(),
            self.collaborators.imagery.fetch_aerial_image(
                location.latitude,
                location.longitude,
                self.services.zoom,
            ),
        )
        .await;

        Ok(SearchOutcome {
            location,
            snapshot,
            image,
        })
    }

    /// Literal address first, then the geocoder's formatted address.
    async fn lookup_snapshot(
        &self,
        address: &str,
        formatted: &str,
    ) -> Option<SavedMeasurementSnapshot> {
        if let Some(found) = self.find_snapshot(address).await {
            return Some(found);
        }
        if self.services.skip_duplicate_lookup && formatted.trim() == address.trim() {
            tracing::debug!("Formatted address matches input, skipping second lookup");
            return None;
        }
        self.find_snapshot(formatted).await
    }

    async fn find_snapshot(&self, address: &str) -> Option<SavedMeasurementSnapshot> {
        let lookup = bounded(
            STORE,
            self.services.store_timeout(),
            self.collaborators.repository.find_by_address(address),
        )
        .await;
        match lookup {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Snapshot lookup for '{}' failed: {}", address, e);
                None
            }
        }
    }

    /// Applies a settled search. Returns false when the ticket was superseded.
    ///
    /// Failures end up in the session error. A cache write failure is only
    /// logged: the location, snapshot and image still land.
    pub fn complete_search(&mut self, ticket: &SearchTicket, outcome: Result<SearchOutcome>) -> bool {
        if !self.session.is_current(ticket) {
            tracing::warn!(
                "Discarding result of superseded search #{} for '{}'",
                ticket.generation(),
                ticket.address()
            );
            return false;
        }

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Search for '{}' failed: {}", ticket.address(), e);
                self.session.fail(e.to_string());
                return true;
            }
        };

        let mut effects = self.session.apply_location(outcome.location);
        let found = outcome.snapshot.is_some();
        if let Some(snapshot) = outcome.snapshot {
            tracing::info!("Loaded stored measurements for {}", snapshot.address);
            effects.extend(self.session.materialize_snapshot(snapshot));
        }
        if let Err(e) = self.apply_effects(effects) {
            tracing::warn!("Could not cache measurements for '{}': {}", ticket.address(), e);
        }

        match outcome.image {
            Ok(image) => {
                self.session.apply_aerial_image(image);
                if !found {
                    self.session.mark_not_found();
                }
                self.session.finish_search();
            }
            Err(e) => {
                tracing::error!("Aerial image for '{}' failed: {}", ticket.address(), e);
                self.session.fail(e.to_string());
            }
        }

        true
    }

    /// Sets the address and runs a whole search.
    ///
    /// Geocoding failures are returned. An aerial image failure only lands in
    /// the session error because the location and any stored measurements
    /// have already been applied.
    pub async fn submit_address(&mut self, address: impl Into<String>) -> Result<()> {
        self.session.set_address(address);
        let ticket = self.begin_search()?;
        match self.resolve_search(&ticket).await {
            Ok(outcome) => {
                self.complete_search(&ticket, Ok(outcome));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Search for '{}' failed: {}", ticket.address(), e);
                self.session.fail(e.to_string());
                Err(e)
            }
        }
    }

    pub fn click(&mut self, event: &PointerEvent) -> Result<ClickOutcome> {
        let (outcome, effects) = self.session.click(event);
        self.apply_effects(effects)?;
        Ok(outcome)
    }

    pub fn apply_point(&mut self, point: Point) -> Result<ClickOutcome> {
        let (outcome, effects) = self.session.apply_point(point);
        self.apply_effects(effects)?;
        Ok(outcome)
    }

    pub fn clear_drawing(&mut self) -> Result<()> {
        let effects = self.session.clear_drawing();
        self.apply_effects(effects)
    }

    pub fn clear_lines(&mut self) -> Result<()> {
        let effects = self.session.clear_lines();
        self.apply_effects(effects)
    }

    pub fn go_to_next_step(&mut self) -> Result<()> {
        let effects = self.session.go_to_next_step();
        self.apply_effects(effects)
    }

    pub fn go_to_previous_step(&mut self) -> Result<()> {
        let effects = self.session.go_to_previous_step();
        self.apply_effects(effects)
    }

    /// Full session reset, including the cache entry.
    pub fn clear_all_measurements(&mut self) -> Result<()> {
        tracing::info!("Clearing all measurements");
        let effects = self.session.clear_all();
        self.apply_effects(effects)
    }

    /// Restores the cached snapshot in full. Returns false when nothing is cached.
    pub fn reload_from_cache(&mut self) -> Result<bool> {
        match self.read_cache()? {
            Some(snapshot) => {
                tracing::info!("Reloaded cached measurements for {}", snapshot.address);
                self.session.restore_snapshot(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Upserts the current snapshot into the remote store. Never retried.
    pub async fn save(&mut self) -> Result<String> {
        let snapshot = match self.session.current_snapshot() {
            Some(snapshot) if snapshot.has_measurements() => snapshot.clone(),
            _ if self.session.location().is_none() => {
                return Err(ValidationError::MissingCoordinates.into())
            }
            _ => return Err(ValidationError::EmptyMeasurement.into()),
        };

        let result = bounded(
            STORE,
            self.services.store_timeout(),
            self.collaborators.repository.upsert(&snapshot),
        )
        .await;

        match result {
            Ok(id) => {
                tracing::info!("Saved measurements for {} as {}", snapshot.address, id);
                self.session.record_saved(&id);
                if let Some(current) = self.session.current_snapshot().cloned() {
                    self.apply_effects(vec![Effect::PersistSnapshot(current)])?;
                }
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Saving measurements for {} failed: {}", snapshot.address, e);
                self.session.record_save_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Stored records, most recently updated first.
    pub async fn saved_measurements(&self) -> Result<Vec<StoredMeasurement>> {
        bounded(
            STORE,
            self.services.store_timeout(),
            self.collaborators.repository.list(),
        )
        .await
    }

    pub async fn delete_saved(&self, id: &str) -> Result<()> {
        bounded(
            STORE,
            self.services.store_timeout(),
            self.collaborators.repository.delete(id),
        )
        .await
    }
}

/// Runs a collaborator call under a deadline.
async fn bounded<T, F>(service: &str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} did not answer within {:?}", service, limit);
            Err(ServiceError::timeout(service, limit.as_millis() as u64).into())
        }
    }
}
