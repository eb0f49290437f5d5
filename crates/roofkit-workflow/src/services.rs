//! External collaborator contracts.
//!
//! The workflow never talks to the network itself. Geocoding, aerial imagery,
//! and the remote measurement store are injected behind these traits and the
//! controller only acts on their settled results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roofkit_core::constants::SURFACE_SIZE;
use roofkit_core::{Result, ServiceError};
use roofkit_settings::ServiceSettings;

use crate::snapshot::SavedMeasurementSnapshot;

/// Geocoder answer for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

/// Reference to a fetched aerial image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AerialImage {
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

/// A snapshot as held by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMeasurement {
    pub id: String,
    pub snapshot: SavedMeasurementSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolves free-form addresses to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Fails with `ServiceError::NotFound` when the address has no match.
    async fn resolve_address(&self, address: &str) -> Result<GeocodeResult>;
}

/// Provides the satellite image the user traces on.
#[async_trait]
pub trait AerialImagery: Send + Sync {
    async fn fetch_aerial_image(&self, latitude: f64, longitude: f64, zoom: u8)
        -> Result<AerialImage>;
}

/// Remote structured store of snapshots keyed by property address.
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Exact-address lookup. `Ok(None)` when nothing is stored.
    async fn find_by_address(&self, address: &str) -> Result<Option<SavedMeasurementSnapshot>>;

    /// Inserts or replaces the record for the snapshot's address and
    /// returns its identifier. Repeated calls for one address keep one record.
    async fn upsert(&self, snapshot: &SavedMeasurementSnapshot) -> Result<String>;

    /// All records, most recently updated first.
    async fn list(&self) -> Result<Vec<StoredMeasurement>>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Builds static-map image references without performing any I/O.
#[derive(Debug, Clone)]
pub struct StaticMapImagery {
    api_key: Option<String>,
    image_size: u32,
}

impl StaticMapImagery {
    const BASE_URL: &'static str = "https://maps.googleapis.com/maps/api/staticmap";

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            image_size: SURFACE_SIZE,
        }
    }

    /// Key and image size from the service settings.
    pub fn from_settings(settings: &ServiceSettings) -> Self {
        Self {
            api_key: settings.maps_api_key.clone(),
            image_size: settings.image_size,
        }
    }

    /// The image reference for a location, or `Unavailable` without a key.
    pub fn image_for(&self, latitude: f64, longitude: f64, zoom: u8) -> Result<AerialImage> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ServiceError::Unavailable {
                service: "aerial imagery".to_string(),
            })?;

        let image_url = format!(
            "{}?center={},{}&zoom={}&size={size}x{size}&maptype=satellite&scale=1&key={}",
            Self::BASE_URL,
            latitude,
            longitude,
            zoom,
            key,
            size = self.image_size
        );

        Ok(AerialImage {
            image_url,
            latitude,
            longitude,
            zoom,
        })
    }
}

#[async_trait]
impl AerialImagery for StaticMapImagery {
    async fn fetch_aerial_image(
        &self,
        latitude: f64,
        longitude: f64,
        zoom: u8,
    ) -> Result<AerialImage> {
        self.image_for(latitude, longitude, zoom)
    }
}

/// Remote store stand-in with upsert-by-address semantics.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Vec<StoredMeasurement>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl MeasurementRepository for InMemoryRepository {
    async fn find_by_address(&self, address: &str) -> Result<Option<SavedMeasurementSnapshot>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.snapshot.address == address)
            .map(|r| {
                let mut snapshot = r.snapshot.clone();
                snapshot.id = Some(r.id.clone());
                snapshot
            }))
    }

    async fn upsert(&self, snapshot: &SavedMeasurementSnapshot) -> Result<String> {
        let now = Utc::now();
        let mut records = self.records.write();

        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.snapshot.address == snapshot.address)
        {
            existing.snapshot = snapshot.clone();
            existing.snapshot.id = Some(existing.id.clone());
            existing.updated_at = now;
            return Ok(existing.id.clone());
        }

        let id = Uuid::new_v4().to_string();
        let mut stored = snapshot.clone();
        stored.id = Some(id.clone());
        records.push(StoredMeasurement {
            id: id.clone(),
            snapshot: stored,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<StoredMeasurement>> {
        let mut records = self.records.read().clone();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(ServiceError::not_found(format!("measurement {}", id)).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Coordinates;
    use roofkit_capture::CaptureState;

    fn snapshot(address: &str) -> SavedMeasurementSnapshot {
        SavedMeasurementSnapshot::from_capture(
            address,
            Coordinates::new(1.0, 2.0),
            &CaptureState::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_static_map_url() {
        let imagery = StaticMapImagery::new(Some("KEY".to_string()));
        let image = imagery.image_for(43.5, -79.25, 20).unwrap();
        assert_eq!(
            image.image_url,
            "https://maps.googleapis.com/maps/api/staticmap?center=43.5,-79.25&zoom=20&size=640x640&maptype=satellite&scale=1&key=KEY"
        );
        assert_eq!(image.zoom, 20);
    }

    #[test]
    fn test_static_map_from_settings() {
        let settings = ServiceSettings {
            maps_api_key: Some("CONFIGURED".to_string()),
            ..ServiceSettings::default()
        };
        let image = StaticMapImagery::from_settings(&settings)
            .image_for(1.0, 2.0, settings.zoom)
            .unwrap();
        assert!(image.image_url.ends_with("&key=CONFIGURED"));
        assert!(image.image_url.contains("size=640x640"));

        let unkeyed = StaticMapImagery::from_settings(&ServiceSettings::default());
        assert!(unkeyed.image_for(1.0, 2.0, 20).is_err());
    }

    #[test]
    fn test_static_map_requires_key() {
        let imagery = StaticMapImagery::new(None);
        let err = imagery.image_for(0.0, 0.0, 20).unwrap_err();
        assert!(err.is_service_error());
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_address() {
        let repo = InMemoryRepository::new();
        let first = repo.upsert(&snapshot("1 Main St")).await.unwrap();
        let second = repo.upsert(&snapshot("1 Main St")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.len(), 1);

        let found = repo.find_by_address("1 Main St").await.unwrap().unwrap();
        assert_eq!(found.id.as_deref(), Some(first.as_str()));
        assert!(repo.find_by_address("2 Main St").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let repo = InMemoryRepository::new();
        let a = repo.upsert(&snapshot("A")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.upsert(&snapshot("B")).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].snapshot.address, "B");
        assert_eq!(listed[1].snapshot.address, "A");

        repo.delete(&a).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert!(repo.delete(&a).await.unwrap_err().is_not_found());
    }
}
