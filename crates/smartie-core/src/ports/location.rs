//! Location provider port.
//!
//! Location is optional context for the answer service (store lookups). It is
//! strictly best-effort: callers drop it on any failure.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Port for the device's position.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoPosition, LocationError>;
}

/// A provider that always reports the same position.
///
/// Used when the position is configured up front rather than queried.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoPosition);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<GeoPosition, LocationError> {
        Ok(self.0)
    }
}
