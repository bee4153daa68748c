//! Location acquisition seam.
//!
//! Platform GPS is outside this workspace; callers plug in whatever can
//! produce a coordinate. Dropping the future returned by
//! [`LocationProvider::current_location`] abandons the request.

use std::future::Future;
use std::time::Duration;

use envirosense_core::LocationError;

use crate::types::Coordinate;

pub trait LocationProvider: Send + Sync {
    /// Current position.
    ///
    /// `Ok(None)` means no fix could be obtained; a missing permission is
    /// reported as [`LocationError::PermissionDenied`].
    fn current_location(
        &self,
    ) -> impl Future<Output = Result<Option<Coordinate>, LocationError>> + Send;
}

/// Provider backed by a known coordinate (from config or the command line).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    coordinate: Option<Coordinate>,
}

impl FixedLocationProvider {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<Option<Coordinate>, LocationError> {
        match self.coordinate {
            Some(c) if !c.is_valid() => Err(LocationError::Other(format!(
                "coordinate out of range: {}, {}",
                c.latitude, c.longitude
            ))),
            other => Ok(other),
        }
    }
}

/// Ask `provider` for a fix, giving up after `timeout`.
pub async fn locate_with_timeout<P: LocationProvider>(
    provider: &P,
    timeout: Duration,
) -> Result<Option<Coordinate>, LocationError> {
    match tokio::time::timeout(timeout, provider.current_location()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Location request timed out after {:?}", timeout);
            Err(LocationError::Timeout)
        }
    }
}
