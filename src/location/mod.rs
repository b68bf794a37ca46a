use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::error::AppError;
use crate::models::position::GeoPoint;

/// Single-shot access to the platform location capability.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint, AppError>;
}

/// Timeout and bounded-retry policy for position acquisition. The observed
/// system had neither; both are explicit options here. `retries` counts
/// attempts after the first, so the default makes exactly one request.
#[derive(Debug, Clone, Copy)]
pub struct AcquireOptions {
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 0,
            retry_delay: Duration::from_millis(500),
        }
    }
}

pub async fn acquire_position(
    source: &dyn PositionSource,
    options: &AcquireOptions,
) -> Result<GeoPoint, AppError> {
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match timeout(options.timeout, source.current_position()).await {
            Ok(Ok(position)) => return Ok(position),
            Ok(Err(error)) => error,
            Err(_) => AppError::PositionUnavailable("position request timed out".to_string()),
        };

        if attempt > options.retries {
            return Err(error);
        }

        warn!(attempt, error = %error, "position request failed; retrying");
        sleep(options.retry_delay).await;
    }
}

/// Source pinned to configured coordinates, for deployments without a
/// platform location capability.
pub struct FixedPositionSource {
    position: GeoPoint,
}

impl FixedPositionSource {
    pub fn new(position: GeoPoint) -> Self {
        Self { position }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(&self) -> Result<GeoPoint, AppError> {
        Ok(self.position)
    }
}

/// Source for deployments with no location capability at all; every request
/// fails so the session lands in its location-unavailable state.
pub struct UnavailablePositionSource;

#[async_trait]
impl PositionSource for UnavailablePositionSource {
    async fn current_position(&self) -> Result<GeoPoint, AppError> {
        Err(AppError::PositionUnavailable(
            "no position source configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{AcquireOptions, FixedPositionSource, PositionSource, acquire_position};
    use crate::error::AppError;
    use crate::models::position::GeoPoint;

    struct FlakySource {
        failures: u32,
        attempts: AtomicU32,
    }

    #[async_trait]
    impl PositionSource for FlakySource {
        async fn current_position(&self) -> Result<GeoPoint, AppError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.failures {
                Err(AppError::PositionUnavailable("no fix".to_string()))
            } else {
                Ok(GeoPoint {
                    lat: 13.0827,
                    lng: 80.2707,
                })
            }
        }
    }

    struct StuckSource;

    #[async_trait]
    impl PositionSource for StuckSource {
        async fn current_position(&self) -> Result<GeoPoint, AppError> {
            std::future::pending::<()>().await;
            Err(AppError::PositionUnavailable("unreachable".to_string()))
        }
    }

    fn fast_options(retries: u32) -> AcquireOptions {
        AcquireOptions {
            timeout: Duration::from_millis(50),
            retries,
            retry_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn resolves_from_a_fixed_source() {
        let source = FixedPositionSource::new(GeoPoint {
            lat: 13.0827,
            lng: 80.2707,
        });

        let position = acquire_position(&source, &AcquireOptions::default())
            .await
            .unwrap();
        assert!((position.lat - 13.0827).abs() < 1e-12);
    }

    #[tokio::test]
    async fn default_policy_makes_a_single_attempt() {
        let source = FlakySource {
            failures: 1,
            attempts: AtomicU32::new(0),
        };

        let result = acquire_position(&source, &fast_options(0)).await;

        assert!(matches!(result, Err(AppError::PositionUnavailable(_))));
        assert_eq!(source.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_policy_recovers_from_transient_failures() {
        let source = FlakySource {
            failures: 2,
            attempts: AtomicU32::new(0),
        };

        let position = acquire_position(&source, &fast_options(2)).await.unwrap();

        assert!((position.lng - 80.2707).abs() < 1e-12);
        assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let source = FlakySource {
            failures: 10,
            attempts: AtomicU32::new(0),
        };

        let result = acquire_position(&source, &fast_options(2)).await;

        assert!(result.is_err());
        assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stuck_source_times_out_as_position_unavailable() {
        let result = acquire_position(&StuckSource, &fast_options(0)).await;
        assert!(matches!(result, Err(AppError::PositionUnavailable(_))));
    }
}
