//! Position refresher

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::{GeoPosition, LocationError, LocationProvider};

/// Position shown before the first fix
pub const DEFAULT_POSITION: GeoPosition = GeoPosition::new(21.201395, 72.788782);

/// The observer's own position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OwnPosition {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// False until the provider has answered at least once
    pub has_fix: bool,
}

impl OwnPosition {
    /// Position before any fix, at `fallback`
    pub const fn initial(fallback: GeoPosition) -> Self {
        Self {
            latitude: fallback.latitude,
            longitude: fallback.longitude,
            has_fix: false,
        }
    }

    /// Position from a fix
    pub const fn fixed(position: GeoPosition) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            has_fix: true,
        }
    }
}

impl Default for OwnPosition {
    fn default() -> Self {
        Self::initial(DEFAULT_POSITION)
    }
}

/// Counters for the position loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionStats {
    pub attempts: u32,
    pub fixes: u32,
    pub failures: u32,
    pub timeouts: u32,
    pub last_error: Option<LocationError>,
}

/// Refreshes [`OwnPosition`] from a [`LocationProvider`]
pub struct PositionRefresher<P, D> {
    provider: P,
    delay: D,
    timeout_ms: u32,
    position: OwnPosition,
    stats: PositionStats,
}

impl<P, D> PositionRefresher<P, D>
where
    P: LocationProvider,
    D: DelayNs,
{
    /// Create a refresher starting at `initial`
    pub fn new(provider: P, delay: D, timeout_ms: u32, initial: OwnPosition) -> Self {
        Self {
            provider,
            delay,
            timeout_ms,
            position: initial,
            stats: PositionStats::default(),
        }
    }

    /// Fetch one position
    ///
    /// On success the stored position is replaced and returned. On failure
    /// it is left unchanged and the error is counted.
    pub async fn refresh(&mut self) -> Result<OwnPosition, LocationError> {
        self.stats.attempts = self.stats.attempts.wrapping_add(1);

        let result = match select(self.provider.locate(), self.delay.delay_ms(self.timeout_ms)).await {
            Either::First(Ok(fix)) if fix.is_valid() => Ok(fix),
            Either::First(Ok(_)) => Err(LocationError::InvalidFix),
            Either::First(Err(e)) => Err(e),
            Either::Second(()) => Err(LocationError::Timeout),
        };

        match result {
            Ok(fix) => {
                self.position = OwnPosition::fixed(fix);
                self.stats.fixes = self.stats.fixes.wrapping_add(1);
                Ok(self.position)
            }
            Err(e) => {
                self.stats.failures = self.stats.failures.wrapping_add(1);
                if e == LocationError::Timeout {
                    self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
                }
                self.stats.last_error = Some(e);
                Err(e)
            }
        }
    }

    /// Current own position
    pub fn position(&self) -> OwnPosition {
        self.position
    }

    /// Position loop counters
    pub fn stats(&self) -> &PositionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::collections::VecDeque;

    enum Answer {
        Fix(GeoPosition),
        Fail(LocationError),
        Hang,
    }

    struct FakeProvider {
        answers: VecDeque<Answer>,
    }

    impl LocationProvider for FakeProvider {
        async fn locate(&mut self) -> Result<GeoPosition, LocationError> {
            match self.answers.pop_front() {
                Some(Answer::Fix(p)) => Ok(p),
                Some(Answer::Fail(e)) => Err(e),
                Some(Answer::Hang) | None => core::future::pending().await,
            }
        }
    }

    struct InstantDelay;

    impl DelayNs for InstantDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn refresher(answers: Vec<Answer>) -> PositionRefresher<FakeProvider, InstantDelay> {
        PositionRefresher::new(
            FakeProvider {
                answers: answers.into(),
            },
            InstantDelay,
            10_000,
            OwnPosition::default(),
        )
    }

    #[test]
    fn test_starts_at_default_without_fix() {
        let r = refresher(vec![]);
        let position = r.position();
        assert_eq!(position.latitude, 21.201395);
        assert_eq!(position.longitude, 72.788782);
        assert!(!position.has_fix);
    }

    #[test]
    fn test_fix_replaces_position() {
        let mut r = refresher(vec![Answer::Fix(GeoPosition::new(48.1173, 11.5167))]);

        let position = block_on(r.refresh()).unwrap();

        assert!(position.has_fix);
        assert_eq!(position.latitude, 48.1173);
        assert_eq!(r.position(), position);
        assert_eq!(r.stats().fixes, 1);
    }

    #[test]
    fn test_failure_leaves_position_unchanged() {
        let mut r = refresher(vec![
            Answer::Fix(GeoPosition::new(48.1173, 11.5167)),
            Answer::Fail(LocationError::NoFix),
        ]);

        let good = block_on(r.refresh()).unwrap();
        assert_eq!(block_on(r.refresh()), Err(LocationError::NoFix));
        assert_eq!(r.position(), good);
        assert_eq!(r.stats().failures, 1);
        assert_eq!(r.stats().last_error, Some(LocationError::NoFix));
    }

    #[test]
    fn test_stalled_provider_times_out() {
        let mut r = refresher(vec![Answer::Hang]);

        assert_eq!(block_on(r.refresh()), Err(LocationError::Timeout));
        assert_eq!(r.position(), OwnPosition::default());
        assert_eq!(r.stats().timeouts, 1);
    }

    #[test]
    fn test_out_of_range_fix_rejected() {
        let mut r = refresher(vec![
            Answer::Fix(GeoPosition::new(91.0, 0.0)),
            Answer::Fix(GeoPosition::new(f64::NAN, 0.0)),
        ]);

        assert_eq!(block_on(r.refresh()), Err(LocationError::InvalidFix));
        assert_eq!(block_on(r.refresh()), Err(LocationError::InvalidFix));
        assert!(!r.position().has_fix);
        assert_eq!(r.stats().attempts, 2);
    }
}
