//! Link health counters
//!
//! Every failure the exchange loop absorbs is counted here instead of
//! being dropped, so a consumer can tell a flaky link from a dead one.

use hydroflyer_protocol::FieldFailures;

use super::cycle::LinkError;
use crate::traits::{SensorError, TransportError};

/// Counters for the exchange loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Exchanges attempted
    pub exchanges: u32,
    /// Exchanges whose reply decoded (possibly with field failures)
    pub successes: u32,
    /// Exchanges that produced no payload, timeouts included
    pub transport_failures: u32,
    /// Transport failures that were timeouts
    pub timeouts: u32,
    /// Replies with too few fields
    pub malformed_replies: u32,
    /// Individual fields that kept their previous value
    pub field_failures: u32,
    /// Tilt samples that could not be read
    pub sensor_failures: u32,
    /// Failed exchanges since the last success
    pub consecutive_failures: u32,
    /// Most recent exchange failure
    pub last_error: Option<LinkError>,
    /// Most recent tilt sensor failure
    pub last_sensor_error: Option<SensorError>,
}

impl LinkStats {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            exchanges: 0,
            successes: 0,
            transport_failures: 0,
            timeouts: 0,
            malformed_replies: 0,
            field_failures: 0,
            sensor_failures: 0,
            consecutive_failures: 0,
            last_error: None,
            last_sensor_error: None,
        }
    }

    /// Record the outcome of one exchange
    pub fn record_exchange(&mut self, outcome: &Result<FieldFailures, LinkError>) {
        self.exchanges = self.exchanges.wrapping_add(1);

        match outcome {
            Ok(failures) => {
                self.successes = self.successes.wrapping_add(1);
                self.field_failures = self.field_failures.wrapping_add(failures.count());
                self.consecutive_failures = 0;
            }
            Err(error) => {
                match error {
                    LinkError::Transport(TransportError::Timeout) => {
                        self.transport_failures = self.transport_failures.wrapping_add(1);
                        self.timeouts = self.timeouts.wrapping_add(1);
                    }
                    LinkError::Transport(_) => {
                        self.transport_failures = self.transport_failures.wrapping_add(1);
                    }
                    LinkError::MalformedTelemetry(_) => {
                        self.malformed_replies = self.malformed_replies.wrapping_add(1);
                    }
                }
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_error = Some(*error);
            }
        }
    }

    /// Record a tilt sensor failure
    pub fn record_sensor_failure(&mut self, error: SensorError) {
        self.sensor_failures = self.sensor_failures.wrapping_add(1);
        self.last_sensor_error = Some(error);
    }

    /// Fraction of exchanges that succeeded, in percent
    pub fn success_percent(&self) -> u8 {
        if self.exchanges == 0 {
            return 0;
        }
        ((self.successes as u64 * 100) / self.exchanges as u64) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydroflyer_protocol::{Field, TelemetryError};

    #[test]
    fn test_success_resets_consecutive_failures() {
        let mut stats = LinkStats::new();
        stats.record_exchange(&Err(LinkError::Transport(TransportError::Connect)));
        stats.record_exchange(&Err(LinkError::Transport(TransportError::Timeout)));
        assert_eq!(stats.consecutive_failures, 2);
        assert_eq!(stats.transport_failures, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(
            stats.last_error,
            Some(LinkError::Transport(TransportError::Timeout))
        );

        stats.record_exchange(&Ok(FieldFailures::none()));
        assert_eq!(stats.consecutive_failures, 0);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.exchanges, 3);
        // last_error is history, not current state
        assert!(stats.last_error.is_some());
    }

    #[test]
    fn test_field_failures_accumulate() {
        let mut stats = LinkStats::new();
        let mut failures = FieldFailures::none();
        failures.insert(Field::Latitude);
        failures.insert(Field::Heading);

        stats.record_exchange(&Ok(failures));
        stats.record_exchange(&Ok(failures));
        assert_eq!(stats.field_failures, 4);
        assert_eq!(stats.successes, 2);
    }

    #[test]
    fn test_malformed_is_not_a_transport_failure() {
        let mut stats = LinkStats::new();
        let err = LinkError::MalformedTelemetry(TelemetryError::MalformedTelemetry { fields: 2 });
        stats.record_exchange(&Err(err));
        assert_eq!(stats.malformed_replies, 1);
        assert_eq!(stats.transport_failures, 0);
        assert_eq!(stats.consecutive_failures, 1);
    }

    #[test]
    fn test_success_percent() {
        let mut stats = LinkStats::new();
        assert_eq!(stats.success_percent(), 0);
        stats.record_exchange(&Ok(FieldFailures::none()));
        stats.record_exchange(&Ok(FieldFailures::none()));
        stats.record_exchange(&Ok(FieldFailures::none()));
        stats.record_exchange(&Err(LinkError::Transport(TransportError::Read)));
        assert_eq!(stats.success_percent(), 75);
    }

    #[test]
    fn test_sensor_failures() {
        let mut stats = LinkStats::new();
        stats.record_sensor_failure(SensorError::Bus);
        assert_eq!(stats.sensor_failures, 1);
        assert_eq!(stats.last_sensor_error, Some(SensorError::Bus));
        assert_eq!(stats.exchanges, 0);
    }
}
