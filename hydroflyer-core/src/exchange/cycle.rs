//! Single exchange cycle
//!
//! Failure policy (last-known-good):
//! - sensor failure: the previous command's tilt bytes are sent again
//! - transport failure or timeout: telemetry keeps every value, link down
//! - malformed reply: same as a transport failure
//! - corrupt field: that field keeps its value, link stays up
//!
//! No failure ends the loop. Each is returned in the [`CycleReport`] and
//! counted in [`LinkStats`].

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use hydroflyer_protocol::{ControlCommand, FieldFailures, TelemetryError, TelemetryRecord};

use super::stats::LinkStats;
use crate::state::{ManeuverState, ManeuverStateMachine, Transition};
use crate::tilt::TiltEncoder;
use crate::traits::{SensorError, TiltSensor, Transport, TransportError};

/// Default bound on one exchange
pub const DEFAULT_TIMEOUT_MS: u32 = 500;

/// Why an exchange did not update the telemetry record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// No payload was received
    Transport(TransportError),
    /// Payload received but rejected as a whole
    MalformedTelemetry(TelemetryError),
}

impl From<TransportError> for LinkError {
    fn from(e: TransportError) -> Self {
        LinkError::Transport(e)
    }
}

impl From<TelemetryError> for LinkError {
    fn from(e: TelemetryError) -> Self {
        LinkError::MalformedTelemetry(e)
    }
}

/// What happened during one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Command that was sent
    pub command: ControlCommand,
    /// Tilt sensor failure, if the command reused the previous tilt bytes
    pub sensor_error: Option<SensorError>,
    /// Field failures on success, or why the link is down
    pub link: Result<FieldFailures, LinkError>,
    /// Maneuver change caused by this cycle's command
    pub transition: Option<Transition>,
}

impl CycleReport {
    /// True if the reply decoded
    pub fn link_ok(&self) -> bool {
        self.link.is_ok()
    }
}

/// Owns everything the exchange loop writes
///
/// `S` samples tilt, `T` talks to the vehicle and `D` bounds each exchange.
pub struct Exchanger<S, T, D> {
    sensor: S,
    transport: T,
    delay: D,
    encoder: TiltEncoder,
    timeout_ms: u32,
    command: ControlCommand,
    telemetry: TelemetryRecord,
    maneuver: ManeuverStateMachine,
    stats: LinkStats,
}

impl<S, T, D> Exchanger<S, T, D>
where
    S: TiltSensor,
    T: Transport,
    D: DelayNs,
{
    /// Create an exchanger: neutral command, empty telemetry, Stopped
    pub fn new(sensor: S, transport: T, delay: D, timeout_ms: u32) -> Self {
        Self {
            sensor,
            transport,
            delay,
            encoder: TiltEncoder::new(),
            timeout_ms,
            command: ControlCommand::neutral(),
            telemetry: TelemetryRecord::new(),
            maneuver: ManeuverStateMachine::new(),
            stats: LinkStats::new(),
        }
    }

    /// Run one cycle
    pub async fn cycle(&mut self) -> CycleReport {
        // 1. Tilt -> command
        let (command, sensor_error) = match self.sensor.sample().await {
            Ok(sample) => (self.encoder.encode(sample), None),
            Err(e) => {
                self.stats.record_sensor_failure(e);
                let previous = ControlCommand::from_tilt(self.command.tilt_x(), self.command.tilt_y());
                (previous, Some(e))
            }
        };
        self.command = command;

        // 2-4. Exchange under a timeout, decode on top of the last record
        let decoded = match select(
            self.transport.exchange(&command),
            self.delay.delay_ms(self.timeout_ms),
        )
        .await
        {
            Either::First(Ok(payload)) => self.telemetry.decode(payload).map_err(LinkError::from),
            Either::First(Err(e)) => Err(LinkError::Transport(e)),
            Either::Second(()) => Err(LinkError::Transport(TransportError::Timeout)),
        };

        let link = match decoded {
            Ok(decoded) => {
                self.telemetry = decoded.record;
                Ok(decoded.failures)
            }
            Err(e) => {
                self.telemetry = self.telemetry.with_link_lost();
                Err(e)
            }
        };
        self.stats.record_exchange(&link);

        // 5. Command -> maneuver
        let transition = self.maneuver.update(&command);

        CycleReport {
            command,
            sensor_error,
            link,
            transition,
        }
    }

    /// Latest telemetry snapshot
    pub fn telemetry(&self) -> TelemetryRecord {
        self.telemetry
    }

    /// Current maneuver state
    pub fn maneuver(&self) -> ManeuverState {
        self.maneuver.current()
    }

    /// Last command sent
    pub fn command(&self) -> ControlCommand {
        self.command
    }

    /// Link counters
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Exchange timeout in milliseconds
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilt::TiltSample;
    use embassy_futures::block_on;
    use hydroflyer_protocol::Field;
    use std::collections::VecDeque;
    use ManeuverState::*;

    const REPLY: &str = "31|21.201395|72.788782|187|40|600";

    struct FakeSensor {
        samples: VecDeque<Result<TiltSample, SensorError>>,
    }

    impl FakeSensor {
        fn new(samples: &[Result<TiltSample, SensorError>]) -> Self {
            Self {
                samples: samples.iter().copied().collect(),
            }
        }
    }

    impl TiltSensor for FakeSensor {
        async fn sample(&mut self) -> Result<TiltSample, SensorError> {
            self.samples.pop_front().unwrap_or(Ok(TiltSample::new(0.0, 0.0)))
        }
    }

    #[derive(Clone, Copy)]
    enum Reply {
        Body(&'static str),
        Fail(TransportError),
        Hang,
    }

    struct FakeTransport {
        replies: VecDeque<Reply>,
        sent: Vec<ControlCommand>,
    }

    impl FakeTransport {
        fn new(replies: &[Reply]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                sent: Vec::new(),
            }
        }
    }

    impl Transport for FakeTransport {
        async fn exchange(&mut self, command: &ControlCommand) -> Result<&str, TransportError> {
            self.sent.push(*command);
            match self.replies.pop_front() {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Fail(e)) => Err(e),
                Some(Reply::Hang) | None => core::future::pending().await,
            }
        }
    }

    /// Delay that expires immediately: any transport that is not ready on
    /// first poll loses the race
    struct InstantDelay;

    impl DelayNs for InstantDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn exchanger(
        samples: &[Result<TiltSample, SensorError>],
        replies: &[Reply],
    ) -> Exchanger<FakeSensor, FakeTransport, InstantDelay> {
        Exchanger::new(
            FakeSensor::new(samples),
            FakeTransport::new(replies),
            InstantDelay,
            DEFAULT_TIMEOUT_MS,
        )
    }

    #[test]
    fn test_successful_cycle() {
        let mut ex = exchanger(&[Ok(TiltSample::new(0.5, 0.0))], &[Reply::Body(REPLY)]);

        let report = block_on(ex.cycle());

        assert_eq!(report.command.as_bytes(), &[105, 100, 0, 0, 0, 0]);
        assert_eq!(report.link, Ok(FieldFailures::none()));
        assert_eq!(
            report.transition,
            Some(Transition {
                from: Stopped,
                to: Forward
            })
        );

        let telemetry = ex.telemetry();
        assert!(telemetry.link_ok);
        assert_eq!(telemetry.heading, 187);
        assert_eq!(ex.maneuver(), Forward);
        assert_eq!(ex.transport.sent, vec![report.command]);
    }

    #[test]
    fn test_transport_failure_keeps_last_known_good() {
        let mut ex = exchanger(
            &[],
            &[
                Reply::Body(REPLY),
                Reply::Fail(TransportError::Connect),
                Reply::Body("31|21.3|72.9|90|41|601"),
            ],
        );

        block_on(ex.cycle());
        let good = ex.telemetry();

        let report = block_on(ex.cycle());
        assert_eq!(report.link, Err(LinkError::Transport(TransportError::Connect)));
        assert_eq!(ex.telemetry(), good.with_link_lost());

        let report = block_on(ex.cycle());
        assert!(report.link_ok());
        let fresh = ex.telemetry();
        assert!(fresh.link_ok);
        assert_eq!(fresh.latitude, 21.3);
        assert_eq!(fresh.heading, 90);
        assert_eq!(ex.stats().consecutive_failures, 0);
        assert_eq!(ex.stats().transport_failures, 1);
    }

    #[test]
    fn test_stalled_transport_times_out() {
        let mut ex = exchanger(&[], &[Reply::Body(REPLY), Reply::Hang]);

        block_on(ex.cycle());
        let report = block_on(ex.cycle());

        assert_eq!(report.link, Err(LinkError::Transport(TransportError::Timeout)));
        assert!(!ex.telemetry().link_ok);
        assert_eq!(ex.telemetry().heading, 187);
        assert_eq!(ex.stats().timeouts, 1);
    }

    #[test]
    fn test_malformed_reply_drops_link() {
        let mut ex = exchanger(&[], &[Reply::Body(REPLY), Reply::Body("31|21.2")]);

        block_on(ex.cycle());
        let report = block_on(ex.cycle());

        assert_eq!(
            report.link,
            Err(LinkError::MalformedTelemetry(
                TelemetryError::MalformedTelemetry { fields: 2 }
            ))
        );
        let telemetry = ex.telemetry();
        assert!(!telemetry.link_ok);
        assert_eq!(telemetry.latitude, 21.201395);
        assert_eq!(ex.stats().malformed_replies, 1);
    }

    #[test]
    fn test_corrupt_field_keeps_link_up() {
        let mut ex = exchanger(
            &[],
            &[Reply::Body(REPLY), Reply::Body("31|BAD|72.788782|187|40|600")],
        );

        block_on(ex.cycle());
        let report = block_on(ex.cycle());

        let failures = report.link.unwrap();
        assert!(failures.contains(Field::Latitude));
        assert!(ex.telemetry().link_ok);
        assert_eq!(ex.telemetry().latitude, 21.201395);
        assert_eq!(ex.stats().field_failures, 1);
    }

    #[test]
    fn test_sensor_failure_reuses_previous_tilt() {
        let mut ex = exchanger(
            &[Ok(TiltSample::new(1.0, 0.5)), Err(SensorError::Bus)],
            &[Reply::Body(REPLY), Reply::Body(REPLY)],
        );

        let first = block_on(ex.cycle());
        let second = block_on(ex.cycle());

        assert_eq!(second.command, first.command);
        assert_eq!(second.sensor_error, Some(SensorError::Bus));
        assert!(second.link_ok());
        assert_eq!(ex.stats().sensor_failures, 1);
        assert_eq!(ex.stats().exchanges, 2);
    }

    #[test]
    fn test_sensor_failure_on_first_cycle_sends_neutral() {
        let mut ex = exchanger(&[Err(SensorError::NotReady)], &[Reply::Body(REPLY)]);

        let report = block_on(ex.cycle());

        assert_eq!(report.command, ControlCommand::neutral());
        // Neutral forward tilt is inside the dead-band: stays Stopped
        assert_eq!(report.transition, None);
        assert_eq!(ex.maneuver(), Stopped);
    }

    #[test]
    fn test_maneuver_fed_even_when_link_down() {
        let mut ex = exchanger(
            &[Ok(TiltSample::new(1.0, 1.0))],
            &[Reply::Fail(TransportError::Read)],
        );

        let report = block_on(ex.cycle());

        assert!(!report.link_ok());
        assert_eq!(
            report.transition,
            Some(Transition {
                from: Stopped,
                to: Left
            })
        );
    }
}
