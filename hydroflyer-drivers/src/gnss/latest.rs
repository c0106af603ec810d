//! Latest position report from a continuously read GNSS receiver
//!
//! A reader task drives [`NmeaReceiver::publish_next`] in a loop and every
//! GGA/RMC report lands in a [`Watch`]. [`LatestFix`] is the
//! [`LocationProvider`] side: each `locate` waits for a report newer than
//! the one it returned last and hands back only the newest, so a refresh
//! never sees a sentence that a later one has superseded.
//!
//! [`NmeaReceiver::publish_next`]: super::NmeaReceiver::publish_next
//! [`Watch`]: embassy_sync::watch::Watch

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::watch::Receiver;
use hydroflyer_core::traits::{GeoPosition, LocationError, LocationProvider};

/// One GGA/RMC outcome: a fix, or `NoFix`
pub type FixReport = Result<GeoPosition, LocationError>;

/// Location provider backed by the reader task's published reports
pub struct LatestFix<'a, M: RawMutex, const N: usize> {
    reports: Receiver<'a, M, FixReport, N>,
}

impl<'a, M: RawMutex, const N: usize> LatestFix<'a, M, N> {
    pub fn new(reports: Receiver<'a, M, FixReport, N>) -> Self {
        Self { reports }
    }
}

impl<M: RawMutex, const N: usize> LocationProvider for LatestFix<'_, M, N> {
    /// Newest report not yet returned
    ///
    /// Pends until the reader publishes one, so callers race it against a
    /// timeout.
    async fn locate(&mut self) -> Result<GeoPosition, LocationError> {
        self.reports.changed().await
    }
}
