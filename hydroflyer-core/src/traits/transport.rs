//! Vehicle transport trait

use hydroflyer_protocol::{ControlCommand, EncodeError, HttpError};

/// Errors that prevent a reply from reaching the codec
///
/// Every variant is a transport failure: the exchange produced no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Could not open a connection to the vehicle
    Connect,
    /// Connection dropped while sending the request
    Write,
    /// Connection dropped while reading the reply
    Read,
    /// Reply did not fit the receive buffer
    Overflow,
    /// Request could not be encoded
    Encode(EncodeError),
    /// Reply was not a usable HTTP response
    Http(HttpError),
    /// No reply within the configured bound
    Timeout,
}

impl From<EncodeError> for TransportError {
    fn from(e: EncodeError) -> Self {
        TransportError::Encode(e)
    }
}

impl From<HttpError> for TransportError {
    fn from(e: HttpError) -> Self {
        TransportError::Http(e)
    }
}

/// One request/response exchange with the vehicle
///
/// The returned payload is the raw telemetry text, borrowed from the
/// transport's receive buffer until the next call.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send `command` and wait for the vehicle's reply
    async fn exchange(&mut self, command: &ControlCommand) -> Result<&str, TransportError>;
}
