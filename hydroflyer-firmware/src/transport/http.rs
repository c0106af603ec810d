//! HTTP/1.1 transport over embassy-net
//!
//! One TCP connection per exchange: connect, send the GET, read until the
//! response is complete or the vehicle closes, then drop the socket. The
//! vehicle's Wi-Fi module does not keep connections alive between polls.

use defmt::*;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, IpEndpoint, Stack};
use embassy_time::Duration;
use embedded_io_async::Write;

use hydroflyer_core::config::VehicleConfig;
use hydroflyer_core::traits::{Transport, TransportError};
use hydroflyer_protocol::http::{get_request, parse_response, response_complete};
use hydroflyer_protocol::ControlCommand;

/// Socket receive buffer
const RX_BUFFER_LEN: usize = 1024;

/// Socket transmit buffer
const TX_BUFFER_LEN: usize = 512;

/// Largest response kept for parsing (headers + telemetry line)
const MAX_RESPONSE_LEN: usize = 512;

/// Socket-level inactivity timeout, a backstop for the exchange timeout
const SOCKET_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP transport to the vehicle
pub struct HttpTransport<'a> {
    stack: Stack<'a>,
    endpoint: IpEndpoint,
    config: &'a VehicleConfig,
    rx_buffer: [u8; RX_BUFFER_LEN],
    tx_buffer: [u8; TX_BUFFER_LEN],
    response: [u8; MAX_RESPONSE_LEN],
}

impl<'a> HttpTransport<'a> {
    /// Create a transport for the configured vehicle
    ///
    /// Returns `None` if the configured host is not an IPv4 address.
    pub fn new(stack: Stack<'a>, config: &'a VehicleConfig) -> Option<Self> {
        let address = config.address()?;
        Some(Self {
            stack,
            endpoint: IpEndpoint::new(IpAddress::Ipv4(address), config.port),
            config,
            rx_buffer: [0; RX_BUFFER_LEN],
            tx_buffer: [0; TX_BUFFER_LEN],
            response: [0; MAX_RESPONSE_LEN],
        })
    }
}

impl Transport for HttpTransport<'_> {
    async fn exchange(&mut self, command: &ControlCommand) -> Result<&str, TransportError> {
        let target = command.request_target(self.config.path.as_str())?;
        let request = get_request(self.config.host.as_str(), target.as_str())?;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        socket.connect(self.endpoint).await.map_err(|e| {
            debug!("connect failed: {:?}", e);
            TransportError::Connect
        })?;

        socket
            .write_all(request.as_bytes())
            .await
            .map_err(|_| TransportError::Write)?;
        socket.flush().await.map_err(|_| TransportError::Write)?;

        let mut len = 0;
        loop {
            if len == self.response.len() {
                socket.abort();
                return Err(TransportError::Overflow);
            }
            let n = socket
                .read(&mut self.response[len..])
                .await
                .map_err(|_| TransportError::Read)?;
            if n == 0 {
                break;
            }
            len += n;
            if response_complete(&self.response[..len]) {
                break;
            }
        }
        socket.close();
        drop(socket);

        trace!("received {} bytes", len);
        Ok(parse_response(&self.response[..len])?)
    }
}
