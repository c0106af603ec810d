//! Minimal HTTP/1.1 framing for the vehicle's web endpoint
//!
//! The vehicle's Wi-Fi module serves a single resource. Only what that
//! exchange needs is supported:
//! - GET requests with `Host` and `Connection: close`
//! - responses with a status line, headers, optional `Content-Length`
//!
//! NOT supported: chunked transfer encoding, keep-alive, redirects.

use core::fmt::Write;
use core::str;

use heapless::String;

/// Maximum encoded request size in bytes
pub const MAX_REQUEST_LEN: usize = 256;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Errors that can occur while framing or parsing HTTP messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Request does not fit in [`MAX_REQUEST_LEN`]
    RequestTooLong,
    /// Response ended before headers or declared body were complete
    Incomplete,
    /// Status line is not `HTTP/1.x <code> ...`
    BadStatusLine,
    /// Header line is malformed
    BadHeader,
    /// Server answered with a non-2xx status
    Status(u16),
    /// Body is not valid UTF-8
    InvalidUtf8,
}

/// Render a GET request for `target` on `host`
pub fn get_request(host: &str, target: &str) -> Result<String<MAX_REQUEST_LEN>, HttpError> {
    let mut request = String::new();
    write!(
        request,
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target, host
    )
    .map_err(|_| HttpError::RequestTooLong)?;
    Ok(request)
}

/// Parse a complete response and return its body text
///
/// `raw` must hold everything the server sent (the connection is closed by
/// the server after one response).
pub fn parse_response(raw: &[u8]) -> Result<&str, HttpError> {
    let header_end = find(raw, HEADER_END).ok_or(HttpError::Incomplete)?;
    let head = str::from_utf8(&raw[..header_end]).map_err(|_| HttpError::BadHeader)?;

    let mut lines = head.split("\r\n");
    let status = parse_status_line(lines.next().unwrap_or(""))?;

    let mut content_length = None;
    for line in lines {
        let (name, value) = line.split_once(':').ok_or(HttpError::BadHeader)?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            let len = value.trim().parse::<usize>().map_err(|_| HttpError::BadHeader)?;
            content_length = Some(len);
        }
    }

    if !(200..300).contains(&status) {
        return Err(HttpError::Status(status));
    }

    let body = &raw[header_end + HEADER_END.len()..];
    let body = match content_length {
        Some(len) => body.get(..len).ok_or(HttpError::Incomplete)?,
        None => body,
    };

    str::from_utf8(body).map_err(|_| HttpError::InvalidUtf8)
}

/// Check whether `raw` already holds a whole response
///
/// True once the headers are complete and, when `Content-Length` is
/// present, the body has arrived. Without `Content-Length` the body runs
/// until the server closes, so this stays false.
pub fn response_complete(raw: &[u8]) -> bool {
    let Some(header_end) = find(raw, HEADER_END) else {
        return false;
    };
    let Ok(head) = str::from_utf8(&raw[..header_end]) else {
        return false;
    };

    let content_length = head
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok());

    match content_length {
        Some(len) => raw.len() - (header_end + HEADER_END.len()) >= len,
        None => false,
    }
}

/// Parse `HTTP/1.x <code> [reason]` and return the status code
fn parse_status_line(line: &str) -> Result<u16, HttpError> {
    let mut parts = line.split_ascii_whitespace();
    let version = parts.next().ok_or(HttpError::BadStatusLine)?;
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::BadStatusLine);
    }
    parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(HttpError::BadStatusLine)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
