use crate::http::request::{Method, Request};
use std::collections::HashMap;
use std::io::{self, BufRead, Read};
use std::net::IpAddr;
use thiserror::Error;

/// Longest request or header line accepted before giving up on the request.
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Upper bound on the number of header lines read for one request.
pub const MAX_HEADERS: usize = 100;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("connection closed before a request line was received")]
    Empty,
    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),
    #[error("request line has no HTTP version marker")]
    MissingVersion,
    #[error("request line or header line too long")]
    LineTooLong,
    #[error("too many header lines")]
    TooManyHeaders,
    #[error("i/o error while reading request: {0}")]
    Io(#[from] io::Error),
}

/// Reads one request from `reader`.
///
/// Header lines without a colon and cookie pairs without `=` are skipped,
/// as are query parameters without `=`. Only a broken request line or a
/// failing stream aborts the parse.
pub fn read_request<R: BufRead>(reader: &mut R, peer: IpAddr) -> Result<Request, ParseError> {
    let request_line = read_line(reader)?.ok_or(ParseError::Empty)?;
    let (method, target, version) = parse_request_line(&request_line)?;

    let mut headers = HashMap::new();
    let mut cookies = HashMap::new();
    let mut host = None;

    let mut count = 0;
    while let Some(line) = read_line(reader)? {
        if line.is_empty() {
            break;
        }
        count += 1;
        if count > MAX_HEADERS {
            return Err(ParseError::TooManyHeaders);
        }

        let Some((name, value)) = line.split_once(':') else {
            tracing::debug!(line = %line, "skipping header line without colon");
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("cookie") {
            parse_cookies(value, &mut cookies);
        } else if name.eq_ignore_ascii_case("host") {
            host = Some(strip_port(value).to_string());
        }

        headers.insert(name.to_string(), value.to_string());
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    };
    let params = query.as_deref().map(parse_query).unwrap_or_default();

    Ok(Request {
        method: Method::parse(method),
        path,
        query,
        params,
        cookies,
        host,
        version: version.to_string(),
        headers,
        peer,
    })
}

/// Splits `METHOD TARGET HTTP/x.y` into its three parts.
///
/// The target is everything between the first space and the trailing
/// version marker, so it may itself contain spaces.
pub fn parse_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let (method, rest) = line
        .split_once(' ')
        .ok_or_else(|| ParseError::InvalidRequestLine(line.to_string()))?;
    if method.is_empty() {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    }

    let marker = rest.rfind(" HTTP/").ok_or(ParseError::MissingVersion)?;
    let target = rest[..marker].trim();
    let version = rest[marker + 1..].trim();

    if target.is_empty() {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    }

    Ok((method, target, version))
}

/// Decodes `a=1&b=2` into a map. Pairs without `=` are dropped and the
/// last occurrence of a key wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        if !pair.contains('=') {
            continue;
        }
        if let Some((key, value)) = url::form_urlencoded::parse(pair.as_bytes()).next() {
            params.insert(key.into_owned(), value.into_owned());
        }
    }
    params
}

/// Adds every `name=value` pair of a Cookie header value to `cookies`.
pub fn parse_cookies(value: &str, cookies: &mut HashMap<String, String>) {
    for pair in value.split(';') {
        match pair.split_once('=') {
            Some((name, value)) => {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => {
                tracing::debug!(pair = %pair, "skipping cookie without '='");
            }
        }
    }
}

/// Removes a trailing `:port` from a Host header value.
pub fn strip_port(host: &str) -> &str {
    match host.rfind(':') {
        // "[::1]" has colons but no port
        Some(idx) if !host[idx..].contains(']') => &host[..idx],
        _ => host,
    }
}

/// Reads a CRLF or LF terminated line, without the terminator.
///
/// Returns `None` at end of stream.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    let n = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64 + 1)
        .read_until(b'\n', &mut buf)?;

    if n == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if n > MAX_LINE_LEN {
        return Err(ParseError::LineTooLong);
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_line_keeps_query_in_target() {
        let (method, target, version) = parse_request_line("GET /a?b=c HTTP/1.1").unwrap();

        assert_eq!(method, "GET");
        assert_eq!(target, "/a?b=c");
        assert_eq!(version, "HTTP/1.1");
    }

    #[test]
    fn strip_port_variants() {
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("[::1]:80"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
    }
}
