use std::io::{self, Write};
use std::time::{Duration, SystemTime};

use bytes::{BufMut, Bytes, BytesMut};

use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// How long cookies issued by the server stay valid in the browser.
pub const COOKIE_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Formats a cookie expiry date as `Wdy, DD-Mon-YYYY HH:MM:SS GMT`.
pub fn cookie_expiry(when: SystemTime) -> String {
    // httpdate gives "Wdy, DD Mon YYYY HH:MM:SS GMT"
    let date = httpdate::fmt_http_date(when);
    let parts: Vec<&str> = date.split(' ').collect();
    match parts.as_slice() {
        [weekday, day, month, year, time, zone] => {
            format!("{weekday} {day}-{month}-{year} {time} {zone}")
        }
        _ => date,
    }
}

/// Serializes `resp` in wire format.
///
/// Header order is fixed: Server, Date, Content-Length, Last-Modified,
/// Content-Type, then one Set-Cookie per cookie. The body is left out
/// when `resp.return_body` is false, but Content-Length still describes it.
pub fn serialize_response(
    resp: &Response,
    host: Option<&str>,
    server: &str,
    now: SystemTime,
) -> Bytes {
    let mut buf = BytesMut::with_capacity(256 + resp.body.len());

    buf.put_slice(
        format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            resp.status.as_u16(),
            resp.status.reason_phrase()
        )
        .as_bytes(),
    );
    put_header(&mut buf, "Server", server);
    put_header(&mut buf, "Date", &httpdate::fmt_http_date(now));
    put_header(&mut buf, "Content-Length", &resp.content_length().to_string());
    if let Some(modified) = resp.last_modified {
        put_header(&mut buf, "Last-Modified", &httpdate::fmt_http_date(modified));
    }
    put_header(&mut buf, "Content-Type", &resp.content_type);

    let expires = cookie_expiry(now + COOKIE_LIFETIME);
    for (name, value) in &resp.cookies {
        let mut cookie = format!("{name}={value}; expires={expires}; path=/");
        if let Some(host) = host.filter(|h| is_cookie_domain(h)) {
            cookie.push_str("; domain=");
            cookie.push_str(host);
        }
        put_header(&mut buf, "Set-Cookie", &cookie);
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    if resp.return_body {
        buf.put_slice(&resp.body);
    }

    buf.freeze()
}

/// A Host value that can go into a cookie's domain attribute as is.
fn is_cookie_domain(host: &str) -> bool {
    !host.is_empty() && !host.contains(|c: char| c == ';' || c == ',' || c.is_whitespace())
}

fn put_header(buf: &mut BytesMut, name: &str, value: &str) {
    buf.put_slice(name.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(b"\r\n");
}

/// Writes responses for one server identity.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    server: String,
}

impl ResponseWriter {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Writes `response` for `request` and flushes the stream.
    pub fn write<W: Write>(&self, out: &mut W, response: &Response, request: &Request) -> io::Result<()> {
        let bytes = serialize_response(
            response,
            request.host.as_deref(),
            &self.server,
            SystemTime::now(),
        );
        out.write_all(&bytes)?;
        out.flush()
    }

    /// Writes the single status line sent for methods other than GET and HEAD.
    pub fn write_unsupported_method<W: Write>(&self, out: &mut W, method: &Method) -> io::Result<()> {
        let status = StatusCode::MethodNotAllowed;
        write!(
            out,
            "{} {} unsupported method type: {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            method.as_str()
        )?;
        out.flush()
    }
}
