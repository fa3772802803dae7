use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

/// Method token from the request line.
///
/// Only GET and HEAD are served; every other method is answered with the
/// unsupported-method status line and the connection is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    /// Served like GET, with the body left off the wire
    HEAD,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    PATCH,
    /// Any other token found in the request line
    Other(String),
}

impl Method {
    /// Parses a well-known HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use webdesk::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    /// Like [`Method::from_str`], but keeps unknown tokens as [`Method::Other`].
    pub fn parse(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| Method::Other(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Other(s) => s,
        }
    }

    /// Whether the server knows how to answer this method.
    pub fn is_supported(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

/// A parsed HTTP request.
///
/// Immutable once parsed; lives for the duration of one connection.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request path without the query string (e.g. "/login")
    pub path: String,
    /// Raw query string, if the target contained a `?`
    pub query: Option<String>,
    /// Percent-decoded query parameters, last occurrence wins
    pub params: HashMap<String, String>,
    /// Cookies sent by the client, last occurrence wins
    pub cookies: HashMap<String, String>,
    /// Host header value with any `:port` suffix removed
    pub host: Option<String>,
    /// Version token from the request line, e.g. "HTTP/1.1"
    pub version: String,
    /// Every header line that had a colon, last occurrence wins
    pub headers: HashMap<String, String>,
    /// Address of the peer that sent the request
    pub peer: IpAddr,
}

/// Assembles a [`Request`] without going through the parser. Used by
/// tests and by callers that synthesize requests.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    params: HashMap<String, String>,
    cookies: HashMap<String, String>,
    host: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    peer: IpAddr,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            params: HashMap::new(),
            cookies: HashMap::new(),
            host: None,
            version: None,
            headers: HashMap::new(),
            peer: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn peer(mut self, peer: IpAddr) -> Self {
        self.peer = peer;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let query = if self.params.is_empty() {
            None
        } else {
            let mut pairs: Vec<_> = self.params.iter().collect();
            pairs.sort();
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            Some(encoded)
        };

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            query,
            params: self.params,
            cookies: self.cookies,
            host: self.host,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            peer: self.peer,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Retrieves a decoded query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|v| v.as_str())
    }

    /// Retrieves a cookie value sent by the client.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|v| v.as_str())
    }
}
