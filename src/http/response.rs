use std::collections::BTreeMap;
use std::time::SystemTime;

/// HTTP status codes used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    NotFound,
    /// Only used for the bare unsupported-method line
    MethodNotAllowed,
}

impl StatusCode {
    /// Numeric code written in the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use webdesk::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// A response built by a handler and consumed once by the writer.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    /// Value of the Content-Type header
    pub content_type: String,
    pub body: Vec<u8>,
    /// Value of the Last-Modified header, if known
    pub last_modified: Option<SystemTime>,
    /// Cookies to set on the client
    pub cookies: BTreeMap<String, String>,
    /// When false the body is not transmitted (HEAD requests)
    pub return_body: bool,
}

/// Fluent construction of a [`Response`]. Content type defaults to
/// [`DEFAULT_CONTENT_TYPE`].
///
/// ```
/// # use webdesk::http::response::{ResponseBuilder, StatusCode};
/// let page = ResponseBuilder::new(StatusCode::Ok)
///     .cookie("SessionID", "abc")
///     .body(b"<p>hi</p>".to_vec())
///     .build();
/// assert_eq!(page.content_type, "text/html");
/// assert_eq!(page.cookies["SessionID"], "abc");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: String,
    body: Vec<u8>,
    last_modified: Option<SystemTime>,
    cookies: BTreeMap<String, String>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: Vec::new(),
            last_modified: None,
            cookies: BTreeMap::new(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn last_modified(mut self, when: SystemTime) -> Self {
        self.last_modified = Some(when);
        self
    }

    /// Adds or replaces a cookie to be set on the client.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Finishes the response; the body is sent unless cleared later for HEAD.
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            content_type: self.content_type,
            body: self.body,
            last_modified: self.last_modified,
            cookies: self.cookies,
            return_body: true,
        }
    }
}

impl Response {
    /// A 200 `text/html` page.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .body(body.into())
            .build()
    }

    /// Creates a bare 404 response, used when even the not-found page
    /// cannot be rendered.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .content_type("text/plain")
            .body(b"404 Not Found".to_vec())
            .build()
    }

    /// Creates a page that sends the browser to `location` as soon as it loads.
    pub fn redirect(location: &str) -> ResponseBuilder {
        let page = format!(
            "<!DOCTYPE html>\r\n\
             <html><head><title>Redirect</title>\r\n\
             <meta http-equiv=\"refresh\" content=\"0;url={location}\">\r\n\
             </head><body></body></html>"
        );
        ResponseBuilder::new(StatusCode::Ok).body(page.into_bytes())
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}
