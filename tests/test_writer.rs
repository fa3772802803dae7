use std::time::{Duration, SystemTime};

use webdesk::http::request::{Method, RequestBuilder};
use webdesk::http::response::{Response, ResponseBuilder, StatusCode};
use webdesk::http::writer::{cookie_expiry, serialize_response, ResponseWriter};

// Sun, 09 Sep 2001 01:46:40 GMT
fn fixed_now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000)
}

fn header_names(raw: &str) -> Vec<&str> {
    let head = raw.split("\r\n\r\n").next().unwrap();
    head.lines()
        .skip(1)
        .map(|line| line.split_once(':').unwrap().0)
        .collect()
}

#[test]
fn test_cookie_expiry_format() {
    assert_eq!(cookie_expiry(fixed_now()), "Sun, 09-Sep-2001 01:46:40 GMT");
}

#[test]
fn test_serialize_header_order() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .content_type("text/plain")
        .last_modified(fixed_now())
        .cookie("Username", "alice")
        .cookie("SessionID", "abc")
        .body(b"hi".to_vec())
        .build();

    let bytes = serialize_response(&response, Some("desk.local"), "webdesk/0.1.0", fixed_now());
    let raw = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(
        header_names(&raw),
        vec![
            "Server",
            "Date",
            "Content-Length",
            "Last-Modified",
            "Content-Type",
            "Set-Cookie",
            "Set-Cookie"
        ]
    );
    assert!(raw.contains("Server: webdesk/0.1.0\r\n"));
    assert!(raw.contains("Date: Sun, 09 Sep 2001 01:46:40 GMT\r\n"));
    assert!(raw.contains("Content-Length: 2\r\n"));
    assert!(raw.contains("Content-Type: text/plain\r\n"));
    assert!(raw.ends_with("\r\n\r\nhi"));
}

#[test]
fn test_set_cookie_expires_in_24_hours() {
    let response = Response::redirect("/").cookie("Username", "alice").build();

    let bytes = serialize_response(&response, Some("desk.local"), "webdesk", fixed_now());
    let raw = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(raw.contains(
        "Set-Cookie: Username=alice; expires=Mon, 10-Sep-2001 01:46:40 GMT; path=/; domain=desk.local\r\n"
    ));
}

#[test]
fn test_set_cookie_without_host_has_no_domain() {
    let response = Response::redirect("/").cookie("A", "1").build();

    let bytes = serialize_response(&response, None, "webdesk", fixed_now());
    let raw = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(raw.contains("Set-Cookie: A=1; expires=Mon, 10-Sep-2001 01:46:40 GMT; path=/\r\n"));
}

#[test]
fn test_set_cookie_ignores_host_with_attribute_separators() {
    let response = Response::redirect("/").cookie("A", "1").build();

    for host in ["x; Secure", "a,b", "evil host", ""] {
        let bytes = serialize_response(&response, Some(host), "webdesk", fixed_now());
        let raw = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(
            raw.contains("Set-Cookie: A=1; expires=Mon, 10-Sep-2001 01:46:40 GMT; path=/\r\n"),
            "{host:?}: {raw}"
        );
        assert!(!raw.contains("Secure"));
    }
}

#[test]
fn test_last_modified_omitted_when_unknown() {
    let response = Response::ok("x");

    let bytes = serialize_response(&response, None, "webdesk", fixed_now());
    let raw = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(!raw.contains("Last-Modified"));
}

#[test]
fn test_head_keeps_content_length_but_drops_body() {
    let mut response = Response::ok("hello");
    response.return_body = false;

    let bytes = serialize_response(&response, None, "webdesk", fixed_now());
    let raw = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(raw.contains("Content-Length: 5\r\n"));
    assert!(raw.ends_with("\r\n\r\n"));
}

#[test]
fn test_status_line_for_not_found() {
    let bytes = serialize_response(&Response::not_found(), None, "webdesk", fixed_now());

    assert!(bytes.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
}

#[test]
fn test_writer_writes_to_stream() {
    let writer = ResponseWriter::new("webdesk/test");
    let request = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .host("desk.local")
        .build()
        .unwrap();
    let mut out = Vec::new();

    writer.write(&mut out, &Response::ok("body"), &request).unwrap();

    let raw = String::from_utf8(out).unwrap();
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\nServer: webdesk/test\r\n"));
    assert!(raw.ends_with("\r\n\r\nbody"));
}

#[test]
fn test_unsupported_method_line() {
    let writer = ResponseWriter::new("webdesk");
    let mut out = Vec::new();

    writer
        .write_unsupported_method(&mut out, &Method::POST)
        .unwrap();

    assert_eq!(out, b"HTTP/1.1 405 unsupported method type: POST\r\n".to_vec());
}
