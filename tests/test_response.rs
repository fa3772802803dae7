use std::time::{Duration, SystemTime};

use webdesk::http::response::{Response, ResponseBuilder, StatusCode, DEFAULT_CONTENT_TYPE};

#[test]
fn test_status_line_parts() {
    let lines: Vec<String> = [StatusCode::Ok, StatusCode::NotFound, StatusCode::MethodNotAllowed]
        .iter()
        .map(|s| format!("{} {}", s.as_u16(), s.reason_phrase()))
        .collect();
    assert_eq!(lines, ["200 OK", "404 Not Found", "405 Method Not Allowed"]);
}

#[test]
fn test_ok_page_defaults() {
    let page = Response::ok("<h1>hi</h1>");

    assert_eq!(page.status, StatusCode::Ok);
    assert_eq!(page.content_type, DEFAULT_CONTENT_TYPE);
    assert_eq!(page.content_length(), 11);
    assert!(page.return_body);
    assert!(page.cookies.is_empty());
    assert!(page.last_modified.is_none());
}

#[test]
fn test_response_builder_with_fields() {
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    let response = ResponseBuilder::new(StatusCode::NotFound)
        .content_type("text/plain")
        .last_modified(modified)
        .cookie("A", "1")
        .cookie("A", "2")
        .build();

    assert_eq!(response.content_type, "text/plain");
    assert_eq!(response.last_modified, Some(modified));
    assert_eq!(response.cookies.len(), 1);
    assert_eq!(response.cookies.get("A").map(String::as_str), Some("2"));
}

#[test]
fn test_response_not_found() {
    let response = Response::not_found();

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.content_type, "text/plain");
    assert_eq!(response.content_length(), "404 Not Found".len());
}

#[test]
fn test_redirect_page_refreshes_to_location() {
    let response = Response::redirect("/").cookie("Username", "alice").build();
    let body = String::from_utf8(response.body).unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert!(body.contains("<meta http-equiv=\"refresh\" content=\"0;url=/\">"));
    assert_eq!(response.cookies.get("Username").map(String::as_str), Some("alice"));
}
