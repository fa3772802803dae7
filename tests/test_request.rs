use std::net::{IpAddr, Ipv4Addr};

use webdesk::http::request::{Method, RequestBuilder};

#[test]
fn test_method_from_str_known_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("HEAD", Method::HEAD),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
    ];

    for (method_str, expected) in methods {
        assert_eq!(Method::from_str(method_str), Some(expected.clone()));
        assert_eq!(expected.as_str(), method_str);
    }
}

#[test]
fn test_method_parse_keeps_unknown_token() {
    assert_eq!(Method::from_str("BREW"), None);
    assert_eq!(Method::parse("BREW"), Method::Other("BREW".to_string()));
    assert_eq!(Method::parse("BREW").as_str(), "BREW");
}

#[test]
fn test_only_get_and_head_supported() {
    assert!(Method::GET.is_supported());
    assert!(Method::HEAD.is_supported());
    assert!(!Method::POST.is_supported());
    assert!(!Method::Other("BREW".to_string()).is_supported());
}

#[test]
fn test_request_builder_defaults() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.query, None);
    assert!(req.params.is_empty());
    assert!(req.cookies.is_empty());
    assert_eq!(req.peer, IpAddr::V4(Ipv4Addr::LOCALHOST));
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}

#[test]
fn test_request_builder_encodes_query() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/folder")
        .param("name", "My Docs")
        .build()
        .unwrap();

    assert_eq!(req.query.as_deref(), Some("name=My+Docs"));
    assert_eq!(req.param("name"), Some("My Docs"));
}

#[test]
fn test_request_header_lookup_ignores_case() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Content-Type", "text/plain")
        .build()
        .unwrap();

    assert_eq!(req.header("content-type"), Some("text/plain"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_cookie_lookup() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .cookie("Username", "alice")
        .build()
        .unwrap();

    assert_eq!(req.cookie("Username"), Some("alice"));
    assert_eq!(req.cookie("SessionID"), None);
}
