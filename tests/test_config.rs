use std::collections::HashMap;
use std::path::PathBuf;

use webdesk::config::{Config, DEFAULT_LISTEN_ADDR};
use webdesk::handlers::MAX_FILE_SIZE;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.server.listen_addr, DEFAULT_LISTEN_ADDR);
    assert_eq!(cfg.server.max_workers, 3);
    assert_eq!(cfg.server.read_timeout_secs, 20);
    assert_eq!(cfg.auth.username, None);
    assert_eq!(cfg.auth.password, None);
    assert_eq!(cfg.static_files.root, None);
    assert_eq!(cfg.static_files.max_file_size, MAX_FILE_SIZE);
}

#[test]
fn test_config_from_partial_yaml() {
    let yaml = r#"
server:
  listen_addr: "0.0.0.0:9000"
  max_workers: 5
auth:
  username: bob
static_files:
  root: /srv/www
"#;
    let cfg = Config::from_yaml(yaml).unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:9000");
    assert_eq!(cfg.server.max_workers, 5);
    // unset keys keep their defaults
    assert_eq!(cfg.server.read_timeout_secs, 20);
    assert_eq!(cfg.auth.username.as_deref(), Some("bob"));
    assert_eq!(cfg.auth.password, None);
    assert_eq!(cfg.static_files.root, Some(PathBuf::from("/srv/www")));
    assert_eq!(cfg.static_files.max_file_size, MAX_FILE_SIZE);
}

#[test]
fn test_config_rejects_bad_yaml() {
    assert!(Config::from_yaml("server:\n  max_workers: lots\n").is_err());
}

#[test]
fn test_config_env_overrides() {
    let mut cfg = Config::from_yaml("server:\n  listen_addr: \"127.0.0.1:1\"\n").unwrap();
    cfg.apply_overrides(env(&[
        ("LISTEN", "0.0.0.0:3000"),
        ("WEBDESK_USERNAME", "carol"),
        ("WEBDESK_PASSWORD", "hunter2"),
        ("WEBDESK_STATIC_ROOT", "/tmp/site"),
    ]));

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.auth.username.as_deref(), Some("carol"));
    assert_eq!(cfg.auth.password.as_deref(), Some("hunter2"));
    assert_eq!(cfg.static_files.root, Some(PathBuf::from("/tmp/site")));
}

#[test]
fn test_config_no_overrides_keeps_values() {
    let mut cfg = Config::default();
    cfg.apply_overrides(env(&[]));
    assert_eq!(cfg.server.listen_addr, DEFAULT_LISTEN_ADDR);
}

#[test]
fn test_server_ident() {
    let mut cfg = Config::default();
    assert_eq!(cfg.server_ident(), format!("webdesk/{}", env!("CARGO_PKG_VERSION")));

    cfg.server.server_name = "desk".to_string();
    assert!(cfg.server_ident().starts_with("desk/"));
}

#[test]
fn test_configured_credentials_are_used() {
    let mut cfg = Config::default();
    cfg.auth.username = Some("alice".to_string());
    cfg.auth.password = Some("s3cret".to_string());

    let creds = cfg.auth.credentials();
    assert_eq!(creds.username, "alice");
    assert_eq!(creds.password, "s3cret");
}

#[test]
fn test_missing_credentials_are_generated() {
    let cfg = Config::default();

    let creds = cfg.auth.credentials();
    assert!(creds.username.starts_with("user-"));
    assert_eq!(creds.username.len(), "user-".len() + 6);
    assert_eq!(creds.password.len(), 12);
    assert!(creds.password.chars().all(|c| c.is_ascii_alphanumeric()));

    let again = cfg.auth.credentials();
    assert_ne!(creds.password, again.password);
}

#[test]
fn test_blank_username_is_replaced() {
    let mut cfg = Config::default();
    cfg.auth.username = Some("   ".to_string());
    cfg.auth.password = Some("pw".to_string());

    let creds = cfg.auth.credentials();
    assert!(creds.username.starts_with("user-"));
    assert_eq!(creds.password, "pw");
}

#[test]
fn test_debug_redacts_password() {
    let mut cfg = Config::default();
    cfg.auth.password = Some("hunter2".to_string());
    let shown = format!("{cfg:?}");
    assert!(!shown.contains("hunter2"));
    assert!(shown.contains("<redacted>"));
}
