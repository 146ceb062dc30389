//! Integration tests for configuration module

use nfapi_core::{Config, Error};
use std::path::PathBuf;

const SAMPLE: &str = r#"
[general]
print_log = true

[driver]
bundled_path = "bin/nfdriver.sys"
library_dir = "bin"

[target]
host = "proxy.example.com"
port = 8080
username = "alice"
password = "s3cret"

[rules]
handle = ["chrome.exe", "^.*\\\\steam\\\\.*$"]
bypass = ["svchost.exe"]
"#;

#[test]
fn test_full_config() {
    let config = Config::from_toml(SAMPLE).unwrap();

    assert!(config.general.print_log);
    assert!(!config.general.http_proxy);
    assert_eq!(config.driver.bundled_path, PathBuf::from("bin/nfdriver.sys"));
    assert_eq!(config.driver.library_dir, Some(PathBuf::from("bin")));
    assert_eq!(config.rules.handle[1], r"^.*\\steam\\.*$");
    assert!(config.validate().is_ok());
}

#[test]
fn test_session_from_config() {
    let session = Config::from_toml(SAMPLE).unwrap().session();

    assert_eq!(session.host, "proxy.example.com");
    assert_eq!(session.port, 8080);
    assert_eq!(session.rules.bypass, vec!["svchost.exe"]);
    let credentials = session.dialable_credentials().unwrap();
    assert_eq!(credentials.username, "alice");
    assert_eq!(credentials.password, "s3cret");
}

#[test]
fn test_lone_username_rejected() {
    let config = Config::from_toml("[target]\nusername = \"alice\"\n").unwrap();
    assert!(matches!(config.validate(), Err(Error::ConfigValue { .. })));
}

#[test]
fn test_blank_rule_rejected() {
    let config = Config::from_toml("[rules]\nbypass = [\"  \"]\n").unwrap();
    match config.validate() {
        Err(Error::ConfigValue { key, .. }) => assert_eq!(key, "rules.bypass"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_empty_host_rejected() {
    let config = Config::from_toml("[target]\nhost = \"\"\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_toml() {
    let result = Config::from_toml("[target\nport = 1");
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
fn test_missing_file() {
    let result = Config::load("does/not/exist.toml");
    assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
}

#[test]
fn test_toml_roundtrip_keeps_session() {
    let original = Config::from_toml(SAMPLE).unwrap();
    let parsed = Config::from_toml(&original.to_toml().unwrap()).unwrap();

    assert_eq!(original, parsed);
}
