//! Configuration file and environment override loading.

use std::io::Write;

use contentql_server::config::loader::load_config;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 9191

[logging]
level = "debug"

[graphql]
max_query_depth = 6
introspection = false
dev_mode = true
"#,
    );

    let cfg = load_config(file.path().to_str()).unwrap();
    assert_eq!(cfg.addr().to_string(), "127.0.0.1:9191");
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.graphql.max_query_depth, Some(6));
    assert!(!cfg.graphql.introspection);
    assert!(cfg.graphql.dev_mode);
    assert!(cfg.graphql.enabled);
}

#[test]
fn test_disabled_limits() {
    let file = write_config(
        r#"
[graphql]
max_query_depth = 0
"#,
    );

    let cfg = load_config(file.path().to_str()).unwrap();
    assert_eq!(cfg.graphql.max_query_depth, None);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let cfg = load_config(path.to_str()).unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.content.path.to_str(), Some("content/demo.json"));
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = write_config(
        r#"
[logging]
level = "chatty"
"#,
    );

    let err = load_config(file.path().to_str()).unwrap_err();
    assert!(err.contains("logging.level"), "{err}");
}

#[test]
fn test_true_is_not_a_limit() {
    let file = write_config(
        r#"
[graphql]
max_query_depth = true
"#,
    );

    let err = load_config(file.path().to_str()).unwrap_err();
    assert!(err.starts_with("config deserialize error"), "{err}");
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config(
        r#"
[graphql]
max_query_complexity = 50
"#,
    );

    // Only this test touches the complexity key.
    unsafe { std::env::set_var("CONTENTQL__GRAPHQL__MAX_QUERY_COMPLEXITY", "25") };
    let cfg = load_config(file.path().to_str());
    unsafe { std::env::remove_var("CONTENTQL__GRAPHQL__MAX_QUERY_COMPLEXITY") };

    assert_eq!(cfg.unwrap().graphql.max_query_complexity, Some(25));
}
