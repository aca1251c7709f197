use std::path::PathBuf;
use std::time::Duration;

use tinyserve::config::{Config, DEFAULT_PORT};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.server.port, DEFAULT_PORT);
    assert_eq!(cfg.server.port, 9999);
    assert_eq!(cfg.static_files.root, PathBuf::from("."));
    assert!(cfg.static_files.directory_listing);
    assert_eq!(cfg.listen_addr(), "0.0.0.0:9999");
    assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
}

#[test]
fn test_config_single_numeric_arg_is_port() {
    let mut cfg = Config::default();
    cfg.apply_args(&args(&["8080"])).unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.static_files.root, PathBuf::from("."));
}

#[test]
fn test_config_single_other_arg_is_root() {
    let mut cfg = Config::default();
    cfg.apply_args(&args(&["/srv/www"])).unwrap();
    assert_eq!(cfg.server.port, 9999);
    assert_eq!(cfg.static_files.root, PathBuf::from("/srv/www"));
}

#[test]
fn test_config_root_and_port() {
    let mut cfg = Config::default();
    cfg.apply_args(&args(&["/srv/www", "8000"])).unwrap();
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.static_files.root, PathBuf::from("/srv/www"));
}

#[test]
fn test_config_rejects_bad_port_and_extra_args() {
    let mut cfg = Config::default();
    assert!(cfg.apply_args(&args(&["9x"])).is_err());
    assert!(cfg.apply_args(&args(&["/srv", "http"])).is_err());
    assert!(cfg.apply_args(&args(&["a", "1", "b"])).is_err());
}

#[test]
fn test_config_from_yaml_keeps_missing_defaults() {
    let cfg = Config::from_yaml("server:\n  port: 7000\nstatic_files:\n  directory_listing: false\n").unwrap();
    assert_eq!(cfg.server.port, 7000);
    assert_eq!(cfg.server.bind, "0.0.0.0");
    assert_eq!(cfg.server.request_timeout_secs, 30);
    assert!(!cfg.static_files.directory_listing);
    assert_eq!(cfg.static_files.root, PathBuf::from("."));
}

#[test]
fn test_config_from_invalid_yaml() {
    assert!(Config::from_yaml("server: [1, 2").is_err());
    assert!(Config::from_yaml("server:\n  port: not-a-number\n").is_err());
}

#[test]
fn test_config_validate_root() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, b"x").unwrap();

    let mut cfg = Config::default();
    cfg.static_files.root = dir.path().to_path_buf();
    assert!(cfg.validate().is_ok());

    cfg.static_files.root = file;
    assert!(cfg.validate().is_err());

    cfg.static_files.root = dir.path().join("missing");
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.listen_addr(), cfg2.listen_addr());
}
