//! Pre-existing data directory tests
//!
//! A data directory that already holds the system schema must never be
//! re-initialized: the only work done is directory provisioning and socket
//! reconciliation before handing off.

mod stub;

use std::fs;

use mysql_entrypoint::config::MapEnv;
use mysql_entrypoint::handoff::HandoffKind;
use stub::StubImage;

fn full_env() -> MapEnv {
    MapEnv::new()
        .with("MYSQL_ROOT_PASSWORD", "rootpw")
        .with("MYSQL_DATABASE", "shop")
        .with("MYSQL_USER", "buyer")
        .with("MYSQL_PASSWORD", "secret")
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_second_run_does_not_reinitialize() {
    let image = StubImage::new();
    image.run(&full_env(), &[]).unwrap();
    assert!(image.log().contains("CREATE USER 'buyer'@'%'"));

    image.clear_log();
    let handoff = image.run(&full_env(), &[]).unwrap();
    assert_eq!(handoff.kind(), HandoffKind::Engine);

    // Only help dumps: configuration check and socket reconciliation.
    let log = image.log();
    assert!(!log.is_empty());
    for line in log.lines() {
        assert!(line.contains("--verbose --help"), "unexpected call: {}", line);
    }
}

#[test]
fn test_existing_database_needs_no_password() {
    let image = StubImage::new();
    fs::create_dir_all(image.data_dir.join("mysql")).unwrap();

    let handoff = image.run(&MapEnv::new(), &["--port=3307"]).unwrap();
    assert_eq!(handoff.kind(), HandoffKind::Engine);
    assert_eq!(handoff.args(), &["--port=3307"]);
    assert!(!image.log().contains("--initialize-insecure"));
}

#[test]
fn test_reserved_username_rejected_on_existing_database() {
    let image = StubImage::new();
    fs::create_dir_all(image.data_dir.join("mysql")).unwrap();
    let env = MapEnv::new().with("MYSQL_USER", "root");
    assert!(image.run(&env, &[]).is_err());
}

// =============================================================================
// Socket reconciliation
// =============================================================================

#[test]
fn test_default_socket_linked_to_configured_socket() {
    let image = StubImage::new();
    fs::create_dir_all(image.data_dir.join("mysql")).unwrap();
    let custom = image.path().join("custom").join("mysqld.sock");
    let arg = format!("--socket={}", custom.display());

    image.run(&MapEnv::new(), &[&arg]).unwrap();

    // The socket directory is provisioned and the default location links to it.
    assert!(custom.parent().unwrap().is_dir());
    assert_eq!(fs::read_link(&image.socket).unwrap(), custom);
}

#[test]
fn test_option_file_socket_does_not_mask_builtin_default() {
    let image = StubImage::new();
    fs::create_dir_all(image.data_dir.join("mysql")).unwrap();
    let configured = image.path().join("conf").join("mysqld.sock");
    image.set_option_file_socket(&configured);

    image.run(&MapEnv::new(), &[]).unwrap();

    assert!(image.log().contains("mysqld --no-defaults --verbose --help"));
    assert_eq!(fs::read_link(&image.socket).unwrap(), configured);
}

#[test]
fn test_same_socket_is_not_linked() {
    let image = StubImage::new();
    fs::create_dir_all(image.data_dir.join("mysql")).unwrap();

    image.run(&MapEnv::new(), &[]).unwrap();
    assert!(fs::symlink_metadata(&image.socket).is_err());
}

// =============================================================================
// Directory provisioning
// =============================================================================

#[test]
fn test_directories_created_from_engine_configuration() {
    let image = StubImage::new();
    fs::create_dir_all(image.data_dir.join("mysql")).unwrap();

    image.run(&MapEnv::new(), &[]).unwrap();

    assert!(image.path().join("run").is_dir());
    assert!(image.data_dir.is_dir());
}
