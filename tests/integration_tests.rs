//! Integration tests for parameter sourcing and validation.

use std::fs;

use tempfile::TempDir;

use dc_firstboot::{DeployMode, FirstbootSeed};

#[test]
fn preseed_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("firstboot.json");
    fs::write(
        &path,
        r#"{
            "domain": "EXAMPLE",
            "admin_password": "Secret123",
            "join_nameserver": "10.0.0.10"
        }"#,
    )
    .unwrap();

    let seed = FirstbootSeed::load_from_file(&path).unwrap();
    assert!(seed.is_complete());

    // A join nameserver selects the join variant
    let mode = seed.mode(None);
    assert_eq!(mode, DeployMode::Join);

    let config = seed.into_config(mode).unwrap();
    assert_eq!(config.domain, "EXAMPLE");
    assert_eq!(config.realm, "EXAMPLE.lan");
    assert_eq!(config.admin_user, "administrator");
    assert_eq!(config.join_hostname, "dc2");
    assert_eq!(
        config.join_nameserver.unwrap().to_string(),
        "10.0.0.10"
    );
}

#[test]
fn environment_variables_are_honored() {
    // set_var is unsafe because tests share a process; this is the only
    // test that touches the APP_* variables
    unsafe {
        std::env::set_var("APP_DOMAIN", "ENVDOM");
        std::env::set_var("APP_PASS", "Secret123");
        std::env::set_var("APP_REALM", "");
        std::env::set_var("APP_ADMIN_USER", "opsadmin");
    }

    let seed = FirstbootSeed::from_env();

    unsafe {
        std::env::remove_var("APP_DOMAIN");
        std::env::remove_var("APP_PASS");
        std::env::remove_var("APP_REALM");
        std::env::remove_var("APP_ADMIN_USER");
    }

    assert_eq!(seed.domain.as_deref(), Some("ENVDOM"));
    assert_eq!(seed.admin_password.as_deref(), Some("Secret123"));
    // Empty exports count as unset
    assert!(seed.realm.is_none());
    assert_eq!(seed.admin_user.as_deref(), Some("opsadmin"));

    let config = seed.into_config(DeployMode::Provision).unwrap();
    assert_eq!(config.realm, "ENVDOM.lan");
    assert_eq!(config.admin_user, "opsadmin");
}

#[test]
fn flag_seed_wins_over_preseed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("firstboot.json");
    fs::write(
        &path,
        r#"{"domain": "FILEDOM", "realm": "file.lan", "admin_password": "FilePass1"}"#,
    )
    .unwrap();

    let flag_seed = FirstbootSeed {
        domain: Some("FLAGDOM".to_string()),
        ..Default::default()
    };

    let merged = flag_seed.overlaid_on(FirstbootSeed::load_from_file(&path).unwrap());
    let config = merged.into_config(DeployMode::Provision).unwrap();

    assert_eq!(config.domain, "FLAGDOM");
    assert_eq!(config.realm, "file.lan");
    assert_eq!(config.admin_password, "FilePass1");
}

#[test]
fn complete_seed_never_needs_dialogs() {
    // Domain, realm, and password supplied: the non-interactive contract
    let seed = FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        realm: Some("example.lan".to_string()),
        admin_password: Some("Secret123".to_string()),
        ..Default::default()
    };
    assert!(seed.is_complete());

    let config = seed.into_config(DeployMode::Provision).unwrap();
    assert_eq!(config.realm, "example.lan");
}

#[test]
fn incomplete_seed_is_flagged_for_dialogs() {
    let seed = FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        realm: Some("example.lan".to_string()),
        ..Default::default()
    };
    assert!(!seed.is_complete());
}

#[test]
fn scenario_example_secret123_empty_realm() {
    // domain=EXAMPLE, password=Secret123, realm="" must derive EXAMPLE.lan
    // and keep the non-interactive path; only the ticket principal
    // uppercases the realm
    let seed = FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        realm: Some(String::new()),
        admin_password: Some("Secret123".to_string()),
        ..Default::default()
    };
    // An empty realm answer counts as absent
    let seed = seed.overlaid_on(FirstbootSeed::default());
    assert!(seed.is_complete());

    let config = seed.into_config(DeployMode::Provision).unwrap();
    assert_eq!(config.realm, "EXAMPLE.lan");
    assert_eq!(config.admin_principal(), "administrator@EXAMPLE.LAN");
}

#[test]
fn preseed_round_trip_preserves_answers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("answers.json");

    let seed = FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        realm: Some("corp.example.com".to_string()),
        admin_user: Some("administrator".to_string()),
        admin_password: Some("Secret123".to_string()),
        join_nameserver: Some("10.0.0.10".to_string()),
        join_hostname: Some("dc7".to_string()),
    };
    seed.save_to_file(&path).unwrap();

    let loaded = FirstbootSeed::load_from_file(&path).unwrap();
    assert_eq!(loaded, seed);

    let config = loaded.into_config(DeployMode::Join).unwrap();
    assert_eq!(config.join_hostname, "dc7");
    assert_eq!(config.realm, "corp.example.com");
}
