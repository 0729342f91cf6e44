use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use topup_order::core::ConfigProvider;
use topup_order::utils::validation::Validate;
use topup_order::{AppConfig, OrderError};

#[test]
fn test_load_full_config_from_file() -> Result<()> {
    std::env::set_var("TOPUP_TEST_TENANT", "tenant-9");

    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[api]
base_url = "https://api.example.com/"
request_timeout_seconds = 15

[api.headers]
X-Tenant = "${{TOPUP_TEST_TENANT}}"

[order]
default_game = "Mobile Legends"
submission_timeout_seconds = 10
catalogue_limit = 500

[logging]
level = "debug"
json = true
"#
    )?;

    let config = AppConfig::from_file(file.path())?;
    config.validate()?;

    assert_eq!(config.base_url(), "https://api.example.com/");
    assert_eq!(config.request_timeout_seconds(), 15);
    assert_eq!(config.submission_timeout_seconds(), Some(10));
    assert_eq!(config.catalogue_limit(), 500);
    assert_eq!(config.default_game(), Some("Mobile Legends"));
    assert_eq!(
        config.extra_headers(),
        vec![("X-Tenant".to_string(), "tenant-9".to_string())]
    );
    assert!(config.logging.json);
    Ok(())
}

#[test]
fn test_minimal_config_uses_defaults() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[api]\nbase_url = \"http://localhost:8080\"")?;

    let config = AppConfig::from_file(file.path())?;
    config.validate()?;

    assert_eq!(config.request_timeout_seconds(), 30);
    assert_eq!(config.submission_timeout_seconds(), Some(20));
    assert_eq!(config.catalogue_limit(), 1000);
    assert_eq!(config.default_game(), None);
    assert_eq!(config.logging.level, "info");
    Ok(())
}

#[test]
fn test_invalid_config_values_are_reported() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "[api]\nbase_url = \"ftp://files.example.com\"\n\n[logging]\nlevel = \"loud\""
    )?;

    let config = AppConfig::from_file(file.path())?;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, OrderError::InvalidConfigValueError { ref field, .. } if field == "api.base_url"));
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let err = AppConfig::from_file("/nonexistent/topup.toml").unwrap_err();
    assert!(matches!(err, OrderError::IoError(_)));
}
