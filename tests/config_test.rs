use clap::Parser;
use schemaforge::cli::Cli;
use schemaforge::config::Settings;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_without_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = Settings::from_file(temp_dir.path().join("missing.toml"))?;

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 3000);
    assert!(settings.registry.seed_dir.is_none());
    assert_eq!(settings.notifications.capacity, 64);
    Ok(())
}

#[test]
fn test_config_file_and_cli_overrides() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("seeds"))?;

    let config_path = root.join("schemaforge.toml");
    fs::write(
        &config_path,
        r#"
[server]
host = "0.0.0.0"
port = 4000

[notifications]
capacity = 8
"#,
    )?;

    let settings = Settings::from_file(config_path.clone())?;
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 4000);
    assert_eq!(settings.notifications.capacity, 8);

    let seeds = root.join("seeds");
    let cli = Cli::parse_from([
        "schemaforge".to_string(),
        "--config".to_string(),
        config_path.display().to_string(),
        "--port".to_string(),
        "5000".to_string(),
        "--seed-dir".to_string(),
        seeds.display().to_string(),
    ]);
    let settings = Settings::new_with_cli(&cli)?;
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 5000);
    assert_eq!(settings.registry.seed_dir, Some(seeds));
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("schemaforge.toml");
    fs::write(&config_path, "[server]\nhost = \"127.0.0.1\"\nport = 0\n")?;

    let err = Settings::from_file(config_path).unwrap_err();
    assert!(err.to_string().contains("server.port"));
    Ok(())
}
