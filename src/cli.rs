use clap::Parser;
use std::path::PathBuf;

/// SchemaForge - visual JSON Schema editor and schema registry
#[derive(Parser, Debug, Clone)]
#[command(name = "schemaforge", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SCHEMAFORGE_CONFIG", default_value = "schemaforge.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "SCHEMAFORGE_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "SCHEMAFORGE_PORT")]
    pub port: Option<u16>,

    /// Directory of schema payloads to load at startup
    #[arg(long, env = "SCHEMAFORGE_SEED_DIR")]
    pub seed_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["schemaforge"]);
        assert_eq!(cli.config, PathBuf::from("schemaforge.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.seed_dir.is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "schemaforge",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--seed-dir",
            "schemas",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.seed_dir, Some(PathBuf::from("schemas")));
    }
}
