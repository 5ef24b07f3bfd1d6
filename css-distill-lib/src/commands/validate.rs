use super::Host;
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `css-distill.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_deref();

    match Config::load(config_path) {
        Ok(_) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration unless a css-distill.toml is present");
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};

    fn utf8_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(dir.path().to_string_lossy().to_string()).join(name)
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_default_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = utf8_path(&dir, "css-distill.toml");

        let mut init_host = TestHost::new();
        init_config(&mut init_host, &InitArgs { output: Some(config_path.clone()) }).unwrap();
        assert!(String::from_utf8_lossy(&init_host.output_buf).contains("Generated default configuration file"));

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_ok(), "Default configuration should validate successfully: {result:?}");
        assert!(String::from_utf8_lossy(&host.output_buf).contains("Configuration file is valid"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_toml_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = utf8_path(&dir, "invalid_syntax.toml");
        std::fs::write(&config_path, "[radius\nsm = 4.0\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(String::from_utf8_lossy(&host.error_buf).contains("Configuration validation failed"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = utf8_path(&dir, "unknown_field.toml");
        std::fs::write(&config_path, "minimum_occurrences = 2\nunknown_field = \"value\"\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });
        assert!(result.is_err(), "Unknown field should fail validation");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_out_of_range_value() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = utf8_path(&dir, "zero_occurrences.toml");
        std::fs::write(&config_path, "minimum_occurrences = 0\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        let err = result.unwrap_err();
        assert!(err.to_string().contains("minimum_occurrences must be at least 1"), "{err}");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(utf8_path(&dir, "absent.toml")) });
        assert!(result.is_err());
    }
}
