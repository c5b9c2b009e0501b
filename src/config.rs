// src/config.rs
use crate::errors::{Result, ServiceError};
use crate::status::Locale;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// How the external compiler is invoked and bounded.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Path or name of the compiler binary.
    pub compiler: PathBuf,
    pub compile_timeout: Duration,
    pub run_timeout: Duration,
    /// Bytes kept per captured stream.
    pub output_limit: usize,
    /// Report a non-zero exit of `-V` instead of returning whatever it printed.
    pub visual_strict: bool,
}

/// High-level application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    pub runtime_dir: PathBuf,
    /// `None` keeps artifacts until something outside this process removes them.
    pub artifact_ttl: Option<Duration>,
    pub locale: Locale,
    pub frontend_url: Option<String>,
    pub toolchain: ToolchainConfig,
}

/// Optional TOML overlay; every key may be omitted.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    compiler: Option<PathBuf>,
    runtime_dir: Option<PathBuf>,
    bind: Option<String>,
    port: Option<u16>,
    compile_timeout_secs: Option<u64>,
    run_timeout_secs: Option<u64>,
    output_limit: Option<usize>,
    artifact_ttl_secs: Option<u64>,
    visual_strict: Option<bool>,
    locale: Option<String>,
    frontend_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5001,
            runtime_dir: PathBuf::from("runtime"),
            artifact_ttl: Some(Duration::from_secs(3600)),
            locale: Locale::En,
            frontend_url: None,
            toolchain: ToolchainConfig {
                compiler: PathBuf::from("cc99"),
                compile_timeout: Duration::from_secs(30),
                run_timeout: Duration::from_secs(10),
                output_limit: 1 << 20,
                visual_strict: false,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the TOML file named by
    /// `CC99_CONFIG` (if any), then `CC99_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("CC99_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)?;
                Self::from_toml_str(&text)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(text)?;
        let mut config = Self::default();
        config.apply_file(file)?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(compiler) = file.compiler {
            self.toolchain.compiler = compiler;
        }
        if let Some(dir) = file.runtime_dir {
            self.runtime_dir = dir;
        }
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(secs) = file.compile_timeout_secs {
            self.toolchain.compile_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.run_timeout_secs {
            self.toolchain.run_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = file.output_limit {
            self.toolchain.output_limit = limit;
        }
        if let Some(secs) = file.artifact_ttl_secs {
            self.artifact_ttl = ttl_from_secs(secs);
        }
        if let Some(strict) = file.visual_strict {
            self.toolchain.visual_strict = strict;
        }
        if let Some(locale) = file.locale {
            self.locale = locale.parse().map_err(ServiceError::Config)?;
        }
        if file.frontend_url.is_some() {
            self.frontend_url = file.frontend_url;
        }
        Ok(())
    }

    /// Applies `CC99_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bin) = lookup("CC99_BIN") {
            self.toolchain.compiler = PathBuf::from(bin);
        }
        if let Some(dir) = lookup("CC99_RUNTIME_DIR") {
            self.runtime_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup("CC99_BIND") {
            self.bind = bind;
        }
        if let Some(port) = lookup("CC99_PORT") {
            self.port = parse_number("CC99_PORT", &port)?;
        }
        if let Some(secs) = lookup("CC99_COMPILE_TIMEOUT_SECS") {
            self.toolchain.compile_timeout =
                Duration::from_secs(parse_number("CC99_COMPILE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("CC99_RUN_TIMEOUT_SECS") {
            self.toolchain.run_timeout =
                Duration::from_secs(parse_number("CC99_RUN_TIMEOUT_SECS", &secs)?);
        }
        if let Some(limit) = lookup("CC99_OUTPUT_LIMIT") {
            self.toolchain.output_limit = parse_number("CC99_OUTPUT_LIMIT", &limit)?;
        }
        if let Some(secs) = lookup("CC99_ARTIFACT_TTL_SECS") {
            self.artifact_ttl = ttl_from_secs(parse_number("CC99_ARTIFACT_TTL_SECS", &secs)?);
        }
        if let Some(strict) = lookup("CC99_VISUAL_STRICT") {
            self.toolchain.visual_strict = parse_bool("CC99_VISUAL_STRICT", &strict)?;
        }
        if let Some(locale) = lookup("CC99_LOCALE") {
            self.locale = locale.parse().map_err(ServiceError::Config)?;
        }
        if let Some(url) = lookup("CC99_FRONTEND_URL") {
            self.frontend_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        Ok(())
    }
}

fn ttl_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServiceError::Config(format!("{} must be a non-negative integer, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ServiceError::Config(format!("{} must be a boolean, got '{}'", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_service() {
        let config = AppConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.runtime_dir, PathBuf::from("runtime"));
        assert_eq!(config.toolchain.compiler, PathBuf::from("cc99"));
        assert_eq!(config.toolchain.run_timeout, Duration::from_secs(10));
        assert!(!config.toolchain.visual_strict);
    }

    #[test]
    fn toml_then_env_overrides() {
        let mut config = AppConfig::from_toml_str(
            r#"
            compiler = "/opt/cc99/bin/cc99"
            port = 8080
            artifact_ttl_secs = 0
            locale = "zh"
            "#,
        )
        .unwrap();
        assert_eq!(config.toolchain.compiler, PathBuf::from("/opt/cc99/bin/cc99"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.artifact_ttl, None);
        assert_eq!(config.locale, Locale::Zh);

        config
            .apply_overrides(lookup_from(&[
                ("CC99_PORT", "9000"),
                ("CC99_VISUAL_STRICT", "true"),
                ("CC99_RUN_TIMEOUT_SECS", "3"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.toolchain.visual_strict);
        assert_eq!(config.toolchain.run_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("CC99_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));

        assert!(matches!(
            AppConfig::from_toml_str("no_such_key = 1"),
            Err(ServiceError::TomlParse(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("locale = \"fr\""),
            Err(ServiceError::Config(_))
        ));
    }
}
