//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If a required variable is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `RAITO_DOMAIN`: Tenant domain name (required)
//! - `RAITO_USER`: Principal to authenticate as (required)
//! - `RAITO_SECRET`: Password of the principal (required)
//! - `RAITO_URL`: API base URL
//! - `RAITO_PAGE_SIZE`: Page size used by list operations
//! - `RAITO_AWS_REGION`: Identity provider region
//! - `RAITO_IDP_ENDPOINT`: Identity provider endpoint override
//! - `RAITO_TIMEOUT_SECS`: HTTP timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./raito.{json,toml}` then `./config.{json,toml}` (current working
//!    directory)
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use raito_domain::{ClientConfig, IdentityProviderConfig, RaitoError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["raito.json", "raito.toml", "config.json", "config.toml"];
const REQUIRED_VARS: [&str; 3] = ["RAITO_DOMAIN", "RAITO_USER", "RAITO_SECRET"];

/// Load configuration with automatic fallback strategy
///
/// Loads from environment variables when all required variables are set and
/// falls back to a config file only when one of them is missing. A malformed
/// optional variable is reported as is rather than masked by the file.
///
/// # Errors
/// Returns `RaitoError::Config` if:
/// - An environment variable has an invalid value
/// - No config file is found or its format is invalid
/// - Required fields are missing or values are out of range
pub fn load() -> Result<ClientConfig> {
    load_with(|key| std::env::var(key).ok(), || load_from_file(None))
}

fn load_with<F, G>(lookup: F, from_file: G) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
    G: FnOnce() -> Result<ClientConfig>,
{
    if let Some(key) = missing_required(&lookup) {
        tracing::debug!(variable = key, "Environment incomplete, trying file");
        return from_file();
    }

    let config = load_from_lookup(lookup)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

fn missing_required<F>(lookup: &F) -> Option<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_VARS.into_iter().find(|key| lookup(key).filter(|value| !value.is_empty()).is_none())
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `RaitoError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from an arbitrary key lookup using the environment
/// variable names.
///
/// # Errors
/// Same as [`load_from_env`].
pub fn load_from_lookup<F>(lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key).filter(|value| !value.is_empty()).ok_or_else(|| {
            RaitoError::Config(format!("Missing required environment variable: {key}"))
        })
    };

    let mut config =
        ClientConfig::new(required("RAITO_DOMAIN")?, required("RAITO_USER")?, required("RAITO_SECRET")?);

    if let Some(url) = lookup("RAITO_URL") {
        config.url = url;
    }

    if let Some(page_size) = lookup("RAITO_PAGE_SIZE") {
        config.page_size = page_size
            .parse::<usize>()
            .map_err(|e| RaitoError::Config(format!("Invalid page size: {e}")))?;
    }

    if let Some(timeout) = lookup("RAITO_TIMEOUT_SECS") {
        config.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| RaitoError::Config(format!("Invalid timeout: {e}")))?;
    }

    let mut identity_provider = IdentityProviderConfig::default();
    if let Some(region) = lookup("RAITO_AWS_REGION") {
        identity_provider.region = region;
    }
    identity_provider.endpoint = lookup("RAITO_IDP_ENDPOINT");
    config.identity_provider = identity_provider;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RaitoError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RaitoError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RaitoError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RaitoError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RaitoError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RaitoError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RaitoError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    probe_in(&dirs)
}

fn probe_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| values.get(key).cloned()
    }

    fn write_temp(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn test_load_from_lookup_required_only() {
        let config = load_from_lookup(lookup_from(&[
            ("RAITO_DOMAIN", "acme"),
            ("RAITO_USER", "alice@acme.com"),
            ("RAITO_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.domain, "acme");
        assert_eq!(config.user, "alice@acme.com");
        assert_eq!(config.url, "https://api.raito.cloud/");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.identity_provider.region, "eu-central-1");
        assert!(config.identity_provider.endpoint.is_none());
    }

    #[test]
    fn test_load_from_lookup_all_vars_set() {
        let config = load_from_lookup(lookup_from(&[
            ("RAITO_DOMAIN", "acme"),
            ("RAITO_USER", "alice"),
            ("RAITO_SECRET", "s3cret"),
            ("RAITO_URL", "http://localhost:8080"),
            ("RAITO_PAGE_SIZE", "100"),
            ("RAITO_AWS_REGION", "us-east-1"),
            ("RAITO_IDP_ENDPOINT", "http://localhost:9229/"),
            ("RAITO_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url(), "http://localhost:8080/");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.identity_provider.region, "us-east-1");
        assert_eq!(config.identity_provider.endpoint_url(), "http://localhost:9229/");
    }

    #[test]
    fn test_load_from_lookup_missing_var() {
        let err = load_from_lookup(lookup_from(&[("RAITO_DOMAIN", "acme")])).unwrap_err();
        assert!(matches!(err, RaitoError::Config(ref msg) if msg.contains("RAITO_USER")));
    }

    #[test]
    fn test_load_from_lookup_invalid_number() {
        let err = load_from_lookup(lookup_from(&[
            ("RAITO_DOMAIN", "acme"),
            ("RAITO_USER", "alice"),
            ("RAITO_SECRET", "s3cret"),
            ("RAITO_PAGE_SIZE", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RaitoError::Config(_)));
    }

    #[test]
    fn test_load_falls_back_to_file_when_required_var_missing() {
        let config = load_with(lookup_from(&[("RAITO_DOMAIN", "acme")]), || {
            Ok(ClientConfig::new("from-file", "bob", "pw"))
        })
        .unwrap();
        assert_eq!(config.domain, "from-file");
    }

    #[test]
    fn test_load_reports_malformed_env_value_without_fallback() {
        let err = load_with(
            lookup_from(&[
                ("RAITO_DOMAIN", "acme"),
                ("RAITO_USER", "alice"),
                ("RAITO_SECRET", "s3cret"),
                ("RAITO_PAGE_SIZE", "lots"),
            ]),
            || panic!("config file must not be consulted"),
        )
        .unwrap_err();
        assert!(matches!(err, RaitoError::Config(ref msg) if msg.contains("page size")));
    }

    #[test]
    fn test_load_from_lookup_page_size_out_of_range() {
        let err = load_from_lookup(lookup_from(&[
            ("RAITO_DOMAIN", "acme"),
            ("RAITO_USER", "alice"),
            ("RAITO_SECRET", "s3cret"),
            ("RAITO_PAGE_SIZE", "5000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RaitoError::Config(_)));
    }

    #[test]
    fn test_load_from_file_json() {
        let (_temp, path) = write_temp(
            r#"{
                "domain": "acme",
                "user": "alice",
                "secret": "s3cret",
                "page_size": 50,
                "identity_provider": { "region": "us-west-2" }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.domain, "acme");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.identity_provider.region, "us-west-2");
        assert_eq!(config.timeout_secs, 30);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let (_temp, path) = write_temp(
            r#"
domain = "acme"
user = "alice"
secret = "s3cret"
url = "https://api.example.test"

[identity_provider]
endpoint = "http://localhost:9229/"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.base_url(), "https://api.example.test/");
        assert_eq!(config.identity_provider.endpoint.as_deref(), Some("http://localhost:9229/"));
        assert_eq!(config.identity_provider.region, "eu-central-1");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/raito.json"))).unwrap_err();
        assert!(matches!(err, RaitoError::Config(_)));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let (_temp, path) = write_temp(r#"{ "domain": "acme" "#, "json");

        let err = load_from_file(Some(path.clone())).unwrap_err();
        assert!(matches!(err, RaitoError::Config(ref msg) if msg.contains("JSON")));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("domain: acme", &PathBuf::from("raito.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_prefers_raito_file_over_generic_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("raito.toml"), "").unwrap();

        let found = probe_in(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.file_name().unwrap(), "raito.toml");
    }

    #[test]
    fn test_probe_searches_directories_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(second.path().join("config.toml"), "").unwrap();

        let found = probe_in(&[first.path().to_path_buf(), second.path().to_path_buf()]).unwrap();
        assert!(found.starts_with(second.path()));

        let empty = TempDir::new().unwrap();
        assert!(probe_in(&[empty.path().to_path_buf()]).is_none());
    }
}
