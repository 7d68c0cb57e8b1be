use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "freightdesk";
const CONFIG_FILENAME: &str = "config.toml";

pub const API_KEY_ENV: &str = "FREIGHTDESK_API_KEY";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "/data";
pub const DEFAULT_SHIPMENTS_FILE: &str = "testData.json";
pub const DEFAULT_DRIVERS_FILE: &str = "drivers.json";

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub server: ServerConfig,
    pub data: DataConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("server", &self.server)
            .field("data", &self.data)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub shipments_file: String,
    pub drivers_file: String,
}

impl DataConfig {
    pub fn shipments_path(&self) -> PathBuf {
        self.dir.join(&self.shipments_file)
    }

    pub fn drivers_path(&self) -> PathBuf {
        self.dir.join(&self.drivers_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            data: DataConfig {
                dir: PathBuf::from(DEFAULT_DATA_DIR),
                shipments_file: DEFAULT_SHIPMENTS_FILE.to_string(),
                drivers_file: DEFAULT_DRIVERS_FILE.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("api_key cannot be empty")]
    EmptyApiKey,
    #[error("server.host cannot be empty")]
    EmptyHost,
    #[error("invalid data.{field} value: {value:?}")]
    InvalidDataField { field: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_key: Option<String>,
    server: Option<ServerFile>,
    data: Option<DataFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataFile {
    dir: Option<PathBuf>,
    shipments_file: Option<String>,
    drivers_file: Option<String>,
}

/// Loads the config file (explicit path or the XDG default), then applies the
/// `FREIGHTDESK_API_KEY` override.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let config = load_file(config_path)?;
    apply_api_key_override(config, env::var(API_KEY_ENV).ok())
}

fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn apply_api_key_override(mut config: AppConfig, value: Option<String>) -> Result<AppConfig> {
    if let Some(key) = value {
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        config.api_key = Some(key);
    }
    Ok(config)
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(key) = parsed.api_key {
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        config.api_key = Some(key);
    }

    if let Some(server) = parsed.server {
        if let Some(host) = server.host {
            if host.trim().is_empty() {
                return Err(ConfigError::EmptyHost);
            }
            config.server.host = host;
        }
        if let Some(port) = server.port {
            config.server.port = port;
        }
    }

    if let Some(data) = parsed.data {
        if let Some(dir) = data.dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidDataField {
                    field: "dir",
                    value: String::new(),
                });
            }
            config.data.dir = dir;
        }
        if let Some(name) = data.shipments_file {
            config.data.shipments_file = validate_file_name("shipments_file", name)?;
        }
        if let Some(name) = data.drivers_file {
            config.data.drivers_file = validate_file_name("drivers_file", name)?;
        }
    }

    Ok(config)
}

fn validate_file_name(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(ConfigError::InvalidDataField { field, value });
    }
    Ok(trimmed.to_string())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_api_key_override, load_at_path, merge_config, AppConfig, ConfigError, ConfigFile,
        DataFile, ServerFile,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            api_key: Some("s3cret".to_string()),
            server: Some(ServerFile {
                host: Some("127.0.0.1".to_string()),
                port: Some(8080),
            }),
            data: Some(DataFile {
                dir: Some(PathBuf::from("/srv/freight")),
                shipments_file: Some("loads.json".to_string()),
                drivers_file: None,
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.api_key.as_deref(), Some("s3cret"));
        assert_eq!(merged.server.host, "127.0.0.1");
        assert_eq!(merged.server.port, 8080);
        assert_eq!(
            merged.data.shipments_path(),
            PathBuf::from("/srv/freight/loads.json")
        );
        assert_eq!(
            merged.data.drivers_path(),
            PathBuf::from("/srv/freight/drivers.json")
        );
    }

    #[test]
    fn merge_config_rejects_nested_file_names() {
        let parsed = ConfigFile {
            api_key: None,
            server: None,
            data: Some(DataFile {
                dir: None,
                shipments_file: Some("../etc/passwd".to_string()),
                drivers_file: None,
            }),
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDataField {
                field: "shipments_file",
                ..
            }
        ));
    }

    #[test]
    fn api_key_override_wins_and_rejects_blank() {
        let config = apply_api_key_override(AppConfig::default(), Some("env-key".to_string()))
            .expect("override");
        assert_eq!(config.api_key.as_deref(), Some("env-key"));

        let err = apply_api_key_override(AppConfig::default(), Some(" ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyApiKey));
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("s3cret".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "api_key = \"abc\"\n[server]\nport = 4000\n[data]\ndir = \"/tmp/loads\"\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data.dir, PathBuf::from("/tmp/loads"));
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "apikey = \"typo\"\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\n").expect("write config");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&path, perms).expect("chmod");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
