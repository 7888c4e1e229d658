use std::path::PathBuf;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::debug;

/// Environment variable overriding the database location.
pub const PATH_ENV: &str = "USB_IDS_PATH";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Location of the usb.ids file read by the default database
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl Config {
    /// Default config, with the path taken from `USB_IDS_PATH` when set.
    pub fn from_env() -> Self {
        match std::env::var_os(PATH_ENV) {
            Some(path) if !path.is_empty() => Self { path: path.into() },
            _ => Self::default(),
        }
    }
}

/// The snapshot shipped next to this crate's manifest.
pub fn default_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/ids/usb.ids"))
}

pub static GLOBAL_CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::from_env()));

/// Replace the global config.
///
/// The default database reads it once, on its first query.
pub fn initialize_config(config: Config) {
    let mut global_config = GLOBAL_CONFIG.write();
    *global_config = config;
    debug!("config {:?}", global_config);
}
