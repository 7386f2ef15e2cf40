use std::{fs, path::Path};

use log::warn;
use serde::{Deserialize, Serialize};

pub mod logging;
mod loot;

pub use logging::LoggingConfig;
pub use loot::{LootConfig, TagEntryConfig};

const CONFIG_ROOT_FOLDER: &str = "config/";
const CONFIG_FILE: &str = "debris.toml";

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DebrisConfiguration {
    pub logging: LoggingConfig,
    pub loot: LootConfig,
}

impl DebrisConfiguration {
    /// Loads the configuration from `<exec_dir>/config/debris.toml`,
    /// writing the defaults there when the file does not exist yet.
    ///
    /// A malformed file is a user-data problem: it is logged and the
    /// defaults are used, the engine never refuses to start over it.
    pub fn load(exec_dir: &Path) -> Self {
        let config_dir = exec_dir.join(CONFIG_ROOT_FOLDER);
        if !config_dir.exists() {
            log::debug!("creating new config root folder");
            if let Err(err) = fs::create_dir_all(&config_dir) {
                warn!("Couldn't create config folder at {config_dir:?}: {err}");
                return Self::validated(Self::default());
            }
        }
        let path = config_dir.join(CONFIG_FILE);

        let config = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                    warn!(
                        "Couldn't parse config at {:?}. Reason: {}. Using defaults",
                        &path,
                        err.message()
                    );
                    Self::default()
                }),
                Err(err) => {
                    warn!("Couldn't read configuration file at {:?}: {}", &path, err);
                    Self::default()
                }
            }
        } else {
            let content = Self::default();

            if let Err(err) = fs::write(&path, toml::to_string(&content).unwrap()) {
                warn!("Couldn't write default config to {:?}: {}", &path, err);
            }

            content
        };

        Self::validated(config)
    }

    fn validated(mut config: Self) -> Self {
        config.loot.validate();
        config
    }
}
