//! Configuration manager for otpd.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:8080";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to SQLite configuration.
    #[serde(skip_serializing)]
    pub sqlite: Option<Sqlite>,
    /// Related to OTP verification windows.
    #[serde(default, skip_serializing)]
    pub otp: Otp,
}

fn default_listen() -> String {
    DEFAULT_LISTEN_ADDRESS.to_owned()
}

/// SQLite configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sqlite {
    /// Path of the database file, created when missing.
    pub path: String,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// OTP window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Otp {
    /// Accepted clock drift for time-based codes, in time steps on each
    /// side of the current one.
    pub totp_drift: u64,
    /// Number of counter slots searched during counter-based verification.
    pub hotp_look_ahead: u64,
}

impl Default for Otp {
    fn default() -> Self {
        Self {
            totp_drift: 1,
            hotp_look_ahead: 10,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            version: String::default(),
            path: PathBuf::default(),
            sqlite: None,
            otp: Otp::default(),
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Arc<Self> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Arc::new(self.error(err));
                        },
                    };

                // set app version.
                config.version = VERSION.to_owned();

                Arc::new(config)
            },
            Err(err) => Arc::new(self.error(err)),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}
