//! Configuration management module.
//!
//! This module handles loading and saving the configuration file, which holds
//! the data directory, the database and session key names, the accepted
//! credential pair and the log level.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/tareas";
const SECURE_STORE_DIRECTORY: &str = "secure-store";

const DEFAULT_EMAIL: &str = "usuario@ejemplo.com";
const DEFAULT_PASSWORD: &str = "password1234";

/// The single email/password pair accepted at sign-in.
///
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    /// Return true when both inputs match exactly.
    ///
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub database_name: String,
    pub session_key: String,
    pub credentials: Credentials,
    pub log_level: LevelFilter,
    file_path: Option<PathBuf>,
}

/// Define the on-disk layout of the configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_name() -> String {
    "tareas.db".to_string()
}

fn default_session_key() -> String {
    "session".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Return a new instance with default values and no file path.
    ///
    pub fn new() -> Config {
        Config {
            data_dir: None,
            database_name: default_database_name(),
            session_key: default_session_key(),
            credentials: Credentials::default(),
            log_level: LevelFilter::Info,
            file_path: None,
        }
    }

    /// Return a copy that stores its data under the given directory.
    ///
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Config {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Return a copy accepting the given credential pair.
    ///
    pub fn with_credentials(mut self, credentials: Credentials) -> Config {
        self.credentials = credentials;
        self
    }

    /// Try to load an existing configuration from the disk using the custom
    /// path if provided. Without a file the defaults stay in place; the file
    /// is only written by [`Config::save`].
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        self.file_path = Some(dir_path.join(Path::new(FILE_NAME)));
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;

        if file_path.exists() {
            let contents = fs::read_to_string(file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            self.log_level = LevelFilter::from_str(&data.log_level)
                .map_err(|_| ConfigError::InvalidLogLevel(data.log_level.clone()))?;
            self.data_dir = data.data_dir;
            self.database_name = data.database_name;
            self.session_key = data.session_key;
            self.credentials = data.credentials;
        }

        Ok(())
    }

    /// Serialize the configuration and write it to the loaded file path,
    /// creating the parent directory if needed.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            data_dir: self.data_dir.clone(),
            database_name: self.database_name.clone(),
            session_key: self.session_key.clone(),
            credentials: self.credentials.clone(),
            log_level: self.log_level.to_string().to_lowercase(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Returns the directory holding the database and the session store:
    /// the configured data directory, else the directory of the loaded
    /// configuration file, else the default configuration directory.
    ///
    pub fn data_path(&self) -> Result<PathBuf, AppError> {
        if let Some(data_dir) = &self.data_dir {
            return Ok(data_dir.clone());
        }
        match self.file_path.as_ref().and_then(|path| path.parent()) {
            Some(parent) => Ok(parent.to_path_buf()),
            None => Config::default_path(),
        }
    }

    /// Returns the path of the task database file.
    ///
    pub fn database_path(&self) -> Result<PathBuf, AppError> {
        Ok(self.data_path()?.join(&self.database_name))
    }

    /// Returns the directory backing the session key-value store.
    ///
    pub fn secure_store_path(&self) -> Result<PathBuf, AppError> {
        Ok(self.data_path()?.join(SECURE_STORE_DIRECTORY))
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new();
        assert_eq!(config.database_name, "tareas.db");
        assert_eq!(config.session_key, "session");
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.credentials.matches(DEFAULT_EMAIL, DEFAULT_PASSWORD));
    }

    #[test]
    fn load_without_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.load(dir.path().to_str()).unwrap();
        assert_eq!(config.database_name, "tareas.db");
        assert_eq!(config.data_path().unwrap(), dir.path());
        assert!(!dir.path().join(FILE_NAME).exists());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FILE_NAME),
            "database_name: other.db\nlog_level: debug\ncredentials:\n  email: a@b.c\n  password: secret\n",
        )
        .unwrap();

        let mut config = Config::new();
        config.load(dir.path().to_str()).unwrap();
        assert_eq!(config.database_name, "other.db");
        assert_eq!(config.session_key, "session");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.credentials.matches("a@b.c", "secret"));
        assert_eq!(
            config.database_path().unwrap(),
            dir.path().join("other.db")
        );
    }

    #[test]
    fn load_rejects_unknown_log_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FILE_NAME), "log_level: loud\n").unwrap();

        let mut config = Config::new();
        let result = config.load(dir.path().to_str());
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::InvalidLogLevel(_)))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let mut config = Config::new();
        config.load(nested.to_str()).unwrap();
        config.session_key = "user_session".to_string();
        config.credentials = Credentials::new("x@y.z", "pw");
        config.save().unwrap();

        let mut loaded = Config::new();
        loaded.load(nested.to_str()).unwrap();
        assert_eq!(loaded.session_key, "user_session");
        assert_eq!(loaded.credentials, Credentials::new("x@y.z", "pw"));
    }

    #[test]
    fn save_without_path_fails() {
        let config = Config::new();
        assert!(matches!(
            config.save(),
            Err(AppError::Config(ConfigError::FilePathNotSet))
        ));
    }

    #[test]
    fn data_dir_overrides_paths() {
        let config = Config::new().with_data_dir("/tmp/tareas-test");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/tareas-test/tareas.db")
        );
        assert_eq!(
            config.secure_store_path().unwrap(),
            PathBuf::from("/tmp/tareas-test/secure-store")
        );
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = Credentials::new("a@b.c", "hunter2");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("a@b.c"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn credentials_match_exactly() {
        let credentials = Credentials::new("a@b.c", "pw");
        assert!(credentials.matches("a@b.c", "pw"));
        assert!(!credentials.matches("A@b.c", "pw"));
        assert!(!credentials.matches("a@b.c", "pw "));
        assert!(!credentials.matches("", ""));
    }
}
