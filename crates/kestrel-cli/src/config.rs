//! Configuration system for the KESTREL CLI.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// KESTREL configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Hash defaults
    #[serde(default)]
    pub hash: HashDefaults,
    /// Input configuration
    #[serde(default)]
    pub io: IoConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default hash parameters, overridable on the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashDefaults {
    /// Digest length in bytes
    #[serde(default = "default_digest_length")]
    pub digest_length: usize,
    /// Salt (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// Personalization (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal: Option<String>,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// Read buffer size in bytes
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values

fn default_digest_length() -> usize {
    kestrel_blake2b::MAX_DIGEST_SIZE
}

fn default_read_buffer_size() -> usize {
    kestrel_blake2b::io::READ_BUFFER_SIZE
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for HashDefaults {
    fn default() -> Self {
        Self {
            digest_length: default_digest_length(),
            salt: None,
            personal: None,
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get default config path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("kestrel/config.toml")
    }

    /// Load config from the default path, or fall back to built-in defaults
    ///
    /// Unlike [`Config::save`], this never writes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be parsed.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = Self::default_path();

        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Decoded default salt
    ///
    /// # Errors
    ///
    /// Returns an error if the configured salt is not valid hex.
    pub fn salt_bytes(&self) -> anyhow::Result<Vec<u8>> {
        decode_optional_hex(self.hash.salt.as_deref(), "salt")
    }

    /// Decoded default personalization
    ///
    /// # Errors
    ///
    /// Returns an error if the configured personalization is not valid hex.
    pub fn personal_bytes(&self) -> anyhow::Result<Vec<u8>> {
        decode_optional_hex(self.hash.personal.as_deref(), "personal")
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Salt, personalization and digest length go through the library's
        // own parameter checks
        kestrel_blake2b::configure(
            self.hash.digest_length,
            b"",
            &self.salt_bytes()?,
            &self.personal_bytes()?,
        )?;

        // Validate read buffer size
        if self.io.read_buffer_size == 0 || self.io.read_buffer_size > 16 * 1024 * 1024 {
            anyhow::bail!("Read buffer size must be between 1 byte and 16MB");
        }

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }
}

fn decode_optional_hex(value: Option<&str>, name: &str) -> anyhow::Result<Vec<u8>> {
    match value {
        Some(hex_str) => hex::decode(hex_str)
            .map_err(|e| anyhow::anyhow!("Invalid {} hex '{}': {}", name, hex_str, e)),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hash.digest_length, 64);
        assert_eq!(config.io.read_buffer_size, 64 * 1024);
        assert_eq!(config.logging.level, "warn");
        assert!(config.hash.salt.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        // Invalid digest length
        config.hash.digest_length = 65;
        assert!(config.validate().is_err());

        // Salt too long
        config.hash.digest_length = 32;
        config.hash.salt = Some("00".repeat(17));
        assert!(config.validate().is_err());

        // Salt not hex
        config.hash.salt = Some("zz".to_string());
        assert!(config.validate().is_err());

        // Invalid read buffer size
        config.hash.salt = None;
        config.io.read_buffer_size = 0;
        assert!(config.validate().is_err());

        // Invalid log level
        config.io.read_buffer_size = 4096;
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[hash]\ndigest_length = 32\n").unwrap();
        assert_eq!(config.hash.digest_length, 32);
        assert_eq!(config.io.read_buffer_size, 64 * 1024);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = Config::default();
        config.hash.personal = Some(hex::encode(b"kestrel"));
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.hash.digest_length, deserialized.hash.digest_length);
        assert_eq!(deserialized.personal_bytes().unwrap(), b"kestrel");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.hash.digest_length = 20;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.hash.digest_length, 20);
    }
}
