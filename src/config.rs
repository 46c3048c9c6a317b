//! Bridge configuration.
//!
//! The host owns loading (files, env, CLI); this crate only defines the shape
//! and its defaults and turns it into a bus via [`crate::BusBuilder::from_config`].

use serde::Deserialize;

use crate::error::Result;
use crate::IPC::DEFAULT_CHUNK_SIZE;

/// Settings for a bus instance.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Tag stamped on every message the bus builds.
    pub sender: Option<String>,
    /// Starting chunk size for stream writers, in bytes.
    pub stream_chunk_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sender: None,
            stream_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document the host has already loaded.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.stream_chunk_size, 4096);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config =
            BridgeConfig::from_json(r#"{"sender":"host","stream_chunk_size":512}"#).unwrap();
        assert_eq!(config.sender.as_deref(), Some("host"));
        assert_eq!(config.stream_chunk_size, 512);
    }

    #[test]
    fn malformed_json_is_a_codec_error() {
        let err = BridgeConfig::from_json("{").unwrap_err();
        assert!(matches!(err, crate::BridgeError::Codec(_)));
    }
}
