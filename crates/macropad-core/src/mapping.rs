// Macropad Action Mapping
// JSON configuration of key -> command, consumed at dispatch time

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::key::{key_from_name, Key};

/// Result type for action-mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Errors from loading or validating an action mapping
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown key name in config: {0}")]
    UnknownKey(String),

    #[error("empty action for key {0}")]
    EmptyAction(String),
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "ActionMapping")]
    action_mapping: Vec<ConfigEntry>,
}

#[derive(Debug, Deserialize)]
struct ConfigEntry {
    #[serde(rename = "KeyCode")]
    key_code: String,
    #[serde(rename = "Action")]
    action: Vec<String>,
}

/// Mapping from key code to the command to run on its release.
///
/// Loaded from a JSON file of the shape:
///
/// ```json
/// {
///     "ActionMapping": [
///         { "KeyCode": "KEY_KP1", "Action": ["whoami"] },
///         { "KeyCode": "KEY_KP2", "Action": ["echo", "Hello World!"] }
///     ]
/// }
/// ```
///
/// The mapping is read-only once loaded. Keys without an entry are a
/// no-op at dispatch time, not an error.
#[derive(Debug, Default)]
pub struct ActionMap {
    actions: HashMap<Key, Vec<String>>,
}

impl ActionMap {
    /// Load and validate a mapping from a JSON config file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> MappingResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a mapping from JSON text
    pub fn from_json_str(text: &str) -> MappingResult<Self> {
        let config: ConfigFile = serde_json::from_str(text)?;

        let mut actions = HashMap::new();
        for entry in config.action_mapping {
            let key = key_from_name(&entry.key_code)
                .ok_or_else(|| MappingError::UnknownKey(entry.key_code.clone()))?;
            if entry.action.is_empty() || entry.action[0].is_empty() {
                return Err(MappingError::EmptyAction(entry.key_code));
            }
            if actions.insert(key, entry.action).is_some() {
                log::warn!("duplicate mapping for {}, keeping the last one", entry.key_code);
            }
        }

        Ok(Self { actions })
    }

    /// Command mapped to `key`, if any
    pub fn lookup(&self, key: Key) -> Option<&[String]> {
        self.actions.get(&key).map(Vec::as_slice)
    }

    /// Number of mapped keys
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if no keys are mapped
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    {
        "ActionMapping": [
            { "KeyCode": "KEY_KP1", "Action": ["whoami"] },
            { "KeyCode": "KEY_KP2", "Action": ["echo", "Hello World!"] }
        ]
    }
    "#;

    #[test]
    fn test_parse_sample_config() {
        let map = ActionMap::from_json_str(SAMPLE).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.lookup(Key::from(79)),
            Some(&["whoami".to_string()][..])
        );
        assert_eq!(
            map.lookup(Key::from(80)),
            Some(&["echo".to_string(), "Hello World!".to_string()][..])
        );
    }

    #[test]
    fn test_unmapped_key_is_none() {
        let map = ActionMap::from_json_str(SAMPLE).unwrap();
        assert_eq!(map.lookup(Key::from(30)), None);
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let text = r#"{ "ActionMapping": [ { "KeyCode": "KEY_NOPE", "Action": ["ls"] } ] }"#;
        match ActionMap::from_json_str(text) {
            Err(MappingError::UnknownKey(name)) => assert_eq!(name, "KEY_NOPE"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_action_is_rejected() {
        let text = r#"{ "ActionMapping": [ { "KeyCode": "KEY_KP1", "Action": [] } ] }"#;
        assert!(matches!(
            ActionMap::from_json_str(text),
            Err(MappingError::EmptyAction(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            ActionMap::from_json_str("{ not json"),
            Err(MappingError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        assert!(matches!(
            ActionMap::from_json_path("/no/such/config.json"),
            Err(MappingError::Io { .. })
        ));
    }
}
