// ── Persisted state ──
//
// Maps each declared rule (by family and name) to the remote ID it was
// converged into, plus the last hydrated read-back. The hydrated rule
// is the prior declaration the next read aligns against.

use std::collections::BTreeMap;
use std::path::Path;

use fwconverge_core::{InternetRule, WanRule};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord<R> {
    pub id: String,
    #[serde(default)]
    pub index: i64,
    pub rule: R,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    pub version: u32,
    pub wan: BTreeMap<String, RuleRecord<WanRule>>,
    pub internet: BTreeMap<String, RuleRecord<InternetRule>>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            wan: BTreeMap::new(),
            internet: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Load a state file. A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file yet");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };
        let state: Self = serde_json::from_str(&text).map_err(|e| ConfigError::parse(path, e))?;
        if state.version > STATE_VERSION {
            return Err(ConfigError::Validation {
                field: "state".into(),
                reason: format!(
                    "{} was written by a newer version (state version {})",
                    path.display(),
                    state.version
                ),
            });
        }
        Ok(state)
    }

    /// Write through a sibling temp file so a crash never leaves a
    /// truncated state behind.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::parse(path, e))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| ConfigError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| ConfigError::io(path, e))?;
        debug!(path = %path.display(), "state saved");
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.wan.is_empty() && self.internet.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fwconverge_core::model::Direction;
    use fwconverge_core::RuleAction;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::load(&dir.path().join("absent.json")).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lab.state.json");
        let mut state = StateFile::default();
        state.wan.insert(
            "block-guest".into(),
            RuleRecord {
                id: "1001".into(),
                index: 3,
                rule: WanRule::new("block-guest", RuleAction::Block, Direction::To),
            },
        );
        state.save(&path).unwrap();

        let loaded = StateFile::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn newer_state_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, r#"{"version": 99}"#).unwrap();
        assert!(matches!(
            StateFile::load(&path),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn corrupt_state_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(StateFile::load(&path), Err(ConfigError::Parse { .. })));
    }
}
