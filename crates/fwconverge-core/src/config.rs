// ── Engine configuration ──
//
// Knobs the convergence controller reads. Built by the binary from the
// user's profile; every field has a working default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::PositionAnchor;

/// Display names of socket ports, keyed by socket model and port ID.
///
/// The remote sometimes returns a network interface with only its socket
/// model and port ID; hydration fills the name from this table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceNames(HashMap<String, HashMap<String, String>>);

const BUILTIN_INTERFACES: &[(&str, &[(&str, &str)])] = &[
    (
        "X1500",
        &[("INT_1", "WAN 1"), ("INT_2", "WAN 2"), ("INT_3", "LAN 1"), ("INT_4", "LAN 2")],
    ),
    (
        "X1600",
        &[
            ("INT_1", "WAN 1"),
            ("INT_2", "WAN 2"),
            ("INT_3", "LAN 1"),
            ("INT_4", "LAN 2"),
            ("INT_5", "LAN 3"),
            ("INT_6", "LAN 4"),
            ("INT_7", "LAN 5"),
            ("INT_8", "LAN 6"),
        ],
    ),
    (
        "X1700",
        &[
            ("INT_1", "WAN 1"),
            ("INT_2", "WAN 2"),
            ("INT_3", "LAN 1"),
            ("INT_4", "LAN 2"),
            ("INT_9", "SFP 1"),
            ("INT_10", "SFP 2"),
        ],
    ),
    ("VSOCKET_AWS1500", &[("INT_1", "WAN 1"), ("INT_2", "LAN 1")]),
    ("VSOCKET_AZ1500", &[("INT_1", "WAN 1"), ("INT_2", "LAN 1")]),
    ("VSOCKET_VGX", &[("INT_1", "WAN 1"), ("INT_2", "LAN 1")]),
];

impl InterfaceNames {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn lookup(&self, socket_model: &str, interface_id: &str) -> Option<&str> {
        self.0
            .get(socket_model)
            .and_then(|ports| ports.get(interface_id))
            .map(String::as_str)
    }

    pub fn insert(
        &mut self,
        socket_model: impl Into<String>,
        interface_id: impl Into<String>,
        name: impl Into<String>,
    ) {
        self.0
            .entry(socket_model.into())
            .or_default()
            .insert(interface_id.into(), name.into());
    }

    /// Overlay `other` on top of `self`.
    pub fn extend(&mut self, other: &Self) {
        for (model, ports) in &other.0 {
            for (id, name) in ports {
                self.insert(model.clone(), id.clone(), name.clone());
            }
        }
    }
}

impl Default for InterfaceNames {
    fn default() -> Self {
        let mut table = Self::empty();
        for (model, ports) in BUILTIN_INTERFACES {
            for (id, name) in *ports {
                table.insert(*model, *id, *name);
            }
        }
        table
    }
}

/// Publish step settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// Publish after every mutation. Turning this off leaves changes
    /// pending in the remote draft revision.
    pub enabled: bool,
    pub revision_name: Option<String>,
    pub revision_description: Option<String>,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            revision_name: None,
            revision_description: None,
        }
    }
}

/// Configuration for the convergence controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where `addRule` places a new rule before any move.
    pub creation_position: PositionAnchor,
    pub publish: PublishSettings,
    pub interfaces: InterfaceNames,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    #[test]
    fn builtin_table_knows_common_sockets() {
        let names = InterfaceNames::default();
        assert_eq!(names.lookup("X1500", "INT_1"), Some("WAN 1"));
        assert_eq!(names.lookup("X1500", "INT_99"), None);
    }

    #[test]
    fn extend_overrides_builtin_entries() {
        let mut names = InterfaceNames::default();
        let mut custom = InterfaceNames::empty();
        custom.insert("X1500", "INT_1", "Primary uplink");
        names.extend(&custom);
        assert_eq!(names.lookup("X1500", "INT_1"), Some("Primary uplink"));
        assert_eq!(names.lookup("X1500", "INT_2"), Some("WAN 2"));
    }

    #[test]
    fn defaults_create_last_and_publish() {
        let config = EngineConfig::default();
        assert_eq!(config.creation_position.position, Position::LastInPolicy);
        assert!(config.publish.enabled);
    }
}
