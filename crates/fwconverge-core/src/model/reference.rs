// ── References ──
//
// A reference points at a remote object either by its stable ID or by
// its display name. Which of the two the operator wrote is part of the
// declared configuration and must survive a read-back.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RefMode {
    ById,
    ByName,
}

/// A remote object pointer. Declared as `{ id = "..." }` or `{ name = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ReferenceRepr", into = "ReferenceRepr")]
pub struct Reference {
    pub mode: RefMode,
    pub value: String,
}

impl Reference {
    pub fn by_id(value: impl Into<String>) -> Self {
        Self {
            mode: RefMode::ById,
            value: value.into(),
        }
    }

    pub fn by_name(value: impl Into<String>) -> Self {
        Self {
            mode: RefMode::ByName,
            value: value.into(),
        }
    }

    pub fn is_by_id(&self) -> bool {
        self.mode == RefMode::ById
    }

    /// Whether this reference designates an object with the given identity.
    pub fn designates(&self, id: Option<&str>, name: Option<&str>) -> bool {
        let candidate = match self.mode {
            RefMode::ById => id,
            RefMode::ByName => name,
        };
        candidate.is_some_and(|c| !c.is_empty() && c == self.value)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            RefMode::ById => write!(f, "id:{}", self.value),
            RefMode::ByName => write!(f, "name:{}", self.value),
        }
    }
}

// ── Serialized form ─────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl TryFrom<ReferenceRepr> for Reference {
    type Error = String;

    fn try_from(repr: ReferenceRepr) -> Result<Self, Self::Error> {
        match (repr.id, repr.name) {
            (Some(id), None) => Ok(Self::by_id(id)),
            (None, Some(name)) => Ok(Self::by_name(name)),
            (Some(_), Some(_)) => Err("a reference sets either `id` or `name`, not both".into()),
            (None, None) => Err("a reference needs `id` or `name`".into()),
        }
    }
}

impl From<Reference> for ReferenceRepr {
    fn from(reference: Reference) -> Self {
        match reference.mode {
            RefMode::ById => Self {
                id: Some(reference.value),
                name: None,
            },
            RefMode::ByName => Self {
                id: None,
                name: Some(reference.value),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_either_form() {
        let by_id: Reference = serde_json::from_value(json!({ "id": "12" })).unwrap();
        assert_eq!(by_id, Reference::by_id("12"));
        let by_name: Reference = serde_json::from_value(json!({ "name": "HQ" })).unwrap();
        assert_eq!(by_name, Reference::by_name("HQ"));
    }

    #[test]
    fn rejects_ambiguous_or_blank_forms() {
        assert!(serde_json::from_value::<Reference>(json!({ "id": "1", "name": "x" })).is_err());
        assert!(serde_json::from_value::<Reference>(json!({})).is_err());
    }

    #[test]
    fn serializes_only_the_active_mode() {
        let value = serde_json::to_value(Reference::by_name("HQ")).unwrap();
        assert_eq!(value, json!({ "name": "HQ" }));
    }

    #[test]
    fn designates_matches_on_active_mode_only() {
        let r = Reference::by_name("HQ");
        assert!(r.designates(Some("7"), Some("HQ")));
        assert!(!r.designates(Some("HQ"), None));
    }
}
