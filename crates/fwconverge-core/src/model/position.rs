use serde::{Deserialize, Serialize};

use super::reference::Reference;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    AfterRule,
    BeforeRule,
    FirstInPolicy,
    #[default]
    LastInPolicy,
    FirstInSection,
    LastInSection,
}

impl Position {
    /// Whether `ref` names a sibling rule (as opposed to a section).
    pub fn anchors_on_rule(self) -> bool {
        matches!(self, Self::AfterRule | Self::BeforeRule)
    }

    pub fn anchors_on_section(self) -> bool {
        matches!(self, Self::FirstInSection | Self::LastInSection)
    }

    pub fn needs_reference(self) -> bool {
        self.anchors_on_rule() || self.anchors_on_section()
    }
}

/// Where a rule sits among its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionAnchor {
    pub position: Position,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
}

impl PositionAnchor {
    pub fn new(position: Position, reference: Option<Reference>) -> Self {
        Self {
            position,
            reference,
        }
    }

    pub fn last_in_policy() -> Self {
        Self::new(Position::LastInPolicy, None)
    }
}
