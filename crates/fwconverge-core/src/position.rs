// ── Rule placement ──
//
// Position anchors are relative ("after rule X", "first in section Y").
// Checking one needs the live rule order, so the controller snapshots it
// from the policy document into a `Layout` and asks it two things: which
// remote IDs the anchor names, and whether a rule already sits where the
// anchor says.

use fwconverge_api::PolicyFamily;
use fwconverge_api::types::{PolicyDocument, PositionInput, RemoteObject};

use crate::error::{CoreError, ErrorEntry};
use crate::model::{Position, PositionAnchor, Reference};

/// An anchor with its reference resolved to a remote ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub position: Position,
    pub reference: Option<String>,
}

impl Target {
    pub(crate) fn to_input(&self) -> PositionInput {
        PositionInput {
            position: self.position.to_string(),
            reference: self.reference.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: String,
    name: String,
    section: Option<String>,
}

/// Snapshot of rule order and sections.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    rules: Vec<Slot>,
    sections: Vec<(String, String)>,
}

impl Layout {
    pub(crate) fn from_document<F: PolicyFamily>(document: &PolicyDocument<F::Rule>) -> Self {
        let mut ordered: Vec<&F::Rule> = document.rules.iter().map(|entry| &entry.rule).collect();
        ordered.sort_by_key(|rule| F::rule_index(rule));
        let rules = ordered
            .into_iter()
            .map(|rule| Slot {
                id: F::rule_id(rule).to_owned(),
                name: F::rule_name(rule).to_owned(),
                section: F::rule_section(rule).and_then(|s| s.id().map(str::to_owned)),
            })
            .collect();
        let sections = document
            .sections
            .iter()
            .filter_map(|entry| {
                let id = entry.section.id()?;
                Some((id.to_owned(), entry.section.name().unwrap_or_default().to_owned()))
            })
            .collect();
        Self { rules, sections }
    }

    pub(crate) fn contains(&self, rule_id: &str) -> bool {
        self.rules.iter().any(|slot| slot.id == rule_id)
    }

    /// Resolve the anchor's reference. Name references need this layout;
    /// ID references pass through untouched.
    pub(crate) fn resolve(&self, anchor: &PositionAnchor) -> Result<Target, CoreError> {
        validate(anchor)?;
        let reference = match &anchor.reference {
            None => None,
            Some(reference) if reference.is_by_id() => Some(reference.value.clone()),
            Some(reference) if anchor.position.anchors_on_rule() => Some(self.rule_id(reference)?),
            Some(reference) => Some(self.section_id(reference)?),
        };
        Ok(Target {
            position: anchor.position,
            reference,
        })
    }

    fn rule_id(&self, reference: &Reference) -> Result<String, CoreError> {
        let mut hits = self.rules.iter().filter(|slot| slot.name == reference.value);
        match (hits.next(), hits.next()) {
            (Some(slot), None) => Ok(slot.id.clone()),
            (Some(_), Some(_)) => Err(CoreError::Validation {
                entries: vec![ErrorEntry::new(
                    "AMBIGUOUS_POSITION",
                    format!("position.ref: more than one rule is named {:?}", reference.value),
                )],
            }),
            (None, _) => Err(CoreError::NotFound {
                entity: "rule".into(),
                identifier: reference.value.clone(),
            }),
        }
    }

    fn section_id(&self, reference: &Reference) -> Result<String, CoreError> {
        self.sections
            .iter()
            .find(|(_, name)| *name == reference.value)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| CoreError::NotFound {
                entity: "section".into(),
                identifier: reference.value.clone(),
            })
    }

    /// Whether `rule_id` already sits where `target` says.
    pub(crate) fn satisfies(&self, rule_id: &str, target: &Target) -> bool {
        let Some(index) = self.rules.iter().position(|slot| slot.id == rule_id) else {
            return false;
        };
        let before = index.checked_sub(1).and_then(|i| self.rules.get(i));
        let after = self.rules.get(index + 1);
        let reference = target.reference.as_deref();
        let section = self.rules.get(index).and_then(|slot| slot.section.as_deref());
        match target.position {
            Position::FirstInPolicy => index == 0,
            Position::LastInPolicy => index + 1 == self.rules.len(),
            Position::AfterRule => before.is_some_and(|slot| Some(slot.id.as_str()) == reference),
            Position::BeforeRule => after.is_some_and(|slot| Some(slot.id.as_str()) == reference),
            Position::FirstInSection => {
                section.is_some() && section == reference
                    && before.is_none_or(|slot| slot.section.as_deref() != section)
            }
            Position::LastInSection => {
                section.is_some() && section == reference
                    && after.is_none_or(|slot| slot.section.as_deref() != section)
            }
        }
    }
}

/// Whether resolving the anchor needs the live layout.
pub(crate) fn needs_layout(anchor: &PositionAnchor) -> bool {
    anchor
        .reference
        .as_ref()
        .is_some_and(|reference| !reference.is_by_id())
}

/// An anchor carries a reference exactly when its position needs one.
pub(crate) fn validate(anchor: &PositionAnchor) -> Result<(), CoreError> {
    let message = match (&anchor.reference, anchor.position.needs_reference()) {
        (None, true) => format!("{} needs a ref", anchor.position),
        (Some(_), false) => format!("{} takes no ref", anchor.position),
        (Some(reference), true) if reference.value.trim().is_empty() => {
            format!("{} has an empty ref", anchor.position)
        }
        _ => return Ok(()),
    };
    Err(CoreError::Validation {
        entries: vec![ErrorEntry::new("INVALID_POSITION", format!("position: {message}"))],
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fwconverge_api::WanFirewall;
    use fwconverge_api::types::{
        PolicyRuleEntry, PolicySectionEntry, PolicySectionRef, WanRuleResponse,
    };

    fn document() -> PolicyDocument<WanRuleResponse> {
        let rule = |id: &str, index: i64, section: &str| PolicyRuleEntry {
            rule: WanRuleResponse {
                id: id.into(),
                name: format!("rule-{id}"),
                index,
                section: Some(PolicySectionRef::new(section, format!("section-{section}"))),
                ..WanRuleResponse::default()
            },
            properties: Vec::new(),
        };
        PolicyDocument {
            rules: vec![rule("c", 3, "s2"), rule("a", 1, "s1"), rule("b", 2, "s1")],
            sections: vec![
                PolicySectionEntry {
                    section: PolicySectionRef::new("s1", "section-s1"),
                    properties: Vec::new(),
                },
                PolicySectionEntry {
                    section: PolicySectionRef::new("s2", "section-s2"),
                    properties: Vec::new(),
                },
            ],
            ..PolicyDocument::default()
        }
    }

    fn target(position: Position, reference: Option<&str>) -> Target {
        Target {
            position,
            reference: reference.map(str::to_owned),
        }
    }

    #[test]
    fn rules_are_ordered_by_index() {
        let layout = Layout::from_document::<WanFirewall>(&document());
        assert!(layout.satisfies("a", &target(Position::FirstInPolicy, None)));
        assert!(layout.satisfies("c", &target(Position::LastInPolicy, None)));
        assert!(layout.satisfies("b", &target(Position::AfterRule, Some("a"))));
        assert!(layout.satisfies("a", &target(Position::BeforeRule, Some("b"))));
        assert!(!layout.satisfies("c", &target(Position::AfterRule, Some("a"))));
    }

    #[test]
    fn section_edges() {
        let layout = Layout::from_document::<WanFirewall>(&document());
        assert!(layout.satisfies("a", &target(Position::FirstInSection, Some("s1"))));
        assert!(layout.satisfies("b", &target(Position::LastInSection, Some("s1"))));
        assert!(!layout.satisfies("b", &target(Position::FirstInSection, Some("s1"))));
        assert!(layout.satisfies("c", &target(Position::FirstInSection, Some("s2"))));
    }

    #[test]
    fn names_resolve_to_ids() {
        let layout = Layout::from_document::<WanFirewall>(&document());
        let anchor = PositionAnchor::new(Position::AfterRule, Some(Reference::by_name("rule-b")));
        assert_eq!(layout.resolve(&anchor).unwrap().reference.as_deref(), Some("b"));
        let anchor =
            PositionAnchor::new(Position::LastInSection, Some(Reference::by_name("section-s2")));
        assert_eq!(layout.resolve(&anchor).unwrap().reference.as_deref(), Some("s2"));
        let missing = PositionAnchor::new(Position::AfterRule, Some(Reference::by_name("nope")));
        assert!(matches!(
            layout.resolve(&missing),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn anchor_shape_is_checked() {
        assert!(validate(&PositionAnchor::new(Position::AfterRule, None)).is_err());
        assert!(
            validate(&PositionAnchor::new(
                Position::FirstInPolicy,
                Some(Reference::by_id("x"))
            ))
            .is_err()
        );
        assert!(validate(&PositionAnchor::last_in_policy()).is_ok());
        assert!(!needs_layout(&PositionAnchor::new(
            Position::AfterRule,
            Some(Reference::by_id("x"))
        )));
    }
}
