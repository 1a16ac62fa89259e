// ── Declarative rule files ──
//
// One file holds both families:
//
//   [[wan_rules]]
//   name = "block-guest"
//   action = "BLOCK"
//   direction = "TO"
//   source = { site = [{ name = "Guest" }] }
//
// YAML files use the same keys. Rule names key the state file, so they
// must be unique within a family.

use std::collections::HashSet;
use std::path::Path;

use fwconverge_core::{InternetRule, WanRule};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Toml,
    Yaml,
}

impl RuleFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            other => Err(ConfigError::Validation {
                field: "rules".into(),
                reason: format!(
                    "{}: expected a .toml, .yaml or .yml file, got {:?}",
                    path.display(),
                    other.unwrap_or_default()
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleFile {
    pub wan_rules: Vec<WanRule>,
    pub internet_rules: Vec<InternetRule>,
}

impl RuleFile {
    pub fn is_empty(&self) -> bool {
        self.wan_rules.is_empty() && self.internet_rules.is_empty()
    }

    fn check_unique_names(&self) -> Result<(), ConfigError> {
        let families = [
            ("wan_rules", self.wan_rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>()),
            (
                "internet_rules",
                self.internet_rules.iter().map(|r| r.name.as_str()).collect(),
            ),
        ];
        for (family, names) in families {
            let mut seen = HashSet::new();
            for name in names {
                if name.trim().is_empty() {
                    return Err(ConfigError::Validation {
                        field: family.into(),
                        reason: "every rule needs a name".into(),
                    });
                }
                if !seen.insert(name) {
                    return Err(ConfigError::Validation {
                        field: family.into(),
                        reason: format!("rule name '{name}' is used more than once"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read and parse a rule file, picking the format from its extension.
pub fn load_rules(path: &Path) -> Result<RuleFile, ConfigError> {
    let format = RuleFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_rules(&text, format).map_err(|err| match err {
        ConfigError::Parse { message, .. } => ConfigError::parse(path, message),
        other => other,
    })
}

pub fn parse_rules(text: &str, format: RuleFormat) -> Result<RuleFile, ConfigError> {
    let origin = Path::new("<rules>");
    let file: RuleFile = match format {
        RuleFormat::Toml => toml::from_str(text).map_err(|e| ConfigError::parse(origin, e))?,
        RuleFormat::Yaml => serde_yaml::from_str(text).map_err(|e| ConfigError::parse(origin, e))?,
    };
    file.check_unique_names()?;
    Ok(file)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fwconverge_core::{Position, Reference, RuleAction, TriState};

    #[test]
    fn toml_rules_keep_unset_and_empty_apart() {
        let file = parse_rules(
            r#"
[[wan_rules]]
name = "block-guest"
action = "BLOCK"
direction = "TO"
position = { position = "FIRST_IN_SECTION", ref = { name = "Guests" } }
source = { site = [{ name = "Guest" }], ip = [] }

[[internet_rules]]
name = "allow-updates"
action = "ALLOW"
destination = { domain = ["updates.example.com"] }
"#,
            RuleFormat::Toml,
        )
        .unwrap();

        let wan = &file.wan_rules[0];
        assert_eq!(wan.action, RuleAction::Block);
        let source = wan.source.as_ref().unwrap();
        assert_eq!(source.site, TriState::from_vec(vec![Reference::by_name("Guest")]));
        assert_eq!(source.ip, TriState::Empty);
        assert!(source.subnet.is_unset());
        let anchor = wan.position.as_ref().unwrap();
        assert_eq!(anchor.position, Position::FirstInSection);
        assert_eq!(file.internet_rules.len(), 1);
    }

    #[test]
    fn yaml_rules_parse() {
        let file = parse_rules(
            "
internet_rules:
  - name: block-social
    action: BLOCK
    exceptions:
      - name: marketing
        source:
          users_group:
            - name: Marketing
",
            RuleFormat::Yaml,
        )
        .unwrap();
        let rule = &file.internet_rules[0];
        assert_eq!(rule.exceptions.len(), 1);
        assert!(file.wan_rules.is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse_rules(
            r#"
[[wan_rules]]
name = "dup"
action = "BLOCK"
direction = "TO"

[[wan_rules]]
name = "dup"
action = "ALLOW"
direction = "TO"
"#,
            RuleFormat::Toml,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = parse_rules("[[wan_rulez]]\nname = \"x\"\n", RuleFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(RuleFormat::from_path(Path::new("a.yml")).unwrap(), RuleFormat::Yaml);
        assert_eq!(RuleFormat::from_path(Path::new("a.toml")).unwrap(), RuleFormat::Toml);
        assert!(RuleFormat::from_path(Path::new("a.json")).is_err());
    }
}
