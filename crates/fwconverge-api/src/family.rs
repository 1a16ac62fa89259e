// ── Policy families ──
//
// The WAN and Internet firewalls are served by the same endpoint with
// parallel query shapes. A family marker binds one of them to its
// response type, its input types and its GraphQL field name, so the
// client can stay generic.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::queries;
use crate::types::{
    InternetRuleInput, InternetRuleResponse, InternetRuleUpdateInput, PolicySectionRef,
    WanRuleInput, WanRuleResponse, WanRuleUpdateInput,
};

/// A firewall family served by the policy endpoint.
pub trait PolicyFamily: Send + Sync + 'static {
    /// GraphQL field under `policy { ... }`, e.g. `wanFirewall`.
    const FIELD: &'static str;
    /// Prefix of the family's mutation input type names.
    const TYPE_PREFIX: &'static str;
    /// Human-readable label for logs and CLI output.
    const LABEL: &'static str;
    /// Selection set for one rule, exceptions included.
    const RULE_SELECTION: &'static str;

    type Rule: DeserializeOwned + Serialize + Clone + Debug + Send + Sync + 'static;
    type RuleInput: Serialize + Clone + Debug + Send + Sync + 'static;
    type RuleUpdateInput: Serialize + Clone + Debug + Default + Send + Sync + 'static;

    fn rule_id(rule: &Self::Rule) -> &str;
    fn rule_name(rule: &Self::Rule) -> &str;
    fn rule_index(rule: &Self::Rule) -> i64;
    fn rule_section(rule: &Self::Rule) -> Option<&PolicySectionRef>;
}

/// Marker for the WAN firewall family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WanFirewall;

/// Marker for the Internet firewall family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternetFirewall;

impl PolicyFamily for WanFirewall {
    const FIELD: &'static str = "wanFirewall";
    const TYPE_PREFIX: &'static str = "WanFirewall";
    const LABEL: &'static str = "WAN firewall";
    const RULE_SELECTION: &'static str = queries::WAN_RULE_SELECTION;

    type Rule = WanRuleResponse;
    type RuleInput = WanRuleInput;
    type RuleUpdateInput = WanRuleUpdateInput;

    fn rule_id(rule: &WanRuleResponse) -> &str {
        &rule.id
    }

    fn rule_name(rule: &WanRuleResponse) -> &str {
        &rule.name
    }

    fn rule_index(rule: &WanRuleResponse) -> i64 {
        rule.index
    }

    fn rule_section(rule: &WanRuleResponse) -> Option<&PolicySectionRef> {
        rule.section.as_ref()
    }
}

impl PolicyFamily for InternetFirewall {
    const FIELD: &'static str = "internetFirewall";
    const TYPE_PREFIX: &'static str = "InternetFirewall";
    const LABEL: &'static str = "Internet firewall";
    const RULE_SELECTION: &'static str = queries::INTERNET_RULE_SELECTION;

    type Rule = InternetRuleResponse;
    type RuleInput = InternetRuleInput;
    type RuleUpdateInput = InternetRuleUpdateInput;

    fn rule_id(rule: &InternetRuleResponse) -> &str {
        &rule.id
    }

    fn rule_name(rule: &InternetRuleResponse) -> &str {
        &rule.name
    }

    fn rule_index(rule: &InternetRuleResponse) -> i64 {
        rule.index
    }

    fn rule_section(rule: &InternetRuleResponse) -> Option<&PolicySectionRef> {
        rule.section.as_ref()
    }
}
