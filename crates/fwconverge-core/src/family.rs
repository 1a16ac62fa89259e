// ── Rule families ──
//
// Binds each wire-level policy family to its declared rule type, its
// hydrator and its payload builder, so the controller stays generic over
// WAN and Internet rules.

use std::fmt::Debug;

use fwconverge_api::{InternetFirewall, PolicyFamily, WanFirewall};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::drift::{Converge, FieldDrift};
use crate::error::CoreError;
use crate::hydrate::{self, Hydrator};
use crate::model::{InternetRule, PositionAnchor, WanRule};
use crate::payload;

pub trait RuleFamily: PolicyFamily {
    type Declared: Clone
        + Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Converge
        + Send
        + Sync
        + 'static;

    /// Read a remote rule back into the declared shape. `prior` is the
    /// declaration it was converged from, if any.
    fn hydrate(
        remote: &Self::Rule,
        prior: Option<&Self::Declared>,
        h: &mut Hydrator<'_>,
    ) -> Self::Declared;

    fn build_create(declared: &Self::Declared) -> Result<Self::RuleInput, CoreError>;

    fn build_update(declared: &Self::Declared) -> Result<Self::RuleUpdateInput, CoreError>;

    fn declared_name(declared: &Self::Declared) -> &str;

    fn declared_position(declared: &Self::Declared) -> Option<&PositionAnchor>;

    fn drift(declared: &Self::Declared, observed: &Self::Declared) -> Vec<FieldDrift> {
        let mut out = Vec::new();
        declared.drift(observed, "", &mut out);
        out
    }

    /// Observed values an update built from `declared` would clear.
    fn resets(declared: &Self::Declared, observed: &Self::Declared) -> Vec<FieldDrift> {
        let mut out = Vec::new();
        declared.resets(observed, "", &mut out);
        out
    }
}

impl RuleFamily for WanFirewall {
    type Declared = WanRule;

    fn hydrate(remote: &Self::Rule, prior: Option<&WanRule>, h: &mut Hydrator<'_>) -> WanRule {
        hydrate::wan::rule(h, remote, prior)
    }

    fn build_create(declared: &WanRule) -> Result<Self::RuleInput, CoreError> {
        payload::wan::create(declared)
    }

    fn build_update(declared: &WanRule) -> Result<Self::RuleUpdateInput, CoreError> {
        payload::wan::update(declared)
    }

    fn declared_name(declared: &WanRule) -> &str {
        &declared.name
    }

    fn declared_position(declared: &WanRule) -> Option<&PositionAnchor> {
        declared.position.as_ref()
    }
}

impl RuleFamily for InternetFirewall {
    type Declared = InternetRule;

    fn hydrate(
        remote: &Self::Rule,
        prior: Option<&InternetRule>,
        h: &mut Hydrator<'_>,
    ) -> InternetRule {
        hydrate::internet::rule(h, remote, prior)
    }

    fn build_create(declared: &InternetRule) -> Result<Self::RuleInput, CoreError> {
        payload::internet::create(declared)
    }

    fn build_update(declared: &InternetRule) -> Result<Self::RuleUpdateInput, CoreError> {
        payload::internet::update(declared)
    }

    fn declared_name(declared: &InternetRule) -> &str {
        &declared.name
    }

    fn declared_position(declared: &InternetRule) -> Option<&PositionAnchor> {
        declared.position.as_ref()
    }
}
