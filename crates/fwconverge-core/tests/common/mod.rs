#![allow(clippy::unwrap_used, dead_code)]

// In-memory policy endpoint.
//
// Behaves like the remote as far as the controller can tell: rules are
// kept in policy order, name references are resolved into `{ id, name }`
// objects, updates only touch the fields they carry, and every mutation
// answers with a status block. Failures can be queued per operation.

use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::Mutex;

use fwconverge_api::types::{
    AddRuleInput, MoveRuleInput, MutationError, MutationStatus, PolicyDocument, PolicyRuleEntry,
    PolicySectionEntry, PolicySectionRef, PositionInput, PublishInput, RemoveRuleInput,
    RuleMutationPayload, UpdateRuleInput,
};
use fwconverge_api::{Error, PolicyFamily};
use fwconverge_core::PolicyApi;
use serde_json::{Value, json};

#[derive(Default)]
struct FamilyState {
    rules: Vec<Value>,
    sections: Vec<(String, String)>,
    pending: bool,
    revisions: usize,
}

#[derive(Default)]
struct State {
    families: HashMap<&'static str, FamilyState>,
    calls: Vec<(String, Value)>,
    failures: HashMap<String, Vec<MutationError>>,
    next_id: usize,
}

#[derive(Default)]
pub struct FakePolicy {
    state: Mutex<State>,
}

impl FakePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a rule in response shape. Returns its ID.
    pub fn seed<F: PolicyFamily>(&self, mut rule: Value) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("rule-{}", state.next_id);
        rule["id"] = json!(id);
        state.families.entry(F::FIELD).or_default().rules.push(rule);
        id
    }

    pub fn add_section<F: PolicyFamily>(&self, id: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .families
            .entry(F::FIELD)
            .or_default()
            .sections
            .push((id.to_owned(), name.to_owned()));
    }

    /// Remove a rule behind the controller's back.
    pub fn drop_rule<F: PolicyFamily>(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(family) = state.families.get_mut(F::FIELD) {
            family.rules.retain(|rule| rule["id"] != id);
        }
    }

    /// The next call to `operation` is rejected with `errors`.
    pub fn fail_next(&self, operation: &str, errors: &[(&str, &str)]) {
        let errors = errors
            .iter()
            .map(|(code, message)| MutationError {
                error_code: Some((*code).to_owned()),
                error_message: Some((*message).to_owned()),
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation.to_owned(), errors);
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Input of the last call to `operation`.
    pub fn last_input(&self, operation: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find(|(name, _)| name == operation)
            .map(|(_, input)| input.clone())
    }

    /// Current remote rule, in response shape.
    pub fn rule<F: PolicyFamily>(&self, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .families
            .get(F::FIELD)?
            .rules
            .iter()
            .find(|rule| rule["id"] == id)
            .cloned()
    }

    /// Rule IDs in policy order.
    pub fn order<F: PolicyFamily>(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .families
            .get(F::FIELD)
            .map(|family| {
                family
                    .rules
                    .iter()
                    .map(|rule| rule["id"].as_str().unwrap_or_default().to_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn revisions<F: PolicyFamily>(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.families.get(F::FIELD).map_or(0, |f| f.revisions)
    }

    pub fn has_pending<F: PolicyFamily>(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.families.get(F::FIELD).is_some_and(|f| f.pending)
    }

    fn record(&self, operation: &str, input: Value) -> Option<Vec<MutationError>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((operation.to_owned(), input));
        state.failures.remove(operation)
    }
}

// ── Wire emulation ──────────────────────────────────────────────────

/// `{ by, input }` becomes `{ id, name }`; names map to `id-<name>` and
/// IDs to `name-<id>`.
fn materialize(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 2 && map.contains_key("by") && map.contains_key("input") => {
            let input = map["input"].as_str().unwrap_or_default();
            if map["by"] == "NAME" {
                json!({ "id": format!("id-{input}"), "name": input })
            } else {
                json!({ "id": input, "name": format!("name-{input}") })
            }
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, materialize(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(materialize).collect()),
        other => other,
    }
}

/// Objects merge key by key; lists and scalars replace.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

fn place(family: &mut FamilyState, mut rule: Value, at: &PositionInput) {
    let reference = at.reference.as_deref().unwrap_or_default();
    let rule_at = |family: &FamilyState| {
        family
            .rules
            .iter()
            .position(|r| r["id"] == reference)
            .unwrap_or(family.rules.len())
    };
    let section_span = |family: &FamilyState| {
        let hits: Vec<usize> = family
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r["section"]["id"] == reference)
            .map(|(i, _)| i)
            .collect();
        (hits.first().copied(), hits.last().copied())
    };
    let section = family
        .sections
        .iter()
        .find(|(id, _)| id == reference)
        .map(|(id, name)| json!({ "id": id, "name": name }));
    let index = match at.position.as_str() {
        "FIRST_IN_POLICY" => 0,
        "AFTER_RULE" => (rule_at(family) + 1).min(family.rules.len()),
        "BEFORE_RULE" => rule_at(family),
        "FIRST_IN_SECTION" => {
            rule["section"] = section.unwrap_or(Value::Null);
            section_span(family).0.unwrap_or(family.rules.len())
        }
        "LAST_IN_SECTION" => {
            rule["section"] = section.unwrap_or(Value::Null);
            section_span(family).1.map_or(family.rules.len(), |i| i + 1)
        }
        _ => family.rules.len(),
    };
    family.rules.insert(index, rule);
}

fn status(failure: Option<Vec<MutationError>>) -> MutationStatus {
    match failure {
        Some(errors) => MutationStatus {
            status: "FAILURE".into(),
            errors,
        },
        None => MutationStatus::success(),
    }
}

fn deserialize<R: serde::de::DeserializeOwned>(rule: &Value) -> R {
    serde_json::from_value(rule.clone()).unwrap()
}

impl PolicyApi for FakePolicy {
    fn policy<F: PolicyFamily>(
        &self,
    ) -> impl Future<Output = Result<PolicyDocument<F::Rule>, Error>> + Send {
        self.record("policy", Value::Null);
        let state = self.state.lock().unwrap();
        let document = state.families.get(F::FIELD).map_or_else(
            PolicyDocument::default,
            |family| PolicyDocument {
                rules: family
                    .rules
                    .iter()
                    .enumerate()
                    .map(|(i, rule)| {
                        let mut rule = rule.clone();
                        rule["index"] = json!(i + 1);
                        PolicyRuleEntry {
                            rule: deserialize(&rule),
                            properties: Vec::new(),
                        }
                    })
                    .collect(),
                sections: family
                    .sections
                    .iter()
                    .map(|(id, name)| PolicySectionEntry {
                        section: PolicySectionRef::new(id.as_str(), name.as_str()),
                        properties: Vec::new(),
                    })
                    .collect(),
                ..PolicyDocument::default()
            },
        );
        ready(Ok(document))
    }

    fn add_rule<F: PolicyFamily>(
        &self,
        input: &AddRuleInput<F::RuleInput>,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send {
        let body = serde_json::to_value(input).unwrap();
        if let Some(errors) = self.record("addRule", body) {
            return ready(Ok(RuleMutationPayload::failure(errors)));
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("rule-{}", state.next_id);
        let mut rule = materialize(serde_json::to_value(&input.rule).unwrap());
        rule["id"] = json!(id);
        let at = input.at.clone().unwrap_or(PositionInput {
            position: "LAST_IN_POLICY".into(),
            reference: None,
        });
        let family = state.families.entry(F::FIELD).or_default();
        place(family, rule.clone(), &at);
        family.pending = true;
        ready(Ok(RuleMutationPayload::success(deserialize(&rule))))
    }

    fn update_rule<F: PolicyFamily>(
        &self,
        input: &UpdateRuleInput<F::RuleUpdateInput>,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send {
        let body = serde_json::to_value(input).unwrap();
        if let Some(errors) = self.record("updateRule", body) {
            return ready(Ok(RuleMutationPayload::failure(errors)));
        }
        let patch = materialize(serde_json::to_value(&input.rule).unwrap());
        let mut state = self.state.lock().unwrap();
        let family = state.families.entry(F::FIELD).or_default();
        let Some(rule) = family.rules.iter_mut().find(|r| r["id"] == input.id) else {
            return ready(Ok(RuleMutationPayload::failure(vec![MutationError {
                error_code: Some("RULE_NOT_FOUND".into()),
                error_message: Some(input.id.clone()),
            }])));
        };
        merge(rule, patch);
        let updated = rule.clone();
        family.pending = true;
        ready(Ok(RuleMutationPayload::success(deserialize(&updated))))
    }

    fn move_rule<F: PolicyFamily>(
        &self,
        input: &MoveRuleInput,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send {
        let body = serde_json::to_value(input).unwrap();
        if let Some(errors) = self.record("moveRule", body) {
            return ready(Ok(RuleMutationPayload::failure(errors)));
        }
        let mut state = self.state.lock().unwrap();
        let family = state.families.entry(F::FIELD).or_default();
        let Some(index) = family.rules.iter().position(|r| r["id"] == input.id) else {
            return ready(Ok(RuleMutationPayload::failure(Vec::new())));
        };
        let rule = family.rules.remove(index);
        place(family, rule.clone(), &input.to);
        family.pending = true;
        ready(Ok(RuleMutationPayload::success(deserialize(&rule))))
    }

    fn remove_rule<F: PolicyFamily>(
        &self,
        input: &RemoveRuleInput,
    ) -> impl Future<Output = Result<MutationStatus, Error>> + Send {
        let body = serde_json::to_value(input).unwrap();
        let failure = self.record("removeRule", body);
        if failure.is_none() {
            let mut state = self.state.lock().unwrap();
            let family = state.families.entry(F::FIELD).or_default();
            family.rules.retain(|r| r["id"] != input.id);
            family.pending = true;
        }
        ready(Ok(status(failure)))
    }

    fn publish<F: PolicyFamily>(
        &self,
        input: &PublishInput,
    ) -> impl Future<Output = Result<MutationStatus, Error>> + Send {
        let body = serde_json::to_value(input).unwrap();
        let failure = self.record("publishPolicyRevision", body);
        if failure.is_none() {
            let mut state = self.state.lock().unwrap();
            let family = state.families.entry(F::FIELD).or_default();
            family.pending = false;
            family.revisions += 1;
        }
        ready(Ok(status(failure)))
    }
}
