// ── Convergence controller ──
//
// Drives one rule through the remote lifecycle. Every step is a single
// awaited remote call; nothing is batched, retried or run concurrently.
//
//   create:  add -> move (when the anchor differs from the creation
//            default) -> publish -> read back
//   update:  move (when out of place) -> update -> publish -> read back
//   delete:  read -> remove -> publish
//
// A rule counts as uncommitted until publish succeeds. A failure at any
// step stops the run and reports the last state reached together with
// every error entry the remote returned.

use fwconverge_api::types::{
    AddRuleInput, MoveRuleInput, MutationStatus, PolicyDocument, PublishInput, RemoveRuleInput,
    UpdateRuleInput,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::PolicyApi;
use crate::config::EngineConfig;
use crate::drift::Plan;
use crate::error::{CoreError, ErrorEntry};
use crate::family::RuleFamily;
use crate::hydrate::{HydrationWarning, Hydrator};
use crate::position::{self, Layout, Target};

// ── States and outcomes ─────────────────────────────────────────────

/// Lifecycle states of one rule convergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleState {
    Planned,
    Created,
    Moved,
    Updated,
    Published,
    Observed,
    Removed,
    Failed,
}

/// A hydrated remote rule.
#[derive(Debug, Clone, Serialize)]
pub struct Observed<R> {
    pub id: String,
    /// Position in the remote rule order.
    pub index: i64,
    pub rule: R,
    pub warnings: Vec<HydrationWarning>,
    pub history: Vec<RuleState>,
}

#[derive(Debug, Clone)]
pub enum ReadOutcome<R> {
    Found(Observed<R>),
    /// The ID is no longer in the policy. Not an error.
    DeletedExternally,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed { published: bool },
    /// The rule was already gone; nothing was sent.
    AlreadyAbsent,
}

/// Result of planning one rule.
#[derive(Debug, Clone)]
pub struct PlanOutcome<R> {
    pub plan: Plan,
    pub observed: Option<Observed<R>>,
}

/// A convergence run that stopped early.
#[derive(Debug, thiserror::Error)]
#[error("convergence stopped after {reached}: {error}")]
pub struct ConvergenceFailure {
    /// Set once the remote assigned an ID.
    pub rule_id: Option<String>,
    /// Last state reached before the failure.
    pub reached: RuleState,
    pub history: Vec<RuleState>,
    #[source]
    pub error: CoreError,
}

impl ConvergenceFailure {
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.error.entries()
    }

    /// Mutations went through but were never published.
    pub fn left_uncommitted(&self) -> bool {
        matches!(
            self.reached,
            RuleState::Created | RuleState::Moved | RuleState::Updated | RuleState::Removed
        )
    }
}

struct Run {
    rule_id: Option<String>,
    history: Vec<RuleState>,
}

impl Run {
    fn new(rule_id: Option<&str>) -> Self {
        Self {
            rule_id: rule_id.map(str::to_owned),
            history: vec![RuleState::Planned],
        }
    }

    fn reach(&mut self, state: RuleState) {
        self.history.push(state);
    }

    fn fail(mut self, error: CoreError) -> ConvergenceFailure {
        let reached = self.history.last().copied().unwrap_or(RuleState::Planned);
        warn!(rule_id = ?self.rule_id, %reached, %error, "convergence failed");
        self.history.push(RuleState::Failed);
        ConvergenceFailure {
            rule_id: self.rule_id,
            reached,
            history: self.history,
            error,
        }
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Converges declared rules against one remote policy.
pub struct Controller<A> {
    api: A,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl<A: PolicyApi> Controller<A> {
    pub fn new(api: A, config: EngineConfig) -> Self {
        Self {
            api,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Share a caller-owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Fetch the policy and hydrate the rule with `id`. `prior` is the
    /// declaration it was converged from, if any.
    pub async fn read<F: RuleFamily>(
        &self,
        id: &str,
        prior: Option<&F::Declared>,
    ) -> Result<ReadOutcome<F::Declared>, CoreError> {
        let document = self.fetch::<F>().await?;
        Ok(self.observe::<F>(&document, id, prior, vec![RuleState::Observed]))
    }

    /// Compare a declaration with the remote rule it maps to.
    pub async fn plan<F: RuleFamily>(
        &self,
        id: Option<&str>,
        declared: &F::Declared,
    ) -> Result<PlanOutcome<F::Declared>, CoreError> {
        validate::<F>(declared)?;
        let anchor = F::declared_position(declared);
        let Some(id) = id else {
            return Ok(PlanOutcome {
                plan: Plan::Create,
                observed: None,
            });
        };
        let document = self.fetch::<F>().await?;
        let observed = match self.observe::<F>(&document, id, Some(declared), vec![RuleState::Observed]) {
            ReadOutcome::Found(observed) => observed,
            ReadOutcome::DeletedExternally => {
                return Ok(PlanOutcome {
                    plan: Plan::Create,
                    observed: None,
                });
            }
        };
        let mut drift = F::drift(declared, &observed.rule);
        if !drift.is_empty() {
            // The update that fixes the drift also clears everything undeclared.
            drift.extend(F::resets(declared, &observed.rule));
        }
        let in_place = match anchor {
            Some(anchor) => {
                let layout = Layout::from_document::<F>(&document);
                layout.satisfies(id, &layout.resolve(anchor)?)
            }
            None => true,
        };
        let plan = Plan::from_parts(drift, in_place);
        debug!(family = F::LABEL, rule_id = id, plan = plan.label(), "planned");
        Ok(PlanOutcome {
            plan,
            observed: Some(observed),
        })
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Plan, then do whatever the plan calls for.
    pub async fn converge<F: RuleFamily>(
        &self,
        id: Option<&str>,
        declared: &F::Declared,
    ) -> Result<Observed<F::Declared>, ConvergenceFailure> {
        let outcome = match self.plan::<F>(id, declared).await {
            Ok(outcome) => outcome,
            Err(error) => return Err(Run::new(id).fail(error)),
        };
        match (outcome.plan, id, outcome.observed) {
            (Plan::NoOp, _, Some(observed)) => Ok(observed),
            (Plan::Move, Some(id), _) => self.apply::<F>(id, declared, false).await,
            (Plan::Update { .. } | Plan::UpdateAndMove { .. }, Some(id), _) => {
                self.apply::<F>(id, declared, true).await
            }
            _ => self.create::<F>(declared).await,
        }
    }

    pub async fn create<F: RuleFamily>(
        &self,
        declared: &F::Declared,
    ) -> Result<Observed<F::Declared>, ConvergenceFailure> {
        let mut run = Run::new(None);
        match self.create_steps::<F>(declared, &mut run).await {
            Ok(observed) => Ok(observed),
            Err(error) => Err(run.fail(error)),
        }
    }

    pub async fn update<F: RuleFamily>(
        &self,
        id: &str,
        declared: &F::Declared,
    ) -> Result<Observed<F::Declared>, ConvergenceFailure> {
        self.apply::<F>(id, declared, true).await
    }

    pub async fn delete<F: RuleFamily>(&self, id: &str) -> Result<DeleteOutcome, ConvergenceFailure> {
        let mut run = Run::new(Some(id));
        match self.delete_steps::<F>(id, &mut run).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => Err(run.fail(error)),
        }
    }

    async fn apply<F: RuleFamily>(
        &self,
        id: &str,
        declared: &F::Declared,
        send_update: bool,
    ) -> Result<Observed<F::Declared>, ConvergenceFailure> {
        let mut run = Run::new(Some(id));
        match self.update_steps::<F>(id, declared, send_update, &mut run).await {
            Ok(observed) => Ok(observed),
            Err(error) => Err(run.fail(error)),
        }
    }

    async fn create_steps<F: RuleFamily>(
        &self,
        declared: &F::Declared,
        run: &mut Run,
    ) -> Result<Observed<F::Declared>, CoreError> {
        let input = F::build_create(declared)?;
        let creation = &self.config.creation_position;
        let anchor = F::declared_position(declared).filter(|anchor| *anchor != creation);
        if let Some(anchor) = anchor {
            position::validate(anchor)?;
        }

        let layout = if position::needs_layout(creation) || anchor.is_some_and(position::needs_layout) {
            Layout::from_document::<F>(&self.fetch::<F>().await?)
        } else {
            Layout::default()
        };
        let at = layout.resolve(creation)?;
        let target = anchor.map(|anchor| layout.resolve(anchor)).transpose()?;

        self.checkpoint("addRule")?;
        let name = F::declared_name(declared);
        debug!(family = F::LABEL, name, "adding rule");
        let (status, rule) = self
            .api
            .add_rule::<F>(&AddRuleInput {
                rule: input,
                at: Some(at.to_input()),
            })
            .await?
            .into_parts();
        ensure_success("addRule", &status)?;
        let rule = rule.ok_or_else(|| CoreError::RemoteSemantic {
            operation: "addRule".into(),
            errors: vec![ErrorEntry::new("MISSING_RULE", "the remote returned no rule")],
        })?;
        let id = F::rule_id(&rule).to_owned();
        info!(family = F::LABEL, rule_id = %id, name, "rule created");
        run.rule_id = Some(id.clone());
        run.reach(RuleState::Created);

        if let Some(target) = target {
            self.move_rule::<F>(&id, &target).await?;
            run.reach(RuleState::Moved);
        }
        self.publish::<F>(run).await?;
        self.read_back::<F>(&id, declared, run).await
    }

    async fn update_steps<F: RuleFamily>(
        &self,
        id: &str,
        declared: &F::Declared,
        send_update: bool,
        run: &mut Run,
    ) -> Result<Observed<F::Declared>, CoreError> {
        let input = F::build_update(declared)?;
        let anchor = F::declared_position(declared);
        if let Some(anchor) = anchor {
            position::validate(anchor)?;
        }

        let layout = Layout::from_document::<F>(&self.fetch::<F>().await?);
        if !layout.contains(id) {
            return Err(CoreError::NotFound {
                entity: format!("{} rule", F::LABEL),
                identifier: id.to_owned(),
            });
        }
        if let Some(anchor) = anchor {
            let target = layout.resolve(anchor)?;
            if layout.satisfies(id, &target) {
                debug!(family = F::LABEL, rule_id = id, "already in place");
            } else {
                self.move_rule::<F>(id, &target).await?;
                run.reach(RuleState::Moved);
            }
        }

        if send_update {
            self.checkpoint("updateRule")?;
            debug!(family = F::LABEL, rule_id = id, "updating rule");
            let (status, _) = self
                .api
                .update_rule::<F>(&UpdateRuleInput {
                    id: id.to_owned(),
                    rule: input,
                })
                .await?
                .into_parts();
            ensure_success("updateRule", &status)?;
            info!(family = F::LABEL, rule_id = id, "rule updated");
            run.reach(RuleState::Updated);
        }

        self.publish::<F>(run).await?;
        self.read_back::<F>(id, declared, run).await
    }

    async fn delete_steps<F: RuleFamily>(
        &self,
        id: &str,
        run: &mut Run,
    ) -> Result<DeleteOutcome, CoreError> {
        let layout = Layout::from_document::<F>(&self.fetch::<F>().await?);
        if !layout.contains(id) {
            info!(family = F::LABEL, rule_id = id, "rule already absent");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }
        self.checkpoint("removeRule")?;
        let status = self
            .api
            .remove_rule::<F>(&RemoveRuleInput { id: id.to_owned() })
            .await?;
        ensure_success("removeRule", &status)?;
        info!(family = F::LABEL, rule_id = id, "rule removed");
        run.reach(RuleState::Removed);
        let published = self.publish::<F>(run).await?;
        Ok(DeleteOutcome::Removed { published })
    }

    // ── Steps ───────────────────────────────────────────────────────

    fn checkpoint(&self, operation: &str) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled {
                operation: operation.to_owned(),
            });
        }
        Ok(())
    }

    async fn fetch<F: RuleFamily>(&self) -> Result<PolicyDocument<F::Rule>, CoreError> {
        self.checkpoint("policy")?;
        debug!(family = F::LABEL, "fetching policy");
        Ok(self.api.policy::<F>().await?)
    }

    async fn move_rule<F: RuleFamily>(&self, id: &str, target: &Target) -> Result<(), CoreError> {
        self.checkpoint("moveRule")?;
        debug!(family = F::LABEL, rule_id = id, position = %target.position, "moving rule");
        let (status, _) = self
            .api
            .move_rule::<F>(&MoveRuleInput {
                id: id.to_owned(),
                to: target.to_input(),
            })
            .await?
            .into_parts();
        ensure_success("moveRule", &status)
    }

    /// Returns whether a revision was published.
    async fn publish<F: RuleFamily>(&self, run: &mut Run) -> Result<bool, CoreError> {
        let settings = &self.config.publish;
        if !settings.enabled {
            debug!(family = F::LABEL, "publishing disabled, changes stay pending");
            return Ok(false);
        }
        self.checkpoint("publishPolicyRevision")?;
        let status = self
            .api
            .publish::<F>(&PublishInput {
                name: settings.revision_name.clone(),
                description: settings.revision_description.clone(),
            })
            .await?;
        ensure_success("publishPolicyRevision", &status)?;
        info!(family = F::LABEL, "policy revision published");
        run.reach(RuleState::Published);
        Ok(true)
    }

    async fn read_back<F: RuleFamily>(
        &self,
        id: &str,
        declared: &F::Declared,
        run: &mut Run,
    ) -> Result<Observed<F::Declared>, CoreError> {
        let document = self.fetch::<F>().await?;
        let mut history = run.history.clone();
        history.push(RuleState::Observed);
        match self.observe::<F>(&document, id, Some(declared), history) {
            ReadOutcome::Found(observed) => {
                run.reach(RuleState::Observed);
                Ok(observed)
            }
            ReadOutcome::DeletedExternally => Err(CoreError::NotFound {
                entity: format!("{} rule", F::LABEL),
                identifier: id.to_owned(),
            }),
        }
    }

    fn observe<F: RuleFamily>(
        &self,
        document: &PolicyDocument<F::Rule>,
        id: &str,
        prior: Option<&F::Declared>,
        history: Vec<RuleState>,
    ) -> ReadOutcome<F::Declared> {
        let Some(remote) = document
            .rules
            .iter()
            .map(|entry| &entry.rule)
            .find(|rule| F::rule_id(rule) == id)
        else {
            info!(family = F::LABEL, rule_id = id, "rule deleted externally");
            return ReadOutcome::DeletedExternally;
        };
        let mut hydrator = Hydrator::new(&self.config.interfaces);
        let rule = F::hydrate(remote, prior, &mut hydrator);
        ReadOutcome::Found(Observed {
            id: id.to_owned(),
            index: F::rule_index(remote),
            rule,
            warnings: hydrator.into_warnings(),
            history,
        })
    }
}

/// Check a declaration without touching the remote: every payload
/// problem and a malformed position anchor.
pub fn validate<F: RuleFamily>(declared: &F::Declared) -> Result<(), CoreError> {
    F::build_create(declared)?;
    if let Some(anchor) = F::declared_position(declared) {
        position::validate(anchor)?;
    }
    Ok(())
}

/// A mutation succeeded only if it said so and listed no errors. Every
/// listed error becomes its own entry.
fn ensure_success(operation: &str, status: &MutationStatus) -> Result<(), CoreError> {
    if status.is_success() {
        return Ok(());
    }
    let mut errors: Vec<ErrorEntry> = status
        .errors
        .iter()
        .map(|e| {
            ErrorEntry::new(
                e.error_code.clone().unwrap_or_else(|| "UNKNOWN".into()),
                e.error_message.clone().unwrap_or_default(),
            )
        })
        .collect();
    if errors.is_empty() {
        errors.push(ErrorEntry::new(
            status.status.clone(),
            format!("{operation} returned status {:?}", status.status),
        ));
    }
    Err(CoreError::RemoteSemantic {
        operation: operation.to_owned(),
        errors,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fwconverge_api::types::MutationError;

    #[test]
    fn every_remote_error_becomes_an_entry() {
        let status = MutationStatus {
            status: "FAILURE".into(),
            errors: vec![
                MutationError {
                    error_code: Some("E1".into()),
                    error_message: Some("bad host".into()),
                },
                MutationError {
                    error_code: None,
                    error_message: Some("bad site".into()),
                },
            ],
        };
        let err = ensure_success("addRule", &status).unwrap_err();
        let entries = err.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].code, "UNKNOWN");
    }

    #[test]
    fn failure_without_errors_still_reports_the_status() {
        let status = MutationStatus {
            status: "FAILURE".into(),
            errors: Vec::new(),
        };
        let entries = ensure_success("publishPolicyRevision", &status)
            .unwrap_err()
            .entries();
        assert_eq!(entries[0].code, "FAILURE");
    }

    #[test]
    fn failed_run_keeps_history() {
        let mut run = Run::new(Some("r1"));
        run.reach(RuleState::Created);
        let failure = run.fail(CoreError::Cancelled {
            operation: "publishPolicyRevision".into(),
        });
        assert_eq!(failure.reached, RuleState::Created);
        assert_eq!(
            failure.history,
            vec![RuleState::Planned, RuleState::Created, RuleState::Failed]
        );
        assert!(failure.left_uncommitted());
    }
}
