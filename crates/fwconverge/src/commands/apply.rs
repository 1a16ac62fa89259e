//! `fwconverge apply`: converge every declared rule and track the result.
//!
//! Rules are converged one at a time and the state file is written after
//! each one, so an interrupted run never loses an ID the remote assigned.

use fwconverge_api::PolicyClient;
use fwconverge_config::{RuleFile, RuleRecord, StateFile};
use fwconverge_core::{
    ConvergenceFailure, Controller, CoreError, DeleteOutcome, ErrorEntry, InternetFirewall,
    RuleState, WanFirewall,
};
use serde::Serialize;
use tabled::Tabled;
use tracing::{error, info, warn};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Context, Tracked, plan};

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApplyEntry {
    pub family: &'static str,
    pub name: String,
    pub id: Option<String>,
    pub outcome: &'static str,
    pub history: Vec<RuleState>,
    pub errors: Vec<ErrorEntry>,
}

#[derive(Tabled)]
struct ApplyRow {
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl ApplyRow {
    fn new(entry: &ApplyEntry, color: bool) -> Self {
        let detail = if entry.errors.is_empty() {
            entry
                .history
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" > ")
        } else {
            entry
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        };
        Self {
            family: entry.family.into(),
            name: entry.name.clone(),
            id: entry.id.clone().unwrap_or_else(|| "-".into()),
            outcome: output::paint_label(entry.outcome, color),
            detail,
        }
    }
}

fn outcome_label(history: &[RuleState]) -> &'static str {
    if history.contains(&RuleState::Created) {
        "created"
    } else if history.contains(&RuleState::Updated) {
        "updated"
    } else if history.contains(&RuleState::Moved) {
        "moved"
    } else {
        "unchanged"
    }
}

// ── Handler ─────────────────────────────────────────────────────────

struct Session<'a> {
    ctx: &'a Context,
    controller: Controller<PolicyClient>,
    state: StateFile,
    entries: Vec<ApplyEntry>,
    failed: usize,
}

pub async fn handle(args: &ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Context::load(global)?;
    let rules = fwconverge_config::load_rules(&args.rules)?;
    plan::check_rules(&rules)?;

    let mut session = Session {
        ctx: &ctx,
        controller: ctx.controller()?,
        state: ctx.load_state()?,
        entries: Vec::new(),
        failed: 0,
    };

    let result = async {
        session.converge_family::<WanFirewall>(&rules).await?;
        session.converge_family::<InternetFirewall>(&rules).await?;
        if args.prune {
            session.prune_family::<WanFirewall>(&rules).await?;
            session.prune_family::<InternetFirewall>(&rules).await?;
        }
        Ok::<(), CliError>(())
    }
    .await;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &session.entries,
        |e| ApplyRow::new(e, color),
        |e| format!("{}\t{}\t{}", e.outcome, e.family, e.name),
    );
    output::print_output(&out, global.quiet);
    result?;

    let total = session.entries.len();
    info!(total, failed = session.failed, "apply finished");
    if session.failed > 0 {
        return Err(CliError::Incomplete {
            failed: session.failed,
            total,
        });
    }
    Ok(())
}

impl Session<'_> {
    async fn converge_family<F: Tracked>(&mut self, rules: &RuleFile) -> Result<(), CliError> {
        for declared in F::declared(rules) {
            let name = F::declared_name(declared).to_owned();
            let id = F::records(&self.state).get(&name).map(|r| r.id.clone());

            match self.controller.converge::<F>(id.as_deref(), declared).await {
                Ok(observed) => {
                    info!(family = F::KEY, rule = %name, id = %observed.id, "converged");
                    self.entries.push(ApplyEntry {
                        family: F::KEY,
                        name: name.clone(),
                        id: Some(observed.id.clone()),
                        outcome: outcome_label(&observed.history),
                        history: observed.history,
                        errors: Vec::new(),
                    });
                    F::records_mut(&mut self.state).insert(
                        name,
                        RuleRecord {
                            id: observed.id,
                            index: observed.index,
                            rule: observed.rule,
                        },
                    );
                    self.ctx.save_state(&self.state)?;
                }
                Err(failure) => {
                    if let Some(ref rule_id) = failure.rule_id {
                        let records = F::records_mut(&mut self.state);
                        let stale = records.get(&name).is_none_or(|r| r.id != *rule_id);
                        if stale {
                            records.insert(
                                name.clone(),
                                RuleRecord {
                                    id: rule_id.clone(),
                                    index: 0,
                                    rule: declared.clone(),
                                },
                            );
                        }
                        self.ctx.save_state(&self.state)?;
                    }
                    self.record_failure(F::KEY, name, failure)?;
                }
            }
        }
        Ok(())
    }

    async fn prune_family<F: Tracked>(&mut self, rules: &RuleFile) -> Result<(), CliError> {
        let declared = F::declared(rules);
        let orphans: Vec<(String, String)> = F::records(&self.state)
            .iter()
            .filter(|(name, _)| !declared.iter().any(|d| F::declared_name(d) == name.as_str()))
            .map(|(name, record)| (name.clone(), record.id.clone()))
            .collect();

        for (name, id) in orphans {
            match self.controller.delete::<F>(&id).await {
                Ok(outcome) => {
                    let (label, history) = match outcome {
                        DeleteOutcome::Removed { published: true } => {
                            ("removed", vec![RuleState::Removed, RuleState::Published])
                        }
                        DeleteOutcome::Removed { published: false } => {
                            ("removed", vec![RuleState::Removed])
                        }
                        DeleteOutcome::AlreadyAbsent => ("gone", Vec::new()),
                    };
                    info!(family = F::KEY, rule = %name, %id, label, "pruned");
                    F::records_mut(&mut self.state).remove(&name);
                    self.ctx.save_state(&self.state)?;
                    self.entries.push(ApplyEntry {
                        family: F::KEY,
                        name,
                        id: Some(id),
                        outcome: label,
                        history,
                        errors: Vec::new(),
                    });
                }
                Err(failure) => self.record_failure(F::KEY, name, failure)?,
            }
        }
        Ok(())
    }

    /// Note a failed rule and keep going, unless retrying the next rule
    /// cannot help.
    fn record_failure(
        &mut self,
        family: &'static str,
        name: String,
        failure: ConvergenceFailure,
    ) -> Result<(), CliError> {
        let fatal = match &failure.error {
            CoreError::Cancelled { .. } => true,
            CoreError::RemoteTransport(source) => source.is_auth(),
            _ => false,
        };
        if failure.left_uncommitted() {
            warn!(family, rule = %name, reached = %failure.reached, "changes were sent but not published");
        }
        error!(family, rule = %name, error = %failure.error, "rule did not converge");

        self.failed += 1;
        self.entries.push(ApplyEntry {
            family,
            name,
            id: failure.rule_id.clone(),
            outcome: "failed",
            history: failure.history.clone(),
            errors: failure.entries(),
        });
        if fatal {
            return Err(CliError::from_failure(failure, &self.ctx.profile_name));
        }
        Ok(())
    }
}
