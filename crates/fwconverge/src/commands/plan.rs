//! `fwconverge plan`: what apply would change, without changing it.

use fwconverge_api::PolicyClient;
use fwconverge_config::{RuleFile, StateFile};
use fwconverge_core::{
    Controller, ErrorEntry, FieldDrift, HydrationWarning, InternetFirewall, WanFirewall,
};
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::cli::{GlobalOpts, PlanArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, Tracked};

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PlanEntry {
    pub family: &'static str,
    pub name: String,
    pub id: Option<String>,
    pub action: String,
    pub drift: Vec<FieldDrift>,
    pub warnings: Vec<HydrationWarning>,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

impl PlanRow {
    fn new(entry: &PlanEntry, color: bool) -> Self {
        let mut changes: Vec<String> = entry
            .drift
            .iter()
            .map(|d| format!("{}: {} -> {}", d.path, d.observed, d.declared))
            .collect();
        changes.extend(entry.warnings.iter().map(|w| format!("warning: {w}")));
        Self {
            family: entry.family.into(),
            name: entry.name.clone(),
            id: entry.id.clone().unwrap_or_else(|| "-".into()),
            action: output::paint_label(&entry.action, color),
            changes: changes.join("\n"),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Context::load(global)?;
    let rules = fwconverge_config::load_rules(&args.rules)?;
    check_rules(&rules)?;
    let state = ctx.load_state()?;

    let controller = if args.offline {
        None
    } else {
        Some(ctx.controller()?)
    };

    let mut entries = Vec::new();
    plan_family::<WanFirewall>(&ctx, controller.as_ref(), &rules, &state, args.prune, &mut entries)
        .await?;
    plan_family::<InternetFirewall>(
        &ctx,
        controller.as_ref(),
        &rules,
        &state,
        args.prune,
        &mut entries,
    )
    .await?;

    let pending = entries
        .iter()
        .filter(|e| !matches!(e.action.as_str(), "no-op" | "unchecked"))
        .count();
    info!(rules = entries.len(), pending, "plan complete");

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| PlanRow::new(e, color),
        |e| format!("{}\t{}\t{}", e.action, e.family, e.name),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Validate every declared rule up front and report all problems at once.
pub(crate) fn check_rules(rules: &RuleFile) -> Result<(), CliError> {
    let mut entries = Vec::new();
    collect_invalid::<WanFirewall>(rules, &mut entries);
    collect_invalid::<InternetFirewall>(rules, &mut entries);
    if entries.is_empty() {
        Ok(())
    } else {
        Err(CliError::InvalidRule { entries })
    }
}

fn collect_invalid<F: Tracked>(rules: &RuleFile, out: &mut Vec<ErrorEntry>) {
    for declared in F::declared(rules) {
        if let Err(err) = fwconverge_core::validate::<F>(declared) {
            let name = F::declared_name(declared);
            out.extend(
                err.entries()
                    .into_iter()
                    .map(|e| ErrorEntry::new(e.code, format!("{} {name}: {}", F::KEY, e.message))),
            );
        }
    }
}

async fn plan_family<F: Tracked>(
    ctx: &Context,
    controller: Option<&Controller<PolicyClient>>,
    rules: &RuleFile,
    state: &StateFile,
    prune: bool,
    out: &mut Vec<PlanEntry>,
) -> Result<(), CliError> {
    let records = F::records(state);
    let declared = F::declared(rules);

    for rule in declared {
        let name = F::declared_name(rule);
        let id = records.get(name).map(|r| r.id.clone());
        let entry = match controller {
            None => PlanEntry {
                family: F::KEY,
                name: name.to_owned(),
                action: if id.is_some() { "unchecked" } else { "create" }.into(),
                id,
                drift: Vec::new(),
                warnings: Vec::new(),
            },
            Some(controller) => {
                let outcome = controller
                    .plan::<F>(id.as_deref(), rule)
                    .await
                    .map_err(|e| ctx.core_error(e))?;
                let (id, warnings) = match outcome.observed {
                    Some(observed) => (Some(observed.id), observed.warnings),
                    None => (None, Vec::new()),
                };
                PlanEntry {
                    family: F::KEY,
                    name: name.to_owned(),
                    id,
                    action: outcome.plan.label().into(),
                    drift: outcome.plan.drift().to_vec(),
                    warnings,
                }
            }
        };
        out.push(entry);
    }

    for (name, record) in records {
        if declared.iter().any(|rule| F::declared_name(rule) == name.as_str()) {
            continue;
        }
        out.push(PlanEntry {
            family: F::KEY,
            name: name.clone(),
            id: Some(record.id.clone()),
            action: if prune { "delete" } else { "untracked" }.into(),
            drift: Vec::new(),
            warnings: Vec::new(),
        });
    }
    Ok(())
}
