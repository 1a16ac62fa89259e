//! `fwconverge show` and `fwconverge delete` for single tracked rules.

use fwconverge_config::RuleRecord;
use fwconverge_core::{
    DeleteOutcome, HydrationWarning, InternetFirewall, ReadOutcome, WanFirewall,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{Family, GlobalOpts, RuleArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, Tracked};

#[derive(Debug, Serialize)]
struct ShownRule<'a, R> {
    family: &'static str,
    name: &'a str,
    id: String,
    index: i64,
    rule: R,
    warnings: Vec<HydrationWarning>,
}

fn rule_detail<R: Serialize>(shown: &ShownRule<'_, R>) -> String {
    let mut lines = vec![
        format!("Family:  {}", shown.family),
        format!("Name:    {}", shown.name),
        format!("ID:      {}", shown.id),
        format!("Index:   {}", shown.index),
    ];
    for warning in &shown.warnings {
        lines.push(format!("Warning: {warning}"));
    }
    lines.push(String::new());
    lines.push(output::render_yaml(&shown.rule).trim_end().to_owned());
    lines.join("\n")
}

fn tracked<'s, F: Tracked>(
    state: &'s fwconverge_config::StateFile,
    name: &str,
) -> Result<&'s RuleRecord<F::Declared>, CliError> {
    F::records(state).get(name).ok_or_else(|| CliError::NotTracked {
        family: F::KEY.into(),
        name: name.into(),
    })
}

// ── Show ────────────────────────────────────────────────────────────

pub async fn show(args: &RuleArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.family {
        Family::Wan => show_family::<WanFirewall>(&args.name, global).await,
        Family::Internet => show_family::<InternetFirewall>(&args.name, global).await,
    }
}

async fn show_family<F: Tracked>(name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Context::load(global)?;
    let state = ctx.load_state()?;
    let record = tracked::<F>(&state, name)?;

    let controller = ctx.controller()?;
    let observed = match controller
        .read::<F>(&record.id, Some(&record.rule))
        .await
        .map_err(|e| ctx.core_error(e))?
    {
        ReadOutcome::Found(observed) => observed,
        ReadOutcome::DeletedExternally => {
            return Err(CliError::NotFound {
                entity: format!("{} rule", F::LABEL),
                identifier: record.id.clone(),
            });
        }
    };

    let shown = ShownRule {
        family: F::KEY,
        name,
        id: observed.id,
        index: observed.index,
        rule: observed.rule,
        warnings: observed.warnings,
    };
    let out = output::render_single(&global.output, &shown, rule_detail, |s| s.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Delete ──────────────────────────────────────────────────────────

pub async fn delete(args: &RuleArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.family {
        Family::Wan => delete_family::<WanFirewall>(&args.name, global).await,
        Family::Internet => delete_family::<InternetFirewall>(&args.name, global).await,
    }
}

async fn delete_family<F: Tracked>(name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Context::load(global)?;
    let mut state = ctx.load_state()?;
    let id = tracked::<F>(&state, name)?.id.clone();

    let controller = ctx.controller()?;
    let outcome = controller
        .delete::<F>(&id)
        .await
        .map_err(|failure| CliError::from_failure(failure, &ctx.profile_name))?;

    F::records_mut(&mut state).remove(name);
    ctx.save_state(&state)?;

    let message = match outcome {
        DeleteOutcome::Removed { published: true } => format!("Removed {} rule '{name}' ({id})", F::KEY),
        DeleteOutcome::Removed { published: false } => {
            format!("Removed {} rule '{name}' ({id}); publishing is disabled", F::KEY)
        }
        DeleteOutcome::AlreadyAbsent => {
            format!("{} rule '{name}' ({id}) was already gone; stopped tracking it", F::KEY)
        }
    };
    info!(family = F::KEY, rule = name, %id, "delete finished");
    if !global.quiet {
        eprintln!("{message}");
    }
    Ok(())
}
