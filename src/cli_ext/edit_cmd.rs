//! `assign` and `move` command handlers.
//!
//! Both read a tree file, run one engine operation, and write the new tree
//! to `--output` or stdout. Summaries go to stderr so stdout stays JSON.

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use tracing::{info, instrument};

use crate::cli::{AppContext, AssignArgs, MoveArgs};
use crate::core::assign::{
    AssignmentController, DuplicatePolicy, SessionOptions, SubmitError, drag_move,
};
use crate::core::draft::{DraftStore, FileDraftStore, MemoryDraftStore};
use crate::core::drop::DropEvent;
use crate::core::expansion::ExpansionState;
use crate::infra::config::{Config, load_config};
use crate::infra::io::{read_forest, read_pending, write_json};

fn draft_store(config: &Config, ctx: &AppContext) -> Box<dyn DraftStore> {
    if config.draft.enabled && !ctx.dry_run {
        Box::new(FileDraftStore::new(&config.draft.dir))
    } else {
        Box::new(MemoryDraftStore::new())
    }
}

#[instrument(skip_all, fields(tree = %args.tree.display(), items = %args.items.display()))]
pub fn assign(args: AssignArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config().unwrap_or_default();
    let forest = read_forest(&args.tree)?;
    let items = read_pending(&args.items)?;

    let mut options = SessionOptions::from(&config);
    if args.allow_duplicates {
        options.duplicate_policy = DuplicatePolicy::Allow;
    }

    let mut session =
        AssignmentController::with_options(forest, options, draft_store(&config, ctx));
    session.enter_assignment(items);

    if args.all {
        session.select_all();
    } else {
        for key in &args.select {
            session.toggle_checkbox(key);
        }
    }
    session.set_target(args.target.clone());

    let report = session.assign_selected().context("Assignment rejected")?;
    if report.assigned.is_empty() {
        bail!(
            "Target {} is not in {}",
            report.target,
            args.tree.display()
        );
    }
    info!(assigned = report.assigned.len(), remaining = report.remaining, "assignment applied");

    let submission = match session.finalize(args.discard_rest) {
        Ok(submission) => submission,
        Err(SubmitError::IncompleteSubmission { remaining }) => {
            let keys: Vec<&str> = remaining.iter().map(|i| i.key.as_str()).collect();
            let kept = if ctx.dry_run {
                "nothing was saved (dry run)"
            } else {
                "they are kept in the draft"
            };
            bail!(
                "{} item(s) still unassigned ({}); {}. \
                 Re-run with --discard-rest to drop them.",
                keys.len(),
                keys.join(", "),
                kept
            );
        }
    };

    if !ctx.quiet {
        let msg = format!(
            "Assigned {} item(s) under {}",
            report.assigned.len(),
            report.target
        );
        if ctx.no_color {
            eprintln!("{msg}");
        } else {
            eprintln!("{}", msg.green());
        }
        if !submission.discarded.is_empty() {
            eprintln!("Discarded {} unassigned item(s)", submission.discarded.len());
        }
    }

    if ctx.dry_run {
        if !ctx.quiet {
            eprintln!("DRY RUN: tree not written");
        }
        return Ok(());
    }
    write_json(&submission.tree, args.output.as_deref())
}

#[instrument(skip_all, fields(drag = %args.drag, drop = %args.drop))]
pub fn move_node(args: MoveArgs, ctx: &AppContext) -> Result<()> {
    let forest = read_forest(&args.tree)?;

    let mut expansion = ExpansionState::new();
    expansion.expand_all(args.expanded.iter().cloned());

    let event = DropEvent {
        drag_key: args.drag.clone(),
        drop_key: args.drop.clone(),
        drop_to_gap: args.gap,
        drop_position: args.position,
    };
    let outcome = drag_move(&forest, &expansion, &event)
        .with_context(|| format!("Cannot move {} to {}", args.drag, args.drop))?;

    if !ctx.quiet {
        eprintln!("Moved {} relative to {}", args.drag, args.drop);
    }
    if ctx.dry_run {
        return Ok(());
    }
    write_json(&outcome.tree, args.output.as_deref())
}
