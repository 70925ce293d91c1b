//! `curio replay`: run an edit script against a JSON list file.

use crate::script::{parse_script, Op};
use crate::store::{load_records, JsonFileStore};
use anyhow::Context;
use chrono::{DateTime, Utc};
use curio_core::{
    apply_plan, shared_list, track, BatchManager, BatchOptions, Config, CoreError,
    HeadlessContainer, HeadlessRenderer, ListRenderer, Record, RenderEntry, RenderPass, SaveBar,
    SaveCoordinator,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// State of the list once a script has run.
#[derive(Debug)]
pub struct ReplayReport {
    pub steps: usize,
    pub view: String,
    pub items: Vec<Record>,
    pub selection: Vec<usize>,
    pub dirty: bool,
    pub diff: String,
    pub committed_at: Option<DateTime<Utc>>,
}

impl ReplayReport {
    pub fn to_text(&self) -> String {
        let mut out = self.view.clone();
        if !self.selection.is_empty() {
            let picks: Vec<String> = self.selection.iter().map(usize::to_string).collect();
            out.push_str(&format!("selection: {}\n", picks.join(", ")));
        }
        out.push_str(if self.dirty {
            "unsaved changes\n"
        } else {
            "no unsaved changes\n"
        });
        if let Some(at) = self.committed_at {
            out.push_str(&format!("saved at {}\n", at.to_rfc3339()));
        }
        if !self.diff.is_empty() {
            out.push_str(&self.diff);
        }
        out
    }

    pub fn to_json(&self) -> Value {
        json!({
            "steps": self.steps,
            "items": self.items,
            "selection": self.selection,
            "dirty": self.dirty,
            "diff": self.diff,
            "committed_at": self.committed_at.map(|at| at.to_rfc3339()),
        })
    }
}

/// Load `list_path`, apply `script`, optionally commit, and render the result.
///
/// # Arguments
/// - `list_path`: JSON array of objects; rewritten in place on commit.
/// - `script`: Edit script text (see [`crate::script::parse_script`]).
/// - `commit_at_end`: Commit after the last scripted step.
/// - `config`: Transient fields, paint chunk size and affordance flag.
///
/// # Errors
/// Returns an error for unreadable input, script syntax errors, and failed
/// or refused commits/reverts (naming the script line).
pub async fn replay(
    list_path: &Path,
    script: &str,
    commit_at_end: bool,
    config: &Config,
) -> anyhow::Result<ReplayReport> {
    let steps = parse_script(script)?;
    let items = load_records(list_path)
        .with_context(|| format!("failed to load {}", list_path.display()))?;

    let bar = SaveBar::new();
    let store = Rc::new(RefCell::new(JsonFileStore::new(list_path, items.clone())));
    let manager = BatchManager::shared(
        shared_list(items),
        BatchOptions::from_config(config, Some(bar.clone())),
    );

    let save_manager = Rc::clone(&manager);
    let save_store = Rc::clone(&store);
    let cancel_manager = Rc::clone(&manager);
    let coordinator = SaveCoordinator::new(
        bar,
        vec![track(&manager)],
        move || {
            let manager = Rc::clone(&save_manager);
            let store = Rc::clone(&save_store);
            async move {
                let plan = manager.borrow().commit_plan();
                let mut remote = store.borrow().clone();
                let report = apply_plan(&mut remote, &plan).await?;
                *store.borrow_mut() = remote;
                tracing::info!(deleted = report.deleted, kept = report.kept, "Applied commit plan");
                manager.borrow_mut().mark_committed()?;
                Ok::<(), CoreError>(())
            }
        },
        move || {
            let manager = Rc::clone(&cancel_manager);
            async move {
                manager.borrow_mut().reset()?;
                Ok::<(), CoreError>(())
            }
        },
    );

    for step in &steps {
        match step.op {
            Op::Select(position) => manager.borrow_mut().toggle_select(position),
            Op::Move(target) => {
                let outcome = manager.borrow_mut().move_to(target);
                tracing::debug!(line = step.line, ?outcome, "move");
            }
            Op::Delete(position) => manager.borrow_mut().toggle_delete(position),
            Op::Clear => manager.borrow_mut().clear_selection(),
            Op::Reset => coordinator
                .revert()
                .await
                .with_context(|| format!("reset on line {} failed", step.line))?,
            Op::Commit => coordinator
                .commit()
                .await
                .with_context(|| format!("commit on line {} failed", step.line))?,
        }
    }
    if commit_at_end {
        coordinator.commit().await.context("final commit failed")?;
    }

    let entries = RenderEntry::from_manager(&manager.borrow());
    let mut container = HeadlessContainer::new();
    let mut renderer = HeadlessRenderer::new(Record::label);
    let pass = ListRenderer::from_config(config).render(&mut container, entries, &mut renderer);
    if let RenderPass::Bulk(paint) = pass {
        paint.run(&mut container, &mut renderer).await;
    }

    let manager = manager.borrow();
    let items = manager.list().borrow().clone();
    Ok(ReplayReport {
        steps: steps.len(),
        view: container.render_text(),
        items,
        selection: manager.selection().positions().to_vec(),
        dirty: manager.is_dirty(),
        diff: manager.pending_diff(),
        committed_at: coordinator.last_committed_at(),
    })
}
