//! Construction options and per-render classification.

use super::BatchManager;
use crate::coordinator::SaveBar;
use crate::Config;

/// Structural-change callback; receives the manager so views can re-render.
pub type UpdateCallback<T> = Box<dyn FnMut(&BatchManager<T>)>;
/// Dirty-state callback.
pub type ChangeCallback = Box<dyn FnMut(bool)>;

/// Options accepted by [`BatchManager::new`].
pub struct BatchOptions<T> {
    pub(super) on_update: Option<UpdateCallback<T>>,
    pub(super) on_change: Option<ChangeCallback>,
    pub(super) affordance: Option<SaveBar>,
    pub(super) transient_fields: Vec<String>,
}

impl<T> Default for BatchOptions<T> {
    fn default() -> Self {
        Self::from_config(&Config::default(), None)
    }
}

impl<T> BatchOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded from runtime configuration.
    ///
    /// # Arguments
    /// - `config`: Supplies transient fields and the auto-affordance flag.
    /// - `bar`: Shared save bar driven by the manager when auto-affordance
    ///   is enabled; ignored otherwise.
    pub fn from_config(config: &Config, bar: Option<SaveBar>) -> Self {
        Self {
            on_update: None,
            on_change: None,
            affordance: bar.filter(|_| config.auto_affordance),
            transient_fields: config.transient_fields.clone(),
        }
    }

    /// Called after every structural change (selection, order, delete, reset).
    pub fn on_update(mut self, callback: impl FnMut(&BatchManager<T>) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Called with the fresh dirty flag after every dirty re-evaluation.
    pub fn on_change(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Show/hide `bar` directly from this manager's dirty state.
    pub fn affordance(mut self, bar: SaveBar) -> Self {
        self.affordance = Some(bar);
        self
    }

    pub fn transient_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transient_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Selection/delete state of one position, queried once per render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemClass {
    /// 1-based pick rank when selected.
    pub rank: Option<usize>,
    pub deleted: bool,
}

impl ItemClass {
    pub fn is_selected(&self) -> bool {
        self.rank.is_some()
    }

    /// Space-joined view classes: `is-selected order-<rank>` and/or `is-deleted`.
    pub fn css_classes(&self) -> String {
        let mut classes = Vec::new();
        if let Some(rank) = self.rank {
            classes.push("is-selected".to_string());
            classes.push(format!("order-{}", rank));
        }
        if self.deleted {
            classes.push("is-deleted".to_string());
        }
        classes.join(" ")
    }
}
