//! Visual list reconciliation.
//!
//! A container holds one persistent visual node per item, keyed by the
//! item's [`ItemKey`]. Re-rendering walks the new order and patches, moves,
//! creates or removes nodes so untouched nodes keep their state (scroll,
//! focus, hover, loaded media). The first paint of a scope skips all of that
//! and appends in chunks through [`BulkPaint`].

mod bulk;
mod headless;


pub use bulk::{BulkPaint, PaintProgress};
pub use headless::{HeadlessContainer, HeadlessNode, HeadlessRenderer};

use crate::batch::{BatchManager, ItemClass};
use crate::models::{Item, ItemKey};
use crate::Config;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// A visual container whose children can be addressed by position.
pub trait VisualContainer {
    type Node;

    /// Number of item nodes (the placeholder does not count).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity key of the node at `index`, if it carries one.
    fn key_at(&self, index: usize) -> Option<ItemKey>;

    fn node_mut(&mut self, index: usize) -> Option<&mut Self::Node>;

    /// Insert `node` before whatever sits at `index` (or at the end).
    fn insert(&mut self, index: usize, node: Self::Node);

    /// Move the node at `from` so it sits at `to`.
    fn relocate(&mut self, from: usize, to: usize);

    fn remove(&mut self, index: usize) -> Option<Self::Node>;

    /// Drop every node and the placeholder.
    fn clear(&mut self);

    fn append(&mut self, node: Self::Node) {
        let end = self.len();
        self.insert(end, node);
    }

    /// Whether the container shows the empty-list placeholder.
    fn shows_placeholder(&self) -> bool;

    /// Replace all nodes with the empty-list placeholder.
    fn show_placeholder(&mut self);
}

/// Builds and updates the visual node of one item.
pub trait ItemRenderer<T, N> {
    fn create(&mut self, entry: &RenderEntry<T>, position: usize) -> N;

    fn patch(&mut self, node: &mut N, entry: &RenderEntry<T>, position: usize);
}

/// One item as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEntry<T> {
    pub key: ItemKey,
    pub item: T,
    pub class: ItemClass,
}

impl<T: Item> RenderEntry<T> {
    /// Entries for every item a manager governs.
    pub fn from_manager(manager: &BatchManager<T>) -> Vec<Self> {
        Self::from_manager_where(manager, |_| true)
    }

    /// Entries for the items matching `keep`, e.g. a live filter.
    ///
    /// Keys and classes use the item's position in the full list.
    pub fn from_manager_where(manager: &BatchManager<T>, keep: impl Fn(&T) -> bool) -> Vec<Self> {
        let list = manager.list();
        let items = list.borrow();
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| keep(*item))
            .map(|(position, item)| Self {
                key: item.key_at(position),
                item: item.clone(),
                class: manager.classification_of(position),
            })
            .collect()
    }
}

/// Node operations performed by one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub patched: usize,
    pub moved: usize,
    pub removed: usize,
}

impl ReconcileStats {
    /// Whether any node was built or destroyed.
    pub fn changed_structure(&self) -> bool {
        self.created > 0 || self.removed > 0
    }
}

/// Update `container` in place so its nodes follow `entries`.
///
/// Nodes whose key appears in `entries` are patched and moved into place;
/// unknown keys get new nodes; nodes left over afterwards are removed.
/// Repeated keys are matched in order of appearance, so an unchanged list
/// with duplicates still re-renders without churn.
pub fn reconcile<T, C, R>(container: &mut C, entries: &[RenderEntry<T>], renderer: &mut R) -> ReconcileStats
where
    C: VisualContainer,
    R: ItemRenderer<T, C::Node>,
{
    let mut stats = ReconcileStats::default();
    // Mirror of the container's keys, kept in step with every structural op.
    let mut keys: Vec<Option<ItemKey>> = (0..container.len())
        .map(|index| container.key_at(index))
        .collect();
    let mut unclaimed: HashMap<ItemKey, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        *unclaimed.entry(key.clone()).or_insert(0) += 1;
    }

    for (position, entry) in entries.iter().enumerate() {
        let claimed = match unclaimed.get_mut(&entry.key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        };
        // Claimed nodes all sit before `position`.
        let existing = if claimed {
            keys.iter()
                .skip(position)
                .position(|key| key.as_ref() == Some(&entry.key))
                .map(|offset| position + offset)
        } else {
            None
        };

        match existing {
            Some(current) => {
                if current != position {
                    container.relocate(current, position);
                    let key = keys.remove(current);
                    keys.insert(position, key);
                    stats.moved += 1;
                }
                if let Some(node) = container.node_mut(position) {
                    renderer.patch(node, entry, position);
                    stats.patched += 1;
                }
            }
            None => {
                let node = renderer.create(entry, position);
                let at = position.min(container.len());
                container.insert(at, node);
                keys.insert(at.min(keys.len()), Some(entry.key.clone()));
                stats.created += 1;
            }
        }
    }

    while container.len() > entries.len() {
        container.remove(container.len() - 1);
        stats.removed += 1;
    }

    stats
}

/// Outcome of a [`ListRenderer::render`] call.
#[derive(Debug)]
pub enum RenderPass<T> {
    /// The list was empty; the container shows its placeholder.
    Placeholder,
    /// The container was reconciled synchronously.
    Patched(ReconcileStats),
    /// First paint of a scope: the first chunk is painted, the caller drives
    /// the rest.
    Bulk(BulkPaint<T>),
}

/// Chooses between bulk paint and reconcile for each render of a container.
#[derive(Debug, Clone)]
pub struct ListRenderer {
    chunk_size: usize,
    generation: Rc<Cell<u64>>,
}

impl ListRenderer {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.paint_chunk_size)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Render `entries` into `container`.
    ///
    /// Every call starts a new render generation; a bulk paint from an
    /// earlier generation stops at its next step.
    pub fn render<T, C, R>(
        &self,
        container: &mut C,
        entries: Vec<RenderEntry<T>>,
        renderer: &mut R,
    ) -> RenderPass<T>
    where
        C: VisualContainer,
        R: ItemRenderer<T, C::Node>,
    {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        if entries.is_empty() {
            container.show_placeholder();
            return RenderPass::Placeholder;
        }

        if container.is_empty() || container.shows_placeholder() {
            container.clear();
            let mut paint = BulkPaint::new(
                entries,
                self.chunk_size,
                generation,
                Rc::clone(&self.generation),
            );
            paint.step(container, renderer);
            return RenderPass::Bulk(paint);
        }

        let stats = reconcile(container, &entries, renderer);
        tracing::trace!(?stats, "reconciled container");
        RenderPass::Patched(stats)
    }
}

impl Default for ListRenderer {
    fn default() -> Self {
        Self::new(crate::DEFAULT_PAINT_CHUNK)
    }
}
