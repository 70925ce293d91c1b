//! In-memory container used by the CLI and tests.

use super::{ItemRenderer, RenderEntry, VisualContainer};
use crate::models::ItemKey;
use std::fmt::Write as _;

/// One painted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessNode {
    pub key: ItemKey,
    pub label: String,
    pub classes: String,
    /// Serial assigned at creation; survives patches and moves.
    pub serial: u64,
}

/// Counts every structural operation so callers can check node identity.
#[derive(Debug, Default)]
pub struct HeadlessContainer {
    nodes: Vec<HeadlessNode>,
    placeholder: bool,
    pub inserts: usize,
    pub relocations: usize,
    pub removals: usize,
    pub clears: usize,
}

impl HeadlessContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[HeadlessNode] {
        &self.nodes
    }

    pub fn serials(&self) -> Vec<u64> {
        self.nodes.iter().map(|node| node.serial).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.label.as_str()).collect()
    }

    /// Zero every operation counter.
    pub fn reset_counters(&mut self) {
        self.inserts = 0;
        self.relocations = 0;
        self.removals = 0;
        self.clears = 0;
    }

    /// One line per node: `<n>. <label>` plus classes in brackets.
    pub fn render_text(&self) -> String {
        if self.placeholder {
            return "(empty)\n".to_string();
        }
        let mut out = String::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let _ = write!(out, "{:>3}. {}", index + 1, node.label);
            if !node.classes.is_empty() {
                let _ = write!(out, " [{}]", node.classes);
            }
            out.push('\n');
        }
        out
    }
}

impl VisualContainer for HeadlessContainer {
    type Node = HeadlessNode;

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn key_at(&self, index: usize) -> Option<ItemKey> {
        self.nodes.get(index).map(|node| node.key.clone())
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut HeadlessNode> {
        self.nodes.get_mut(index)
    }

    fn insert(&mut self, index: usize, node: HeadlessNode) {
        self.placeholder = false;
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
        self.inserts += 1;
    }

    fn relocate(&mut self, from: usize, to: usize) {
        if from >= self.nodes.len() || from == to {
            return;
        }
        let node = self.nodes.remove(from);
        let to = to.min(self.nodes.len());
        self.nodes.insert(to, node);
        self.relocations += 1;
    }

    fn remove(&mut self, index: usize) -> Option<HeadlessNode> {
        if index >= self.nodes.len() {
            return None;
        }
        self.removals += 1;
        Some(self.nodes.remove(index))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.placeholder = false;
        self.clears += 1;
    }

    fn shows_placeholder(&self) -> bool {
        self.placeholder
    }

    fn show_placeholder(&mut self) {
        self.nodes.clear();
        self.placeholder = true;
    }
}

/// Renders items as labelled [`HeadlessNode`]s.
pub struct HeadlessRenderer<F> {
    label: F,
    next_serial: u64,
    pub created: usize,
    pub patched: usize,
}

impl<F> HeadlessRenderer<F> {
    pub fn new(label: F) -> Self {
        Self {
            label,
            next_serial: 0,
            created: 0,
            patched: 0,
        }
    }
}

impl<T, F> ItemRenderer<T, HeadlessNode> for HeadlessRenderer<F>
where
    F: Fn(&T) -> String,
{
    fn create(&mut self, entry: &RenderEntry<T>, _position: usize) -> HeadlessNode {
        self.next_serial += 1;
        self.created += 1;
        HeadlessNode {
            key: entry.key.clone(),
            label: (self.label)(&entry.item),
            classes: entry.class.css_classes(),
            serial: self.next_serial,
        }
    }

    fn patch(&mut self, node: &mut HeadlessNode, entry: &RenderEntry<T>, _position: usize) {
        self.patched += 1;
        node.label = (self.label)(&entry.item);
        node.classes = entry.class.css_classes();
    }
}
