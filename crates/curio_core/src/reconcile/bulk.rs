//! Chunked first paint of a scope.

use super::{ItemRenderer, RenderEntry, VisualContainer};
use std::cell::Cell;
use std::rc::Rc;

/// Progress reported by [`BulkPaint::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintProgress {
    /// One chunk appended; `remaining` entries still to paint.
    Painted { painted: usize, remaining: usize },
    Done,
    /// A newer render started; this paint stopped.
    Superseded,
}

/// Appends entries to an already cleared container, one chunk per step.
///
/// Identity is not preserved here: there is nothing on screen yet.
#[derive(Debug)]
pub struct BulkPaint<T> {
    entries: Vec<RenderEntry<T>>,
    next: usize,
    chunk_size: usize,
    generation: u64,
    current: Rc<Cell<u64>>,
}

impl<T> BulkPaint<T> {
    pub(super) fn new(
        entries: Vec<RenderEntry<T>>,
        chunk_size: usize,
        generation: u64,
        current: Rc<Cell<u64>>,
    ) -> Self {
        Self {
            entries,
            next: 0,
            chunk_size: chunk_size.max(1),
            generation,
            current,
        }
    }

    /// Whether no newer render has started since this paint began.
    pub fn is_current(&self) -> bool {
        self.current.get() == self.generation
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.entries.len()
    }

    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.next)
    }

    /// Append the next chunk.
    pub fn step<C, R>(&mut self, container: &mut C, renderer: &mut R) -> PaintProgress
    where
        C: VisualContainer,
        R: ItemRenderer<T, C::Node>,
    {
        if !self.is_current() {
            return PaintProgress::Superseded;
        }
        if self.is_done() {
            return PaintProgress::Done;
        }

        let end = (self.next + self.chunk_size).min(self.entries.len());
        for position in self.next..end {
            let node = renderer.create(&self.entries[position], position);
            container.append(node);
        }
        let painted = end - self.next;
        self.next = end;

        if self.is_done() {
            PaintProgress::Done
        } else {
            PaintProgress::Painted {
                painted,
                remaining: self.remaining(),
            }
        }
    }

    /// Paint every remaining chunk, yielding to the executor between chunks.
    ///
    /// # Returns
    /// [`PaintProgress::Done`] or [`PaintProgress::Superseded`].
    pub async fn run<C, R>(mut self, container: &mut C, renderer: &mut R) -> PaintProgress
    where
        C: VisualContainer,
        R: ItemRenderer<T, C::Node>,
    {
        loop {
            match self.step(container, renderer) {
                PaintProgress::Painted { .. } => tokio::task::yield_now().await,
                finished => return finished,
            }
        }
    }
}
