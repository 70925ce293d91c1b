//! Move-to-target reorder engine.
//!
//! Picked items are lifted out of the list and re-inserted as one block
//! immediately after the clicked target, in pick order.

/// Result of a [`move_selected`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing picked, or the target lies outside the list.
    Ignored,
    /// The target is itself picked; the caller should drop the selection.
    Cancelled,
    /// `count` items now start at `inserted_at`.
    Moved { inserted_at: usize, count: usize },
}

/// Move the items at `picked` (in pick order) to just after `target`.
///
/// Positions in `picked` that fall outside the list, or repeat an earlier
/// pick, are skipped.
///
/// # Arguments
/// - `list`: List mutated in place.
/// - `picked`: Positions in the order they were picked.
/// - `target`: Position of the anchor item, measured before the move.
///
/// # Returns
/// What happened; `list` is untouched unless the outcome is
/// [`MoveOutcome::Moved`].
pub fn move_selected<T>(list: &mut Vec<T>, picked: &[usize], target: usize) -> MoveOutcome {
    let mut order: Vec<usize> = Vec::with_capacity(picked.len());
    for position in picked {
        if *position < list.len() && !order.contains(position) {
            order.push(*position);
        }
    }

    if order.is_empty() || target >= list.len() {
        return MoveOutcome::Ignored;
    }
    if order.contains(&target) {
        return MoveOutcome::Cancelled;
    }

    // Highest index first so earlier removals never shift later ones.
    let mut descending = order.clone();
    descending.sort_unstable_by(|a, b| b.cmp(a));
    let mut lifted: Vec<(usize, T)> = descending
        .into_iter()
        .map(|position| (position, list.remove(position)))
        .collect();

    let moving: Vec<T> = order
        .iter()
        .filter_map(|position| {
            let slot = lifted.iter().position(|(p, _)| p == position)?;
            Some(lifted.swap_remove(slot).1)
        })
        .collect();

    let shift = order.iter().filter(|position| **position < target).count();
    let inserted_at = (target.saturating_sub(shift) + 1).min(list.len());
    let count = moving.len();
    list.splice(inserted_at..inserted_at, moving);

    MoveOutcome::Moved { inserted_at, count }
}
