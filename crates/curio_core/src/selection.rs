//! Click-ordered selection of list positions.

/// Distinct list positions in the order the user picked them.
///
/// Order matters: the reorder engine moves items in pick order, not in
/// ascending index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedSelection {
    positions: Vec<usize>,
}

impl OrderedSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `position` when already picked, append it otherwise.
    ///
    /// # Returns
    /// `true` when the position is selected after the call.
    pub fn toggle(&mut self, position: usize) -> bool {
        if self.remove(position) {
            false
        } else {
            self.positions.push(position);
            true
        }
    }

    /// Drop `position` from the selection.
    ///
    /// # Returns
    /// `true` when the position was selected.
    pub fn remove(&mut self, position: usize) -> bool {
        match self.positions.iter().position(|p| *p == position) {
            Some(slot) => {
                self.positions.remove(slot);
                true
            }
            None => false,
        }
    }

    /// Forget every picked position.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Keep only positions below `len`, preserving pick order.
    ///
    /// # Returns
    /// Number of positions dropped.
    pub fn retain_in_bounds(&mut self, len: usize) -> usize {
        let before = self.positions.len();
        self.positions.retain(|position| *position < len);
        before - self.positions.len()
    }

    /// 1-based pick rank of `position`, used for numbering badges.
    pub fn rank_of(&self, position: usize) -> Option<usize> {
        self.positions
            .iter()
            .position(|p| *p == position)
            .map(|slot| slot + 1)
    }

    pub fn contains(&self, position: usize) -> bool {
        self.positions.contains(&position)
    }

    /// Picked positions in pick order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
