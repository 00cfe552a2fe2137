use rackguard_snapshot::{name_key, Orientation, PositionRange};
use std::collections::HashMap;

/// Space reserved by a row earlier in the same pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub range: PositionRange,
    pub orientation: Orientation,
    pub row_index: usize,
}

/// In-batch duplicate detection, scoped to one validation pass.
///
/// First claimant wins. Callers must present the rows of a rack in ordinal
/// order for the outcome to be reproducible.
#[derive(Debug, Default)]
pub struct ClaimTracker {
    claims: HashMap<String, Vec<Claim>>,
}

impl ClaimTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest row index holding a claim that collides with this space
    pub fn conflict(
        &self,
        rack: &str,
        range: &PositionRange,
        orientation: Orientation,
    ) -> Option<usize> {
        self.claims
            .get(&name_key(rack))?
            .iter()
            .filter(|claim| {
                claim.range.overlaps(range) && claim.orientation.conflicts_with(orientation)
            })
            .map(|claim| claim.row_index)
            .min()
    }

    /// Reserve the space for `row_index`. Returns the original claimant when
    /// the space is already taken; the existing claim is left untouched.
    pub fn claim(
        &mut self,
        rack: &str,
        range: PositionRange,
        orientation: Orientation,
        row_index: usize,
    ) -> Option<usize> {
        if let Some(existing) = self.conflict(rack, &range, orientation) {
            return Some(existing);
        }
        self.claims.entry(name_key(rack)).or_default().push(Claim {
            range,
            orientation,
            row_index,
        });
        None
    }

    pub fn claims_for(&self, rack: &str) -> &[Claim] {
        self.claims
            .get(&name_key(rack))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.claims.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
