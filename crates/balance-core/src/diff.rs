// ── Set difference ──
//
// Name-set comparison driving every reconcile phase.

use std::collections::BTreeSet;

/// Partition of two name sets. Each vector is sorted and duplicate-free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetDiff {
    /// Present only in the existing (live) set: delete candidates.
    pub only_existing: Vec<String>,
    /// Present only in the desired set: create candidates.
    pub only_desired: Vec<String>,
    /// Present in both: update candidates.
    pub both: Vec<String>,
}

/// Compare `existing` against `desired` with set semantics; duplicates in
/// either input are ignored.
pub fn compare_sets<E, D>(existing: E, desired: D) -> SetDiff
where
    E: IntoIterator,
    E::Item: AsRef<str>,
    D: IntoIterator,
    D::Item: AsRef<str>,
{
    let existing: BTreeSet<String> = existing.into_iter().map(|s| s.as_ref().to_owned()).collect();
    let desired: BTreeSet<String> = desired.into_iter().map(|s| s.as_ref().to_owned()).collect();

    SetDiff {
        only_existing: existing.difference(&desired).cloned().collect(),
        only_desired: desired.difference(&existing).cloned().collect(),
        both: existing.intersection(&desired).cloned().collect(),
    }
}
