// Nomination order: whose turn it is to put a player on the block.

use super::pick::Owner;

/// The owner whose turn it is to nominate, given the number of picks
/// already completed.
///
/// Returns `None` when the owner list is empty (no session can run
/// without participants). Owners are re-sorted by id on every call, so
/// the result is independent of the order the list arrived in from the
/// backend.
pub fn current_nominator(owners: &[Owner], pick_count: usize) -> Option<&Owner> {
    if owners.is_empty() {
        return None;
    }
    let mut sorted: Vec<&Owner> = owners.iter().collect();
    sorted.sort_by_key(|o| o.id);
    Some(sorted[pick_count % sorted.len()])
}
