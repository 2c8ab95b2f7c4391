/// Approvals needed to admit an airline given the current number of funded
/// members. Recomputed on every vote since membership changes over time.
///
/// Below `bootstrap_threshold` a single approval suffices; from there on a
/// target needs `ceil(funded_count / 2)` distinct voters.
pub fn quorum(funded_count: usize, bootstrap_threshold: usize) -> usize {
    if funded_count < bootstrap_threshold {
        1
    } else {
        funded_count.div_ceil(2)
    }
}
