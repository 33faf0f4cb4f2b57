/// Running tally of recoverable events seen by one engine instance.
///
/// None of these are errors; they exist so drivers can notice a
/// misbehaving oracle or rules engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCounters {
    /// Simulations started from a root
    pub simulations: u64,

    /// Simulations dropped after the retry also failed to yield a playable action
    pub abandoned: u64,

    /// Times a cached legal-move mask was recomputed after a rejected action
    pub mask_refreshes: u64,

    /// Expansions where the oracle prior had no mass on any legal action
    pub degenerate_priors: u64,

    /// Simulations cut off at the maximum recursion depth
    pub depth_cutoffs: u64,

    pub oracle_calls: u64,
}
