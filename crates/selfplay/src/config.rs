/// Self-play driver settings
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Simulations for a full search (root noise, recorded for training)
    pub full_search_simulations: u32,

    /// Simulations for a fast search (no noise, not recorded)
    pub fast_search_simulations: u32,

    /// Chance that a turn uses a full search
    pub full_search_probability: f32,

    /// Turns numbered below this are played at temperature 1, later ones greedily
    pub temperature_threshold: u32,

    /// Seed for move sampling and the full/fast coin; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            full_search_simulations: 400,
            fast_search_simulations: 50,
            full_search_probability: 0.25,
            temperature_threshold: 15,
            seed: None,
        }
    }
}

/// Arena settings
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub num_games: u32,

    /// Simulations per move for both engines
    pub simulations: u32,

    /// Share of `num_games` wins after which the match stops early
    pub acceptance_threshold: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            num_games: 40,
            simulations: 400,
            acceptance_threshold: 0.55,
        }
    }
}
