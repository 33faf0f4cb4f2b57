/// Configuration for MCTS search
///
/// Passed by value into [`crate::Mcts::new`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Default number of simulations for a full search
    pub num_simulations: u32,

    /// PUCT exploration constant
    pub c_puct: f32,

    /// Dirichlet concentration for root noise (0.03 suits Go-sized action spaces)
    pub dirichlet_alpha: f32,

    /// Share of root prior replaced by noise: P' = (1-ε)*P + ε*noise
    pub dirichlet_epsilon: f32,

    /// Recursion depth after which a simulation stops descending
    pub max_depth: u32,

    /// Value returned when `max_depth` is exceeded
    pub depth_limit_value: f32,

    /// Query the oracle through a random board symmetry at every expansion
    pub random_symmetry: bool,

    /// Seed for noise and symmetry sampling; entropy when `None`
    pub seed: Option<u64>,
}

impl MctsConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of simulations
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Set PUCT exploration constant
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Set root noise parameters
    pub fn with_dirichlet_noise(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enable random dihedral augmentation of oracle queries
    pub fn with_random_symmetry(mut self, enabled: bool) -> Self {
        self.random_symmetry = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 800,
            c_puct: 1.5,
            dirichlet_alpha: 0.03,
            dirichlet_epsilon: 0.25,
            max_depth: 500,
            depth_limit_value: 1e-4,
            random_symmetry: false,
            seed: None,
        }
    }
}
