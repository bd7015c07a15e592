//! The hotel particle: worker ground truth plus the robot's beliefs about
//! containers and hotel type (spec §3 "Particle (State)", §4.7).

use super::worker::WorkerState;

#[derive(Debug, Clone)]
pub struct ContainerBelief {
    pub cost: u32,
    pub priority: i32,
    pub needed: bool,
    pub likelihood_empty: f64,
    pub likelihood_not_empty: f64,
    pub prob_empty: f64,
    pub likelihood_assembled: f64,
    pub likelihood_not_assembled: f64,
    pub prob_assembled: f64,
}

impl ContainerBelief {
    pub fn new(cost: u32, priority: i32) -> Self {
        Self {
            cost,
            priority,
            needed: false,
            likelihood_empty: 1.0,
            likelihood_not_empty: 1.0,
            prob_empty: 0.5,
            likelihood_assembled: 1.0,
            likelihood_not_assembled: 1.0,
            prob_assembled: 0.5,
        }
    }

    pub fn recompute_prob_empty(&mut self) {
        let denom = 0.5 * self.likelihood_empty + 0.5 * self.likelihood_not_empty;
        self.prob_empty = (0.5 * self.likelihood_empty / denom).clamp(1e-3, 1.0 - 1e-3);
    }

    /// `original_source`'s `Perceive` branch floors both likelihoods at
    /// `0.001` before recomputing, to keep updates from stalling.
    pub fn recompute_prob_assembled(&mut self) {
        self.likelihood_assembled = self.likelihood_assembled.max(0.001);
        self.likelihood_not_assembled = self.likelihood_not_assembled.max(0.001);
        let denom = 0.5 * self.likelihood_assembled + 0.5 * self.likelihood_not_assembled;
        self.prob_assembled = (0.5 * self.likelihood_assembled / denom).clamp(1e-3, 1.0 - 1e-3);
    }
}

/// Belief about which of the two declared hotel types is currently being
/// assembled (spec §3), per `original_source`'s `po_objects[...].ProbT0`. One
/// of these is kept per hotel in the episode, indexed in parallel with
/// `WorkerState::hotels`.
#[derive(Debug, Clone)]
pub struct TypeBelief {
    pub prob_type0: f64,
    pub likelihood_type0: f64,
    pub likelihood_not_type0: f64,
    pub assumed: bool,
}

impl TypeBelief {
    pub fn new() -> Self {
        Self { prob_type0: 0.5, likelihood_type0: 1.0, likelihood_not_type0: 1.0, assumed: false }
    }

    pub fn recompute(&mut self) {
        let denom = 0.5 * self.likelihood_type0 + 0.5 * self.likelihood_not_type0;
        self.prob_type0 = (0.5 * self.likelihood_type0 / denom).clamp(1e-3, 1.0 - 1e-3);
    }
}

#[derive(Debug, Clone)]
pub struct HotelState {
    /// Worker ground truth: the episode's hotel sequence (each with its own
    /// true type, unknown to the robot except through `InspectObject`), the
    /// active index, and the shared assembled-parts pool.
    pub worker: WorkerState,
    /// Whether each container currently holds its part instance.
    pub storage: Vec<bool>,
    pub containers: Vec<ContainerBelief>,
    /// One belief per hotel, indexed in parallel with `worker.hotels`.
    pub hotel_types: Vec<TypeBelief>,
}

impl HotelState {
    pub fn empty(&self, part: usize) -> bool {
        !self.storage[part]
    }
}
