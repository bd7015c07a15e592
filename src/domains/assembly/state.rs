//! The assembly particle: worker ground truth plus the robot's beliefs about
//! containers and truck type (spec §3 "Particle (State)").

use super::worker::WorkerState;

#[derive(Debug, Clone)]
pub struct ContainerBelief {
    pub capacity: usize,
    pub cost: u32,
    pub priority: i32,
    pub needed: bool,
    pub likelihood_empty: f64,
    pub likelihood_not_empty: f64,
    pub prob_empty: f64,
}

impl ContainerBelief {
    pub fn new(capacity: usize, cost: u32, priority: i32) -> Self {
        Self {
            capacity,
            cost,
            priority,
            needed: false,
            likelihood_empty: 1.0,
            likelihood_not_empty: 1.0,
            prob_empty: 0.5,
        }
    }

    pub fn recompute_prob_empty(&mut self) {
        let denom = 0.5 * self.likelihood_empty + 0.5 * self.likelihood_not_empty;
        self.prob_empty = (0.5 * self.likelihood_empty / denom).clamp(1e-3, 1.0 - 1e-3);
    }
}

/// Belief about which declared product type is currently being assembled
/// (spec §3 "for each partially-observed product, (ProbType, LikelihoodType,
/// LikelihoodNotType, typeAssumed)"). Modelled as a binary hypothesis "is it
/// type 0" per `original_source`'s `po_truck[...].ProbT0`. One of these is
/// kept per product in the episode, indexed in parallel with
/// `WorkerState::products`.
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
pub struct AssemblyState {
    /// Worker ground truth: the episode's product sequence (each with its own
    /// true type, unknown to the robot except through `InspectTruck`), the
    /// active index, and per-product assembly progress.
    pub worker: WorkerState,
    pub storage: Vec<usize>,
    pub containers: Vec<ContainerBelief>,
    /// One belief per product, indexed in parallel with `worker.products`.
    pub product_types: Vec<TypeBelief>,
}

impl AssemblyState {
    pub fn empty(&self, part: usize) -> bool {
        self.storage[part] == 0
    }
}
