//! Assembly worker policy graph (spec §4.4). An episode assembles a
//! *sequence* of products (spec §3 "active product index; per-product
//! completion flags", `original_source`'s `state.trucks`/`state.truck`): the
//! worker always targets the active product, looked up by its (partially
//! observed) type, and advances to the next index once the current one is
//! complete. Each product instance gets its own per-part assembly progress
//! (`original_source` gives every `TRUCK` its own `vector<PART>`), unlike the
//! hotel domain's single shared parts pool.

use crate::random::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerActivity {
    None,
    Assemble(usize),
    Wait,
    Glue(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail,
    Done,
}

/// A declared product template: the parts it needs and its glue requirement
/// (spec §6 "Assembly additionally requires per-object `type`/`needsGlue`").
#[derive(Debug, Clone)]
pub struct ProductType {
    pub parts: Vec<usize>,
    pub needs_glue: bool,
    pub glue_type: usize,
}

/// Constants grounded in `assembly_worker.cpp::generateOutcomes` and
/// `assembly_robot.cpp::StepNormal`.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyRewards {
    pub assemble_ok: f64,
    pub assemble_fail: f64,
    pub wait: f64,
    pub glue_ok: f64,
    pub glue_fail: f64,
    pub perceive: f64,
    pub restock: f64,
    pub wrong_goal: f64,
    pub bring_glue: f64,
}

impl Default for AssemblyRewards {
    fn default() -> Self {
        Self {
            assemble_ok: 0.0,
            assemble_fail: -5.0,
            wait: -2.0,
            glue_ok: 5.0,
            glue_fail: -5.0,
            perceive: -0.5,
            restock: -2.0,
            wrong_goal: -5.0,
            bring_glue: -2.0,
        }
    }
}

/// One product instance within the episode: its (partially observed) ground
/// truth type plus its own per-part assembly progress. Indexed in parallel
/// with `AssemblyState::product_types`, the assistant's belief array.
#[derive(Debug, Clone)]
pub struct ProductState {
    pub true_type: usize,
    pub complete: bool,
    pub assembled: Vec<bool>,
    pub glue_applied: bool,
}

impl ProductState {
    pub fn new(true_type: usize, num_parts: usize) -> Self {
        Self { true_type, complete: false, assembled: vec![false; num_parts], glue_applied: false }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerState {
    pub activity: WorkerActivity,
    pub outcome: Outcome,
    pub glue_held: Option<usize>,
    /// Index into `products` of the product currently being worked on. Only
    /// ever increases (spec §3 invariant: "advances monotonically").
    pub active_product: usize,
    pub products: Vec<ProductState>,
    /// Whole-episode completion: every product's `complete` flag is set.
    pub done: bool,
}

impl WorkerState {
    pub fn new(products: Vec<ProductState>) -> Self {
        Self { activity: WorkerActivity::None, outcome: Outcome::Ok, glue_held: None, active_product: 0, products, done: false }
    }
}

/// One worker tick: resolves a `None` dispatch instantly (no reward, no
/// terminal signal beyond the completion case itself), then performs exactly
/// one of `{Assemble, Wait, Glue}` against the active product and returns its
/// reward plus whether the whole episode is now complete, plus the part (if
/// any) whose failed assembly should mark its container `needed` (spec §4.4
/// transitions). `catalogue` is indexed by each product's (possibly
/// unresolved) true type, looked up fresh every tick since the active
/// product can advance mid-tick.
pub fn tick(
    catalogue: &[ProductType],
    storage: &mut [usize],
    state: &mut WorkerState,
    rewards: &AssemblyRewards,
) -> (f64, bool, Option<usize>) {
    loop {
        if state.done {
            return (0.0, true, None);
        }
        let idx = state.active_product;
        let product = &catalogue[state.products[idx].true_type % catalogue.len()];
        match state.activity {
            WorkerActivity::None => {
                if let Some(&part) = product.parts.iter().find(|&&p| !state.products[idx].assembled[p]) {
                    state.activity = WorkerActivity::Assemble(part);
                    continue;
                }
                if product.needs_glue && !state.products[idx].glue_applied {
                    state.activity = WorkerActivity::Glue(product.glue_type);
                    continue;
                }
                state.products[idx].complete = true;
                state.activity = WorkerActivity::None;
                if idx + 1 < state.products.len() {
                    state.active_product += 1;
                } else {
                    state.done = true;
                    state.outcome = Outcome::Done;
                }
                return (0.0, state.done, None);
            }
            WorkerActivity::Assemble(part) => {
                state.activity = WorkerActivity::None;
                if storage[part] > 0 {
                    storage[part] -= 1;
                    state.products[idx].assembled[part] = true;
                    state.outcome = Outcome::Ok;
                    return (rewards.assemble_ok, false, None);
                }
                state.outcome = Outcome::Fail;
                state.activity = WorkerActivity::Wait;
                return (rewards.assemble_fail, false, Some(part));
            }
            WorkerActivity::Wait => {
                state.activity = WorkerActivity::None;
                return (rewards.wait, false, None);
            }
            WorkerActivity::Glue(glue_type) => {
                if state.glue_held == Some(glue_type) {
                    state.glue_held = None;
                    state.products[idx].glue_applied = true;
                    state.outcome = Outcome::Done;
                    state.activity = WorkerActivity::None;
                    // The next None-resolution marks this product complete
                    // (and advances); this tick reports the glue success
                    // itself so PGS can see it.
                    return (rewards.glue_ok, false, None);
                }
                state.outcome = Outcome::Fail;
                state.activity = WorkerActivity::Wait;
                return (rewards.glue_fail, false, None);
            }
        }
    }
}

pub fn bring_glue(state: &mut WorkerState, glue_type: usize) {
    state.glue_held = Some(glue_type);
}

pub fn random_activity(rng: &mut Rng) -> WorkerActivity {
    match rng.uniform_index(4) {
        0 => WorkerActivity::None,
        1 => WorkerActivity::Wait,
        _ => WorkerActivity::None,
    }
}

pub fn random_outcome(rng: &mut Rng) -> Outcome {
    match rng.uniform_index(3) {
        0 => Outcome::Ok,
        1 => Outcome::Fail,
        _ => Outcome::Done,
    }
}
