//! Hotel worker policy graph (spec §4.7). An episode assembles a *sequence*
//! of hotels (spec §3 "active product index; per-product completion flags",
//! `original_source`'s `state.hotels`/`state.hotel`): the worker always
//! targets the active hotel, looked up by its (partially observed) type, and
//! advances to the next index once it is complete. Unlike the assembly
//! domain, assembled parts are tracked in one pool shared by the whole
//! episode (`original_source`'s single `state.allParts`), not reset between
//! hotels.

use crate::random::Rng;

use super::config::HotelParams;

/// Prob. of the worker "hanging out" in `None` for a tick instead of picking
/// its next activity (`original_source`'s `P_WORKER_DELAY`).
const P_WORKER_DELAY: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerActivity {
    None,
    Wait,
    Assemble(usize),
    Remove(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail,
    Done,
}

/// Constants grounded in `hotel_worker.cpp::generateOutcomes` (worker-level)
/// and `hotel_robot.cpp::StepNormal` (robot action-level).
#[derive(Debug, Clone, Copy)]
pub struct HotelRewards {
    pub assemble_ok: f64,
    pub assemble_fail: f64,
    pub wait: f64,
    pub hotel_complete: f64,
    pub perceive: f64,
    pub wrong_perceive: f64,
    pub restock: f64,
    pub good_restock: f64,
    pub wrong_goal: f64,
}

impl Default for HotelRewards {
    fn default() -> Self {
        Self {
            assemble_ok: 2.0,
            assemble_fail: -2.0,
            wait: 0.0,
            hotel_complete: 5.0,
            perceive: -0.5,
            wrong_perceive: -1.0,
            restock: -2.0,
            good_restock: 2.0,
            wrong_goal: -10.0,
        }
    }
}

/// One hotel instance within the episode: its (partially observed) ground
/// truth type and whether it has been completed. The assembled-parts pool
/// itself is shared across instances (`WorkerState::assembled`).
#[derive(Debug, Clone)]
pub struct HotelInstance {
    pub true_type: usize,
    pub complete: bool,
}

impl HotelInstance {
    pub fn new(true_type: usize) -> Self {
        Self { true_type, complete: false }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerState {
    pub activity: WorkerActivity,
    pub outcome: Outcome,
    pub assembled: Vec<bool>,
    /// Index into `hotels` of the hotel currently being worked on. Only ever
    /// increases (spec §3 invariant: "advances monotonically").
    pub active_hotel: usize,
    pub hotels: Vec<HotelInstance>,
    /// Whole-episode completion: every hotel's `complete` flag is set.
    pub done: bool,
}

impl WorkerState {
    pub fn new(hotels: Vec<HotelInstance>, num_parts: usize) -> Self {
        Self { activity: WorkerActivity::None, outcome: Outcome::Ok, assembled: vec![false; num_parts], active_hotel: 0, hotels, done: false }
    }
}

/// One worker tick: resolves and performs exactly one of
/// `{Assemble, Wait, Remove}` against the active hotel and returns its reward
/// plus whether the whole episode is now complete, plus the part (if any)
/// whose failed assembly should mark its container `needed`. `type_map` is
/// indexed by each hotel instance's (possibly unresolved) true type, looked
/// up fresh every tick since the active hotel can advance mid-tick.
pub fn tick(
    type_map: &[Vec<usize>],
    storage: &mut [bool],
    state: &mut WorkerState,
    rewards: &HotelRewards,
    params: &HotelParams,
    rng: &mut Rng,
) -> (f64, bool, Option<usize>) {
    loop {
        if state.done {
            return (0.0, true, None);
        }

        let idx = state.active_hotel;
        let hotel_type = state.hotels[idx].true_type;
        let hotel_parts = &type_map[hotel_type];
        let fully_assembled = hotel_parts.iter().all(|&p| state.assembled[p]);
        let wrong_parts: Vec<usize> =
            (0..state.assembled.len()).filter(|&p| !hotel_parts.contains(&p) && state.assembled[p]).collect();

        if fully_assembled && wrong_parts.is_empty() {
            state.hotels[idx].complete = true;
            state.activity = WorkerActivity::None;
            state.outcome = Outcome::Done;
            if idx + 1 < state.hotels.len() {
                state.active_hotel += 1;
            } else {
                state.done = true;
            }
            return (rewards.hotel_complete, state.done, None);
        }

        match state.activity {
            WorkerActivity::None => {
                if !wrong_parts.is_empty() && rng.bernoulli(params.expertise) {
                    state.activity = WorkerActivity::Remove(wrong_parts[0]);
                    continue;
                }
                if rng.bernoulli(P_WORKER_DELAY) {
                    return (0.0, false, None);
                }
                let pick_type = if rng.bernoulli(1.0 - params.expertise) { 1 - hotel_type } else { hotel_type };
                let candidates = &type_map[pick_type];
                let mut chosen = None;
                let mut trials = candidates.len();
                while trials > 0 {
                    let part = candidates[rng.uniform_index(candidates.len())];
                    if !state.assembled[part] {
                        chosen = Some(part);
                        break;
                    }
                    trials -= 1;
                }
                match chosen {
                    Some(part) => {
                        state.activity = WorkerActivity::Assemble(part);
                        continue;
                    }
                    None => return (0.0, false, None),
                }
            }
            WorkerActivity::Assemble(part) => {
                if storage[part] {
                    storage[part] = false;
                    state.assembled[part] = true;
                    state.outcome = Outcome::Ok;
                    state.activity = WorkerActivity::None;
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
            WorkerActivity::Remove(part) => {
                state.activity = WorkerActivity::None;
                if state.assembled[part] {
                    storage[part] = true;
                    state.assembled[part] = false;
                }
                return (0.0, false, None);
            }
        }
    }
}
