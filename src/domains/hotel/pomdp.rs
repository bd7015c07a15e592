//! The hotel assistant POMDP (spec §4.7), wiring the worker policy graph,
//! container/type belief state and bit-vector observation codec into the
//! `Simulator` contract.

use crate::entropy::confident;
use crate::ftable::FTable;
use crate::history::History;
use crate::random::Rng;
use crate::simulator::{ActionIndex, Simulator, StepOutcome};

use super::action::{ActionSpace, HotelAction};
use super::config::{Domain, HotelParams};
use super::observation::{encode_bits, NUM_TYPE_OBSERVATIONS, OBS_AMBIGUOUS, OBS_TYPE_A, OBS_TYPE_B};
use super::state::{ContainerBelief, HotelState, TypeBelief};
use super::worker::{self, HotelInstance, HotelRewards, WorkerState};

const PGS_GOAL: f64 = 1.0;
const PGS_NOTGOAL: f64 = -1.0;
const PGS_UNCERTAIN: f64 = -0.5;

pub struct HotelPomdp {
    actions: ActionSpace,
    type_map: Vec<Vec<usize>>,
    unique_parts: Vec<Vec<usize>>,
    part_catalogue: Vec<(u32, i32)>, // (cost, priority)
    params: HotelParams,
    rewards: HotelRewards,
}

impl HotelPomdp {
    pub fn new(domain: Domain, params: HotelParams) -> Self {
        let num_parts = domain.num_parts();
        let unique_parts = domain.unique_parts();
        let type_map = domain.objects.iter().map(|o| o.parts.clone()).collect();
        let part_catalogue = domain.parts.iter().map(|p| (p.cost, p.priority)).collect();
        Self {
            actions: ActionSpace { num_parts },
            type_map,
            unique_parts,
            part_catalogue,
            params,
            rewards: HotelRewards::default(),
        }
    }

    pub fn demo() -> Self {
        Self::new(Domain::demo(), HotelParams::default())
    }

    fn num_parts(&self) -> usize {
        self.part_catalogue.len()
    }

    fn num_types(&self) -> usize {
        self.type_map.len()
    }

    fn perceive(&self, state: &HotelState, rng: &mut Rng) -> (Vec<bool>, f64) {
        let true_bits: Vec<bool> = state.worker.assembled.clone();
        let eff = self.params.perceive_acc;
        let observed: Vec<bool> = true_bits
            .iter()
            .map(|&b| if rng.bernoulli(eff) { b } else { !b })
            .collect();
        (observed, eff)
    }

    fn inspect_all_containers(&self, state: &HotelState, rng: &mut Rng) -> (Vec<bool>, f64) {
        let eff = self.params.perceive_acc;
        let observed: Vec<bool> = state
            .storage
            .iter()
            .map(|&present| if rng.bernoulli(eff) { present } else { !present })
            .collect();
        (observed, eff)
    }

    /// Reads the truth about the *active* hotel (spec §4.7 "InspectObject").
    fn inspect_object(&self, state: &HotelState, rng: &mut Rng) -> (usize, f64) {
        let has_unique_a = self.unique_parts[0].iter().any(|&p| state.worker.assembled[p]);
        let has_unique_b = self.unique_parts.get(1).is_some_and(|u| u.iter().any(|&p| state.worker.assembled[p]));
        if has_unique_a == has_unique_b {
            return (OBS_AMBIGUOUS, 0.5);
        }
        let eff = self.params.perceive_acc;
        let true_type0 = state.worker.hotels[state.worker.active_hotel].true_type == 0;
        let correct = rng.bernoulli(eff);
        let is_type0 = if correct { true_type0 } else { !true_type0 };
        (if is_type0 { OBS_TYPE_A } else { OBS_TYPE_B }, eff)
    }

    fn apply_worker_outcome(&self, containers: &mut [ContainerBelief], part: Option<usize>) {
        if let Some(p) = part {
            containers[p].needed = true;
        }
    }
}

impl Simulator for HotelPomdp {
    type State = HotelState;

    fn num_actions(&self) -> usize {
        self.actions.num_actions()
    }

    fn num_observations(&self) -> usize {
        (1usize << self.num_parts()).max(NUM_TYPE_OBSERVATIONS)
    }

    fn discount(&self) -> f64 {
        self.params.discount
    }

    fn reward_range(&self) -> f64 {
        10.0
    }

    fn create_start_state(&self, rng: &mut Rng) -> HotelState {
        let num_parts = self.num_parts();
        let storage = vec![true; num_parts];
        let containers =
            self.part_catalogue.iter().map(|&(cost, priority)| ContainerBelief::new(cost, priority)).collect();
        let num_hotels = self.params.num_hotels.max(1);
        let hotels: Vec<HotelInstance> = (0..num_hotels).map(|_| HotelInstance::new(rng.uniform_index(self.num_types()))).collect();
        let hotel_types = (0..num_hotels).map(|_| TypeBelief::new()).collect();
        HotelState { worker: WorkerState::new(hotels, num_parts), storage, containers, hotel_types }
    }

    fn step(&self, state: &mut HotelState, action: ActionIndex, rng: &mut Rng) -> StepOutcome {
        let mut reward = 0.0;
        let mut observation = 1;

        match self.actions.decode(action) {
            HotelAction::Perceive => {
                reward += self.rewards.perceive;
                let (obs_bits, eff) = self.perceive(state, rng);
                observation = encode_bits(&obs_bits);
                for (c, &assembled) in obs_bits.iter().enumerate() {
                    if assembled {
                        state.containers[c].likelihood_assembled *= eff;
                        state.containers[c].likelihood_not_assembled *= 1.0 - eff;
                    } else {
                        state.containers[c].likelihood_not_assembled *= eff;
                        state.containers[c].likelihood_assembled *= 1.0 - eff;
                    }
                    state.containers[c].recompute_prob_assembled();
                }
            }
            HotelAction::InspectObject => {
                reward += self.rewards.perceive;
                let (obs, eff) = self.inspect_object(state, rng);
                observation = obs;
                let belief = &mut state.hotel_types[state.worker.active_hotel];
                if obs == OBS_AMBIGUOUS {
                    reward = self.rewards.wrong_perceive;
                } else if obs == OBS_TYPE_A {
                    belief.likelihood_type0 *= eff;
                    belief.likelihood_not_type0 *= 1.0 - eff;
                } else {
                    belief.likelihood_type0 *= 1.0 - eff;
                    belief.likelihood_not_type0 *= eff;
                }
                belief.recompute();
                if !belief.assumed && confident(belief.prob_type0, self.params.entropy_limit) {
                    belief.assumed = true;
                }
            }
            HotelAction::InspectContainer => {
                reward += self.rewards.perceive;
                let (obs_bits, eff) = self.inspect_all_containers(state, rng);
                observation = encode_bits(&obs_bits);
                for (c, &present) in obs_bits.iter().enumerate() {
                    if present {
                        state.containers[c].likelihood_not_empty *= eff;
                        state.containers[c].likelihood_empty *= 1.0 - eff;
                    } else {
                        state.containers[c].likelihood_empty *= eff;
                        state.containers[c].likelihood_not_empty *= 1.0 - eff;
                    }
                    state.containers[c].recompute_prob_empty();
                }
            }
            HotelAction::BringPart(c) => {
                for _ in 0..self.part_catalogue[c].0 {
                    let (r, terminal, failed) = worker::tick(
                        &self.type_map,
                        &mut state.storage,
                        &mut state.worker,
                        &self.rewards,
                        &self.params,
                        rng,
                    );
                    reward += r;
                    self.apply_worker_outcome(&mut state.containers, failed);
                    if terminal {
                        break;
                    }
                }

                if rng.bernoulli(self.params.bring_success) {
                    observation = 1;
                    let reliable = confident(state.containers[c].prob_empty, self.params.entropy_limit)
                        && confident(state.containers[c].prob_assembled, self.params.entropy_limit);
                    let needed = state.containers[c].needed;
                    let empty = state.empty(c);
                    let assembled = state.worker.assembled[c];
                    let unique_a = self.unique_parts[0].contains(&c);
                    let unique_b = self.unique_parts.get(1).map_or(false, |u| u.contains(&c));
                    let belief = &state.hotel_types[state.worker.active_hotel];
                    let type_known = belief.assumed;
                    let part_match = (belief.prob_type0 > 0.5 && unique_a) || (belief.prob_type0 < 0.5 && unique_b);

                    if !reliable || assembled || !empty {
                        reward += self.rewards.wrong_goal;
                    } else if (unique_a || unique_b) && (!type_known || !part_match) {
                        reward += self.rewards.wrong_goal;
                    } else if needed {
                        reward += self.rewards.good_restock;
                    } else {
                        reward += self.rewards.restock;
                    }

                    state.containers[c].likelihood_empty = 1.0;
                    state.containers[c].likelihood_not_empty = 1.0;
                    state.containers[c].prob_empty = 0.5;
                    state.storage[c] = true;
                    state.containers[c].needed = false;
                } else {
                    observation = 0;
                    reward += self.rewards.restock;
                }
            }
        }

        let (r, terminal, failed) =
            worker::tick(&self.type_map, &mut state.storage, &mut state.worker, &self.rewards, &self.params, rng);
        reward += r;
        self.apply_worker_outcome(&mut state.containers, failed);

        StepOutcome { observation, reward, terminal }
    }

    fn pgs(&self, state: &HotelState) -> f64 {
        let mut points = 0.0;
        for hotel in &state.worker.hotels {
            points += if hotel.complete { PGS_GOAL } else { PGS_UNCERTAIN };
        }
        for container in &state.containers {
            if container.needed {
                points += PGS_NOTGOAL;
            }
        }
        let active = &state.hotel_types[state.worker.active_hotel];
        if !confident(active.prob_type0, self.params.entropy_limit) {
            points += PGS_UNCERTAIN;
        }
        for container in &state.containers {
            if !confident(container.prob_empty, self.params.entropy_limit) {
                points += PGS_UNCERTAIN;
            }
        }
        points
    }

    fn pgs_ro(&self, old: &HotelState, new: &HotelState, action: ActionIndex, old_phi: f64) -> f64 {
        let mut points = 0.0;
        let mut old_points = 0.0;

        for (oh, nh) in old.worker.hotels.iter().zip(&new.worker.hotels) {
            if !oh.complete && nh.complete {
                points += PGS_GOAL;
                old_points += PGS_UNCERTAIN;
            }
        }

        if let HotelAction::BringPart(c) = self.actions.decode(action) {
            if old.containers[c].needed {
                old_points += PGS_NOTGOAL;
            }
        }

        if matches!(self.actions.decode(action), HotelAction::InspectObject) {
            let active = old.worker.active_hotel;
            if !confident(new.hotel_types[active].prob_type0, self.params.entropy_limit) {
                points += PGS_UNCERTAIN;
            }
            if !confident(old.hotel_types[active].prob_type0, self.params.entropy_limit) {
                old_points += PGS_UNCERTAIN;
            }
        }

        if matches!(self.actions.decode(action), HotelAction::InspectContainer) {
            for container in &new.containers {
                if !confident(container.prob_empty, self.params.entropy_limit) {
                    points += PGS_UNCERTAIN;
                }
            }
            for container in &old.containers {
                if !confident(container.prob_empty, self.params.entropy_limit) {
                    old_points += PGS_UNCERTAIN;
                }
            }
        }

        old_phi - old_points + points
    }

    fn legal(&self, _state: &HotelState, _history: &History) -> Vec<ActionIndex> {
        (0..self.num_actions()).collect()
    }

    fn preferred(&self, state: &HotelState, history: &History) -> Vec<ActionIndex> {
        self.legal(state, history)
    }

    fn local_move(&self, state: &mut HotelState, history: &History, step_obs: usize, rng: &mut Rng) -> bool {
        let Some((action, observation)) = history.last() else {
            return true;
        };
        debug_assert_eq!(observation, step_obs);

        match rng.uniform_index(3) {
            0 => {
                let part = rng.uniform_index(state.storage.len());
                state.storage[part] = !state.storage[part];
                state.containers[part].prob_empty = 1.0 - state.containers[part].prob_empty;
                match self.actions.decode(action) {
                    HotelAction::BringPart(c) if c == part => {
                        if state.empty(part) {
                            return false;
                        }
                    }
                    HotelAction::InspectContainer => {
                        let (new_obs, _) = self.inspect_all_containers(state, rng);
                        if encode_bits(&new_obs) != observation {
                            return false;
                        }
                    }
                    _ => {}
                }
            }
            1 => {
                let part = rng.uniform_index(state.worker.assembled.len());
                state.worker.assembled[part] = !state.worker.assembled[part];
                if matches!(self.actions.decode(action), HotelAction::Perceive) {
                    let (new_obs, _) = self.perceive(state, rng);
                    if encode_bits(&new_obs) != observation {
                        return false;
                    }
                }
            }
            _ => {
                let active = state.worker.active_hotel;
                state.worker.hotels[active].true_type = rng.uniform_index(self.num_types());
                if matches!(self.actions.decode(action), HotelAction::InspectObject) {
                    let (new_obs, _) = self.inspect_object(state, rng);
                    if new_obs != observation {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn initialize_ftable(&self, ftable: &mut FTable) {
        for c in 0..self.actions.num_parts {
            let action = self.actions.encode(HotelAction::BringPart(c));
            ftable.register(action, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_state_containers_begin_stocked() {
        let sim = HotelPomdp::demo();
        let mut rng = Rng::from_seed(1);
        let state = sim.create_start_state(&mut rng);
        assert!(state.storage.iter().all(|&present| present));
    }

    #[test]
    fn start_state_has_the_configured_number_of_hotels() {
        let sim = HotelPomdp::demo();
        let mut rng = Rng::from_seed(1);
        let state = sim.create_start_state(&mut rng);
        assert_eq!(state.worker.hotels.len(), sim.params.num_hotels);
        assert_eq!(state.hotel_types.len(), sim.params.num_hotels);
        assert_eq!(state.worker.active_hotel, 0);
    }

    #[test]
    fn bring_part_restocks_and_clears_needed() {
        let sim = HotelPomdp::demo();
        let mut rng = Rng::from_seed(2);
        let mut state = sim.create_start_state(&mut rng);
        state.storage[0] = false;
        state.containers[0].needed = true;
        let action = sim.actions.encode(HotelAction::BringPart(0));
        sim.step(&mut state, action, &mut rng);
        assert!(state.storage[0] || !state.containers[0].needed);
    }

    #[test]
    fn bring_part_collapses_container_belief_on_guaranteed_success() {
        let sim = HotelPomdp::new(Domain::demo(), HotelParams { bring_success: 1.0, ..HotelParams::default() });
        let mut rng = Rng::from_seed(6);
        let mut state = sim.create_start_state(&mut rng);
        state.worker.done = true; // sidestep worker ticks so only the BringPart reset is observed
        let c = 0;
        state.storage[c] = false;
        state.containers[c].needed = true;
        state.containers[c].likelihood_empty = 0.3;
        state.containers[c].likelihood_not_empty = 0.9;
        state.containers[c].prob_empty = 0.25;

        let action = sim.actions.encode(HotelAction::BringPart(c));
        sim.step(&mut state, action, &mut rng);

        assert_eq!(state.containers[c].likelihood_empty, 1.0);
        assert_eq!(state.containers[c].likelihood_not_empty, 1.0);
        assert_eq!(state.containers[c].prob_empty, 0.5);
        assert!(state.storage[c]);
        assert!(!state.containers[c].needed);
    }

    #[test]
    fn completing_the_active_hotel_advances_to_the_next_one() {
        let sim = HotelPomdp::new(Domain::demo(), HotelParams { num_hotels: 2, ..HotelParams::default() });
        let mut rng = Rng::from_seed(3);
        let mut state = sim.create_start_state(&mut rng);

        let hotel_type = state.worker.hotels[0].true_type;
        for &part in &sim.type_map[hotel_type] {
            state.worker.assembled[part] = true;
        }
        state.worker.activity = worker::WorkerActivity::None;

        let action = sim.actions.encode(HotelAction::InspectObject);
        let outcome = sim.step(&mut state, action, &mut rng);

        assert!(state.worker.hotels[0].complete);
        assert_eq!(state.worker.active_hotel, 1);
        assert!(!state.worker.done);
        assert!(!outcome.terminal);
    }

    #[test]
    fn episode_is_done_only_once_every_hotel_is_complete() {
        let sim = HotelPomdp::new(Domain::demo(), HotelParams { num_hotels: 2, ..HotelParams::default() });
        let mut rng = Rng::from_seed(3);
        let mut state = sim.create_start_state(&mut rng);
        for hotel in &mut state.worker.hotels {
            hotel.complete = true;
        }
        state.worker.active_hotel = state.worker.hotels.len() - 1;
        let last_type = state.worker.hotels[state.worker.active_hotel].true_type;
        for &part in &sim.type_map[last_type] {
            state.worker.assembled[part] = true;
        }
        state.worker.activity = worker::WorkerActivity::None;

        let action = sim.actions.encode(HotelAction::InspectObject);
        let outcome = sim.step(&mut state, action, &mut rng);

        assert!(state.worker.done);
        assert!(outcome.terminal);
    }

    #[test]
    fn local_move_rejects_type_perturbations_inconsistent_with_the_recorded_observation() {
        let sim = HotelPomdp::new(Domain::demo(), HotelParams { perceive_acc: 1.0, ..HotelParams::default() });
        let mut setup_rng = Rng::from_seed(1);
        let mut base = sim.create_start_state(&mut setup_rng);
        base.worker.hotels[base.worker.active_hotel].true_type = 0;
        base.worker.assembled[1] = true; // unique to hotel-a: an unambiguous reading

        let action = sim.actions.encode(HotelAction::InspectObject);
        let (observation, _) = sim.inspect_object(&base, &mut setup_rng);
        assert_eq!(observation, OBS_TYPE_A);

        let mut history = History::new();
        history.push(action, observation);

        let mut saw_type_perturbation = false;
        for seed in 0..300u64 {
            let mut rng = Rng::from_seed(seed);
            let mut candidate = base.clone();
            let accepted = sim.local_move(&mut candidate, &history, observation, &mut rng);
            let active = base.worker.active_hotel;
            if candidate.worker.hotels[active].true_type != base.worker.hotels[active].true_type {
                saw_type_perturbation = true;
                assert!(
                    !accepted,
                    "seed {seed}: flipping the hotel type must be rejected when it contradicts the recorded InspectObject reading"
                );
            }
        }
        assert!(saw_type_perturbation, "expected at least one seed to exercise the true_type perturbation branch");
    }

    #[test]
    fn pgs_rewards_completed_hotel() {
        let sim = HotelPomdp::demo();
        let mut rng = Rng::from_seed(4);
        let mut state = sim.create_start_state(&mut rng);
        let incomplete_phi = sim.pgs(&state);
        let mut completed = state.clone();
        for hotel in &mut completed.worker.hotels {
            hotel.complete = true;
        }
        assert!(sim.pgs(&completed) > incomplete_phi);
    }
}
