//! The assembly assistant POMDP (spec §4.6), wiring the worker policy graph,
//! container/product-type belief state and observation codec into the
//! `Simulator` contract.

use crate::entropy::confident;
use crate::ftable::FTable;
use crate::history::History;
use crate::random::Rng;
use crate::simulator::{ActionIndex, Reward, Simulator, StepOutcome};

use super::action::{ActionSpace, AssemblyAction};
use super::config::{AssemblyParams, Domain};
use super::observation::{encode_apo, Apo, NUM_ACTIVITIES, NUM_OUTCOMES, O_FAIL, O_OK};
use super::state::{AssemblyState, ContainerBelief, TypeBelief};
use super::worker::{self, AssemblyRewards, ProductState, ProductType, WorkerActivity, WorkerState};

const PGS_GOAL: f64 = 1.0;
const PGS_NOTGOAL: f64 = -1.0;
const PGS_UNCERTAIN: f64 = -0.5;

pub struct AssemblyPomdp {
    actions: ActionSpace,
    products: Vec<ProductType>,
    part_catalogue: Vec<(usize, u32, i32)>, // (capacity, cost, priority)
    params: AssemblyParams,
    rewards: AssemblyRewards,
    num_poses: usize,
}

impl AssemblyPomdp {
    pub fn new(domain: Domain, params: AssemblyParams) -> Self {
        let num_parts = domain.num_parts();
        let num_types = domain.num_types().max(domain.objects.len());
        let part_catalogue = domain.parts.iter().map(|p| (p.storage, p.cost, p.priority)).collect();
        let products = domain
            .objects
            .iter()
            .map(|o| ProductType { parts: o.parts.clone(), needs_glue: o.needs_glue, glue_type: o.type_id })
            .collect();
        let num_poses = num_parts.max(num_types).max(1);
        Self {
            actions: ActionSpace { num_parts, num_types },
            products,
            part_catalogue,
            params,
            rewards: AssemblyRewards::default(),
            num_poses,
        }
    }

    pub fn demo() -> Self {
        Self::new(Domain::demo(), AssemblyParams::default())
    }

    fn perceive(&self, state: &AssemblyState, rng: &mut Rng) -> Apo {
        let (activity, pose) = super::observation::activity_to_apo(state.worker.activity);
        let outcome = super::observation::outcome_to_index(state.worker.outcome);
        let mut apo = Apo { activity, pose, outcome };
        if !rng.bernoulli(self.params.perceive_acc) {
            match rng.uniform_index(3) {
                0 => apo.activity = rng.uniform_index(NUM_ACTIVITIES),
                1 => apo.pose = rng.uniform_index(self.num_poses),
                _ => apo.outcome = rng.uniform_index(NUM_OUTCOMES),
            }
        }
        apo
    }

    fn inspect_container(&self, state: &AssemblyState, container: usize, rng: &mut Rng) -> (usize, f64) {
        let true_ok = !state.empty(container);
        let correct = rng.bernoulli(self.params.perceive_acc);
        let ok = if correct { true_ok } else { !true_ok };
        (if ok { O_OK } else { O_FAIL }, self.params.perceive_acc)
    }

    /// Reads the truth about the *active* product (spec §4.6 "InspectTruck").
    fn inspect_object(&self, state: &AssemblyState, rng: &mut Rng) -> (usize, f64) {
        let active = &state.worker.products[state.worker.active_product];
        let true_type0 = active.true_type == 0;
        let correct = rng.bernoulli(self.params.perceive_acc);
        let is_type0 = if correct { true_type0 } else { !true_type0 };
        (if is_type0 { 0 } else { 1 }, self.params.perceive_acc)
    }

    fn apply_worker_outcome(&self, containers: &mut [ContainerBelief], part: Option<usize>) {
        if let Some(p) = part {
            containers[p].needed = true;
        }
    }
}

impl Simulator for AssemblyPomdp {
    type State = AssemblyState;

    fn num_actions(&self) -> usize {
        self.actions.num_actions()
    }

    fn num_observations(&self) -> usize {
        (NUM_ACTIVITIES * self.num_poses * NUM_OUTCOMES).max(2)
    }

    fn discount(&self) -> f64 {
        self.params.discount
    }

    fn reward_range(&self) -> f64 {
        10.0
    }

    fn create_start_state(&self, rng: &mut Rng) -> AssemblyState {
        let num_parts = self.part_catalogue.len();
        let storage = self.part_catalogue.iter().map(|&(capacity, _, _)| capacity).collect();
        let containers = self
            .part_catalogue
            .iter()
            .map(|&(capacity, cost, priority)| ContainerBelief::new(capacity, cost, priority))
            .collect();
        let num_products = self.params.num_products.max(1);
        let products: Vec<ProductState> =
            (0..num_products).map(|_| ProductState::new(rng.uniform_index(self.products.len()), num_parts)).collect();
        let product_types = (0..num_products).map(|_| TypeBelief::new()).collect();
        AssemblyState { worker: WorkerState::new(products), storage, containers, product_types }
    }

    fn step(&self, state: &mut AssemblyState, action: ActionIndex, rng: &mut Rng) -> StepOutcome {
        let mut reward: Reward = 0.0;
        let mut observation = 1;

        match self.actions.decode(action) {
            AssemblyAction::Perceive => {
                reward += self.rewards.perceive;
                let apo = self.perceive(state, rng);
                observation = encode_apo(apo, self.num_poses);
            }
            AssemblyAction::InspectTruck => {
                reward += self.rewards.perceive;
                let (obs, eff) = self.inspect_object(state, rng);
                observation = obs;
                let belief = &mut state.product_types[state.worker.active_product];
                if obs == 0 {
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
            AssemblyAction::InspectContainer(c) => {
                reward += self.rewards.perceive;
                let (obs, eff) = self.inspect_container(state, c, rng);
                observation = obs;
                if obs == O_OK {
                    state.containers[c].likelihood_not_empty *= eff;
                    state.containers[c].likelihood_empty *= 1.0 - eff;
                } else {
                    state.containers[c].likelihood_empty *= eff;
                    state.containers[c].likelihood_not_empty *= 1.0 - eff;
                }
                state.containers[c].recompute_prob_empty();
            }
            AssemblyAction::BringGlue(t) => {
                reward += self.rewards.bring_glue;
                worker::bring_glue(&mut state.worker, t);
            }
            AssemblyAction::BringPart(c) => {
                for _ in 0..state.containers[c].cost {
                    let (r, terminal, failed) = worker::tick(&self.products, &mut state.storage, &mut state.worker, &self.rewards);
                    reward += r;
                    self.apply_worker_outcome(&mut state.containers, failed);
                    if terminal {
                        break;
                    }
                }
                let capacity = state.containers[c].capacity;
                let diff = capacity.saturating_sub(state.storage[c]);
                if diff < self.params.refill_amount {
                    reward += self.rewards.wrong_goal;
                    state.storage[c] = capacity;
                } else {
                    reward += self.rewards.restock;
                    state.storage[c] += self.params.refill_amount;
                }
                state.containers[c].prob_empty = 0.0;
                state.containers[c].needed = false;
            }
        }

        let (r, terminal, failed) = worker::tick(&self.products, &mut state.storage, &mut state.worker, &self.rewards);
        reward += r;
        self.apply_worker_outcome(&mut state.containers, failed);

        StepOutcome { observation, reward, terminal }
    }

    fn pgs(&self, state: &AssemblyState) -> f64 {
        let mut points = 0.0;
        for product in &state.worker.products {
            points += if product.complete { PGS_GOAL } else { PGS_UNCERTAIN };
        }
        for container in &state.containers {
            if container.needed {
                points += PGS_NOTGOAL;
            }
        }
        let active = &state.product_types[state.worker.active_product];
        if !confident(active.prob_type0, self.params.entropy_limit) {
            points += PGS_UNCERTAIN;
        }
        points
    }

    fn pgs_ro(&self, old: &AssemblyState, new: &AssemblyState, action: ActionIndex, old_phi: f64) -> f64 {
        let mut points = 0.0;
        let mut old_points = 0.0;

        for (op, np) in old.worker.products.iter().zip(&new.worker.products) {
            if !op.complete && np.complete {
                points += PGS_GOAL;
                old_points += PGS_UNCERTAIN;
            }
        }

        if let AssemblyAction::BringPart(c) = self.actions.decode(action) {
            if old.containers[c].needed {
                old_points += PGS_NOTGOAL;
            }
        }

        if matches!(self.actions.decode(action), AssemblyAction::InspectTruck) {
            let active = old.worker.active_product;
            if !confident(new.product_types[active].prob_type0, self.params.entropy_limit) {
                points += PGS_UNCERTAIN;
            }
            if !confident(old.product_types[active].prob_type0, self.params.entropy_limit) {
                old_points += PGS_UNCERTAIN;
            }
        }

        old_phi - old_points + points
    }

    fn legal(&self, _state: &AssemblyState, _history: &History) -> Vec<ActionIndex> {
        (0..self.num_actions()).collect()
    }

    fn preferred(&self, state: &AssemblyState, history: &History) -> Vec<ActionIndex> {
        self.legal(state, history)
    }

    fn local_move(&self, state: &mut AssemblyState, history: &History, step_obs: usize, rng: &mut Rng) -> bool {
        let Some((action, observation)) = history.last() else {
            return true;
        };
        debug_assert_eq!(observation, step_obs);

        match rng.uniform_index(3) {
            0 => {
                let part = rng.uniform_index(state.storage.len());
                if state.storage[part] == 0 {
                    state.storage[part] = 1;
                } else {
                    state.storage[part] -= 1;
                }
                match self.actions.decode(action) {
                    AssemblyAction::BringPart(c) if c == part => {
                        if state.empty(part) {
                            return false;
                        }
                    }
                    AssemblyAction::InspectContainer(c) if c == part => {
                        let (new_obs, _) = self.inspect_container(state, c, rng);
                        if new_obs != observation {
                            return false;
                        }
                    }
                    _ => {}
                }
            }
            1 => {
                match rng.uniform_index(3) {
                    0 => state.worker.activity = worker::random_activity(rng),
                    1 => {
                        state.worker.activity = match state.worker.activity {
                            WorkerActivity::Assemble(_) => WorkerActivity::Assemble(rng.uniform_index(self.num_poses)),
                            WorkerActivity::Glue(_) => WorkerActivity::Glue(rng.uniform_index(self.actions.num_types)),
                            other => other,
                        }
                    }
                    _ => state.worker.outcome = worker::random_outcome(rng),
                }
                if matches!(self.actions.decode(action), AssemblyAction::Perceive) {
                    let apo = self.perceive(state, rng);
                    let new_obs = encode_apo(apo, self.num_poses);
                    if new_obs != observation {
                        return false;
                    }
                }
            }
            _ => {
                let active = state.worker.active_product;
                state.worker.products[active].true_type = rng.uniform_index(self.products.len());
                if matches!(self.actions.decode(action), AssemblyAction::InspectTruck) {
                    let (new_obs, _) = self.inspect_object(state, rng);
                    if new_obs != observation {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Grounded in `assembly_robot.cpp::initializeFTable`: each glue type gets
    /// its own feature, and each part shares one feature between its
    /// `InspectContainer`/`BringPart` actions.
    fn initialize_ftable(&self, ftable: &mut FTable) {
        for t in 0..self.actions.num_types {
            let action = self.actions.encode(AssemblyAction::BringGlue(t));
            ftable.register(action, t);
        }
        for c in 0..self.actions.num_parts {
            let feature = c + self.actions.num_types;
            let inspect = self.actions.encode(AssemblyAction::InspectContainer(c));
            ftable.register(inspect, feature);
            let bring = self.actions.encode(AssemblyAction::BringPart(c));
            ftable.register(bring, feature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_state_containers_begin_full() {
        let sim = AssemblyPomdp::demo();
        let mut rng = Rng::from_seed(1);
        let state = sim.create_start_state(&mut rng);
        for (c, capacity_cost_priority) in sim.part_catalogue.iter().enumerate() {
            assert_eq!(state.storage[c], capacity_cost_priority.0);
        }
    }

    #[test]
    fn start_state_has_the_configured_number_of_products() {
        let sim = AssemblyPomdp::demo();
        let mut rng = Rng::from_seed(1);
        let state = sim.create_start_state(&mut rng);
        assert_eq!(state.worker.products.len(), sim.params.num_products);
        assert_eq!(state.product_types.len(), sim.params.num_products);
        assert_eq!(state.worker.active_product, 0);
    }

    #[test]
    fn bring_part_restocks_and_clears_needed() {
        let sim = AssemblyPomdp::demo();
        let mut rng = Rng::from_seed(2);
        let mut state = sim.create_start_state(&mut rng);
        state.storage[0] = 0;
        state.containers[0].needed = true;
        let action = sim.actions.encode(AssemblyAction::BringPart(0));
        sim.step(&mut state, action, &mut rng);
        assert_eq!(state.containers[0].prob_empty, 0.0);
        assert!(!state.containers[0].needed);
    }

    #[test]
    fn completing_the_active_product_advances_to_the_next_one() {
        let sim = AssemblyPomdp::new(
            Domain::demo(),
            AssemblyParams { num_products: 2, ..AssemblyParams::default() },
        );
        let mut rng = Rng::from_seed(3);
        let mut state = sim.create_start_state(&mut rng);

        // Force the first product to its "all parts assembled, no glue left
        // to apply" state so the very next tick marks it complete.
        let first_type = state.worker.products[0].true_type;
        for &part in &sim.products[first_type % sim.products.len()].parts {
            state.worker.products[0].assembled[part] = true;
        }
        state.worker.products[0].glue_applied = true;
        state.worker.activity = WorkerActivity::None;

        let action = sim.actions.encode(AssemblyAction::InspectTruck);
        sim.step(&mut state, action, &mut rng);

        assert!(state.worker.products[0].complete);
        assert_eq!(state.worker.active_product, 1);
        assert!(!state.worker.done);
    }

    #[test]
    fn episode_is_done_only_once_every_product_is_complete() {
        let sim = AssemblyPomdp::new(
            Domain::demo(),
            AssemblyParams { num_products: 2, ..AssemblyParams::default() },
        );
        let mut rng = Rng::from_seed(3);
        let mut state = sim.create_start_state(&mut rng);
        for product in &mut state.worker.products {
            product.complete = true;
            product.glue_applied = true;
            let first_type = product.true_type;
            for &part in &sim.products[first_type % sim.products.len()].parts {
                product.assembled[part] = true;
            }
        }
        state.worker.active_product = state.worker.products.len() - 1;
        state.worker.activity = WorkerActivity::None;

        let action = sim.actions.encode(AssemblyAction::InspectTruck);
        let outcome = sim.step(&mut state, action, &mut rng);

        assert!(state.worker.done);
        assert!(outcome.terminal);
    }

    #[test]
    fn pgs_rewards_completed_products() {
        let sim = AssemblyPomdp::demo();
        let mut rng = Rng::from_seed(4);
        let mut state = sim.create_start_state(&mut rng);
        let incomplete_phi = sim.pgs(&state);
        assert!(incomplete_phi < 0.0);
        for product in &mut state.worker.products {
            product.complete = true;
        }
        assert_eq!(sim.pgs(&state), sim.products.len() as f64 * PGS_GOAL + PGS_UNCERTAIN); // type still unresolved
    }

    #[test]
    fn initialize_ftable_registers_glue_and_container_actions() {
        let sim = AssemblyPomdp::demo();
        let mut ftable = FTable::new(-6.0, 1.0);
        sim.initialize_ftable(&mut ftable);

        let bring_glue_0 = sim.actions.encode(AssemblyAction::BringGlue(0));
        let inspect_container_0 = sim.actions.encode(AssemblyAction::InspectContainer(0));
        let bring_part_0 = sim.actions.encode(AssemblyAction::BringPart(0));

        assert_eq!(ftable.value_of(bring_glue_0), Some(0.0));
        assert_eq!(ftable.value_of(inspect_container_0), Some(0.0));
        assert_eq!(ftable.value_of(bring_part_0), Some(0.0));

        // InspectContainer and BringPart for the same part share one feature.
        ftable.update(inspect_container_0, -100.0, 0.0);
        assert!(!ftable.is_active(bring_part_0));
    }
}
