//! Cross-module scenario checks exercising the planner, harness and both
//! domains through their public API.

use std::time::Duration;

use rageplan::domains::assembly::action::ActionSpace as AssemblyActionSpace;
use rageplan::domains::assembly::config::{AssemblyParams, Domain as AssemblyDomain};
use rageplan::domains::assembly::observation::{activity_to_apo, decode_apo, outcome_to_index, NUM_ACTIVITIES, NUM_OUTCOMES};
use rageplan::domains::assembly::AssemblyPomdp;
use rageplan::domains::hotel::action::{ActionSpace as HotelActionSpace, HotelAction};
use rageplan::domains::hotel::observation::{decode_bits, encode_bits};
use rageplan::domains::hotel::{Domain as HotelDomain, HotelPomdp};
use rageplan::belief::BeliefState;
use rageplan::ftable::FTable;
use rageplan::history::History;
use rageplan::planner::{Planner, PlannerParams, RolloutKnowledge, TreeKnowledge, Update};
use rageplan::random::Rng;
use rageplan::simulator::Simulator;

fn planner_params() -> PlannerParams {
    PlannerParams {
        sim_doubles: 2,
        transform_doubles: 1,
        transform_attempts: 50,
        timeout: Duration::from_millis(500),
        exploration_c: None,
        accuracy: 0.01,
        tree_knowledge: TreeKnowledge::Plain,
        rollout_knowledge: RolloutKnowledge::Preferred,
        pgs_alpha: 10.0,
    }
}

/// Scenario: two-type assembly domain, perfect perception (`perceive_acc =
/// 1.0`). With no sensor noise, `Perceive`'s observation must reproduce the
/// worker's true activity/pose/outcome exactly, for any seed.
#[test]
fn perfect_perception_perceive_observation_matches_ground_truth() {
    let params = AssemblyParams { perceive_acc: 1.0, ..AssemblyParams::default() };
    let sim = AssemblyPomdp::new(AssemblyDomain::demo(), params);
    let num_poses = sim.num_observations() / (NUM_ACTIVITIES * NUM_OUTCOMES);

    let demo_domain = AssemblyDomain::demo();
    let actions = AssemblyActionSpace { num_parts: demo_domain.num_parts(), num_types: demo_domain.num_types() };

    for seed in 0..20u64 {
        let mut rng = Rng::from_seed(seed);
        let mut state = sim.create_start_state(&mut rng);
        let (expected_activity, expected_pose) = activity_to_apo(state.worker.activity);
        let expected_outcome = outcome_to_index(state.worker.outcome);

        let perceive = actions.encode(rageplan::domains::assembly::action::AssemblyAction::Perceive);
        let outcome = sim.step(&mut state, perceive, &mut rng);
        let apo = decode_apo(outcome.observation, num_poses);

        assert_eq!(apo.activity, expected_activity, "seed {seed}");
        assert_eq!(apo.pose, expected_pose, "seed {seed}");
        assert_eq!(apo.outcome, expected_outcome, "seed {seed}");
    }
}

/// Scenario: hotel domain, ambiguous type. Resolving the hotel-type
/// uncertainty (as `InspectObject` does) must raise the PGS potential, and
/// the incremental `pgs_ro` recompute must agree with a full `pgs` recompute
/// when only that belief changed — the formula PGS rollouts lean on to prefer
/// `InspectObject` whenever the type is still ambiguous.
#[test]
fn resolving_hotel_type_ambiguity_raises_the_pgs_potential() {
    let sim = HotelPomdp::demo();
    let mut rng = Rng::from_seed(1);
    let before = sim.create_start_state(&mut rng);
    assert!(!before.hotel_types[before.worker.active_hotel].assumed);

    let old_phi = sim.pgs(&before);
    let mut after = before.clone();
    let active = after.worker.active_hotel;
    after.hotel_types[active].assumed = true;
    after.hotel_types[active].prob_type0 = 0.95;

    let inspect_object = HotelActionSpace { num_parts: HotelDomain::demo().num_parts() }.encode(HotelAction::InspectObject);
    let new_phi_direct = sim.pgs(&after);
    assert!(new_phi_direct > old_phi, "resolving type ambiguity should raise the potential");

    let incremental = sim.pgs_ro(&before, &after, inspect_object, old_phi);
    assert!((incremental - new_phi_direct).abs() < 1e-9);
}

/// Scenario: F-table pruning. Driving a `BringPart` feature's value below the
/// activation threshold must exclude the mapped action from `pgs_legal`.
#[test]
fn ftable_pruning_excludes_a_depleted_feature_action() {
    let sim = HotelPomdp::demo();
    let mut ftable = FTable::new(-6.0, 1.0);
    sim.initialize_ftable(&mut ftable);

    let bring_part_2 = HotelActionSpace { num_parts: HotelDomain::demo().num_parts() }.encode(HotelAction::BringPart(2));
    let mut rng = Rng::from_seed(3);
    let state = sim.create_start_state(&mut rng);
    let history = History::new();

    assert!(sim.pgs_legal(&state, &history, &ftable).contains(&bring_part_2));

    ftable.update(bring_part_2, -100.0, 0.0);

    assert!(!sim.pgs_legal(&state, &history, &ftable).contains(&bring_part_2));
}

/// Scenario: out-of-particles recovery. Forcing every real-step survivor to
/// be filtered out must still leave the belief repopulated to exactly
/// `numTransforms` particles via `localMove` transforms.
#[test]
fn belief_update_repopulates_after_every_real_survivor_is_filtered() {
    let sim = HotelPomdp::demo();
    let params = planner_params();
    let mut rng = Rng::from_seed(7);
    let mut planner = Planner::new(&sim, params.clone(), FTable::new(-6.0, 1.0), rng.clone());

    let mut belief = BeliefState::new();
    for _ in 0..4 {
        belief.add(sim.create_start_state(&mut rng));
    }
    let history = History::new();

    let action = HotelActionSpace { num_parts: HotelDomain::demo().num_parts() }.encode(HotelAction::Perceive);
    let unreachable_observation = sim.num_observations() + 1;

    let update = planner.update(&sim, &mut belief, &history, action, unreachable_observation, false);

    assert_eq!(update, Update::NonTerminal);
    assert_eq!(belief.size() as u64, params.num_transforms());
}

/// The planner must always return a legal action index, from a cold (empty)
/// belief, for either domain.
#[test]
fn planner_always_returns_a_legal_action_for_both_domains() {
    let assembly = AssemblyPomdp::demo();
    let mut rng = Rng::from_seed(11);
    let mut planner = Planner::new(&assembly, planner_params(), FTable::new(-6.0, 1.0), rng.clone());
    let action = planner.plan(&assembly, &BeliefState::new(), &History::new());
    assert!(action < assembly.num_actions());

    let hotel = HotelPomdp::demo();
    let mut planner = Planner::new(&hotel, planner_params(), FTable::new(-6.0, 1.0), rng.clone());
    let action = planner.plan(&hotel, &BeliefState::new(), &History::new());
    assert!(action < hotel.num_actions());
    let _ = &mut rng;
}

/// Bit-vector observation codec is a bijection over its full domain, checked
/// here at the crate boundary rather than only inside the codec's own module.
#[test]
fn hotel_bit_vector_codec_is_a_bijection_over_the_demo_part_count() {
    let num_parts = HotelDomain::demo().num_parts();
    for index in 0..(1usize << num_parts) {
        let bits = decode_bits(index, num_parts);
        assert_eq!(bits.len(), num_parts);
        assert_eq!(encode_bits(&bits), index);
    }
}
