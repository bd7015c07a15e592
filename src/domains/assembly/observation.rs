//! Observation encodings (spec §4.6 "Observation space", §9 "treat as a pure
//! codec with round-trip tests").

use super::worker::{Outcome, WorkerActivity};

pub const O_FAIL: usize = 0;
pub const O_OK: usize = 1;

/// Activity/Pose/Outcome triple used by `Perceive` (spec GLOSSARY "APO").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Apo {
    pub activity: usize,
    pub pose: usize,
    pub outcome: usize,
}

pub const ACT_NONE: usize = 0;
pub const ACT_ASSEMBLE: usize = 1;
pub const ACT_WAIT: usize = 2;
pub const ACT_GLUE: usize = 3;
pub const NUM_ACTIVITIES: usize = 4;

pub const OUT_OK: usize = 0;
pub const OUT_FAIL: usize = 1;
pub const OUT_DONE: usize = 2;
pub const NUM_OUTCOMES: usize = 3;

pub fn activity_to_apo(activity: WorkerActivity) -> (usize, usize) {
    match activity {
        WorkerActivity::None => (ACT_NONE, 0),
        WorkerActivity::Assemble(part) => (ACT_ASSEMBLE, part),
        WorkerActivity::Wait => (ACT_WAIT, 0),
        WorkerActivity::Glue(glue_type) => (ACT_GLUE, glue_type),
    }
}

pub fn outcome_to_index(outcome: Outcome) -> usize {
    match outcome {
        Outcome::Ok => OUT_OK,
        Outcome::Fail => OUT_FAIL,
        Outcome::Done => OUT_DONE,
    }
}

/// Linear index `act * |P| * |O| + pose * |O| + outcome` (spec §4.6).
pub fn encode_apo(apo: Apo, num_poses: usize) -> usize {
    apo.activity * num_poses * NUM_OUTCOMES + apo.pose * NUM_OUTCOMES + apo.outcome
}

pub fn decode_apo(index: usize, num_poses: usize) -> Apo {
    let outcome = index % NUM_OUTCOMES;
    let rest = index / NUM_OUTCOMES;
    let pose = rest % num_poses;
    let activity = rest / num_poses;
    Apo { activity, pose, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apo_round_trips_over_full_range() {
        let num_poses = 5;
        for activity in 0..NUM_ACTIVITIES {
            for pose in 0..num_poses {
                for outcome in 0..NUM_OUTCOMES {
                    let apo = Apo { activity, pose, outcome };
                    let index = encode_apo(apo, num_poses);
                    assert_eq!(decode_apo(index, num_poses), apo);
                }
            }
        }
    }
}
