//! Belief state: a multiset of owned particles (spec §4.1).
//!
//! `sample` and `add` are both O(1); no ordering is implied or preserved, matching
//! the contract. Particles are plain owned values — Rust's ownership already gives
//! us the "no manual delete, freed when discarded" lifecycle the teacher's C++
//! `MEMORY_POOL` needed custom code for (Design Notes: "Replace custom allocators
//! with an arena owned per simulator ... no manual `delete` on particles.").

use crate::random::Rng;

#[derive(Debug, Clone, Default)]
pub struct BeliefState<S> {
    particles: Vec<S>,
}

impl<S> BeliefState<S> {
    pub fn new() -> Self {
        Self { particles: Vec::new() }
    }

    pub fn add(&mut self, particle: S) {
        self.particles.push(particle);
    }

    pub fn size(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.particles.iter()
    }

    /// Uniform sample by (immutable) reference; callers clone if they need to
    /// mutate (per-rollout mutation never aliases the belief's own copy).
    pub fn sample(&self, rng: &mut Rng) -> Option<&S> {
        if self.particles.is_empty() {
            None
        } else {
            let i = rng.uniform_index(self.particles.len());
            Some(&self.particles[i])
        }
    }
}

impl<S: Clone> BeliefState<S> {
    /// Deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_none_when_empty() {
        let belief: BeliefState<i32> = BeliefState::new();
        let mut rng = Rng::from_seed(1);
        assert!(belief.sample(&mut rng).is_none());
    }

    #[test]
    fn add_and_sample_round_trips_values() {
        let mut belief = BeliefState::new();
        belief.add(10);
        belief.add(20);
        belief.add(30);
        let mut rng = Rng::from_seed(7);
        for _ in 0..20 {
            let v = *belief.sample(&mut rng).unwrap();
            assert!([10, 20, 30].contains(&v));
        }
        assert_eq!(belief.size(), 3);
        let copy = belief.copy();
        assert_eq!(copy.size(), belief.size());
    }
}
