use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of the simulated "detections". Swapped for a scripted source in
/// tests so outcomes are deterministic.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
    /// `true` with the given probability in `[0, 1]`.
    fn chance(&mut self, probability: f64) -> bool;
}

pub struct ThreadRandom {
    rng: StdRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::RandomSource;

    /// Replays queued answers; falls back to index 0 / `false` when drained.
    #[derive(Default)]
    pub struct ScriptedRandom {
        picks: VecDeque<usize>,
        chances: VecDeque<bool>,
    }

    impl ScriptedRandom {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn then_pick(mut self, index: usize) -> Self {
            self.picks.push_back(index);
            self
        }

        pub fn then_chance(mut self, outcome: bool) -> Self {
            self.chances.push_back(outcome);
            self
        }
    }

    impl RandomSource for ScriptedRandom {
        fn pick_index(&mut self, len: usize) -> usize {
            self.picks.pop_front().unwrap_or(0) % len
        }

        fn chance(&mut self, _probability: f64) -> bool {
            self.chances.pop_front().unwrap_or(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let mut a = ThreadRandom::seeded(7);
        let mut b = ThreadRandom::seeded(7);
        let left: Vec<usize> = (0..16).map(|_| a.pick_index(4)).collect();
        let right: Vec<usize> = (0..16).map(|_| b.pick_index(4)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|&index| index < 4));
    }

    #[test]
    fn chance_edges_are_certain() {
        let mut rng = ThreadRandom::seeded(1);
        assert!((0..32).all(|_| rng.chance(1.0)));
        assert!((0..32).all(|_| !rng.chance(0.0)));
    }
}
