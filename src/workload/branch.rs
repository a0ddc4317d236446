//! Branch prediction: conditional-sum traversal of an integer array under
//! three input/code shapes.

use super::rng::Seeded;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Sorted input, branching code: predictable, high accuracy.
    SortedBranch,
    /// Random input, branching code: unpredictable, low accuracy.
    RandomBranch,
    /// Random input, branchless code: bit-mask arithmetic in place of
    /// the conditional.
    Branchless,
}

pub struct BranchWorkload {
    values: Vec<i64>,
    threshold: i64,
    mode: Mode,
}

pub fn prepare(len: usize, threshold: i64, mode: Mode, seed: u64) -> BranchWorkload {
    let mut rng = Seeded::new(seed);
    let mut values: Vec<i64> = (0..len).map(|_| (rng.next_u64() % 2000) as i64 - 1000).collect();
    if matches!(mode, Mode::SortedBranch) {
        values.sort_unstable();
    }
    BranchWorkload { values, threshold, mode }
}

impl BranchWorkload {
    pub fn run(&self) -> i64 {
        let sum = match self.mode {
            Mode::SortedBranch | Mode::RandomBranch => {
                let mut sum = 0i64;
                for &v in &self.values {
                    if v > self.threshold {
                        sum += v;
                    }
                }
                sum
            }
            Mode::Branchless => {
                let mut sum = 0i64;
                for &v in &self.values {
                    let mask = -((v > self.threshold) as i64);
                    sum += v & mask;
                }
                sum
            }
        };
        std::hint::black_box(sum)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn branch_and_branchless_agree() {
        let seed = 5;
        let len = 10_000;
        let threshold = 0;
        let branching = prepare(len, threshold, Mode::RandomBranch, seed).run();
        let branchless = prepare(len, threshold, Mode::Branchless, seed).run();
        assert_eq!(branching, branchless);
    }

    #[test]
    fn sorted_mode_actually_sorts_input() {
        let w = prepare(256, 0, Mode::SortedBranch, 9);
        assert!(w.values.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
