//! Seeded Fisher-Yates shuffle.

use super::rng::create_rng;

/// Return a shuffled copy of `items`, driven by `seed`.
///
/// Walks from the last index down to 1, swapping `i` with
/// `j = floor(rng() * (i + 1))`. The input is left untouched.
pub fn shuffle<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut rng = create_rng(seed);
    let mut out = items.to_vec();

    for i in (1..out.len()).rev() {
        let j = (rng.next_f64() * (i + 1) as f64).floor() as usize;
        out.swap(i, j);
    }

    out
}
