use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use faithsteps_core::{derive_stream_seed, trail_seed};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Reproducible generator for scenario inputs, keyed by journey and iteration.
pub fn journey_rng(journey_id: &str, iteration: usize) -> ChaCha8Rng {
    let base = trail_seed(journey_id);
    let tag = format!("tester-{iteration}");
    ChaCha8Rng::seed_from_u64(derive_stream_seed(base, tag.as_bytes()))
}
