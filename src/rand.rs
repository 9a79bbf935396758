use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Fast non-cryptographic RNG seeded from the thread RNG.
pub fn small_thread_rng() -> SmallRng {
    SmallRng::from_rng(&mut rand::rng())
}

/// Deterministic RNG for reproducible sweeps.
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}
