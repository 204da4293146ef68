use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// pi * 100_000
pub const DEFAULT_SEED: u64 = 314159;

/// Generator for the initial centroid draw. `None` seeds from OS entropy.
pub fn new(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::seed_from_u64(rand::random()),
    }
}
