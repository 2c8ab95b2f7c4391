use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of oracle index draws.
///
/// Production uses the thread-local CSPRNG, which callers cannot predict or
/// steer. Tests inject a seeded generator.
pub trait IndexSource: Send {
    /// Draw an index in `[0, buckets)`
    fn next_index(&mut self, buckets: u8) -> u8;
}

/// Draws from the OS-seeded thread-local CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsIndexSource;

impl IndexSource for OsIndexSource {
    fn next_index(&mut self, buckets: u8) -> u8 {
        rand::thread_rng().gen_range(0..buckets)
    }
}

/// Deterministic draws for tests and simulations
#[derive(Debug, Clone)]
pub struct SeededIndexSource {
    rng: StdRng,
}

impl SeededIndexSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IndexSource for SeededIndexSource {
    fn next_index(&mut self, buckets: u8) -> u8 {
        self.rng.gen_range(0..buckets)
    }
}

/// Draw three pairwise-distinct indexes, redrawing on collision.
///
/// `buckets` must be at least 3.
pub fn distinct_indexes(source: &mut dyn IndexSource, buckets: u8) -> [u8; 3] {
    let first = source.next_index(buckets);

    let mut second = source.next_index(buckets);
    while second == first {
        second = source.next_index(buckets);
    }

    let mut third = source.next_index(buckets);
    while third == first || third == second {
        third = source.next_index(buckets);
    }

    [first, second, third]
}
