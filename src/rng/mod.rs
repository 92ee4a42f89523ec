//! Deterministic random number generation
//!
//! One master seed fans out into named ChaCha8 streams, one per subsystem,
//! so extra draws in one subsystem never shift another subsystem's sequence.

use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Borrow the stream for `name`, creating it on first use.
    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let seed = derive_seed(self.master_seed, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        SystemRng { inner: entry }
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Mix the master seed with a stream name (FNV-1a over the name bytes).
fn derive_seed(master: u64, name: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    let mut seed = master;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= hash;
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Helper functions for common random operations
pub trait RngExt {
    fn random_f64(&mut self, min: f64, max: f64) -> f64;
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng> RngExt for R {
    fn random_f64(&mut self, min: f64, max: f64) -> f64 {
        self.gen::<f64>() * (max - min) + min
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }
}
