//! Simulated environment with a virtual clock and seeded RNG.
//!
//! Time only moves when a test advances it, and the RNG is a ChaCha stream
//! from a fixed seed, so every run of a scenario sees identical instants and
//! identical "random" header colors.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    future::Future,
    ops::{Add, Sub},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tidings_core::Environment;

/// Point on the virtual timeline, measured from the start of the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Instant `offset` after the start of the simulation.
    pub fn from_start(offset: Duration) -> Self {
        Self(offset)
    }

    /// Time since the start of the simulation.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = SimInstant;

    fn add(self, offset: Duration) -> SimInstant {
        SimInstant(self.0 + offset)
    }
}

#[derive(Debug)]
struct Shared {
    now: SimInstant,
    rng: ChaCha8Rng,
}

/// Deterministic environment for simulation.
///
/// Clones share one clock and one RNG stream.
#[derive(Debug, Clone)]
pub struct SimEnv {
    shared: Arc<Mutex<Shared>>,
}

impl SimEnv {
    /// Create an environment at time zero with the given RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let shared = Shared { now: SimInstant::default(), rng: ChaCha8Rng::seed_from_u64(seed) };
        Self { shared: Arc::new(Mutex::new(shared)) }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, by: Duration) {
        let mut shared = self.lock();
        shared.now = shared.now + by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        self.lock().now
    }

    /// Advances the virtual clock and completes immediately.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_moves_only_when_advanced() {
        let env = SimEnv::with_seed(1);
        let start = env.now();

        assert_eq!(env.now(), start);
        env.advance(Duration::from_millis(250));
        assert_eq!(env.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn clones_share_clock() {
        let env = SimEnv::with_seed(1);
        let other = env.clone();

        other.advance(Duration::from_secs(3));

        assert_eq!(env.now().since_start(), Duration::from_secs(3));
    }

    #[test]
    fn same_seed_same_bytes() {
        let a = SimEnv::with_seed(42);
        let b = SimEnv::with_seed(42);

        let mut x = [0u8; 16];
        let mut y = [0u8; 16];
        a.random_bytes(&mut x);
        b.random_bytes(&mut y);

        assert_eq!(x, y);
    }

    #[test]
    fn earlier_minus_later_saturates() {
        let early = SimInstant::from_start(Duration::from_secs(1));
        let late = SimInstant::from_start(Duration::from_secs(2));

        assert_eq!(early - late, Duration::ZERO);
    }
}
