//! Producers of the values the refresh task installs.

pub mod fake;

use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Computes a fresh value on every refresh tick.
pub trait ValueSource: Send + 'static {
    type Value: Serialize + Send + Sync + 'static;

    fn next_value(&mut self) -> Result<Self::Value>;

    /// Sources that may block (I/O, heavy computation) return `true` and are
    /// run on the blocking thread pool instead of the async scheduler.
    fn is_blocking(&self) -> bool {
        false
    }
}

/// A random person record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub name: String,
    pub address: String,
}

/// Produces a new random [`Person`] on every tick.
pub struct PersonSource {
    rng: StdRng,
}

impl PersonSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence, mostly for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for PersonSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSource for PersonSource {
    type Value = Person;

    fn next_value(&mut self) -> Result<Person> {
        Ok(Person {
            name: fake::name(&mut self.rng),
            address: fake::address(&mut self.rng),
        })
    }
}

/// Counts up from a starting point, one step per tick.
#[derive(Debug, Default)]
pub struct CounterSource {
    next: u64,
}

impl CounterSource {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl ValueSource for CounterSource {
    type Value = u64;

    fn next_value(&mut self) -> Result<u64> {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        Ok(value)
    }
}

/// Adapts any source to produce `serde_json::Value`, so sources with
/// different value types can feed the same cell.
pub struct Json<S>(pub S);

impl<S: ValueSource> ValueSource for Json<S> {
    type Value = serde_json::Value;

    fn next_value(&mut self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.0.next_value()?)?)
    }

    fn is_blocking(&self) -> bool {
        self.0.is_blocking()
    }
}
