//! Session-scoped seed table: one stable `[0, 1)` seed per material identity.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors returned when seeding an identity explicitly.
#[derive(Debug, Error, PartialEq)]
pub enum SeedTableError {
    /// The identity already holds a seed; seeds never change once assigned.
    #[error("identity {0:?} already has a seed")]
    AlreadySeeded(String),

    /// Seeds must lie in `[0, 1)`.
    #[error("seed {0} is outside [0, 1)")]
    OutOfRange(f64),
}

/// Maps material identities to their seeds.
///
/// Seeds are drawn lazily from the table's own [`ChaCha8Rng`] the first time
/// an identity is seen, and are kept until [`SeedTable::reset`]. The table is
/// created once per session and passed by reference into every invocation.
///
/// Seeds are keyed by name and survive removal of the material that used the
/// name. A material later created under a freed name (for example
/// `BlockMaterial` after cleanup) inherits that seed and so its old color.
#[derive(Debug, Clone)]
pub struct SeedTable {
    seeds: HashMap<String, f64>,
    rng: ChaCha8Rng,
}

impl Default for SeedTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedTable {
    /// Creates an empty table whose seed stream comes from OS entropy.
    pub fn new() -> Self {
        Self::with_rng_seed(rand::rng().random())
    }

    /// Creates an empty table with a pinned seed stream, making the whole
    /// session reproducible.
    pub fn with_rng_seed(rng_seed: u64) -> Self {
        Self {
            seeds: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Returns the seed for `identity`, drawing and storing one if absent.
    pub fn seed_for(&mut self, identity: &str) -> f64 {
        if let Some(&seed) = self.seeds.get(identity) {
            return seed;
        }
        let seed: f64 = self.rng.random();
        tracing::trace!(identity, seed, "drew new seed");
        self.seeds.insert(identity.to_owned(), seed);
        seed
    }

    /// Assigns a seed to an identity that has none yet.
    ///
    /// # Errors
    ///
    /// Returns [`SeedTableError::OutOfRange`] for seeds outside `[0, 1)` and
    /// [`SeedTableError::AlreadySeeded`] if the identity is already known.
    pub fn try_insert(
        &mut self,
        identity: impl Into<String>,
        seed: f64,
    ) -> Result<(), SeedTableError> {
        if !(0.0..1.0).contains(&seed) {
            return Err(SeedTableError::OutOfRange(seed));
        }
        let identity = identity.into();
        if self.seeds.contains_key(&identity) {
            return Err(SeedTableError::AlreadySeeded(identity));
        }
        self.seeds.insert(identity, seed);
        Ok(())
    }

    /// Stored seed for `identity`, without drawing.
    pub fn get(&self, identity: &str) -> Option<f64> {
        self.seeds.get(identity).copied()
    }

    /// Returns `true` if `identity` already has a seed.
    pub fn contains(&self, identity: &str) -> bool {
        self.seeds.contains_key(identity)
    }

    /// Number of seeded identities.
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Returns `true` if no identity has been seeded.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Iterates `(identity, seed)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.seeds.iter().map(|(identity, &seed)| (identity.as_str(), seed))
    }

    /// Forgets every seed. The seed stream continues where it was.
    pub fn reset(&mut self) {
        self.seeds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sight_draws_in_unit_range() {
        let mut table = SeedTable::with_rng_seed(1);
        let seed = table.seed_for("BlockMaterial");
        assert!((0.0..1.0).contains(&seed));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_seed_is_stable_once_assigned() {
        let mut table = SeedTable::with_rng_seed(1);
        let first = table.seed_for("BlockMaterial");
        table.seed_for("BlockMaterial.001");
        let again = table.seed_for("BlockMaterial");
        assert_eq!(first.to_bits(), again.to_bits());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_pinned_stream_is_reproducible() {
        let mut a = SeedTable::with_rng_seed(99);
        let mut b = SeedTable::with_rng_seed(99);
        for name in ["x", "y", "z"] {
            assert_eq!(a.seed_for(name), b.seed_for(name));
        }
    }

    #[test]
    fn test_distinct_identities_get_distinct_seeds() {
        let mut table = SeedTable::with_rng_seed(5);
        assert_ne!(table.seed_for("a"), table.seed_for("b"));
    }

    #[test]
    fn test_try_insert_sets_seed() {
        let mut table = SeedTable::with_rng_seed(1);
        table.try_insert("B", 0.3).unwrap();
        assert_eq!(table.get("B"), Some(0.3));
        assert_eq!(table.seed_for("B"), 0.3);
    }

    #[test]
    fn test_try_insert_never_overwrites() {
        let mut table = SeedTable::with_rng_seed(1);
        let drawn = table.seed_for("B");
        assert_eq!(
            table.try_insert("B", 0.3),
            Err(SeedTableError::AlreadySeeded("B".to_string()))
        );
        assert_eq!(table.get("B"), Some(drawn));
    }

    #[test]
    fn test_try_insert_rejects_out_of_range() {
        let mut table = SeedTable::with_rng_seed(1);
        assert_eq!(table.try_insert("B", 1.0), Err(SeedTableError::OutOfRange(1.0)));
        assert_eq!(table.try_insert("B", -0.1), Err(SeedTableError::OutOfRange(-0.1)));
        assert!(table.try_insert("B", f64::NAN).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_iter_lists_every_seed() {
        let mut table = SeedTable::with_rng_seed(1);
        table.try_insert("a", 0.25).unwrap();
        table.try_insert("b", 0.5).unwrap();
        let mut pairs: Vec<(&str, f64)> = table.iter().collect();
        pairs.sort_by(|x, y| x.0.cmp(y.0));
        assert_eq!(pairs, [("a", 0.25), ("b", 0.5)]);
    }

    #[test]
    fn test_reset_forgets_seeds() {
        let mut table = SeedTable::with_rng_seed(1);
        table.seed_for("a");
        table.reset();
        assert!(table.is_empty());
        assert!(!table.contains("a"));
    }
}
