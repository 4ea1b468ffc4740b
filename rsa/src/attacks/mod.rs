pub mod brute_force;
pub mod factorization;

pub use brute_force::{BruteForceAttack, KnownPair, SearchRange, known_pairs};
pub use factorization::{FactorizationAttack, FactorizationResult, factor};
