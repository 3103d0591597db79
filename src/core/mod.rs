// Core algorithm exports
pub mod compatibility;
pub mod matcher;
pub mod scoring;
pub mod stats;

pub use compatibility::{is_compatible, is_exact_blood_match};
pub use matcher::{days_waiting, rank, MatchResult, Matcher};
pub use scoring::calculate_match_score;
pub use stats::RegistryStats;
