//! Organ Match - donor/request compatibility and priority ranking for OrganConnect
//!
//! This library provides the matching engine used by the OrganConnect
//! administration dashboard. Every pending organ request is checked against
//! the donor pool, scored by supply, urgency, waiting time and blood-type
//! fit, and returned as a ranked list for an administrator to act on.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, is_compatible, rank, MatchResult, Matcher, RegistryStats};
pub use models::{
    BloodType, Donor, Match, MatchSummary, MatchingConfiguration, OrganRequest, RequestStatus,
    UrgencyLevel,
};
