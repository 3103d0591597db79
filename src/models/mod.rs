// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    normalize_organ, BloodType, DomainError, Donor, Match, MatchSummary, MatchingConfiguration,
    OrganRequest, RequestStatus, UrgencyLevel,
};
pub use requests::{FindMatchesRequest, RankSnapshotRequest, UpdateStatusRequest};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, StatusUpdateResponse};
