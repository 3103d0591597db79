use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};
use crate::models::domain::{Donor, MatchingConfiguration, OrganRequest, RequestStatus};

/// Request to rank the current store contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindMatchesRequest {
    /// Overrides the server's default matching rules for this call only
    #[serde(default)]
    pub config: Option<MatchingConfiguration>,
}

impl FindMatchesRequest {
    pub fn validate_config(&self) -> Result<(), ValidationErrors> {
        self.config.as_ref().map_or(Ok(()), |config| config.validate())
    }
}

/// Request to rank a caller-supplied snapshot without touching the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSnapshotRequest {
    #[serde(default)]
    pub donors: Vec<Donor>,
    #[serde(default)]
    pub requests: Vec<OrganRequest>,
    #[serde(default)]
    pub config: Option<MatchingConfiguration>,
}

impl RankSnapshotRequest {
    pub fn validate_config(&self) -> Result<(), ValidationErrors> {
        self.config.as_ref().map_or(Ok(()), |config| config.validate())
    }
}

/// Administrative decision on a pending request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RequestStatus,
}
