use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Errors raised while decoding or mutating domain records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
}

/// ABO/Rh blood type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum BloodType {
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "AB+")]
    AbPositive,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::ONegative,
        BloodType::OPositive,
        BloodType::ANegative,
        BloodType::APositive,
        BloodType::BNegative,
        BloodType::BPositive,
        BloodType::AbNegative,
        BloodType::AbPositive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::ONegative => "O-",
            BloodType::OPositive => "O+",
            BloodType::ANegative => "A-",
            BloodType::APositive => "A+",
            BloodType::BNegative => "B-",
            BloodType::BPositive => "B+",
            BloodType::AbNegative => "AB-",
            BloodType::AbPositive => "AB+",
        }
    }

    /// Recipient types a donor of this type may supply
    pub fn recipients(self) -> &'static [BloodType] {
        use BloodType::*;
        match self {
            ONegative => &[
                ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
                AbPositive,
            ],
            OPositive => &[OPositive, APositive, BPositive, AbPositive],
            ANegative => &[ANegative, APositive, AbNegative, AbPositive],
            APositive => &[APositive, AbPositive],
            BNegative => &[BNegative, BPositive, AbNegative, AbPositive],
            BPositive => &[BPositive, AbPositive],
            AbNegative => &[AbNegative, AbPositive],
            AbPositive => &[AbPositive],
        }
    }

    #[inline]
    pub fn can_donate_to(self, recipient: BloodType) -> bool {
        self.recipients().contains(&recipient)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        BloodType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidArgument(format!("unknown blood type '{}'", s)))
    }
}

impl TryFrom<String> for BloodType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Priority classification assigned when a request is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::High => "High",
        }
    }

    /// Unweighted urgency contribution to a match score
    pub fn base_bonus(self) -> f64 {
        match self {
            UrgencyLevel::High => 30.0,
            UrgencyLevel::Medium => 20.0,
            UrgencyLevel::Low => 10.0,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(UrgencyLevel::Low),
            "medium" => Ok(UrgencyLevel::Medium),
            "high" => Ok(UrgencyLevel::High),
            _ => Err(DomainError::InvalidArgument(format!(
                "unknown urgency level '{}', expected one of: Low, Medium, High",
                s
            ))),
        }
    }
}

impl TryFrom<String> for UrgencyLevel {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle of an organ request
///
/// `Pending` moves to `Approved` or `Rejected`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Validate a transition and return the resulting status.
    ///
    /// Re-applying the current status is accepted as a no-op so that an
    /// administrator retrying the same action does not see an error.
    pub fn transition_to(self, next: RequestStatus) -> Result<RequestStatus, DomainError> {
        match (self, next) {
            (from, to) if from == to => Ok(to),
            (RequestStatus::Pending, RequestStatus::Approved | RequestStatus::Rejected) => Ok(next),
            (from, to) => Err(DomainError::InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(DomainError::InvalidArgument(format!(
                "unknown request status '{}', expected one of: Pending, Approved, Rejected",
                s
            ))),
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Registered donor and the organs they have pledged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        rename = "bloodType",
        default,
        deserialize_with = "deserialize_optional_blood_type"
    )]
    pub blood_type: Option<BloodType>,
    #[serde(
        rename = "dateOfBirth",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_organs")]
    pub organs: Vec<String>,
}

impl Donor {
    /// Whether the donor pledged `organ`, ignoring case and surrounding whitespace
    pub fn pledges(&self, organ: &str) -> bool {
        let wanted = normalize_organ(organ);
        self.organs.iter().any(|o| normalize_organ(o) == wanted)
    }

    /// Donor age as a plain year difference; can be one year high before the birthday
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<i32> {
        self.date_of_birth.map(|dob| now.year() - dob.year())
    }
}

/// Canonical form used to compare organ names
pub fn normalize_organ(organ: &str) -> String {
    organ.trim().to_lowercase()
}

/// A patient's request for a single organ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganRequest {
    pub id: String,
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(
        rename = "bloodType",
        default,
        deserialize_with = "deserialize_optional_blood_type"
    )]
    pub blood_type: Option<BloodType>,
    #[serde(rename = "requiredOrgan")]
    pub required_organ: String,
    #[serde(rename = "hospitalName", default)]
    pub hospital_name: String,
    #[serde(rename = "urgencyLevel")]
    pub urgency_level: UrgencyLevel,
    pub status: RequestStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl OrganRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Recipient age usable for age-window checks. Zero is treated as unknown.
    pub fn known_age(&self) -> Option<u32> {
        self.age.filter(|age| *age > 0)
    }
}

/// A pending request paired with its compatible donors and priority score.
/// Recomputed on every ranking pass, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub request: OrganRequest,
    #[serde(rename = "compatibleDonors")]
    pub compatible_donors: Vec<Donor>,
    #[serde(rename = "matchScore")]
    pub match_score: u32,
    #[serde(rename = "urgencyLevel")]
    pub urgency_level: UrgencyLevel,
    /// Whole days since the request was created
    #[serde(rename = "timeOnList")]
    pub time_on_list: u32,
}

/// Headline numbers shown above a ranked list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub potential_matches: usize,
    pub high_priority: usize,
    pub compatible_donors: usize,
}

impl MatchSummary {
    pub fn from_matches(matches: &[Match]) -> Self {
        Self {
            potential_matches: matches.len(),
            high_priority: matches
                .iter()
                .filter(|m| m.urgency_level == UrgencyLevel::High)
                .count(),
            compatible_donors: matches.iter().map(|m| m.compatible_donors.len()).sum(),
        }
    }
}

pub const DEFAULT_AGE_RANGE: u32 = 15;
pub const DEFAULT_URGENCY_WEIGHT: u8 = 8;
pub const DEFAULT_TIME_WEIGHT: u8 = 6;

/// Tunable matching rules, supplied on every ranking call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MatchingConfiguration {
    #[serde(rename = "bloodTypeCompatibility", default = "default_true")]
    pub blood_type_compatibility: bool,
    /// Accepted donor/recipient age difference in years; 0 disables the check
    #[serde(rename = "ageRange", default = "default_age_range")]
    #[validate(range(max = 50))]
    pub age_range: u32,
    /// Carried for clients but not consulted by scoring yet
    #[serde(rename = "geographicPreference", default = "default_true")]
    pub geographic_preference: bool,
    #[serde(rename = "urgencyWeight", default = "default_urgency_weight")]
    #[validate(range(min = 1, max = 10))]
    pub urgency_weight: u8,
    #[serde(rename = "timeWeight", default = "default_time_weight")]
    #[validate(range(min = 1, max = 10))]
    pub time_weight: u8,
}

impl Default for MatchingConfiguration {
    fn default() -> Self {
        Self {
            blood_type_compatibility: true,
            age_range: DEFAULT_AGE_RANGE,
            geographic_preference: true,
            urgency_weight: DEFAULT_URGENCY_WEIGHT,
            time_weight: DEFAULT_TIME_WEIGHT,
        }
    }
}

fn default_true() -> bool { true }
fn default_age_range() -> u32 { DEFAULT_AGE_RANGE }
fn default_urgency_weight() -> u8 { DEFAULT_URGENCY_WEIGHT }
fn default_time_weight() -> u8 { DEFAULT_TIME_WEIGHT }

/// Blank strings and nulls mean "not recorded"; anything else must parse.
fn deserialize_optional_blood_type<'de, D>(deserializer: D) -> Result<Option<BloodType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(value) = raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| de::Error::custom(format!("invalid date of birth '{}'", value)))
}

fn deserialize_organs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let organs: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(organs.unwrap_or_default())
}
