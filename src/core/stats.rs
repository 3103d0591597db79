use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::models::{normalize_organ, Donor, OrganRequest, RequestStatus, UrgencyLevel};

/// Registry-wide counts for the analytics panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_donors: usize,
    pub total_requests: usize,
    pub requests_by_status: StatusCounts,
    pub requests_by_urgency: UrgencyCounts,
    /// Donors pledging each organ, keyed by lowercase name
    pub organ_pledges: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RegistryStats {
    pub fn collect(donors: &[Donor], requests: &[OrganRequest]) -> Self {
        let mut stats = RegistryStats {
            total_donors: donors.len(),
            total_requests: requests.len(),
            ..RegistryStats::default()
        };

        for request in requests {
            match request.status {
                RequestStatus::Pending => stats.requests_by_status.pending += 1,
                RequestStatus::Approved => stats.requests_by_status.approved += 1,
                RequestStatus::Rejected => stats.requests_by_status.rejected += 1,
            }
            match request.urgency_level {
                UrgencyLevel::High => stats.requests_by_urgency.high += 1,
                UrgencyLevel::Medium => stats.requests_by_urgency.medium += 1,
                UrgencyLevel::Low => stats.requests_by_urgency.low += 1,
            }
        }

        for donor in donors {
            let organs: BTreeSet<String> = donor.organs.iter().map(|o| normalize_organ(o)).collect();
            for organ in organs {
                *stats.organ_pledges.entry(organ).or_insert(0) += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_request(status: RequestStatus, urgency_level: UrgencyLevel) -> OrganRequest {
        OrganRequest {
            id: "r".to_string(),
            patient_id: "p".to_string(),
            patient_name: "Patient".to_string(),
            age: None,
            blood_type: None,
            required_organ: "kidney".to_string(),
            hospital_name: String::new(),
            urgency_level,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_collect_counts() {
        let donors = vec![
            Donor {
                id: "1".to_string(),
                name: "A".to_string(),
                blood_type: None,
                date_of_birth: None,
                organs: vec!["Kidney".to_string(), "kidney".to_string(), "cornea".to_string()],
            },
            Donor {
                id: "2".to_string(),
                name: "B".to_string(),
                blood_type: None,
                date_of_birth: None,
                organs: vec!["kidney".to_string()],
            },
        ];
        let requests = vec![
            create_request(RequestStatus::Pending, UrgencyLevel::High),
            create_request(RequestStatus::Pending, UrgencyLevel::Low),
            create_request(RequestStatus::Approved, UrgencyLevel::High),
            create_request(RequestStatus::Rejected, UrgencyLevel::Medium),
        ];

        let stats = RegistryStats::collect(&donors, &requests);

        assert_eq!(stats.total_donors, 2);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.requests_by_status, StatusCounts { pending: 2, approved: 1, rejected: 1 });
        assert_eq!(stats.requests_by_urgency, UrgencyCounts { high: 2, medium: 1, low: 1 });
        assert_eq!(stats.organ_pledges.get("kidney"), Some(&2));
        assert_eq!(stats.organ_pledges.get("cornea"), Some(&1));
    }

    #[test]
    fn test_empty_registry() {
        assert_eq!(RegistryStats::collect(&[], &[]), RegistryStats::default());
    }
}
