use crate::core::compatibility::is_exact_blood_match;
use crate::models::{Donor, MatchingConfiguration, OrganRequest};

/// Points per compatible donor
pub const POINTS_PER_DONOR: f64 = 10.0;
/// Points per day on the waiting list, before weighting
pub const POINTS_PER_DAY: f64 = 2.0;
/// Ceiling on the raw waiting-time contribution
pub const MAX_WAIT_POINTS: f64 = 50.0;
/// Points per donor sharing the recipient's exact blood type
pub const EXACT_MATCH_POINTS: f64 = 5.0;

/// Calculate the priority score of a request given its compatible donors
///
/// Scoring formula:
/// score = round(
///     10 * donors +                               # supply available
///     urgency_base * urgency_weight / 10 +        # High 30, Medium 20, Low 10
///     min(days * 2, 50) * time_weight / 10 +      # capped waiting time
///     5 * exact_blood_matches                     # identical blood type
/// )
pub fn calculate_match_score(
    request: &OrganRequest,
    compatible_donors: &[Donor],
    days_waiting: u32,
    config: &MatchingConfiguration,
) -> u32 {
    let supply_score = compatible_donors.len() as f64 * POINTS_PER_DONOR;

    let urgency_score = weighted(request.urgency_level.base_bonus(), config.urgency_weight);

    let wait_score = weighted(wait_points(days_waiting), config.time_weight);

    let exact_matches = compatible_donors
        .iter()
        .filter(|donor| is_exact_blood_match(donor, request))
        .count();
    let exact_score = exact_matches as f64 * EXACT_MATCH_POINTS;

    let total = supply_score + urgency_score + wait_score + exact_score;

    // Non-negative by construction, so the cast only saturates on absurd pools
    total.round() as u32
}

/// Apply a 1-10 weight as a fraction of ten
#[inline]
fn weighted(points: f64, weight: u8) -> f64 {
    points * f64::from(weight) / 10.0
}

#[inline]
fn wait_points(days_waiting: u32) -> f64 {
    (f64::from(days_waiting) * POINTS_PER_DAY).min(MAX_WAIT_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodType, RequestStatus, UrgencyLevel};
    use chrono::Utc;

    fn create_test_request(urgency_level: UrgencyLevel, blood_type: BloodType) -> OrganRequest {
        OrganRequest {
            id: "r1".to_string(),
            patient_id: "p1".to_string(),
            patient_name: "Test Patient".to_string(),
            age: Some(40),
            blood_type: Some(blood_type),
            required_organ: "kidney".to_string(),
            hospital_name: "General".to_string(),
            urgency_level,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn create_test_donors(blood_types: &[BloodType]) -> Vec<Donor> {
        blood_types
            .iter()
            .enumerate()
            .map(|(i, t)| Donor {
                id: format!("d{}", i),
                name: format!("Donor {}", i),
                blood_type: Some(*t),
                date_of_birth: None,
                organs: vec!["kidney".to_string()],
            })
            .collect()
    }

    #[test]
    fn test_reference_score() {
        let request = create_test_request(UrgencyLevel::High, BloodType::AbPositive);
        let donors = create_test_donors(&[BloodType::ONegative]);

        // 10 + 30*0.8 + 20*0.6 + 0
        let score = calculate_match_score(&request, &donors, 10, &MatchingConfiguration::default());
        assert_eq!(score, 46);
    }

    #[test]
    fn test_urgency_bonus() {
        let config = MatchingConfiguration::default();
        let donors = create_test_donors(&[BloodType::ONegative]);

        let low = calculate_match_score(&create_test_request(UrgencyLevel::Low, BloodType::APositive), &donors, 0, &config);
        let medium = calculate_match_score(&create_test_request(UrgencyLevel::Medium, BloodType::APositive), &donors, 0, &config);
        let high = calculate_match_score(&create_test_request(UrgencyLevel::High, BloodType::APositive), &donors, 0, &config);

        assert_eq!(low, 18);
        assert_eq!(medium, 26);
        assert_eq!(high, 34);
    }

    #[test]
    fn test_wait_time_is_capped() {
        let config = MatchingConfiguration { time_weight: 10, ..MatchingConfiguration::default() };
        let request = create_test_request(UrgencyLevel::Low, BloodType::APositive);
        let donors = create_test_donors(&[BloodType::ONegative]);

        let at_cap = calculate_match_score(&request, &donors, 25, &config);
        let beyond_cap = calculate_match_score(&request, &donors, 4000, &config);
        let before_cap = calculate_match_score(&request, &donors, 24, &config);

        assert_eq!(at_cap, beyond_cap);
        assert_eq!(at_cap - before_cap, 2);
    }

    #[test]
    fn test_exact_blood_type_bonus() {
        let config = MatchingConfiguration::default();
        let request = create_test_request(UrgencyLevel::Low, BloodType::APositive);

        let mixed = create_test_donors(&[BloodType::APositive, BloodType::ONegative]);
        let none_exact = create_test_donors(&[BloodType::ONegative, BloodType::ONegative]);

        let with_bonus = calculate_match_score(&request, &mixed, 0, &config);
        let without_bonus = calculate_match_score(&request, &none_exact, 0, &config);

        assert_eq!(with_bonus - without_bonus, 5);
    }

    #[test]
    fn test_rounding_happens_once() {
        // 10 * 0.7 = 7, 3 days * 2 * 0.3 = 1.8 -> 10 + 7 + 1.8 = 18.8 -> 19
        let config = MatchingConfiguration {
            urgency_weight: 7,
            time_weight: 3,
            ..MatchingConfiguration::default()
        };
        let request = create_test_request(UrgencyLevel::Low, BloodType::APositive);
        let donors = create_test_donors(&[BloodType::ONegative]);

        assert_eq!(calculate_match_score(&request, &donors, 3, &config), 19);
    }

    #[test]
    fn test_empty_donor_set_scores_urgency_and_wait_only() {
        let request = create_test_request(UrgencyLevel::Medium, BloodType::APositive);
        let score = calculate_match_score(&request, &[], 0, &MatchingConfiguration::default());
        assert_eq!(score, 16);
    }
}
