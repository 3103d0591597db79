// Integration tests for Organ Match

use chrono::{DateTime, Duration, TimeZone, Utc};
use organ_match::core::{rank, Matcher, RegistryStats};
use organ_match::models::{
    BloodType, Donor, MatchingConfiguration, OrganRequest, RequestStatus, UrgencyLevel,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap()
}

fn create_test_donor(id: &str, blood_type: BloodType, organs: &[&str]) -> Donor {
    Donor {
        id: id.to_string(),
        name: format!("Donor {}", id),
        blood_type: Some(blood_type),
        date_of_birth: None,
        organs: organs.iter().map(|o| o.to_string()).collect(),
    }
}

fn create_test_request(
    id: &str,
    organ: &str,
    blood_type: BloodType,
    urgency_level: UrgencyLevel,
    days_ago: i64,
) -> OrganRequest {
    OrganRequest {
        id: id.to_string(),
        patient_id: format!("patient-{}", id),
        patient_name: format!("Patient {}", id),
        age: Some(40),
        blood_type: Some(blood_type),
        required_organ: organ.to_string(),
        hospital_name: "City Hospital".to_string(),
        urgency_level,
        status: RequestStatus::Pending,
        created_at: fixed_now() - Duration::days(days_ago),
    }
}

#[test]
fn test_integration_single_universal_donor() {
    let donors = vec![create_test_donor("o-neg", BloodType::ONegative, &["heart"])];
    let requests = vec![create_test_request("r1", "heart", BloodType::AbPositive, UrgencyLevel::High, 10)];

    let matches = rank(&donors, &requests, &MatchingConfiguration::default(), fixed_now());

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].compatible_donors.len(), 1);
    assert_eq!(matches[0].match_score, 46);
    assert_eq!(matches[0].time_on_list, 10);
}

#[test]
fn test_integration_end_to_end_ranking() {
    let donors = vec![
        create_test_donor("1", BloodType::ONegative, &["kidney", "liver", "cornea"]),
        create_test_donor("2", BloodType::APositive, &["kidney"]),
        create_test_donor("3", BloodType::BPositive, &["Kidney"]),
        create_test_donor("4", BloodType::AbPositive, &["heart"]),
        create_test_donor("5", BloodType::OPositive, &["liver"]),
    ];

    let mut decided = create_test_request("decided", "kidney", BloodType::APositive, UrgencyLevel::High, 90);
    decided.status = RequestStatus::Approved;

    let requests = vec![
        create_test_request("kidney-a", "kidney", BloodType::APositive, UrgencyLevel::Medium, 30),
        create_test_request("heart-a", "heart", BloodType::APositive, UrgencyLevel::High, 5), // only AB+ donor
        create_test_request("liver-b", "liver", BloodType::BPositive, UrgencyLevel::High, 1),
        create_test_request("cornea-o", "cornea", BloodType::ONegative, UrgencyLevel::Low, 0),
        decided,
    ];

    let matches = rank(&donors, &requests, &MatchingConfiguration::default(), fixed_now());

    // heart-a has no compatible donor, decided is not pending
    let ids: Vec<&str> = matches.iter().map(|m| m.request.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(&"heart-a"));
    assert!(!ids.contains(&"decided"));

    // Every match only references donors pledging the organ
    for m in &matches {
        assert!(!m.compatible_donors.is_empty());
        for d in &m.compatible_donors {
            assert!(d.pledges(&m.request.required_organ));
            let (Some(donor_type), Some(recipient_type)) = (d.blood_type, m.request.blood_type) else {
                continue;
            };
            assert!(donor_type.can_donate_to(recipient_type));
        }
    }

    // Sorted non-increasing
    for i in 1..matches.len() {
        assert!(
            matches[i - 1].match_score >= matches[i].match_score,
            "Matches not sorted by score"
        );
    }

    // kidney-a: O- and A+ donors (B+ cannot supply A+)
    // 20 + 16 + 50*0.6 + 5 = 71
    let kidney = matches.iter().find(|m| m.request.id == "kidney-a").unwrap();
    assert_eq!(kidney.compatible_donors.len(), 2);
    assert_eq!(kidney.match_score, 71);
    assert_eq!(ids[0], "kidney-a");
}

#[test]
fn test_equal_scores_keep_request_order() {
    let donors = vec![create_test_donor("1", BloodType::ONegative, &["kidney", "lung"])];
    let requests = vec![
        create_test_request("first", "kidney", BloodType::APositive, UrgencyLevel::Low, 3),
        create_test_request("second", "lung", BloodType::BPositive, UrgencyLevel::Low, 3),
        create_test_request("third", "kidney", BloodType::OPositive, UrgencyLevel::Low, 3),
    ];

    let matches = rank(&donors, &requests, &MatchingConfiguration::default(), fixed_now());
    let ids: Vec<&str> = matches.iter().map(|m| m.request.id.as_str()).collect();

    assert!(matches.iter().all(|m| m.match_score == matches[0].match_score));
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn test_empty_pools() {
    let config = MatchingConfiguration::default();
    let donors = vec![create_test_donor("1", BloodType::ONegative, &["kidney"])];
    let requests = vec![create_test_request("r1", "kidney", BloodType::APositive, UrgencyLevel::Low, 0)];

    assert!(rank(&[], &[], &config, fixed_now()).is_empty());
    assert!(rank(&donors, &[], &config, fixed_now()).is_empty());
    assert!(rank(&[], &requests, &config, fixed_now()).is_empty());
}

#[test]
fn test_ranking_is_idempotent() {
    let matcher = Matcher::with_default_config();
    let donors: Vec<Donor> = BloodType::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| create_test_donor(&i.to_string(), *t, &["kidney", "liver"]))
        .collect();
    let requests: Vec<OrganRequest> = BloodType::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let urgency = [UrgencyLevel::Low, UrgencyLevel::Medium, UrgencyLevel::High][i % 3];
            let organ = if i % 2 == 0 { "kidney" } else { "liver" };
            create_test_request(&format!("r{}", i), organ, *t, urgency, i as i64 * 4)
        })
        .collect();

    let first = matcher.find_matches_at(&donors, &requests, None, fixed_now());
    let second = matcher.find_matches_at(&donors, &requests, None, fixed_now());

    assert_eq!(first.matches, second.matches);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_weights_shift_priorities() {
    let donors = vec![create_test_donor("1", BloodType::ONegative, &["kidney"])];
    let requests = vec![
        create_test_request("urgent-new", "kidney", BloodType::APositive, UrgencyLevel::High, 0),
        create_test_request("calm-old", "kidney", BloodType::APositive, UrgencyLevel::Low, 40),
    ];

    let urgency_heavy = MatchingConfiguration { urgency_weight: 10, time_weight: 1, ..MatchingConfiguration::default() };
    let time_heavy = MatchingConfiguration { urgency_weight: 1, time_weight: 10, ..MatchingConfiguration::default() };

    let by_urgency = rank(&donors, &requests, &urgency_heavy, fixed_now());
    let by_time = rank(&donors, &requests, &time_heavy, fixed_now());

    assert_eq!(by_urgency[0].request.id, "urgent-new");
    assert_eq!(by_time[0].request.id, "calm-old");
}

#[test]
fn test_registry_stats_over_mixed_pool() {
    let donors = vec![
        create_test_donor("1", BloodType::ONegative, &["kidney", "liver"]),
        create_test_donor("2", BloodType::APositive, &["Kidney"]),
    ];
    let mut approved = create_test_request("r2", "liver", BloodType::APositive, UrgencyLevel::Low, 3);
    approved.status = RequestStatus::Approved;
    let requests = vec![
        create_test_request("r1", "kidney", BloodType::APositive, UrgencyLevel::High, 3),
        approved,
    ];

    let stats = RegistryStats::collect(&donors, &requests);

    assert_eq!(stats.total_donors, 2);
    assert_eq!(stats.requests_by_status.pending, 1);
    assert_eq!(stats.requests_by_status.approved, 1);
    assert_eq!(stats.organ_pledges["kidney"], 2);
    assert_eq!(stats.organ_pledges["liver"], 1);
}
