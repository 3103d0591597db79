use chrono::{DateTime, Utc};
use crate::models::{Donor, MatchingConfiguration, OrganRequest};

/// Check whether `donor` can be considered for `request`
///
/// This is the gate in front of scoring. Checks run in order:
/// 1. Organ availability (case-insensitive)
/// 2. ABO/Rh compatibility, when enabled and both blood types are known
/// 3. Age window, when enabled and both ages are known
///
/// A check whose inputs are missing does not apply; it never fails the pair.
#[inline]
pub fn is_compatible(
    donor: &Donor,
    request: &OrganRequest,
    config: &MatchingConfiguration,
    now: DateTime<Utc>,
) -> bool {
    if !donor.pledges(&request.required_organ) {
        return false;
    }

    if config.blood_type_compatibility && !blood_types_compatible(donor, request) {
        return false;
    }

    if config.age_range > 0 && !within_age_range(donor, request, config.age_range, now) {
        return false;
    }

    true
}

#[inline]
fn blood_types_compatible(donor: &Donor, request: &OrganRequest) -> bool {
    match (donor.blood_type, request.blood_type) {
        (Some(donor_type), Some(recipient_type)) => donor_type.can_donate_to(recipient_type),
        _ => true,
    }
}

#[inline]
fn within_age_range(
    donor: &Donor,
    request: &OrganRequest,
    age_range: u32,
    now: DateTime<Utc>,
) -> bool {
    match (donor.age_at(now), request.known_age()) {
        (Some(donor_age), Some(recipient_age)) => {
            let difference = (i64::from(donor_age) - i64::from(recipient_age)).unsigned_abs();
            difference <= u64::from(age_range)
        }
        _ => true,
    }
}

/// Same blood type on both sides; unknown types never count as exact
#[inline]
pub fn is_exact_blood_match(donor: &Donor, request: &OrganRequest) -> bool {
    // Two missing types are not a match, unlike the dashboard's `===` comparison
    matches!(
        (donor.blood_type, request.blood_type),
        (Some(d), Some(r)) if d == r
    )
}
