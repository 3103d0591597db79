use chrono::{DateTime, Utc};
use std::collections::HashMap;
use crate::models::{
    normalize_organ, Donor, Match, MatchSummary, MatchingConfiguration, OrganRequest,
};
use crate::core::{compatibility::is_compatible, scoring::calculate_match_score};

/// Result of a ranking pass
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matches: Vec<Match>,
    pub summary: MatchSummary,
    pub pending_requests: usize,
    pub total_donors: usize,
}

/// Rank every pending request against the donor pool
///
/// # Pipeline Stages
/// 1. Keep `Pending` requests only
/// 2. Filter donors through the compatibility predicate
/// 3. Drop requests with no compatible donor
/// 4. Score with the clamped waiting time
/// 5. Stable sort by score, descending
///
/// Pure over its inputs; `now` is the only clock read.
pub fn rank(
    donors: &[Donor],
    requests: &[OrganRequest],
    config: &MatchingConfiguration,
    now: DateTime<Utc>,
) -> Vec<Match> {
    let index = DonorIndex::build(donors);

    let mut matches: Vec<Match> = requests
        .iter()
        // Stage 1: Pending only
        .filter(|request| request.is_pending())
        .filter_map(|request| {
            // Stage 2: Compatibility predicate
            let compatible_donors: Vec<Donor> = index
                .pledging(&request.required_organ)
                .filter(|donor| is_compatible(donor, request, config, now))
                .cloned()
                .collect();

            // Stage 3: Nothing to offer
            if compatible_donors.is_empty() {
                return None;
            }

            // Stage 4: Scoring
            let time_on_list = days_waiting(request.created_at, now);
            let match_score =
                calculate_match_score(request, &compatible_donors, time_on_list, config);

            Some(Match {
                request: request.clone(),
                compatible_donors,
                match_score,
                urgency_level: request.urgency_level,
                time_on_list,
            })
        })
        .collect();

    // Stage 5: slice::sort_by is stable, so equal scores keep request order
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    matches
}

/// Whole days between `created_at` and `now`
///
/// Timestamps in the future (clock skew, bad imports) clamp to zero.
pub fn days_waiting(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = (now - created_at).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Donors grouped by normalized organ name, each bucket in pool order
struct DonorIndex<'a> {
    by_organ: HashMap<String, Vec<&'a Donor>>,
}

impl<'a> DonorIndex<'a> {
    fn build(donors: &'a [Donor]) -> Self {
        let mut by_organ: HashMap<String, Vec<&'a Donor>> = HashMap::new();

        for donor in donors {
            let mut seen: Vec<String> = Vec::with_capacity(donor.organs.len());
            for organ in &donor.organs {
                let key = normalize_organ(organ);
                // A donor listing "Kidney" and "kidney" must appear once
                if seen.contains(&key) {
                    continue;
                }
                by_organ.entry(key.clone()).or_default().push(donor);
                seen.push(key);
            }
        }

        Self { by_organ }
    }

    fn pledging(&self, organ: &str) -> impl Iterator<Item = &'a Donor> + '_ {
        self.by_organ
            .get(&normalize_organ(organ))
            .into_iter()
            .flat_map(|donors| donors.iter().copied())
    }
}

/// Ranking entry point that carries the service's default rules
///
/// The defaults are immutable; callers override them per call rather than
/// editing shared state.
#[derive(Debug, Clone)]
pub struct Matcher {
    defaults: MatchingConfiguration,
}

impl Matcher {
    pub fn new(defaults: MatchingConfiguration) -> Self {
        Self { defaults }
    }

    pub fn with_default_config() -> Self {
        Self {
            defaults: MatchingConfiguration::default(),
        }
    }

    pub fn defaults(&self) -> &MatchingConfiguration {
        &self.defaults
    }

    /// Rank `requests` against `donors` as of now
    ///
    /// # Arguments
    /// * `donors` - The full donor pool
    /// * `requests` - All requests; non-pending ones are ignored
    /// * `config` - Per-call rules, falling back to the defaults
    pub fn find_matches(
        &self,
        donors: &[Donor],
        requests: &[OrganRequest],
        config: Option<&MatchingConfiguration>,
    ) -> MatchResult {
        self.find_matches_at(donors, requests, config, Utc::now())
    }

    /// Same as [`Matcher::find_matches`] with an explicit clock
    pub fn find_matches_at(
        &self,
        donors: &[Donor],
        requests: &[OrganRequest],
        config: Option<&MatchingConfiguration>,
        now: DateTime<Utc>,
    ) -> MatchResult {
        let config = config.unwrap_or(&self.defaults);
        let matches = rank(donors, requests, config, now);

        MatchResult {
            summary: MatchSummary::from_matches(&matches),
            pending_requests: requests.iter().filter(|r| r.is_pending()).count(),
            total_donors: donors.len(),
            matches,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}
