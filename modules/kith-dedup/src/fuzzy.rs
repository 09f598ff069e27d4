//! Fuzzy matcher: weighted composite similarity over all unordered pairs.
//! O(n²) pairwise is acceptable at CRM scale; a blocking pre-filter (first
//! letter of last name, phonetic key) can bound cost later without changing
//! the contract.

use kith_common::{CandidatePair, Person};

use crate::similarity::{
    field_similarity, name_similarity, normalize_email, normalize_name, normalize_phone,
    normalized_opt,
};

/// Tunable knobs for the fuzzy matcher. Missing fields drop out of the
/// weighted average rather than being penalized.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Composite score below this is not a candidate.
    pub threshold: f64,
    pub name_weight: f64,
    pub email_weight: f64,
    pub phone_weight: f64,
    /// Additive bump when both locations are present and equal, capped so
    /// the composite stays in [0, 1]. Location alone can never cross the
    /// threshold.
    pub location_bonus: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            name_weight: 0.6,
            email_weight: 0.25,
            phone_weight: 0.15,
            location_bonus: 0.05,
        }
    }
}

impl DedupConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

pub fn fuzzy_matches(people: &[Person], config: &DedupConfig) -> Vec<CandidatePair> {
    let mut out = Vec::new();
    for i in 0..people.len() {
        for j in (i + 1)..people.len() {
            if let Some(pair) = score_pair(&people[i], &people[j], config) {
                out.push(pair);
            }
        }
    }
    out
}

fn score_pair(a: &Person, b: &Person, config: &DedupConfig) -> Option<CandidatePair> {
    // Two different non-null emails are a strong negative signal: suppress
    // the pair outright, however similar the names.
    let email_a = normalized_opt(a.email.as_deref(), normalize_email);
    let email_b = normalized_opt(b.email.as_deref(), normalize_email);
    if let (Some(ea), Some(eb)) = (&email_a, &email_b) {
        if ea != eb {
            return None;
        }
    }

    let mut weight_sum = 0.0;
    let mut score_sum = 0.0;
    let mut reasons: Vec<String> = Vec::new();

    let name_sim = name_similarity(&a.display_name, &b.display_name);
    weight_sum += config.name_weight;
    score_sum += config.name_weight * name_sim;
    reasons.push(format!("name similarity {name_sim:.2}"));

    if email_a.is_some() && email_b.is_some() {
        // Unequal emails were suppressed above, so this signal is 1.0.
        weight_sum += config.email_weight;
        score_sum += config.email_weight;
        reasons.push("matching email".to_string());
    }

    if let Some(phone_sim) = field_similarity(a.phone.as_deref(), b.phone.as_deref(), normalize_phone)
    {
        weight_sum += config.phone_weight;
        score_sum += config.phone_weight * phone_sim;
        if phone_sim == 1.0 {
            reasons.push("matching phone".to_string());
        }
    }

    let mut composite = score_sum / weight_sum;

    if field_similarity(a.location.as_deref(), b.location.as_deref(), normalize_name) == Some(1.0)
    {
        composite = (composite + config.location_bonus).min(1.0);
        reasons.push("same location".to_string());
    }

    if composite < config.threshold {
        return None;
    }

    Some(CandidatePair::new(
        a.id,
        b.id,
        composite,
        reasons.join(", "),
    ))
}
