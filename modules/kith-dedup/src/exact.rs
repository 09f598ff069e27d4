//! Deterministic matcher: exact-key collisions on normalized email or
//! phone. Buckets each field once, emits all pairs inside buckets of size
//! two or more, so the scan stays O(n) in the bucket passes rather than
//! O(n²) pairwise.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use kith_common::{CandidatePair, Person};

use crate::similarity::{normalize_email, normalize_phone, normalized_opt};

/// Emails are normalized and unique-indexed per workspace, so a collision
/// is near-proof. Phones are free-form user input (shared landlines exist).
const EMAIL_CONFIDENCE: f64 = 0.98;
const PHONE_CONFIDENCE: f64 = 0.95;

pub fn exact_matches(people: &[Person]) -> Vec<CandidatePair> {
    let mut out = Vec::new();
    let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();

    // Email pass first: a pair matching on both fields keeps the email reason.
    let email_buckets = bucket_by(people, |p| {
        normalized_opt(p.email.as_deref(), normalize_email)
    });
    emit_bucket_pairs(
        &email_buckets,
        EMAIL_CONFIDENCE,
        "exact email match",
        &mut seen,
        &mut out,
    );

    let phone_buckets = bucket_by(people, |p| {
        normalized_opt(p.phone.as_deref(), normalize_phone)
    });
    emit_bucket_pairs(
        &phone_buckets,
        PHONE_CONFIDENCE,
        "exact phone match",
        &mut seen,
        &mut out,
    );

    out
}

fn bucket_by(
    people: &[Person],
    key: impl Fn(&Person) -> Option<String>,
) -> HashMap<String, Vec<Uuid>> {
    let mut buckets: HashMap<String, Vec<Uuid>> = HashMap::new();
    for person in people {
        if let Some(k) = key(person) {
            buckets.entry(k).or_default().push(person.id);
        }
    }
    buckets
}

fn emit_bucket_pairs(
    buckets: &HashMap<String, Vec<Uuid>>,
    confidence: f64,
    reason: &str,
    seen: &mut HashSet<(Uuid, Uuid)>,
    out: &mut Vec<CandidatePair>,
) {
    for ids in buckets.values() {
        if ids.len() < 2 {
            continue;
        }
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let pair = CandidatePair::new(ids[i], ids[j], confidence, reason);
                if seen.insert(pair.key()) {
                    out.push(pair);
                }
            }
        }
    }
}
