//! End-to-end duplicate scan tests against Postgres.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use kith_common::Person;
use kith_dedup::{scan_workspace, DedupConfig};
use kith_store::{candidates, migrate, people, workspaces};

// --- Test setup ---

async fn setup() -> Option<(PgPool, Uuid)> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    migrate::run(&pool).await.ok()?;
    let workspace = workspaces::create(&pool, "scan-test").await.ok()?;
    Some((pool, workspace.id))
}

fn test_person(workspace_id: Uuid, display_name: &str) -> Person {
    Person {
        id: Uuid::new_v4(),
        workspace_id,
        email: None,
        phone: None,
        first_name: None,
        last_name: None,
        display_name: display_name.to_string(),
        bio: None,
        location: None,
        relationship_type: None,
        relationship_strength: None,
        last_contacted_at: None,
        next_followup_at: None,
        custom_data: serde_json::Map::new(),
        sources: Vec::new(),
        source_ids: serde_json::Map::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =========================================================================
// Behavior tests
// =========================================================================

#[tokio::test]
async fn exact_email_duplicates_surface_dismiss_and_resurface() {
    let Some((pool, ws)) = setup().await else { return };
    let mut a = test_person(ws, "Alice");
    a.email = Some("alice@x.com".into());
    let mut b = test_person(ws, "Alice Smith");
    b.email = Some("alice@x.com".into());
    b.phone = Some("555-1000".into());
    people::insert(&pool, &a).await.unwrap();
    people::insert(&pool, &b).await.unwrap();

    let stats = scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.exact, 1);

    let pending = candidates::list_pending(&pool, ws).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].confidence >= 0.95);
    assert!(pending[0].reason.contains("email"), "reason: {}", pending[0].reason);

    // Dismissal hides the pair for this generation only.
    candidates::dismiss(&pool, pending[0].id, ws).await.unwrap();
    assert!(candidates::list_pending(&pool, ws).await.unwrap().is_empty());

    // The underlying duplicate still exists, so a re-scan surfaces it again.
    scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();
    let resurfaced = candidates::list_pending(&pool, ws).await.unwrap();
    assert_eq!(resurfaced.len(), 1);
}

#[tokio::test]
async fn similar_names_without_emails_surface_as_fuzzy_candidates() {
    let Some((pool, ws)) = setup().await else { return };
    let mut c = test_person(ws, "Jon Smith");
    c.location = Some("Austin".into());
    let mut d = test_person(ws, "John Smith");
    d.location = Some("Austin".into());
    people::insert(&pool, &c).await.unwrap();
    people::insert(&pool, &d).await.unwrap();

    let stats = scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.fuzzy, 1);

    let pending = candidates::list_pending(&pool, ws).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].confidence >= 0.75 && pending[0].confidence <= 1.0);
    assert!(
        pending[0].reason.contains("name similarity"),
        "reason: {}",
        pending[0].reason
    );
}

#[tokio::test]
async fn scan_is_idempotent_over_unchanged_data() {
    let Some((pool, ws)) = setup().await else { return };
    let mut a = test_person(ws, "Alice");
    a.email = Some("alice@x.com".into());
    let mut b = test_person(ws, "Alicia");
    b.email = Some("alice@x.com".into());
    let c = test_person(ws, "Jane Doe");
    let d = test_person(ws, "Jane Doe");
    for p in [&a, &b, &c, &d] {
        people::insert(&pool, p).await.unwrap();
    }

    let first_stats = scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();
    let first: Vec<_> = candidates::list_pending(&pool, ws)
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.person_a, p.person_b, p.confidence.to_bits(), p.reason))
        .collect();

    let second_stats = scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();
    let second: Vec<_> = candidates::list_pending(&pool, ws)
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.person_a, p.person_b, p.confidence.to_bits(), p.reason))
        .collect();

    assert_eq!(first, second);
    assert_eq!(first_stats.total, second_stats.total);
    // Replaced, not appended: no accumulation across runs.
    assert_eq!(first.len(), first_stats.total as usize);
}

#[tokio::test]
async fn scan_counts_add_up() {
    let Some((pool, ws)) = setup().await else { return };
    // One exact pair with dissimilar names (shared inbox), one fuzzy pair.
    let mut a = test_person(ws, "Alice Jones");
    a.email = Some("info@x.com".into());
    let mut b = test_person(ws, "Bob Park");
    b.email = Some("info@x.com".into());
    let c = test_person(ws, "Jon Smith");
    let d = test_person(ws, "John Smith");
    for p in [&a, &b, &c, &d] {
        people::insert(&pool, p).await.unwrap();
    }

    let stats = scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.exact + stats.fuzzy, stats.total);
    assert_eq!(stats.exact, 1);
    assert_eq!(stats.fuzzy, 1);
}

#[tokio::test]
async fn scan_is_scoped_to_one_workspace() {
    let Some((pool, ws)) = setup().await else { return };
    let other = workspaces::create(&pool, "scan-test-other").await.unwrap();

    for workspace_id in [ws, other.id] {
        let mut a = test_person(workspace_id, "Alice");
        a.email = Some("alice@x.com".into());
        let mut b = test_person(workspace_id, "Alicia");
        b.email = Some("alice@x.com".into());
        people::insert(&pool, &a).await.unwrap();
        people::insert(&pool, &b).await.unwrap();
    }

    scan_workspace(&pool, ws, &DedupConfig::default())
        .await
        .unwrap();

    // Only the scanned workspace has candidates.
    assert_eq!(candidates::list_pending(&pool, ws).await.unwrap().len(), 1);
    assert!(candidates::list_pending(&pool, other.id)
        .await
        .unwrap()
        .is_empty());

    // The other workspace's scan finds its own pair and nothing else.
    let stats = scan_workspace(&pool, other.id, &DedupConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(
        candidates::list_pending(&pool, other.id).await.unwrap().len(),
        1
    );
}
