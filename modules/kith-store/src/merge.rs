use std::collections::BTreeMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use kith_common::{KithError, MergeOutcome, Person};

use crate::{candidates, db_err, people};

/// One relocation step: move a dependent table's rows from the merge
/// person onto the keep person. Bind order is fixed across every step:
/// $1 = keep id, $2 = merge id, $3 = workspace id. Each step is idempotent,
/// so a retried transaction replays cleanly.
struct Relocation {
    table: &'static str,
    /// Drops the merge person's rows that would collide with a row the keep
    /// person already has, so the re-point never trips a unique constraint.
    /// None for tables without a natural key.
    dedupe_sql: Option<&'static str>,
    repoint_sql: &'static str,
}

/// Ordered over every table that references a person. A new link table
/// gets a new entry here; the engine itself does not change.
const RELOCATIONS: &[Relocation] = &[
    Relocation {
        table: "person_companies",
        dedupe_sql: Some(
            r#"
            DELETE FROM person_companies m
            WHERE m.person_id = $2 AND m.workspace_id = $3
              AND EXISTS (
                  SELECT 1 FROM person_companies k
                  WHERE k.person_id = $1 AND k.workspace_id = $3
                    AND k.company_id = m.company_id
              )
            "#,
        ),
        repoint_sql: r#"
            UPDATE person_companies
            SET person_id = $1
            WHERE person_id = $2 AND workspace_id = $3
        "#,
    },
    Relocation {
        table: "person_tags",
        dedupe_sql: Some(
            r#"
            DELETE FROM person_tags m
            WHERE m.person_id = $2 AND m.workspace_id = $3
              AND EXISTS (
                  SELECT 1 FROM person_tags k
                  WHERE k.person_id = $1 AND k.workspace_id = $3
                    AND k.tag_id = m.tag_id
              )
            "#,
        ),
        repoint_sql: r#"
            UPDATE person_tags
            SET person_id = $1
            WHERE person_id = $2 AND workspace_id = $3
        "#,
    },
    Relocation {
        table: "interaction_participants",
        dedupe_sql: Some(
            r#"
            DELETE FROM interaction_participants m
            WHERE m.person_id = $2 AND m.workspace_id = $3
              AND EXISTS (
                  SELECT 1 FROM interaction_participants k
                  WHERE k.person_id = $1 AND k.workspace_id = $3
                    AND k.interaction_id = m.interaction_id
              )
            "#,
        ),
        repoint_sql: r#"
            UPDATE interaction_participants
            SET person_id = $1
            WHERE person_id = $2 AND workspace_id = $3
        "#,
    },
    Relocation {
        table: "social_profiles",
        dedupe_sql: Some(
            r#"
            DELETE FROM social_profiles m
            WHERE m.person_id = $2 AND m.workspace_id = $3
              AND EXISTS (
                  SELECT 1 FROM social_profiles k
                  WHERE k.person_id = $1 AND k.workspace_id = $3
                    AND k.platform = m.platform
              )
            "#,
        ),
        repoint_sql: r#"
            UPDATE social_profiles
            SET person_id = $1
            WHERE person_id = $2 AND workspace_id = $3
        "#,
    },
    // Notes have no natural key; every note moves.
    Relocation {
        table: "notes",
        dedupe_sql: None,
        repoint_sql: r#"
            UPDATE notes
            SET person_id = $1
            WHERE person_id = $2 AND workspace_id = $3
        "#,
    },
];

/// Fold the merge person into the keep person: re-point every dependent
/// row, union the field data, delete the merge person, retire the
/// referenced candidate. One transaction end to end; a failure anywhere
/// leaves no partial effect.
pub async fn merge_people(
    pool: &PgPool,
    workspace_id: Uuid,
    keep_id: Uuid,
    merge_id: Uuid,
    candidate_id: Option<Uuid>,
) -> Result<MergeOutcome, KithError> {
    if keep_id == merge_id {
        return Err(KithError::invalid("cannot merge a person with themselves"));
    }

    let mut tx = pool.begin().await.map_err(db_err)?;

    // Cross-workspace ids fail here identically to nonexistent ones.
    let keep = people::find_in_tx(&mut tx, workspace_id, keep_id)
        .await?
        .ok_or_else(|| KithError::not_found("person not found"))?;
    let merge = people::find_in_tx(&mut tx, workspace_id, merge_id)
        .await?
        .ok_or_else(|| KithError::not_found("person not found"))?;

    let mut moved: BTreeMap<String, u64> = BTreeMap::new();
    for step in RELOCATIONS {
        if let Some(sql) = step.dedupe_sql {
            sqlx::query(sql)
                .bind(keep_id)
                .bind(merge_id)
                .bind(workspace_id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        let result = sqlx::query(step.repoint_sql)
            .bind(keep_id)
            .bind(merge_id)
            .bind(workspace_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        moved.insert(step.table.to_string(), result.rows_affected());
    }

    let unioned = merged_fields(&keep, &merge);

    // Delete the merge row before writing the unioned fields onto the keep
    // row. Under a concurrent merge of the same person, the loser's delete
    // hits 0 rows and the whole transaction rolls back.
    let deleted = sqlx::query("DELETE FROM people WHERE id = $1 AND workspace_id = $2")
        .bind(merge_id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    if deleted.rows_affected() == 0 {
        return Err(KithError::not_found("person not found"));
    }

    sqlx::query(
        r#"
        UPDATE people
        SET email = $3, phone = $4, first_name = $5, last_name = $6,
            bio = $7, location = $8, relationship_type = $9,
            relationship_strength = $10, last_contacted_at = $11,
            next_followup_at = $12, custom_data = $13, sources = $14,
            source_ids = $15, updated_at = now()
        WHERE id = $1 AND workspace_id = $2
        "#,
    )
    .bind(keep_id)
    .bind(workspace_id)
    .bind(&unioned.email)
    .bind(&unioned.phone)
    .bind(&unioned.first_name)
    .bind(&unioned.last_name)
    .bind(&unioned.bio)
    .bind(&unioned.location)
    .bind(&unioned.relationship_type)
    .bind(unioned.relationship_strength)
    .bind(unioned.last_contacted_at)
    .bind(unioned.next_followup_at)
    .bind(serde_json::Value::Object(unioned.custom_data))
    .bind(&unioned.sources)
    .bind(serde_json::Value::Object(unioned.source_ids))
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    if let Some(cid) = candidate_id {
        candidates::mark_merged(&mut tx, cid, workspace_id).await?;
    }

    tx.commit().await.map_err(db_err)?;

    info!(
        workspace_id = %workspace_id,
        keep_id = %keep_id,
        merge_id = %merge_id,
        "Merged person records"
    );

    Ok(MergeOutcome { keep_id, moved })
}

/// Union the merge person's fields into the keep person's, never
/// overwriting a populated keep-side value. Same first-wins policy for
/// scalars, custom_data keys, and source_ids keys; sources are unioned
/// preserving the keep person's order.
fn merged_fields(keep: &Person, merge: &Person) -> Person {
    let mut out = keep.clone();

    out.email = out.email.take().or_else(|| merge.email.clone());
    out.phone = out.phone.take().or_else(|| merge.phone.clone());
    out.first_name = out.first_name.take().or_else(|| merge.first_name.clone());
    out.last_name = out.last_name.take().or_else(|| merge.last_name.clone());
    out.bio = out.bio.take().or_else(|| merge.bio.clone());
    out.location = out.location.take().or_else(|| merge.location.clone());
    out.relationship_type = out
        .relationship_type
        .take()
        .or_else(|| merge.relationship_type.clone());
    out.relationship_strength = out.relationship_strength.or(merge.relationship_strength);
    out.last_contacted_at = out.last_contacted_at.or(merge.last_contacted_at);
    out.next_followup_at = out.next_followup_at.or(merge.next_followup_at);

    for (key, value) in &merge.custom_data {
        if !out.custom_data.contains_key(key) {
            out.custom_data.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in &merge.source_ids {
        if !out.source_ids.contains_key(key) {
            out.source_ids.insert(key.clone(), value.clone());
        }
    }
    for source in &merge.sources {
        if !out.sources.contains(source) {
            out.sources.push(source.clone());
        }
    }

    out
}
