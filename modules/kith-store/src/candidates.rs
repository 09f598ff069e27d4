use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use kith_common::{CandidatePair, KithError, PendingCandidate};

use crate::db_err;

/// Review-queue page size.
const PAGE_SIZE: i64 = 50;

/// Pending candidates for a workspace, highest confidence first, joined
/// with both endpoints' display fields. The inner joins drop candidates
/// whose endpoints no longer exist (e.g. a person absorbed by a merge).
pub async fn list_pending(
    pool: &PgPool,
    workspace_id: Uuid,
) -> Result<Vec<PendingCandidate>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.person_a, c.person_b, c.confidence, c.reason, c.created_at,
               pa.display_name AS person_a_name, pa.email AS person_a_email,
               pb.display_name AS person_b_name, pb.email AS person_b_email
        FROM duplicate_candidates c
        JOIN people pa ON pa.id = c.person_a AND pa.workspace_id = c.workspace_id
        JOIN people pb ON pb.id = c.person_b AND pb.workspace_id = c.workspace_id
        WHERE c.workspace_id = $1 AND c.status = 'pending'
        ORDER BY c.confidence DESC
        LIMIT $2
        "#,
    )
    .bind(workspace_id)
    .bind(PAGE_SIZE)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| PendingCandidate {
            id: r.get("id"),
            person_a: r.get("person_a"),
            person_a_name: r.get("person_a_name"),
            person_a_email: r.get("person_a_email"),
            person_b: r.get("person_b"),
            person_b_name: r.get("person_b_name"),
            person_b_email: r.get("person_b_email"),
            confidence: r.get("confidence"),
            reason: r.get("reason"),
            created_at: r.get("created_at"),
        })
        .collect())
}

/// Flip a pending candidate to dismissed. A candidate id from another
/// workspace behaves exactly like a nonexistent one.
pub async fn dismiss(pool: &PgPool, candidate_id: Uuid, workspace_id: Uuid) -> Result<(), KithError> {
    let result = sqlx::query(
        r#"
        UPDATE duplicate_candidates
        SET status = 'dismissed'
        WHERE id = $1 AND workspace_id = $2 AND status = 'pending'
        "#,
    )
    .bind(candidate_id)
    .bind(workspace_id)
    .execute(pool)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(KithError::not_found("candidate not found"));
    }
    Ok(())
}

/// Replace the workspace's pending candidate set with a fresh batch.
/// Delete and insert share one transaction, so no reader ever observes the
/// window between the old set and the new one. Dismissed and merged rows
/// are untouched.
pub async fn replace_pending_batch(
    pool: &PgPool,
    workspace_id: Uuid,
    batch: &[CandidatePair],
) -> Result<(), KithError> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    sqlx::query(
        r#"
        DELETE FROM duplicate_candidates
        WHERE workspace_id = $1 AND status = 'pending'
        "#,
    )
    .bind(workspace_id)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    for pair in batch {
        sqlx::query(
            r#"
            INSERT INTO duplicate_candidates
                (id, workspace_id, person_a, person_b, confidence, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(workspace_id)
        .bind(pair.person_a)
        .bind(pair.person_b)
        .bind(pair.confidence)
        .bind(&pair.reason)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    tx.commit().await.map_err(db_err)?;
    Ok(())
}

/// Mark a candidate merged inside the merge engine's transaction.
pub(crate) async fn mark_merged(
    conn: &mut PgConnection,
    candidate_id: Uuid,
    workspace_id: Uuid,
) -> Result<(), KithError> {
    let result = sqlx::query(
        r#"
        UPDATE duplicate_candidates
        SET status = 'merged'
        WHERE id = $1 AND workspace_id = $2
        "#,
    )
    .bind(candidate_id)
    .bind(workspace_id)
    .execute(conn)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(KithError::not_found("candidate not found"));
    }
    Ok(())
}
