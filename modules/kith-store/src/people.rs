use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use kith_common::{KithError, Person};

use crate::db_err;

/// Fetch every person in a workspace. The matchers run against this
/// snapshot, so the scan pays for one fetch regardless of matcher count.
pub async fn list_by_workspace(pool: &PgPool, workspace_id: Uuid) -> Result<Vec<Person>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, workspace_id, email, phone, first_name, last_name, display_name,
               bio, location, relationship_type, relationship_strength,
               last_contacted_at, next_followup_at, custom_data, sources, source_ids,
               created_at, updated_at
        FROM people
        WHERE workspace_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(workspace_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows.into_iter().map(row_to_person).collect())
}

pub async fn find_by_id(
    pool: &PgPool,
    workspace_id: Uuid,
    id: Uuid,
) -> Result<Option<Person>, KithError> {
    let row = sqlx::query(
        r#"
        SELECT id, workspace_id, email, phone, first_name, last_name, display_name,
               bio, location, relationship_type, relationship_strength,
               last_contacted_at, next_followup_at, custom_data, sources, source_ids,
               created_at, updated_at
        FROM people
        WHERE workspace_id = $1 AND id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?;

    Ok(row.map(row_to_person))
}

/// Same lookup inside an open transaction; the merge engine validates both
/// endpoints through this before touching any link table.
pub(crate) async fn find_in_tx(
    conn: &mut PgConnection,
    workspace_id: Uuid,
    id: Uuid,
) -> Result<Option<Person>, KithError> {
    let row = sqlx::query(
        r#"
        SELECT id, workspace_id, email, phone, first_name, last_name, display_name,
               bio, location, relationship_type, relationship_strength,
               last_contacted_at, next_followup_at, custom_data, sources, source_ids,
               created_at, updated_at
        FROM people
        WHERE workspace_id = $1 AND id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(db_err)?;

    Ok(row.map(row_to_person))
}

/// Insert a fully-formed person row. Email is expected pre-normalized.
/// Duplicate emails within a workspace are allowed here: import paths
/// produce them, and the duplicate scanner is what flags them.
pub async fn insert(pool: &PgPool, person: &Person) -> Result<(), KithError> {
    sqlx::query(
        r#"
        INSERT INTO people (
            id, workspace_id, email, phone, first_name, last_name, display_name,
            bio, location, relationship_type, relationship_strength,
            last_contacted_at, next_followup_at, custom_data, sources, source_ids,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        "#,
    )
    .bind(person.id)
    .bind(person.workspace_id)
    .bind(&person.email)
    .bind(&person.phone)
    .bind(&person.first_name)
    .bind(&person.last_name)
    .bind(&person.display_name)
    .bind(&person.bio)
    .bind(&person.location)
    .bind(&person.relationship_type)
    .bind(person.relationship_strength)
    .bind(person.last_contacted_at)
    .bind(person.next_followup_at)
    .bind(serde_json::Value::Object(person.custom_data.clone()))
    .bind(&person.sources)
    .bind(serde_json::Value::Object(person.source_ids.clone()))
    .bind(person.created_at)
    .bind(person.updated_at)
    .execute(pool)
    .await
    .map_err(db_err)?;

    Ok(())
}

// --- Internal ---

pub(crate) fn row_to_person(r: PgRow) -> Person {
    Person {
        id: r.get("id"),
        workspace_id: r.get("workspace_id"),
        email: r.get("email"),
        phone: r.get("phone"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        display_name: r.get("display_name"),
        bio: r.get("bio"),
        location: r.get("location"),
        relationship_type: r.get("relationship_type"),
        relationship_strength: r.get("relationship_strength"),
        last_contacted_at: r.get("last_contacted_at"),
        next_followup_at: r.get("next_followup_at"),
        custom_data: json_object(r.get("custom_data")),
        sources: r.get("sources"),
        source_ids: json_object(r.get("source_ids")),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn json_object(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match v {
        serde_json::Value::Object(m) => m,
        _ => serde_json::Map::new(),
    }
}
