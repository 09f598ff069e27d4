use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use kith_common::{KithError, Workspace};

use crate::db_err;

/// All workspaces, oldest first. The background scan loop iterates this.
pub async fn list(pool: &PgPool) -> Result<Vec<Workspace>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, created_at
        FROM workspaces
        ORDER BY created_at
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| Workspace {
            id: r.get("id"),
            name: r.get("name"),
            created_at: r.get("created_at"),
        })
        .collect())
}

pub async fn create(pool: &PgPool, name: &str) -> Result<Workspace, KithError> {
    let workspace = Workspace {
        id: Uuid::new_v4(),
        name: name.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query("INSERT INTO workspaces (id, name, created_at) VALUES ($1, $2, $3)")
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(workspace.created_at)
        .execute(pool)
        .await
        .map_err(db_err)?;

    Ok(workspace)
}
