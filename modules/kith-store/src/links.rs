//! Read side of the person profile: every table that hangs off a person.
//! Workspace-scoped like everything else; these back the profile view and
//! let callers verify what a merge actually moved.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use kith_common::{CompanyLink, InteractionLink, KithError, Note, SocialProfile, TagLink};

use crate::db_err;

pub async fn company_links(
    pool: &PgPool,
    workspace_id: Uuid,
    person_id: Uuid,
) -> Result<Vec<CompanyLink>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, workspace_id, person_id, company_id, role, is_current
        FROM person_companies
        WHERE workspace_id = $1 AND person_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(person_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| CompanyLink {
            id: r.get("id"),
            workspace_id: r.get("workspace_id"),
            person_id: r.get("person_id"),
            company_id: r.get("company_id"),
            role: r.get("role"),
            is_current: r.get("is_current"),
        })
        .collect())
}

pub async fn tag_links(
    pool: &PgPool,
    workspace_id: Uuid,
    person_id: Uuid,
) -> Result<Vec<TagLink>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, workspace_id, person_id, tag_id
        FROM person_tags
        WHERE workspace_id = $1 AND person_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(person_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| TagLink {
            id: r.get("id"),
            workspace_id: r.get("workspace_id"),
            person_id: r.get("person_id"),
            tag_id: r.get("tag_id"),
        })
        .collect())
}

pub async fn interaction_links(
    pool: &PgPool,
    workspace_id: Uuid,
    person_id: Uuid,
) -> Result<Vec<InteractionLink>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, workspace_id, interaction_id, person_id, role
        FROM interaction_participants
        WHERE workspace_id = $1 AND person_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(person_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| InteractionLink {
            id: r.get("id"),
            workspace_id: r.get("workspace_id"),
            interaction_id: r.get("interaction_id"),
            person_id: r.get("person_id"),
            role: r.get("role"),
        })
        .collect())
}

pub async fn notes(
    pool: &PgPool,
    workspace_id: Uuid,
    person_id: Uuid,
) -> Result<Vec<Note>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, workspace_id, person_id, body, created_at
        FROM notes
        WHERE workspace_id = $1 AND person_id = $2
        ORDER BY created_at
        "#,
    )
    .bind(workspace_id)
    .bind(person_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| Note {
            id: r.get("id"),
            workspace_id: r.get("workspace_id"),
            person_id: r.get("person_id"),
            body: r.get("body"),
            created_at: r.get("created_at"),
        })
        .collect())
}

pub async fn social_profiles(
    pool: &PgPool,
    workspace_id: Uuid,
    person_id: Uuid,
) -> Result<Vec<SocialProfile>, KithError> {
    let rows = sqlx::query(
        r#"
        SELECT id, workspace_id, person_id, platform, url
        FROM social_profiles
        WHERE workspace_id = $1 AND person_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(person_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|r| SocialProfile {
            id: r.get("id"),
            workspace_id: r.get("workspace_id"),
            person_id: r.get("person_id"),
            platform: r.get("platform"),
            url: r.get("url"),
        })
        .collect())
}
