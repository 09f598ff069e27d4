use sqlx::PgPool;
use tracing::info;

use kith_common::KithError;

use crate::db_err;

/// Ordered, idempotent schema statements. Every table carries a
/// workspace_id; every query in this crate filters by it.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS workspaces (
        id         UUID        PRIMARY KEY,
        name       TEXT        NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS people (
        id                    UUID        PRIMARY KEY,
        workspace_id          UUID        NOT NULL REFERENCES workspaces(id),
        email                 TEXT,
        phone                 TEXT,
        first_name            TEXT,
        last_name             TEXT,
        display_name          TEXT        NOT NULL,
        bio                   TEXT,
        location              TEXT,
        relationship_type     TEXT,
        relationship_strength INT,
        last_contacted_at     TIMESTAMPTZ,
        next_followup_at      TIMESTAMPTZ,
        custom_data           JSONB       NOT NULL DEFAULT '{}'::jsonb,
        sources               TEXT[]      NOT NULL DEFAULT '{}',
        source_ids            JSONB       NOT NULL DEFAULT '{}'::jsonb,
        created_at            TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at            TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    // Deliberately not unique: CSV imports and connector syncs do land the
    // same email twice, and the duplicate scanner exists to surface exactly
    // that. Manual-entry uniqueness is enforced upstream.
    r#"
    CREATE INDEX IF NOT EXISTS people_workspace_email_idx
        ON people (workspace_id, email) WHERE email IS NOT NULL
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS people_workspace_idx ON people (workspace_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id           UUID PRIMARY KEY,
        workspace_id UUID NOT NULL REFERENCES workspaces(id),
        name         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS person_companies (
        id           UUID    PRIMARY KEY,
        workspace_id UUID    NOT NULL,
        person_id    UUID    NOT NULL REFERENCES people(id),
        company_id   UUID    NOT NULL REFERENCES companies(id),
        role         TEXT,
        is_current   BOOLEAN NOT NULL DEFAULT true,
        UNIQUE (person_id, company_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id           UUID PRIMARY KEY,
        workspace_id UUID NOT NULL,
        name         TEXT NOT NULL,
        UNIQUE (workspace_id, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS person_tags (
        id           UUID PRIMARY KEY,
        workspace_id UUID NOT NULL,
        person_id    UUID NOT NULL REFERENCES people(id),
        tag_id       UUID NOT NULL REFERENCES tags(id),
        UNIQUE (person_id, tag_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interactions (
        id           UUID        PRIMARY KEY,
        workspace_id UUID        NOT NULL,
        kind         TEXT        NOT NULL,
        occurred_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        summary      TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interaction_participants (
        id             UUID PRIMARY KEY,
        workspace_id   UUID NOT NULL,
        interaction_id UUID NOT NULL REFERENCES interactions(id),
        person_id      UUID NOT NULL REFERENCES people(id),
        role           TEXT,
        UNIQUE (interaction_id, person_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id           UUID        PRIMARY KEY,
        workspace_id UUID        NOT NULL,
        person_id    UUID        NOT NULL REFERENCES people(id),
        body         TEXT        NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS social_profiles (
        id           UUID PRIMARY KEY,
        workspace_id UUID NOT NULL,
        person_id    UUID NOT NULL REFERENCES people(id),
        platform     TEXT NOT NULL,
        url          TEXT NOT NULL,
        UNIQUE (person_id, platform)
    )
    "#,
    // No foreign keys on person_a/person_b: a merged-away person may leave
    // candidate rows behind, and list_pending's inner join hides them.
    r#"
    CREATE TABLE IF NOT EXISTS duplicate_candidates (
        id           UUID             PRIMARY KEY,
        workspace_id UUID             NOT NULL,
        person_a     UUID             NOT NULL,
        person_b     UUID             NOT NULL,
        confidence   DOUBLE PRECISION NOT NULL,
        reason       TEXT             NOT NULL,
        status       TEXT             NOT NULL DEFAULT 'pending',
        created_at   TIMESTAMPTZ      NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS duplicate_candidates_workspace_status_idx
        ON duplicate_candidates (workspace_id, status)
    "#,
];

/// Run idempotent schema migrations. Called at API startup and by the
/// integration tests before seeding.
pub async fn run(pool: &PgPool) -> Result<(), KithError> {
    info!("Running schema migrations...");

    for stmt in STATEMENTS {
        sqlx::query(stmt).execute(pool).await.map_err(db_err)?;
    }

    info!(statements = STATEMENTS.len(), "Schema migrations complete");
    Ok(())
}
