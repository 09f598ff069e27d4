pub mod candidates;
pub mod links;
pub mod merge;
pub mod migrate;
pub mod people;
pub mod workspaces;

use kith_common::KithError;

/// Map a driver error into the store-facing error taxonomy. Expected
/// uniqueness conflicts are resolved inside the merge engine before they
/// can fire; one that reaches here is genuinely unexpected and surfaces
/// as Conflict rather than a generic database failure.
pub(crate) fn db_err(e: sqlx::Error) -> KithError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            return KithError::Conflict(db.message().to_string());
        }
    }
    KithError::Database(e.to_string())
}
