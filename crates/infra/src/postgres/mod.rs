//! Postgres-backed repositories.
//!
//! Queries are built at runtime (no compile-time checking) against the layout
//! in `sql/schema.sql`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | Any other | `Backend` |
//! | Anything else | N/A | `Backend` |

mod groups;
mod reports;
mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use reportdesk_core::StoreError;

pub use groups::PostgresAccessGroupRepository;
pub use reports::PostgresReportRepository;
pub use users::PostgresUserRepository;

/// Open a connection pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(msg),
                _ => StoreError::Backend(msg),
            }
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

/// Escape `%`, `_` and `\` so a search token matches literally inside `ILIKE`.
fn like_pattern(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    escaped.push('%');
    for c in token.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
