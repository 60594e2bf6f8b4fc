//! SQL fragments and lookups shared by the claim, flag and note slices

use claims_common::db::{ClaimFlag, ClaimNote};
use claims_common::{money, ClaimStatus};
use sqlx::SqliteConnection;

/// Status folded the same way `claims_common::types::normalize_key` folds it
pub const NORMALIZED_STATUS: &str =
    "LOWER(REPLACE(REPLACE(TRIM(status), ' ', '_'), '-', '_'))";

/// Flag columns joined with the author's username, for `FROM claim_flags f`
pub const FLAG_SELECT: &str = "SELECT f.id, f.claim_id, f.user_id, u.username, f.reason, \
     f.created_at, f.resolved, f.resolved_at, f.resolved_by \
     FROM claim_flags f JOIN users u ON u.id = f.user_id";

/// Note columns joined with the author's username, for `FROM claim_notes n`
pub const NOTE_SELECT: &str = "SELECT n.id, n.claim_id, n.user_id, u.username, n.content, \
     n.created_at, n.updated_at \
     FROM claim_notes n JOIN users u ON u.id = n.user_id";

/// `%term%` for a case-insensitive `LIKE ... ESCAPE '\'`
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.trim().to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Optional text filter: blank means "not given"
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Money filter in cents; unparseable input is ignored
pub fn money_filter(raw: Option<&str>) -> Option<i64> {
    let raw = non_blank(raw)?;
    money::parse_amount(raw)
        .and_then(money::to_cents)
        .map_err(|e| tracing::debug!(value = raw, error = %e, "Ignoring money filter"))
        .ok()
}

/// Display label for a normalised status key
pub fn status_label(key: &str) -> String {
    ClaimStatus::parse(key).map(|status| status.label()).unwrap_or_default()
}

pub async fn claim_exists(conn: &mut SqliteConnection, claim_id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM claims WHERE claim_id = ?1")
        .bind(claim_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

pub async fn unresolved_flag_count(
    conn: &mut SqliteConnection,
    claim_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM claim_flags WHERE claim_id = ?1 AND resolved = 0")
        .bind(claim_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn note_count(conn: &mut SqliteConnection, claim_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM claim_notes WHERE claim_id = ?1")
        .bind(claim_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn find_flag(conn: &mut SqliteConnection, flag_id: i64) -> Result<ClaimFlag, sqlx::Error> {
    sqlx::query_as(&format!("{} WHERE f.id = ?1", FLAG_SELECT))
        .bind(flag_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn find_note(conn: &mut SqliteConnection, note_id: i64) -> Result<ClaimNote, sqlx::Error> {
    sqlx::query_as(&format!("{} WHERE n.id = ?1", NOTE_SELECT))
        .bind(note_id)
        .fetch_one(&mut *conn)
        .await
}
