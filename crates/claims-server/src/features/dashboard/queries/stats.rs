//! Dashboard statistics query
//!
//! Every money figure is summed in integer cents by SQLite and converted to
//! `Decimal` afterwards; averages and percentages are rounded half-to-even
//! to two places. Date windows are relative to `as_of` (default: today, UTC).

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use claims_common::db::{Claim, CLAIM_COLUMNS};
use claims_common::money;
use mediator::Request;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::features::shared::sql::{status_label, NORMALIZED_STATUS};

/// Insurers and flagged claims listed
pub const TOP_LIST_LIMIT: i64 = 10;

/// Active users listed
pub const ACTIVE_USERS_LIMIT: i64 = 5;

/// Underpayment above which a claim counts as high-value: 10,000.00 in cents
pub const HIGH_VALUE_UNDERPAYMENT_CENTS: i64 = 1_000_000;

/// Days covered by the monthly trend
pub const MONTHLY_WINDOW_DAYS: i64 = 365;

/// Weeks covered by the weekly counts, current week included
pub const WEEKLY_WINDOW_WEEKS: i64 = 8;

/// Days covered by the recent activity counts
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Reference date for the rolling windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub as_of: NaiveDate,
    pub totals: Totals,
    pub financials: Financials,
    pub status_breakdown: Vec<StatusBucket>,
    pub top_insurers: Vec<InsurerStats>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub weekly_claims: Vec<WeeklyCount>,
    pub recent_activity: RecentActivity,
    pub flag_totals: FlagTotals,
    pub active_users: Vec<ActiveUser>,
    pub high_value_underpaid: Vec<ClaimAmount>,
    pub most_flagged: Vec<FlaggedClaim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Totals {
    pub claims: i64,
    pub unresolved_flags: i64,
    pub notes: i64,
    pub users: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Financials {
    pub total_billed: Decimal,
    pub total_paid: Decimal,
    pub avg_billed: Decimal,
    pub avg_paid: Decimal,
    pub total_underpayment: Decimal,
    pub avg_underpayment: Decimal,
    /// Underpayment as a share of billed, in percent
    pub underpayment_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBucket {
    pub status: String,
    pub label: String,
    pub count: i64,
    pub total_billed: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsurerStats {
    pub insurer_name: String,
    pub claim_count: i64,
    pub total_billed: Decimal,
    pub total_paid: Decimal,
    pub total_underpayment: Decimal,
    /// Underpayment as a share of billed, in percent
    pub underpayment_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub claim_count: i64,
    pub total_billed: Decimal,
    pub total_paid: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyCount {
    /// Monday starting the week
    pub week_start: NaiveDate,
    pub claim_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct RecentActivity {
    pub flags_last_30_days: i64,
    pub notes_last_30_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct FlagTotals {
    pub total: i64,
    pub resolved: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveUser {
    pub user_id: i64,
    pub username: String,
    pub note_count: i64,
    pub flag_count: i64,
    pub total_activity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimAmount {
    #[serde(flatten)]
    pub claim: Claim,
    pub underpayment: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FlaggedClaim {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub claim: Claim,
    pub unresolved_flags: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DashboardResponse, DashboardError>> for DashboardQuery {}

impl crate::cqrs::middleware::Query for DashboardQuery {}

/// Round to cents, half-to-even, always two places
fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

fn average(total_cents: i64, count: i64) -> Decimal {
    if count == 0 {
        return round2(Decimal::ZERO);
    }
    round2(money::from_cents(total_cents) / Decimal::from(count))
}

fn percentage(part_cents: i64, whole_cents: i64) -> Decimal {
    if whole_cents == 0 {
        return round2(Decimal::ZERO);
    }
    round2(Decimal::from(part_cents) * Decimal::ONE_HUNDRED / Decimal::from(whole_cents))
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    query: DashboardQuery,
) -> Result<DashboardResponse, DashboardError> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let (totals, financials, status_breakdown, top_insurers) = futures::try_join!(
        totals(&pool),
        financials(&pool),
        status_breakdown(&pool),
        top_insurers(&pool),
    )?;

    let (monthly_trends, weekly_claims, recent_activity, flag_totals) = futures::try_join!(
        monthly_trends(&pool, as_of),
        weekly_claims(&pool, as_of),
        recent_activity(&pool, as_of),
        flag_totals(&pool),
    )?;

    let (active_users, high_value_underpaid, most_flagged) = futures::try_join!(
        active_users(&pool),
        high_value_underpaid(&pool),
        most_flagged(&pool),
    )?;

    tracing::debug!(claims = totals.claims, "Dashboard computed");

    Ok(DashboardResponse {
        as_of,
        totals,
        financials,
        status_breakdown,
        top_insurers,
        monthly_trends,
        weekly_claims,
        recent_activity,
        flag_totals,
        active_users,
        high_value_underpaid,
        most_flagged,
    })
}

async fn totals(pool: &SqlitePool) -> Result<Totals, sqlx::Error> {
    sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM claims) AS claims,
                (SELECT COUNT(*) FROM claim_flags WHERE resolved = 0) AS unresolved_flags,
                (SELECT COUNT(*) FROM claim_notes) AS notes,
                (SELECT COUNT(*) FROM users) AS users",
    )
    .fetch_one(pool)
    .await
}

async fn financials(pool: &SqlitePool) -> Result<Financials, sqlx::Error> {
    let (count, billed, paid): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(SUM(billed_amount_cents), 0),
                COALESCE(SUM(paid_amount_cents), 0)
         FROM claims",
    )
    .fetch_one(pool)
    .await?;

    let underpaid = billed - paid;
    Ok(Financials {
        total_billed: money::from_cents(billed),
        total_paid: money::from_cents(paid),
        avg_billed: average(billed, count),
        avg_paid: average(paid, count),
        total_underpayment: money::from_cents(underpaid),
        avg_underpayment: average(underpaid, count),
        underpayment_percentage: percentage(underpaid, billed),
    })
}

async fn status_breakdown(pool: &SqlitePool) -> Result<Vec<StatusBucket>, sqlx::Error> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(&format!(
        "SELECT {} AS status_key, COUNT(*) AS claim_count,
                COALESCE(SUM(billed_amount_cents), 0)
         FROM claims
         GROUP BY status_key
         ORDER BY claim_count DESC, status_key",
        NORMALIZED_STATUS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(status, count, billed)| StatusBucket {
            label: status_label(&status),
            status,
            count,
            total_billed: money::from_cents(billed),
        })
        .collect())
}

async fn top_insurers(pool: &SqlitePool) -> Result<Vec<InsurerStats>, sqlx::Error> {
    let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
        "SELECT insurer_name, COUNT(*) AS claim_count,
                COALESCE(SUM(billed_amount_cents), 0),
                COALESCE(SUM(paid_amount_cents), 0)
         FROM claims
         WHERE TRIM(insurer_name) <> ''
         GROUP BY insurer_name
         ORDER BY claim_count DESC, insurer_name
         LIMIT ?1",
    )
    .bind(TOP_LIST_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(insurer_name, claim_count, billed, paid)| InsurerStats {
            insurer_name,
            claim_count,
            total_billed: money::from_cents(billed),
            total_paid: money::from_cents(paid),
            total_underpayment: money::from_cents(billed - paid),
            underpayment_rate: percentage(billed - paid, billed),
        })
        .collect())
}

async fn monthly_trends(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> Result<Vec<MonthlyTrend>, sqlx::Error> {
    let since = as_of - Duration::days(MONTHLY_WINDOW_DAYS);
    let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
        "SELECT strftime('%Y-%m', discharge_date) AS month, COUNT(*),
                COALESCE(SUM(billed_amount_cents), 0),
                COALESCE(SUM(paid_amount_cents), 0)
         FROM claims
         WHERE discharge_date >= ?1 AND discharge_date <= ?2
         GROUP BY month
         ORDER BY month",
    )
    .bind(since)
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(month, claim_count, billed, paid)| MonthlyTrend {
            month,
            claim_count,
            total_billed: money::from_cents(billed),
            total_paid: money::from_cents(paid),
        })
        .collect())
}

async fn weekly_claims(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> Result<Vec<WeeklyCount>, sqlx::Error> {
    let current = week_start(as_of);
    let first = current - Duration::weeks(WEEKLY_WINDOW_WEEKS - 1);

    let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
        "SELECT discharge_date, COUNT(*)
         FROM claims
         WHERE discharge_date >= ?1 AND discharge_date <= ?2
         GROUP BY discharge_date",
    )
    .bind(first)
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    let mut weeks: Vec<WeeklyCount> = (0..WEEKLY_WINDOW_WEEKS)
        .map(|i| WeeklyCount {
            week_start: first + Duration::weeks(i),
            claim_count: 0,
        })
        .collect();

    for (date, count) in rows {
        let index = (week_start(date) - first).num_weeks();
        if let Some(week) = usize::try_from(index).ok().and_then(|i| weeks.get_mut(i)) {
            week.claim_count += count;
        }
    }

    Ok(weeks)
}

async fn recent_activity(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> Result<RecentActivity, sqlx::Error> {
    let since = (as_of - Duration::days(ACTIVITY_WINDOW_DAYS))
        .and_time(NaiveTime::MIN)
        .and_utc();

    sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM claim_flags WHERE created_at >= ?1) AS flags_last_30_days,
                (SELECT COUNT(*) FROM claim_notes WHERE created_at >= ?1) AS notes_last_30_days",
    )
    .bind(since)
    .fetch_one(pool)
    .await
}

async fn flag_totals(pool: &SqlitePool) -> Result<FlagTotals, sqlx::Error> {
    sqlx::query_as(
        "SELECT COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN resolved THEN 1 ELSE 0 END), 0) AS resolved,
                COALESCE(SUM(CASE WHEN resolved THEN 0 ELSE 1 END), 0) AS pending
         FROM claim_flags",
    )
    .fetch_one(pool)
    .await
}

async fn active_users(pool: &SqlitePool) -> Result<Vec<ActiveUser>, sqlx::Error> {
    let rows: Vec<(i64, String, i64, i64)> = sqlx::query_as(
        "SELECT user_id, username, note_count, flag_count FROM (
             SELECT u.id AS user_id, u.username AS username,
                    (SELECT COUNT(*) FROM claim_notes n WHERE n.user_id = u.id) AS note_count,
                    (SELECT COUNT(*) FROM claim_flags f WHERE f.user_id = u.id) AS flag_count
             FROM users u
         )
         WHERE note_count + flag_count > 0
         ORDER BY note_count + flag_count DESC, username
         LIMIT ?1",
    )
    .bind(ACTIVE_USERS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(user_id, username, note_count, flag_count)| ActiveUser {
            user_id,
            username,
            note_count,
            flag_count,
            total_activity: note_count + flag_count,
        })
        .collect())
}

async fn high_value_underpaid(pool: &SqlitePool) -> Result<Vec<ClaimAmount>, sqlx::Error> {
    let claims: Vec<Claim> = sqlx::query_as(&format!(
        "SELECT {} FROM claims
         WHERE billed_amount_cents - paid_amount_cents > ?1
         ORDER BY billed_amount_cents - paid_amount_cents DESC, claim_id
         LIMIT ?2",
        CLAIM_COLUMNS
    ))
    .bind(HIGH_VALUE_UNDERPAYMENT_CENTS)
    .bind(TOP_LIST_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(claims
        .into_iter()
        .map(|claim| ClaimAmount {
            underpayment: claim.underpayment(),
            claim,
        })
        .collect())
}

async fn most_flagged(pool: &SqlitePool) -> Result<Vec<FlaggedClaim>, sqlx::Error> {
    sqlx::query_as(
        "SELECT c.claim_id, c.patient_name, c.billed_amount_cents, c.paid_amount_cents,
                c.status, c.insurer_name, c.discharge_date,
                COUNT(f.id) AS unresolved_flags
         FROM claims c
         JOIN claim_flags f ON f.claim_id = c.claim_id AND f.resolved = 0
         GROUP BY c.claim_id
         ORDER BY unresolved_flags DESC, c.claim_id
         LIMIT ?1",
    )
    .bind(TOP_LIST_LIMIT)
    .fetch_all(pool)
    .await
}
