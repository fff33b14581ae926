use crate::control::{
    AssessmentPriority, Control, MeetsCriteria, NistFunction, RemediationStatus,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS controls (
            id TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            nist_function TEXT NOT NULL,
            nist_category_id TEXT NOT NULL,
            nist_sub_category_id TEXT NOT NULL,
            assessment_priority TEXT NOT NULL,
            control_description TEXT NOT NULL,
            identified_risks TEXT NOT NULL,
            risk_details TEXT NOT NULL,
            cybersecurity_domain TEXT NOT NULL,
            meets_criteria TEXT NOT NULL,
            remediation_status TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_controls_owner ON controls(owner)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_controls_function ON controls(nist_function)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_controls_status ON controls(remediation_status)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const SELECT_COLUMNS: &str = "id, owner, nist_function, nist_category_id,
        nist_sub_category_id, assessment_priority, control_description,
        identified_risks, risk_details, cybersecurity_domain,
        meets_criteria, remediation_status, last_updated, created_at, updated_at";

fn parse_column<T>(
    idx: usize,
    value: &str,
    parser: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parser(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid stored value {:?}", value).into(),
        )
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn control_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Control> {
    let function_str: String = row.get(2)?;
    let priority_str: String = row.get(5)?;
    let criteria_str: String = row.get(10)?;
    let status_str: String = row.get(11)?;
    let last_updated_str: String = row.get(12)?;
    let created_at_str: Option<String> = row.get(13)?;
    let updated_at_str: Option<String> = row.get(14)?;

    Ok(Control {
        id: row.get(0)?,
        owner: row.get(1)?,
        nist_function: parse_column(2, &function_str, NistFunction::parse)?,
        nist_category_id: row.get(3)?,
        nist_sub_category_id: row.get(4)?,
        assessment_priority: parse_column(5, &priority_str, AssessmentPriority::parse)?,
        control_description: row.get(6)?,
        identified_risks: row.get(7)?,
        risk_details: row.get(8)?,
        cybersecurity_domain: row.get(9)?,
        meets_criteria: parse_column(10, &criteria_str, MeetsCriteria::parse)?,
        remediation_status: parse_column(11, &status_str, RemediationStatus::parse)?,
        last_updated: parse_column(12, &last_updated_str, parse_timestamp)?,
        created_at: created_at_str.as_deref().and_then(parse_timestamp),
        updated_at: updated_at_str.as_deref().and_then(parse_timestamp),
    })
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

/// Bulk insert with upsert-on-conflict keyed by `id`.
///
/// Runs inside a single SQLite transaction: either every record lands or
/// none do. Records arriving without an id are assigned a fresh UUID, so
/// re-importing a previous export updates rows in place instead of
/// duplicating them.
pub fn insert_controls(conn: &mut Connection, controls: &[Control]) -> Result<usize> {
    let now = Utc::now();
    let tx = conn.transaction().context("Failed to begin transaction")?;

    let mut written = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO controls (
                id, owner, nist_function, nist_category_id, nist_sub_category_id,
                assessment_priority, control_description, identified_risks,
                risk_details, cybersecurity_domain, meets_criteria,
                remediation_status, last_updated, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(id) DO UPDATE SET
                owner = excluded.owner,
                nist_function = excluded.nist_function,
                nist_category_id = excluded.nist_category_id,
                nist_sub_category_id = excluded.nist_sub_category_id,
                assessment_priority = excluded.assessment_priority,
                control_description = excluded.control_description,
                identified_risks = excluded.identified_risks,
                risk_details = excluded.risk_details,
                cybersecurity_domain = excluded.cybersecurity_domain,
                meets_criteria = excluded.meets_criteria,
                remediation_status = excluded.remediation_status,
                last_updated = excluded.last_updated,
                updated_at = excluded.updated_at",
        )?;

        for control in controls {
            let mut record = control.clone();
            record.ensure_id();

            let created_at = record.created_at.unwrap_or(now);

            stmt.execute(params![
                record.id,
                record.owner,
                record.nist_function.label(),
                record.nist_category_id,
                record.nist_sub_category_id,
                record.assessment_priority.as_str(),
                record.control_description,
                record.identified_risks,
                record.risk_details,
                record.cybersecurity_domain,
                record.meets_criteria.as_str(),
                record.remediation_status.as_str(),
                record.last_updated.to_rfc3339(),
                created_at.to_rfc3339(),
                now.to_rfc3339(),
            ])
            .with_context(|| format!("Failed to insert control {}", record.id))?;

            written += 1;
        }
    }

    tx.commit().context("Failed to commit bulk insert")?;
    debug!(written, "bulk insert committed");

    Ok(written)
}

/// Full scan in insertion (rowid) order. The filter engine preserves
/// whatever order this returns.
pub fn get_all_controls(conn: &Connection) -> Result<Vec<Control>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM controls ORDER BY rowid"
    ))?;

    let controls = stmt
        .query_map([], control_from_row)?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read controls")?;

    Ok(controls)
}

/// Controls for a single owner, insertion order.
pub fn get_controls_by_owner(conn: &Connection, owner: &str) -> Result<Vec<Control>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM controls WHERE owner = ?1 ORDER BY rowid"
    ))?;

    let controls = stmt
        .query_map([owner], control_from_row)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read controls for owner {owner}"))?;

    Ok(controls)
}

/// Full-record update keyed by `id`. Stamps `updated_at`; `last_updated`
/// is taken from the record (it tracks the assessment, not the row).
/// Returns false when no row has that id.
pub fn update_control(conn: &Connection, control: &Control) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE controls SET
                owner = ?2,
                nist_function = ?3,
                nist_category_id = ?4,
                nist_sub_category_id = ?5,
                assessment_priority = ?6,
                control_description = ?7,
                identified_risks = ?8,
                risk_details = ?9,
                cybersecurity_domain = ?10,
                meets_criteria = ?11,
                remediation_status = ?12,
                last_updated = ?13,
                updated_at = ?14
            WHERE id = ?1",
            params![
                control.id,
                control.owner,
                control.nist_function.label(),
                control.nist_category_id,
                control.nist_sub_category_id,
                control.assessment_priority.as_str(),
                control.control_description,
                control.identified_risks,
                control.risk_details,
                control.cybersecurity_domain,
                control.meets_criteria.as_str(),
                control.remediation_status.as_str(),
                control.last_updated.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .with_context(|| format!("Failed to update control {}", control.id))?;

    Ok(affected > 0)
}

/// Bulk clear. Returns the number of deleted rows.
pub fn delete_all_controls(conn: &Connection) -> Result<usize> {
    let deleted = conn
        .execute("DELETE FROM controls", [])
        .context("Failed to clear controls")?;

    debug!(deleted, "cleared control table");
    Ok(deleted)
}

pub fn count_controls(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM controls", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
