//! [`SqliteReportStore`], the SQLite implementation of [`ReportStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use solveai_core::{
  report::{self, Report, ReportId},
  store::ReportStore,
};

use crate::{Error, Result, schema::SCHEMA};

/// Storage key holding the JSON array of saved reports.
pub const REPORTS_KEY: &str = "solveai_saved_reports";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A report store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteReportStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteReportStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Overwrite the stored value verbatim, bypassing encoding.
  #[cfg(test)]
  pub(crate) async fn write_raw(&self, raw: &str) -> Result<()> {
    let raw = raw.to_owned();
    self
      .conn
      .call(move |conn| {
        put_value(conn, &raw)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read-modify-write the whole collection inside one immediate
  /// transaction. Returns whatever `apply` returns.
  async fn modify<T, F>(&self, apply: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut Vec<Report>) -> T + Send + 'static,
  {
    let out = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut reports = read_collection(&tx)?;
        let out = apply(&mut reports);
        let encoded = serde_json::to_string(&reports)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        put_value(&tx, &encoded)?;
        tx.commit()?;
        Ok(out)
      })
      .await?;
    Ok(out)
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Decode the stored collection; corrupt content is discarded with a warning.
fn read_collection(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Report>> {
  let raw: Option<String> = conn
    .query_row(
      "SELECT value FROM kv_store WHERE key = ?1",
      rusqlite::params![REPORTS_KEY],
      |row| row.get(0),
    )
    .optional()?;

  let Some(raw) = raw else {
    return Ok(Vec::new());
  };

  Ok(report::decode_collection(&raw).unwrap_or_else(|| {
    tracing::warn!(
      key = REPORTS_KEY,
      bytes = raw.len(),
      "discarding malformed saved reports"
    );
    Vec::new()
  }))
}

fn put_value(conn: &rusqlite::Connection, value: &str) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                    updated_at = excluded.updated_at",
    rusqlite::params![REPORTS_KEY, value, Utc::now().to_rfc3339()],
  )?;
  Ok(())
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteReportStore {
  type Error = Error;

  async fn load(&self) -> Result<Vec<Report>> {
    let reports = self
      .conn
      .call(|conn| Ok(read_collection(conn)?))
      .await?;
    Ok(reports)
  }

  async fn upsert(&self, report: Report) -> Result<()> {
    let id = report.id.clone();
    let count = self
      .modify(move |reports| {
        report::upsert_report(reports, report);
        reports.len()
      })
      .await?;
    tracing::debug!(%id, count, "report upserted");
    Ok(())
  }

  async fn delete(&self, id: &ReportId) -> Result<()> {
    let target = id.clone();
    let removed = self
      .modify(move |reports| report::remove_report(reports, &target))
      .await?;
    tracing::debug!(%id, removed, "report delete");
    Ok(())
  }
}
