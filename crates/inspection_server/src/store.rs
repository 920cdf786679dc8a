//! SQLite persistence for report bodies.
//!
//! Records are kept as JSON text keyed by id and kind.  Every lookup is scoped by kind, so a
//! record can never be read or replaced through another kind's routes.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use inspections::ReportKind;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Stored body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stored record {id} has unknown kind '{kind}'")]
    UnknownKind { id: Uuid, kind: String },
}

#[derive(FromRow)]
struct ReportRow {
    id: Uuid,
    kind: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A persisted report body with its bookkeeping columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: Uuid,
    pub kind: ReportKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub report: Value,
}

impl TryFrom<ReportRow> for StoredReport {
    type Error = StoreError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let kind = ReportKind::from_str(&row.kind).map_err(|_| StoreError::UnknownKind {
            id: row.id,
            kind: row.kind.clone(),
        })?;
        Ok(Self {
            id: row.id,
            kind,
            created_at: row.created_at,
            updated_at: row.updated_at,
            report: serde_json::from_str(&row.body)?,
        })
    }
}

/// List entry for `GET /api/reports/{kind}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: Uuid,
    pub kind: ReportKind,
    pub client: String,
    pub project_name: String,
    pub inspection_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl StoredReport {
    pub fn summary(&self) -> ReportSummary {
        let text = |pointer: &str| {
            self.report
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        ReportSummary {
            id: self.id,
            kind: self.kind,
            client: text("/project/client"),
            project_name: text("/project/projectName"),
            inspection_date: self
                .report
                .pointer("/project/inspectionDate")
                .and_then(Value::as_str)
                .and_then(|date| date.parse().ok()),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReportStore {
    pool: SqlitePool,
}

impl ReportStore {
    /// Opens (creating if needed) the database at `url` and applies migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        info!("Report store ready at {}", url);
        Ok(store)
    }

    /// Private in-memory database; a single connection keeps every query on the same database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn create(&self, kind: ReportKind, body: &Value) -> Result<StoredReport, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            INSERT INTO reports (id, kind, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, body, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(kind.slug())
        .bind(serde_json::to_string(body)?)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    pub async fn get(&self, kind: ReportKind, id: Uuid) -> Result<Option<StoredReport>, StoreError> {
        sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT id, kind, body, created_at, updated_at
            FROM reports
            WHERE id = $1 AND kind = $2
            "#,
        )
        .bind(id)
        .bind(kind.slug())
        .fetch_optional(&self.pool)
        .await?
        .map(StoredReport::try_from)
        .transpose()
    }

    /// Newest first.
    pub async fn list(&self, kind: ReportKind) -> Result<Vec<StoredReport>, StoreError> {
        sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT id, kind, body, created_at, updated_at
            FROM reports
            WHERE kind = $1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(kind.slug())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(StoredReport::try_from)
        .collect()
    }

    /// Replaces the body and bumps `updated_at`; `None` when no record of this kind has `id`.
    pub async fn update(
        &self,
        kind: ReportKind,
        id: Uuid,
        body: &Value,
    ) -> Result<Option<StoredReport>, StoreError> {
        sqlx::query_as::<_, ReportRow>(
            r#"
            UPDATE reports
            SET body = $3, updated_at = $4
            WHERE id = $1 AND kind = $2
            RETURNING id, kind, body, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(kind.slug())
        .bind(serde_json::to_string(body)?)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .map(StoredReport::try_from)
        .transpose()
    }

    /// Returns whether a record was deleted.
    pub async fn delete(&self, kind: ReportKind, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind.slug())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(client: &str) -> Value {
        json!({
            "project": {"client": client, "projectName": "Tower", "inspectionDate": "2024-05-01"}
        })
    }

    #[tokio::test]
    async fn records_are_scoped_by_kind() {
        let store = ReportStore::in_memory().await.unwrap();
        let stored = store.create(ReportKind::Parapet, &body("Acme")).await.unwrap();

        assert!(store.get(ReportKind::Parapet, stored.id).await.unwrap().is_some());
        assert!(store.get(ReportKind::Facade, stored.id).await.unwrap().is_none());
        assert!(store
            .update(ReportKind::Facade, stored.id, &body("Other"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(ReportKind::Facade, stored.id).await.unwrap());
        assert!(store.delete(ReportKind::Parapet, stored.id).await.unwrap());
        assert!(store.get(ReportKind::Parapet, stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_body_and_bumps_timestamp() {
        let store = ReportStore::in_memory().await.unwrap();
        let stored = store.create(ReportKind::Garage, &body("Acme")).await.unwrap();
        let updated = store
            .update(ReportKind::Garage, stored.id, &body("Beacon"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.created_at, stored.created_at);
        assert!(updated.updated_at >= stored.updated_at);
        assert_eq!(updated.summary().client, "Beacon");
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let store = ReportStore::in_memory().await.unwrap();
        let first = store.create(ReportKind::Concrete, &body("First")).await.unwrap();
        let second = store.create(ReportKind::Concrete, &body("Second")).await.unwrap();
        store.create(ReportKind::Garage, &body("Elsewhere")).await.unwrap();

        let ids: Vec<Uuid> = store
            .list(ReportKind::Concrete)
            .await
            .unwrap()
            .iter()
            .map(|report| report.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn summary_reads_project_fields() {
        let stored = StoredReport {
            id: Uuid::nil(),
            kind: ReportKind::Insulation,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            report: body("Acme"),
        };
        let summary = stored.summary();
        assert_eq!(summary.client, "Acme");
        assert_eq!(summary.project_name, "Tower");
        assert_eq!(summary.inspection_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }
}
