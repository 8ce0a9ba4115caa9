//! Persistence accessor for `job_applications`.
//!
//! Every method takes the owning `user_id`; there is no unscoped access path.
//! `AppState` holds an `Arc<dyn ApplicationStore>`; production uses
//! `PgApplicationStore`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::applications::listing::{PageWindow, StatusFilter};
use crate::errors::AppError;
use crate::models::application::{
    ApplicationPatch, ApplicationStatus, JobApplication, NewApplication,
};

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, user_id: i32, new: &NewApplication)
        -> Result<JobApplication, AppError>;

    async fn find(&self, user_id: i32, id: i32) -> Result<Option<JobApplication>, AppError>;

    /// Matching records ordered by `updated_at DESC, id DESC`, restricted to `window`.
    async fn list(
        &self,
        user_id: i32,
        filter: StatusFilter,
        window: PageWindow,
    ) -> Result<Vec<JobApplication>, AppError>;

    async fn count(&self, user_id: i32, filter: StatusFilter) -> Result<i64, AppError>;

    /// Applies the present fields of `patch`. `None` when no owned row has this id.
    async fn update(
        &self,
        user_id: i32,
        id: i32,
        patch: &ApplicationPatch,
    ) -> Result<Option<JobApplication>, AppError>;

    /// Returns `false` when no owned row has this id.
    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError>;

    /// One entry per status that has at least one record.
    async fn count_by_status(&self, user_id: i32)
        -> Result<Vec<(ApplicationStatus, i64)>, AppError>;
}

const COLUMNS: &str = "id, user_id, company, position, status, applied_date, reminder_date, \
                       notes, created_at, updated_at";

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        PgApplicationStore { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(
        &self,
        user_id: i32,
        new: &NewApplication,
    ) -> Result<JobApplication, AppError> {
        let app = sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            INSERT INTO job_applications
                (user_id, company, position, status, applied_date, reminder_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&new.company)
        .bind(&new.position)
        .bind(new.status)
        .bind(new.applied_date)
        .bind(new.reminder_date)
        .bind(new.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;

        info!("Created application {} for user {user_id}", app.id);
        Ok(app)
    }

    async fn find(&self, user_id: i32, id: i32) -> Result<Option<JobApplication>, AppError> {
        Ok(sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {COLUMNS} FROM job_applications WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list(
        &self,
        user_id: i32,
        filter: StatusFilter,
        window: PageWindow,
    ) -> Result<Vec<JobApplication>, AppError> {
        Ok(sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM job_applications
            WHERE user_id = $1
              AND ($2::application_status IS NULL OR status = $2)
            ORDER BY updated_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(filter.status())
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count(&self, user_id: i32, filter: StatusFilter) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM job_applications
            WHERE user_id = $1
              AND ($2::application_status IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(filter.status())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        patch: &ApplicationPatch,
    ) -> Result<Option<JobApplication>, AppError> {
        // Ownership is part of the WHERE clause, so check-and-write is one statement
        let updated = sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            UPDATE job_applications SET
                company       = COALESCE($3::text, company),
                position      = COALESCE($4::text, position),
                status        = COALESCE($5::application_status, status),
                applied_date  = CASE WHEN $6 THEN $7::timestamptz ELSE applied_date END,
                reminder_date = CASE WHEN $8 THEN $9::timestamptz ELSE reminder_date END,
                notes         = CASE WHEN $10 THEN $11::text ELSE notes END,
                updated_at    = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(patch.company.as_deref())
        .bind(patch.position.as_deref())
        .bind(patch.status)
        .bind(patch.applied_date.is_present())
        .bind(patch.applied_date.value().copied())
        .bind(patch.reminder_date.is_present())
        .bind(patch.reminder_date.value().copied())
        .bind(patch.notes.is_present())
        .bind(patch.notes.value().map(String::as_str))
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            info!("Updated application {id} for user {user_id}");
        }
        Ok(updated)
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted application {id} for user {user_id}");
        }
        Ok(deleted)
    }

    async fn count_by_status(
        &self,
        user_id: i32,
    ) -> Result<Vec<(ApplicationStatus, i64)>, AppError> {
        Ok(sqlx::query_as::<_, (ApplicationStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM job_applications
            WHERE user_id = $1
            GROUP BY status
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
