//! In-memory `ApplicationStore` used by the unit and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::applications::listing::{PageWindow, StatusFilter};
use crate::applications::store::ApplicationStore;
use crate::errors::AppError;
use crate::models::application::{
    ApplicationPatch, ApplicationStatus, JobApplication, NewApplication,
};

#[derive(Default)]
struct Inner {
    rows: Vec<JobApplication>,
    next_id: i32,
    ticks: i64,
}

impl Inner {
    /// Logical clock: one second per mutation, so ordering is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.ticks)
    }
}

#[derive(Default)]
pub struct MemoryApplicationStore {
    inner: Mutex<Inner>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces two records onto the same `updated_at`, for tie-break tests.
    pub fn touch_at(&self, id: i32, at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.rows.iter_mut().find(|r| r.id == id) {
            row.updated_at = at;
        }
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(
        &self,
        user_id: i32,
        new: &NewApplication,
    ) -> Result<JobApplication, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let now = inner.now();
        let app = JobApplication {
            id: inner.next_id,
            user_id,
            company: new.company.clone(),
            position: new.position.clone(),
            status: new.status,
            applied_date: new.applied_date,
            reminder_date: new.reminder_date,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.rows.push(app.clone());
        Ok(app)
    }

    async fn find(&self, user_id: i32, id: i32) -> Result<Option<JobApplication>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn list(
        &self,
        user_id: i32,
        filter: StatusFilter,
        window: PageWindow,
    ) -> Result<Vec<JobApplication>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<JobApplication> = inner
            .rows
            .iter()
            .filter(|r| r.user_id == user_id && filter.matches(r.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(window.offset.max(0) as usize)
            .take(window.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, user_id: i32, filter: StatusFilter) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.user_id == user_id && filter.matches(r.status))
            .count() as i64)
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        patch: &ApplicationPatch,
    ) -> Result<Option<JobApplication>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        let Some(row) = inner
            .rows
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        patch.apply_to(row);
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(inner.rows.len() < before)
    }

    async fn count_by_status(
        &self,
        user_id: i32,
    ) -> Result<Vec<(ApplicationStatus, i64)>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(ApplicationStatus::ALL
            .into_iter()
            .map(|status| {
                let n = inner
                    .rows
                    .iter()
                    .filter(|r| r.user_id == user_id && r.status == status)
                    .count() as i64;
                (status, n)
            })
            .filter(|(_, n)| *n > 0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_app(company: &str) -> NewApplication {
        NewApplication {
            company: company.to_string(),
            position: "Engineer".to_string(),
            status: ApplicationStatus::ToApply,
            applied_date: None,
            reminder_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_equal_timestamps_break_ties_by_id() {
        let store = MemoryApplicationStore::new();
        let a = store.insert(1, &new_app("A")).await.unwrap();
        let b = store.insert(1, &new_app("B")).await.unwrap();
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        store.touch_at(a.id, at);
        store.touch_at(b.id, at);

        let rows = store
            .list(1, StatusFilter::All, PageWindow { offset: 0, limit: 10 })
            .await
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_update_moves_record_to_front() {
        let store = MemoryApplicationStore::new();
        let first = store.insert(1, &new_app("First")).await.unwrap();
        store.insert(1, &new_app("Second")).await.unwrap();

        store
            .update(1, first.id, &ApplicationPatch::default())
            .await
            .unwrap();

        let rows = store
            .list(1, StatusFilter::All, PageWindow { offset: 0, limit: 10 })
            .await
            .unwrap();
        assert_eq!(rows[0].id, first.id);
    }
}
