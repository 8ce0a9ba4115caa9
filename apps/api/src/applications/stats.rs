use std::collections::BTreeMap;

use serde::Serialize;

use crate::applications::store::ApplicationStore;
use crate::errors::AppError;
use crate::models::application::ApplicationStatus;

/// Per-status counts for one user. Statuses with no records are absent from
/// `by_status`; callers treat a missing key as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: i64,
    pub by_status: BTreeMap<ApplicationStatus, i64>,
}

impl StatsResponse {
    pub fn from_counts(counts: impl IntoIterator<Item = (ApplicationStatus, i64)>) -> Self {
        let by_status: BTreeMap<_, _> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
        StatsResponse {
            total: by_status.values().sum(),
            by_status,
        }
    }
}

/// Always a fresh aggregate over the store; nothing is cached.
pub async fn compute_stats(
    store: &dyn ApplicationStore,
    user_id: i32,
) -> Result<StatsResponse, AppError> {
    let counts = store.count_by_status(user_id).await?;
    Ok(StatsResponse::from_counts(counts))
}
