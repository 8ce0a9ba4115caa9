//! Listing: status filtering, paged vs bulk mode, pagination metadata.

use serde::{Deserialize, Serialize};

use crate::applications::store::ApplicationStore;
use crate::errors::{AppError, FieldError};
use crate::models::application::{ApplicationStatus, JobApplication};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
/// `status` value meaning "no status filter".
pub const ALL_STATUSES: &str = "ALL";
/// `view` value requesting bulk mode.
pub const KANBAN_VIEW: &str = "kanban";

/// Raw query string of `GET /applications`. Kept as strings so malformed
/// numbers fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub view: Option<String>,
}

/// Server-side bounds on listing sizes.
#[derive(Debug, Clone, Copy)]
pub struct ListLimits {
    pub max_page_size: u32,
    pub bulk_cap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Result<Self, FieldError> {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL_STATUSES) => Ok(StatusFilter::All),
            Some(name) => ApplicationStatus::parse(name)
                .map(StatusFilter::Only)
                .ok_or_else(|| {
                    FieldError::new("status", format!("Unknown status filter '{name}'"))
                }),
        }
    }

    pub fn status(&self) -> Option<ApplicationStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }

    pub fn matches(&self, status: ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Paged { page: u32, limit: u32 },
    Bulk,
}

/// Offset/limit handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub filter: StatusFilter,
    pub mode: ListMode,
}

impl ListOptions {
    pub fn from_params(params: &ListParams, limits: ListLimits) -> Result<Self, AppError> {
        let filter =
            StatusFilter::parse(params.status.as_deref()).map_err(|e| AppError::Validation(vec![e]))?;

        if params.view.as_deref().map(str::trim) == Some(KANBAN_VIEW) {
            return Ok(ListOptions {
                filter,
                mode: ListMode::Bulk,
            });
        }

        let page = parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(params.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(limits.max_page_size.max(1));

        Ok(ListOptions {
            filter,
            mode: ListMode::Paged { page, limit },
        })
    }
}

impl ListMode {
    pub fn window(&self, bulk_cap: u32) -> PageWindow {
        match *self {
            ListMode::Paged { page, limit } => PageWindow {
                offset: (i64::from(page) - 1) * i64::from(limit),
                limit: i64::from(limit),
            },
            ListMode::Bulk => PageWindow {
                offset: 0,
                limit: i64::from(bulk_cap),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total_items: i64) -> Self {
        let per_page = i64::from(limit.max(1));
        PaginationMeta {
            current_page: page,
            total_pages: (total_items + per_page - 1) / per_page,
            total_items,
            items_per_page: limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<JobApplication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

/// Lists the caller's applications. Page and count are separate statements;
/// the count is taken over the same filter as the page.
pub async fn list_applications(
    store: &dyn ApplicationStore,
    user_id: i32,
    options: ListOptions,
    limits: ListLimits,
) -> Result<ListResponse, AppError> {
    let window = options.mode.window(limits.bulk_cap);
    let data = store.list(user_id, options.filter, window).await?;
    debug_assert!(data.iter().all(|a| options.filter.matches(a.status)));

    let pagination = match options.mode {
        ListMode::Bulk => {
            if data.len() as i64 >= window.limit {
                tracing::warn!(
                    "Bulk listing for user {user_id} hit the cap of {} records",
                    limits.bulk_cap
                );
            }
            None
        }
        ListMode::Paged { page, limit } => {
            let total_items = store.count(user_id, options.filter).await?;
            Some(PaginationMeta::new(page, limit, total_items))
        }
    };

    Ok(ListResponse { data, pagination })
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
