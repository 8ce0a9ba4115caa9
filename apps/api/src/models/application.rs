use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pipeline stage of a job application. Stored as the Postgres enum
/// `application_status`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "application_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    ToApply,
    Applied,
    FollowedUp,
    Interview,
    Rejected,
    OfferAccepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::ToApply,
        ApplicationStatus::Applied,
        ApplicationStatus::FollowedUp,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::OfferAccepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::ToApply => "TO_APPLY",
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::FollowedUp => "FOLLOWED_UP",
            ApplicationStatus::Interview => "INTERVIEW",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::OfferAccepted => "OFFER_ACCEPTED",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: i32,
    pub user_id: i32,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub applied_date: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated create payload. The owner is supplied separately by the caller identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub applied_date: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Update instruction for a nullable column.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Field absent from the payload: keep the stored value.
    Missing,
    /// Explicit `null`: clear the stored value.
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T: Clone> Patch<T> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Patch::Missing)
    }

    /// The value to write when present; `None` for both `Missing` and `Null`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Missing | Patch::Null => None,
        }
    }

    pub fn apply(&self, slot: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v.clone()),
        }
    }
}

/// A validated partial update. Required columns can only be replaced, never cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub applied_date: Patch<DateTime<Utc>>,
    pub reminder_date: Patch<DateTime<Utc>>,
    pub notes: Patch<String>,
}

impl ApplicationPatch {
    /// Applies the present fields onto an in-memory record. Does not touch timestamps.
    pub fn apply_to(&self, app: &mut JobApplication) {
        if let Some(company) = &self.company {
            app.company = company.clone();
        }
        if let Some(position) = &self.position {
            app.position = position.clone();
        }
        if let Some(status) = self.status {
            app.status = status;
        }
        self.applied_date.apply(&mut app.applied_date);
        self.reminder_date.apply(&mut app.reminder_date);
        self.notes.apply(&mut app.notes);
    }
}
