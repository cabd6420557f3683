// Login session domain model
use super::credentials::ServiceAccountCredentials;
use super::navigation::PageId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum AccessMode {
    Live(Box<ServiceAccountCredentials>),
    Demo,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_name: String,
    pub mode: AccessMode,
    pub login_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Last page viewed; `/` sends the user back here
    pub current_page: PageId,
}

impl Session {
    pub fn is_demo(&self) -> bool {
        matches!(self.mode, AccessMode::Demo)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn credentials(&self) -> Option<&ServiceAccountCredentials> {
        match &self.mode {
            AccessMode::Live(creds) => Some(creds.as_ref()),
            AccessMode::Demo => None,
        }
    }

    pub fn role(&self) -> &'static str {
        match self.mode {
            AccessMode::Live(_) => "admin",
            AccessMode::Demo => "demo",
        }
    }

    /// Prefix for cache entries owned by this session's key
    pub fn cache_owner(&self) -> Option<String> {
        self.credentials().map(ServiceAccountCredentials::fingerprint)
    }
}
