// Session service - login, demo access and logout
use crate::domain::credentials::ServiceAccountCredentials;
use crate::domain::navigation::PageId;
use crate::domain::session::{AccessMode, Session};
use crate::infrastructure::config::SessionSettings;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    settings: SessionSettings,
}

impl SessionService {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings,
        }
    }

    /// Open a session backed by already-validated service-account credentials
    pub async fn start_live(&self, credentials: ServiceAccountCredentials, remember: bool) -> Session {
        let lifetime = if remember {
            Duration::days(self.settings.remember_days)
        } else {
            Duration::hours(self.settings.live_hours)
        };
        let user_name = credentials.client_email.clone();
        self.insert(user_name, AccessMode::Live(Box::new(credentials)), lifetime, Utc::now())
            .await
    }

    /// Demo access never looks at credentials
    pub async fn start_demo(&self) -> Session {
        self.insert(
            "Demo User".to_string(),
            AccessMode::Demo,
            Duration::hours(self.settings.demo_hours),
            Utc::now(),
        )
        .await
    }

    async fn insert(
        &self,
        user_name: String,
        mode: AccessMode,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            user_name,
            mode,
            login_time: now,
            expires_at: now + lifetime,
            current_page: PageId::DEFAULT,
        };

        tracing::info!(
            session = %session.id,
            role = session.role(),
            "Session started, expires {}",
            session.expires_at
        );
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        if sessions.len() < before {
            tracing::debug!("Evicted {} expired sessions", before - sessions.len());
        }
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.get_at(id, Utc::now()).await
    }

    async fn get_at(&self, id: Uuid, now: DateTime<Utc>) -> Option<Session> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.is_expired(now) {
            tracing::debug!(session = %id, "Session expired");
            self.sessions.write().await.remove(&id);
            return None;
        }
        Some(session)
    }

    /// Parse a cookie value and look the session up
    pub async fn resolve(&self, cookie: Option<&str>) -> Option<Session> {
        let id = Uuid::parse_str(cookie?).ok()?;
        self.get(id).await
    }

    /// Remember the page a session is looking at
    pub async fn visit(&self, id: Uuid, page: PageId) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.current_page = page;
        }
    }

    pub async fn end(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::test_credentials;

    #[tokio::test]
    async fn test_demo_session_needs_no_credentials() {
        let service = SessionService::new(SessionSettings::default());
        let session = service.start_demo().await;

        assert!(session.is_demo());
        assert!(session.credentials().is_none());
        assert_eq!(session.role(), "demo");
        assert!(service.get(session.id).await.is_some());
    }

    #[tokio::test]
    async fn test_live_session_lifetime() {
        let service = SessionService::new(SessionSettings::default());

        let short = service.start_live(test_credentials(), false).await;
        assert_eq!(short.expires_at - short.login_time, Duration::hours(8));

        let long = service.start_live(test_credentials(), true).await;
        assert_eq!(long.expires_at - long.login_time, Duration::days(30));
        assert_eq!(long.user_name, "dashboard@metrics-project.iam.gserviceaccount.com");
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let service = SessionService::new(SessionSettings::default());
        let session = service.start_demo().await;

        let later = session.expires_at + Duration::seconds(1);
        assert!(service.get_at(session.id, later).await.is_none());
        assert!(service.get(session.id).await.is_none());
    }

    #[tokio::test]
    async fn test_new_login_evicts_expired_sessions() {
        let service = SessionService::new(SessionSettings::default());
        let long_ago = Utc::now() - Duration::days(10);
        for _ in 0..1000 {
            service
                .insert("Demo User".to_string(), AccessMode::Demo, Duration::hours(8), long_ago)
                .await;
        }

        let live = service.start_demo().await;
        let sessions = service.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&live.id));
    }

    #[tokio::test]
    async fn test_resolve_and_end() {
        let service = SessionService::new(SessionSettings::default());
        let session = service.start_demo().await;
        let cookie = session.id.to_string();

        assert!(service.resolve(Some(&cookie)).await.is_some());
        assert!(service.resolve(Some("not-a-uuid")).await.is_none());
        assert!(service.resolve(None).await.is_none());

        assert_eq!(session.current_page, PageId::DEFAULT);
        service.visit(session.id, PageId::Pricing).await;
        assert_eq!(service.get(session.id).await.unwrap().current_page, PageId::Pricing);

        assert!(service.end(session.id).await);
        assert!(service.resolve(Some(&cookie)).await.is_none());
    }
}
