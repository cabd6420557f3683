// Dashboard service - credential check, data fetch, aggregation
use crate::application::business_metrics::{compute_charts, compute_groups, recent_activity, BusinessData};
use crate::application::demo_data::demo_table;
use crate::application::metric_aggregator::aggregate;
use crate::application::sheet_repository::SheetRepository;
use crate::domain::session::Session;
use crate::domain::source::{LoadState, SheetSource, SourceStatus};
use crate::domain::summary::DashboardSummary;
use crate::domain::table::SheetTable;
use crate::infrastructure::config::DashboardSettings;
use chrono::NaiveDate;
use std::sync::Arc;

/// Summary plus the tables it was computed from, for pages that list rows
#[derive(Debug, Clone)]
pub struct LoadedDashboard {
    pub summary: DashboardSummary,
    pub data: BusinessData,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn SheetRepository>,
    sources: Vec<SheetSource>,
    settings: DashboardSettings,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn SheetRepository>,
        sources: Vec<SheetSource>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            repository,
            sources,
            settings,
        }
    }

    pub fn sources(&self) -> &[SheetSource] {
        &self.sources
    }

    pub async fn load(&self, session: &Session, as_of: NaiveDate) -> LoadedDashboard {
        let mut data = BusinessData::new();
        let mut statuses = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let (table, status) = self.load_source(session, source, as_of).await;
            if let Some(table) = table {
                data.insert(source.key, table);
            }
            statuses.push(status);
        }

        let summary = build_summary(&data, statuses, as_of);
        if summary.is_empty() {
            tracing::warn!(session = %session.id, "No source produced any metrics");
        }
        tracing::debug!(
            session = %session.id,
            records = summary.record_count(),
            "Dashboard assembled"
        );

        LoadedDashboard { summary, data }
    }

    /// Fetch one source for a session. Demo sessions and unconfigured sources get
    /// placeholder rows; failures follow the `demo_fallback` setting.
    pub async fn load_source(
        &self,
        session: &Session,
        source: &SheetSource,
        as_of: NaiveDate,
    ) -> (Option<SheetTable>, SourceStatus) {
        let credentials = match session.credentials() {
            Some(creds) if source.is_configured() => creds,
            _ => return demo(source, LoadState::Demo, as_of),
        };

        match self.repository.fetch_table(credentials, source).await {
            Ok(table) if !table.is_empty() => {
                tracing::debug!("Loaded {} rows from {}", table.len(), source.key.as_str());
                let status = SourceStatus::new(source.key, LoadState::Loaded, table.len(), table.columns.len());
                (Some(table), status)
            }
            Ok(_) => {
                tracing::warn!("No rows found for {}", source.key.as_str());
                self.fallback(source, "sheet has no rows".to_string(), LoadState::Empty, as_of)
            }
            Err(e) => {
                tracing::warn!("Error loading {}: {}", source.key.as_str(), e);
                let message = e.to_string();
                self.fallback(source, message.clone(), LoadState::Failed { message }, as_of)
            }
        }
    }

    fn fallback(
        &self,
        source: &SheetSource,
        reason: String,
        state: LoadState,
        as_of: NaiveDate,
    ) -> (Option<SheetTable>, SourceStatus) {
        if self.settings.demo_fallback {
            demo(source, LoadState::DemoFallback { reason }, as_of)
        } else {
            (None, SourceStatus::new(source.key, state, 0, 0))
        }
    }
}

fn demo(source: &SheetSource, state: LoadState, as_of: NaiveDate) -> (Option<SheetTable>, SourceStatus) {
    let table = demo_table(source.key, as_of);
    let status = SourceStatus::new(source.key, state, table.len(), table.columns.len());
    (Some(table), status)
}

/// Pure aggregation step shared by the page and streaming paths
pub fn build_summary(data: &BusinessData, sources: Vec<SourceStatus>, as_of: NaiveDate) -> DashboardSummary {
    DashboardSummary {
        sections: aggregate(compute_groups(data, as_of)),
        charts: compute_charts(data),
        activity: recent_activity(data),
        sources,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::session_service::SessionService;
    use crate::application::sheet_repository::memory::InMemorySheetRepository;
    use crate::application::sheet_repository::SheetError;
    use crate::domain::credentials::test_credentials;
    use crate::domain::metric::MetricCategory;
    use crate::domain::source::SourceKey;
    use crate::infrastructure::config::SessionSettings;

    pub(crate) fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    pub(crate) fn sources() -> Vec<SheetSource> {
        vec![
            SheetSource::new(SourceKey::Customers, "CUSTOMERS", None),
            SheetSource::new(SourceKey::Pricing, "PRICING", None),
            SheetSource::new(SourceKey::Appointments, "", None),
            SheetSource::new(SourceKey::Calls, "CALLS", None),
            SheetSource::new(SourceKey::Invoices, "", None),
        ]
    }

    fn customers() -> SheetTable {
        SheetTable::from_grid(vec![
            vec!["Name".into(), "Status".into(), "Value".into()],
            vec!["Ada".into(), "Active".into(), "900".into()],
        ])
    }

    fn service(repo: InMemorySheetRepository, demo_fallback: bool) -> DashboardService {
        DashboardService::new(Arc::new(repo), sources(), DashboardSettings { demo_fallback })
    }

    #[tokio::test]
    async fn test_demo_session_is_never_empty() {
        let sessions = SessionService::new(SessionSettings::default());
        let session = sessions.start_demo().await;
        let repo = InMemorySheetRepository::default();
        let loaded = service(repo, false).load(&session, as_of()).await;

        assert!(!loaded.summary.is_empty());
        assert_eq!(loaded.data.len(), 5);
        assert!(loaded.summary.sources.iter().all(|s| s.state == LoadState::Demo));
        for category in MetricCategory::ALL {
            assert!(!loaded.summary.section(category).is_empty());
        }
    }

    #[tokio::test]
    async fn test_live_fetch_without_fallback_leaves_sections_empty() {
        let sessions = SessionService::new(SessionSettings::default());
        let session = sessions.start_live(test_credentials(), false).await;
        let repo = InMemorySheetRepository::default()
            .with_table("CUSTOMERS", customers())
            .with_table("PRICING", SheetTable::default())
            .with_error("CALLS", SheetError::Request("timeout".into()));

        let loaded = service(repo, false).load(&session, as_of()).await;
        let states: Vec<&LoadState> = loaded.summary.sources.iter().map(|s| &s.state).collect();

        assert_eq!(states[0], &LoadState::Loaded);
        assert_eq!(states[1], &LoadState::Empty);
        assert_eq!(states[2], &LoadState::Demo);
        assert!(matches!(states[3], LoadState::Failed { message } if message.contains("timeout")));
        assert!(!loaded.data.contains_key(&SourceKey::Calls));
        assert!(!loaded.data.contains_key(&SourceKey::Pricing));
        // Customer section comes only from the one live row
        let customer = loaded.summary.section(MetricCategory::Customer);
        assert_eq!(customer[0].display_value(), "1");
    }

    #[tokio::test]
    async fn test_live_fetch_with_fallback_uses_demo_rows() {
        let sessions = SessionService::new(SessionSettings::default());
        let session = sessions.start_live(test_credentials(), false).await;
        let repo = InMemorySheetRepository::default().with_table("CUSTOMERS", customers());

        let loaded = service(repo, true).load(&session, as_of()).await;

        assert_eq!(loaded.data.len(), 5);
        assert!(matches!(
            &loaded.summary.sources[1].state,
            LoadState::DemoFallback { reason } if reason.contains("PRICING")
        ));
    }

    #[tokio::test]
    async fn test_every_live_source_failing_gives_empty_summary() {
        let sessions = SessionService::new(SessionSettings::default());
        let session = sessions.start_live(test_credentials(), false).await;
        let sources = SourceKey::ALL
            .map(|key| SheetSource::new(key, "MISSING", None))
            .to_vec();
        let svc = DashboardService::new(
            Arc::new(InMemorySheetRepository::default()),
            sources,
            DashboardSettings { demo_fallback: false },
        );

        let loaded = svc.load(&session, as_of()).await;
        assert!(loaded.summary.is_empty());
        assert!(loaded.data.is_empty());
    }

    #[tokio::test]
    async fn test_identical_inputs_render_identically() {
        let sessions = SessionService::new(SessionSettings::default());
        let session = sessions.start_live(test_credentials(), false).await;
        let svc = service(InMemorySheetRepository::default().with_table("CUSTOMERS", customers()), false);

        let first = svc.load(&session, as_of()).await.summary;
        let second = svc.load(&session, as_of()).await.summary;
        assert_eq!(first, second);
    }
}
