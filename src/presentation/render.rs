// HTML rendering - handlebars templates plus the view models they consume
use crate::application::dashboard_service::LoadedDashboard;
use crate::domain::metric::MetricCategory;
use crate::domain::navigation::{navigation_cards, PageId};
use crate::domain::session::Session;
use crate::domain::source::{LoadState, SourceStatus};
use crate::domain::summary::{ActivityItem, DashboardSummary};
use crate::domain::table::SheetTable;
use crate::infrastructure::config::ThemeSettings;
use crate::presentation::error::AppError;
use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::Serialize;

const MAX_TABLE_ROWS: usize = 50;

#[derive(Serialize)]
struct UserView {
    name: String,
    initial: String,
    role: &'static str,
    login_time: String,
}

#[derive(Serialize)]
struct CardView {
    label: &'static str,
    icon: &'static str,
    path: String,
    status: &'static str,
    color: &'static str,
    active: bool,
}

#[derive(Serialize)]
struct SystemView {
    mode: &'static str,
    loaded: usize,
    total: usize,
}

#[derive(Serialize)]
struct RecordView {
    icon: String,
    label: String,
    value: String,
    delta: Option<String>,
}

#[derive(Serialize)]
struct SectionView {
    id: &'static str,
    title: &'static str,
    icon: &'static str,
    records: Vec<RecordView>,
    charts: Vec<String>,
}

#[derive(Serialize)]
struct SourceView {
    icon: &'static str,
    description: &'static str,
    state: &'static str,
    label: &'static str,
    detail: Option<String>,
    records: usize,
}

#[derive(Serialize)]
struct TableView<'a> {
    columns: &'a [String],
    rows: &'a [Vec<String>],
    shown: usize,
    total: usize,
    truncated: bool,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'static str,
    theme: &'a ThemeSettings,
    user: UserView,
    cards: Vec<CardView>,
    system: SystemView,
    as_of: String,
    sections: Vec<SectionView>,
    sources: Vec<SourceView>,
    activity: &'a [ActivityItem],
    table: Option<TableView<'a>>,
    charts_json: String,
}

pub struct Renderer {
    registry: Handlebars<'static>,
    theme: ThemeSettings,
    remember_days: i64,
}

impl Renderer {
    pub fn new(theme: ThemeSettings, remember_days: i64) -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_partial("head", include_str!("../../templates/partials/head.hbs"))?;
        registry.register_partial("sidebar", include_str!("../../templates/partials/sidebar.hbs"))?;
        registry.register_template_string("login", include_str!("../../templates/login.hbs"))?;
        registry.register_template_string("page", include_str!("../../templates/page.hbs"))?;
        registry.register_template_string("not_found", include_str!("../../templates/not_found.hbs"))?;

        Ok(Self {
            registry,
            theme,
            remember_days,
        })
    }

    pub fn login(&self, error: Option<&str>) -> Result<String, AppError> {
        let data = serde_json::json!({
            "title": "Sign in",
            "theme": &self.theme,
            "error": error,
            "remember_days": self.remember_days,
        });
        Ok(self.registry.render("login", &data)?)
    }

    pub fn not_found(&self, slug: &str) -> Result<String, AppError> {
        let data = serde_json::json!({
            "title": "Not found",
            "theme": &self.theme,
            "slug": slug,
        });
        Ok(self.registry.render("not_found", &data)?)
    }

    pub fn page(
        &self,
        page: PageId,
        session: &Session,
        loaded: &LoadedDashboard,
        as_of: NaiveDate,
    ) -> Result<String, AppError> {
        let summary = &loaded.summary;
        let table = page
            .table_source()
            .and_then(|key| loaded.data.get(&key))
            .map(table_view);

        let view = PageView {
            title: page.title(),
            theme: &self.theme,
            user: user_view(session),
            cards: card_views(page),
            system: system_view(session, summary),
            as_of: as_of.format("%B %-d, %Y").to_string(),
            sections: section_views(page, summary),
            sources: if page.is_enhanced() {
                summary.sources.iter().map(source_view).collect()
            } else {
                Vec::new()
            },
            activity: if page.is_enhanced() { summary.activity.as_slice() } else { &[] },
            table,
            charts_json: charts_json(page, summary)?,
        };

        Ok(self.registry.render("page", &view)?)
    }
}

fn user_view(session: &Session) -> UserView {
    let initial = session
        .user_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();

    UserView {
        name: session.user_name.clone(),
        initial,
        role: session.role(),
        login_time: session.login_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

fn card_views(active: PageId) -> Vec<CardView> {
    navigation_cards()
        .into_iter()
        .map(|card| CardView {
            label: card.label,
            icon: card.icon,
            path: card.path,
            status: card.status,
            color: card.color,
            active: card.page == active,
        })
        .collect()
}

fn system_view(session: &Session, summary: &DashboardSummary) -> SystemView {
    SystemView {
        mode: if session.is_demo() { "Demo mode" } else { "Connected" },
        loaded: summary
            .sources
            .iter()
            .filter(|s| s.state == LoadState::Loaded)
            .count(),
        total: summary.sources.len(),
    }
}

fn section_views(page: PageId, summary: &DashboardSummary) -> Vec<SectionView> {
    page.sections()
        .iter()
        .map(|&category| SectionView {
            id: category_id(category),
            title: category.title(),
            icon: category.icon(),
            records: summary
                .section(category)
                .iter()
                .map(|r| RecordView {
                    icon: r.icon.clone(),
                    label: r.label.clone(),
                    value: r.display_value(),
                    delta: r.delta.clone(),
                })
                .collect(),
            charts: summary.charts_for(category).into_iter().map(|c| c.id.clone()).collect(),
        })
        .collect()
}

fn category_id(category: MetricCategory) -> &'static str {
    match category {
        MetricCategory::Executive => "executive",
        MetricCategory::Financial => "financial",
        MetricCategory::Customer => "customer",
        MetricCategory::Performance => "performance",
    }
}

fn source_view(status: &SourceStatus) -> SourceView {
    let (state, label, detail) = match &status.state {
        LoadState::Loaded => ("loaded", "Live data", None),
        LoadState::Empty => ("empty", "No rows", None),
        LoadState::Failed { message } => ("failed", "Unavailable", Some(message.clone())),
        LoadState::Demo => ("demo", "Sample data", None),
        LoadState::DemoFallback { reason } => ("fallback", "Sample data (fallback)", Some(reason.clone())),
    };

    SourceView {
        icon: status.icon(),
        description: status.key.description(),
        state,
        label,
        detail,
        records: status.records,
    }
}

fn table_view(table: &SheetTable) -> TableView<'_> {
    let shown = table.rows.len().min(MAX_TABLE_ROWS);
    TableView {
        columns: &table.columns,
        rows: &table.rows[..shown],
        shown,
        total: table.rows.len(),
        truncated: shown < table.rows.len(),
    }
}

/// Chart payload for the page's sections, safe to embed inside a `<script>` element
fn charts_json(page: PageId, summary: &DashboardSummary) -> Result<String, AppError> {
    let charts: Vec<_> = page
        .sections()
        .iter()
        .flat_map(|&category| summary.charts_for(category))
        .collect();

    let json = serde_json::to_string(&charts).map_err(|e| AppError::Render(e.to_string()))?;
    Ok(json.replace('<', "\\u003c"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::build_summary;
    use crate::application::demo_data::demo_business_data;
    use crate::application::session_service::SessionService;
    use crate::infrastructure::config::SessionSettings;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn renderer() -> Renderer {
        Renderer::new(ThemeSettings::default(), 30).unwrap()
    }

    #[tokio::test]
    async fn test_empty_section_shows_placeholder() {
        let session = SessionService::new(SessionSettings::default()).start_demo().await;
        let loaded = LoadedDashboard {
            summary: DashboardSummary::default(),
            data: Default::default(),
        };

        let html = renderer().page(PageId::Dashboard, &session, &loaded, as_of()).unwrap();
        assert_eq!(html.matches("No data").count(), MetricCategory::ALL.len());
        assert!(html.contains("<h1 class=\"page-title\">Dashboard</h1>"));
    }

    #[tokio::test]
    async fn test_active_card_and_table() {
        let session = SessionService::new(SessionSettings::default()).start_demo().await;
        let data = demo_business_data(as_of());
        let summary = build_summary(&data, Vec::new(), as_of());
        let loaded = LoadedDashboard { summary, data };

        let html = renderer().page(PageId::Pricing, &session, &loaded, as_of()).unwrap();
        assert_eq!(html.matches("nav-card active").count(), 1);
        assert!(html.contains("class=\"nav-card active\" href=\"/pages/pricing\""));
        assert!(html.contains("<th>Price</th>"));
        assert!(html.contains("Demo User"));
    }

    #[test]
    fn test_login_page_shows_error_and_theme() {
        let html = renderer().login(Some("missing required fields: client_email")).unwrap();
        assert!(html.contains("missing required fields: client_email"));
        assert!(html.contains("--primary: #4A90E2"));
        assert!(html.contains("action=\"/login/demo\""));
    }

    #[test]
    fn test_charts_json_escapes_script_close() {
        let mut summary = DashboardSummary::default();
        summary.charts.push(crate::domain::summary::ChartData::new(
            "x",
            "</script>",
            crate::domain::summary::ChartKind::Bar,
            MetricCategory::Financial,
            vec![],
        ));

        let json = charts_json(PageId::Dashboard, &summary).unwrap();
        assert!(!json.contains("</script>"));
        assert!(json.contains("\\u003c/script>"));
    }
}
