// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::session_service::SessionService;
use crate::application::sheet_repository::SheetRepository;
use crate::application::streaming_service::StreamingDashboardService;
use crate::presentation::render::Renderer;
use std::sync::Arc;

pub struct AppState {
    pub sessions: SessionService,
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingDashboardService,
    pub repository: Arc<dyn SheetRepository>,
    pub renderer: Renderer,
    pub assets_dir: String,
    pub secure_cookies: bool,
}
