// Navigation domain model - pages and the sidebar cards that link to them
use super::metric::MetricCategory;
use super::source::SourceKey;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    EnhancedDashboard,
    Dashboard,
    Customers,
    Invoices,
    Appointments,
    Pricing,
    CallCenter,
}

impl PageId {
    pub const ALL: [PageId; 7] = [
        PageId::EnhancedDashboard,
        PageId::Dashboard,
        PageId::Customers,
        PageId::Invoices,
        PageId::Appointments,
        PageId::Pricing,
        PageId::CallCenter,
    ];

    pub const DEFAULT: PageId = PageId::EnhancedDashboard;

    pub fn slug(&self) -> &'static str {
        match self {
            PageId::EnhancedDashboard => "enhanced-dashboard",
            PageId::Dashboard => "dashboard",
            PageId::Customers => "customers",
            PageId::Invoices => "invoices",
            PageId::Appointments => "appointments",
            PageId::Pricing => "pricing",
            PageId::CallCenter => "call-center",
        }
    }

    pub fn from_slug(slug: &str) -> Option<PageId> {
        Self::ALL.into_iter().find(|p| p.slug() == slug)
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageId::EnhancedDashboard => "Enhanced Dashboard",
            PageId::Dashboard => "Dashboard",
            PageId::Customers => "Customers",
            PageId::Invoices => "Invoices",
            PageId::Appointments => "Appointments",
            PageId::Pricing => "Pricing",
            PageId::CallCenter => "Call Center",
        }
    }

    pub fn path(&self) -> String {
        format!("/pages/{}", self.slug())
    }

    /// Metric sections shown on the page, in display order
    pub fn sections(&self) -> &'static [MetricCategory] {
        match self {
            PageId::EnhancedDashboard | PageId::Dashboard => &MetricCategory::ALL,
            PageId::Customers => &[MetricCategory::Customer],
            PageId::Invoices | PageId::Pricing => &[MetricCategory::Financial],
            PageId::Appointments | PageId::CallCenter => &[MetricCategory::Performance],
        }
    }

    /// Source whose rows are listed on the page
    pub fn table_source(&self) -> Option<SourceKey> {
        match self {
            PageId::EnhancedDashboard | PageId::Dashboard => None,
            PageId::Customers => Some(SourceKey::Customers),
            PageId::Invoices => Some(SourceKey::Invoices),
            PageId::Appointments => Some(SourceKey::Appointments),
            PageId::Pricing => Some(SourceKey::Pricing),
            PageId::CallCenter => Some(SourceKey::Calls),
        }
    }

    /// Only the enhanced dashboard shows source statuses and the activity feed
    pub fn is_enhanced(&self) -> bool {
        matches!(self, PageId::EnhancedDashboard)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationCard {
    pub label: &'static str,
    pub icon: &'static str,
    pub page: PageId,
    pub path: String,
    pub status: &'static str,
    pub color: &'static str,
}

impl NavigationCard {
    fn new(page: PageId, icon: &'static str, status: &'static str, color: &'static str) -> Self {
        Self {
            label: page.title(),
            icon,
            page,
            path: page.path(),
            status,
            color,
        }
    }
}

/// The sidebar, top to bottom
pub fn navigation_cards() -> Vec<NavigationCard> {
    vec![
        NavigationCard::new(PageId::EnhancedDashboard, "📊", "Comprehensive Analytics", "#4A90E2"),
        NavigationCard::new(PageId::Dashboard, "📈", "Overview & Analytics", "#4A90E2"),
        NavigationCard::new(PageId::Invoices, "📄", "Billing & Payments", "#F59E0B"),
        NavigationCard::new(PageId::Customers, "👥", "Client Management", "#8B5CF6"),
        NavigationCard::new(PageId::Appointments, "🕐", "Booking System", "#EC4899"),
        NavigationCard::new(PageId::Pricing, "💰", "Service Rates", "#F97316"),
        NavigationCard::new(PageId::CallCenter, "🎧", "Support Center", "#EF4444"),
    ]
}
