// Business data sources backed by spreadsheets
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKey {
    Customers,
    Pricing,
    Appointments,
    Calls,
    Invoices,
}

impl SourceKey {
    pub const ALL: [SourceKey; 5] = [
        SourceKey::Customers,
        SourceKey::Pricing,
        SourceKey::Appointments,
        SourceKey::Calls,
        SourceKey::Invoices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::Customers => "customers",
            SourceKey::Pricing => "pricing",
            SourceKey::Appointments => "appointments",
            SourceKey::Calls => "calls",
            SourceKey::Invoices => "invoices",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceKey::Customers => "Customer Management Data",
            SourceKey::Pricing => "Service Pricing & Catalog",
            SourceKey::Appointments => "Appointment Scheduling",
            SourceKey::Calls => "Call Center Operations",
            SourceKey::Invoices => "Invoice & Billing Data",
        }
    }
}

/// Where a source's rows live. An empty `sheet_id` means the source is not configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetSource {
    pub key: SourceKey,
    #[serde(default)]
    pub sheet_id: String,
    #[serde(default)]
    pub worksheet: Option<String>,
}

impl SheetSource {
    pub fn new(key: SourceKey, sheet_id: &str, worksheet: Option<&str>) -> Self {
        Self {
            key,
            sheet_id: extract_sheet_id(sheet_id),
            worksheet: worksheet.filter(|w| !w.is_empty()).map(str::to_string),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.sheet_id.trim().is_empty()
    }

    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}",
            extract_sheet_id(&self.sheet_id),
            self.worksheet.as_deref().unwrap_or("default")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    Loaded,
    Empty,
    Failed { message: String },
    Demo,
    DemoFallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatus {
    pub key: SourceKey,
    #[serde(flatten)]
    pub state: LoadState,
    pub records: usize,
    pub columns: usize,
}

impl SourceStatus {
    pub fn new(key: SourceKey, state: LoadState, records: usize, columns: usize) -> Self {
        Self {
            key,
            state,
            records,
            columns,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.state {
            LoadState::Loaded => "✅",
            LoadState::Empty => "⚠️",
            LoadState::Failed { .. } => "❌",
            LoadState::Demo => "🎯",
            LoadState::DemoFallback { .. } => "⚠️",
        }
    }
}

/// Accept either a bare spreadsheet id or a full `.../d/<id>/edit` URL
pub fn extract_sheet_id(url_or_id: &str) -> String {
    let trimmed = url_or_id.trim();
    if !trimmed.contains('/') {
        return trimmed.to_string();
    }

    match trimmed.split_once("/d/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default().to_string(),
        None => trimmed.to_string(),
    }
}
