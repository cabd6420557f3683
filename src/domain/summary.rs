// Dashboard summary domain model
use super::metric::{MetricCategory, MetricRecord};
use super::source::SourceStatus;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySection {
    pub category: MetricCategory,
    pub records: Vec<MetricRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub category: MetricCategory,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    pub fn new(
        id: &str,
        title: &str,
        kind: ChartKind,
        category: MetricCategory,
        points: Vec<(String, f64)>,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            category,
            points: points
                .into_iter()
                .map(|(label, value)| ChartPoint { label, value })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub date: String,
    pub icon: String,
    pub text: String,
}

/// Everything a single render pass needs. Rebuilt on every page view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub sections: Vec<SummarySection>,
    pub charts: Vec<ChartData>,
    pub activity: Vec<ActivityItem>,
    pub sources: Vec<SourceStatus>,
}

impl DashboardSummary {
    /// Records for a category; empty when the category has no section
    pub fn section(&self, category: MetricCategory) -> &[MetricRecord] {
        self.sections
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    pub fn charts_for(&self, category: MetricCategory) -> Vec<&ChartData> {
        self.charts.iter().filter(|c| c.category == category).collect()
    }
}
