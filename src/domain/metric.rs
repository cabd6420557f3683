// Metric domain models
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Executive,
    Financial,
    Customer,
    Performance,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 4] = [
        MetricCategory::Executive,
        MetricCategory::Financial,
        MetricCategory::Customer,
        MetricCategory::Performance,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MetricCategory::Executive => "Executive Summary",
            MetricCategory::Financial => "Financial Overview",
            MetricCategory::Customer => "Customer Insights",
            MetricCategory::Performance => "Performance Analytics",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MetricCategory::Executive => "📊",
            MetricCategory::Financial => "💰",
            MetricCategory::Customer => "👥",
            MetricCategory::Performance => "📈",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Count(u64),
    Currency(f64),
    Percent(f64),
    Decimal(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", group_thousands(&n.to_string())),
            MetricValue::Currency(v) => write!(f, "{}", format_currency(*v)),
            MetricValue::Percent(v) => write!(f, "{:.1}%", v),
            MetricValue::Decimal(v) => write!(f, "{:.2}", v),
            MetricValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub label: String,
    pub icon: String,
    pub value: MetricValue,
    pub category: MetricCategory,
    pub delta: Option<String>,
}

impl MetricRecord {
    pub fn new(category: MetricCategory, icon: &str, label: &str, value: MetricValue) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            value,
            category,
            delta: None,
        }
    }

    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }

    pub fn display_value(&self) -> String {
        self.value.to_string()
    }
}

/// A category's metrics as produced by one page's computation, before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGroup {
    pub category: MetricCategory,
    pub records: Vec<MetricRecord>,
}

impl MetricGroup {
    pub fn new(category: MetricCategory, records: Vec<MetricRecord>) -> Self {
        Self { category, records }
    }

    pub fn empty(category: MetricCategory) -> Self {
        Self::new(category, Vec::new())
    }
}

/// Format as dollars with thousands separators and two decimals: `$12,345.60`
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), frac)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(MetricValue::Count(1234567).to_string(), "1,234,567");
        assert_eq!(MetricValue::Count(12).to_string(), "12");
        assert_eq!(MetricValue::Currency(57300.0).to_string(), "$57,300.00");
        assert_eq!(MetricValue::Currency(-15.5).to_string(), "-$15.50");
        assert_eq!(MetricValue::Percent(66.666).to_string(), "66.7%");
        assert_eq!(MetricValue::Decimal(0.4533).to_string(), "0.45");
    }

    #[test]
    fn test_record_delta() {
        let record = MetricRecord::new(
            MetricCategory::Customer,
            "👥",
            "Total Customers",
            MetricValue::Count(10),
        )
        .with_delta("+6 active");

        assert_eq!(record.display_value(), "10");
        assert_eq!(record.delta.as_deref(), Some("+6 active"));
    }
}
