// Business metrics - derives metric groups, charts and activity from sheet tables
use crate::domain::metric::{format_currency, MetricCategory, MetricGroup, MetricRecord, MetricValue};
use crate::domain::source::SourceKey;
use crate::domain::summary::{ActivityItem, ChartData, ChartKind};
use crate::domain::table::{parse_date, parse_number, SheetTable};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Tables loaded for one render pass, keyed by source
pub type BusinessData = BTreeMap<SourceKey, SheetTable>;

const MAX_ACTIVITY_ITEMS: usize = 8;
const NEW_CUSTOMER_WINDOW_DAYS: i64 = 30;

fn table(data: &BusinessData, key: SourceKey) -> Option<&SheetTable> {
    data.get(&key).filter(|t| !t.is_empty())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// One group per category, in display order. A record is only emitted when its
/// backing table is present, so a missing source leaves gaps rather than zeros.
pub fn compute_groups(data: &BusinessData, as_of: NaiveDate) -> Vec<MetricGroup> {
    vec![
        executive_group(data),
        financial_group(data),
        customer_group(data, as_of),
        performance_group(data),
    ]
}

fn executive_group(data: &BusinessData) -> MetricGroup {
    let cat = MetricCategory::Executive;
    let mut records = Vec::new();

    if let Some(customers) = table(data, SourceKey::Customers) {
        let active = customers.count_where("Status", "Active");
        records.push(
            MetricRecord::new(cat, "👥", "Total Customers", MetricValue::Count(customers.len() as u64))
                .with_delta(format!("+{} active", active)),
        );

        let revenue: f64 = customers.numeric_column("Value").iter().sum();
        let mut record = MetricRecord::new(cat, "💰", "Total Revenue", MetricValue::Currency(revenue));
        if let Some(avg_price) = table(data, SourceKey::Pricing).and_then(|p| mean(&p.numeric_column("Price"))) {
            record = record.with_delta(format!("Avg: ${:.0}", avg_price));
        }
        records.push(record);
    }

    if let Some(appointments) = table(data, SourceKey::Appointments) {
        let confirmed = appointments.count_where("Status", "Confirmed");
        records.push(
            MetricRecord::new(cat, "📅", "Appointments", MetricValue::Count(appointments.len() as u64))
                .with_delta(format!("{} confirmed", confirmed)),
        );
    }

    if let Some(calls) = table(data, SourceKey::Calls) {
        let successful = calls.count_where("call_success", "Yes");
        records.push(
            MetricRecord::new(cat, "📞", "Calls Made", MetricValue::Count(calls.len() as u64))
                .with_delta(format!("{:.1}% success", rate(successful, calls.len()))),
        );
    }

    if let Some(pricing) = table(data, SourceKey::Pricing) {
        let categories = pricing.value_counts("Category").len();
        records.push(
            MetricRecord::new(cat, "🛍️", "Services", MetricValue::Count(pricing.len() as u64))
                .with_delta(format!("{} categories", categories)),
        );
    }

    if let Some(invoices) = table(data, SourceKey::Invoices).filter(|t| t.has_column("Status")) {
        let outstanding: f64 = ["Pending", "Overdue"]
            .into_iter()
            .flat_map(|status| invoices.numeric_where("Amount", "Status", status))
            .sum();
        let overdue = invoices.count_where("Status", "Overdue");
        records.push(
            MetricRecord::new(cat, "📋", "Outstanding", MetricValue::Currency(outstanding))
                .with_delta(format!("{} overdue", overdue)),
        );
    }

    MetricGroup::new(cat, records)
}

fn financial_group(data: &BusinessData) -> MetricGroup {
    let cat = MetricCategory::Financial;
    let mut records = Vec::new();

    let customer_values = table(data, SourceKey::Customers)
        .map(|c| c.numeric_column("Value"))
        .unwrap_or_default();
    if let Some(avg) = mean(&customer_values) {
        records.push(
            MetricRecord::new(
                cat,
                "💎",
                "Customer Value",
                MetricValue::Currency(customer_values.iter().sum()),
            )
            .with_delta(format!("Avg: {}", format_currency(avg))),
        );
    }

    if let Some(invoices) = table(data, SourceKey::Invoices).filter(|t| t.has_column("Amount")) {
        let paid = invoices.numeric_where("Amount", "Status", "Paid");
        records.push(
            MetricRecord::new(
                cat,
                "📄",
                "Invoice Revenue",
                MetricValue::Currency(paid.iter().sum()),
            )
            .with_delta(format!("{} of {} paid", paid.len(), invoices.len())),
        );
    }

    let prices = table(data, SourceKey::Pricing)
        .map(|p| p.numeric_column("Price"))
        .unwrap_or_default();
    if let Some(max) = prices.iter().copied().reduce(f64::max) {
        records.push(
            MetricRecord::new(
                cat,
                "🛍️",
                "Service Portfolio",
                MetricValue::Currency(prices.iter().sum()),
            )
            .with_delta(format!("Max: {}", format_currency(max))),
        );
    }

    let costs = table(data, SourceKey::Calls)
        .map(|c| c.numeric_column("cost"))
        .unwrap_or_default();
    if let Some(avg) = mean(&costs) {
        records.push(
            MetricRecord::new(cat, "📞", "Call Costs", MetricValue::Currency(costs.iter().sum()))
                .with_delta(format!("Avg: ${:.2}", avg)),
        );
    }

    let total_costs: f64 = costs.iter().sum();
    if total_costs > 0.0 {
        let revenue: f64 = customer_values.iter().sum();
        let roi = (revenue - total_costs) / total_costs * 100.0;
        records.push(
            MetricRecord::new(cat, "📈", "ROI", MetricValue::Percent(roi)).with_delta("Revenue vs Costs"),
        );
    }

    MetricGroup::new(cat, records)
}

fn customer_group(data: &BusinessData, as_of: NaiveDate) -> MetricGroup {
    let cat = MetricCategory::Customer;
    let Some(customers) = table(data, SourceKey::Customers) else {
        return MetricGroup::empty(cat);
    };

    let total = customers.len();
    let mut records = vec![MetricRecord::new(
        cat,
        "👥",
        "Total Customers",
        MetricValue::Count(total as u64),
    )];

    if customers.has_column("Status") {
        let active = customers.count_where("Status", "Active");
        records.push(
            MetricRecord::new(cat, "✅", "Active Customers", MetricValue::Count(active as u64))
                .with_delta(format!("{:.1}%", rate(active, total))),
        );
    }

    if let Some(avg) = mean(&customers.numeric_column("Value")) {
        records.push(MetricRecord::new(
            cat,
            "💰",
            "Avg Customer Value",
            MetricValue::Currency(avg),
        ));
    }

    if let Some(dates) = customers.column("Date_Added") {
        let cutoff = as_of - Duration::days(NEW_CUSTOMER_WINDOW_DAYS);
        let recent = dates
            .into_iter()
            .filter_map(parse_date)
            .filter(|d| *d > cutoff)
            .count();
        records.push(MetricRecord::new(
            cat,
            "🆕",
            "New (30 days)",
            MetricValue::Count(recent as u64),
        ));
    }

    MetricGroup::new(cat, records)
}

fn performance_group(data: &BusinessData) -> MetricGroup {
    let cat = MetricCategory::Performance;
    let mut records = Vec::new();
    let calls = table(data, SourceKey::Calls);

    if let Some(calls) = calls.filter(|t| t.has_column("call_success")) {
        let successful = calls.count_where("call_success", "Yes");
        records.push(
            MetricRecord::new(
                cat,
                "📞",
                "Call Success Rate",
                MetricValue::Percent(rate(successful, calls.len())),
            )
            .with_delta(format!("{}/{}", successful, calls.len())),
        );
    }

    if let Some(appointments) = table(data, SourceKey::Appointments).filter(|t| t.has_column("Status")) {
        let confirmed = appointments.count_where("Status", "Confirmed");
        records.push(
            MetricRecord::new(
                cat,
                "📅",
                "Confirmation Rate",
                MetricValue::Percent(rate(confirmed, appointments.len())),
            )
            .with_delta(format!("{}/{}", confirmed, appointments.len())),
        );
    }

    if let Some(customers) = table(data, SourceKey::Customers).filter(|t| t.has_column("Status")) {
        let active = customers.count_where("Status", "Active");
        records.push(
            MetricRecord::new(
                cat,
                "👥",
                "Customer Retention",
                MetricValue::Percent(rate(active, customers.len())),
            )
            .with_delta(format!("{}/{}", active, customers.len())),
        );
    }

    if let Some(avg) = table(data, SourceKey::Pricing).and_then(|p| mean(&p.numeric_column("Popularity"))) {
        records.push(MetricRecord::new(
            cat,
            "🛍️",
            "Avg Service Rating",
            MetricValue::Text(format!("{:.1}/100", avg)),
        ));
    }

    if let Some(avg) = calls.and_then(|c| mean(&c.numeric_column("sentiment_score"))) {
        records.push(
            MetricRecord::new(cat, "😊", "Avg Sentiment", MetricValue::Decimal(avg))
                .with_delta(sentiment_label(avg)),
        );
    }

    MetricGroup::new(cat, records)
}

fn sentiment_label(score: f64) -> &'static str {
    if score > 0.5 {
        "Positive"
    } else if score > 0.0 {
        "Neutral"
    } else {
        "Negative"
    }
}

pub fn compute_charts(data: &BusinessData) -> Vec<ChartData> {
    let mut charts = Vec::new();

    if let Some(customers) = table(data, SourceKey::Customers) {
        let counts = customers.value_counts("Status");
        if !counts.is_empty() {
            charts.push(ChartData::new(
                "customer-status",
                "Customer Status Distribution",
                ChartKind::Pie,
                MetricCategory::Customer,
                counts.into_iter().map(|(label, n)| (label, n as f64)).collect(),
            ));
        }
    }

    if let Some(pricing) = table(data, SourceKey::Pricing) {
        let averages = average_by(pricing, "Category", "Price");
        if !averages.is_empty() {
            charts.push(ChartData::new(
                "price-by-category",
                "Average Service Price by Category",
                ChartKind::Bar,
                MetricCategory::Financial,
                averages,
            ));
        }
    }

    let revenue_sources: Vec<(String, f64)> = [
        (SourceKey::Customers, "Customer Value"),
        (SourceKey::Invoices, "Invoice Revenue"),
        (SourceKey::Pricing, "Service Portfolio"),
    ]
    .into_iter()
    .filter_map(|(key, label)| {
        let t = table(data, key)?;
        let total: f64 = match key {
            SourceKey::Customers => t.numeric_column("Value").iter().sum(),
            SourceKey::Invoices => t.numeric_where("Amount", "Status", "Paid").iter().sum(),
            _ => t.numeric_column("Price").iter().sum(),
        };
        Some((label.to_string(), total))
    })
    .collect();
    if !revenue_sources.is_empty() {
        charts.push(ChartData::new(
            "revenue-by-source",
            "Revenue by Source",
            ChartKind::Bar,
            MetricCategory::Financial,
            revenue_sources,
        ));
    }

    if let Some(pricing) = table(data, SourceKey::Pricing) {
        let popularity = service_popularity(pricing);
        if !popularity.is_empty() {
            charts.push(ChartData::new(
                "service-popularity",
                "Service Popularity Ratings",
                ChartKind::Bar,
                MetricCategory::Performance,
                popularity,
            ));
        }
    }

    if let Some(calls) = table(data, SourceKey::Calls) {
        let durations = calls.numeric_column("call_duration_seconds");
        if !durations.is_empty() {
            charts.push(ChartData::new(
                "call-durations",
                "Call Duration Distribution",
                ChartKind::Bar,
                MetricCategory::Performance,
                duration_bins(&durations),
            ));
        }
    }

    charts
}

/// Mean of `value_column` grouped by `group_column`, groups in first-seen order
fn average_by(table: &SheetTable, group_column: &str, value_column: &str) -> Vec<(String, f64)> {
    let (Some(groups), Some(values)) = (table.column(group_column), table.column(value_column)) else {
        return Vec::new();
    };

    let mut sums: Vec<(String, f64, usize)> = Vec::new();
    for (group, value) in groups.into_iter().zip(values) {
        let Some(value) = parse_number(value) else {
            continue;
        };
        match sums.iter_mut().find(|(g, _, _)| g == group) {
            Some((_, sum, n)) => {
                *sum += value;
                *n += 1;
            }
            None => sums.push((group.to_string(), value, 1)),
        }
    }

    sums.into_iter()
        .map(|(group, sum, n)| (group, sum / n as f64))
        .collect()
}

/// One point per service with a numeric popularity score, in sheet order
fn service_popularity(pricing: &SheetTable) -> Vec<(String, f64)> {
    let (Some(services), Some(scores)) = (pricing.column("Service"), pricing.column("Popularity")) else {
        return Vec::new();
    };

    services
        .into_iter()
        .zip(scores)
        .filter_map(|(service, score)| Some((service.to_string(), parse_number(score)?)))
        .collect()
}

fn duration_bins(seconds: &[f64]) -> Vec<(String, f64)> {
    let mut bins = [0usize; 4];
    for &s in seconds {
        let idx = match s {
            s if s <= 120.0 => 0,
            s if s <= 300.0 => 1,
            s if s <= 600.0 => 2,
            _ => 3,
        };
        bins[idx] += 1;
    }

    ["0-2 min", "2-5 min", "5-10 min", "10+ min"]
        .into_iter()
        .zip(bins)
        .map(|(label, n)| (label.to_string(), n as f64))
        .collect()
}

/// Newest customers then newest appointments
pub fn recent_activity(data: &BusinessData) -> Vec<ActivityItem> {
    let mut items = Vec::new();

    if let Some(customers) = table(data, SourceKey::Customers) {
        for (row, date) in customers.rows_by_date_desc("Date_Added").into_iter().take(3) {
            let name = customers.cell(row, "Name").unwrap_or("Unknown");
            items.push(ActivityItem {
                date: date.format("%Y-%m-%d").to_string(),
                icon: "👥".to_string(),
                text: format!("New customer: {}", name),
            });
        }
    }

    if let Some(appointments) = table(data, SourceKey::Appointments) {
        for (row, date) in appointments.rows_by_date_desc("Date").into_iter().take(2) {
            let name = appointments.cell(row, "Name").unwrap_or("Unknown");
            let status = appointments.cell(row, "Status").unwrap_or("Unknown");
            items.push(ActivityItem {
                date: date.format("%Y-%m-%d").to_string(),
                icon: "📅".to_string(),
                text: format!("Appointment with {} - {}", name, status),
            });
        }
    }

    items.truncate(MAX_ACTIVITY_ITEMS);
    items
}
