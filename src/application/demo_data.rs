// Placeholder business data for demo sessions and unconfigured sources
use crate::domain::source::SourceKey;
use crate::domain::table::SheetTable;
use chrono::{Duration, NaiveDate};

fn build(header: &[&str], rows: Vec<Vec<String>>) -> SheetTable {
    let mut grid = vec![header.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    grid.extend(rows);
    SheetTable::from_grid(grid)
}

fn day(as_of: NaiveDate, offset: i64) -> String {
    (as_of + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Demo rows for one source. Dates are relative to `as_of`.
pub fn demo_table(key: SourceKey, as_of: NaiveDate) -> SheetTable {
    match key {
        SourceKey::Customers => {
            let people = [
                ("John Doe", "Active", "5000", "Tech"),
                ("Jane Smith", "Active", "7500", "Healthcare"),
                ("Bob Johnson", "Inactive", "3000", "Finance"),
                ("Alice Brown", "Active", "12000", "Retail"),
                ("Charlie Wilson", "Pending", "4500", "Manufacturing"),
                ("Diana Prince", "Active", "8500", "Education"),
                ("Frank Castle", "Active", "6200", "Legal"),
                ("Grace Hopper", "Inactive", "2800", "Tech"),
                ("Henry Ford", "Active", "15000", "Automotive"),
                ("Ivy League", "Pending", "5800", "Consulting"),
            ];
            let rows = people
                .iter()
                .enumerate()
                .map(|(i, (name, status, value, industry))| {
                    let email = format!(
                        "{}@email.com",
                        name.split(' ').next().unwrap_or_default().to_lowercase()
                    );
                    vec![
                        name.to_string(),
                        email,
                        status.to_string(),
                        value.to_string(),
                        day(as_of, -(i as i64) * 10),
                        industry.to_string(),
                    ]
                })
                .collect();
            build(&["Name", "Email", "Status", "Value", "Date_Added", "Industry"], rows)
        }
        SourceKey::Pricing => build(
            &["Service", "Price", "Category", "Duration", "Popularity"],
            vec![
                strings(&["AI Consulting", "250", "Consulting", "2 hours", "85"]),
                strings(&["System Development", "350", "Development", "4 hours", "92"]),
                strings(&["Technical Support", "150", "Support", "1 hour", "78"]),
                strings(&["Training & Workshops", "200", "Education", "4 hours", "65"]),
                strings(&["Security Audit", "500", "Security", "1 day", "88"]),
                strings(&["Data Analytics", "300", "Analytics", "3 hours", "90"]),
                strings(&["Cloud Migration", "400", "Infrastructure", "2 days", "75"]),
                strings(&["API Integration", "275", "Integration", "3 hours", "82"]),
            ],
        ),
        SourceKey::Appointments => {
            let bookings = [
                ("John Doe", "Confirmed", "10:00 AM", "AI Consulting"),
                ("Jane Smith", "Pending", "2:00 PM", "System Development"),
                ("Bob Johnson", "Completed", "11:00 AM", "Technical Support"),
                ("Alice Brown", "Cancelled", "3:00 PM", "Training & Workshops"),
                ("Charlie Wilson", "Confirmed", "9:00 AM", "Security Audit"),
                ("Diana Prince", "Completed", "4:00 PM", "Data Analytics"),
            ];
            let rows = bookings
                .iter()
                .enumerate()
                .map(|(i, (name, status, start, service))| {
                    vec![
                        name.to_string(),
                        status.to_string(),
                        start.to_string(),
                        day(as_of, i as i64),
                        service.to_string(),
                    ]
                })
                .collect();
            build(&["Name", "Status", "Start Time (12hr)", "Date", "Service"], rows)
        }
        SourceKey::Calls => {
            let calls = [
                ("John Doe", "Yes", "300", "0.8", "15.50", "Outbound"),
                ("Jane Smith", "Yes", "450", "0.6", "22.75", "Inbound"),
                ("Bob Johnson", "No", "120", "-0.2", "6.00", "Outbound"),
                ("Alice Brown", "Yes", "600", "0.9", "30.00", "Inbound"),
                ("Charlie Wilson", "Yes", "380", "0.7", "19.00", "Outbound"),
                ("Diana Prince", "No", "90", "-0.1", "4.50", "Outbound"),
            ];
            let rows = calls
                .iter()
                .enumerate()
                .map(|(i, (name, success, secs, sentiment, cost, kind))| {
                    vec![
                        name.to_string(),
                        success.to_string(),
                        secs.to_string(),
                        sentiment.to_string(),
                        cost.to_string(),
                        day(as_of, -(i as i64)),
                        kind.to_string(),
                    ]
                })
                .collect();
            build(
                &[
                    "customer_name",
                    "call_success",
                    "call_duration_seconds",
                    "sentiment_score",
                    "cost",
                    "call_date",
                    "call_type",
                ],
                rows,
            )
        }
        SourceKey::Invoices => {
            let invoices = [
                ("INV-001", "John Doe", "1250", "Paid"),
                ("INV-002", "Jane Smith", "2100", "Pending"),
                ("INV-003", "Alice Brown", "750", "Paid"),
                ("INV-004", "Charlie Wilson", "1800", "Overdue"),
                ("INV-005", "Diana Prince", "950", "Paid"),
            ];
            let rows = invoices
                .iter()
                .enumerate()
                .map(|(i, (id, customer, amount, status))| {
                    let issued = -(i as i64) * 7;
                    vec![
                        id.to_string(),
                        customer.to_string(),
                        amount.to_string(),
                        status.to_string(),
                        day(as_of, issued),
                        day(as_of, issued + 30),
                    ]
                })
                .collect();
            build(&["Invoice_ID", "Customer", "Amount", "Status", "Date", "Due_Date"], rows)
        }
    }
}

/// Demo rows for every source
#[cfg(test)]
pub fn demo_business_data(as_of: NaiveDate) -> crate::application::business_metrics::BusinessData {
    SourceKey::ALL
        .into_iter()
        .map(|key| (key, demo_table(key, as_of)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_source_has_rows() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let data = demo_business_data(as_of);

        assert_eq!(data.len(), SourceKey::ALL.len());
        for (key, table) in &data {
            assert!(!table.is_empty(), "demo {:?} is empty", key);
        }
    }

    #[test]
    fn test_dates_follow_reference_day() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let customers = demo_table(SourceKey::Customers, as_of);

        assert_eq!(customers.cell(0, "Date_Added"), Some("2024-06-01"));
        assert_eq!(customers.cell(1, "Date_Added"), Some("2024-05-22"));
        assert_eq!(customers.cell(0, "Email"), Some("john@email.com"));
    }
}
