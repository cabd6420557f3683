// Metric aggregator - merges per-page metric groups into one summary
use crate::domain::metric::MetricGroup;
use crate::domain::summary::SummarySection;

/// Combine groups into sections ordered by first appearance.
///
/// A category seen twice is merged into its first section with the later
/// records appended. Labels are never deduplicated. An empty group still
/// produces a (possibly empty) section for its category.
pub fn aggregate<I>(groups: I) -> Vec<SummarySection>
where
    I: IntoIterator<Item = MetricGroup>,
{
    let mut sections: Vec<SummarySection> = Vec::new();

    for group in groups {
        match sections.iter_mut().find(|s| s.category == group.category) {
            Some(section) => section.records.extend(group.records),
            None => sections.push(SummarySection {
                category: group.category,
                records: group.records,
            }),
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::{MetricCategory, MetricRecord, MetricValue};

    fn record(category: MetricCategory, label: &str, n: u64) -> MetricRecord {
        MetricRecord::new(category, "•", label, MetricValue::Count(n))
    }

    #[test]
    fn test_preserves_group_order() {
        let sections = aggregate(vec![
            MetricGroup::new(MetricCategory::Performance, vec![record(MetricCategory::Performance, "a", 1)]),
            MetricGroup::new(MetricCategory::Financial, vec![record(MetricCategory::Financial, "b", 2)]),
        ]);

        let order: Vec<MetricCategory> = sections.iter().map(|s| s.category).collect();
        assert_eq!(order, vec![MetricCategory::Performance, MetricCategory::Financial]);
    }

    #[test]
    fn test_empty_group_gives_empty_section() {
        let sections = aggregate(vec![MetricGroup::empty(MetricCategory::Customer)]);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category, MetricCategory::Customer);
        assert!(sections[0].records.is_empty());
    }

    #[test]
    fn test_repeated_category_merges_and_keeps_duplicates() {
        let c = MetricCategory::Customer;
        let sections = aggregate(vec![
            MetricGroup::new(c, vec![record(c, "Total", 1)]),
            MetricGroup::new(MetricCategory::Financial, vec![]),
            MetricGroup::new(c, vec![record(c, "Total", 2)]),
        ]);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, c);
        let values: Vec<&MetricValue> = sections[0].records.iter().map(|r| &r.value).collect();
        assert_eq!(values, vec![&MetricValue::Count(1), &MetricValue::Count(2)]);
    }

    #[test]
    fn test_deterministic() {
        let groups = || {
            vec![
                MetricGroup::new(MetricCategory::Executive, vec![record(MetricCategory::Executive, "x", 3)]),
                MetricGroup::empty(MetricCategory::Performance),
            ]
        };
        assert_eq!(aggregate(groups()), aggregate(groups()));
    }

    #[test]
    fn test_no_groups() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
