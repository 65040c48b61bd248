use crate::models::{CustomerRecord, Dataset};

/// Free-text search over name, account, meter number, municipality and brand.
///
/// The query is trimmed and lowercased once. Name, municipality and brand are
/// compared lowercased; account and meter number are compared as stored. A
/// record matches when any one field contains the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    /// Normalised query text
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// An empty query lets every record through.
    pub fn is_pass_through(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, record: &CustomerRecord) -> bool {
        if self.is_pass_through() {
            return true;
        }

        let needle = self.needle.as_str();
        record.name.to_lowercase().contains(needle)
            || record.account.contains(needle)
            || record.meter_number.contains(needle)
            || record.municipality.to_lowercase().contains(needle)
            || record.meter_brand.to_lowercase().contains(needle)
    }

    /// Return the matching subset as a new dataset, keeping input order.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if self.is_pass_through() {
            return dataset.clone();
        }

        let records = dataset
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();
        Dataset::from_validated(records)
    }
}

/// Convenience wrapper for a one-off search
pub fn filter_dataset(dataset: &Dataset, query: &str) -> Dataset {
    SearchFilter::new(query).apply(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerRecordBuilder;
    use pretty_assertions::assert_eq;

    fn sample_dataset() -> Dataset {
        let records = vec![
            CustomerRecordBuilder::new()
                .name("Ana Ruiz")
                .account("456")
                .municipality("Duitama")
                .meter("M-001", "Elster")
                .coordinates(5.8, -73.0)
                .build()
                .unwrap(),
            CustomerRecordBuilder::new()
                .name("Juan Perez")
                .account("123")
                .municipality("Tunja")
                .meter("XK-778", "ITRON")
                .coordinates(5.53, -73.36)
                .build()
                .unwrap(),
            CustomerRecordBuilder::new()
                .name("Ferretería El Sol")
                .account("AB-99")
                .municipality("Sogamoso")
                .meter("998877", "Landis+Gyr")
                .coordinates(5.71, -72.93)
                .build()
                .unwrap(),
        ];
        Dataset::from_records(records).unwrap()
    }

    fn names(dataset: &Dataset) -> Vec<&str> {
        dataset.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let dataset = sample_dataset();

        assert_eq!(filter_dataset(&dataset, ""), dataset);
        assert_eq!(filter_dataset(&dataset, "   \t"), dataset);
    }

    #[test]
    fn test_municipality_match_is_case_insensitive() {
        let dataset = sample_dataset();

        assert_eq!(names(&filter_dataset(&dataset, "duit")), vec!["Ana Ruiz"]);
        assert_eq!(names(&filter_dataset(&dataset, "  DUIT  ")), vec!["Ana Ruiz"]);
    }

    #[test]
    fn test_each_field_is_searched() {
        let dataset = sample_dataset();

        assert_eq!(names(&filter_dataset(&dataset, "perez")), vec!["Juan Perez"]);
        assert_eq!(names(&filter_dataset(&dataset, "456")), vec!["Ana Ruiz"]);
        assert_eq!(names(&filter_dataset(&dataset, "9988")), vec!["Ferretería El Sol"]);
        assert_eq!(names(&filter_dataset(&dataset, "itron")), vec!["Juan Perez"]);
        assert_eq!(names(&filter_dataset(&dataset, "tunja")), vec!["Juan Perez"]);
        assert_eq!(names(&filter_dataset(&dataset, "FERRETERÍA")), vec!["Ferretería El Sol"]);
    }

    #[test]
    fn test_matches_are_or_across_fields() {
        let dataset = sample_dataset();

        // "a" appears somewhere in every record
        assert_eq!(filter_dataset(&dataset, "a").len(), 3);
        // "123" only in an account, "001" only in a meter number
        assert_eq!(names(&filter_dataset(&dataset, "1")), vec!["Ana Ruiz", "Juan Perez"]);
    }

    #[test]
    fn test_account_and_meter_compare_as_stored() {
        let dataset = sample_dataset();

        // The lowercased query cannot match upper-case letters in these fields
        assert!(filter_dataset(&dataset, "ab-99").is_empty());
        assert!(filter_dataset(&dataset, "xk-778").is_empty());
    }

    #[test]
    fn test_query_is_not_a_pattern() {
        let dataset = sample_dataset();

        assert!(filter_dataset(&dataset, "m-.*").is_empty());
        assert_eq!(names(&filter_dataset(&dataset, "landis+")), vec!["Ferretería El Sol"]);
    }

    #[test]
    fn test_no_match_yields_empty_dataset() {
        let dataset = sample_dataset();

        let result = filter_dataset(&dataset, "zzz-nomatch-999");
        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent_and_sound() {
        let dataset = sample_dataset();

        for query in ["a", "duit", "M-0", "el", "5", "zzz"] {
            let filter = SearchFilter::new(query);
            let once = filter.apply(&dataset);
            let twice = filter.apply(&once);
            assert_eq!(once, twice, "query {:?}", query);

            for record in &once {
                assert!(filter.matches(record));
            }
        }
    }
}
