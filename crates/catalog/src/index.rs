use gradinsight_protocol::MetadataRow;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Sorted lookups over the university/degree catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogIndex {
    all_universities: BTreeSet<String>,
    all_degrees: BTreeSet<String>,
    degrees_by_university: BTreeMap<String, BTreeSet<String>>,
}

impl CatalogIndex {
    /// Build the index from metadata rows. Duplicate rows collapse.
    pub fn build(rows: &[MetadataRow]) -> Self {
        let mut index = Self::default();

        for row in rows {
            index.all_universities.insert(row.university.clone());
            index.all_degrees.insert(row.degree.clone());
            index
                .degrees_by_university
                .entry(row.university.clone())
                .or_default()
                .insert(row.degree.clone());
        }

        log::debug!(
            "Built catalog index: {} rows, {} universities, {} degrees",
            rows.len(),
            index.all_universities.len(),
            index.all_degrees.len()
        );

        index
    }

    /// Build from the legacy `/metadata/universities` and `/metadata/degrees` lists.
    ///
    /// Those endpoints carry no association, so no university offers any degree.
    pub fn from_legacy(universities: Vec<String>, degrees: Vec<String>) -> Self {
        let index = Self {
            all_universities: universities.into_iter().collect(),
            all_degrees: degrees.into_iter().collect(),
            degrees_by_university: BTreeMap::new(),
        };
        log::debug!(
            "Built legacy catalog index: {} universities, {} degrees",
            index.all_universities.len(),
            index.all_degrees.len()
        );
        index
    }

    pub fn all_universities(&self) -> impl Iterator<Item = &str> + '_ {
        self.all_universities.iter().map(String::as_str)
    }

    pub fn all_degrees(&self) -> impl Iterator<Item = &str> + '_ {
        self.all_degrees.iter().map(String::as_str)
    }

    /// Degrees offered by `university`, sorted. Empty for unknown universities.
    pub fn degrees_of(&self, university: &str) -> impl Iterator<Item = &str> + '_ {
        self.degrees_by_university
            .get(university)
            .into_iter()
            .flat_map(|degrees| degrees.iter().map(String::as_str))
    }

    pub fn contains_university(&self, university: &str) -> bool {
        self.all_universities.contains(university)
    }

    pub fn contains_degree(&self, degree: &str) -> bool {
        self.all_degrees.contains(degree)
    }

    pub fn university_count(&self) -> usize {
        self.all_universities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_universities.is_empty()
    }

    /// Sorted, distinct union of the degrees offered by `universities`.
    pub fn available_courses<'a, I>(&self, universities: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        universities
            .into_iter()
            .filter_map(|university| self.degrees_by_university.get(university))
            .flat_map(|degrees| degrees.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sample_rows() -> Vec<MetadataRow> {
        vec![
            MetadataRow::new("U1", "D1"),
            MetadataRow::new("U1", "D2"),
            MetadataRow::new("U2", "D1"),
        ]
    }

    fn strings(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn builds_sorted_lookups() {
        let mut rows = sample_rows();
        rows.reverse();
        rows.push(MetadataRow::new("U1", "D2"));
        let index = CatalogIndex::build(&rows);

        assert_eq!(index.all_universities().collect::<Vec<_>>(), vec!["U1", "U2"]);
        assert_eq!(index.all_degrees().collect::<Vec<_>>(), vec!["D1", "D2"]);
        assert_eq!(index.degrees_of("U1").collect::<Vec<_>>(), vec!["D1", "D2"]);
        assert_eq!(index.degrees_of("U3").count(), 0);
    }

    #[test]
    fn available_courses_unions_selected_universities() {
        let index = CatalogIndex::build(&sample_rows());
        assert_eq!(
            index.available_courses(&strings(&["U1"])),
            strings(&["D1", "D2"])
        );
        assert_eq!(
            index.available_courses(&strings(&["U2", "missing"])),
            strings(&["D1"])
        );
        assert!(index.available_courses(&BTreeSet::<String>::new()).is_empty());
    }

    #[test]
    fn legacy_index_has_no_associations() {
        let index = CatalogIndex::from_legacy(
            vec!["U2".to_string(), "U1".to_string()],
            vec!["D1".to_string()],
        );
        assert_eq!(index.all_universities().collect::<Vec<_>>(), vec!["U1", "U2"]);
        assert!(index.contains_degree("D1"));
        assert!(index.available_courses(&strings(&["U1", "U2"])).is_empty());
    }

    fn arb_rows() -> impl Strategy<Value = Vec<MetadataRow>> {
        prop::collection::vec(
            ("U[0-4]", "D[0-6]").prop_map(|(u, d)| MetadataRow::new(u, d)),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn proptest_universities_sorted_and_distinct(rows in arb_rows()) {
            let index = CatalogIndex::build(&rows);
            let listed: Vec<&str> = index.all_universities().collect();
            let mut expected: Vec<&str> = rows.iter().map(|r| r.university.as_str()).collect();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(listed, expected);
        }

        #[test]
        fn proptest_available_courses_backed_by_rows(
            rows in arb_rows(),
            picked in prop::collection::btree_set("U[0-5]", 0..4),
        ) {
            let index = CatalogIndex::build(&rows);
            let courses = index.available_courses(&picked);
            for course in &courses {
                prop_assert!(rows
                    .iter()
                    .any(|r| &r.degree == course && picked.contains(&r.university)));
            }
            prop_assert_eq!(index.available_courses(&picked), courses);
        }

        #[test]
        fn proptest_build_does_not_depend_on_row_order(rows in arb_rows()) {
            let mut reversed = rows.clone();
            reversed.reverse();
            prop_assert_eq!(CatalogIndex::build(&rows), CatalogIndex::build(&reversed));
        }
    }
}
