//! Property tests for the compatibility checker
//!
//! Random catalogs and selections are checked against a straightforward
//! set-based model of each rule.

#[cfg(test)]
mod tests {
    use crate::reporting::{
        catalog::{Catalog, FieldKind, ReportingField},
        compat_checker::CompatChecker,
        error::ReportingError,
    };
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const MAX_FIELDS: usize = 6;

    fn dimension_id(index: usize) -> String {
        format!("DIM_{}", index)
    }

    fn metric_id(index: usize) -> String {
        format!("MET_{}", index)
    }

    /// Catalog with random compatibility groups over a small id space
    fn arb_catalog() -> impl Strategy<Value = Catalog> {
        (1..MAX_FIELDS, 1..MAX_FIELDS).prop_flat_map(|(dimension_count, metric_count)| {
            let dimension_ids: Vec<String> = (0..dimension_count).map(dimension_id).collect();
            let metric_ids: Vec<String> = (0..metric_count).map(metric_id).collect();

            let groups = (
                prop::sample::subsequence(dimension_ids.clone(), 0..=dimension_count),
                prop::sample::subsequence(metric_ids.clone(), 0..=metric_count),
            );

            (
                prop::collection::vec(groups.clone(), dimension_count),
                prop::collection::vec(groups, metric_count),
            )
                .prop_map(|(dimension_groups, metric_groups)| {
                    let dimensions = dimension_groups
                        .into_iter()
                        .enumerate()
                        .map(|(i, (dims, mets))| {
                            ReportingField::new(dimension_id(i))
                                .with_compatible_dimensions(dims)
                                .with_compatible_metrics(mets)
                        })
                        .collect();
                    let metrics = metric_groups
                        .into_iter()
                        .enumerate()
                        .map(|(i, (dims, mets))| {
                            ReportingField::new(metric_id(i))
                                .with_compatible_dimensions(dims)
                                .with_compatible_metrics(mets)
                        })
                        .collect();
                    Catalog::new(dimensions, metrics).unwrap()
                })
        })
    }

    /// Selection that may reference ids missing from the catalog
    fn arb_selection(to_id: fn(usize) -> String) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(0..MAX_FIELDS, 0..4)
            .prop_map(move |indexes| indexes.into_iter().map(to_id).collect::<Vec<String>>())
    }

    fn group(ids: &[String]) -> BTreeSet<&str> {
        ids.iter().map(String::as_str).collect()
    }

    fn is_subset(selection: &[String], ids: &[String]) -> bool {
        let group = group(ids);
        selection.iter().all(|id| group.contains(id.as_str()))
    }

    fn model_shared_group(catalog: &Catalog, seed: &ReportingField, selection: &[String]) -> bool {
        let mut common = group(&seed.compatible_dimensions);
        for id in selection {
            match catalog.dimension(id) {
                Some(other) => {
                    let other = group(&other.compatible_dimensions);
                    common = common.intersection(&other).copied().collect();
                }
                None => return false,
            }
        }
        !common.is_empty()
    }

    fn model_dimensions_compatible(catalog: &Catalog, selection: &[String]) -> bool {
        match selection.first() {
            None => true,
            Some(first) => match catalog.dimension(first) {
                Some(seed) => model_shared_group(catalog, seed, selection),
                None => false,
            },
        }
    }

    fn model_metrics_compatible(catalog: &Catalog, selection: &[String]) -> bool {
        selection.iter().all(|id| match catalog.metric(id) {
            Some(metric) => is_subset(selection, &metric.compatible_metrics),
            None => false,
        })
    }

    proptest! {
        #[test]
        fn prop_dimension_with_metrics_is_containment(
            catalog in arb_catalog(),
            candidate in 0..MAX_FIELDS,
            metrics in arb_selection(metric_id),
        ) {
            let checker = CompatChecker::new(&catalog);
            let candidate = dimension_id(candidate);

            let expected = catalog
                .dimension(&candidate)
                .map(|d| is_subset(&metrics, &d.compatible_metrics))
                .unwrap_or(false);
            let actual = checker.is_dimension_compatible_with_metrics(&candidate, &metrics);
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_metric_with_dimensions_is_containment(
            catalog in arb_catalog(),
            candidate in 0..MAX_FIELDS,
            dimensions in arb_selection(dimension_id),
        ) {
            let checker = CompatChecker::new(&catalog);
            let candidate = metric_id(candidate);

            let expected = catalog
                .metric(&candidate)
                .map(|m| is_subset(&dimensions, &m.compatible_dimensions))
                .unwrap_or(false);
            let actual = checker.is_metric_compatible_with_dimensions(&candidate, &dimensions);
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_dimensions_need_common_group(
            catalog in arb_catalog(),
            dimensions in arb_selection(dimension_id),
        ) {
            let checker = CompatChecker::new(&catalog);
            prop_assert_eq!(
                checker.are_dimensions_compatible(&dimensions),
                model_dimensions_compatible(&catalog, &dimensions)
            );
        }

        #[test]
        fn prop_candidate_dimension_needs_common_group(
            catalog in arb_catalog(),
            candidate in 0..MAX_FIELDS,
            dimensions in arb_selection(dimension_id),
        ) {
            let checker = CompatChecker::new(&catalog);
            let candidate = dimension_id(candidate);

            let expected = catalog
                .dimension(&candidate)
                .map(|seed| model_shared_group(&catalog, seed, &dimensions))
                .unwrap_or(false);
            prop_assert_eq!(
                checker.is_dimension_compatible_with_dimensions(&candidate, &dimensions),
                expected
            );
        }

        #[test]
        fn prop_metrics_need_groupwise_containment(
            catalog in arb_catalog(),
            metrics in arb_selection(metric_id),
        ) {
            let checker = CompatChecker::new(&catalog);
            prop_assert_eq!(
                checker.are_metrics_compatible(&metrics),
                model_metrics_compatible(&catalog, &metrics)
            );
        }

        #[test]
        fn prop_queries_are_pure(
            catalog in arb_catalog(),
            metrics in arb_selection(metric_id),
            dimensions in arb_selection(dimension_id),
        ) {
            let snapshot: Vec<ReportingField> = catalog.dimensions().to_vec();
            let checker = CompatChecker::new(&catalog);

            let first = checker.are_metrics_and_dimensions_compatible(&metrics, &dimensions);
            let second = checker.are_metrics_and_dimensions_compatible(&metrics, &dimensions);

            prop_assert_eq!(first, second);
            prop_assert_eq!(catalog.dimensions(), snapshot.as_slice());
        }

        #[test]
        fn prop_check_selection_agrees_with_boolean_queries(
            catalog in arb_catalog(),
            metrics in arb_selection(metric_id),
            dimensions in arb_selection(dimension_id),
        ) {
            let checker = CompatChecker::new(&catalog);
            let unknown = dimensions
                .iter()
                .map(|id| (FieldKind::Dimension, id))
                .chain(metrics.iter().map(|id| (FieldKind::Metric, id)))
                .find(|(kind, id)| !catalog.contains(*kind, id));

            match (checker.check_selection(&metrics, &dimensions), unknown) {
                (Ok(report), None) => {
                    let dimensions_ok = checker.are_dimensions_compatible(&dimensions);
                    let metrics_ok = checker.are_metrics_compatible(&metrics);
                    prop_assert_eq!(report.dimensions_compatible, dimensions_ok);
                    prop_assert_eq!(report.metrics_compatible, metrics_ok);

                    let pairs_ok = dimensions
                        .iter()
                        .all(|d| checker.is_dimension_compatible_with_metrics(d, &metrics));
                    prop_assert_eq!(report.incompatible_pairs.is_empty(), pairs_ok);
                }
                (Err(ReportingError::UnknownField { kind, id }), Some((want_kind, want_id))) => {
                    prop_assert_eq!(kind, want_kind);
                    prop_assert_eq!(&id, want_id);
                }
                (result, unknown) => {
                    prop_assert!(false, "unexpected {:?} for unknown id {:?}", result, unknown);
                }
            }
        }
    }
}
