//! Both filename formats must extract the same facet values from the same
//! semantic content.

use cci_ingest::parse_filename;
use cci_model::FacetKind;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn token() -> impl Strategy<Value = String> {
    // '-' is the delimiter and '_' joins level and project in Format 1, so
    // generated tokens avoid both; "ESACCI" is the format marker
    "[A-Z][A-Z0-9]{1,8}".prop_filter("marker token", |s| s != "ESACCI")
}

fn date() -> impl Strategy<Value = String> {
    (1980u32..2030, 1u32..13, 1u32..29)
        .prop_map(|(y, m, d)| format!("{y:04}{m:02}{d:02}"))
}

fn version() -> impl Strategy<Value = String> {
    (0u32..10, 0u32..100).prop_map(|(major, minor)| format!("{major}.{minor}"))
}

proptest! {
    #[test]
    fn formats_agree_on_shared_facets(
        date in date(),
        level in "L[0-9][A-Z]?",
        project in token(),
        data_type in token(),
        product in token(),
        segregator in proptest::option::of(token()),
        fv in version(),
    ) {
        let seg1 = segregator
            .as_deref()
            .map(|s| format!("-{s}"))
            .unwrap_or_default();
        let format_1 = format!(
            "{date}-ESACCI-{level}_{project}-{data_type}-{product}{seg1}-fv{fv}.nc"
        );
        let format_2 = format!(
            "ESACCI-{project}-{level}-{data_type}-{product}{seg1}-{date}-fv{fv}.nc"
        );

        let one = parse_filename(&format_1)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let two = parse_filename(&format_2)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        for facet in [
            FacetKind::ProcessingLevel,
            FacetKind::CciProject,
            FacetKind::DataType,
            FacetKind::ProductString,
            FacetKind::IndicativeDate,
            FacetKind::FileVersion,
            FacetKind::Segregator,
        ] {
            prop_assert_eq!(one.get(facet), two.get(facet), "facet {}", facet);
        }
    }

    #[test]
    fn dropping_the_fv_token_never_parses(
        date in date(),
        level in "L[0-9]",
        project in token(),
        data_type in token(),
        product in token(),
    ) {
        let name = format!("{date}-ESACCI-{level}_{project}-{data_type}-{product}.nc");
        prop_assert!(parse_filename(&name).is_err());
    }
}
