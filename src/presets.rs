//! Built-in document-type configurations.
//!
//! One preset per report kind the pipeline was built for: the BMD monthly
//! temperature / humidity / rainfall normals, the two-page boro-season
//! variants, and the BBS crop-yield tables. Each returns a partially-built
//! [`ExtractionConfigBuilder`] so callers can still layer on a page
//! override, password, or progress callback before `build()`.
//!
//! The station lists and their alias tables come from diffing the spellings
//! across several report years (the same station appears as `Cox's Bazar`,
//! `CoxsBazar`, and `Cox' Bazar` depending on the document), so treat them
//! as data to be extended rather than exhaustive truth.

use crate::config::{
    AggregateSpec, ColumnSpec, DocumentLayout, ExtractionConfig, ExtractionConfigBuilder,
    PageGroup, PageSelection,
};
use crate::registry::{MatchPolicy, Station, StationRegistry};

/// Month columns of the BMD monthly normals, in table order.
const MONTHS_MAR_DEC: [&str; 10] = [
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The 28 BMD surface observation stations, in the canonical dataset order.
fn weather_stations() -> Vec<Station> {
    vec![
        Station::new("Barishal"),
        Station::new("Bhola"),
        Station::new("Patuakhali"),
        Station::new("Chandpur"),
        Station::with_aliases("Ambagan(Ctg)", ["Ambagan", "Ambagan(ctg)"]),
        Station::with_aliases("Cumilla", ["Comilla"]),
        Station::with_aliases("Cox's Bazar", ["CoxsBazar", "Cox' Bazar", "Cox'sBazar"]),
        Station::new("Feni"),
        Station::with_aliases("M.court", ["Mcourt", "M.Court"]),
        Station::new("Rangamati"),
        Station::new("Dhaka"),
        Station::new("Faridpur"),
        Station::new("Madaripur"),
        Station::new("Tangail"),
        Station::new("Mongla"),
        Station::new("Chuadanga"),
        Station::with_aliases("Jashore", ["Jessore"]),
        Station::new("Khulna"),
        Station::new("Satkhira"),
        Station::with_aliases("Mymensingh", ["Mymenshing"]),
        Station::with_aliases("Bogura", ["Bogra"]),
        Station::with_aliases("Ishwardi", ["Ishurdi"]),
        Station::new("Rajshahi"),
        Station::new("Dinajpur"),
        Station::with_aliases("Syedpur", ["Saidpur"]),
        Station::new("Rangpur"),
        Station::with_aliases("Srimangal", ["Sreemangal"]),
        Station::new("Sylhet"),
    ]
}

/// The 28 BBS crop reporting regions, in the canonical dataset order.
fn crop_regions() -> Vec<Station> {
    vec![
        Station::with_aliases("Barishal", ["Barisal"]),
        Station::new("Bhola"),
        Station::new("Patuakhali"),
        Station::new("Chandpur"),
        Station::with_aliases("Chattogram", ["Chittagong"]),
        Station::with_aliases("Cumilla", ["Comilla"]),
        Station::with_aliases("Cox's Bazar", ["Cox' Bazar", "CoxsBazar"]),
        Station::new("Feni"),
        Station::new("Noakhali"),
        Station::new("Rangamati"),
        Station::new("Dhaka"),
        Station::new("Faridpur"),
        Station::new("Madaripur"),
        Station::new("Tangail"),
        Station::new("Bagerhat"),
        Station::new("Chuadanga"),
        Station::with_aliases("Jashore", ["Jessore"]),
        Station::new("Khulna"),
        Station::new("Satkhira"),
        Station::with_aliases("Mymensingh", ["Mymenshing"]),
        Station::with_aliases("Bogura", ["Bogra"]),
        Station::new("Pabna"),
        Station::new("Rajshahi"),
        Station::new("Dinajpur"),
        Station::new("Nilphamari"),
        Station::new("Rangpur"),
        Station::with_aliases("Hobigonj", ["Habiganj"]),
        Station::new("Sylhet"),
    ]
}

/// Shared shape of the three monthly-normals presets.
///
/// Layout: every page scanned, station lines of at least 12 tokens, data
/// columns March–December starting at token 3 (the layout prints two
/// annual summary columns between the station name and March). The written
/// dataset keeps only the three seasonal means.
fn monthly() -> ExtractionConfigBuilder {
    let registry = StationRegistry::new(weather_stations(), MatchPolicy::CaseInsensitive);
    let columns = MONTHS_MAR_DEC
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnSpec::new(*name, 0, i))
        .collect();
    let layout = DocumentLayout::StationLines {
        groups: vec![PageGroup {
            pages: PageSelection::All,
            data_start: 3,
            min_tokens: 12,
        }],
        columns,
    };

    ExtractionConfig::builder(registry, layout)
        .aggregates([
            AggregateSpec::new("March-August", MONTHS_MAR_DEC[..6].iter().copied()),
            AggregateSpec::new("June-December", MONTHS_MAR_DEC[3..].iter().copied()),
            AggregateSpec::new("March-December", MONTHS_MAR_DEC),
        ])
        .output_columns(["March-August", "June-December", "March-December"])
}

/// Monthly mean temperature report (aman season, March–December).
pub fn monthly_temperature() -> ExtractionConfigBuilder {
    monthly()
}

/// Monthly mean relative humidity report.
pub fn monthly_humidity() -> ExtractionConfigBuilder {
    monthly()
}

/// Monthly total rainfall report.
pub fn monthly_rainfall() -> ExtractionConfigBuilder {
    monthly()
}

/// Shared shape of the two boro-season presets: one crop season spanning
/// November–December of `first_year` (page 1) and January–June of
/// `second_year` (page 2), interleaved into a single 8-column row.
fn boro_season(
    first_year: u16,
    second_year: u16,
    data_start: usize,
    min_tokens: usize,
) -> ExtractionConfigBuilder {
    let registry = StationRegistry::new(weather_stations(), MatchPolicy::CaseInsensitive);

    let first = |month: &str| format!("{first_year}_{month}");
    let second = |month: &str| format!("{second_year}_{month}");

    let columns = vec![
        // Months 11–12 of the first calendar page…
        ColumnSpec::new(first("November"), 0, 10),
        ColumnSpec::new(first("December"), 0, 11),
        // …followed by months 1–6 of the second.
        ColumnSpec::new(second("January"), 1, 0),
        ColumnSpec::new(second("February"), 1, 1),
        ColumnSpec::new(second("March"), 1, 2),
        ColumnSpec::new(second("April"), 1, 3),
        ColumnSpec::new(second("May"), 1, 4),
        ColumnSpec::new(second("June"), 1, 5),
    ];
    let group = |page: usize| PageGroup {
        pages: PageSelection::Single(page),
        data_start,
        min_tokens,
    };
    let layout = DocumentLayout::StationLines {
        groups: vec![group(1), group(2)],
        columns,
    };

    let sowing_to_harvest = AggregateSpec::new(
        format!("Nov{}-May{}", first_year % 100, second_year % 100),
        [
            first("November"),
            first("December"),
            second("January"),
            second("February"),
            second("March"),
            second("April"),
            second("May"),
        ],
    );
    let transplant_to_harvest = AggregateSpec::new(
        format!("Dec{}-June{}", first_year % 100, second_year % 100),
        [
            first("December"),
            second("January"),
            second("February"),
            second("March"),
            second("April"),
            second("May"),
            second("June"),
        ],
    );

    ExtractionConfig::builder(registry, layout).aggregates([sowing_to_harvest, transplant_to_harvest])
}

/// Boro-season temperature: two-page merged report, Year column before the
/// monthly values (`data_start = 2`).
pub fn boro_temperature(first_year: u16, second_year: u16) -> ExtractionConfigBuilder {
    boro_season(first_year, second_year, 2, 14)
}

/// Boro-season rainfall: two-page merged report, monthly values directly
/// after the station name. The published temperature and rainfall layouts
/// genuinely differ here; verify against a sample document when onboarding
/// a new report year.
pub fn boro_rainfall(first_year: u16, second_year: u16) -> ExtractionConfigBuilder {
    boro_season(first_year, second_year, 1, 12)
}

/// Crop-yield tables: filter table rows by region across the first 18
/// pages (fewer when the report is shorter), keep matching rows verbatim,
/// write headerless.
pub fn crop_yield() -> ExtractionConfigBuilder {
    let registry = StationRegistry::new(crop_regions(), MatchPolicy::Substring);
    ExtractionConfig::builder(
        registry,
        DocumentLayout::FilteredTables {
            pages: PageSelection::UpTo(18),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentLayout;

    #[test]
    fn all_presets_build() {
        monthly_temperature().build().unwrap();
        monthly_humidity().build().unwrap();
        monthly_rainfall().build().unwrap();
        boro_temperature(2016, 2017).build().unwrap();
        boro_rainfall(2018, 2019).build().unwrap();
        crop_yield().build().unwrap();
    }

    #[test]
    fn monthly_projects_to_seasonal_aggregates() {
        let config = monthly_temperature().build().unwrap();
        assert_eq!(config.registry.len(), 28);
        assert_eq!(
            config.output_columns.as_deref(),
            Some(&["March-August".to_string(), "June-December".into(), "March-December".into()][..])
        );
    }

    #[test]
    fn monthly_aggregate_ranges_cover_expected_months() {
        let config = monthly_rainfall().build().unwrap();
        let march_august = &config.aggregates[0];
        assert_eq!(march_august.over.first().map(String::as_str), Some("March"));
        assert_eq!(march_august.over.last().map(String::as_str), Some("August"));
        assert_eq!(march_august.over.len(), 6);
        let june_december = &config.aggregates[1];
        assert_eq!(june_december.over.first().map(String::as_str), Some("June"));
        assert_eq!(june_december.over.len(), 7);
    }

    #[test]
    fn boro_columns_interleave_pages_with_year_labels() {
        let config = boro_temperature(2016, 2017).build().unwrap();
        assert_eq!(
            config.data_columns(),
            vec![
                "2016_November",
                "2016_December",
                "2017_January",
                "2017_February",
                "2017_March",
                "2017_April",
                "2017_May",
                "2017_June",
            ]
        );
        assert_eq!(config.aggregates[0].name, "Nov16-May17");
        assert_eq!(config.aggregates[1].name, "Dec16-June17");
    }

    #[test]
    fn boro_variants_differ_only_in_offsets() {
        let temp = boro_temperature(2016, 2017).build().unwrap();
        let rain = boro_rainfall(2016, 2017).build().unwrap();
        let starts = |c: &crate::config::ExtractionConfig| match &c.layout {
            DocumentLayout::StationLines { groups, .. } => {
                (groups[0].data_start, groups[0].min_tokens)
            }
            _ => unreachable!(),
        };
        assert_eq!(starts(&temp), (2, 14));
        assert_eq!(starts(&rain), (1, 12));
        assert_eq!(temp.data_columns(), rain.data_columns());
    }

    #[test]
    fn weather_registry_resolves_known_spelling_drift() {
        let config = monthly_temperature().build().unwrap();
        let coxs = config.registry.match_token("CoxsBazar");
        assert_eq!(coxs, config.registry.match_token("Cox's Bazar"));
        assert_eq!(coxs, config.registry.match_token("cox' bazar"));
        assert_eq!(
            config.registry.match_token("chandpur"),
            config.registry.match_token("Chandpur")
        );
        assert_eq!(
            config.registry.match_token("Mcourt"),
            config.registry.match_token("M.court")
        );
    }

    #[test]
    fn crop_registry_matches_embedded_region_names() {
        let config = crop_yield().build().unwrap();
        let tangail = config.registry.match_token("Tangail");
        assert_eq!(config.registry.match_token("Tangail Region"), tangail);
        assert_eq!(
            config.registry.match_token("Bogra"),
            config.registry.match_token("Bogura")
        );
        assert!(config.registry.match_token("Total").is_none());
    }
}
