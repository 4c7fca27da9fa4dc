//! Week naming and calendar helpers.
//!
//! Generated week names embed the start date (`Semana 06/01/2025 - 10/01/2025`),
//! which is what lets archived weeks be placed back on a calendar later.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::names::collate;

/// Weekday names indexed from Sunday.
pub const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

/// Month names indexed from January.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Days between the first and last day of a generated week.
const WEEK_SPAN_DAYS: u64 = 4;

fn week_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Semana (\d{2})/(\d{2})/(\d{4})").expect("Invalid regex pattern")
    })
}

/// Format a date as `DD/MM/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Build the name of the week starting on `start`.
#[must_use]
pub fn generate_week_name(start: NaiveDate) -> String {
    let end = start
        .checked_add_days(Days::new(WEEK_SPAN_DAYS))
        .unwrap_or(start);
    format!("Semana {} - {}", format_date(start), format_date(end))
}

/// Build a week name from an ISO `YYYY-MM-DD` date string.
///
/// Returns `None` for an empty or unparseable string.
#[must_use]
pub fn generate_week_name_from_iso(start: &str) -> Option<String> {
    let start = start.trim();
    if start.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .ok()
        .map(generate_week_name)
}

/// Recover the start date from a generated week name.
///
/// The `Semana DD/MM/YYYY` marker may appear anywhere in the name, so
/// archive names with a suffix still resolve.
#[must_use]
pub fn parse_week_start(name: &str) -> Option<NaiveDate> {
    let caps = week_start_regex().captures(name)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Label a trip day, e.g. `Segunda-feira (15/01)`.
#[must_use]
pub fn trip_day_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    format!("{weekday} ({})", date.format("%d/%m"))
}

/// Position of a weekday name in the week, Sunday first.
#[must_use]
pub fn weekday_index(name: &str) -> Option<usize> {
    WEEKDAYS.iter().position(|d| *d == name)
}

/// A week as listed in the archive tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekEntry {
    /// Week name (archive key or active name).
    pub name: String,
    /// Start date parsed from the name, if it is a generated name.
    pub start: Option<NaiveDate>,
    /// Whether this is the active week.
    pub active: bool,
}

/// Weeks starting in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Month display name.
    pub label: &'static str,
    /// Weeks ordered by start date.
    pub weeks: Vec<WeekEntry>,
}

/// Weeks starting in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGroup {
    /// Calendar year.
    pub year: i32,
    /// Months in ascending order.
    pub months: Vec<MonthGroup>,
}

/// Every known week, grouped by year and month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekTree {
    /// Dated weeks, years ascending.
    pub years: Vec<YearGroup>,
    /// Weeks whose names carry no start date, sorted by name.
    pub other: Vec<WeekEntry>,
}

impl WeekTree {
    /// Group `names` into a tree, flagging `active` where it appears.
    ///
    /// The active name is added when it is not already among `names`,
    /// unless it is the default placeholder.
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>, active: &str) -> Self {
        let mut all: Vec<&str> = names.into_iter().collect();
        if active != crate::model::DEFAULT_WEEK_NAME && !all.contains(&active) {
            all.push(active);
        }

        let mut dated = Vec::new();
        let mut other = Vec::new();
        for name in all {
            let entry = WeekEntry {
                name: name.to_string(),
                start: parse_week_start(name),
                active: name == active,
            };
            if entry.start.is_some() {
                dated.push(entry);
            } else {
                other.push(entry);
            }
        }

        // Stable sort keeps insertion order for weeks sharing a start date
        dated.sort_by_key(|w| w.start);
        other.sort_by(|a, b| collate(&a.name, &b.name));

        let mut grouped: BTreeMap<i32, BTreeMap<u32, Vec<WeekEntry>>> = BTreeMap::new();
        for entry in dated {
            let Some(start) = entry.start else { continue };
            grouped
                .entry(start.year())
                .or_default()
                .entry(start.month())
                .or_default()
                .push(entry);
        }

        let years = grouped
            .into_iter()
            .map(|(year, months)| YearGroup {
                year,
                months: months
                    .into_iter()
                    .map(|(month, weeks)| MonthGroup {
                        month,
                        label: MONTH_NAMES[(month - 1) as usize],
                        weeks,
                    })
                    .collect(),
            })
            .collect();

        Self { years, other }
    }

    /// Total number of weeks in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        let dated: usize = self
            .years
            .iter()
            .flat_map(|y| &y.months)
            .map(|m| m.weeks.len())
            .sum();
        dated + self.other.len()
    }

    /// Check if the tree holds no weeks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_date_pads() {
        assert_eq!(format_date(date(2025, 3, 7)), "07/03/2025");
    }

    #[test]
    fn test_generate_week_name() {
        assert_eq!(
            generate_week_name(date(2025, 1, 6)),
            "Semana 06/01/2025 - 10/01/2025"
        );
    }

    #[test]
    fn test_generate_week_name_crosses_month_and_year() {
        assert_eq!(
            generate_week_name(date(2024, 12, 29)),
            "Semana 29/12/2024 - 02/01/2025"
        );
        assert_eq!(
            generate_week_name(date(2024, 2, 27)),
            "Semana 27/02/2024 - 02/03/2024"
        );
    }

    #[test]
    fn test_generate_week_name_from_iso() {
        assert_eq!(
            generate_week_name_from_iso("2025-01-06").as_deref(),
            Some("Semana 06/01/2025 - 10/01/2025")
        );
        assert!(generate_week_name_from_iso("").is_none());
        assert!(generate_week_name_from_iso("   ").is_none());
        assert!(generate_week_name_from_iso("06/01/2025").is_none());
    }

    #[test]
    fn test_parse_week_start() {
        assert_eq!(
            parse_week_start("Semana 06/01/2025 - 10/01/2025"),
            Some(date(2025, 1, 6))
        );
    }

    #[test]
    fn test_parse_week_start_with_archive_suffix() {
        let name = "Semana 06/01/2025 - 10/01/2025 (Arq. 12/01/2025-042)";
        assert_eq!(parse_week_start(name), Some(date(2025, 1, 6)));
    }

    #[test]
    fn test_parse_week_start_rejects_other_names() {
        assert!(parse_week_start("Semana Atual").is_none());
        assert!(parse_week_start("Férias").is_none());
        assert!(parse_week_start("Semana 6/1/2025").is_none());
        assert!(parse_week_start("Semana 31/02/2025 - 04/03/2025").is_none());
    }

    #[test]
    fn test_generated_name_parses_back() {
        let start = date(2025, 6, 30);
        assert_eq!(parse_week_start(&generate_week_name(start)), Some(start));
    }

    #[test]
    fn test_trip_day_label() {
        assert_eq!(trip_day_label(date(2025, 1, 6)), "Segunda-feira (06/01)");
        assert_eq!(trip_day_label(date(2025, 1, 5)), "Domingo (05/01)");
        assert_eq!(trip_day_label(date(2025, 1, 11)), "Sábado (11/01)");
    }

    #[test]
    fn test_weekday_index() {
        assert_eq!(weekday_index("Domingo"), Some(0));
        assert_eq!(weekday_index("Sábado"), Some(6));
        assert_eq!(weekday_index("Feriado"), None);
    }

    #[test]
    fn test_tree_groups_by_year_and_month() {
        let names = [
            "Semana 03/02/2025 - 07/02/2025",
            "Semana 06/01/2025 - 10/01/2025",
            "Semana 30/12/2024 - 03/01/2025",
            "Semana 13/01/2025 - 17/01/2025",
        ];
        let tree = WeekTree::build(names, "Semana Atual");

        assert_eq!(tree.len(), 4);
        let years: Vec<i32> = tree.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2024, 2025]);

        let jan = &tree.years[1].months[0];
        assert_eq!(jan.month, 1);
        assert_eq!(jan.label, "Janeiro");
        let jan_names: Vec<&str> = jan.weeks.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(
            jan_names,
            vec![
                "Semana 06/01/2025 - 10/01/2025",
                "Semana 13/01/2025 - 17/01/2025"
            ]
        );
        assert_eq!(tree.years[1].months[1].label, "Fevereiro");
    }

    #[test]
    fn test_tree_includes_active_week_once() {
        let active = "Semana 06/01/2025 - 10/01/2025";
        let tree = WeekTree::build(Vec::<&str>::new(), active);
        assert_eq!(tree.len(), 1);
        assert!(tree.years[0].months[0].weeks[0].active);

        let tree = WeekTree::build([active], active);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_tree_skips_default_active_week() {
        let tree = WeekTree::build(Vec::<&str>::new(), DEFAULT_NAME);
        assert!(tree.is_empty());
    }

    const DEFAULT_NAME: &str = crate::model::DEFAULT_WEEK_NAME;

    #[test]
    fn test_tree_undated_sorted_by_collation() {
        let tree = WeekTree::build(["Zebra", "álbum", "Abril"], DEFAULT_NAME);
        let names: Vec<&str> = tree.other.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Abril", "álbum", "Zebra"]);
        assert!(tree.years.is_empty());
    }
}
