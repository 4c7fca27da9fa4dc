//! Participant naming: identifiers, collation and deduplication.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, TimeZone};

use crate::model::Trip;

/// Characters of the name kept in a participant identifier.
const ID_NAME_CHARS: usize = 5;

/// Build a participant identifier: `p-<millis>-<name slug>`.
///
/// The slug is the first five non-whitespace characters, lowercased.
#[must_use]
pub fn generate_participant_id<Tz: TimeZone>(name: &str, now: &DateTime<Tz>) -> String {
    let slug: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .take(ID_NAME_CHARS)
        .collect();
    format!("p-{}-{slug}", now.timestamp_millis())
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(fold_char)
}

fn accent_marks(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| c != fold_char(c))
}

fn case_marks(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().flat_map(|c| {
        let upper = c.is_uppercase();
        c.to_lowercase().map(move |_| upper)
    })
}

/// Compare two names the way a Portuguese reader expects.
///
/// Letters are compared first with accents and case folded away. Ties go to
/// the unaccented name (`Alvaro` before `álvaro`), then to the lowercase one
/// (`ana` before `Ana`). A plain comparison keeps the order total.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(fold(b))
        .then_with(|| accent_marks(a).cmp(accent_marks(b)))
        .then_with(|| case_marks(a).cmp(case_marks(b)))
        .then_with(|| a.cmp(b))
}

/// Every distinct participant name across `trips`, sorted by [`collate`].
pub fn unique_names<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names: Vec<String> = trips
        .into_iter()
        .flat_map(|t| &t.participants)
        .filter(|p| seen.insert(p.name.as_str()))
        .map(|p| p.name.clone())
        .collect();
    names.sort_by(|a, b| collate(a, b));
    names
}

/// Split free text into names, one per line, trimmed and non-empty.
#[must_use]
pub fn parse_name_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Merge name lists, keeping the first occurrence of each name.
pub fn merge_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            merged.push(name.to_string());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Participant, TripType};
    use chrono::Utc;

    fn trip(names: &[&str]) -> Trip {
        Trip::new(
            "Segunda-feira (06/01)".to_string(),
            TripType::Ida,
            names
                .iter()
                .map(|n| Participant::new(format!("id-{n}"), (*n).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_generate_participant_id() {
        let now = Utc.timestamp_millis_opt(1_736_150_400_123).unwrap();
        assert_eq!(
            generate_participant_id("João Silva", &now),
            "p-1736150400123-joãos"
        );
        assert_eq!(generate_participant_id("Al", &now), "p-1736150400123-al");
    }

    #[test]
    fn test_collate_ignores_accents_and_case() {
        assert_eq!(collate("álvaro", "Alvaro"), Ordering::Greater);
        assert_eq!(collate("Álvaro", "Bruno"), Ordering::Less);
        assert_eq!(collate("bruno", "Carla"), Ordering::Less);
        assert_eq!(collate("Ana", "Ana"), Ordering::Equal);
    }

    #[test]
    fn test_collate_breaks_ties_unaccented_then_lowercase_first() {
        assert_eq!(collate("ana", "Ana"), Ordering::Less);
        assert_eq!(collate("Alvaro", "álvaro"), Ordering::Less);
        assert_eq!(collate("álvaro", "Ana"), Ordering::Less);

        let mut names = vec!["Ana", "ana", "Bruno", "álvaro", "Alvaro"];
        names.sort_by(|a, b| collate(a, b));
        assert_eq!(names, vec!["Alvaro", "álvaro", "ana", "Ana", "Bruno"]);
    }

    #[test]
    fn test_unique_names_across_trips() {
        let trips = [trip(&["Carla", "Ana"]), trip(&["ana", "Ana", "Bruno"])];
        assert_eq!(
            unique_names(&trips),
            vec!["ana", "Ana", "Bruno", "Carla"]
        );
    }

    #[test]
    fn test_unique_names_empty() {
        assert!(unique_names(&[] as &[Trip]).is_empty());
    }

    #[test]
    fn test_parse_name_list() {
        let names = parse_name_list("  Ana \n\nBruno\r\n   \nCarla");
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);
    }

    #[test]
    fn test_merge_names_keeps_first_occurrence() {
        let merged = merge_names(["Bruno", "Ana", " Bruno ", "", "Carla", "Ana"]);
        assert_eq!(merged, vec!["Bruno", "Ana", "Carla"]);
    }
}
