//! Core ledger types for carpool.
//!
//! This module defines the trip and participant records that make up a week,
//! along with the constants shared by every other module.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fare charged per paid participant, in reais.
pub const PAYMENT_VALUE: f64 = 30.00;

/// Name of the placeholder week that is active before any week is created.
pub const DEFAULT_WEEK_NAME: &str = "Semana Atual";

/// Key under which the whole ledger blob is stored.
pub const STORAGE_KEY: &str = "carona_payment_data_v4";

/// JSON key holding the active week's trips.
pub const ACTIVE_TRIPS_KEY: &str = "active_trips";

/// JSON key holding the active week's name.
pub const CURRENT_WEEK_KEY: &str = "currentWeekName";

/// Direction of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripType {
    /// Outbound leg.
    Ida,
    /// Return leg.
    Volta,
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ida => write!(f, "Ida"),
            Self::Volta => write!(f, "Volta"),
        }
    }
}

/// Someone riding a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier, unique within its trip.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the fare for this trip has been paid.
    #[serde(default)]
    pub paid: bool,
}

impl Participant {
    /// Create an unpaid participant.
    #[must_use]
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            paid: false,
        }
    }
}

/// A single carpool leg on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Display label, e.g. `Segunda-feira (15/01)`.
    pub day: String,
    /// Departure time. Never set by this tool, preserved on round-trips.
    #[serde(default)]
    pub time: Option<String>,
    /// Direction of the trip.
    #[serde(rename = "type")]
    pub trip_type: TripType,
    /// Riders, in the order they were added.
    #[serde(default)]
    pub participants: Vec<Participant>,
}

fn day_month_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d{2})/(\d{2})\)").expect("Invalid regex pattern"))
}

impl Trip {
    /// Create a trip with no departure time.
    #[must_use]
    pub fn new(day: String, trip_type: TripType, participants: Vec<Participant>) -> Self {
        Self {
            day,
            time: None,
            trip_type,
            participants,
        }
    }

    /// Number of participants who have paid.
    #[must_use]
    pub fn paid_count(&self) -> usize {
        self.participants.iter().filter(|p| p.paid).count()
    }

    /// The weekday part of the label (`Segunda-feira` in `Segunda-feira (15/01)`).
    #[must_use]
    pub fn weekday(&self) -> &str {
        self.day.split(' ').next().unwrap_or_default()
    }

    /// Resolve the `(DD/MM)` part of the label to a date in `year`.
    #[must_use]
    pub fn calendar_date(&self, year: i32) -> Option<NaiveDate> {
        let caps = day_month_regex().captures(&self.day)?;
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// A trip is past due once its date is strictly before `today`.
    #[must_use]
    pub fn is_past_due(&self, year: i32, today: NaiveDate) -> bool {
        self.calendar_date(year).is_some_and(|date| date < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(day: &str) -> Trip {
        Trip::new(day.to_string(), TripType::Ida, Vec::new())
    }

    #[test]
    fn test_trip_type_display() {
        assert_eq!(TripType::Ida.to_string(), "Ida");
        assert_eq!(TripType::Volta.to_string(), "Volta");
    }

    #[test]
    fn test_trip_wire_format() {
        let t = Trip::new(
            "Segunda-feira (06/01)".to_string(),
            TripType::Volta,
            vec![Participant::new("p-1-ana".to_string(), "Ana".to_string())],
        );
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["type"], "Volta");
        assert_eq!(value["time"], serde_json::Value::Null);
        assert_eq!(value["participants"][0]["paid"], false);
        assert!(value.get("trip_type").is_none());
    }

    #[test]
    fn test_trip_deserialize_missing_optional_fields() {
        let json = r#"{"day": "Terça-feira (07/01)", "type": "Ida"}"#;
        let t: Trip = serde_json::from_str(json).unwrap();
        assert!(t.time.is_none());
        assert!(t.participants.is_empty());
    }

    #[test]
    fn test_trip_type_rejects_unknown_direction() {
        let json = r#"{"day": "x", "type": "Sideways", "participants": []}"#;
        assert!(serde_json::from_str::<Trip>(json).is_err());
    }

    #[test]
    fn test_paid_count() {
        let mut t = trip("Quarta-feira (08/01)");
        t.participants = vec![
            Participant::new("a".to_string(), "A".to_string()),
            Participant::new("b".to_string(), "B".to_string()),
        ];
        t.participants[1].paid = true;
        assert_eq!(t.paid_count(), 1);
    }

    #[test]
    fn test_weekday() {
        assert_eq!(trip("Sexta-feira (10/01)").weekday(), "Sexta-feira");
        assert_eq!(trip("").weekday(), "");
    }

    #[test]
    fn test_calendar_date() {
        let t = trip("Quinta-feira (09/01)");
        assert_eq!(
            t.calendar_date(2025),
            NaiveDate::from_ymd_opt(2025, 1, 9)
        );
        assert!(trip("Sábado").calendar_date(2025).is_none());
        assert!(trip("Domingo (31/02)").calendar_date(2025).is_none());
    }

    #[test]
    fn test_is_past_due() {
        let t = trip("Segunda-feira (06/01)");
        let today = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert!(t.is_past_due(2025, today));
        assert!(!t.is_past_due(2025, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()));
        assert!(!trip("no date").is_past_due(2025, today));
    }
}
