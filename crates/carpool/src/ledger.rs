//! The root state container.
//!
//! A [`Ledger`] holds the active week (its name and trips) plus every archived
//! week keyed by name. Every operation here is a pure in-memory transformation;
//! callers persist the whole ledger after each mutation.
//!
//! On the wire a ledger is a single JSON object: `active_trips`,
//! `currentWeekName`, and one extra key per archived week.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{
    Participant, Trip, TripType, ACTIVE_TRIPS_KEY, CURRENT_WEEK_KEY, DEFAULT_WEEK_NAME,
};
use crate::names::{self, generate_participant_id};
use crate::week::{self, WeekTree};

/// How to treat malformed sections when reading a ledger from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Reject the document (used for user-supplied backups).
    Strict,
    /// Drop the malformed section with a warning (used for the local store).
    Lenient,
}

/// Outcome of switching the active week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekChange {
    /// Archive key the previous active week was moved to, if it was archived.
    pub archived: Option<String>,
    /// Name of the week that is now active.
    pub active: String,
}

/// Payment totals for the active week.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Stats {
    /// Participants marked as paid, counted once per trip.
    pub payers: usize,
    /// Participants across all trips.
    pub participants: usize,
    /// `payers` times the fare.
    pub total_received: f64,
}

/// Active trips sharing a day label.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DayGroup {
    /// The shared day label.
    pub day: String,
    /// Indices of outbound trips into the active trip list.
    pub ida: Vec<usize>,
    /// Indices of return trips into the active trip list.
    pub volta: Vec<usize>,
}

/// Carpool ledger: the active week plus archived weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    active_trips: Vec<Trip>,
    current_week_name: String,
    archives: BTreeMap<String, Vec<Trip>>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            active_trips: Vec::new(),
            current_week_name: DEFAULT_WEEK_NAME.to_string(),
            archives: BTreeMap::new(),
        }
    }
}

fn is_reserved_key(name: &str) -> bool {
    name == ACTIVE_TRIPS_KEY || name == CURRENT_WEEK_KEY
}

fn count_as_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

impl Ledger {
    /// Create an empty ledger on the default week.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips of the active week.
    #[must_use]
    pub fn active_trips(&self) -> &[Trip] {
        &self.active_trips
    }

    /// Name of the active week.
    #[must_use]
    pub fn current_week_name(&self) -> &str {
        &self.current_week_name
    }

    /// Whether the active week is the default placeholder.
    #[must_use]
    pub fn is_default_week(&self) -> bool {
        self.current_week_name == DEFAULT_WEEK_NAME
    }

    /// Archived weeks keyed by name.
    #[must_use]
    pub fn archives(&self) -> &BTreeMap<String, Vec<Trip>> {
        &self.archives
    }

    /// Trips of an archived week.
    #[must_use]
    pub fn archive(&self, name: &str) -> Option<&[Trip]> {
        self.archives.get(name).map(Vec::as_slice)
    }

    /// All weeks grouped by year and month.
    #[must_use]
    pub fn week_tree(&self) -> WeekTree {
        WeekTree::build(
            self.archives.keys().map(String::as_str),
            &self.current_week_name,
        )
    }

    /// Every participant name ever recorded, active and archived.
    #[must_use]
    pub fn unique_names(&self) -> Vec<String> {
        names::unique_names(
            self.active_trips
                .iter()
                .chain(self.archives.values().flatten()),
        )
    }

    fn is_key_taken(&self, name: &str) -> bool {
        is_reserved_key(name) || self.archives.contains_key(name)
    }

    fn archive_key_for(&self, name: &str, now: &DateTime<Local>) -> String {
        if name != DEFAULT_WEEK_NAME && !self.is_key_taken(name) {
            return name.to_string();
        }
        let base = format!(
            "{name} (Arq. {}-{:03})",
            now.format("%d/%m/%Y"),
            now.timestamp_subsec_millis() % 1000
        );
        let mut key = base.clone();
        let mut n = 2;
        while self.is_key_taken(&key) {
            key = format!("{base} #{n}");
            n += 1;
        }
        key
    }

    /// Move the active week into the archives if there is anything to keep.
    ///
    /// The active week is archived when it has trips, or when it carries a
    /// non-default name that is not already archived. Afterwards the default
    /// week is active. Returns the archive key used.
    pub fn auto_archive_current(&mut self, now: &DateTime<Local>) -> Option<String> {
        let name = self.current_week_name.clone();
        let named_and_unsaved = name != DEFAULT_WEEK_NAME && !self.archives.contains_key(&name);
        if self.active_trips.is_empty() && !named_and_unsaved {
            return None;
        }

        let key = self.archive_key_for(&name, now);
        let trips = std::mem::take(&mut self.active_trips);
        debug!(week = %name, key = %key, trips = trips.len(), "archiving active week");
        self.archives.insert(key.clone(), trips);
        self.current_week_name = DEFAULT_WEEK_NAME.to_string();
        Some(key)
    }

    /// Start a new week beginning on `start`, archiving the active one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeekExists`] if the generated name is already archived.
    /// The ledger is unchanged on error.
    pub fn create_week(&mut self, start: NaiveDate, now: &DateTime<Local>) -> Result<WeekChange> {
        let name = week::generate_week_name(start);
        let mut next = self.clone();
        let archived = next.auto_archive_current(now);
        if next.archives.contains_key(&name) {
            return Err(Error::week_exists(name));
        }
        next.current_week_name.clone_from(&name);
        next.active_trips.clear();
        *self = next;
        info!(week = %name, "started new week");
        Ok(WeekChange {
            archived,
            active: name,
        })
    }

    /// Make `name` the active week, archiving the current one first.
    ///
    /// Selecting the default name starts an empty placeholder week.
    /// Selecting the week that is already active changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeekNotFound`] if `name` is neither archived nor the
    /// default name.
    pub fn select_week(&mut self, name: &str, now: &DateTime<Local>) -> Result<WeekChange> {
        if name == self.current_week_name {
            return Ok(WeekChange {
                archived: None,
                active: name.to_string(),
            });
        }
        if name != DEFAULT_WEEK_NAME && !self.archives.contains_key(name) {
            return Err(Error::week_not_found(name));
        }

        let archived = self.auto_archive_current(now);
        self.active_trips = if name == DEFAULT_WEEK_NAME {
            Vec::new()
        } else {
            self.archives.remove(name).unwrap_or_default()
        };
        self.current_week_name = name.to_string();
        info!(week = %name, "loaded week");
        Ok(WeekChange {
            archived,
            active: name.to_string(),
        })
    }

    /// Delete a week permanently.
    ///
    /// Deleting the active week clears its trips and returns to the default
    /// week; archived weeks are removed outright.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeekNotFound`] for an unknown name.
    pub fn delete_week(&mut self, name: &str) -> Result<()> {
        if name == self.current_week_name {
            self.active_trips.clear();
            self.current_week_name = DEFAULT_WEEK_NAME.to_string();
        } else if self.archives.remove(name).is_none() {
            return Err(Error::week_not_found(name));
        }
        info!(week = %name, "deleted week");
        Ok(())
    }

    /// Rename the active week. Returns the trimmed name that was applied.
    ///
    /// # Errors
    ///
    /// Fails when the active week is the default placeholder, when the name is
    /// blank or reserved, or when an archived week already has that name.
    pub fn rename_active_week(&mut self, new_name: &str) -> Result<String> {
        if self.is_default_week() {
            return Err(Error::DefaultWeekRename);
        }
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::invalid_input("week name", "must not be blank"));
        }
        if is_reserved_key(new_name) {
            return Err(Error::invalid_input(
                "week name",
                format!("\"{new_name}\" is reserved"),
            ));
        }
        if self.archives.contains_key(new_name) {
            return Err(Error::week_exists(new_name));
        }
        debug!(from = %self.current_week_name, to = %new_name, "renaming active week");
        self.current_week_name = new_name.to_string();
        Ok(new_name.to_string())
    }

    /// Add a trip on `date` to the active week. Returns its index.
    ///
    /// Names are trimmed and deduplicated; everyone starts unpaid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoParticipants`] when no usable name is given.
    pub fn add_trip<I, S>(
        &mut self,
        date: NaiveDate,
        trip_type: TripType,
        riders: I,
        now: &DateTime<Local>,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let riders = names::merge_names(riders);
        if riders.is_empty() {
            return Err(Error::NoParticipants);
        }

        let mut participants: Vec<Participant> = Vec::with_capacity(riders.len());
        for name in riders {
            let base = generate_participant_id(&name, now);
            let mut id = base.clone();
            let mut n = 2;
            while participants.iter().any(|p| p.id == id) {
                id = format!("{base}-{n}");
                n += 1;
            }
            participants.push(Participant::new(id, name));
        }

        let trip = Trip::new(week::trip_day_label(date), trip_type, participants);
        info!(day = %trip.day, kind = %trip_type, riders = trip.participants.len(), "added trip");
        self.active_trips.push(trip);
        Ok(self.active_trips.len() - 1)
    }

    fn trip_mut(&mut self, index: usize) -> Result<&mut Trip> {
        let len = self.active_trips.len();
        self.active_trips
            .get_mut(index)
            .ok_or(Error::TripNotFound { index, len })
    }

    fn participant_mut(&mut self, trip: usize, index: usize) -> Result<&mut Participant> {
        let t = self.trip_mut(trip)?;
        let len = t.participants.len();
        t.participants
            .get_mut(index)
            .ok_or(Error::ParticipantNotFound { trip, index, len })
    }

    /// Remove a trip from the active week.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] for an out-of-range index.
    pub fn delete_trip(&mut self, index: usize) -> Result<Trip> {
        self.trip_mut(index)?;
        Ok(self.active_trips.remove(index))
    }

    /// Remove one participant from a trip.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an out-of-range trip or participant.
    pub fn remove_participant(&mut self, trip: usize, index: usize) -> Result<Participant> {
        self.participant_mut(trip, index)?;
        Ok(self.active_trips[trip].participants.remove(index))
    }

    /// Rename one participant of a trip.
    ///
    /// # Errors
    ///
    /// Fails on a blank name or an out-of-range trip or participant.
    pub fn rename_participant(&mut self, trip: usize, index: usize, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::invalid_input("participant name", "must not be blank"));
        }
        let p = self.participant_mut(trip, index)?;
        p.name = new_name.to_string();
        Ok(())
    }

    /// Flip the paid flag of one participant. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an out-of-range trip or participant.
    pub fn toggle_payment(&mut self, trip: usize, index: usize) -> Result<bool> {
        let p = self.participant_mut(trip, index)?;
        p.paid = !p.paid;
        Ok(p.paid)
    }

    /// Payment totals for the active week at `fare` per paid participant.
    #[must_use]
    pub fn stats(&self, fare: f64) -> Stats {
        let payers = self.active_trips.iter().map(Trip::paid_count).sum();
        let participants = self.active_trips.iter().map(|t| t.participants.len()).sum();
        Stats {
            payers,
            participants,
            total_received: count_as_f64(payers) * fare,
        }
    }

    /// Active trips grouped by day label, ordered Sunday to Saturday.
    ///
    /// Labels with an unknown weekday come first, in order of appearance.
    #[must_use]
    pub fn day_groups(&self) -> Vec<DayGroup> {
        let mut groups: Vec<DayGroup> = Vec::new();
        for (idx, trip) in self.active_trips.iter().enumerate() {
            let pos = if let Some(pos) = groups.iter().position(|g| g.day == trip.day) {
                pos
            } else {
                groups.push(DayGroup {
                    day: trip.day.clone(),
                    ida: Vec::new(),
                    volta: Vec::new(),
                });
                groups.len() - 1
            };
            match trip.trip_type {
                TripType::Ida => groups[pos].ida.push(idx),
                TripType::Volta => groups[pos].volta.push(idx),
            }
        }
        groups.sort_by_key(|g| {
            g.ida
                .iter()
                .chain(&g.volta)
                .next()
                .and_then(|&i| week::weekday_index(self.active_trips[i].weekday()))
        });
        groups
    }

    /// Year used to place `(DD/MM)` trip labels on the calendar.
    #[must_use]
    pub fn active_year(&self, today: NaiveDate) -> i32 {
        week::parse_week_start(&self.current_week_name).map_or(today.year(), |d| d.year())
    }

    /// Indices of active trips whose date is before `today`.
    #[must_use]
    pub fn past_due_trips(&self, today: NaiveDate) -> Vec<usize> {
        let year = self.active_year(today);
        self.active_trips
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_past_due(year, today))
            .map(|(i, _)| i)
            .collect()
    }

    /// Read a ledger from its JSON object form.
    ///
    /// A missing `active_trips` becomes empty, a missing or empty
    /// `currentWeekName` becomes the default name, and keys holding anything
    /// other than an array are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBackup`] when `value` is not an object, or in
    /// [`LoadMode::Strict`] when a trip list does not parse.
    pub fn from_value(value: Value, mode: LoadMode) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::invalid_backup("expected a JSON object"));
        };

        let mut ledger = Self::default();
        for (key, value) in map {
            match key.as_str() {
                ACTIVE_TRIPS_KEY => {
                    if value.is_null() {
                        continue;
                    }
                    if let Some(trips) = parse_trips(&key, value, mode)? {
                        ledger.active_trips = trips;
                    }
                }
                CURRENT_WEEK_KEY => match value {
                    Value::String(name) if !name.is_empty() => ledger.current_week_name = name,
                    Value::String(_) | Value::Null => {}
                    other => {
                        warn!(value = %other, "ignoring non-string week name");
                    }
                },
                _ if value.is_array() => {
                    if let Some(trips) = parse_trips(&key, value, mode)? {
                        ledger.archives.insert(key, trips);
                    }
                }
                _ => {
                    warn!(key = %key, "ignoring non-array entry");
                }
            }
        }
        Ok(ledger)
    }

    /// Parse a ledger from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or fails [`Ledger::from_value`].
    pub fn from_json(text: &str, mode: LoadMode) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value, mode)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_trips(key: &str, value: Value, mode: LoadMode) -> Result<Option<Vec<Trip>>> {
    match Vec::<Trip>::deserialize(value) {
        Ok(trips) => Ok(Some(trips)),
        Err(e) => match mode {
            LoadMode::Strict => Err(Error::invalid_backup(format!("\"{key}\": {e}"))),
            LoadMode::Lenient => {
                warn!(key = %key, error = %e, "dropping unreadable trip list");
                Ok(None)
            }
        },
    }
}

impl Serialize for Ledger {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.archives.len()))?;
        map.serialize_entry(ACTIVE_TRIPS_KEY, &self.active_trips)?;
        map.serialize_entry(CURRENT_WEEK_KEY, &self.current_week_name)?;
        for (name, trips) in &self.archives {
            map.serialize_entry(name, trips)?;
        }
        map.end()
    }
}
