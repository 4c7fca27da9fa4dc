//! A loaded ledger bound to its store.
//!
//! Every mutation goes through [`Session::update`], which writes the whole
//! ledger back to storage once the change succeeds.

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::ledger::{Ledger, Stats};
use crate::storage::Storage;
use crate::summary;

/// The ledger plus the store it was loaded from.
#[derive(Debug)]
pub struct Session {
    config: Config,
    storage: Storage,
    ledger: Ledger,
}

impl Session {
    /// Open the configured store and load the ledger from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or read.
    pub fn open(config: Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        Self::with_storage(config, storage)
    }

    /// Load the ledger from an already opened store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let ledger = storage.load_ledger(&config.storage.key)?;
        debug!(
            week = %ledger.current_week_name(),
            trips = ledger.active_trips().len(),
            archives = ledger.archives().len(),
            "ledger loaded"
        );
        Ok(Self {
            config,
            storage,
            ledger,
        })
    }

    /// The loaded ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying store.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Apply `change` to the ledger and persist it if it succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `change`, or a storage error from the write.
    pub fn update<T>(&mut self, change: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let out = change(&mut self.ledger)?;
        self.save()?;
        Ok(out)
    }

    /// Replace the whole ledger (used when restoring a backup).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn replace(&mut self, ledger: Ledger) -> Result<()> {
        self.ledger = ledger;
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.storage
            .save_ledger(&self.config.storage.key, &self.ledger)
    }

    /// Payment totals for the active week at the configured fare.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.ledger.stats(self.config.ledger.fare)
    }

    /// Shareable summary of the active week.
    #[must_use]
    pub fn share_text(&self) -> String {
        summary::share_text(
            self.ledger.active_trips(),
            &self.stats(),
            self.ledger.current_week_name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::TripType;
    use chrono::{Local, NaiveDate, TimeZone};

    fn session() -> Session {
        let storage = Storage::open_in_memory().unwrap();
        Session::with_storage(Config::default(), storage).unwrap()
    }

    fn now() -> chrono::DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 12, 9, 0, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn test_update_persists() {
        let mut s = session();
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        s.update(|l| l.create_week(date, &now())).unwrap();
        s.update(|l| l.add_trip(date, TripType::Ida, ["Ana"], &now()))
            .unwrap();

        let stored = s.storage().load_ledger(&s.config().storage.key).unwrap();
        assert_eq!(&stored, s.ledger());
    }

    #[test]
    fn test_failed_update_does_not_write() {
        let mut s = session();
        let err = s.update(|l| l.toggle_payment(0, 0)).unwrap_err();
        assert!(matches!(err, Error::TripNotFound { .. }));
        assert!(s.storage().get(&s.config().storage.key).unwrap().is_none());
    }

    #[test]
    fn test_stats_use_configured_fare() {
        let storage = Storage::open_in_memory().unwrap();
        let mut config = Config::default();
        config.ledger.fare = 12.5;
        let mut s = Session::with_storage(config, storage).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        s.update(|l| l.add_trip(date, TripType::Ida, ["Ana", "Bia"], &now()))
            .unwrap();
        s.update(|l| l.toggle_payment(0, 0)).unwrap();
        s.update(|l| l.toggle_payment(0, 1)).unwrap();

        assert!((s.stats().total_received - 25.0).abs() < f64::EPSILON);
        assert!(s.share_text().contains("R$ 25,00"));
    }

    #[test]
    fn test_replace() {
        let mut s = session();
        let mut other = Ledger::new();
        other
            .add_trip(
                NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                TripType::Volta,
                ["Caio"],
                &now(),
            )
            .unwrap();
        s.replace(other.clone()).unwrap();
        assert_eq!(s.ledger(), &other);
        assert_eq!(
            s.storage().load_ledger(&s.config().storage.key).unwrap(),
            other
        );
    }
}
