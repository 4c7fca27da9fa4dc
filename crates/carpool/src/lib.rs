//! `carpool` - Weekly carpool trip and payment ledger
//!
//! This library records carpool trips per week, who rode each trip and
//! whether they paid, archives past weeks, and exports JSON backups and
//! shareable text summaries.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod names;
pub mod session;
pub mod storage;
pub mod summary;
pub mod week;

pub use config::Config;
pub use error::{Error, Result};
pub use ledger::{DayGroup, Ledger, LoadMode, Stats, WeekChange};
pub use logging::init_logging;
pub use model::{Participant, Trip, TripType, DEFAULT_WEEK_NAME, PAYMENT_VALUE, STORAGE_KEY};
pub use session::Session;
pub use storage::{Storage, StorageStats};
pub use week::WeekTree;
