//! Fitbit sleep log processing
//!
//! The sleep feed itself is fetched elsewhere; this module takes the saved
//! JSON and turns it into the `fitbit_sleep` table.

pub mod sleep;

pub use sleep::{classify_all, classify_and_enrich, nap_or_full, RawSleepSession, SleepSession, SleepType};
