//! Persisted high score
//!
//! A single integer record, read once at boot and rewritten on new records.

use crate::persistence::{KeyValueStore, StorageError};

/// Storage key, stable across sessions
pub const STORAGE_KEY: &str = "neon_runner_highScore";

/// Best displayed score across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    /// Parse a stored record. Leading whitespace is skipped and the leading
    /// run of digits is used, so `"42"`, `" 42"` and `"42.9"` all read as 42.
    pub fn parse(raw: &str) -> Result<u64, StorageError> {
        let corrupt = || StorageError::Corrupt {
            key: STORAGE_KEY.to_string(),
            value: raw.to_string(),
        };
        let trimmed = raw.trim_start();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        trimmed[..digits_end].parse::<u64>().map_err(|_| corrupt())
    }

    /// Read the high score from `store`. Missing, unreadable or corrupt
    /// records all count as 0.
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => match Self::parse(&raw) {
                Ok(best) => {
                    log::info!("Loaded high score {}", best);
                    Self { best }
                }
                Err(e) => {
                    log::warn!("{}, starting from 0", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("High score unavailable ({}), starting from 0", e);
                Self::default()
            }
        }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Record a finished run. Returns true on a new record. The in-memory
    /// value updates even if persisting it fails.
    pub fn submit(&mut self, score: u64, store: &mut impl KeyValueStore) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        match store.set(STORAGE_KEY, &score.to_string()) {
            Ok(()) => log::info!("New high score {} saved", score),
            Err(e) => log::warn!("New high score {} not saved: {}", score, e),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_parse() {
        assert_eq!(HighScore::parse("42").unwrap(), 42);
        assert_eq!(HighScore::parse("  7").unwrap(), 7);
        assert_eq!(HighScore::parse("12abc").unwrap(), 12);
        assert_eq!(HighScore::parse("5.9").unwrap(), 5);
        assert!(HighScore::parse("").is_err());
        assert!(HighScore::parse("abc").is_err());
        assert!(HighScore::parse("-3").is_err());
        assert!(matches!(
            HighScore::parse("NaN"),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_load_defaults() {
        assert_eq!(HighScore::load(&MemoryStore::new()).best(), 0);
        assert_eq!(HighScore::load(&MemoryStore::with_entry(STORAGE_KEY, "junk")).best(), 0);
        assert_eq!(HighScore::load(&MemoryStore::with_entry(STORAGE_KEY, "31")).best(), 31);
    }

    #[test]
    fn test_submit_only_on_record() {
        let mut store = MemoryStore::with_entry(STORAGE_KEY, "3");
        let mut high = HighScore::load(&store);

        assert!(high.submit(5, &mut store));
        assert_eq!(high.best(), 5);
        assert_eq!(store.raw(STORAGE_KEY), Some("5"));

        assert!(!high.submit(4, &mut store));
        assert!(!high.submit(5, &mut store));
        assert_eq!(high.best(), 5);
        assert_eq!(store.raw(STORAGE_KEY), Some("5"));
    }

    #[test]
    fn test_submit_survives_write_failure() {
        let mut store = MemoryStore::with_entry(STORAGE_KEY, "2").read_only();
        let mut high = HighScore::load(&store);
        assert!(high.submit(9, &mut store));
        assert_eq!(high.best(), 9);
        assert_eq!(store.raw(STORAGE_KEY), Some("2"));
    }
}
