//! # Mapping Database
//!
//! The ordered, immutable set of device mappings used for uid lookup.
//!
//! Records come from a `gamecontrollerdb.txt` file and, optionally, from the
//! `SDL_GAMECONTROLLERCONFIG` environment variable used by Steam and other SDL
//! hosts. Lookup is an exact uid match where the first record wins.

use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

use super::binding::DeviceMapping;
use super::parser::MappingParser;

/// Environment variable holding extra mapping lines.
pub const SDL_CONFIG_ENV: &str = "SDL_GAMECONTROLLERCONFIG";

/// Ordered list of [`DeviceMapping`] records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingDatabase {
    mappings: Vec<DeviceMapping>,
}

impl MappingDatabase {
    /// Creates an empty database. Every device runs in passthrough mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from already-parsed records.
    #[must_use]
    pub fn from_mappings(mappings: Vec<DeviceMapping>) -> Self {
        Self { mappings }
    }

    /// Parses every record from a reader.
    #[must_use]
    pub fn from_reader<R: BufRead>(reader: R) -> Self {
        Self {
            mappings: MappingParser::new(reader).collect(),
        }
    }

    /// Loads a database file.
    ///
    /// A missing or unreadable file is not an error: it is logged and an
    /// empty database is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use padmap::mapping::MappingDatabase;
    ///
    /// let db = MappingDatabase::load("/nonexistent/gamecontrollerdb.txt");
    /// assert!(db.is_empty());
    /// ```
    #[must_use]
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match MappingParser::open(path) {
            Ok(parser) => {
                let db = Self {
                    mappings: parser.collect(),
                };
                info!("Loaded {} device mapping(s) from {}", db.len(), path.display());
                db
            }
            Err(e) => {
                warn!(
                    "Could not open mapping database {}: {} (all devices will pass through unmapped)",
                    path.display(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Parses mapping lines from `SDL_GAMECONTROLLERCONFIG`.
    ///
    /// Returns an empty database when the variable is unset.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(SDL_CONFIG_ENV) {
            Ok(value) => {
                let db = Self::from_reader(value.as_bytes());
                info!("Loaded {} device mapping(s) from {}", db.len(), SDL_CONFIG_ENV);
                db
            }
            Err(_) => Self::new(),
        }
    }

    /// Places `other`'s records ahead of this database's records.
    ///
    /// Used to let environment overrides win the first-match lookup.
    #[must_use]
    pub fn prepend(self, other: MappingDatabase) -> Self {
        let mut mappings = other.mappings;
        mappings.extend(self.mappings);
        Self { mappings }
    }

    /// Index of the first record with exactly this uid.
    #[must_use]
    pub fn find(&self, uid: &str) -> Option<usize> {
        self.mappings.iter().position(|mapping| mapping.uid == uid)
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DeviceMapping> {
        self.mappings.get(index)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Records in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceMapping> {
        self.mappings.iter()
    }
}
