//! Dashboard session: the current canonical-table snapshot.
//!
//! Views read an `Arc<CanonicalTable>` handed out by `snapshot()`, so a reload
//! never mutates data a caller is still looking at. Reloads are all or
//! nothing: a failed load installs an empty table and keeps the diagnostic.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{CanonicalTable, SourceSpec};
use crate::error::LoadError;
use crate::io::sources::load_table;

#[derive(Debug)]
pub struct Session {
    table: Arc<CanonicalTable>,
    version: u64,
    last_error: Option<LoadError>,
}

impl Session {
    /// A session with no data loaded yet (version 0).
    pub fn new() -> Self {
        Self {
            table: Arc::new(CanonicalTable::empty()),
            version: 0,
            last_error: None,
        }
    }

    /// Create a session and perform the first load.
    pub fn open(spec: &SourceSpec) -> Self {
        let mut session = Self::new();
        session.reload(spec).ok();
        session
    }

    pub fn snapshot(&self) -> Arc<CanonicalTable> {
        Arc::clone(&self.table)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Rebuild the table from `spec` and swap it in.
    ///
    /// The version is bumped on every reload attempt, successful or not, since
    /// either way the snapshot is replaced.
    pub fn reload(&mut self, spec: &SourceSpec) -> Result<(), LoadError> {
        self.version += 1;
        match load_table(spec) {
            Ok(table) => {
                info!(version = self.version, rows = table.len(), "session reloaded");
                self.table = Arc::new(table);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(version = self.version, error = %err, "reload failed; installing empty table");
                self.table = Arc::new(CanonicalTable::empty());
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Install an already-built table (tests, demo data).
    pub fn install(&mut self, table: CanonicalTable) {
        self.version += 1;
        self.table = Arc::new(table);
        self.last_error = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
