//! Memoized status table
//!
//! [`StatusStore`] settles the status table exactly once per store:
//!
//! 1. If remote fetching is enabled and the connectivity probe reports a
//!    usable network, GET the status list and parse it.
//! 2. On any failure, parse the local snapshot instead.
//! 3. If the snapshot is unusable too, settle on an empty table.
//!
//! The settled table never changes afterwards. Concurrent first callers block
//! on the same [`OnceLock`] initializer, so the sequence above runs once no
//! matter how many threads race for it.
//!
//! # Architecture
//!
//! ```text
//! RevocationLookup ──► StatusStore::table() ──(first call only)──┐
//!                                                                 ▼
//!              ConnectivityProbe ──► StatusFetcher ──► StatusTable::parse
//!                      │ no network / any error
//!                      ▼
//!              SnapshotLoader ──► StatusTable::parse ──► (or empty table)
//! ```

use super::{
    config::StatusConfig,
    connectivity::{ConnectivityProbe, SystemProbe},
    error::StatusError,
    fetch::{HttpFetcher, StatusFetcher},
    snapshot::{SnapshotLoader, SnapshotSource},
    table::{StatusTable, TableSource},
};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// Table together with where it came from
#[derive(Debug)]
struct SettledTable {
    table: StatusTable,
    source: TableSource,
}

/// Lazily-populated, process-lifetime status table
pub struct StatusStore {
    config: StatusConfig,
    probe: Box<dyn ConnectivityProbe>,
    /// Overrides the HTTP fetcher built from `config`
    fetcher: Option<Box<dyn StatusFetcher>>,
    snapshot: Box<dyn SnapshotSource>,
    settled: OnceLock<SettledTable>,
}

impl StatusStore {
    /// Start building a store with custom collaborators
    pub fn builder() -> StatusStoreBuilder {
        StatusStoreBuilder::default()
    }

    /// Create a store wired to the system probe, the HTTP endpoint and the
    /// configured snapshot
    pub fn from_config(config: StatusConfig) -> Result<Self, StatusError> {
        config.validate()?;
        Ok(Self::builder().config(config).build())
    }

    /// The status table, settled on first call
    pub fn table(&self) -> &StatusTable {
        &self.settled().table
    }

    /// Where the settled table came from (settles it if needed)
    pub fn source(&self) -> TableSource {
        self.settled().source
    }

    /// Whether the table has been settled yet
    pub fn is_settled(&self) -> bool {
        self.settled.get().is_some()
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    fn settled(&self) -> &SettledTable {
        self.settled.get_or_init(|| self.settle())
    }

    fn settle(&self) -> SettledTable {
        let url = self.config.endpoint_url.as_str();

        if self.config.enable_remote_fetch {
            match self.load_remote() {
                Ok(table) => {
                    info!(url = %url, entries = table.len(), "Status list loaded from remote");
                    return SettledTable {
                        table,
                        source: TableSource::Remote,
                    };
                }
                Err(StatusError::ConnectivityUnavailable) => {
                    debug!("No usable network, using local status snapshot");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Remote status list unavailable, using local snapshot");
                }
            }
        } else {
            debug!("Remote status fetch disabled, using local snapshot");
        }

        match self.load_local() {
            Ok(table) => {
                info!(entries = table.len(), "Status list loaded from local snapshot");
                SettledTable {
                    table,
                    source: TableSource::LocalSnapshot,
                }
            }
            Err(e) => {
                error!(error = %e, "Local status snapshot unusable, revocation table is empty");
                SettledTable {
                    table: StatusTable::empty(),
                    source: TableSource::Empty,
                }
            }
        }
    }

    fn load_remote(&self) -> Result<StatusTable, StatusError> {
        if !self.probe.has_usable_network() {
            return Err(StatusError::ConnectivityUnavailable);
        }

        let url = self.config.endpoint_url.as_str();
        let body = match &self.fetcher {
            Some(fetcher) => fetcher.fetch(url)?,
            // Built and dropped here so no client or connection outlives the attempt
            None => HttpFetcher::from_config(&self.config)?.fetch(url)?,
        };

        StatusTable::parse(&body)
    }

    fn load_local(&self) -> Result<StatusTable, StatusError> {
        let bytes = self.snapshot.load()?;
        StatusTable::parse(&bytes)
    }
}

impl fmt::Debug for StatusStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusStore")
            .field("config", &self.config)
            .field("settled", &self.settled.get().map(|s| s.source))
            .finish_non_exhaustive()
    }
}

/// Builder for [`StatusStore`]
#[derive(Default)]
pub struct StatusStoreBuilder {
    config: Option<StatusConfig>,
    probe: Option<Box<dyn ConnectivityProbe>>,
    fetcher: Option<Box<dyn StatusFetcher>>,
    snapshot: Option<Box<dyn SnapshotSource>>,
}

impl StatusStoreBuilder {
    pub fn config(mut self, config: StatusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the system connectivity probe
    pub fn probe(mut self, probe: impl ConnectivityProbe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Replace the HTTP fetcher
    pub fn fetcher(mut self, fetcher: impl StatusFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Replace the configured snapshot
    pub fn snapshot(mut self, snapshot: impl SnapshotSource + 'static) -> Self {
        self.snapshot = Some(Box::new(snapshot));
        self
    }

    pub fn build(self) -> StatusStore {
        let config = self.config.unwrap_or_default();

        let probe: Box<dyn ConnectivityProbe> = match self.probe {
            Some(probe) => probe,
            None => Box::new(SystemProbe::with_root(config.sysfs_net_root.clone())),
        };

        let snapshot: Box<dyn SnapshotSource> = match (self.snapshot, &config.snapshot_path) {
            (Some(snapshot), _) => snapshot,
            (None, Some(path)) => Box::new(SnapshotLoader::File(path.clone())),
            (None, None) => Box::new(SnapshotLoader::Embedded),
        };

        StatusStore {
            config,
            probe,
            fetcher: self.fetcher,
            snapshot,
            settled: OnceLock::new(),
        }
    }
}
