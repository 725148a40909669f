//! Attestation Certificate Status Lookup
//!
//! This crate answers one question for certificate-chain validators: does the
//! attestation authority's status list carry a revocation record for this
//! certificate serial number?
//!
//! # Features
//!
//! - **Single remote fetch**: the status list is fetched once per process
//!   with every HTTP caching layer disabled
//! - **Offline snapshot**: a build-time copy of the list is used when there
//!   is no usable network or the fetch fails
//! - **Memoized table**: parsed once, shared read-only across threads
//! - **Total lookup**: a lookup answers with a record or `None`, never an error
//!
//! # Quick Start
//!
//! ```no_run
//! use attestation_status::SerialNumber;
//!
//! let serial = SerialNumber::from(0x1a2bu64);
//! match attestation_status::get(&serial) {
//!     Some(record) => println!("{}: {}", serial, record),
//!     None => println!("{}: no status entry", serial),
//! }
//! ```
//!
//! ## Custom configuration
//!
//! ```no_run
//! use attestation_status::{configure_global, StatusConfig};
//!
//! # fn example() -> Result<(), attestation_status::StatusError> {
//! let config = StatusConfig {
//!     http_timeout_secs: 3,
//!     ..StatusConfig::with_snapshot_file("/usr/share/attestation/status.json")
//! };
//! configure_global(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Isolated stores
//!
//! ```
//! use attestation_status::{
//!     FixedProbe, RevocationLookup, SerialNumber, SnapshotLoader, StatusStore,
//! };
//!
//! let store = StatusStore::builder()
//!     .probe(FixedProbe::offline())
//!     .snapshot(SnapshotLoader::Bytes(
//!         br#"{"entries":{"ff":{"status":"REVOKED","reason":"KEY_COMPROMISE"}}}"#.to_vec(),
//!     ))
//!     .build();
//! let lookup = RevocationLookup::new(store);
//!
//! let record = lookup.lookup(&SerialNumber::from(255u64)).unwrap();
//! assert_eq!(record.status(), "REVOKED");
//! ```
//!
//! # Error Handling
//!
//! Internal operations return [`StatusError`]. Remote failures move the
//! store onto the snapshot, a broken snapshot leaves an empty table, and a
//! malformed entry reads as "no record". All of them are logged through
//! `tracing`; the lookup API itself is infallible.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod fetch;
pub mod lookup;
pub mod serial;
pub mod snapshot;
pub mod store;
pub mod table;

pub use config::{StatusConfig, DEFAULT_STATUS_URL};
pub use connectivity::{ConnectivityProbe, FixedProbe, SystemProbe, Transport};
pub use error::StatusError;
pub use fetch::{HttpFetcher, StatusFetcher};
pub use lookup::RevocationLookup;
pub use serial::SerialNumber;
pub use snapshot::{SnapshotLoader, SnapshotSource, EMBEDDED_SNAPSHOT};
pub use store::{StatusStore, StatusStoreBuilder};
pub use table::{RevocationRecord, StatusTable, TableSource};

use std::sync::OnceLock;

static GLOBAL_LOOKUP: OnceLock<RevocationLookup> = OnceLock::new();

/// Process-wide lookup, created with the default configuration on first use
/// unless [`configure_global`] ran earlier
pub fn global() -> &'static RevocationLookup {
    GLOBAL_LOOKUP.get_or_init(|| RevocationLookup::new(StatusStore::builder().build()))
}

/// Install the configuration of the process-wide lookup
///
/// Must run before the first [`get`] or [`global`] call; afterwards it fails
/// with [`StatusError::ConfigError`].
pub fn configure_global(config: StatusConfig) -> Result<(), StatusError> {
    let lookup = RevocationLookup::from_config(config)?;
    GLOBAL_LOOKUP.set(lookup).map_err(|_| {
        StatusError::ConfigError("global status lookup already initialized".to_string())
    })
}

/// Revocation record for `serial` from the process-wide status table
pub fn get(serial: &SerialNumber) -> Option<RevocationRecord> {
    global().lookup(serial)
}
