//! Serial-number revocation lookup
//!
//! This is the boundary where internal errors stop. Every lookup answers
//! with a record or `None`; fetch, parse and malformed-entry failures are
//! logged here and never reach the caller.

use super::{
    config::StatusConfig,
    error::StatusError,
    serial::SerialNumber,
    store::StatusStore,
    table::RevocationRecord,
};
use tracing::{debug, warn};

/// Revocation lookup over a memoized status table
#[derive(Debug)]
pub struct RevocationLookup {
    store: StatusStore,
}

impl RevocationLookup {
    pub fn new(store: StatusStore) -> Self {
        Self { store }
    }

    /// Lookup wired to the system probe, HTTP endpoint and configured snapshot
    pub fn from_config(config: StatusConfig) -> Result<Self, StatusError> {
        Ok(Self::new(StatusStore::from_config(config)?))
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Revocation record for `serial`, or `None` when the list has no usable
    /// entry for it
    ///
    /// `None` does not mean "revoked". The first call in a store's lifetime
    /// may block on the remote fetch.
    pub fn lookup(&self, serial: &SerialNumber) -> Option<RevocationRecord> {
        let key = serial.to_hex_key();

        match self.store.table().get(&key) {
            Ok(Some(record)) => {
                debug!(serial = %key, record = %record, "Status list entry found");
                Some(record.clone())
            }
            Ok(None) => None,
            Err(e) => {
                warn!(serial = %key, error = %e, "Ignoring malformed status list entry");
                None
            }
        }
    }

    /// Revocation record for the serial of a DER-encoded certificate
    pub fn lookup_certificate(&self, cert_der: &[u8]) -> Option<RevocationRecord> {
        match SerialNumber::from_certificate_der(cert_der) {
            Ok(serial) => self.lookup(&serial),
            Err(e) => {
                warn!(error = %e, "Cannot read certificate serial for status lookup");
                None
            }
        }
    }
}
