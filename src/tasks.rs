//! Background household lookup.
//!
//! A lookup runs on tokio's blocking pool so an interactive caller can keep
//! responding while the database is read. Each lookup delivers exactly one
//! result. There is no cancellation, timeout or progress reporting.

use tokio::task::JoinHandle;

use crate::db::{HouseholdRecord, Store};
use crate::error::{Error, Result};

pub struct LookupHandle {
    address_id: String,
    handle: JoinHandle<Result<Option<HouseholdRecord>>>,
}

impl LookupHandle {
    pub fn address_id(&self) -> &str {
        &self.address_id
    }

    /// Wait for the lookup to finish.
    pub async fn wait(self) -> Result<Option<HouseholdRecord>> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Lookup for {} did not complete: {}", self.address_id, e);
                Err(Error::TaskFailed(e.to_string()))
            }
        }
    }
}

/// Start a lookup of `address_id` off the calling task.
///
/// Must be called from within a tokio runtime.
pub fn spawn_lookup(store: Store, address_id: impl Into<String>) -> LookupHandle {
    let address_id = address_id.into();
    let key = address_id.clone();
    let handle = tokio::task::spawn_blocking(move || store.find_household(&key));
    LookupHandle { address_id, handle }
}
