use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use super::{load, ConfigurationError, RuleTable, TableDescriptor};

/// Shared handle to a loaded rule table.
///
/// The table is loaded on first use and then handed out as an `Arc` until it is
/// invalidated or reloaded. Callers own the cache; nothing here is process-global.
#[derive(Debug)]
pub struct RuleTableCache {
    descriptor: TableDescriptor,
    table: RwLock<Option<Arc<RuleTable>>>,
}

impl RuleTableCache {
    pub fn new(descriptor: TableDescriptor) -> Self {
        Self {
            descriptor,
            table: RwLock::new(None),
        }
    }

    /// Cache seeded with a table that was built or loaded elsewhere.
    pub fn with_table(descriptor: TableDescriptor, table: RuleTable) -> Self {
        Self {
            descriptor,
            table: RwLock::new(Some(Arc::new(table))),
        }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn is_loaded(&self) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn get(&self) -> Result<Arc<RuleTable>, ConfigurationError> {
        if let Some(table) = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(table));
        }

        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.as_ref() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load(&self.descriptor)?);
        *guard = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table so the next [`get`](Self::get) reads the files again.
    pub fn invalidate(&self) {
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!("rule table cache cleared");
    }

    /// Load the table now; on failure the previous table stays in place.
    pub fn reload(&self) -> Result<Arc<RuleTable>, ConfigurationError> {
        let table = match load(&self.descriptor) {
            Ok(table) => Arc::new(table),
            Err(err) => {
                warn!(error = %err, "rule table reload failed; keeping previous table");
                return Err(err);
            }
        };

        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&table));
        Ok(table)
    }
}
