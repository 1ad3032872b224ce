//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use fateline_content::domain::catalog::CharacterCatalog;
use fateline_core::error::DomainError;
use fateline_table::application::dispatcher::Dispatcher;

use crate::hub::Hub;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Owner of every room; one request runs at a time.
    pub dispatcher: Arc<Mutex<Dispatcher>>,
    /// Outbound queues of the live connections.
    pub hub: Arc<Hub>,
    /// Read-only character content.
    pub catalog: Arc<dyn CharacterCatalog>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hub", &self.hub)
            .field("catalog", &self.catalog.version_hash())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state around a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, catalog: Arc<dyn CharacterCatalog>) -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            hub: Arc::new(Hub::new()),
            catalog,
        }
    }

    /// Locks the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a previous holder panicked.
    pub fn dispatcher(&self) -> Result<MutexGuard<'_, Dispatcher>, DomainError> {
        self.dispatcher
            .lock()
            .map_err(|_| DomainError::Infrastructure("dispatcher lock poisoned".into()))
    }
}
