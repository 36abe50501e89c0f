//! # Save Coordination
//!
//! Saving is the only asynchronous part of editing. The session is shared
//! behind one async mutex, so commands and saves never interleave inside a
//! snapshot, and a separate save lock guarantees at most one save is in
//! flight per page.
//!
//! ```text
//! save():  save_lock ─→ lock session ─→ begin_save (snapshot, version)
//!                       unlock ─→ gateway.save(snapshot).await
//!                       lock session ─→ finish_save(version, result)
//! ```
//!
//! Edits made while a save is awaiting the gateway are not lost: the save
//! writes the older snapshot and the session stays dirty.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

use crate::command::{Command, CommandOutcome};
use crate::config::AutosaveConfig;
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::session::EditSession;

/// Session handle shared between the command path and background saves
pub type SharedSession = Arc<Mutex<EditSession>>;

#[derive(Debug, Clone, PartialEq)]
pub enum SaveResult {
    /// Snapshot at `version` was written
    Saved { version: u64 },

    /// Nothing to save
    Clean,

    Failed(PersistenceError),
}

pub struct SaveCoordinator {
    session: SharedSession,
    gateway: Arc<dyn PersistenceGateway>,
    save_lock: Mutex<()>,
}

impl SaveCoordinator {
    pub fn new(session: EditSession, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::from_shared(Arc::new(Mutex::new(session)), gateway)
    }

    pub fn from_shared(session: SharedSession, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            session,
            gateway,
            save_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Run a command against the shared session
    pub async fn dispatch(&self, command: Command) -> CommandOutcome {
        self.session.lock().await.apply(command)
    }

    /// Save the current snapshot, even if nothing changed
    pub async fn save(&self) -> SaveResult {
        self.run_save(false).await
    }

    /// Save only if the session has unsaved edits
    pub async fn save_if_dirty(&self) -> SaveResult {
        self.run_save(true).await
    }

    #[instrument(skip(self))]
    async fn run_save(&self, only_if_dirty: bool) -> SaveResult {
        let _in_flight = self.save_lock.lock().await;

        let ticket = {
            let mut session = self.session.lock().await;
            if only_if_dirty && !session.is_dirty() {
                return SaveResult::Clean;
            }
            session.begin_save()
        };

        let result = self.gateway.save(&ticket.page_id, &ticket.snapshot).await;

        self.session
            .lock()
            .await
            .finish_save(ticket.version, &result);

        match result {
            Ok(()) => {
                info!(page = %ticket.page_id, version = ticket.version, "Saved page");
                SaveResult::Saved {
                    version: ticket.version,
                }
            }
            Err(e) => {
                warn!(page = %ticket.page_id, error = %e, "Save failed");
                SaveResult::Failed(e)
            }
        }
    }

    /// Periodically save while dirty. Failures are logged and retried on
    /// the next tick.
    pub fn spawn_autosave(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                coordinator.save_if_dirty().await;
            }
        })
    }

    /// Start autosave with the configured interval, or `None` if autosave is
    /// disabled.
    pub fn spawn_autosave_from(self: &Arc<Self>, config: &AutosaveConfig) -> Option<JoinHandle<()>> {
        if !config.enabled {
            info!("Autosave disabled");
            return None;
        }
        Some(self.spawn_autosave(config.interval()))
    }
}
