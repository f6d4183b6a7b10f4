//! Debounced, multi-trigger persistence of the application root.
//!
//! # Responsibility
//! - Merge the working copy into its layout and write the full `AppData`.
//! - Track save status and the last successful save time for display.
//! - Load and reset persisted state with built-in fallbacks.
//!
//! # Invariants
//! - A burst of changes inside the debounce window produces one write.
//! - Only the newest debounce arm can trigger a write.
//! - A failed write leaves `status` at its pre-write value.
//! - The legacy single-array key is removed after every successful write.

use crate::model::layout::AppData;
use crate::model::node::Node;
use crate::store::{KeyValueStore, StoreError};
use crate::timer::{Timer, TimerTicket};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Key holding the serialized `AppData`.
pub const STORAGE_KEY: &str = "dayflow.app_data";
/// Key of the earlier single-layout format, cleaned up on write.
pub const LEGACY_STORAGE_KEY: &str = "dayflow.nodes";

/// Save indicator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    Saving,
    Unsaved,
}

/// Which path produced a write, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Debounce,
    Manual,
    Emergency,
    LayoutChange,
}

impl SaveTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debounce => "debounce",
            Self::Manual => "manual",
            Self::Emergency => "emergency",
            Self::LayoutChange => "layout_change",
        }
    }
}

/// Errors from persistence writes.
#[derive(Debug)]
pub enum PersistError {
    /// `AppData` could not be encoded.
    Encode(serde_json::Error),
    /// The store rejected the operation.
    Store(StoreError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode app data: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for PersistError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Where loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Defaults,
}

/// Result of startup reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub data: AppData,
    /// Working copy of the active layout's nodes.
    pub active_nodes: Vec<Node>,
    pub source: LoadSource,
}

impl LoadedState {
    fn from_data(data: AppData, source: LoadSource) -> Self {
        let active_nodes = data
            .active_layout()
            .map(|layout| layout.nodes.clone())
            .unwrap_or_default();
        Self {
            data,
            active_nodes,
            source,
        }
    }

    fn defaults() -> Self {
        Self::from_data(AppData::builtin(), LoadSource::Defaults)
    }
}

/// Persistence adapter over a key-value store.
pub struct PersistenceAdapter<S: KeyValueStore> {
    store: S,
    status: SaveStatus,
    last_saved_time: Option<String>,
    debounce: Timer,
    delay: Duration,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    /// Creates an adapter that waits `delay` after the last change.
    pub fn new(store: S, delay: Duration) -> Self {
        Self {
            store,
            status: SaveStatus::Saved,
            last_saved_time: None,
            debounce: Timer::new(),
            delay,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Local wall-clock time of the last successful save, `HH:MM:SS`.
    pub fn last_saved_time(&self) -> Option<&str> {
        self.last_saved_time.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn has_pending_save(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Reads persisted state, falling back to built-in layouts.
    pub fn load(&self) -> LoadedState {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=load module=persist status=ok source=defaults reason=absent");
                return LoadedState::defaults();
            }
            Err(err) => {
                error!(
                    "event=load module=persist status=error source=defaults error_code=store_read_failed error={}",
                    err
                );
                return LoadedState::defaults();
            }
        };

        let mut data = match serde_json::from_str::<AppData>(&raw) {
            Ok(data) => data,
            Err(err) => {
                warn!(
                    "event=load module=persist status=fallback source=defaults reason=malformed bytes={} error={}",
                    raw.len(),
                    err
                );
                return LoadedState::defaults();
            }
        };
        if data.layouts.is_empty() {
            warn!("event=load module=persist status=fallback source=defaults reason=no_layouts");
            return LoadedState::defaults();
        }
        if !data.normalize() {
            warn!(
                "event=load module=persist status=fallback reason=unknown_active_layout active_layout_id={}",
                data.active_layout_id
            );
        }

        info!(
            "event=load module=persist status=ok source=persisted layouts={} active_layout_id={}",
            data.layouts.len(),
            data.active_layout_id
        );
        LoadedState::from_data(data, LoadSource::Persisted)
    }

    /// Records a change to the working copy and (re)arms the debounce.
    pub fn mark_changed(&mut self, now: Instant) -> TimerTicket {
        if self.status != SaveStatus::Saving {
            self.status = SaveStatus::Unsaved;
        }
        self.debounce.arm(now, self.delay)
    }

    /// Performs the debounced save when its deadline has passed.
    ///
    /// Returns `Ok(true)` when a write happened.
    pub fn poll(
        &mut self,
        now: Instant,
        data: &AppData,
        active_nodes: &[Node],
    ) -> Result<bool, PersistError> {
        match self.debounce.poll(now) {
            Some(_) => self.debounced_save(data, active_nodes),
            None => Ok(false),
        }
    }

    /// Fires a ticket handed out by `mark_changed`; stale tickets do nothing.
    pub fn fire(
        &mut self,
        ticket: TimerTicket,
        now: Instant,
        data: &AppData,
        active_nodes: &[Node],
    ) -> Result<bool, PersistError> {
        if !self.debounce.fire(ticket, now) {
            return Ok(false);
        }
        self.debounced_save(data, active_nodes)
    }

    /// Saves immediately through the `saving` state, bypassing the debounce.
    pub fn save_now(
        &mut self,
        data: &AppData,
        active_nodes: &[Node],
        trigger: SaveTrigger,
    ) -> Result<(), PersistError> {
        let previous = self.status;
        self.status = SaveStatus::Saving;
        match self.write(&data.merged(active_nodes), trigger) {
            Ok(()) => {
                self.status = SaveStatus::Saved;
                self.last_saved_time = Some(chrono::Local::now().format("%H:%M:%S").to_string());
                self.debounce.cancel();
                Ok(())
            }
            Err(err) => {
                self.status = previous;
                Err(err)
            }
        }
    }

    /// Writes synchronously without touching the save indicator.
    ///
    /// Used when the host is about to be hidden or suspended.
    pub fn emergency_save(
        &mut self,
        data: &AppData,
        active_nodes: &[Node],
    ) -> Result<(), PersistError> {
        self.write(&data.merged(active_nodes), SaveTrigger::Emergency)
    }

    /// Clears persisted state and returns the built-in layouts.
    pub fn reset(&mut self) -> Result<LoadedState, PersistError> {
        self.debounce.cancel();
        self.store.remove(STORAGE_KEY)?;
        self.store.remove(LEGACY_STORAGE_KEY)?;
        self.status = SaveStatus::Saved;
        self.last_saved_time = None;
        info!("event=reset module=persist status=ok");
        Ok(LoadedState::defaults())
    }

    fn debounced_save(
        &mut self,
        data: &AppData,
        active_nodes: &[Node],
    ) -> Result<bool, PersistError> {
        if self.status != SaveStatus::Unsaved {
            return Ok(false);
        }
        self.save_now(data, active_nodes, SaveTrigger::Debounce)?;
        Ok(true)
    }

    fn write(&mut self, data: &AppData, trigger: SaveTrigger) -> Result<(), PersistError> {
        let started_at = Instant::now();
        let result = serde_json::to_string(data)
            .map_err(PersistError::from)
            .and_then(|encoded| {
                self.store.set(STORAGE_KEY, &encoded)?;
                self.store.remove(LEGACY_STORAGE_KEY)?;
                Ok(encoded.len())
            });

        match result {
            Ok(bytes) => {
                info!(
                    "event=save module=persist status=ok trigger={} bytes={} layouts={} duration_ms={}",
                    trigger.as_str(),
                    bytes,
                    data.layouts.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=save module=persist status=error trigger={} error_code=save_failed error={}",
                    trigger.as_str(),
                    err
                );
                Err(err)
            }
        }
    }
}
