//! Device group inventory
//!
//! Stands in for the platform's REST API. Calls block for the configured
//! latency and are meant to run on dialog worker threads, so the store is
//! shared behind `Arc<Mutex<_>>`. Failures carry the JSON body and status
//! the API would answer with.

use crate::error::ActionError;
use crate::model::group::{normalize_folder, DeviceGroup, GroupDraft, GroupType};
use anyhow::Context;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0}")]
    Invalid(String),

    #[error("No group with id {0}")]
    NotFound(u64),

    #[error("Your session has expired")]
    SessionExpired,

    #[error("Could not save the inventory: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Could not encode the inventory: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Inventory is unavailable")]
    Poisoned,
}

impl InventoryError {
    pub fn status(&self) -> u16 {
        match self {
            InventoryError::Invalid(_) => 400,
            InventoryError::SessionExpired => 401,
            InventoryError::NotFound(_) => 404,
            InventoryError::Storage(_) | InventoryError::Encode(_) | InventoryError::Poisoned => {
                500
            }
        }
    }

    /// Body of the error response, `{"errorMsg": "..."}`
    pub fn response_body(&self) -> String {
        json!({ "errorMsg": self.to_string() }).to_string()
    }
}

impl From<InventoryError> for ActionError {
    fn from(err: InventoryError) -> Self {
        ActionError::from_response_body(&err.response_body()).with_status(err.status())
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

struct State {
    groups: Vec<DeviceGroup>,
    session_started: Instant,
}

/// Handle to the shared group store; clones see the same groups
#[derive(Clone)]
pub struct Inventory {
    state: Arc<Mutex<State>>,
    path: Option<PathBuf>,
    latency: Duration,
    session_timeout: Option<Duration>,
}

impl Inventory {
    /// In-memory inventory holding `groups`
    pub fn new(groups: Vec<DeviceGroup>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                groups,
                session_started: Instant::now(),
            })),
            path: None,
            latency: Duration::ZERO,
            session_timeout: None,
        }
    }

    /// Inventory backed by a JSON file, seeded with sample groups if the
    /// file does not exist yet
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let groups = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Could not parse {}", path.display()))?
        } else {
            info!(path = %path.display(), "no inventory file, using sample groups");
            sample_groups()
        };

        let mut inventory = Self::new(groups);
        inventory.path = Some(path.to_path_buf());
        Ok(inventory)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make calls fail as expired once `timeout` has passed since the last
    /// (re)connect
    pub fn with_session_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn list(&self) -> InventoryResult<Vec<DeviceGroup>> {
        let state = self.session()?;
        debug!(count = state.groups.len(), "listed groups");
        Ok(state.groups.clone())
    }

    pub fn get(&self, id: u64) -> InventoryResult<DeviceGroup> {
        let state = self.session()?;
        state
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or(InventoryError::NotFound(id))
    }

    pub fn create(&self, draft: &GroupDraft) -> InventoryResult<DeviceGroup> {
        let mut state = self.session()?;
        let (name, folder) = validate(&state.groups, draft, None)?;

        let id = state.groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        let group = DeviceGroup {
            id,
            name,
            folder,
            group_type: GroupType::Static,
            description: draft.description.clone(),
            hidden_from_reports: !draft.visible_in_reports,
        };
        let mut groups = state.groups.clone();
        groups.push(group.clone());
        self.commit(&mut state, groups)?;

        info!(id, name = %group.name, folder = %group.folder, "created group");
        Ok(group)
    }

    pub fn update(&self, id: u64, draft: &GroupDraft) -> InventoryResult<DeviceGroup> {
        let mut state = self.session()?;
        let (name, folder) = validate(&state.groups, draft, Some(id))?;

        let mut groups = state.groups.clone();
        let group = groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(InventoryError::NotFound(id))?;
        group.name = name;
        group.folder = folder;
        group.description = draft.description.clone();
        group.hidden_from_reports = !draft.visible_in_reports;
        let updated = group.clone();
        self.commit(&mut state, groups)?;

        info!(id, name = %updated.name, "updated group");
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> InventoryResult<()> {
        let mut state = self.session()?;
        let index = state
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or(InventoryError::NotFound(id))?;
        let mut groups = state.groups.clone();
        let removed = groups.remove(index);
        self.commit(&mut state, groups)?;

        info!(id, name = %removed.name, "deleted group");
        Ok(())
    }

    /// Start a new session
    pub fn reconnect(&self) -> InventoryResult<()> {
        self.delay();
        let mut state = self.lock()?;
        state.session_started = Instant::now();
        info!("session renewed");
        Ok(())
    }

    fn delay(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }

    fn lock(&self) -> InventoryResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| InventoryError::Poisoned)
    }

    /// Lock the store for a call made within a valid session
    fn session(&self) -> InventoryResult<MutexGuard<'_, State>> {
        self.delay();
        let state = self.lock()?;
        if let Some(timeout) = self.session_timeout {
            if state.session_started.elapsed() >= timeout {
                warn!("call refused, session expired");
                return Err(InventoryError::SessionExpired);
            }
        }
        Ok(state)
    }

    /// Replace the stored groups once `groups` has been written out; a
    /// failed write leaves the store untouched
    fn commit(&self, state: &mut State, groups: Vec<DeviceGroup>) -> InventoryResult<()> {
        self.persist(&groups)?;
        state.groups = groups;
        Ok(())
    }

    fn persist(&self, groups: &[DeviceGroup]) -> InventoryResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(groups)?)?;
        Ok(())
    }
}

/// Check a draft the way the server does, returning the trimmed name and
/// normalized folder
fn validate(
    groups: &[DeviceGroup],
    draft: &GroupDraft,
    editing: Option<u64>,
) -> InventoryResult<(String, String)> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(InventoryError::Invalid(
            "The group name cannot be empty".to_string(),
        ));
    }

    let folder = normalize_folder(&draft.folder);
    let taken = groups.iter().any(|g| {
        Some(g.id) != editing && g.name.eq_ignore_ascii_case(name) && g.folder_key() == folder
    });
    if taken {
        return Err(InventoryError::Invalid(format!(
            "A group named '{}' already exists in this folder",
            name
        )));
    }

    Ok((name.to_string(), folder))
}

/// Groups shown when no inventory file exists yet
pub fn sample_groups() -> Vec<DeviceGroup> {
    let group = |id: u64, name: &str, folder: &str, group_type: GroupType, description: &str| {
        DeviceGroup {
            id,
            name: name.to_string(),
            folder: folder.to_string(),
            group_type,
            description: description.to_string(),
            hidden_from_reports: false,
        }
    };

    vec![
        group(1, "All devices", "", GroupType::Dynamic, "Every device in the inventory"),
        group(2, "Core routers", "Sites/Paris", GroupType::Static, "Backbone routers in PAR1"),
        group(3, "Access switches", "Sites/Paris", GroupType::Static, ""),
        group(4, "Core routers", "Sites/Lyon", GroupType::Static, "Backbone routers in LYS2"),
        group(5, "Firewalls", "Security", GroupType::Dynamic, "Devices of the firewall family"),
        group(6, "Out of support", "", GroupType::Dynamic, "End of life reached"),
        DeviceGroup {
            hidden_from_reports: true,
            ..group(7, "Lab", "Sites", GroupType::Static, "Test bench, not reported")
        },
    ]
}
