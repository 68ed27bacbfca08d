use std::sync::{PoisonError, RwLock};

use tokio::sync::watch;

use crate::modules::auth::schema::UserResponse;
use crate::modules::project::model::ProjectView;
use crate::services::ordering::move_item;

/// Client-side mirror of what the profile editor shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub edit_mode: bool,
    pub user: Option<UserResponse>,
    pub projects: Vec<ProjectView>,
    /// Username picked before the account exists.
    pub register_username: Option<String>,
}

pub fn order_ids(projects: &[ProjectView]) -> Vec<String> {
    projects.iter().map(|project| project.id.clone()).collect()
}

/// Shared state with change notification. Every mutation publishes a fresh
/// snapshot to subscribers.
pub struct Store {
    state: RwLock<StoreState>,
    changes: watch::Sender<StoreState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreState::default())
    }
}

impl Store {
    pub fn new(initial: StoreState) -> Self {
        let (changes, _) = watch::channel(initial.clone());
        Self {
            state: RwLock::new(initial),
            changes,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.changes.subscribe()
    }

    pub fn snapshot(&self) -> StoreState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        self.changes.send_replace(state.clone());
        result
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    pub fn set_edit_mode(&self, edit_mode: bool) {
        self.update(|state| state.edit_mode = edit_mode);
    }

    pub fn toggle_edit_mode(&self) -> bool {
        self.update(|state| {
            state.edit_mode = !state.edit_mode;
            state.edit_mode
        })
    }

    pub fn set_user(&self, user: Option<UserResponse>) {
        self.update(|state| state.user = user);
    }

    pub fn set_register_username(&self, username: Option<String>) {
        self.update(|state| state.register_username = username);
    }

    pub fn take_register_username(&self) -> Option<String> {
        self.update(|state| state.register_username.take())
    }

    // =========================================================================
    // PROJECTS
    // =========================================================================

    pub fn set_projects(&self, projects: Vec<ProjectView>) {
        self.update(|state| state.projects = projects);
    }

    pub fn add_project(&self, project: ProjectView) {
        self.update(|state| state.projects.push(project));
    }

    /// Applies an optimistic edit and returns the previous copy, so a failed
    /// save can be rolled back with [`restore_project`](Self::restore_project).
    pub fn edit_project(&self, id: &str, edit: impl FnOnce(&mut ProjectView)) -> Option<ProjectView> {
        self.update(|state| {
            let project = state.projects.iter_mut().find(|p| p.id == id)?;
            let previous = project.clone();
            edit(project);
            Some(previous)
        })
    }

    pub fn restore_project(&self, previous: ProjectView) {
        self.reconcile_project(previous);
    }

    /// Replaces the local entry with the server's copy.
    pub fn reconcile_project(&self, project: ProjectView) {
        self.update(|state| {
            if let Some(entry) = state.projects.iter_mut().find(|p| p.id == project.id) {
                *entry = project;
            }
        });
    }

    /// Removes a project, returning it with its position so a failed delete
    /// can put it back with [`insert_project`](Self::insert_project).
    pub fn remove_project(&self, id: &str) -> Option<(usize, ProjectView)> {
        self.update(|state| {
            let position = state.projects.iter().position(|p| p.id == id)?;
            let project = state.projects.remove(position);
            reindex(&mut state.projects);
            Some((position, project))
        })
    }

    /// Inserts a project at `position`, clamped to the end of the list.
    pub fn insert_project(&self, position: usize, project: ProjectView) {
        self.update(|state| {
            let position = position.min(state.projects.len());
            state.projects.insert(position, project);
            reindex(&mut state.projects);
        });
    }

    /// Moves a project locally and returns the id order to persist.
    pub fn move_project(&self, from: usize, to: usize) -> Option<Vec<String>> {
        self.update(|state| {
            if !move_item(&mut state.projects, from, to) {
                return None;
            }
            reindex(&mut state.projects);
            Some(order_ids(&state.projects))
        })
    }
}

fn reindex(projects: &mut [ProjectView]) {
    for (index, project) in projects.iter_mut().enumerate() {
        project.sort_index = index as i64;
    }
}
