use super::actions::Action;
use super::reducer::reduce;
use super::schema::{FilesState, Snapshot, StoredFile};
use super::selectors;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Runs after every committed transition, in registration order.
///
/// A returned action is queued and dispatched once the current round of
/// hooks has finished.
pub trait StoreHook: Send {
    fn after_commit(&mut self, action: &Action, state: &FilesState) -> Option<Action>;
}

impl<F> StoreHook for F
where
    F: FnMut(&Action, &FilesState) -> Option<Action> + Send,
{
    fn after_commit(&mut self, action: &Action, state: &FilesState) -> Option<Action> {
        self(action, state)
    }
}

/// Refused because a file with this name is already stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a file named {0:?} is already stored")]
pub struct DuplicateFile(pub String);

/// Single-writer owner of the file list.
pub struct Store {
    state: Snapshot,
    hooks: Vec<Box<dyn StoreHook>>,
    pending: VecDeque<Action>,
    updates: watch::Sender<Snapshot>,
}

impl Store {
    pub fn new() -> Self {
        let state: Snapshot = Arc::new(FilesState::default());
        let (updates, _) = watch::channel(Arc::clone(&state));
        Self {
            state,
            hooks: Vec::new(),
            pending: VecDeque::new(),
            updates,
        }
    }

    pub fn register_hook(&mut self, hook: impl StoreHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Applies `action` and every follow-up it produces, in order.
    pub fn dispatch(&mut self, action: Action) {
        self.pending.push_back(action);
        while let Some(next) = self.pending.pop_front() {
            self.commit(next);
        }
    }

    fn commit(&mut self, action: Action) {
        let next = reduce(&self.state, &action);
        let changed = !Arc::ptr_eq(&next, &self.state);
        self.state = next;
        debug!(
            action = action.kind(),
            changed,
            count = self.state.items.len(),
            "transition committed"
        );
        if changed {
            self.updates.send_replace(Arc::clone(&self.state));
        }

        let state = Arc::clone(&self.state);
        for hook in &mut self.hooks {
            if let Some(follow_up) = hook.after_commit(&action, &state) {
                self.pending.push_back(follow_up);
            }
        }
    }

    /// Adds `item` unless its name is already taken.
    pub fn add_file(&mut self, item: StoredFile) -> Result<(), DuplicateFile> {
        if selectors::exists(&self.state, &item.file_name) {
            return Err(DuplicateFile(item.file_name));
        }
        self.dispatch(Action::AddFile { item });
        Ok(())
    }

    pub fn delete_file(&mut self, file_name: &str) {
        self.dispatch(Action::DeleteFile {
            file_name: file_name.to_string(),
        });
    }

    /// Current state, shared by value.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.state)
    }

    /// Receives every snapshot that differs from the previous one.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
