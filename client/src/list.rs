use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use shared::{Created, EntityId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::resource::{DeletePolicy, Resource};
use crate::session::SessionStore;
use crate::validate::Validate;

/// The create/list/update/delete operations a list is driven by.
#[async_trait]
pub trait ResourceBackend<R: Resource>: Send + Sync {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>>;

    async fn create(&self, input: &R::New) -> Result<Created>;

    async fn update(&self, id: EntityId, patch: &R::Update) -> Result<()>;

    async fn delete(&self, id: EntityId) -> Result<()>;
}

/// What a view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<R: Resource> {
    pub items: Vec<R>,
    pub filter: R::Filter,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Whether a finished reload was allowed to touch the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    /// A newer reload was issued meanwhile; this result was dropped.
    Superseded,
}

/// Keeps a list of `R` in step with the backend: every mutation is followed
/// by a reload (or, for cheap-delete resources, a local removal), a reload
/// never blanks the list while in flight, and only the latest issued reload
/// may write its result.
pub struct ResourceListController<R: Resource> {
    backend: Arc<dyn ResourceBackend<R>>,
    session: SessionStore,
    state: watch::Sender<ListSnapshot<R>>,
    issued: AtomicU64,
}

impl<R: Resource> ResourceListController<R> {
    pub fn new(
        backend: Arc<dyn ResourceBackend<R>>,
        session: SessionStore,
        filter: R::Filter,
    ) -> Self {
        let (state, _) = watch::channel(ListSnapshot {
            items: Vec::new(),
            filter,
            is_loading: false,
            error: None,
        });
        Self {
            backend,
            session,
            state,
            issued: AtomicU64::new(0),
        }
    }

    pub fn over_api(api: &ApiClient, filter: R::Filter) -> Self {
        Self::new(Arc::new(api.clone()), api.session().clone(), filter)
    }

    pub fn snapshot(&self) -> ListSnapshot<R> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<R> {
        self.state.borrow().items.clone()
    }

    pub fn current_filter(&self) -> R::Filter {
        self.state.borrow().filter.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<R>> {
        self.state.subscribe()
    }

    /// Fetches the list for `filter`, which becomes the current filter.
    pub async fn reload(&self, filter: R::Filter) -> Result<Applied> {
        // Ticket and filter change under the same channel lock, so the
        // latest ticket always belongs to the filter left in the snapshot.
        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            state.filter = filter.clone();
            state.is_loading = true;
        });
        debug!(resource = R::NAME, ticket, ?filter, "Reloading list");

        let (items, error) = match self.backend.list(&filter).await {
            Ok(items) => (Some(items), None),
            Err(error) => (None, Some(error)),
        };
        let message = error.as_ref().map(ToString::to_string);

        let current = self.state.send_if_modified(|state| {
            if self.issued.load(Ordering::SeqCst) != ticket {
                return false;
            }
            state.is_loading = false;
            state.error = message;
            if let Some(items) = items {
                state.items = R::arrange(items);
            }
            true
        });

        match (error, current) {
            (None, true) => {
                debug!(resource = R::NAME, ticket, "List reloaded");
                Ok(Applied::Current)
            }
            (None, false) => {
                debug!(resource = R::NAME, ticket, "Dropping superseded list result");
                Ok(Applied::Superseded)
            }
            (Some(error), true) => Err(self.failed("reload", error, false)),
            (Some(error), false) => {
                debug!(resource = R::NAME, ticket, %error, "Superseded reload failed");
                self.session.observe(&error);
                Ok(Applied::Superseded)
            }
        }
    }

    /// Sends `input` and resynchronizes the list from the backend. The new
    /// entity is found in `items` by the returned id.
    pub async fn create(&self, input: &R::New) -> Result<Created> {
        input.validate()?;
        let created = match self.backend.create(input).await {
            Ok(created) => created,
            Err(error) => return Err(self.failed("create", error, true)),
        };
        info!(resource = R::NAME, id = created.id, "Created");
        self.resync("create").await;
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, patch: &R::Update) -> Result<()> {
        patch.validate()?;
        if let Err(error) = self.backend.update(id, patch).await {
            return Err(self.failed("update", error, true));
        }
        info!(resource = R::NAME, id, "Updated");
        self.resync("update").await;
        Ok(())
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        if let Err(error) = self.backend.delete(id).await {
            return Err(self.failed("delete", error, true));
        }
        info!(resource = R::NAME, id, policy = ?R::DELETE_POLICY, "Deleted");
        match R::DELETE_POLICY {
            DeletePolicy::RemoveLocally => {
                self.state.send_modify(|state| {
                    state.items.retain(|item| item.id() != id);
                    state.error = None;
                });
            }
            DeletePolicy::Reload => self.resync("delete").await,
        }
        Ok(())
    }

    /// A reload that follows an accepted mutation. Its failure is recorded
    /// on the list rather than failing the mutation itself.
    async fn resync(&self, after: &'static str) {
        if let Err(error) = self.reload(self.current_filter()).await {
            warn!(resource = R::NAME, after, %error, "Reload after mutation failed");
        }
    }

    fn failed(&self, operation: &'static str, error: Error, record: bool) -> Error {
        warn!(resource = R::NAME, operation, %error, "List operation failed");
        if record {
            let message = error.to_string();
            self.state.send_modify(|state| state.error = Some(message));
        }
        self.session.observe(&error);
        error
    }
}
