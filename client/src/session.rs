use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::UserId;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{DurableStorage, TOKEN_KEY, USER_ID_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: UserId,
}

/// Who is using the client. A token never exists without its user id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Restoring,
    Unauthenticated,
    Authenticated(Credentials),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Restoring)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            SessionState::Authenticated(credentials) => Some(credentials),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials().map(|credentials| credentials.token.as_str())
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.credentials().map(|credentials| credentials.user_id)
    }
}

/// Single authority for the current credential. Cheap to clone; every clone
/// observes the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn DurableStorage>,
    state: watch::Sender<SessionState>,
    /// Held across a state change and the matching storage write, so memory
    /// and storage never disagree about the pair.
    transition: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::Restoring);
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                transition: Mutex::new(()),
            }),
        }
    }

    fn transition(&self) -> MutexGuard<'_, ()> {
        self.inner
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Leaves the restoring state using whatever durable storage holds.
    /// Only the first call has an effect.
    pub fn restore(&self) -> SessionState {
        let _guard = self.transition();
        if !self.state().is_loading() {
            debug!("Session already restored");
            return self.state();
        }

        let restored = match self.read_persisted() {
            Ok(Some(credentials)) => {
                info!(user_id = credentials.user_id, "Session restored from storage");
                SessionState::Authenticated(credentials)
            }
            Ok(None) => {
                debug!("No stored session");
                SessionState::Unauthenticated
            }
            Err(error) => {
                warn!(%error, "Fail to read stored session, starting unauthenticated");
                SessionState::Unauthenticated
            }
        };

        self.inner.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = restored;
                true
            } else {
                false
            }
        });
        self.state()
    }

    fn read_persisted(&self) -> Result<Option<Credentials>> {
        let token = self.inner.storage.read(TOKEN_KEY)?;
        let user_id = self.inner.storage.read(USER_ID_KEY)?;
        match (token, user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() => match user_id.parse() {
                Ok(user_id) => Ok(Some(Credentials { token, user_id })),
                Err(_) => {
                    warn!(user_id = %user_id, "Stored user id is not numeric, ignoring session");
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }

    /// Authenticates the session, replacing any previous credentials.
    /// Persisting is best effort: the session stays valid for this process
    /// even if storage refuses the write.
    pub fn login(&self, token: impl Into<String>, user_id: UserId) -> Result<()> {
        let token = token.into();
        let _guard = self.transition();
        let credentials = Credentials {
            token: token.clone(),
            user_id,
        };

        let mut restoring = false;
        self.inner.state.send_if_modified(|state| {
            if state.is_loading() {
                restoring = true;
                return false;
            }
            *state = SessionState::Authenticated(credentials);
            true
        });
        if restoring {
            warn!(user_id, "Login attempted before session restore finished");
            return Err(Error::SessionRestoring);
        }

        let user_id_text = user_id.to_string();
        if let Err(error) = self
            .inner
            .storage
            .write_all(&[(TOKEN_KEY, &token), (USER_ID_KEY, &user_id_text)])
        {
            warn!(%error, user_id, "Fail to persist session, keeping it in memory only");
        }
        info!(user_id, "User logged in");
        Ok(())
    }

    /// Drops the session from memory and storage, whatever the current state.
    pub fn logout(&self) {
        let _guard = self.transition();
        let previous = self.inner.state.send_replace(SessionState::Unauthenticated);
        if let Err(error) = self.inner.storage.remove_all(&[TOKEN_KEY, USER_ID_KEY]) {
            warn!(%error, "Fail to clear stored session");
        }
        match previous.user_id() {
            Some(user_id) => info!(user_id, "User logged out"),
            None => debug!("Logout without an active session"),
        }
    }

    pub fn current_token(&self) -> Option<String> {
        self.inner.state.borrow().token().map(str::to_owned)
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Resolves once `restore` has run.
    pub async fn restored(&self) -> SessionState {
        let mut receiver = self.subscribe();
        let restored = receiver
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        restored.unwrap_or_else(|_| self.state())
    }

    /// Call-site helper for the authorization boundary: an unauthorized
    /// answer ends the session, every other outcome passes through.
    pub fn end_on_unauthorized<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.observe(error);
        }
        result
    }

    /// Ends the session if `error` says the backend stopped accepting it.
    pub fn observe(&self, error: &Error) {
        if error.is_unauthorized() {
            warn!("Backend rejected the session, logging out");
            self.logout();
        }
    }
}
