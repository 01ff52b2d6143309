//! # Cart Sessions
//!
//! Live carts of the billing screens, one per browser session.
//!
//! ## Thread Safety
//! The session map sits behind a `tokio::sync::Mutex` that is held only to
//! find or insert a cart. Each cart has its own lock; actions on it are
//! applied one at a time on the blocking pool, and each change is written
//! to the session store before that lock is released.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/carts/{session}/actions  { "type": "add_product", ... }      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartRegistry ── lock ── session open? ──no──► CartSession::open        │
//! │       │                       │                  (restores from store)  │
//! │       │                      yes                                        │
//! │       ▼                       ▼                                         │
//! │  session.dispatch(action) ──► reduce ──► store.save ──► new state       │
//! │                                                                         │
//! │  sessions/                                                              │
//! │  ├── till-1.json                                                        │
//! │  └── till-2.json                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use bakeline_core::cart::{CartAction, CartSession, CartState, MemorySessionStore, SessionStore};
use bakeline_core::error::CoreResult;
use bakeline_core::{CoreError, ValidationError};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Longest accepted session id.
const MAX_SESSION_ID_LEN: usize = 64;

type SharedStore = Arc<dyn SessionStore>;

// =============================================================================
// JSON File Store
// =============================================================================

/// Stores each session as `<dir>/<session id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

impl JsonFileSessionStore {
    /// Opens the store, creating `dir` if needed.
    pub fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            CoreError::SessionStore(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(JsonFileSessionStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", session_id))
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load(&self, session_id: &str) -> CoreResult<Option<CartState>> {
        let path = self.path_for(session_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::SessionStore(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CoreError::SessionStore(format!("corrupt {}: {}", path.display(), e)))
    }

    fn save(&self, session_id: &str, state: &CartState) -> CoreResult<()> {
        let path = self.path_for(session_id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(state)
            .map_err(|e| CoreError::SessionStore(e.to_string()))?;

        // Atomic replace
        fs::write(&tmp, body)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| CoreError::SessionStore(format!("cannot write {}: {}", path.display(), e)))
    }

    fn remove(&self, session_id: &str) -> CoreResult<()> {
        let path = self.path_for(session_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::SessionStore(format!(
                "cannot remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// One open cart. Empty until its stored copy has been read.
type SessionCell = Arc<StdMutex<Option<CartSession<SharedStore>>>>;

/// Open cart sessions, keyed by session id.
pub struct CartRegistry {
    store: SharedStore,
    sessions: Mutex<HashMap<String, SessionCell>>,
}

impl CartRegistry {
    pub fn new(store: SharedStore) -> Self {
        CartRegistry {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Registry whose carts vanish with the process.
    pub fn in_memory() -> Self {
        CartRegistry::new(Arc::new(MemorySessionStore::new()))
    }

    /// Current state of a cart. Unknown sessions start empty.
    ///
    /// Reading a cart that is not open goes straight to the store and does
    /// not open it.
    pub async fn state(&self, session_id: &str) -> CoreResult<CartState> {
        validate_session_id(session_id)?;
        let sessions = self.sessions.lock().await;
        let cell = match sessions.get(session_id).cloned() {
            Some(cell) => cell,
            None => {
                let store = self.store.clone();
                let id = session_id.to_string();
                let state = run_blocking(move || Ok(store.load(&id)?.unwrap_or_default())).await;
                drop(sessions);
                return state;
            }
        };
        drop(sessions);

        self.in_cell(cell, session_id, |session| Ok(session.state().clone()))
            .await
    }

    /// Applies `action` to a cart and returns the new state.
    pub async fn dispatch(&self, session_id: &str, action: CartAction) -> CoreResult<CartState> {
        validate_session_id(session_id)?;
        let cell = self
            .sessions
            .lock()
            .await
            .entry(session_id.to_string())
            .or_default()
            .clone();

        self.in_cell(cell, session_id, move |session| {
            let state = session.dispatch(action)?.clone();
            debug!(
                session = %session.id(),
                items = state.item_count(),
                "Cart updated"
            );
            Ok(state)
        })
        .await
    }

    /// Forgets a cart, including its stored copy.
    pub async fn discard(&self, session_id: &str) -> CoreResult<()> {
        validate_session_id(session_id)?;
        let mut sessions = self.sessions.lock().await;
        let cell = sessions.remove(session_id);
        let store = self.store.clone();
        let id = session_id.to_string();

        // The map stays locked until the stored copy is gone, so a cart
        // reopened afterwards cannot read it back.
        run_blocking(move || {
            let open = match &cell {
                Some(cell) => lock_cell(cell)?.take(),
                None => None,
            };
            match open {
                Some(session) => session.discard(),
                None => store.remove(&id),
            }
        })
        .await?;
        drop(sessions);

        info!(session = %session_id, "Cart discarded");
        Ok(())
    }

    /// Number of sessions held in memory.
    pub async fn open_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Runs `f` on the cart in `cell` on the blocking pool, reading the
    /// stored copy first if the cart has not been opened yet.
    async fn in_cell<T, F>(&self, cell: SessionCell, session_id: &str, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut CartSession<SharedStore>) -> CoreResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        let id = session_id.to_string();
        run_blocking(move || {
            let mut slot = lock_cell(&cell)?;
            if slot.is_none() {
                *slot = Some(CartSession::open(id.as_str(), store)?);
                debug!(session = %id, "Cart session opened");
            }
            match slot.as_mut() {
                Some(session) => f(session),
                None => Err(CoreError::SessionStore(format!("session {} not open", id))),
            }
        })
        .await
    }
}

/// Session stores do file I/O; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> CoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::SessionStore(format!("cart task failed: {}", e)))?
}

fn lock_cell(cell: &SessionCell) -> CoreResult<MutexGuard<'_, Option<CartSession<SharedStore>>>> {
    cell.lock()
        .map_err(|_| CoreError::SessionStore("cart session lock poisoned".to_string()))
}

/// Session ids become file names: letters, digits, `-` and `_` only.
fn validate_session_id(session_id: &str) -> CoreResult<()> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            "session id",
            "1-64 letters, digits, '-' or '_'",
        )
        .into())
    }
}
