// Process-wide runtime: logger, session registry, init/teardown

use crate::host::{FfiBridge, FfiWakeLock, FfiWidgets};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use playshim_core::UiController;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

/// One registered session together with the widgets it renders to
pub(crate) struct SessionEntry {
    pub controller: UiController<FfiBridge, FfiWakeLock>,
    pub widgets: FfiWidgets,
}

pub(crate) type SharedEntry = Arc<Mutex<SessionEntry>>;

/// Session registry plus the initialized flag
pub(crate) struct Runtime {
    initialized: AtomicBool,
    sessions: Mutex<HashMap<i64, SharedEntry>>,
    next_id: Mutex<i64>,
}

pub(crate) static RUNTIME: Lazy<Runtime> = Lazy::new(Runtime::new);
static INIT_LOGGER: Once = Once::new();

pub(crate) fn init_logging() {
    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Debug)
                    .with_tag("PlayShim"),
            );
        }

        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::builder()
                .is_test(cfg!(test))
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .try_init();
        }
    });
}

impl Runtime {
    pub(crate) fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            sessions: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
        }
    }

    /// Returns false when the runtime was already initialized
    pub(crate) fn init(&self) -> bool {
        init_logging();
        if self.initialized.swap(true, Ordering::SeqCst) {
            log::debug!("[runtime] already initialized");
            return false;
        }
        log::info!("[runtime] initialized");
        true
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Shut down every registered session. Returns how many were shut down.
    pub(crate) fn deinit(&self) -> usize {
        if !self.initialized.swap(false, Ordering::SeqCst) {
            return 0;
        }

        let sessions: Vec<(i64, SharedEntry)> = self.sessions.lock().drain().collect();
        let count = sessions.len();
        for (id, entry) in sessions {
            let mut entry = entry.lock();
            let SessionEntry { controller, widgets } = &mut *entry;
            if let Err(e) = controller.deactivate(widgets) {
                log::error!("[runtime] session {} shutdown failed: {}", id, e);
            }
        }
        log::info!("[runtime] deinitialized, {} sessions shut down", count);
        count
    }

    pub(crate) fn register(&self, entry: SessionEntry) -> i64 {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        drop(next);

        self.sessions.lock().insert(id, Arc::new(Mutex::new(entry)));
        log::info!("[runtime] session {} registered", id);
        id
    }

    /// Look a session up; the registry lock is released before the entry is used
    pub(crate) fn get(&self, id: i64) -> Option<SharedEntry> {
        let entry = self.sessions.lock().get(&id).cloned();
        if entry.is_none() {
            log::error!("[runtime] invalid session id {}", id);
        }
        entry
    }

    pub(crate) fn remove(&self, id: i64) -> Option<SharedEntry> {
        self.sessions.lock().remove(&id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().len()
    }
}
