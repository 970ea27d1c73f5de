//! Global app container.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The page keeps the WASM module alive, so the store and session
//! persist across `handle_request` calls for the whole browser session.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::Config;
use crate::monster::store::{MonsterPersistence, MonsterStore};
use crate::session::{Credentials, SessionGate};
use crate::storage::{BridgeStorage, SharedStorage, StorageWrite};

pub struct App {
    pub config: Config,
    pub storage: Rc<RefCell<BridgeStorage>>,
    pub store: MonsterStore,
    pub session: SessionGate,
}

impl App {
    /// Build store and session over an existing storage mirror.
    pub fn with_storage(config: Config, storage: Rc<RefCell<BridgeStorage>>) -> Self {
        let shared: SharedStorage = storage.clone();
        let store = MonsterStore::open(MonsterPersistence::new(shared.clone(), &config.monsters_key));
        let session = SessionGate::restore(
            shared,
            &config.session_key,
            Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
        );
        Self {
            config,
            storage,
            store,
            session,
        }
    }

    pub fn new(config: Config) -> Self {
        let storage = Rc::new(RefCell::new(BridgeStorage::new(config.storage_quota_bytes)));
        Self::with_storage(config, storage)
    }
}

thread_local! {
    static APP: RefCell<App> = RefCell::new(App::new(Config::default()));
}

/// Execute a closure with read access to the app.
pub fn with_app<F, R>(f: F) -> R
where
    F: FnOnce(&App) -> R,
{
    APP.with(|a| f(&a.borrow()))
}

/// Execute a closure with mutable access to the app.
pub fn with_app_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut App) -> R,
{
    APP.with(|a| f(&mut a.borrow_mut()))
}

/// Rebuild from scratch with a new config and empty storage.
pub fn reset_app(config: Config) {
    APP.with(|a| {
        *a.borrow_mut() = App::new(config);
    });
}

/// Load browser storage into the mirror and re-read store and session from
/// it. `None` marks storage as unavailable.
pub fn hydrate(entries: Option<BTreeMap<String, String>>) {
    with_app_mut(|app| {
        let mut mirror = BridgeStorage::new(app.config.storage_quota_bytes);
        match entries {
            Some(entries) => mirror.hydrate(entries),
            None => mirror.set_available(false),
        }
        *app.storage.borrow_mut() = mirror;
        *app = App::with_storage(app.config.clone(), app.storage.clone());
    });
}

/// Pending storage writes for the JS bridge, oldest first.
pub fn drain_writes() -> Vec<StorageWrite> {
    with_app(|app| app.storage.borrow_mut().drain_writes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::model::{Monster, default_monsters};

    #[test]
    fn default_app_starts_anonymous_with_defaults() {
        reset_app(Config::default());
        with_app(|app| {
            assert!(!app.session.is_authenticated());
            assert_eq!(app.store.list(), default_monsters());
        });
    }

    #[test]
    fn hydrate_restores_list_and_session() {
        reset_app(Config::default());
        let list = serde_json::to_string(&vec![Monster::new("Imp", "Tiny.", false, "")]).unwrap();
        hydrate(Some(BTreeMap::from([
            ("monster_list".to_string(), list),
            ("auth_logged_in".to_string(), "true".to_string()),
        ])));
        with_app(|app| {
            assert!(app.session.is_authenticated());
            assert_eq!(app.store.len(), 1);
        });
        assert!(drain_writes().is_empty());
        reset_app(Config::default());
    }

    #[test]
    fn mutations_reach_the_journal() {
        reset_app(Config::default());
        with_app_mut(|app| app.store.unfavorite_all());
        let writes = drain_writes();
        assert_eq!(writes.len(), 1);
        assert!(matches!(&writes[0], StorageWrite::Set { key, .. } if key == "monster_list"));
        reset_app(Config::default());
    }

    #[test]
    fn hydrate_unavailable_falls_back() {
        reset_app(Config::default());
        hydrate(None);
        with_app_mut(|app| {
            assert_eq!(app.store.list(), default_monsters());
            app.store.unfavorite_all();
        });
        assert!(drain_writes().is_empty());
        reset_app(Config::default());
    }
}
