//! Session gate: a single persisted "logged in" flag checked against one
//! fixed credential pair.
//!
//! The flag is stored as the literal `"true"`; any other stored value, a
//! missing key, or unreadable storage restores as anonymous.

use crate::error::AuthError;
use crate::storage::SharedStorage;

const AUTHENTICATED: &str = "true";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct SessionGate {
    storage: SharedStorage,
    key: String,
    credentials: Credentials,
    authenticated: bool,
}

impl SessionGate {
    /// Restore from the persisted flag.
    pub fn restore(storage: SharedStorage, key: &str, credentials: Credentials) -> Self {
        let authenticated = match storage.borrow().get(key) {
            Ok(value) => value.as_deref() == Some(AUTHENTICATED),
            Err(e) => {
                log::warn!("session flag unreadable: {}", e);
                false
            }
        };
        Self {
            storage,
            key: key.to_string(),
            credentials,
            authenticated,
        }
    }

    /// Check credentials. Failure always leaves the gate anonymous, even if
    /// a session was active before.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if username == self.credentials.username && password == self.credentials.password {
            self.authenticated = true;
            if let Err(e) = self.storage.borrow_mut().set(&self.key, AUTHENTICATED) {
                log::warn!("session flag not persisted: {}", e);
            }
            log::info!("login succeeded");
            Ok(())
        } else {
            self.clear();
            log::info!("login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        self.clear();
        log::info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn clear(&mut self) {
        self.authenticated = false;
        if let Err(e) = self.storage.borrow_mut().remove(&self.key) {
            log::warn!("session flag not cleared: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BridgeStorage, KeyValueStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY: &str = "auth_logged_in";

    fn creds() -> Credentials {
        Credentials {
            username: "bob@bob.com".into(),
            password: "Test123".into(),
        }
    }

    fn gate(storage: &Rc<RefCell<BridgeStorage>>) -> SessionGate {
        let shared: SharedStorage = storage.clone();
        SessionGate::restore(shared, KEY, creds())
    }

    fn storage() -> Rc<RefCell<BridgeStorage>> {
        Rc::new(RefCell::new(BridgeStorage::new(1024)))
    }

    #[test]
    fn login_succeeds_and_persists() {
        let storage = storage();
        let mut gate = gate(&storage);
        assert!(!gate.is_authenticated());
        gate.login("bob@bob.com", "Test123").unwrap();
        assert!(gate.is_authenticated());
        assert_eq!(storage.borrow().get(KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn failed_login_clears_existing_session() {
        let storage = storage();
        let mut gate = gate(&storage);
        gate.login("bob@bob.com", "Test123").unwrap();
        assert_eq!(gate.login("bob@bob.com", "test123"), Err(AuthError::InvalidCredentials));
        assert!(!gate.is_authenticated());
        assert_eq!(storage.borrow().get(KEY).unwrap(), None);
    }

    #[test]
    fn logout_clears_flag() {
        let storage = storage();
        let mut gate = gate(&storage);
        gate.login("bob@bob.com", "Test123").unwrap();
        gate.logout();
        assert!(!gate.is_authenticated());
        assert_eq!(storage.borrow().get(KEY).unwrap(), None);
    }

    #[test]
    fn restore_requires_literal_true() {
        let storage = storage();
        storage.borrow_mut().set(KEY, "true").unwrap();
        assert!(gate(&storage).is_authenticated());
        storage.borrow_mut().set(KEY, "TRUE").unwrap();
        assert!(!gate(&storage).is_authenticated());
        storage.borrow_mut().set(KEY, "1").unwrap();
        assert!(!gate(&storage).is_authenticated());
    }

    #[test]
    fn restore_from_unavailable_storage_is_anonymous() {
        let storage = Rc::new(RefCell::new(BridgeStorage::unavailable()));
        let mut gate = gate(&storage);
        assert!(!gate.is_authenticated());
        // Login still works for the session even though nothing persists.
        gate.login("bob@bob.com", "Test123").unwrap();
        assert!(gate.is_authenticated());
    }
}
