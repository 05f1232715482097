use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use model::session::Session;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const DRIVER_ID_KEY: &str = "driverId";

/// String key/value store holding the driver's credentials, typically the
/// platform's secure storage.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Reads the current session. A missing or empty token, or a driver id that
/// is not a number, means there is no session.
pub fn current_session(store: &dyn CredentialStore) -> Option<Session> {
    let auth_token = store.get(AUTH_TOKEN_KEY).filter(|token| !token.is_empty())?;
    let driver_id = store.get(DRIVER_ID_KEY)?.trim().parse().ok()?;
    Some(Session::new(auth_token, driver_id))
}

pub fn store_session(store: &dyn CredentialStore, session: &Session) {
    store.set(AUTH_TOKEN_KEY, &session.auth_token);
    store.set(DRIVER_ID_KEY, &session.driver_id.to_string());
}

pub fn clear_session(store: &dyn CredentialStore) {
    store.remove(AUTH_TOKEN_KEY);
    store.remove(DRIVER_ID_KEY);
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
