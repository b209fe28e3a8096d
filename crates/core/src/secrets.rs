//! Secret storage contract and the access-token provider built on it.
//!
//! The platform shell supplies a durable [`SecretStore`] (keychain, keystore,
//! encrypted settings); the sync and API layers only ever read "current token
//! or none" through [`TokenProvider`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::{Error, Result};

/// Key under which the API access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Durable process-wide secret storage.
pub trait SecretStore: Send + Sync {
    fn get_secret(&self, key: &str) -> Result<Option<String>>;
    fn set_secret(&self, key: &str, value: &str) -> Result<()>;
    fn delete_secret(&self, key: &str) -> Result<()>;
}

/// Read-only view of the current bearer token, consumed per request.
pub trait TokenProvider: Send + Sync {
    /// Current access token, or `None` when signed out.
    fn access_token(&self) -> Option<String>;
}

/// Token provider backed by a [`SecretStore`].
pub struct AccessTokenProvider {
    store: Arc<dyn SecretStore>,
}

impl AccessTokenProvider {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set_secret(ACCESS_TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.store.delete_secret(ACCESS_TOKEN_KEY)
    }
}

impl TokenProvider for AccessTokenProvider {
    fn access_token(&self) -> Option<String> {
        match self.store.get_secret(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(err) => {
                log::warn!("Failed to read access token from secret store: {}", err);
                None
            }
        }
    }
}

/// Process-memory secret store, used in tests and as a placeholder until the
/// platform shell wires a durable one.
#[derive(Default)]
pub struct InMemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Unexpected("secret store lock is poisoned".to_string()))
    }
}

impl SecretStore for InMemorySecretStore {
    fn get_secret(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set_secret(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
