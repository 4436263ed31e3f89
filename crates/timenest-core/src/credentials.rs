//! Bearer credential lookup for the task store.

use crate::error::Result;

/// Keyring entry holding the task store bearer token.
pub const TOKEN_KEY: &str = "task_store_token";

/// Environment variable that takes precedence over the keyring.
pub const TOKEN_ENV: &str = "TIMENEST_TOKEN";

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::Result;

    const SERVICE: &str = "timenest";

    pub fn get(key: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Supplies the bearer token for task store requests.
pub trait TokenProvider: Send + Sync {
    /// `Ok(None)` means the user is signed out.
    fn token(&self) -> Result<Option<String>>;
}

/// Reads `TIMENEST_TOKEN`, then the OS keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringTokenProvider;

impl TokenProvider for KeyringTokenProvider {
    fn token(&self) -> Result<Option<String>> {
        if let Some(token) = env_token() {
            return Ok(Some(token));
        }
        Ok(keyring_store::get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty()))
    }
}

/// Fixed token, or none.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenProvider(pub Option<String>);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}

fn env_token() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn store_token(token: &str) -> Result<()> {
    keyring_store::set(TOKEN_KEY, token.trim())
}

pub fn clear_token() -> Result<()> {
    keyring_store::delete(TOKEN_KEY)
}
