//! Device Identity
//!
//! The app has no user accounts. Each browser gets an opaque device token
//! from the API once, keeps it in local storage and sends it with every call.

use std::sync::RwLock;

use crate::error::ApiError;

/// Somewhere to keep the token between sessions
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), ApiError>;
}

/// Mints new tokens (the `/device` endpoint in production)
#[allow(async_fn_in_trait)]
pub trait TokenIssuer {
    async fn issue_token(&self) -> Result<String, ApiError>;
}

/// `window.localStorage` under a fixed key
pub struct LocalStorageTokenStore {
    key: String,
}

impl LocalStorageTokenStore {
    /// None when the browser exposes no local storage (private mode, sandboxed iframe)
    pub fn open(key: &str) -> Option<Self> {
        storage()?;
        Some(Self { key: key.to_string() })
    }
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        storage()?.get_item(&self.key).ok().flatten()
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        let storage = storage().ok_or_else(|| ApiError::Storage("localStorage unavailable".into()))?;
        storage
            .set_item(&self.key, token)
            .map_err(|e| ApiError::Storage(format!("{:?}", e)))
    }
}

/// Session-only store, used when local storage is unavailable
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ApiError::Storage("token lock poisoned".into()))?;
        *guard = Some(token.to_string());
        Ok(())
    }
}

/// Identity provider with a single `get_or_create` entry point
pub struct DeviceIdentity {
    store: Box<dyn TokenStore>,
}

impl DeviceIdentity {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Local storage when available, otherwise an in-memory store
    pub fn for_browser(key: &str) -> Self {
        match LocalStorageTokenStore::open(key) {
            Some(store) => Self::new(Box::new(store)),
            None => {
                log::warn!("[ID] localStorage unavailable, device token will not persist");
                Self::new(Box::new(MemoryTokenStore::default()))
            }
        }
    }

    /// Return the stored token, or mint and persist a new one.
    ///
    /// Two concurrent callers on an empty store may both mint; the app
    /// calls this once at startup.
    pub async fn get_or_create<I: TokenIssuer>(&self, issuer: &I) -> Result<String, ApiError> {
        if let Some(token) = self.store.load().filter(|t| !t.is_empty()) {
            return Ok(token);
        }
        let token = issuer.issue_token().await?;
        self.store.save(&token)?;
        log::info!("[ID] registered new device");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    struct CountingIssuer {
        calls: Cell<u32>,
        fail: bool,
    }

    impl CountingIssuer {
        fn new(fail: bool) -> Self {
            Self { calls: Cell::new(0), fail }
        }
    }

    impl TokenIssuer for CountingIssuer {
        async fn issue_token(&self) -> Result<String, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(ApiError::Network("offline".into()))
            } else {
                Ok(format!("dev_{}", self.calls.get()))
            }
        }
    }

    #[test]
    fn test_creates_once_then_reuses() {
        let identity = DeviceIdentity::new(Box::new(MemoryTokenStore::default()));
        let issuer = CountingIssuer::new(false);

        let first = block_on(identity.get_or_create(&issuer)).unwrap();
        let second = block_on(identity.get_or_create(&issuer)).unwrap();

        assert_eq!(first, "dev_1");
        assert_eq!(second, "dev_1");
        assert_eq!(issuer.calls.get(), 1);
    }

    #[test]
    fn test_stored_token_skips_issuer() {
        let store = MemoryTokenStore::default();
        store.save("dev_saved").unwrap();
        let identity = DeviceIdentity::new(Box::new(store));
        let issuer = CountingIssuer::new(false);

        assert_eq!(block_on(identity.get_or_create(&issuer)).unwrap(), "dev_saved");
        assert_eq!(issuer.calls.get(), 0);
    }

    #[test]
    fn test_empty_stored_token_is_replaced() {
        let store = MemoryTokenStore::default();
        store.save("").unwrap();
        let identity = DeviceIdentity::new(Box::new(store));
        let issuer = CountingIssuer::new(false);

        assert_eq!(block_on(identity.get_or_create(&issuer)).unwrap(), "dev_1");
    }

    #[test]
    fn test_issuer_failure_persists_nothing() {
        let identity = DeviceIdentity::new(Box::new(MemoryTokenStore::default()));
        let failing = CountingIssuer::new(true);
        assert!(block_on(identity.get_or_create(&failing)).is_err());

        let working = CountingIssuer::new(false);
        assert_eq!(block_on(identity.get_or_create(&working)).unwrap(), "dev_1");
    }
}
