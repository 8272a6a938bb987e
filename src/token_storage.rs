//! Client-side persistence of the session token pair.
//!
//! Each token is written to two places: a persistent key-value store and a
//! cookie jar. Reads prefer the key-value store and fall back to the cookie.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;

use crate::config::{ACCESS_TOKEN_KEY, ASSISTANT_API_KEY, REFRESH_TOKEN_KEY};
use crate::models::user::TokenPair;

const ACCESS_COOKIE_DAYS: i64 = 1;
const REFRESH_COOKIE_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// A persistent string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Key-value store backed by a single JSON object on disk.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        match self.load() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!("Failed to read token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Cookie jar holding `SameSite=Strict` cookies with an expiry.
pub struct CookieJarStore {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl CookieJarStore {
    pub fn new(secure: bool) -> Self {
        CookieJarStore {
            jar: Mutex::new(CookieJar::new()),
            secure,
        }
    }

    /// Returns the cookie value unless it is missing or expired.
    pub fn get(&self, name: &str) -> Option<String> {
        let jar = self.jar.lock().ok()?;
        let cookie = jar.get(name)?;
        if let Some(expires) = cookie.expires_datetime() {
            if expires <= OffsetDateTime::now_utc() {
                return None;
            }
        }
        Some(cookie.value().to_string())
    }

    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        let jar = self.jar.lock().ok()?;
        jar.get(name).cloned()
    }

    pub fn set(&self, name: &str, value: &str, lifetime: CookieDuration) -> Result<(), StorageError> {
        let cookie = Cookie::build(name.to_string(), value.to_string())
            .path("/")
            .expires(OffsetDateTime::now_utc() + lifetime)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .finish();
        let mut jar = self.jar.lock().map_err(|_| StorageError::Poisoned)?;
        jar.add(cookie);
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<(), StorageError> {
        let mut jar = self.jar.lock().map_err(|_| StorageError::Poisoned)?;
        jar.remove(Cookie::named(name.to_string()));
        Ok(())
    }
}

/// The access/refresh token pair, stored redundantly in a key-value store
/// and a cookie jar.
pub struct TokenStorage {
    store: Box<dyn KeyValueStore>,
    cookies: CookieJarStore,
}

impl TokenStorage {
    pub fn new(store: impl KeyValueStore + 'static, cookies: CookieJarStore) -> Self {
        TokenStorage {
            store: Box::new(store),
            cookies,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), CookieJarStore::new(false))
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn cookies(&self) -> &CookieJarStore {
        &self.cookies
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn set_access_token(&self, token: &str) -> Result<(), StorageError> {
        self.write(ACCESS_TOKEN_KEY, token, CookieDuration::days(ACCESS_COOKIE_DAYS))
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.write(REFRESH_TOKEN_KEY, token, CookieDuration::days(REFRESH_COOKIE_DAYS))
    }

    pub fn set_tokens(&self, pair: &TokenPair) -> Result<(), StorageError> {
        self.set_access_token(&pair.access_token)?;
        self.set_refresh_token(&pair.refresh_token)
    }

    /// Removes both tokens from both stores. Every removal is attempted even
    /// if an earlier one fails; the first failure is returned.
    pub fn clear_tokens(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to remove {} from key-value store: {}", key, e);
                first_err.get_or_insert(e);
            }
            if let Err(e) = self.cookies.remove(key) {
                warn!("Failed to remove {} cookie: {}", key, e);
                first_err.get_or_insert(e);
            }
        }
        debug!("Cleared stored tokens");
        first_err.map_or(Ok(()), Err)
    }

    /// Whether the stored access token has an unexpired `exp` claim.
    ///
    /// The signature is not checked. Use this only to skip requests that are
    /// certain to fail, never to decide whether a caller is authenticated.
    pub fn has_valid_token(&self) -> bool {
        match self.access_token() {
            Some(token) => token_is_unexpired(&token, Utc::now().timestamp_millis()),
            None => false,
        }
    }

    pub fn assistant_api_key(&self) -> Option<String> {
        self.store.get(ASSISTANT_API_KEY).filter(|k| !k.is_empty())
    }

    pub fn set_assistant_api_key(&self, key: &str) -> Result<(), StorageError> {
        self.store.set(ASSISTANT_API_KEY, key.trim())
    }

    pub fn clear_assistant_api_key(&self) -> Result<(), StorageError> {
        self.store.remove(ASSISTANT_API_KEY)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .filter(|v| !v.is_empty())
            .or_else(|| self.cookies.get(key).filter(|v| !v.is_empty()))
    }

    fn write(&self, key: &str, value: &str, lifetime: CookieDuration) -> Result<(), StorageError> {
        let stored = self.store.set(key, value);
        if let Err(ref e) = stored {
            warn!("Failed to persist {} to key-value store: {}", key, e);
        }
        let cookie = self.cookies.set(key, value, lifetime);
        if let Err(ref e) = cookie {
            warn!("Failed to persist {} cookie: {}", key, e);
        }
        stored.and(cookie)
    }
}

fn decode_claims(token: &str) -> Option<Value> {
    let segment = token.split('.').nth(1)?;
    let trimmed = segment.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Decodes the JWT payload without verifying it and compares `exp`
/// (seconds) against `now_ms`. Malformed tokens are never valid.
pub fn token_is_unexpired(token: &str, now_ms: i64) -> bool {
    decode_claims(token)
        .and_then(|claims| claims.get("exp").and_then(Value::as_f64))
        .map(|exp| exp * 1000.0 > now_ms as f64)
        .unwrap_or(false)
}
