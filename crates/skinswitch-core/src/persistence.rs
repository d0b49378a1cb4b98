//! Remembered-skin persistence.
//!
//! The coordinator only sees [`PersistenceAdapter`]. Three shapes ship with
//! the crate: a cookie-style keyed store ([`CookieStore`] over a
//! [`CookieJar`]), a single user closure acting as getter and setter
//! ([`CustomStore`]), and a JSON file on disk ([`FileStore`]).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use skinswitch_types::error::{Result, SwitchError};

use crate::registry::SkinDescriptor;

/// Get/set of the remembered skin name.
pub trait PersistenceAdapter {
    /// Whether the underlying store can be used at all. An unavailable
    /// store disables remembering for the page.
    fn is_available(&self) -> bool {
        true
    }

    /// The remembered skin name, if any.
    fn load(&mut self) -> Option<String>;

    /// Remember `skin`, or forget when `None`.
    fn store(&mut self, skin: Option<&SkinDescriptor>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Cookie store
// ---------------------------------------------------------------------------

/// Cookie lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// Ends with the browsing session.
    #[default]
    Session,
    /// Expires after N days. Negative values delete the cookie.
    Days(i64),
}

/// Attributes written alongside the remembered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub name: String,
    pub expires: Expiry,
    pub path: String,
    pub domain: String,
    pub secure: bool,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: "skinswitch-skin".to_string(),
            expires: Expiry::Session,
            path: String::new(),
            domain: String::new(),
            secure: false,
        }
    }
}

/// A stored cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub value: String,
    pub expires: Expiry,
    pub path: String,
    pub domain: String,
    pub secure: bool,
}

/// Minimal string-keyed cookie store.
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: BTreeMap<String, Cookie>,
    enabled: bool,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self {
            cookies: BTreeMap::new(),
            enabled: true,
        }
    }

    /// A jar whose user agent refuses cookies.
    pub fn disabled() -> Self {
        Self {
            cookies: BTreeMap::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Write or delete a cookie. `None` or a negative expiry deletes.
    pub fn set(&mut self, name: &str, value: Option<&str>, options: &CookieOptions) {
        if !self.enabled {
            return;
        }
        let expired = matches!(options.expires, Expiry::Days(d) if d < 0);
        match value {
            Some(v) if !expired => {
                self.cookies.insert(
                    name.to_string(),
                    Cookie {
                        value: v.to_string(),
                        expires: options.expires,
                        path: options.path.clone(),
                        domain: options.domain.clone(),
                        secure: options.secure,
                    },
                );
            },
            _ => {
                self.cookies.remove(name);
            },
        }
    }
}

/// Remembers the skin name in a cookie.
#[derive(Debug, Clone)]
pub struct CookieStore {
    jar: CookieJar,
    options: CookieOptions,
}

impl CookieStore {
    pub fn new(jar: CookieJar, options: CookieOptions) -> Self {
        Self { jar, options }
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn options(&self) -> &CookieOptions {
        &self.options
    }
}

impl PersistenceAdapter for CookieStore {
    fn is_available(&self) -> bool {
        self.jar.is_enabled() && !self.options.name.is_empty()
    }

    fn load(&mut self) -> Option<String> {
        self.jar
            .get(&self.options.name)
            .map(|c| c.value.clone())
            .filter(|v| !v.is_empty())
    }

    fn store(&mut self, skin: Option<&SkinDescriptor>) -> Result<()> {
        let name = self.options.name.clone();
        self.jar
            .set(&name, skin.map(|s| s.name.as_str()), &self.options);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Custom closure
// ---------------------------------------------------------------------------

/// A call into a [`CustomStore`] closure.
#[derive(Debug, Clone, Copy)]
pub enum StoreCall<'a> {
    /// Return the remembered name.
    Get,
    /// Remember `name` (or forget when `None`); `skin` is the full descriptor.
    Set {
        name: Option<&'a str>,
        skin: Option<&'a SkinDescriptor>,
    },
}

type StoreFn = Box<dyn FnMut(StoreCall<'_>) -> Option<String>>;

/// One user function acting as both getter and setter.
pub struct CustomStore {
    f: StoreFn,
}

impl CustomStore {
    pub fn new(f: impl FnMut(StoreCall<'_>) -> Option<String> + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl fmt::Debug for CustomStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStore").finish_non_exhaustive()
    }
}

impl PersistenceAdapter for CustomStore {
    fn load(&mut self) -> Option<String> {
        (self.f)(StoreCall::Get).filter(|v| !v.is_empty())
    }

    fn store(&mut self, skin: Option<&SkinDescriptor>) -> Result<()> {
        (self.f)(StoreCall::Set {
            name: skin.map(|s| s.name.as_str()),
            skin,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Remembers the skin name under `key` in a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    key: String,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: path.into(),
            key: key.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.is_file() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl PersistenceAdapter for FileStore {
    fn is_available(&self) -> bool {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.is_dir(),
            _ => true,
        }
    }

    fn load(&mut self) -> Option<String> {
        match self.read_map() {
            Ok(mut map) => map.remove(&self.key).filter(|v| !v.is_empty()),
            Err(e) => {
                log::warn!("Ignoring unreadable skin store {}: {e}", self.path.display());
                None
            },
        }
    }

    fn store(&mut self, skin: Option<&SkinDescriptor>) -> Result<()> {
        // A corrupt file is left alone rather than overwritten.
        let mut map = self
            .read_map()
            .map_err(|e| SwitchError::Persistence(format!("{}: {e}", self.path.display())))?;
        match skin {
            Some(s) => {
                map.insert(self.key.clone(), s.name.clone());
            },
            None => {
                map.remove(&self.key);
            },
        }
        let text = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, text)
            .map_err(|e| SwitchError::Persistence(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn skin(name: &str) -> SkinDescriptor {
        SkinDescriptor {
            name: name.to_string(),
            stylesheet: format!("/{name}.css"),
            thumbnail: format!("/{name}.png"),
            class_token: name.to_lowercase(),
            external: false,
        }
    }

    #[test]
    fn cookie_store_round_trips_name() {
        let mut store = CookieStore::new(CookieJar::new(), CookieOptions::default());
        assert!(store.is_available());
        assert_eq!(store.load(), None);
        store.store(Some(&skin("Sunny"))).unwrap();
        assert_eq!(store.load().as_deref(), Some("Sunny"));
        store.store(None).unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn cookie_attributes_are_recorded() {
        let options = CookieOptions {
            name: "theme".into(),
            expires: Expiry::Days(30),
            path: "/".into(),
            domain: "example.com".into(),
            secure: true,
        };
        let mut store = CookieStore::new(CookieJar::new(), options);
        store.store(Some(&skin("Flick"))).unwrap();
        let cookie = store.jar().get("theme").unwrap();
        assert_eq!(cookie.value, "Flick");
        assert_eq!(cookie.expires, Expiry::Days(30));
        assert_eq!(cookie.domain, "example.com");
        assert!(cookie.secure);
    }

    #[test]
    fn negative_expiry_deletes() {
        let mut jar = CookieJar::new();
        jar.set("theme", Some("A"), &CookieOptions::default());
        let expire = CookieOptions {
            expires: Expiry::Days(-1),
            ..CookieOptions::default()
        };
        jar.set("theme", Some("A"), &expire);
        assert!(jar.get("theme").is_none());
    }

    #[test]
    fn disabled_jar_is_unavailable() {
        let store = CookieStore::new(CookieJar::disabled(), CookieOptions::default());
        assert!(!store.is_available());
    }

    #[test]
    fn unnamed_cookie_is_unavailable() {
        let options = CookieOptions {
            name: String::new(),
            ..CookieOptions::default()
        };
        let store = CookieStore::new(CookieJar::new(), options);
        assert!(!store.is_available());
    }

    #[test]
    fn custom_store_acts_as_getter_and_setter() {
        let saved: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(Some("Blitzer".into())));
        let cell = Rc::clone(&saved);
        let mut store = CustomStore::new(move |call| match call {
            StoreCall::Get => cell.borrow().clone(),
            StoreCall::Set { name, skin } => {
                assert_eq!(name, skin.map(|s| s.name.as_str()));
                *cell.borrow_mut() = name.map(str::to_string);
                None
            },
        });
        assert_eq!(store.load().as_deref(), Some("Blitzer"));
        store.store(Some(&skin("Humanity"))).unwrap();
        assert_eq!(saved.borrow().as_deref(), Some("Humanity"));
        store.store(None).unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.json");
        let mut first = FileStore::new(&path, "skin");
        assert!(first.is_available());
        assert_eq!(first.load(), None);
        first.store(Some(&skin("Cupertino"))).unwrap();

        let mut second = FileStore::new(&path, "skin");
        assert_eq!(second.load().as_deref(), Some("Cupertino"));
        second.store(None).unwrap();
        assert_eq!(FileStore::new(&path, "skin").load(), None);
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"lang":"en"}"#).unwrap();
        let mut store = FileStore::new(&path, "skin");
        store.store(Some(&skin("Eggplant"))).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"lang\""));
        assert!(text.contains("Eggplant"));
    }

    #[test]
    fn file_store_in_missing_directory_is_unavailable() {
        let store = FileStore::new("/nonexistent/dir/skin.json", "skin");
        assert!(!store.is_available());
    }

    #[test]
    fn write_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // The path is a directory, so the write fails.
        let mut store = FileStore::new(dir.path(), "skin");
        let err = store.store(Some(&skin("Sunny"))).unwrap_err();
        assert!(matches!(err, SwitchError::Persistence(_)));
    }

    #[test]
    fn corrupt_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileStore::new(&path, "skin").load(), None);
    }

    #[test]
    fn corrupt_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.json");
        std::fs::write(&path, "not json").unwrap();
        let mut store = FileStore::new(&path, "skin");
        let err = store.store(Some(&skin("Sunny"))).unwrap_err();
        assert!(matches!(err, SwitchError::Persistence(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }
}
