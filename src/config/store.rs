//! Key/value configuration store with change notification
//!
//! Options are addressed by a two-part key (category, option) and hold
//! JSON values (strings, booleans, integers). The store is shared as
//! `Rc<ConfigStore>` and is strictly single-threaded: all access happens
//! on the GTK main thread, interior mutability via `RefCell`.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::defaults;

type ValueMap = HashMap<String, HashMap<String, Value>>;
type Callback = Rc<dyn Fn(&Value)>;
type Observers = RefCell<HashMap<(String, String), Vec<(u64, Callback)>>>;

/// Configuration store for the whole application.
pub struct ConfigStore {
    values: RefCell<ValueMap>,
    // Shared with Subscription handles so dropping a handle can
    // unregister without a back-reference to the store
    observers: Rc<Observers>,
    next_id: Cell<u64>,
}

impl ConfigStore {
    /// Create a store populated with the default option table.
    pub fn new() -> Self {
        Self {
            values: RefCell::new(defaults::table()),
            observers: Rc::new(RefCell::new(HashMap::new())),
            next_id: Cell::new(0),
        }
    }

    /// Get the current value of an option.
    pub fn get(&self, category: &str, option: &str) -> Option<Value> {
        self.values
            .borrow()
            .get(category)
            .and_then(|options| options.get(option))
            .cloned()
    }

    /// Get an option as a string.
    pub fn get_str(&self, category: &str, option: &str) -> Option<String> {
        self.get(category, option)
            .and_then(|value| value.as_str().map(|s| s.to_string()))
    }

    /// Get an option as a boolean.
    pub fn get_bool(&self, category: &str, option: &str) -> Option<bool> {
        self.get(category, option).and_then(|value| value.as_bool())
    }

    /// Get an option as an integer.
    pub fn get_int(&self, category: &str, option: &str) -> Option<i64> {
        self.get(category, option).and_then(|value| value.as_i64())
    }

    /// Store a new value and notify subscribers of that key.
    ///
    /// Writing a value equal to the stored one is a no-op and does not
    /// notify; this breaks widget/config feedback loops where pushing a
    /// value into a widget re-emits the widget's change signal.
    pub fn set(&self, category: &str, option: &str, value: impl Into<Value>) {
        let value = value.into();

        {
            let mut values = self.values.borrow_mut();
            let options = values.entry(category.to_string()).or_default();
            if options.get(option) == Some(&value) {
                debug!("config: {}.{} unchanged, skipping", category, option);
                return;
            }
            options.insert(option.to_string(), value.clone());
        }

        // Collect callbacks first so the borrow is released before any
        // callback runs; a callback may call back into the store.
        let callbacks: Vec<Callback> = self
            .observers
            .borrow()
            .get(&(category.to_string(), option.to_string()))
            .map(|subscribers| subscribers.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        for callback in callbacks {
            callback(&value);
        }
    }

    /// Subscribe to changes of one option.
    ///
    /// The returned [`Subscription`] unregisters the callback when
    /// dropped, so its lifetime should be tied to the widget (or
    /// binding) the callback mutates.
    pub fn connect(
        &self,
        category: &str,
        option: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let key = (category.to_string(), option.to_string());
        self.observers
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .push((id, Rc::new(callback)));

        Subscription {
            observers: Rc::clone(&self.observers),
            key,
            id,
        }
    }

    /// Load configuration from disk, falling back to defaults when no
    /// file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            info!("no configuration file at {:?}, using defaults", path);
            return Ok(Self::new());
        }
        Self::load_from_path(&path)
    }

    /// Load configuration from a specific file path.
    ///
    /// Stored values are merged over the defaults table; categories and
    /// options unknown to the table are kept verbatim.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {:?}", path))?;
        let stored: ValueMap = serde_json::from_str(&content)
            .with_context(|| format!("parsing configuration from {:?}", path))?;

        let store = Self::new();
        {
            let mut values = store.values.borrow_mut();
            for (category, options) in stored {
                let entry = values.entry(category).or_default();
                for (option, value) in options {
                    entry.insert(option, value);
                }
            }
        }
        Ok(store)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating configuration directory {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(&*self.values.borrow())?;
        std::fs::write(path, content)
            .with_context(|| format!("writing configuration to {:?}", path))?;
        info!("configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path.
    fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "recut-app", "recut")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a registered change callback.
///
/// Dropping the subscription unregisters the callback.
pub struct Subscription {
    observers: Rc<Observers>,
    key: (String, String),
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut observers = self.observers.borrow_mut();
        if let Some(subscribers) = observers.get_mut(&self.key) {
            subscribers.retain(|(id, _)| *id != self.id);
            if subscribers.is_empty() {
                observers.remove(&self.key);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("values", &self.values.borrow())
            .finish()
    }
}

/// Warn-level helper for values of an unexpected type.
///
/// Malformed values are not repaired here; widget mutators receive
/// whatever the bindings can coerce and the mismatch is only logged.
pub(crate) fn type_mismatch(category: &str, option: &str, expected: &str, value: &Value) {
    warn!(
        "config: {}.{} expected {}, got {:?}",
        category, option, expected, value
    );
}
