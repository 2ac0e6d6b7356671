//! Two-way bindings between widgets and configuration entries
//!
//! Each binding observes one widget (or group of widgets) and one
//! configuration entry. On construction the stored value is pushed into
//! the widget; afterwards external configuration changes update the
//! widget and widget interaction writes back to the store.
//!
//! Bindings are created once at window construction and live as long as
//! the owning window. Dropping a binding cancels its store
//! subscription; the widget signal handlers only hold weak references,
//! so a dropped binding goes away completely.
//!
//! Every `apply` skips the widget mutation when the widget already
//! shows the target value. Together with the store suppressing no-op
//! writes this breaks the feedback loop where updating a widget
//! re-emits its change signal.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::warn;
use serde_json::Value;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::config::store::type_mismatch;
use crate::config::{ConfigStore, Subscription};
use crate::ui::widgets::{
    ComboWidget, FolderChooserWidget, Sensitive, SpinWidget, TextWidget, ToggleWidget,
};

/// Two-part key identifying a configuration entry.
#[derive(Debug, Clone)]
pub struct ConfigKey {
    pub category: String,
    pub option: String,
}

impl ConfigKey {
    fn new(category: &str, option: &str) -> Self {
        Self {
            category: category.to_string(),
            option: option.to_string(),
        }
    }
}

/// Shared contract of all binding variants.
pub trait Binding {
    /// Configuration key this binding synchronizes.
    fn key(&self) -> &ConfigKey;

    /// Push a configuration value into the widget's display state.
    fn apply(&self, value: &Value);
}

/// Apply the current stored value and subscribe to future changes.
///
/// The subscription callback holds only a weak reference so the store
/// never keeps a binding alive.
fn wire<B: Binding + 'static>(binding: &Rc<B>, store: &Rc<ConfigStore>) -> Subscription {
    let key = binding.key().clone();
    if let Some(value) = store.get(&key.category, &key.option) {
        binding.apply(&value);
    }

    let weak = Rc::downgrade(binding);
    store.connect(&key.category, &key.option, move |value| {
        if let Some(binding) = weak.upgrade() {
            binding.apply(value);
        }
    })
}

/// Binds a text buffer to a configuration entry.
///
/// The buffer is not written back on every keystroke; editing only
/// marks the associated save control sensitive, and the surrounding
/// dialog commits the buffer contents explicitly.
pub struct TextBufferBinding {
    widget: Rc<dyn TextWidget>,
    key: ConfigKey,
    _subscription: RefCell<Option<Subscription>>,
}

impl TextBufferBinding {
    pub fn new(
        widget: Rc<dyn TextWidget>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
        save_control: Rc<dyn Sensitive>,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widget,
            key: ConfigKey::new(category, option),
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        binding
            .widget
            .connect_changed(Box::new(move || save_control.set_sensitive(true)));

        binding
    }
}

impl Binding for TextBufferBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        let Some(text) = value.as_str() else {
            type_mismatch(&self.key.category, &self.key.option, "string", value);
            return;
        };
        if self.widget.text() != text {
            self.widget.set_text(text);
        }
    }
}

/// Binds a check button to a boolean configuration entry.
pub struct CheckButtonBinding {
    widget: Rc<dyn ToggleWidget>,
    key: ConfigKey,
    _subscription: RefCell<Option<Subscription>>,
}

impl CheckButtonBinding {
    pub fn new(
        widget: Rc<dyn ToggleWidget>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widget,
            key: ConfigKey::new(category, option),
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        let widget = Rc::clone(&binding.widget);
        let store = Rc::clone(store);
        let key = binding.key.clone();
        binding.widget.connect_toggled(Box::new(move || {
            store.set(&key.category, &key.option, widget.is_active());
        }));

        binding
    }
}

impl Binding for CheckButtonBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        let Some(active) = value.as_bool() else {
            type_mismatch(&self.key.category, &self.key.option, "boolean", value);
            return;
        };
        if self.widget.is_active() != active {
            self.widget.set_active(active);
        }
    }
}

/// Binds a text entry to a string configuration entry.
///
/// With `encode` set the stored value is base64 (used for values that
/// should not sit in the config file as plain text, e.g. the server
/// password). Decoding failures fall back to displaying the raw stored
/// string.
pub struct EntryBinding {
    widget: Rc<dyn TextWidget>,
    key: ConfigKey,
    encode: bool,
    _subscription: RefCell<Option<Subscription>>,
}

impl EntryBinding {
    pub fn new(
        widget: Rc<dyn TextWidget>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
        encode: bool,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widget,
            key: ConfigKey::new(category, option),
            encode,
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        let widget = Rc::clone(&binding.widget);
        let store = Rc::clone(store);
        let key = binding.key.clone();
        binding.widget.connect_changed(Box::new(move || {
            let text = widget.text();
            if encode {
                store.set(&key.category, &key.option, BASE64.encode(text.as_bytes()));
            } else {
                store.set(&key.category, &key.option, text);
            }
        }));

        binding
    }

    fn decode_or_raw(raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        match BASE64.decode(raw) {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| raw.to_string()),
            Err(_) => raw.to_string(),
        }
    }
}

impl Binding for EntryBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        let Some(raw) = value.as_str() else {
            type_mismatch(&self.key.category, &self.key.option, "string", value);
            return;
        };
        let text = if self.encode {
            Self::decode_or_raw(raw)
        } else {
            raw.to_string()
        };
        if self.widget.text() != text {
            self.widget.set_text(&text);
        }
    }
}

/// Binds a spin button to an integer configuration entry.
pub struct SpinButtonBinding {
    widget: Rc<dyn SpinWidget>,
    key: ConfigKey,
    _subscription: RefCell<Option<Subscription>>,
}

impl SpinButtonBinding {
    pub fn new(
        widget: Rc<dyn SpinWidget>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widget,
            key: ConfigKey::new(category, option),
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        let widget = Rc::clone(&binding.widget);
        let store = Rc::clone(store);
        let key = binding.key.clone();
        binding.widget.connect_value_changed(Box::new(move || {
            store.set(&key.category, &key.option, widget.value().round() as i64);
        }));

        binding
    }
}

impl Binding for SpinButtonBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        let Some(number) = value.as_f64() else {
            type_mismatch(&self.key.category, &self.key.option, "number", value);
            return;
        };
        if (self.widget.value() - number).abs() > f64::EPSILON {
            self.widget.set_value(number);
        }
    }
}

/// Binds a folder chooser to a path configuration entry.
pub struct FolderChooserBinding {
    widget: Rc<dyn FolderChooserWidget>,
    key: ConfigKey,
    _subscription: RefCell<Option<Subscription>>,
}

impl FolderChooserBinding {
    pub fn new(
        widget: Rc<dyn FolderChooserWidget>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widget,
            key: ConfigKey::new(category, option),
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        let widget = Rc::clone(&binding.widget);
        let store = Rc::clone(store);
        let key = binding.key.clone();
        binding.widget.connect_selection_changed(Box::new(move || {
            if let Some(path) = widget.filename() {
                store.set(
                    &key.category,
                    &key.option,
                    path.to_string_lossy().into_owned(),
                );
            }
        }));

        binding
    }
}

impl Binding for FolderChooserBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        let Some(text) = value.as_str() else {
            type_mismatch(&self.key.category, &self.key.option, "string", value);
            return;
        };
        let path = Path::new(text);
        // A selection-changed handler fires on set_current_folder, so
        // skip the call when the widget already shows this folder.
        if self.widget.filename().as_deref() != Some(path) {
            self.widget.set_current_folder(path);
        }
    }
}

/// Binds an ordered group of radio buttons to an index entry.
///
/// The stored value is the position of the active radio in the group.
/// Only the toggled-on event of a radio writes back; the toggled-off
/// events of its siblings are ignored, so exactly one index is stored
/// per selection change.
pub struct RadioGroupBinding {
    widgets: Vec<Rc<dyn ToggleWidget>>,
    key: ConfigKey,
    _subscription: RefCell<Option<Subscription>>,
}

impl RadioGroupBinding {
    pub fn new(
        widgets: Vec<Rc<dyn ToggleWidget>>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widgets,
            key: ConfigKey::new(category, option),
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        for (index, radio) in binding.widgets.iter().enumerate() {
            let radio_state = Rc::clone(radio);
            let store = Rc::clone(store);
            let key = binding.key.clone();
            radio.connect_toggled(Box::new(move || {
                if radio_state.is_active() {
                    store.set(&key.category, &key.option, index as i64);
                }
            }));
        }

        binding
    }
}

impl Binding for RadioGroupBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        let Some(index) = value.as_u64() else {
            type_mismatch(&self.key.category, &self.key.option, "index", value);
            return;
        };
        match self.widgets.get(index as usize) {
            Some(radio) => {
                if !radio.is_active() {
                    radio.set_active(true);
                }
            }
            None => warn!(
                "config: {}.{} index {} out of range ({} radio buttons)",
                self.key.category,
                self.key.option,
                index,
                self.widgets.len()
            ),
        }
    }
}

/// How a [`ComboBoxBinding`] maps between rows and the stored value.
#[derive(Clone)]
pub enum ComboMode {
    /// The stored string is a row id; the active text is stored back.
    ById,
    /// The stored value is the integer id of a row, resolved through
    /// the widget's row model in both directions (used for the
    /// preferred-cutlist selection).
    IndexLookup,
    /// Store the active text and additionally toggle a dependent
    /// widget's sensitivity based on whether one of two watched
    /// configuration values contains `needle` (used for audio
    /// normalization, which only applies to AAC streams).
    WithDependent {
        widget: Rc<dyn Sensitive>,
        watched: [(String, String); 2],
        needle: String,
    },
}

/// Binds a combo box to a configuration entry.
pub struct ComboBoxBinding {
    widget: Rc<dyn ComboWidget>,
    store: Rc<ConfigStore>,
    key: ConfigKey,
    mode: ComboMode,
    _subscription: RefCell<Option<Subscription>>,
}

impl ComboBoxBinding {
    pub fn new(
        widget: Rc<dyn ComboWidget>,
        store: &Rc<ConfigStore>,
        category: &str,
        option: &str,
        mode: ComboMode,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            widget,
            store: Rc::clone(store),
            key: ConfigKey::new(category, option),
            mode,
            _subscription: RefCell::new(None),
        });
        *binding._subscription.borrow_mut() = Some(wire(&binding, store));

        let weak = Rc::downgrade(&binding);
        binding.widget.connect_changed(Box::new(move || {
            if let Some(binding) = weak.upgrade() {
                binding.on_changed();
            }
        }));

        binding
    }

    fn on_changed(&self) {
        match &self.mode {
            ComboMode::ById => {
                if let Some(text) = self.widget.active_text() {
                    self.store.set(&self.key.category, &self.key.option, text);
                }
            }
            ComboMode::IndexLookup => {
                let Some(text) = self.widget.active_text() else {
                    return;
                };
                match self.widget.rows().iter().find(|row| row.text == text) {
                    Some(row) => self.store.set(&self.key.category, &self.key.option, row.id),
                    None => warn!(
                        "config: {}.{} active text {:?} not present in row model",
                        self.key.category, self.key.option, text
                    ),
                }
            }
            ComboMode::WithDependent {
                widget,
                watched,
                needle,
            } => {
                if let Some(text) = self.widget.active_text() {
                    self.store.set(&self.key.category, &self.key.option, text);
                }
                self.refresh_dependent(widget, watched, needle);
            }
        }
    }

    fn refresh_dependent(
        &self,
        dependent: &Rc<dyn Sensitive>,
        watched: &[(String, String); 2],
        needle: &str,
    ) {
        let enabled = watched.iter().any(|(category, option)| {
            self.store
                .get_str(category, option)
                .map_or(false, |value| value.contains(needle))
        });
        dependent.set_sensitive(enabled);
    }
}

impl Binding for ComboBoxBinding {
    fn key(&self) -> &ConfigKey {
        &self.key
    }

    fn apply(&self, value: &Value) {
        match &self.mode {
            ComboMode::IndexLookup => {
                let Some(id) = value.as_i64() else {
                    type_mismatch(&self.key.category, &self.key.option, "integer", value);
                    return;
                };
                let rows = self.widget.rows();
                match rows.iter().position(|row| row.id == id) {
                    Some(index) => {
                        let index = index as u32;
                        if self.widget.active_index() != Some(index) {
                            self.widget.set_active_index(index);
                        }
                    }
                    None => warn!(
                        "config: {}.{} id {} not present in row model",
                        self.key.category, self.key.option, id
                    ),
                }
            }
            _ => {
                let Some(text) = value.as_str() else {
                    type_mismatch(&self.key.category, &self.key.option, "string", value);
                    return;
                };
                if self.widget.active_text().as_deref() != Some(text) {
                    self.widget.set_active_id(text);
                }
                if let ComboMode::WithDependent {
                    widget,
                    watched,
                    needle,
                } = &self.mode
                {
                    self.refresh_dependent(widget, watched, needle);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widgets::{ChangedHandler, ComboRow};
    use serde_json::json;
    use std::cell::Cell;
    use std::path::PathBuf;

    // Mock widgets mirror GTK's signal behavior: programmatic mutation
    // emits the same change signal as user interaction.

    #[derive(Default)]
    struct MockEntry {
        text: RefCell<String>,
        handlers: RefCell<Vec<ChangedHandler>>,
        set_calls: Cell<u32>,
    }

    impl MockEntry {
        fn emit(&self) {
            for handler in self.handlers.borrow().iter() {
                handler();
            }
        }

        fn type_text(&self, text: &str) {
            *self.text.borrow_mut() = text.to_string();
            self.emit();
        }
    }

    impl TextWidget for MockEntry {
        fn text(&self) -> String {
            self.text.borrow().clone()
        }

        fn set_text(&self, text: &str) {
            self.set_calls.set(self.set_calls.get() + 1);
            *self.text.borrow_mut() = text.to_string();
            self.emit();
        }

        fn connect_changed(&self, handler: ChangedHandler) {
            self.handlers.borrow_mut().push(handler);
        }
    }

    #[derive(Default)]
    struct MockToggle {
        active: Cell<bool>,
        handlers: RefCell<Vec<ChangedHandler>>,
    }

    impl MockToggle {
        fn emit(&self) {
            for handler in self.handlers.borrow().iter() {
                handler();
            }
        }
    }

    impl ToggleWidget for MockToggle {
        fn is_active(&self) -> bool {
            self.active.get()
        }

        fn set_active(&self, active: bool) {
            if self.active.get() != active {
                self.active.set(active);
                self.emit();
            }
        }

        fn connect_toggled(&self, handler: ChangedHandler) {
            self.handlers.borrow_mut().push(handler);
        }
    }

    #[derive(Default)]
    struct MockSpin {
        value: Cell<f64>,
        handlers: RefCell<Vec<ChangedHandler>>,
    }

    impl SpinWidget for MockSpin {
        fn value(&self) -> f64 {
            self.value.get()
        }

        fn set_value(&self, value: f64) {
            if (self.value.get() - value).abs() > f64::EPSILON {
                self.value.set(value);
                for handler in self.handlers.borrow().iter() {
                    handler();
                }
            }
        }

        fn connect_value_changed(&self, handler: ChangedHandler) {
            self.handlers.borrow_mut().push(handler);
        }
    }

    #[derive(Default)]
    struct MockFolderChooser {
        path: RefCell<Option<PathBuf>>,
        handlers: RefCell<Vec<ChangedHandler>>,
        set_calls: Cell<u32>,
    }

    impl MockFolderChooser {
        fn emit(&self) {
            for handler in self.handlers.borrow().iter() {
                handler();
            }
        }

        fn select(&self, path: &str) {
            *self.path.borrow_mut() = Some(PathBuf::from(path));
            self.emit();
        }
    }

    impl FolderChooserWidget for MockFolderChooser {
        fn filename(&self) -> Option<PathBuf> {
            self.path.borrow().clone()
        }

        fn set_current_folder(&self, path: &Path) {
            self.set_calls.set(self.set_calls.get() + 1);
            *self.path.borrow_mut() = Some(path.to_path_buf());
            self.emit();
        }

        fn connect_selection_changed(&self, handler: ChangedHandler) {
            self.handlers.borrow_mut().push(handler);
        }
    }

    struct MockCombo {
        rows: Vec<ComboRow>,
        active: Cell<Option<u32>>,
        handlers: RefCell<Vec<ChangedHandler>>,
    }

    impl MockCombo {
        // Row ids default to the row position, as with id-less models.
        fn new(texts: &[&str]) -> Self {
            Self::with_rows(
                texts
                    .iter()
                    .enumerate()
                    .map(|(index, text)| ComboRow {
                        text: text.to_string(),
                        id: index as i64,
                    })
                    .collect(),
            )
        }

        fn with_rows(rows: Vec<ComboRow>) -> Self {
            Self {
                rows,
                active: Cell::new(None),
                handlers: RefCell::new(Vec::new()),
            }
        }

        fn emit(&self) {
            for handler in self.handlers.borrow().iter() {
                handler();
            }
        }

        fn select(&self, index: u32) {
            if self.active.get() != Some(index) {
                self.active.set(Some(index));
                self.emit();
            }
        }
    }

    impl ComboWidget for MockCombo {
        fn active_text(&self) -> Option<String> {
            self.active
                .get()
                .and_then(|index| self.rows.get(index as usize))
                .map(|row| row.text.clone())
        }

        fn active_index(&self) -> Option<u32> {
            self.active.get()
        }

        fn set_active_id(&self, id: &str) {
            if let Some(index) = self.rows.iter().position(|row| row.text == id) {
                self.select(index as u32);
            }
        }

        fn set_active_index(&self, index: u32) {
            self.select(index);
        }

        fn rows(&self) -> Vec<ComboRow> {
            self.rows.clone()
        }

        fn connect_changed(&self, handler: ChangedHandler) {
            self.handlers.borrow_mut().push(handler);
        }
    }

    #[derive(Default)]
    struct MockSensitive {
        sensitive: Cell<bool>,
    }

    impl Sensitive for MockSensitive {
        fn set_sensitive(&self, sensitive: bool) {
            self.sensitive.set(sensitive);
        }
    }

    fn store() -> Rc<ConfigStore> {
        Rc::new(ConfigStore::new())
    }

    #[test]
    fn test_entry_initializes_from_store() {
        let store = store();
        store.set("server", "url", "https://example.org");

        let entry = Rc::new(MockEntry::default());
        let _binding = EntryBinding::new(entry.clone(), &store, "server", "url", false);

        assert_eq!(entry.text(), "https://example.org");
    }

    #[test]
    fn test_entry_writes_back() {
        let store = store();
        let entry = Rc::new(MockEntry::default());
        let _binding = EntryBinding::new(entry.clone(), &store, "server", "email", false);

        entry.type_text("otr@example.org");
        assert_eq!(
            store.get_str("server", "email").as_deref(),
            Some("otr@example.org")
        );
    }

    #[test]
    fn test_entry_external_change_applied_once() {
        let store = store();
        let entry = Rc::new(MockEntry::default());
        let _binding = EntryBinding::new(entry.clone(), &store, "server", "url", false);

        store.set("server", "url", "https://example.org");

        assert_eq!(entry.text(), "https://example.org");
        // The write-back triggered by set_text must not re-apply
        assert_eq!(entry.set_calls.get(), 1);
    }

    #[test]
    fn test_entry_encode_round_trip() {
        for secret in ["hunter2", "pässwörter sind höflich", "a b\tc"] {
            let store = store();
            let entry = Rc::new(MockEntry::default());
            let _binding = EntryBinding::new(entry.clone(), &store, "server", "password", true);

            entry.type_text(secret);

            let stored = store.get_str("server", "password").unwrap();
            assert_eq!(stored, BASE64.encode(secret.as_bytes()));

            // A second widget bound to the same entry shows the decoded text
            let other = Rc::new(MockEntry::default());
            let _other_binding =
                EntryBinding::new(other.clone(), &store, "server", "password", true);
            assert_eq!(other.text(), secret);
        }
    }

    #[test]
    fn test_entry_encode_empty_value() {
        let store = store();
        store.set("server", "password", "");

        let entry = Rc::new(MockEntry::default());
        let _binding = EntryBinding::new(entry.clone(), &store, "server", "password", true);

        assert_eq!(entry.text(), "");
        assert_eq!(entry.set_calls.get(), 0);
    }

    #[test]
    fn test_entry_encode_falls_back_on_invalid_base64() {
        let store = store();
        store.set("server", "password", "%%% not base64 %%%");

        let entry = Rc::new(MockEntry::default());
        let _binding = EntryBinding::new(entry.clone(), &store, "server", "password", true);

        assert_eq!(entry.text(), "%%% not base64 %%%");
    }

    #[test]
    fn test_entry_encode_falls_back_on_non_utf8_payload() {
        let store = store();
        let stored = BASE64.encode([0xff, 0xfe, 0x00, 0x01]);
        store.set("server", "password", stored.clone());

        let entry = Rc::new(MockEntry::default());
        let _binding = EntryBinding::new(entry.clone(), &store, "server", "password", true);

        assert_eq!(entry.text(), stored);
    }

    #[test]
    fn test_check_button_both_directions() {
        let store = store();
        store.set("general", "delete_original", true);

        let check = Rc::new(MockToggle::default());
        let _binding = CheckButtonBinding::new(check.clone(), &store, "general", "delete_original");
        assert!(check.is_active());

        check.set_active(false);
        assert_eq!(store.get_bool("general", "delete_original"), Some(false));

        store.set("general", "delete_original", true);
        assert!(check.is_active());
    }

    #[test]
    fn test_spin_button_stores_integer() {
        let store = store();
        let spin = Rc::new(MockSpin::default());
        let _binding = SpinButtonBinding::new(spin.clone(), &store, "merge", "threads");

        spin.set_value(4.0);
        assert_eq!(store.get("merge", "threads"), Some(json!(4)));

        store.set("merge", "threads", 8);
        assert_eq!(spin.value(), 8.0);
    }

    #[test]
    fn test_folder_chooser_writes_back() {
        let store = store();
        let chooser = Rc::new(MockFolderChooser::default());
        let _binding = FolderChooserBinding::new(chooser.clone(), &store, "general", "folder_cut");

        chooser.select("/media/cut");
        assert_eq!(
            store.get_str("general", "folder_cut").as_deref(),
            Some("/media/cut")
        );
    }

    #[test]
    fn test_folder_chooser_skips_redundant_set() {
        let store = store();
        store.set("general", "folder_cut", "/media/cut");

        let chooser = Rc::new(MockFolderChooser::default());
        *chooser.path.borrow_mut() = Some(PathBuf::from("/media/cut"));

        let _binding = FolderChooserBinding::new(chooser.clone(), &store, "general", "folder_cut");
        assert_eq!(chooser.set_calls.get(), 0);

        // A genuinely different folder is applied
        store.set("general", "folder_cut", "/media/other");
        assert_eq!(chooser.set_calls.get(), 1);
        assert_eq!(chooser.filename(), Some(PathBuf::from("/media/other")));
    }

    // Mirror a GTK radio group: activating one deactivates the rest,
    // each transition emitting toggled.
    fn select_radio(radios: &[Rc<MockToggle>], index: usize) {
        for (other_index, radio) in radios.iter().enumerate() {
            if other_index != index {
                radio.set_active(false);
            }
        }
        radios[index].set_active(true);
    }

    #[test]
    fn test_radio_group_initializes_active_radio() {
        let store = store();
        store.set("general", "cut_action", 1);

        let radios: Vec<Rc<MockToggle>> =
            (0..3).map(|_| Rc::new(MockToggle::default())).collect();
        let widgets: Vec<Rc<dyn ToggleWidget>> = radios
            .iter()
            .map(|radio| Rc::clone(radio) as Rc<dyn ToggleWidget>)
            .collect();
        let _binding = RadioGroupBinding::new(widgets, &store, "general", "cut_action");

        assert!(radios[1].is_active());
    }

    #[test]
    fn test_radio_group_stores_active_index_only() {
        let store = store();
        let radios: Vec<Rc<MockToggle>> =
            (0..3).map(|_| Rc::new(MockToggle::default())).collect();
        let widgets: Vec<Rc<dyn ToggleWidget>> = radios
            .iter()
            .map(|radio| Rc::clone(radio) as Rc<dyn ToggleWidget>)
            .collect();
        let _binding = RadioGroupBinding::new(widgets, &store, "general", "cut_action");

        select_radio(&radios, 2);
        assert_eq!(store.get_int("general", "cut_action"), Some(2));

        // The toggled-off event of radio 2 must not overwrite the index
        select_radio(&radios, 0);
        assert_eq!(store.get_int("general", "cut_action"), Some(0));

        let active: Vec<usize> = radios
            .iter()
            .enumerate()
            .filter(|(_, radio)| radio.is_active())
            .map(|(index, _)| index)
            .collect();
        assert_eq!(active, vec![0]);
    }

    #[test]
    fn test_radio_group_ignores_out_of_range_index() {
        let store = store();
        let radios: Vec<Rc<MockToggle>> =
            (0..2).map(|_| Rc::new(MockToggle::default())).collect();
        let widgets: Vec<Rc<dyn ToggleWidget>> = radios
            .iter()
            .map(|radio| Rc::clone(radio) as Rc<dyn ToggleWidget>)
            .collect();
        let _binding = RadioGroupBinding::new(widgets, &store, "general", "cut_action");
        assert!(radios[0].is_active());

        // The previous selection is left untouched
        store.set("general", "cut_action", 9);
        assert!(radios[0].is_active());
        assert!(!radios[1].is_active());
    }

    #[test]
    fn test_combo_by_id_both_directions() {
        let store = store();
        store.set("merge", "normalize_audio", "disabled");

        let combo = Rc::new(MockCombo::new(&["disabled", "normalize", "downmix"]));
        let _binding = ComboBoxBinding::new(
            combo.clone(),
            &store,
            "merge",
            "normalize_audio",
            ComboMode::ById,
        );
        assert_eq!(combo.active_text().as_deref(), Some("disabled"));

        combo.select(1);
        assert_eq!(
            store.get_str("merge", "normalize_audio").as_deref(),
            Some("normalize")
        );
    }

    #[test]
    fn test_combo_index_lookup_resolves_row_ids() {
        let store = store();
        store.set("general", "cut_default", 20);

        let combo = Rc::new(MockCombo::with_rows(vec![
            ComboRow {
                text: "ask".to_string(),
                id: 10,
            },
            ComboRow {
                text: "best cutlist".to_string(),
                id: 20,
            },
            ComboRow {
                text: "local only".to_string(),
                id: 30,
            },
        ]));
        let _binding = ComboBoxBinding::new(
            combo.clone(),
            &store,
            "general",
            "cut_default",
            ComboMode::IndexLookup,
        );
        assert_eq!(combo.active_index(), Some(1));

        combo.select(2);
        assert_eq!(store.get_int("general", "cut_default"), Some(30));
    }

    #[test]
    fn test_combo_index_lookup_ignores_unknown_id() {
        let store = store();
        store.set("general", "cut_default", 77);

        let combo = Rc::new(MockCombo::new(&["ask", "best cutlist"]));
        let _binding = ComboBoxBinding::new(
            combo.clone(),
            &store,
            "general",
            "cut_default",
            ComboMode::IndexLookup,
        );

        assert_eq!(combo.active_index(), None);
        assert_eq!(store.get_int("general", "cut_default"), Some(77));
    }

    fn aac_mode(dependent: &Rc<MockSensitive>) -> ComboMode {
        ComboMode::WithDependent {
            widget: Rc::clone(dependent) as Rc<dyn Sensitive>,
            watched: [
                ("merge".to_string(), "first_audio_stream".to_string()),
                ("merge".to_string(), "second_audio_stream".to_string()),
            ],
            needle: "AAC".to_string(),
        }
    }

    #[test]
    fn test_combo_dependent_enabled_when_stream_is_aac() {
        let store = store();
        store.set("merge", "first_audio_stream", "AAC (transcoded)");
        store.set("merge", "normalize_audio", "disabled");

        let dependent = Rc::new(MockSensitive::default());
        let combo = Rc::new(MockCombo::new(&["disabled", "normalize"]));
        let _binding = ComboBoxBinding::new(
            combo.clone(),
            &store,
            "merge",
            "normalize_audio",
            aac_mode(&dependent),
        );

        // Initial apply already reflects the watched values
        assert!(dependent.sensitive.get());

        combo.select(1);
        assert_eq!(
            store.get_str("merge", "normalize_audio").as_deref(),
            Some("normalize")
        );
        assert!(dependent.sensitive.get());
    }

    #[test]
    fn test_combo_dependent_disabled_without_aac_stream() {
        let store = store();
        store.set("merge", "first_audio_stream", "MP2 Audio");
        store.set("merge", "second_audio_stream", "AC3 Audio");
        store.set("merge", "normalize_audio", "disabled");

        let dependent = Rc::new(MockSensitive::default());
        dependent.sensitive.set(true);

        let combo = Rc::new(MockCombo::new(&["disabled", "normalize"]));
        let _binding = ComboBoxBinding::new(
            combo.clone(),
            &store,
            "merge",
            "normalize_audio",
            aac_mode(&dependent),
        );

        combo.select(1);
        assert!(!dependent.sensitive.get());
    }

    #[test]
    fn test_text_buffer_enables_save_control() {
        let store = store();
        store.set("general", "snippets", "-- snippet --");

        let buffer = Rc::new(MockEntry::default());
        let save_button = Rc::new(MockSensitive::default());
        let _binding = TextBufferBinding::new(
            buffer.clone(),
            &store,
            "general",
            "snippets",
            save_button.clone(),
        );

        assert_eq!(buffer.text(), "-- snippet --");
        assert!(!save_button.sensitive.get());

        buffer.type_text("-- edited --");
        assert!(save_button.sensitive.get());
        // The buffer itself is committed elsewhere, not per keystroke
        assert_eq!(
            store.get_str("general", "snippets").as_deref(),
            Some("-- snippet --")
        );
    }

    #[test]
    fn test_dropped_binding_detaches_from_store() {
        let store = store();
        let entry = Rc::new(MockEntry::default());
        let binding = EntryBinding::new(entry.clone(), &store, "server", "url", false);

        store.set("server", "url", "https://one.example");
        assert_eq!(entry.text(), "https://one.example");

        drop(binding);
        store.set("server", "url", "https://two.example");
        assert_eq!(entry.text(), "https://one.example");
    }
}
