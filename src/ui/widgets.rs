//! Widget interfaces consumed by the binding layer
//!
//! Each trait captures exactly the accessor/mutator pair and the change
//! signal one binding variant needs. The GTK4 implementations live in
//! [`crate::ui::gtk`] behind the `gtk` feature; tests drive the bindings
//! through plain mock implementations.

use std::path::{Path, PathBuf};

/// Callback invoked when a widget's value changes.
pub type ChangedHandler = Box<dyn Fn()>;

/// A single-line or multi-line text widget (entry, text buffer).
pub trait TextWidget {
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
    fn connect_changed(&self, handler: ChangedHandler);
}

/// A two-state widget (check button, radio button).
pub trait ToggleWidget {
    fn is_active(&self) -> bool;
    fn set_active(&self, active: bool);
    fn connect_toggled(&self, handler: ChangedHandler);
}

/// A numeric spinner widget.
pub trait SpinWidget {
    fn value(&self) -> f64;
    fn set_value(&self, value: f64);
    fn connect_value_changed(&self, handler: ChangedHandler);
}

/// A folder selection widget.
pub trait FolderChooserWidget {
    /// Currently selected path, if any.
    fn filename(&self) -> Option<PathBuf>;
    fn set_current_folder(&self, path: &Path);
    fn connect_selection_changed(&self, handler: ChangedHandler);
}

/// One row of a combo box model: display text plus an integer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboRow {
    pub text: String,
    pub id: i64,
}

/// A combo box widget with a row model.
pub trait ComboWidget {
    fn active_text(&self) -> Option<String>;
    fn active_index(&self) -> Option<u32>;
    fn set_active_id(&self, id: &str);
    fn set_active_index(&self, index: u32);
    /// Snapshot of the row model.
    fn rows(&self) -> Vec<ComboRow>;
    fn connect_changed(&self, handler: ChangedHandler);
}

/// Anything whose sensitivity (enabled state) can be toggled.
///
/// Used for dependent widgets a binding enables or disables as a side
/// effect, e.g. a save button or an option that only applies to some
/// codec selections.
pub trait Sensitive {
    fn set_sensitive(&self, sensitive: bool);
}
