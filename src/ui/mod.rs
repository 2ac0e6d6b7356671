//! Widget interfaces and configuration bindings

pub mod bindings;
#[cfg(feature = "gtk")]
pub mod gtk;
pub mod widgets;

pub use bindings::{
    Binding, CheckButtonBinding, ComboBoxBinding, ComboMode, ConfigKey, EntryBinding,
    FolderChooserBinding, RadioGroupBinding, SpinButtonBinding, TextBufferBinding,
};
pub use widgets::{
    ChangedHandler, ComboRow, ComboWidget, FolderChooserWidget, Sensitive, SpinWidget, TextWidget,
    ToggleWidget,
};
