//! recut: configuration store and widget-binding layer for the ReCut
//! video cutting and transcoding front-end.
//!
//! This library provides the settings foundation of the application:
//! - A key/value configuration store with change notification
//! - Two-way bindings that keep GUI widgets and configuration entries
//!   synchronized
//! - Optional GTK4 adapters (behind the `gtk` feature) implementing the
//!   widget interfaces for the real toolkit

pub mod config;
pub mod ui;

// Re-export commonly used types
pub use config::{ConfigStore, Subscription};
pub use ui::bindings::{
    Binding, CheckButtonBinding, ComboBoxBinding, ComboMode, EntryBinding, FolderChooserBinding,
    RadioGroupBinding, SpinButtonBinding, TextBufferBinding,
};
