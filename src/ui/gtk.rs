//! GTK4 implementations of the widget interfaces
//!
//! Compiled only with the `gtk` feature. The trait impls forward to the
//! corresponding GTK accessors; GTK widgets are reference counted, so a
//! plain clone wrapped in `Rc` is what the bindings expect.
//!
//! GTK4 has no folder chooser button, so [`FolderButton`] composes a
//! `Button` with a `FileDialog` folder selection.

// ComboBoxText is deprecated since GTK 4.10 but still the simplest fit
// for text-plus-id row models.
#![allow(deprecated)]

use gtk4::prelude::*;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::widgets::{
    ChangedHandler, ComboRow, ComboWidget, FolderChooserWidget, Sensitive, SpinWidget, TextWidget,
    ToggleWidget,
};

impl TextWidget for gtk4::Entry {
    fn text(&self) -> String {
        EditableExt::text(self).to_string()
    }

    fn set_text(&self, text: &str) {
        EditableExt::set_text(self, text);
    }

    fn connect_changed(&self, handler: ChangedHandler) {
        EditableExt::connect_changed(self, move |_| handler());
    }
}

impl TextWidget for gtk4::TextBuffer {
    fn text(&self) -> String {
        TextBufferExt::text(self, &self.start_iter(), &self.end_iter(), true).to_string()
    }

    fn set_text(&self, text: &str) {
        TextBufferExt::set_text(self, text);
    }

    fn connect_changed(&self, handler: ChangedHandler) {
        TextBufferExt::connect_changed(self, move |_| handler());
    }
}

impl ToggleWidget for gtk4::CheckButton {
    fn is_active(&self) -> bool {
        CheckButtonExt::is_active(self)
    }

    fn set_active(&self, active: bool) {
        CheckButtonExt::set_active(self, active);
    }

    fn connect_toggled(&self, handler: ChangedHandler) {
        CheckButtonExt::connect_toggled(self, move |_| handler());
    }
}

impl SpinWidget for gtk4::SpinButton {
    fn value(&self) -> f64 {
        SpinButtonExt::value(self)
    }

    fn set_value(&self, value: f64) {
        SpinButtonExt::set_value(self, value);
    }

    fn connect_value_changed(&self, handler: ChangedHandler) {
        SpinButtonExt::connect_value_changed(self, move |_| handler());
    }
}

impl ComboWidget for gtk4::ComboBoxText {
    fn active_text(&self) -> Option<String> {
        gtk4::ComboBoxText::active_text(self).map(|text| text.to_string())
    }

    fn active_index(&self) -> Option<u32> {
        ComboBoxExt::active(self)
    }

    fn set_active_id(&self, id: &str) {
        if !ComboBoxExt::set_active_id(self, Some(id)) {
            log::debug!("combo box has no row with id {:?}", id);
        }
    }

    fn set_active_index(&self, index: u32) {
        ComboBoxExt::set_active(self, Some(index));
    }

    fn rows(&self) -> Vec<ComboRow> {
        let mut rows = Vec::new();
        let Some(model) = ComboBoxExt::model(self) else {
            return rows;
        };
        let has_id_column = model.n_columns() > 1;
        if let Some(iter) = model.iter_first() {
            let mut index = 0i64;
            loop {
                let text = model.get_value(&iter, 0).get::<String>().unwrap_or_default();
                // The id column of a ComboBoxText model is a string;
                // rows without a numeric id fall back to their position.
                let id = if has_id_column {
                    model
                        .get_value(&iter, 1)
                        .get::<String>()
                        .ok()
                        .and_then(|id| id.parse().ok())
                        .unwrap_or(index)
                } else {
                    index
                };
                rows.push(ComboRow { text, id });
                index += 1;
                if !model.iter_next(&iter) {
                    break;
                }
            }
        }
        rows
    }

    fn connect_changed(&self, handler: ChangedHandler) {
        ComboBoxExt::connect_changed(self, move |_| handler());
    }
}

macro_rules! impl_sensitive {
    ($($widget:ty),+ $(,)?) => {
        $(impl Sensitive for $widget {
            fn set_sensitive(&self, sensitive: bool) {
                WidgetExt::set_sensitive(self, sensitive);
            }
        })+
    };
}

impl_sensitive!(
    gtk4::Widget,
    gtk4::Button,
    gtk4::CheckButton,
    gtk4::SpinButton,
    gtk4::ComboBoxText,
    gtk4::Entry,
);

/// Folder selection widget: a button opening a folder dialog.
///
/// The button label shows the selected path.
pub struct FolderButton {
    button: gtk4::Button,
    selected: Rc<RefCell<Option<PathBuf>>>,
    handlers: Rc<RefCell<Vec<ChangedHandler>>>,
}

impl FolderButton {
    pub fn new(title: &str) -> Self {
        let button = gtk4::Button::with_label("(none)");
        let selected: Rc<RefCell<Option<PathBuf>>> = Rc::new(RefCell::new(None));
        let handlers: Rc<RefCell<Vec<ChangedHandler>>> = Rc::new(RefCell::new(Vec::new()));

        let title = title.to_string();
        let selected_click = Rc::clone(&selected);
        let handlers_click = Rc::clone(&handlers);
        button.connect_clicked(move |button| {
            let dialog = gtk4::FileDialog::builder()
                .title(title.as_str())
                .modal(true)
                .build();
            if let Some(current) = selected_click.borrow().clone() {
                dialog.set_initial_folder(Some(&gtk4::gio::File::for_path(&current)));
            }

            let window = button
                .root()
                .and_then(|root| root.downcast::<gtk4::Window>().ok());
            let button = button.clone();
            let selected = Rc::clone(&selected_click);
            let handlers = Rc::clone(&handlers_click);
            dialog.select_folder(window.as_ref(), gtk4::gio::Cancellable::NONE, move |result| {
                if let Ok(folder) = result {
                    if let Some(path) = folder.path() {
                        button.set_label(&path.to_string_lossy());
                        *selected.borrow_mut() = Some(path);
                        for handler in handlers.borrow().iter() {
                            handler();
                        }
                    }
                }
            });
        });

        Self {
            button,
            selected,
            handlers,
        }
    }

    /// The clickable widget to place in a dialog.
    pub fn widget(&self) -> &gtk4::Button {
        &self.button
    }
}

impl FolderChooserWidget for FolderButton {
    fn filename(&self) -> Option<PathBuf> {
        self.selected.borrow().clone()
    }

    fn set_current_folder(&self, path: &Path) {
        self.button.set_label(&path.to_string_lossy());
        *self.selected.borrow_mut() = Some(path.to_path_buf());
        for handler in self.handlers.borrow().iter() {
            handler();
        }
    }

    fn connect_selection_changed(&self, handler: ChangedHandler) {
        self.handlers.borrow_mut().push(handler);
    }
}
