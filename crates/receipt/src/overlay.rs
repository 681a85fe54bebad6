//! Scoped replacement of overlay inputs by text duplicates

use crate::field::display_value;
use crate::form::{FormView, TextDuplicate};
use std::ops::Deref;
use tracing::debug;

/// Hides overlay inputs behind text duplicates while alive
///
/// Acquiring the guard hides every visible input carrying the selector class
/// and attaches a [`TextDuplicate`] with the same box, style and displayed
/// text; the background can be hidden too. Dropping the guard restores the
/// view on every exit path, including `?` returns and unwinding.
pub struct OverlayGuard<'a> {
    view: &'a mut FormView,
    hidden: Vec<String>,
    background_hidden: bool,
}

impl<'a> OverlayGuard<'a> {
    pub fn acquire(
        view: &'a mut FormView,
        selector: &str,
        date_format: &str,
        hide_background: bool,
    ) -> Self {
        let mut hidden = Vec::new();
        let mut duplicates = Vec::new();
        for element in view.elements.iter_mut() {
            if !element.visible || !element.has_class(selector) {
                continue;
            }
            duplicates.push(TextDuplicate {
                source_id: element.id.clone(),
                rect: element.rect,
                style: element.style,
                text: display_value(element, date_format),
            });
            element.visible = false;
            hidden.push(element.id.clone());
        }
        for duplicate in duplicates {
            view.insert_duplicate(duplicate);
        }

        let background_hidden = match view.background.as_mut() {
            Some(background) if hide_background && background.visible => {
                background.visible = false;
                true
            }
            _ => false,
        };

        debug!(
            inputs = hidden.len(),
            background_hidden, "overlay duplicates attached"
        );

        Self {
            view,
            hidden,
            background_hidden,
        }
    }
}

impl Deref for OverlayGuard<'_> {
    type Target = FormView;

    fn deref(&self) -> &FormView {
        self.view
    }
}

impl Drop for OverlayGuard<'_> {
    fn drop(&mut self) {
        for id in &self.hidden {
            if let Some(element) = self.view.element_mut(id) {
                element.visible = true;
            }
        }
        self.view.remove_duplicates();
        if self.background_hidden {
            if let Some(background) = self.view.background.as_mut() {
                background.visible = true;
            }
        }
        debug!(inputs = self.hidden.len(), "overlay duplicates removed");
    }
}
