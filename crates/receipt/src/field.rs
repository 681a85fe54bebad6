//! Field collection from the form view

use crate::form::{FormElement, FormView, InputKind};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{debug, warn};

/// Field values collected for one export, keyed by input id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: BTreeMap<String, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, value: &str) {
        self.values.insert(id.to_string(), value.to_string());
    }

    /// Value of a field; missing fields read as empty
    pub fn get(&self, id: &str) -> &str {
        self.values.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read every input of `view` carrying the `selector` class
///
/// Date inputs are rendered with `date_format` (chrono strftime syntax).
pub fn collect_fields(view: &FormView, selector: &str, date_format: &str) -> FieldValues {
    let mut values = FieldValues::new();
    for element in view.inputs(selector) {
        values.insert(&element.id, &display_value(element, date_format));
    }
    debug!(selector, count = values.len(), "collected fields");
    values
}

/// Text shown for an input's current value
pub fn display_value(element: &FormElement, date_format: &str) -> String {
    match element.kind {
        InputKind::Text => element.value.clone(),
        InputKind::Date => format_date(&element.value, date_format),
    }
}

/// Reformat an ISO `YYYY-MM-DD` date; anything unparsable is returned unchanged
pub fn format_date(raw: &str, pattern: &str) -> String {
    let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") else {
        return raw.to_string();
    };

    let mut out = String::new();
    match write!(out, "{}", date.format(pattern)) {
        Ok(()) => out,
        Err(_) => {
            warn!(pattern, "invalid date format, keeping raw value");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Rect;
    use pretty_assertions::assert_eq;

    const CLASS: &str = "form-input-overlay";

    fn view() -> FormView {
        let mut view = FormView::new(794, 1123);
        view.push(
            FormElement::new("ownerName", InputKind::Text, Rect::default())
                .with_class(CLASS)
                .with_value("Ramesh Kumar"),
        );
        view.push(
            FormElement::new("dateInput", InputKind::Date, Rect::default())
                .with_class(CLASS)
                .with_value("2025-08-20"),
        );
        view.push(FormElement::new("village", InputKind::Text, Rect::default()).with_class(CLASS));
        view.push(FormElement::new("search", InputKind::Text, Rect::default()).with_value("x"));
        view
    }

    #[test]
    fn test_collect_fields() {
        let values = collect_fields(&view(), CLASS, "%d/%m/%Y");

        assert_eq!(values.len(), 3);
        assert_eq!(values.get("ownerName"), "Ramesh Kumar");
        assert_eq!(values.get("dateInput"), "20/08/2025");
        assert_eq!(values.get("village"), "");
        assert!(!values.contains("search"));
        assert_eq!(values.get("missing"), "");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-08-20", "%d/%m/%Y"), "20/08/2025");
        assert_eq!(format_date("2024-02-29", "%Y.%m.%d"), "2024.02.29");
        assert_eq!(format_date("", "%d/%m/%Y"), "");
        assert_eq!(format_date("20th August", "%d/%m/%Y"), "20th August");
        assert_eq!(format_date("2025-02-30", "%d/%m/%Y"), "2025-02-30");
    }

    #[test]
    fn test_format_date_bad_pattern_keeps_raw() {
        assert_eq!(format_date("2025-08-20", "%Q"), "2025-08-20");
    }

    #[test]
    fn test_field_values_from_iter() {
        let values: FieldValues = [("a", "1"), ("b", "")].into_iter().collect();
        assert_eq!(values.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "")]);
    }
}
