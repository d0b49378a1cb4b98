//! Page marker class on the `<html>` element.
//!
//! Exactly one class with [`MARKER_PREFIX`] names the active skin so page
//! stylesheets can key rules off it (`html.skinswitch-skin-dark-hive ...`).

use skinswitch_types::dom::{Document, NodeId};

/// Reserved class prefix.
pub const MARKER_PREFIX: &str = "skinswitch-skin-";

/// Marker class for a skin's class token.
pub fn marker_class(class_token: &str) -> String {
    format!("{MARKER_PREFIX}{class_token}")
}

/// The element that carries the marker: `<html>`, else `<body>`.
fn marker_element(doc: &Document) -> Option<NodeId> {
    doc.html().or_else(|| doc.body())
}

/// The marker class currently on the page, if any.
pub fn current_marker(doc: &Document) -> Option<String> {
    let el = doc.element(marker_element(doc)?)?;
    el.classes()
        .find(|c| c.starts_with(MARKER_PREFIX) && c.len() > MARKER_PREFIX.len())
        .map(str::to_string)
}

/// Replace any marker with `marker` (a full class name), or clear it.
pub fn set_marker(doc: &mut Document, marker: Option<&str>) {
    let Some(id) = marker_element(doc) else {
        return;
    };
    if let Some(el) = doc.element_mut(id) {
        el.remove_classes_where(|c| c.starts_with(MARKER_PREFIX));
        if let Some(m) = marker {
            el.add_class(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_read_marker() {
        let mut doc = Document::page();
        assert_eq!(current_marker(&doc), None);
        set_marker(&mut doc, Some(&marker_class("sunny")));
        assert_eq!(current_marker(&doc).as_deref(), Some("skinswitch-skin-sunny"));
    }

    #[test]
    fn only_one_marker_at_a_time() {
        let mut doc = Document::page();
        set_marker(&mut doc, Some(&marker_class("sunny")));
        set_marker(&mut doc, Some(&marker_class("flick")));
        let html = doc.element(doc.html().unwrap()).unwrap();
        let markers: Vec<&str> = html.classes().filter(|c| c.starts_with(MARKER_PREFIX)).collect();
        assert_eq!(markers, vec!["skinswitch-skin-flick"]);
    }

    #[test]
    fn clearing_keeps_other_classes() {
        let mut doc = Document::page();
        let html = doc.html().unwrap();
        doc.element_mut(html).unwrap().add_class("js");
        set_marker(&mut doc, Some(&marker_class("vader")));
        set_marker(&mut doc, None);
        assert_eq!(current_marker(&doc), None);
        assert!(doc.element(html).unwrap().has_class("js"));
    }

    #[test]
    fn bare_prefix_is_not_a_marker() {
        let mut doc = Document::page();
        let html = doc.html().unwrap();
        doc.element_mut(html).unwrap().add_class(MARKER_PREFIX);
        assert_eq!(current_marker(&doc), None);
    }

    #[test]
    fn document_without_html_is_ignored() {
        let mut doc = Document::new();
        set_marker(&mut doc, Some("skinswitch-skin-x"));
        assert_eq!(current_marker(&doc), None);
    }
}
