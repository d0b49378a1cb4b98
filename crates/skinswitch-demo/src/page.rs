//! Demo page and a logging view.

use skinswitch_core::SwitcherView;
use skinswitch_core::catalog::DEFAULT_BASE_SUFFIX;
use skinswitch_core::dom::Document;
use skinswitch_core::instance::DisplayState;

/// Ids of the switcher containers on the demo page.
pub const TARGETS: [&str; 2] = ["switcher-top", "switcher-side"];

/// A page with the base UI stylesheet, an already linked skin (if any), the
/// site stylesheet and two switcher containers.
pub fn build(linked_skin: Option<&str>) -> Document {
    let mut doc = Document::page();
    doc.append_stylesheet(&format!("/ui/base/{DEFAULT_BASE_SUFFIX}"));
    if let Some(href) = linked_skin {
        doc.append_stylesheet(href);
    }
    doc.append_stylesheet("/css/site.css");
    for target in TARGETS {
        doc.append_div(target);
    }
    doc
}

/// Logs every redraw.
pub struct LogView;

impl SwitcherView for LogView {
    fn render(&mut self, target: &str, display: &DisplayState) {
        log::debug!(
            "[{target}] label={:?} active={:?} remember={} expanded={}",
            display.label,
            display.active_entry,
            display.remember_checked,
            display.expanded,
        );
    }

    fn collapsed(&mut self, target: &str, animated: bool) {
        log::debug!("[{target}] collapsed (animated={animated})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_page_has_targets_and_links() {
        let doc = build(Some("/ui/sunny/jquery-ui.css"));
        assert_eq!(doc.stylesheet_links().len(), 3);
        for target in TARGETS {
            assert!(doc.get_element_by_id(target).is_some());
        }
    }
}
