//! Stylesheet resource lifecycle.
//!
//! Skin stylesheets live as `<link rel="stylesheet">` elements in the page
//! document. Links the switcher owns ("managed") carry [`MANAGED_CLASS`] and
//! a [`SKIN_ATTRIBUTE`] naming their skin. Managed links form one contiguous
//! run placed after the base UI stylesheet and before the site's own
//! stylesheets, so site rules keep winning specificity ties.
//!
//! Injection is fire-and-forget: whether a stylesheet ever finishes loading
//! is not observed here.

use skinswitch_types::dom::{Document, NodeId, TagName};

use crate::registry::{self, SkinDescriptor, SkinRegistry};

/// Class carried by every switcher-managed link.
pub const MANAGED_CLASS: &str = "skinswitch-managed";

/// Attribute naming the skin of a managed link.
pub const SKIN_ATTRIBUTE: &str = "data-skin";

/// One stylesheet link, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetLinkRecord {
    pub node: NodeId,
    pub href: String,
    /// Skin name for managed links.
    pub skin_name: Option<String>,
    pub managed: bool,
}

/// What [`StylesheetManager::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// The link now serving the applied skin.
    pub node: NodeId,
    /// An existing link was reused instead of injecting a new one.
    pub reused: bool,
    /// Hrefs of links removed as stale or evicted, oldest first.
    pub removed: Vec<String>,
}

/// The stylesheet that was already linked before the switcher touched the page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AdoptedSheet {
    skin_name: String,
    href: String,
}

/// Owns the managed run of skin stylesheets in a [`Document`].
#[derive(Debug, Clone)]
pub struct StylesheetManager {
    base_suffix: String,
    adopted: Option<AdoptedSheet>,
}

impl StylesheetManager {
    /// `base_suffix` identifies base UI stylesheets new skins are placed after.
    pub fn new(base_suffix: &str) -> Self {
        Self {
            base_suffix: base_suffix.to_string(),
            adopted: None,
        }
    }

    /// Every stylesheet link in document order.
    pub fn records(&self, doc: &Document) -> Vec<StylesheetLinkRecord> {
        doc.stylesheet_links()
            .into_iter()
            .filter_map(|node| {
                let el = doc.element(node)?;
                let managed = el.has_class(MANAGED_CLASS);
                Some(StylesheetLinkRecord {
                    node,
                    href: el.href().unwrap_or_default().to_string(),
                    skin_name: if managed {
                        el.get_attribute(SKIN_ATTRIBUTE).map(str::to_string)
                    } else {
                        None
                    },
                    managed,
                })
            })
            .collect()
    }

    /// Managed links in document order.
    pub fn managed(&self, doc: &Document) -> Vec<StylesheetLinkRecord> {
        self.records(doc).into_iter().filter(|r| r.managed).collect()
    }

    /// Name of the skin adopted from the page, if any.
    pub fn adopted_skin(&self) -> Option<&str> {
        self.adopted.as_ref().map(|a| a.skin_name.as_str())
    }

    /// Find a stylesheet the page already links that belongs to a registry
    /// skin, take ownership of it, and return the skin's name. When several
    /// links match, the last one in document order wins.
    pub fn adopt(&mut self, doc: &mut Document, registry: &SkinRegistry) -> Option<String> {
        let (record, skin) = self
            .records(doc)
            .into_iter()
            .rev()
            .find_map(|r| registry.find_by_href(&r.href).map(|s| (r, s.name.clone())))?;

        if let Some(el) = doc.element_mut(record.node) {
            el.add_class(MANAGED_CLASS);
            el.set_attribute(SKIN_ATTRIBUTE, &skin);
        }
        log::debug!("Adopted linked stylesheet {} as skin '{skin}'", record.href);
        self.adopted = Some(AdoptedSheet {
            skin_name: skin.clone(),
            href: record.href,
        });
        Some(skin)
    }

    /// Make `skin` the effective stylesheet, keeping at most `keep` managed
    /// links.
    pub fn apply(&mut self, doc: &mut Document, skin: &SkinDescriptor, keep: usize) -> ApplyReport {
        let records = self.records(doc);

        let existing = records
            .iter()
            .position(|r| r.href == skin.stylesheet)
            .or_else(|| {
                records
                    .iter()
                    .position(|r| registry::urls_match(&r.href, &skin.stylesheet))
            });
        if let Some(pos) = existing {
            // Already linked: everything managed after it was navigated
            // through and superseded.
            let found = records[pos].node;
            if !records[pos].managed
                && let Some(el) = doc.element_mut(found)
            {
                el.add_class(MANAGED_CLASS);
                el.set_attribute(SKIN_ATTRIBUTE, &skin.name);
            }
            let mut removed = Vec::new();
            for stale in records[pos + 1..].iter().filter(|r| r.managed) {
                doc.detach(stale.node);
                removed.push(stale.href.clone());
            }
            removed.extend(self.evict(doc, found, keep));
            log::debug!("Reused stylesheet for '{}' ({} removed)", skin.name, removed.len());
            return ApplyReport {
                node: found,
                reused: true,
                removed,
            };
        }

        let anchor = records
            .iter()
            .rev()
            .find(|r| r.managed)
            .or_else(|| records.iter().rev().find(|r| r.href.ends_with(&self.base_suffix)))
            .map(|r| r.node);
        let link = create_link(doc, &skin.stylesheet, Some(&skin.name));
        place(doc, anchor, link);

        let removed = self.evict(doc, link, keep);
        log::debug!("Injected stylesheet for '{}' ({} evicted)", skin.name, removed.len());
        ApplyReport {
            node: link,
            reused: false,
            removed,
        }
    }

    /// Remove every managed link. The adopted stylesheet, if any, is put back
    /// as an ordinary page link. Returns how many managed links were removed.
    pub fn reset(&mut self, doc: &mut Document) -> usize {
        let managed = self.managed(doc);
        for r in &managed {
            doc.detach(r.node);
        }

        if let Some(adopted) = &self.adopted {
            let records = self.records(doc);
            if !records.iter().any(|r| r.href == adopted.href) {
                let anchor = records
                    .iter()
                    .rev()
                    .find(|r| r.href.ends_with(&self.base_suffix))
                    .map(|r| r.node);
                let link = create_link(doc, &adopted.href, None);
                place(doc, anchor, link);
            }
        }
        managed.len()
    }

    /// Drop the oldest managed links until at most `keep` remain, never
    /// touching `current`.
    fn evict(&self, doc: &mut Document, current: NodeId, keep: usize) -> Vec<String> {
        let managed = self.managed(doc);
        let mut excess = managed.len().saturating_sub(keep.max(1));
        let mut removed = Vec::new();
        for r in managed {
            if excess == 0 {
                break;
            }
            if r.node == current {
                continue;
            }
            doc.detach(r.node);
            removed.push(r.href);
            excess -= 1;
        }
        removed
    }
}

fn create_link(doc: &mut Document, href: &str, skin: Option<&str>) -> NodeId {
    let mut attrs = vec![("rel", "stylesheet"), ("type", "text/css"), ("href", href)];
    if let Some(name) = skin {
        attrs.push(("class", MANAGED_CLASS));
        attrs.push((SKIN_ATTRIBUTE, name));
    }
    doc.create_element(TagName::Link, &attrs)
}

/// Insert after `anchor`, else at the end of `<head>`.
fn place(doc: &mut Document, anchor: Option<NodeId>, link: NodeId) {
    if let Some(a) = anchor
        && doc.insert_after(a, link)
    {
        return;
    }
    let parent = doc.head().unwrap_or(doc.root);
    doc.append_child(parent, link);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, RawSkinEntry};
    use crate::config::SwitcherConfiguration;

    const BASE: &str = "/ui/base/jquery-ui.css";
    const SITE: &str = "/css/site.css";

    fn registry() -> SkinRegistry {
        let mut catalog = Catalog::new();
        catalog.stylesheet_template = "/ui/{folder}/jquery-ui.css".into();
        for name in ["A", "B", "C", "D"] {
            catalog.insert(name, RawSkinEntry::default());
        }
        SkinRegistry::resolve(&catalog, &SwitcherConfiguration::default())
    }

    fn page() -> Document {
        let mut doc = Document::page();
        doc.append_stylesheet(BASE);
        doc.append_stylesheet(SITE);
        doc
    }

    fn hrefs(mgr: &StylesheetManager, doc: &Document) -> Vec<String> {
        mgr.records(doc).into_iter().map(|r| r.href).collect()
    }

    fn managed_names(mgr: &StylesheetManager, doc: &Document) -> Vec<String> {
        mgr.managed(doc)
            .into_iter()
            .filter_map(|r| r.skin_name)
            .collect()
    }

    #[test]
    fn first_skin_goes_after_base_and_before_site() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        let report = mgr.apply(&mut doc, reg.get("A").unwrap(), 2);
        assert!(!report.reused);
        assert_eq!(hrefs(&mgr, &doc), vec![BASE, "/ui/a/jquery-ui.css", SITE]);
    }

    #[test]
    fn keep_two_scenario() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");

        mgr.apply(&mut doc, reg.get("A").unwrap(), 2);
        assert_eq!(managed_names(&mgr, &doc), vec!["A"]);

        mgr.apply(&mut doc, reg.get("B").unwrap(), 2);
        assert_eq!(managed_names(&mgr, &doc), vec!["A", "B"]);

        let report = mgr.apply(&mut doc, reg.get("C").unwrap(), 2);
        assert_eq!(report.removed, vec!["/ui/a/jquery-ui.css"]);
        assert_eq!(managed_names(&mgr, &doc), vec!["B", "C"]);

        let report = mgr.apply(&mut doc, reg.get("B").unwrap(), 2);
        assert!(report.reused);
        assert_eq!(report.removed, vec!["/ui/c/jquery-ui.css"]);
        assert_eq!(managed_names(&mgr, &doc), vec!["B"]);
        // Site stylesheet still last.
        assert_eq!(hrefs(&mgr, &doc).last().unwrap(), SITE);
    }

    #[test]
    fn keep_one_replaces_immediately() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.apply(&mut doc, reg.get("A").unwrap(), 1);
        mgr.apply(&mut doc, reg.get("B").unwrap(), 1);
        assert_eq!(managed_names(&mgr, &doc), vec!["B"]);
    }

    #[test]
    fn zero_keep_is_treated_as_one() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.apply(&mut doc, reg.get("A").unwrap(), 0);
        assert_eq!(managed_names(&mgr, &doc), vec!["A"]);
    }

    #[test]
    fn fallback_appends_to_head() {
        let reg = registry();
        let mut doc = Document::page();
        doc.append_stylesheet(SITE);
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.apply(&mut doc, reg.get("A").unwrap(), 2);
        assert_eq!(hrefs(&mgr, &doc), vec![SITE, "/ui/a/jquery-ui.css"]);
    }

    #[test]
    fn adopt_marks_linked_skin_managed() {
        let reg = registry();
        let mut doc = page();
        doc.append_stylesheet("http://cdn.test/ui/d/jquery-ui.css");
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        assert_eq!(mgr.adopt(&mut doc, &reg).as_deref(), Some("D"));
        assert_eq!(mgr.adopted_skin(), Some("D"));
        assert_eq!(managed_names(&mgr, &doc), vec!["D"]);
    }

    #[test]
    fn adopt_without_match_returns_none() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        assert_eq!(mgr.adopt(&mut doc, &reg), None);
        assert!(mgr.managed(&doc).is_empty());
    }

    #[test]
    fn reset_removes_managed_and_restores_adopted() {
        let reg = registry();
        let mut doc = Document::page();
        doc.append_stylesheet(BASE);
        doc.append_stylesheet("/ui/d/jquery-ui.css");
        doc.append_stylesheet(SITE);
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.adopt(&mut doc, &reg);

        mgr.apply(&mut doc, reg.get("A").unwrap(), 1);
        // D was evicted by the keep budget.
        assert_eq!(managed_names(&mgr, &doc), vec!["A"]);

        let removed = mgr.reset(&mut doc);
        assert_eq!(removed, 1);
        assert!(mgr.managed(&doc).is_empty());
        assert_eq!(hrefs(&mgr, &doc), vec![BASE, "/ui/d/jquery-ui.css", SITE]);
    }

    #[test]
    fn reset_leaves_unmanaged_links() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.apply(&mut doc, reg.get("A").unwrap(), 2);
        mgr.apply(&mut doc, reg.get("B").unwrap(), 2);
        assert_eq!(mgr.reset(&mut doc), 2);
        assert_eq!(hrefs(&mgr, &doc), vec![BASE, SITE]);
    }

    #[test]
    fn reapplying_an_unmanaged_link_reuses_it() {
        let reg = registry();
        let mut doc = page();
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        doc.append_stylesheet("/ui/c/jquery-ui.css");
        let report = mgr.apply(&mut doc, reg.get("C").unwrap(), 2);
        assert!(report.reused);
        assert_eq!(managed_names(&mgr, &doc), vec!["C"]);
    }

    #[test]
    fn reset_then_reselect_origin_reuses_restored_link() {
        let reg = registry();
        let mut doc = Document::page();
        doc.append_stylesheet(BASE);
        doc.append_stylesheet("/ui/d/jquery-ui.css");
        doc.append_stylesheet(SITE);
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.adopt(&mut doc, &reg);
        mgr.apply(&mut doc, reg.get("A").unwrap(), 2);
        mgr.reset(&mut doc);

        let report = mgr.apply(&mut doc, reg.get("D").unwrap(), 2);
        assert!(report.reused);
        assert_eq!(managed_names(&mgr, &doc), vec!["D"]);
        assert_eq!(hrefs(&mgr, &doc), vec![BASE, "/ui/d/jquery-ui.css", SITE]);
    }

    #[test]
    fn reselecting_adopted_absolute_link_reuses_it() {
        const CDN_D: &str = "http://cdn.test/ui/d/jquery-ui.css";
        let reg = registry();
        let mut doc = Document::page();
        doc.append_stylesheet(BASE);
        doc.append_stylesheet(CDN_D);
        doc.append_stylesheet(SITE);
        let mut mgr = StylesheetManager::new("jquery-ui.css");
        mgr.adopt(&mut doc, &reg);
        mgr.apply(&mut doc, reg.get("A").unwrap(), 2);

        let report = mgr.apply(&mut doc, reg.get("D").unwrap(), 2);
        assert!(report.reused);
        assert_eq!(report.removed, vec!["/ui/a/jquery-ui.css"]);
        assert_eq!(managed_names(&mgr, &doc), vec!["D"]);
        assert_eq!(hrefs(&mgr, &doc), vec![BASE, CDN_D, SITE]);
    }
}
