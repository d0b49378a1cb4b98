//! Resolved skin registry.
//!
//! [`SkinRegistry::resolve`] turns a [`Catalog`] into an immutable, ordered
//! set of [`SkinDescriptor`]s. Removal, defaulting, URL templating and
//! sorting all happen here, once.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::config::SwitcherConfiguration;

/// A fully resolved skin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinDescriptor {
    pub name: String,
    /// Resolved stylesheet URL.
    pub stylesheet: String,
    /// Resolved thumbnail URL.
    pub thumbnail: String,
    /// Page-marker suffix and menu entry key.
    pub class_token: String,
    /// Not served from the CDN.
    pub external: bool,
}

/// Ordered name → descriptor map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkinRegistry {
    skins: Vec<SkinDescriptor>,
}

impl SkinRegistry {
    /// Resolve `catalog` for one instance's configuration.
    pub fn resolve(catalog: &Catalog, config: &SwitcherConfiguration) -> Self {
        let stylesheet_template = catalog
            .stylesheet_template
            .replace("{uiVersion}", &config.ui_version);
        let size = config.thumbnail.template_key().to_string();
        let thumbnail_template = catalog.thumbnail_template.replace("{size}", &size);

        let mut names = HashSet::new();
        let mut tokens = HashSet::new();
        let mut skins = Vec::new();

        for (name, entry) in catalog.entries() {
            let Some(entry) = entry else {
                continue;
            };
            if name.is_empty() || !names.insert(name.to_string()) {
                log::warn!("Skipping duplicate or unnamed catalog entry '{name}'");
                continue;
            }

            let descriptor = if entry.is_external() {
                let (Some(stylesheet), Some(thumbnail)) = (&entry.folder, &entry.thumb) else {
                    log::warn!("Skipping external skin '{name}': folder and thumb URLs are required");
                    continue;
                };
                SkinDescriptor {
                    name: name.to_string(),
                    stylesheet: stylesheet.clone(),
                    thumbnail: thumbnail.clone(),
                    class_token: entry
                        .class_token
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| slugify(name)),
                    external: true,
                }
            } else {
                let folder = entry
                    .folder
                    .clone()
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| slugify(name));
                let thumb = entry
                    .thumb
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| folder.replace('-', "_"));
                SkinDescriptor {
                    name: name.to_string(),
                    stylesheet: stylesheet_template.replace("{folder}", &folder),
                    thumbnail: thumbnail_template.replace("{thumb}", &thumb),
                    class_token: folder,
                    external: false,
                }
            };

            if descriptor.class_token.is_empty() || !tokens.insert(descriptor.class_token.clone()) {
                log::warn!(
                    "Skipping skin '{name}': class token '{}' already taken",
                    descriptor.class_token
                );
                continue;
            }
            skins.push(descriptor);
        }

        if config.sorted {
            skins.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Self { skins }
    }

    /// Look up a skin by name.
    pub fn get(&self, name: &str) -> Option<&SkinDescriptor> {
        self.skins.iter().find(|s| s.name == name)
    }

    /// Look up a skin by class token.
    pub fn by_class_token(&self, token: &str) -> Option<&SkinDescriptor> {
        self.skins.iter().find(|s| s.class_token == token)
    }

    /// Find the skin whose stylesheet matches `href`. When several match, the
    /// last one in registry order wins.
    pub fn find_by_href(&self, href: &str) -> Option<&SkinDescriptor> {
        self.skins
            .iter()
            .rev()
            .find(|s| urls_match(href, &s.stylesheet))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkinDescriptor> {
        self.skins.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skins.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.skins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}

/// Lowercase `name` and collapse every run of non-alphanumerics into `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Containment match between a linked href and a resolved stylesheet URL.
///
/// A page may link a skin by relative path while the registry holds the
/// absolute URL (or the reverse), so either being a suffix of the other
/// counts.
pub fn urls_match(href: &str, stylesheet: &str) -> bool {
    if href.is_empty() || stylesheet.is_empty() {
        return false;
    }
    href == stylesheet || href.ends_with(stylesheet) || stylesheet.ends_with(href)
}
