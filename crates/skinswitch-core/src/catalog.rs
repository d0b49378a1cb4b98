//! Raw skin catalog: the unresolved name → entry table.
//!
//! A catalog is what page authors edit. Entries can be added, overridden or
//! removed (an entry set to `None`); nothing is resolved until
//! [`SkinRegistry::resolve`](crate::registry::SkinRegistry::resolve) runs.

use std::path::Path;

use serde::Deserialize;

use skinswitch_types::error::{Result, SwitchError};

/// CDN stylesheet template. `{uiVersion}` and `{folder}` are substituted.
pub const DEFAULT_STYLESHEET_TEMPLATE: &str =
    "http://ajax.googleapis.com/ajax/libs/jqueryui/{uiVersion}/themes/{folder}/jquery-ui.css";

/// CDN thumbnail template. `{size}` and `{thumb}` are substituted.
pub const DEFAULT_THUMBNAIL_TEMPLATE: &str =
    "http://static.jquery.com/ui/themeroller/images/themeGallery/theme_{size}_{thumb}.png";

/// Suffix identifying a base UI stylesheet that skins are placed after.
pub const DEFAULT_BASE_SUFFIX: &str = "jquery-ui.css";

/// One unresolved catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSkinEntry {
    /// CDN folder, or the full stylesheet URL when `cdn = false`.
    #[serde(default)]
    pub folder: Option<String>,
    /// Thumbnail key, or the full thumbnail URL when `cdn = false`.
    #[serde(default)]
    pub thumb: Option<String>,
    /// `Some(false)` marks an externally hosted skin.
    #[serde(default)]
    pub cdn: Option<bool>,
    /// Explicit class token (external skins only).
    #[serde(default)]
    pub class_token: Option<String>,
}

impl RawSkinEntry {
    /// Entry with an explicit thumbnail key.
    pub fn thumb(thumb: &str) -> Self {
        Self {
            thumb: Some(thumb.to_string()),
            ..Self::default()
        }
    }

    /// Entry with an explicit CDN folder.
    pub fn folder(folder: &str) -> Self {
        Self {
            folder: Some(folder.to_string()),
            ..Self::default()
        }
    }

    /// Externally hosted skin with full URLs.
    pub fn external(stylesheet_url: &str, thumb_url: &str) -> Self {
        Self {
            folder: Some(stylesheet_url.to_string()),
            thumb: Some(thumb_url.to_string()),
            cdn: Some(false),
            class_token: None,
        }
    }

    /// Returns `true` when the skin is not served from the CDN.
    pub fn is_external(&self) -> bool {
        self.cdn == Some(false)
    }
}

/// Ordered skin catalog plus the URL templates used to resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(String, Option<RawSkinEntry>)>,
    pub stylesheet_template: String,
    pub thumbnail_template: String,
    pub base_suffix: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// An empty catalog with the default CDN templates.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stylesheet_template: DEFAULT_STYLESHEET_TEMPLATE.to_string(),
            thumbnail_template: DEFAULT_THUMBNAIL_TEMPLATE.to_string(),
            base_suffix: DEFAULT_BASE_SUFFIX.to_string(),
        }
    }

    /// The 24 classic ThemeRoller gallery skins.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for &(name, folder, thumb) in BUILTIN_SKINS {
            let entry = RawSkinEntry {
                folder: folder.map(str::to_string),
                thumb: thumb.map(str::to_string),
                ..RawSkinEntry::default()
            };
            catalog.insert(name, entry);
        }
        catalog
    }

    /// Set an entry. `None` marks the name as removed; an existing name keeps
    /// its declaration position.
    pub fn set(&mut self, name: &str, entry: Option<RawSkinEntry>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((name.to_string(), entry)),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: &str, entry: RawSkinEntry) {
        self.set(name, Some(entry));
    }

    /// Mark an entry as removed.
    pub fn remove(&mut self, name: &str) {
        self.set(name, None);
    }

    /// Entries in declaration order, removed ones included as `None`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&RawSkinEntry>)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e.as_ref()))
    }

    /// Number of declared names, removed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a catalog from TOML.
    ///
    /// ```toml
    /// include_builtin = true
    ///
    /// [[skin]]
    /// name = "Vader"
    /// removed = true
    ///
    /// [[skin]]
    /// name = "My Theme"
    /// folder = "https://example.com/my-theme/jquery-ui.css"
    /// thumb = "https://example.com/my-theme/thumb.png"
    /// cdn = false
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(toml_str)
            .map_err(|e| SwitchError::Config(format!("catalog.toml: {e}")))?;

        let mut catalog = if file.include_builtin {
            Self::builtin()
        } else {
            Self::new()
        };
        if let Some(t) = file.stylesheet_template {
            catalog.stylesheet_template = t;
        }
        if let Some(t) = file.thumbnail_template {
            catalog.thumbnail_template = t;
        }
        if let Some(s) = file.base_suffix {
            catalog.base_suffix = s;
        }

        for skin in file.skin {
            let name = skin.name.trim();
            if name.is_empty() {
                return Err(SwitchError::Catalog("skin entry with empty name".into()));
            }
            if skin.removed {
                catalog.remove(name);
                continue;
            }
            catalog.insert(
                name,
                RawSkinEntry {
                    folder: skin.folder,
                    thumb: skin.thumb,
                    cdn: skin.cdn,
                    class_token: skin.class_token,
                },
            );
        }
        Ok(catalog)
    }

    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SwitchError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    include_builtin: bool,
    #[serde(default)]
    stylesheet_template: Option<String>,
    #[serde(default)]
    thumbnail_template: Option<String>,
    #[serde(default)]
    base_suffix: Option<String>,
    #[serde(default)]
    skin: Vec<CatalogFileSkin>,
}

#[derive(Debug, Deserialize)]
struct CatalogFileSkin {
    name: String,
    #[serde(default)]
    removed: bool,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default)]
    thumb: Option<String>,
    #[serde(default)]
    cdn: Option<bool>,
    #[serde(default)]
    class_token: Option<String>,
}

/// (name, folder override, thumb override)
const BUILTIN_SKINS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("UI Lightness", None, Some("ui_light")),
    ("UI Darkness", None, Some("ui_dark")),
    ("Smoothness", None, None),
    ("Start", None, Some("start_menu")),
    ("Redmond", None, Some("windoze")),
    ("Sunny", None, None),
    ("Overcast", None, None),
    ("Le Frog", None, None),
    ("Flick", None, None),
    ("Pepper Grinder", None, None),
    ("Eggplant", None, None),
    ("Dark Hive", None, None),
    ("Cupertino", None, None),
    ("South St", Some("south-street"), None),
    ("Blitzer", None, None),
    ("Humanity", None, None),
    ("Hot Sneaks", None, None),
    ("Excite Bike", None, None),
    ("Vader", None, Some("black_matte")),
    ("Dot Luv", None, None),
    ("Mint Choc", None, Some("mint_choco")),
    ("Black Tie", None, None),
    ("Trontastic", None, None),
    ("Swanky Purse", None, None),
];
