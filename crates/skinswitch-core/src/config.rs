//! Switcher configuration.
//!
//! [`SwitcherConfiguration`] is the resolved, immutable per-instance
//! structure the core works with. [`ConfigOverrides`] is the partial shape
//! that page-wide defaults files (TOML) and per-element `data-skinswitch`
//! attributes (JSON) deserialize into; overrides are layered onto a base
//! configuration before an instance is created.

use serde::Deserialize;

use skinswitch_types::error::{Result, SwitchError};

use crate::hooks::SwitcherHooks;

/// Element attribute carrying a JSON [`ConfigOverrides`] object.
pub const CONFIG_ATTRIBUTE: &str = "data-skinswitch";

/// Thumbnail size variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailSize {
    /// 30x27 px.
    Small,
    /// 90x80 px.
    #[default]
    Large,
}

impl ThumbnailSize {
    /// Pixel dimensions (width, height).
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Small => (30, 27),
            Self::Large => (90, 80),
        }
    }

    /// Value substituted for `{size}` in the thumbnail template.
    pub fn template_key(self) -> u32 {
        self.dimensions().0
    }
}

/// Which pointer-leave collapses the expanded panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseoutScope {
    /// Leaving the panel content only.
    #[default]
    Panel,
    /// Leaving the whole widget (header and panel).
    Widget,
    /// Never collapse on pointer-leave.
    #[serde(rename = "none")]
    Never,
}

/// Texts shown by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherText {
    /// Label when no current skin is shown.
    pub prompt: String,
    /// Prefix before the current skin's name.
    pub current: String,
    /// Reset entry label.
    pub reset: String,
    /// Remember entry label.
    pub remember: String,
}

impl Default for SwitcherText {
    fn default() -> Self {
        Self {
            prompt: "Switch Theme".to_string(),
            current: "Theme: ".to_string(),
            reset: "Reset Theme".to_string(),
            remember: "Remember".to_string(),
        }
    }
}

/// Resolved per-instance configuration.
#[derive(Debug, Clone)]
pub struct SwitcherConfiguration {
    pub thumbnail: ThumbnailSize,
    /// Maximum height of the scrollable skin list, in pixels.
    pub max_height: u32,
    pub close_on_select: bool,
    pub close_on_mouseout: MouseoutScope,
    /// Order skins by name instead of catalog order.
    pub sorted: bool,
    pub show_reset: bool,
    pub show_remember: bool,
    /// Managed stylesheet budget. Read through [`keep_count`](Self::keep_count).
    pub keep: usize,
    /// Only show the current skin in the label while the header is hovered.
    pub rollover: bool,
    pub text: SwitcherText,
    /// UI version substituted into the CDN stylesheet template.
    pub ui_version: String,
    /// Optional CSS width for the widget.
    pub width: Option<String>,
    /// Skin to load when nothing is remembered.
    pub load_skin: Option<String>,
    /// Force the initial remember state.
    pub force_remember: Option<bool>,
    pub hooks: SwitcherHooks,
}

impl Default for SwitcherConfiguration {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailSize::Large,
            max_height: 200,
            close_on_select: true,
            close_on_mouseout: MouseoutScope::Panel,
            sorted: true,
            show_reset: false,
            show_remember: false,
            keep: 2,
            rollover: true,
            text: SwitcherText::default(),
            ui_version: "1.8.13".to_string(),
            width: None,
            load_skin: None,
            force_remember: None,
            hooks: SwitcherHooks::default(),
        }
    }
}

impl SwitcherConfiguration {
    /// Keep-count clamped to at least 1.
    pub fn keep_count(&self) -> usize {
        self.keep.max(1)
    }

    /// Replace the hooks.
    pub fn with_hooks(mut self, hooks: SwitcherHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Layer explicit options and then a declarative attribute over `defaults`.
    ///
    /// Attribute values win over explicit options, which win over defaults.
    pub fn resolve(
        defaults: &SwitcherConfiguration,
        explicit: Option<&ConfigOverrides>,
        attribute: Option<&str>,
    ) -> Result<Self> {
        let mut config = defaults.clone();
        if let Some(overrides) = explicit {
            config = overrides.apply(config);
        }
        if let Some(json) = attribute {
            config = ConfigOverrides::from_json(json)?.apply(config);
        }
        Ok(config)
    }
}

/// `closeMouseout` accepts a scope name or a boolean (`false` disables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScopeValue {
    Flag(bool),
    Named(MouseoutScope),
}

impl ScopeValue {
    fn scope(self) -> MouseoutScope {
        match self {
            Self::Flag(true) => MouseoutScope::Panel,
            Self::Flag(false) => MouseoutScope::Never,
            Self::Named(scope) => scope,
        }
    }
}

/// Partial text overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextOverrides {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub reset: Option<String>,
    #[serde(default)]
    pub remember: Option<String>,
}

/// Partial configuration as written by page authors.
///
/// Field names follow the attribute convention (`maxHeight`), with
/// snake_case aliases for TOML defaults files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    /// Small thumbnails when true.
    #[serde(default)]
    pub compact: Option<bool>,
    #[serde(default, alias = "max_height")]
    pub max_height: Option<u32>,
    #[serde(default, alias = "close_select")]
    pub close_select: Option<bool>,
    #[serde(default, alias = "close_mouseout")]
    pub close_mouseout: Option<ScopeValue>,
    #[serde(default)]
    pub sorted: Option<bool>,
    #[serde(default, alias = "show_reset")]
    pub show_reset: Option<bool>,
    #[serde(default, alias = "show_remember")]
    pub show_remember: Option<bool>,
    /// Values below 1 clamp to 1.
    #[serde(default)]
    pub keep: Option<i64>,
    #[serde(default, alias = "rollover", alias = "theme_rollover")]
    pub theme_rollover: Option<bool>,
    #[serde(default)]
    pub text: Option<TextOverrides>,
    #[serde(default, alias = "ui_version")]
    pub ui_version: Option<String>,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default, alias = "loadSkin", alias = "load_skin", alias = "load_theme")]
    pub load_theme: Option<String>,
    #[serde(default, alias = "force_remember")]
    pub force_remember: Option<bool>,
}

impl ConfigOverrides {
    /// Parse a `data-skinswitch` attribute value.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SwitchError::Config(format!("{CONFIG_ATTRIBUTE}: {e}")))
    }

    /// Parse a TOML defaults file.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| SwitchError::Config(format!("switcher.toml: {e}")))
    }

    /// Apply these overrides on top of `base`.
    pub fn apply(&self, mut base: SwitcherConfiguration) -> SwitcherConfiguration {
        if let Some(compact) = self.compact {
            base.thumbnail = if compact {
                ThumbnailSize::Small
            } else {
                ThumbnailSize::Large
            };
        }
        if let Some(h) = self.max_height {
            base.max_height = h;
        }
        if let Some(c) = self.close_select {
            base.close_on_select = c;
        }
        if let Some(scope) = self.close_mouseout {
            base.close_on_mouseout = scope.scope();
        }
        if let Some(s) = self.sorted {
            base.sorted = s;
        }
        if let Some(s) = self.show_reset {
            base.show_reset = s;
        }
        if let Some(s) = self.show_remember {
            base.show_remember = s;
        }
        if let Some(k) = self.keep {
            base.keep = usize::try_from(k.max(1)).unwrap_or(1);
        }
        if let Some(r) = self.theme_rollover {
            base.rollover = r;
        }
        if let Some(ref text) = self.text {
            if let Some(ref t) = text.prompt {
                base.text.prompt = t.clone();
            }
            if let Some(ref t) = text.current {
                base.text.current = t.clone();
            }
            if let Some(ref t) = text.reset {
                base.text.reset = t.clone();
            }
            if let Some(ref t) = text.remember {
                base.text.remember = t.clone();
            }
        }
        if let Some(ref v) = self.ui_version {
            base.ui_version = v.clone();
        }
        if let Some(ref w) = self.width {
            base.width = Some(w.clone());
        }
        if let Some(ref name) = self.load_theme {
            base.load_skin = Some(name.clone());
        }
        if let Some(f) = self.force_remember {
            base.force_remember = Some(f);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_defaults() {
        let cfg = SwitcherConfiguration::default();
        assert_eq!(cfg.thumbnail, ThumbnailSize::Large);
        assert_eq!(cfg.max_height, 200);
        assert!(cfg.close_on_select);
        assert_eq!(cfg.close_on_mouseout, MouseoutScope::Panel);
        assert!(cfg.sorted);
        assert!(!cfg.show_reset);
        assert!(!cfg.show_remember);
        assert_eq!(cfg.keep_count(), 2);
        assert!(cfg.rollover);
        assert_eq!(cfg.text.prompt, "Switch Theme");
        assert_eq!(cfg.ui_version, "1.8.13");
    }

    #[test]
    fn keep_count_clamps_to_one() {
        let cfg = SwitcherConfiguration {
            keep: 0,
            ..SwitcherConfiguration::default()
        };
        assert_eq!(cfg.keep_count(), 1);
    }

    #[test]
    fn thumbnail_dimensions() {
        assert_eq!(ThumbnailSize::Small.dimensions(), (30, 27));
        assert_eq!(ThumbnailSize::Large.dimensions(), (90, 80));
        assert_eq!(ThumbnailSize::Small.template_key(), 30);
    }

    #[test]
    fn attribute_json_overrides() {
        let o = ConfigOverrides::from_json(r#"{"maxHeight":300,"closeMouseout":"widget"}"#).unwrap();
        let cfg = o.apply(SwitcherConfiguration::default());
        assert_eq!(cfg.max_height, 300);
        assert_eq!(cfg.close_on_mouseout, MouseoutScope::Widget);
    }

    #[test]
    fn close_mouseout_accepts_false() {
        let o = ConfigOverrides::from_json(r#"{"closeMouseout":false}"#).unwrap();
        let cfg = o.apply(SwitcherConfiguration::default());
        assert_eq!(cfg.close_on_mouseout, MouseoutScope::Never);
        let o = ConfigOverrides::from_json(r#"{"closeMouseout":"none"}"#).unwrap();
        assert_eq!(o.apply(SwitcherConfiguration::default()).close_on_mouseout, MouseoutScope::Never);
    }

    #[test]
    fn negative_keep_clamps() {
        let o = ConfigOverrides::from_json(r#"{"keep":-3}"#).unwrap();
        assert_eq!(o.apply(SwitcherConfiguration::default()).keep_count(), 1);
    }

    #[test]
    fn compact_selects_small_thumbnails() {
        let o = ConfigOverrides::from_json(r#"{"compact":true,"loadTheme":"Dark Hive"}"#).unwrap();
        let cfg = o.apply(SwitcherConfiguration::default());
        assert_eq!(cfg.thumbnail, ThumbnailSize::Small);
        assert_eq!(cfg.load_skin.as_deref(), Some("Dark Hive"));
    }

    #[test]
    fn partial_text_override() {
        let o = ConfigOverrides::from_json(r#"{"text":{"prompt":"Pick a skin"}}"#).unwrap();
        let cfg = o.apply(SwitcherConfiguration::default());
        assert_eq!(cfg.text.prompt, "Pick a skin");
        assert_eq!(cfg.text.current, "Theme: ");
    }

    #[test]
    fn toml_defaults_use_snake_case() {
        let toml = r#"
show_reset = true
show_remember = true
keep = 4
close_mouseout = "none"
load_skin = "Sunny"
"#;
        let o = ConfigOverrides::from_toml(toml).unwrap();
        let cfg = o.apply(SwitcherConfiguration::default());
        assert!(cfg.show_reset);
        assert!(cfg.show_remember);
        assert_eq!(cfg.keep_count(), 4);
        assert_eq!(cfg.close_on_mouseout, MouseoutScope::Never);
        assert_eq!(cfg.load_skin.as_deref(), Some("Sunny"));
    }

    #[test]
    fn resolve_layers_attribute_over_explicit() {
        let explicit = ConfigOverrides {
            max_height: Some(150),
            sorted: Some(false),
            ..ConfigOverrides::default()
        };
        let cfg = SwitcherConfiguration::resolve(
            &SwitcherConfiguration::default(),
            Some(&explicit),
            Some(r#"{"maxHeight":400}"#),
        )
        .unwrap();
        assert_eq!(cfg.max_height, 400);
        assert!(!cfg.sorted);
    }

    #[test]
    fn malformed_attribute_is_config_error() {
        let err = ConfigOverrides::from_json("{maxHeight:").unwrap_err();
        assert!(format!("{err}").contains(CONFIG_ATTRIBUTE));
    }

    #[test]
    fn malformed_defaults_toml() {
        let err = ConfigOverrides::from_toml("keep = [oops").unwrap_err();
        assert!(format!("{err}").contains("switcher.toml"));
    }
}
