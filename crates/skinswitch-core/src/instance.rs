//! One switcher widget bound to one target element.
//!
//! An instance owns its menu model and panel state but never mutates page
//! state itself: clicks are routed to an [`Action`] that the coordinator
//! carries out, and the coordinator pushes a [`DisplaySnapshot`] back after
//! every committed transition. Drawing is delegated to an optional
//! [`SwitcherView`].

use std::fmt;

use skinswitch_types::dom::NodeId;

use crate::config::{MouseoutScope, SwitcherConfiguration};
use crate::registry::SkinRegistry;

/// Class carried by a target element while a switcher is bound to it.
pub const BOUND_CLASS: &str = "skinswitch";

/// Menu key of the remember entry.
pub const REMEMBER_KEY: &str = "skinswitch-remember";

/// Menu key of the reset entry.
pub const RESET_KEY: &str = "skinswitch-reset";

/// Vertical padding around each skin row, in pixels.
const ROW_PADDING: u32 = 4;

// -- Types --------------------------------------------------------------------

pub type InstanceId = usize;

/// Pointer regions of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The always-visible label bar.
    Header,
    /// The expandable skin list.
    Panel,
    /// Header and panel together.
    Widget,
}

/// What a menu entry does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRole {
    Remember,
    Reset,
    Skin(String),
}

/// One row of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Binding key: [`REMEMBER_KEY`], [`RESET_KEY`] or the skin's class token.
    pub key: String,
    pub role: EntryRole,
    pub label: String,
    pub thumbnail: Option<String>,
    pub visible: bool,
}

/// Action produced by routing a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select(String),
    Reset,
    ToggleRemember,
}

/// Page-wide state pushed to every instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub current: Option<String>,
    pub current_token: Option<String>,
    pub remembering: bool,
}

/// What an instance currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub label: String,
    /// Key of the highlighted menu entry.
    pub active_entry: Option<String>,
    pub remember_checked: bool,
    pub expanded: bool,
}

/// Rendering layer hook-up.
pub trait SwitcherView {
    /// Show `display` for the widget bound to `target`.
    fn render(&mut self, target: &str, display: &DisplayState);

    /// The panel was collapsed.
    fn collapsed(&mut self, _target: &str, _animated: bool) {}
}

/// Expandable panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub expanded: bool,
    /// Whether expand/collapse is animated.
    pub animated: bool,
    /// Scroll offset of the skin list.
    pub scroll_top: u32,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            expanded: false,
            animated: true,
            scroll_top: 0,
        }
    }
}

// -- Instance -----------------------------------------------------------------

pub struct SwitcherInstance {
    id: InstanceId,
    target: String,
    node: NodeId,
    config: SwitcherConfiguration,
    registry: SkinRegistry,
    menu: Vec<MenuEntry>,
    panel: PanelState,
    header_hovered: bool,
    snapshot: DisplaySnapshot,
    display: DisplayState,
    view: Option<Box<dyn SwitcherView>>,
}

impl SwitcherInstance {
    pub(crate) fn new(
        id: InstanceId,
        target: &str,
        node: NodeId,
        config: SwitcherConfiguration,
        registry: SkinRegistry,
        can_remember: bool,
        view: Option<Box<dyn SwitcherView>>,
    ) -> Self {
        let menu = build_menu(&config, &registry, can_remember);
        let mut instance = Self {
            id,
            target: target.to_string(),
            node,
            config,
            registry,
            menu,
            panel: PanelState::default(),
            header_hovered: false,
            snapshot: DisplaySnapshot::default(),
            display: DisplayState::default(),
            view,
        };
        instance.display = instance.compute_display();
        instance
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Id of the bound element.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn config(&self) -> &SwitcherConfiguration {
        &self.config
    }

    pub fn registry(&self) -> &SkinRegistry {
        &self.registry
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn snapshot(&self) -> &DisplaySnapshot {
        &self.snapshot
    }

    /// Height of the scrollable list: all visible skin rows, capped at the
    /// configured maximum.
    pub fn list_height(&self) -> u32 {
        let row = self.config.thumbnail.dimensions().1 + ROW_PADDING;
        let rows = self
            .menu
            .iter()
            .filter(|e| e.visible && matches!(e.role, EntryRole::Skin(_)))
            .count();
        let rows = u32::try_from(rows).unwrap_or(u32::MAX);
        rows.saturating_mul(row).min(self.config.max_height)
    }

    /// Map a clicked entry key to exactly one action. Hidden or unknown
    /// entries do nothing.
    pub fn route(&self, key: &str) -> Option<Action> {
        let entry = self.menu.iter().find(|e| e.key == key && e.visible)?;
        Some(match &entry.role {
            EntryRole::Remember => Action::ToggleRemember,
            EntryRole::Reset => Action::Reset,
            EntryRole::Skin(name) => Action::Select(name.clone()),
        })
    }

    /// Header click: expand or collapse the panel.
    pub fn toggle_panel(&mut self) {
        if self.panel.expanded {
            self.collapse(self.panel.animated);
        } else {
            self.panel.expanded = true;
            self.refresh();
        }
    }

    pub fn pointer_enter(&mut self, region: Region) {
        if region == Region::Header && !self.header_hovered {
            self.header_hovered = true;
            self.refresh();
        }
    }

    /// Returns true if leaving `region` collapsed the panel.
    pub fn pointer_leave(&mut self, region: Region) -> bool {
        if matches!(region, Region::Header | Region::Widget) && self.header_hovered {
            self.header_hovered = false;
            self.refresh();
        }

        let scoped = match self.config.close_on_mouseout {
            MouseoutScope::Panel => region == Region::Panel,
            MouseoutScope::Widget => region == Region::Widget,
            MouseoutScope::Never => false,
        };
        if scoped && self.panel.expanded {
            self.collapse_instantly();
            return true;
        }
        false
    }

    /// Collapse without animation, then restore the animation setting.
    pub fn collapse_instantly(&mut self) {
        let animated = self.panel.animated;
        self.panel.animated = false;
        self.collapse(false);
        self.panel.animated = animated;
    }

    pub(crate) fn close_after_select(&mut self) {
        if self.config.close_on_select && self.panel.expanded {
            self.collapse(self.panel.animated);
        }
    }

    pub(crate) fn close_after_reset(&mut self) {
        self.close_after_select();
    }

    /// Take a new page-wide snapshot and redraw.
    pub(crate) fn render(&mut self, snapshot: &DisplaySnapshot) {
        self.snapshot = snapshot.clone();
        self.refresh();
    }

    fn collapse(&mut self, animated: bool) {
        self.panel.expanded = false;
        self.panel.scroll_top = 0;
        if let Some(view) = self.view.as_mut() {
            view.collapsed(&self.target, animated);
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        self.display = self.compute_display();
        if let Some(view) = self.view.as_mut() {
            view.render(&self.target, &self.display);
        }
    }

    fn compute_display(&self) -> DisplayState {
        let text = &self.config.text;
        let show_current = !self.config.rollover || self.header_hovered;
        let label = match &self.snapshot.current {
            Some(name) if show_current => format!("{}{name}", text.current),
            _ => text.prompt.clone(),
        };
        let active_entry = self
            .snapshot
            .current_token
            .as_ref()
            .filter(|token| self.menu.iter().any(|e| &e.key == *token))
            .cloned();
        DisplayState {
            label,
            active_entry,
            remember_checked: self.snapshot.remembering,
            expanded: self.panel.expanded,
        }
    }
}

impl fmt::Debug for SwitcherInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitcherInstance")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("panel", &self.panel)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

fn build_menu(
    config: &SwitcherConfiguration,
    registry: &SkinRegistry,
    can_remember: bool,
) -> Vec<MenuEntry> {
    let mut menu = Vec::with_capacity(registry.len() + 2);
    menu.push(MenuEntry {
        key: REMEMBER_KEY.to_string(),
        role: EntryRole::Remember,
        label: config.text.remember.clone(),
        thumbnail: None,
        visible: can_remember && config.show_remember,
    });
    menu.push(MenuEntry {
        key: RESET_KEY.to_string(),
        role: EntryRole::Reset,
        label: config.text.reset.clone(),
        thumbnail: None,
        visible: config.show_reset,
    });
    menu.extend(registry.iter().map(|skin| MenuEntry {
        key: skin.class_token.clone(),
        role: EntryRole::Skin(skin.name.clone()),
        label: skin.name.clone(),
        thumbnail: Some(skin.thumbnail.clone()),
        visible: true,
    }));
    menu
}
