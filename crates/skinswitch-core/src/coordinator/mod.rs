//! Page-wide skin state machine.
//!
//! One [`GlobalCoordinator`] owns the page document, the stylesheet manager,
//! the persistence adapter and every [`SwitcherInstance`]. All transitions
//! go through `&mut self` and run to completion before returning. Hooks run
//! before any mutation, so a [`Veto`] leaves nothing behind. After each
//! committed transition the new state is pushed to every live instance.

use skinswitch_types::dom::Document;
use skinswitch_types::error::{Result, SwitchError};

use crate::catalog::Catalog;
use crate::config::{CONFIG_ATTRIBUTE, SwitcherConfiguration};
use crate::hooks::Veto;
use crate::instance::{
    Action, BOUND_CLASS, DisplaySnapshot, InstanceId, REMEMBER_KEY, Region, SwitcherInstance,
    SwitcherView,
};
use crate::marker;
use crate::persistence::PersistenceAdapter;
use crate::registry::{SkinDescriptor, SkinRegistry};
use crate::stylesheet::StylesheetManager;


// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// State shared by every switcher on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalState {
    pub current: Option<SkinDescriptor>,
    /// Skin that was already linked before the first switcher was created.
    pub reset_skin: Option<String>,
    /// Page marker class present before the first switcher was created.
    pub reset_marker: Option<String>,
    pub remembering: bool,
    /// A usable persistence adapter is configured.
    pub can_remember: bool,
    pub instance_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No switcher has been created yet.
    #[default]
    Uninitialized,
    Settled(GlobalState),
}

/// Result of a transition that was not vetoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Committed,
    /// Nothing to do: unknown target or skin, or already current.
    Unchanged,
}

/// Result of a routed menu click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub transition: Transition,
    /// Whether the native default action of the clicked control (ticking
    /// the remember checkbox) should go ahead.
    pub allow_default: bool,
}

/// A transition outcome, or the hook that declined it.
pub type TransitionResult = std::result::Result<Transition, Veto>;

pub type ClickResult = std::result::Result<ClickOutcome, Veto>;

impl ClickOutcome {
    fn unchanged() -> Self {
        Self {
            transition: Transition::Unchanged,
            allow_default: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct GlobalCoordinator {
    document: Document,
    catalog: Catalog,
    stylesheets: StylesheetManager,
    persistence: Option<Box<dyn PersistenceAdapter>>,
    state: CoordinatorState,
    instances: Vec<SwitcherInstance>,
    next_id: InstanceId,
}

impl GlobalCoordinator {
    /// A coordinator for `document` with no persistence; remembering is
    /// disabled until an adapter is attached.
    pub fn new(document: Document, catalog: Catalog) -> Self {
        let stylesheets = StylesheetManager::new(&catalog.base_suffix);
        Self {
            document,
            catalog,
            stylesheets,
            persistence: None,
            state: CoordinatorState::Uninitialized,
            instances: Vec::new(),
            next_id: 0,
        }
    }

    /// Attach a persistence adapter. Only takes effect before the first
    /// switcher is created.
    pub fn with_persistence(mut self, adapter: impl PersistenceAdapter + 'static) -> Self {
        self.persistence = Some(Box::new(adapter));
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stylesheets(&self) -> &StylesheetManager {
        &self.stylesheets
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn global(&self) -> Option<&GlobalState> {
        match &self.state {
            CoordinatorState::Settled(g) => Some(g),
            CoordinatorState::Uninitialized => None,
        }
    }

    fn global_mut(&mut self) -> Option<&mut GlobalState> {
        match &mut self.state {
            CoordinatorState::Settled(g) => Some(g),
            CoordinatorState::Uninitialized => None,
        }
    }

    pub fn current_skin(&self) -> Option<&SkinDescriptor> {
        self.global().and_then(|g| g.current.as_ref())
    }

    pub fn remembering(&self) -> bool {
        self.global().is_some_and(|g| g.remembering)
    }

    pub fn instance_count(&self) -> usize {
        self.global().map_or(0, |g| g.instance_count)
    }

    pub fn instances(&self) -> &[SwitcherInstance] {
        &self.instances
    }

    /// The switcher bound to the element with id `target`.
    pub fn instance(&self, target: &str) -> Option<&SwitcherInstance> {
        self.instances.iter().find(|i| i.target() == target)
    }

    fn index_of(&self, target: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.target() == target)
    }

    // -- Lifecycle -----------------------------------------------------------

    /// Bind a switcher to the element with id `target`.
    pub fn create(&mut self, target: &str, config: SwitcherConfiguration) -> Result<InstanceId> {
        self.create_with_view(target, config, None)
    }

    /// Bind a switcher that draws through `view`.
    ///
    /// A `data-skinswitch` attribute on the target is layered over `config`.
    /// Binding an already-bound target returns the existing instance.
    pub fn create_with_view(
        &mut self,
        target: &str,
        config: SwitcherConfiguration,
        view: Option<Box<dyn SwitcherView>>,
    ) -> Result<InstanceId> {
        if let Some(existing) = self.instance(target) {
            log::debug!("Switcher already bound to '{target}'");
            return Ok(existing.id());
        }

        let node = self
            .document
            .get_element_by_id(target)
            .ok_or_else(|| SwitchError::Target(format!("no element with id '{target}'")))?;
        let attribute = self
            .document
            .element(node)
            .and_then(|el| el.get_attribute(CONFIG_ATTRIBUTE))
            .map(str::to_string);
        let config = SwitcherConfiguration::resolve(&config, None, attribute.as_deref())?;
        let registry = SkinRegistry::resolve(&self.catalog, &config);

        let can_remember = self.persistence.as_ref().is_some_and(|p| p.is_available());
        let persisted = if can_remember {
            self.persistence.as_mut().and_then(|p| p.load())
        } else {
            None
        };

        if self.state == CoordinatorState::Uninitialized {
            self.initialize(&registry, &config, can_remember, persisted.is_some());
        }

        if let Some(el) = self.document.element_mut(node) {
            el.add_class(BOUND_CLASS);
            if let Some(width) = &config.width {
                el.set_attribute("style", &format!("width: {width}"));
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        let keep = config.keep_count();
        let load_skin = config.load_skin.clone();
        self.instances.push(SwitcherInstance::new(
            id,
            target,
            node,
            config,
            registry,
            can_remember,
            view,
        ));
        let remembering = match self.global_mut() {
            Some(g) => {
                g.instance_count += 1;
                g.remembering
            },
            None => false,
        };

        // A remembered skin wins over the configured initial skin.
        let had_persisted = persisted.is_some();
        let initial = persisted.or(load_skin);
        let idx = self.instances.len() - 1;
        if let Some(skin) = initial
            .as_deref()
            .and_then(|name| self.instances[idx].registry().get(name))
            .cloned()
        {
            log::debug!("Initial skin for '{target}': '{}'", skin.name);
            self.commit_skin(skin, keep);
        }
        // Loaded once, but not remembered from here on.
        if had_persisted && !remembering {
            self.persist(None);
        }

        self.broadcast();
        log::info!("Switcher bound to '{target}' ({} skins)", self.instances[idx].registry().len());
        Ok(id)
    }

    /// First switcher on the page: adopt what is already linked and settle.
    fn initialize(
        &mut self,
        registry: &SkinRegistry,
        config: &SwitcherConfiguration,
        can_remember: bool,
        has_persisted: bool,
    ) {
        let reset_skin = self.stylesheets.adopt(&mut self.document, registry);
        let reset_marker = marker::current_marker(&self.document);
        let remembering = can_remember
            && config.force_remember != Some(false)
            && (config.force_remember == Some(true) || has_persisted || !config.show_remember);
        let current = reset_skin
            .as_deref()
            .and_then(|name| registry.get(name))
            .cloned();
        if let Some(skin) = &current {
            marker::set_marker(&mut self.document, Some(&marker::marker_class(&skin.class_token)));
        }
        log::debug!(
            "Page settled: reset skin {reset_skin:?}, marker {reset_marker:?}, remembering {remembering}"
        );
        self.state = CoordinatorState::Settled(GlobalState {
            current,
            reset_skin,
            reset_marker,
            remembering,
            can_remember,
            instance_count: 0,
        });
    }

    /// Unbind the switcher on `target`. The applied skin stays in place.
    pub fn destroy(&mut self, target: &str) -> bool {
        let Some(idx) = self.index_of(target) else {
            return false;
        };
        let instance = self.instances.remove(idx);
        if let Some(el) = self.document.element_mut(instance.node()) {
            el.remove_classes_where(|c| c == BOUND_CLASS);
        }
        if let Some(g) = self.global_mut() {
            g.instance_count = g.instance_count.saturating_sub(1);
        }
        log::info!("Switcher on '{target}' destroyed");
        true
    }

    // -- Transitions ---------------------------------------------------------

    /// Switch to the skin called `name` through the switcher on `target`.
    pub fn select_by_name(&mut self, target: &str, name: &str) -> TransitionResult {
        let Some(idx) = self.index_of(target) else {
            log::debug!("No switcher bound to '{target}'");
            return Ok(Transition::Unchanged);
        };
        self.select_at(idx, name)
    }

    fn select_at(&mut self, idx: usize, name: &str) -> TransitionResult {
        let Some(skin) = self.instances[idx].registry().get(name).cloned() else {
            log::debug!("Ignoring unknown skin '{name}'");
            return Ok(Transition::Unchanged);
        };
        let Some(g) = self.global() else {
            return Ok(Transition::Unchanged);
        };
        let current = g.current.as_ref().map(|s| s.name.clone());
        if current.as_deref() == Some(name) {
            return Ok(Transition::Unchanged);
        }

        let hooks = self.instances[idx].config().hooks.clone();
        hooks.select(name, current.as_deref(), g.remembering)?;

        let keep = self.instances[idx].config().keep_count();
        let previous = self.commit_skin(skin, keep);
        log::info!("Skin changed to '{name}'");
        self.broadcast();
        self.instances[idx].close_after_select();
        hooks.load(name, previous.as_deref());
        Ok(Transition::Committed)
    }

    /// Go back to the skin the page had before any switch.
    pub fn reset(&mut self, target: &str) -> TransitionResult {
        let Some(idx) = self.index_of(target) else {
            log::debug!("No switcher bound to '{target}'");
            return Ok(Transition::Unchanged);
        };
        self.reset_at(idx)
    }

    fn reset_at(&mut self, idx: usize) -> TransitionResult {
        let Some(g) = self.global() else {
            return Ok(Transition::Unchanged);
        };
        let current = g.current.as_ref().map(|s| s.name.clone());
        let reset_skin = g.reset_skin.clone();
        let reset_marker = g.reset_marker.clone();
        let remembering = g.remembering;

        let hooks = self.instances[idx].config().hooks.clone();
        hooks.reset(current.as_deref(), reset_skin.as_deref(), remembering)?;

        let removed = self.stylesheets.reset(&mut self.document);
        let restored = reset_skin
            .as_deref()
            .and_then(|name| self.instances[idx].registry().get(name))
            .cloned();
        let page_marker = restored
            .as_ref()
            .map(|s| marker::marker_class(&s.class_token))
            .or(reset_marker);
        marker::set_marker(&mut self.document, page_marker.as_deref());
        if remembering {
            self.persist(None);
        }
        if let Some(g) = self.global_mut() {
            g.current = restored;
        }

        log::info!("Skin reset to {reset_skin:?} ({removed} stylesheets removed)");
        self.broadcast();
        self.instances[idx].close_after_reset();
        Ok(Transition::Committed)
    }

    /// Flip remembering through the switcher on `target`.
    pub fn toggle_remember(&mut self, target: &str) -> TransitionResult {
        let Some(idx) = self.index_of(target) else {
            return Ok(Transition::Unchanged);
        };
        self.toggle_remember_at(idx, false).map(|o| o.transition)
    }

    fn toggle_remember_at(
        &mut self,
        idx: usize,
        by_checkbox: bool,
    ) -> ClickResult {
        let Some(g) = self.global() else {
            return Ok(ClickOutcome::unchanged());
        };
        if !g.can_remember {
            log::debug!("Remembering is unavailable on this page");
            return Ok(ClickOutcome::unchanged());
        }
        let remembering = !g.remembering;

        let hooks = self.instances[idx].config().hooks.clone();
        hooks.remember(remembering)?;

        let current = match self.global_mut() {
            Some(g) => {
                g.remembering = remembering;
                g.current.clone()
            },
            None => None,
        };
        let stored = if remembering { current.as_ref() } else { None };
        self.persist(stored);

        log::info!("Remembering {}", if remembering { "on" } else { "off" });
        self.broadcast();
        Ok(ClickOutcome {
            transition: Transition::Committed,
            allow_default: by_checkbox,
        })
    }

    // -- Events --------------------------------------------------------------

    /// A click on the menu entry bound to `key`.
    pub fn click(&mut self, target: &str, key: &str) -> ClickResult {
        let Some(idx) = self.index_of(target) else {
            return Ok(ClickOutcome::unchanged());
        };
        let transition = match self.instances[idx].route(key) {
            None => return Ok(ClickOutcome::unchanged()),
            Some(Action::Select(name)) => self.select_at(idx, &name)?,
            Some(Action::Reset) => self.reset_at(idx)?,
            Some(Action::ToggleRemember) => return self.toggle_remember_at(idx, false),
        };
        Ok(ClickOutcome {
            transition,
            allow_default: false,
        })
    }

    /// A click directly on the remember checkbox.
    pub fn click_remember_checkbox(&mut self, target: &str) -> ClickResult {
        let Some(idx) = self.index_of(target) else {
            return Ok(ClickOutcome::unchanged());
        };
        if self.instances[idx].route(REMEMBER_KEY).is_none() {
            return Ok(ClickOutcome::unchanged());
        }
        self.toggle_remember_at(idx, true)
    }

    /// A click on the header of the switcher on `target`.
    pub fn header_click(&mut self, target: &str) {
        if let Some(idx) = self.index_of(target) {
            self.instances[idx].toggle_panel();
        }
    }

    pub fn pointer_enter(&mut self, target: &str, region: Region) {
        if let Some(idx) = self.index_of(target) {
            self.instances[idx].pointer_enter(region);
        }
    }

    /// Returns true if the panel collapsed.
    pub fn pointer_leave(&mut self, target: &str, region: Region) -> bool {
        match self.index_of(target) {
            Some(idx) => self.instances[idx].pointer_leave(region),
            None => false,
        }
    }

    // -- Internals -----------------------------------------------------------

    /// Apply `skin`, mark the page, persist if remembering. Returns the name
    /// of the previous skin.
    fn commit_skin(&mut self, skin: SkinDescriptor, keep: usize) -> Option<String> {
        self.stylesheets.apply(&mut self.document, &skin, keep);
        marker::set_marker(&mut self.document, Some(&marker::marker_class(&skin.class_token)));
        if self.remembering() {
            self.persist(Some(&skin));
        }
        let g = self.global_mut()?;
        g.current.replace(skin).map(|previous| previous.name)
    }

    fn persist(&mut self, skin: Option<&SkinDescriptor>) {
        if let Some(store) = self.persistence.as_mut()
            && let Err(e) = store.store(skin)
        {
            log::warn!("Failed to persist skin: {e}");
        }
    }

    fn snapshot(&self) -> DisplaySnapshot {
        let Some(g) = self.global() else {
            return DisplaySnapshot::default();
        };
        DisplaySnapshot {
            current: g.current.as_ref().map(|s| s.name.clone()),
            current_token: g.current.as_ref().map(|s| s.class_token.clone()),
            remembering: g.remembering,
        }
    }

    /// Push the current state to every live switcher.
    fn broadcast(&mut self) {
        let snapshot = self.snapshot();
        for instance in &mut self.instances {
            instance.render(&snapshot);
        }
    }
}
