//! Structured view of the input profile documents
//!
//! `ActionMap`/`Action` mirror `<actionmap>`/`<action>` in the action-map
//! document; `Superaction`/`Control` mirror the superaction document.
//! `Keybind` is the scanner's candidate binding, alive only for one run.
//!
//! Absent attributes are resolved once, here, through per-entity default
//! tables, so merge and export never see a missing field.

use crate::xml::Element;

/// Attribute name → value used when the attribute is absent
pub type DefaultTable = &'static [(&'static str, &'static str)];

pub const ACTION_MAP_DEFAULTS: DefaultTable =
    &[("name", ""), ("priority", "default"), ("exclusivity", "0")];

pub const ACTION_DEFAULTS: DefaultTable = &[
    ("name", ""),
    ("map", ""),
    ("onPress", ""),
    ("onRelease", ""),
    ("onHold", ""),
    ("retriggerable", ""),
    ("holdTriggerDelay", ""),
    ("holdRepeatDelay", ""),
];

pub const SUPERACTION_DEFAULTS: DefaultTable = &[
    ("name", ""),
    ("ui_group", ""),
    ("ui_name", ""),
    ("ui_tooltip", ""),
    ("keyboard", ""),
];

pub const CONTROL_DEFAULTS: DefaultTable = &[("input", ""), ("controller", "")];

/// Priority given to action maps created for mod bindings
pub const PURE_INCLUDE: &str = "pure_include";

/// Read `key` from `el`, falling back to the table's default for that key
pub fn resolve_attr(el: &Element, table: DefaultTable, key: &str) -> String {
    el.attr(key)
        .or_else(|| table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v))
        .unwrap_or_default()
        .to_string()
}

/// A named group of bindings sharing priority and exclusivity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMap {
    pub name: String,
    pub priority: String,
    pub exclusivity: String,
    pub actions: Vec<Action>,
}

impl ActionMap {
    /// An empty map in the form created for mod bindings
    pub fn pure_include(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: PURE_INCLUDE.to_string(),
            exclusivity: "0".to_string(),
            actions: Vec::new(),
        }
    }

    pub fn from_element(el: &Element) -> Self {
        let get = |key| resolve_attr(el, ACTION_MAP_DEFAULTS, key);
        Self {
            name: get("name"),
            priority: get("priority"),
            exclusivity: get("exclusivity"),
            actions: el.elements("action").map(Action::from_element).collect(),
        }
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.action(name).is_some()
    }
}

/// One binding: an action name with its trigger attributes
///
/// `map` names the owning mod for merged bindings; blank means a native action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub map: String,
    pub on_press: String,
    pub on_release: String,
    pub on_hold: String,
    pub retriggerable: String,
    pub hold_trigger_delay: String,
    pub hold_repeat_delay: String,
}

impl Action {
    pub fn from_element(el: &Element) -> Self {
        let get = |key| resolve_attr(el, ACTION_DEFAULTS, key);
        Self {
            name: get("name"),
            map: get("map"),
            on_press: get("onPress"),
            on_release: get("onRelease"),
            on_hold: get("onHold"),
            retriggerable: get("retriggerable"),
            hold_trigger_delay: get("holdTriggerDelay"),
            hold_repeat_delay: get("holdRepeatDelay"),
        }
    }

    /// Native actions have no owning map and are never pruned
    pub fn is_native(&self) -> bool {
        self.map.trim().is_empty()
    }
}

/// UI-facing description of a bindable action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Superaction {
    pub name: String,
    pub ui_group: String,
    pub ui_name: String,
    pub ui_tooltip: String,
    pub keyboard: String,
    pub actions: Vec<Action>,
    pub controls: Vec<Control>,
}

impl Superaction {
    pub fn from_element(el: &Element) -> Self {
        let get = |key| resolve_attr(el, SUPERACTION_DEFAULTS, key);
        Self {
            name: get("name"),
            ui_group: get("ui_group"),
            ui_name: get("ui_name"),
            ui_tooltip: get("ui_tooltip"),
            keyboard: get("keyboard"),
            actions: el.elements("action").map(Action::from_element).collect(),
            controls: el.elements("control").map(Control::from_element).collect(),
        }
    }
}

/// Physical input attached to a superaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Control {
    pub input: String,
    pub controller: String,
}

impl Control {
    pub fn from_element(el: &Element) -> Self {
        Self {
            input: resolve_attr(el, CONTROL_DEFAULTS, "input"),
            controller: resolve_attr(el, CONTROL_DEFAULTS, "controller"),
        }
    }
}

/// A candidate binding found in a mod, awaiting merge and export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keybind {
    pub name: String,
    /// Owning mod id; `None` only for keybinds built outside the scanner
    pub ui_group: Option<String>,
    pub ui_name: Option<String>,
    pub description: String,
    /// Target action map; `None` or blank resolves to a policy default
    pub map: Option<String>,
}

impl Keybind {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the owning group (builder pattern)
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.ui_group = Some(group.into());
        self
    }

    /// Set the target map (builder pattern)
    pub fn on_map(mut self, map: impl Into<String>) -> Self {
        self.map = Some(map.into());
        self
    }

    /// The target map, if one is set and not blank
    pub fn target_map(&self) -> Option<&str> {
        self.map.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// The target map, or `fallback` when unset or blank
    pub fn map_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.target_map().unwrap_or(fallback)
    }

    pub fn ui_group_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.ui_group.as_deref().unwrap_or(fallback)
    }
}
