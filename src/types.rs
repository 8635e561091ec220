//! Core value types shared by every resolution phase

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single prop or style value.
///
/// `Undefined` marks a prop that was passed but carries no value. It is treated
/// as absent everywhere: it never lands in a partition and never overrides a
/// defined value from a lower-priority source. `Null` is a real, defined value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum PropValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropValue>),
    Object(BTreeMap<String, PropValue>),
}

impl PropValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, PropValue::Undefined)
    }

    pub fn is_defined(&self) -> bool {
        !self.is_undefined()
    }

    /// Null and Undefined both count as "nothing here" for responsive holes.
    pub fn is_nullish(&self) -> bool {
        matches!(self, PropValue::Undefined | PropValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, PropValue>> {
        match self {
            PropValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, PropValue::Array(_) | PropValue::Object(_))
    }

    /// Key used to look a scalar up in a token scale (`4`, `"primary.500"`).
    pub fn token_key(&self) -> Option<String> {
        match self {
            PropValue::String(s) => Some(s.clone()),
            PropValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            PropValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Compact JSON rendering used in log lines and error messages.
    pub fn to_compact_string(&self) -> String {
        serde_json::Value::from(self.clone()).to_string()
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Undefined => write!(f, "undefined"),
            PropValue::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_compact_string()),
        }
    }
}

impl From<serde_json::Value> for PropValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropValue::Null,
            serde_json::Value::Bool(b) => PropValue::Bool(b),
            serde_json::Value::Number(n) => PropValue::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => PropValue::String(s),
            serde_json::Value::Array(items) => {
                PropValue::Array(items.into_iter().map(PropValue::from).collect())
            }
            serde_json::Value::Object(map) => PropValue::Object(
                map.into_iter().map(|(k, v)| (k, PropValue::from(v))).collect(),
            ),
        }
    }
}

impl From<PropValue> for serde_json::Value {
    fn from(value: PropValue) -> Self {
        match value {
            PropValue::Undefined | PropValue::Null => serde_json::Value::Null,
            PropValue::Bool(b) => serde_json::Value::Bool(b),
            PropValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serde_json::Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            PropValue::String(s) => serde_json::Value::String(s),
            PropValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            PropValue::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .filter(|(_, v)| v.is_defined())
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<PropBag> for PropValue {
    fn from(value: PropBag) -> Self {
        PropValue::Object(value.0)
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(value: Vec<T>) -> Self {
        PropValue::Array(value.into_iter().map(Into::into).collect())
    }
}

/// Flat mapping from CSS-like property name to resolved scalar.
pub type StyleMap = BTreeMap<String, PropValue>;

/// The full set of props handed to a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropBag(BTreeMap<String, PropValue>);

impl PropBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Overlay `other` onto `self`, skipping undefined values so they never
    /// shadow what is already here.
    pub fn merge_defined(&mut self, other: &PropBag) {
        for (key, value) in other.iter() {
            if value.is_defined() {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, PropValue> {
        &self.0
    }
}

impl From<BTreeMap<String, PropValue>> for PropBag {
    fn from(map: BTreeMap<String, PropValue>) -> Self {
        PropBag(map)
    }
}

impl FromIterator<(String, PropValue)> for PropBag {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        PropBag(iter.into_iter().collect())
    }
}

impl IntoIterator for PropBag {
    type Item = (String, PropValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Rendering target for the compiled style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Web,
    Ios,
    Android,
}

impl Platform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "web" => Some(Self::Web),
            "ios" => Some(Self::Ios),
            "android" => Some(Self::Android),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

/// How raw (non-token) values for themed keys are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictMode {
    #[default]
    Off,
    Warn,
    Error,
}

impl StrictMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Interaction states a theme can style, listed in merge order: a later
/// state's recipe wins over an earlier one when both are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKind {
    Hovered,
    Pressed,
    FocusVisible,
    Focused,
    Checked,
    ReadOnly,
    Disabled,
    Invalid,
}

impl StateKind {
    pub const ALL: [StateKind; 8] = [
        StateKind::Hovered,
        StateKind::Pressed,
        StateKind::FocusVisible,
        StateKind::Focused,
        StateKind::Checked,
        StateKind::ReadOnly,
        StateKind::Disabled,
        StateKind::Invalid,
    ];

    /// Pseudo-prop name used in themes and prop bags.
    pub fn prop_name(&self) -> &'static str {
        match self {
            StateKind::Hovered => "_hover",
            StateKind::Pressed => "_pressed",
            StateKind::FocusVisible => "_focusVisible",
            StateKind::Focused => "_focus",
            StateKind::Checked => "_checked",
            StateKind::ReadOnly => "_readOnly",
            StateKind::Disabled => "_disabled",
            StateKind::Invalid => "_invalid",
        }
    }

    pub fn from_prop_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.prop_name() == name)
    }

    /// Attribute exposed to web selectors, e.g. `[data-hover=true]`.
    pub fn data_attribute(&self) -> &'static str {
        match self {
            StateKind::Hovered => "data-hover",
            StateKind::Pressed => "data-active",
            StateKind::FocusVisible => "data-focus-visible",
            StateKind::Focused => "data-focus",
            StateKind::Checked => "data-checked",
            StateKind::ReadOnly => "data-readonly",
            StateKind::Disabled => "data-disabled",
            StateKind::Invalid => "data-invalid",
        }
    }

    /// Short CLI name (`hover`, `focus-visible`, ...).
    pub fn from_short_name(name: &str) -> Option<Self> {
        match name {
            "hover" | "hovered" => Some(StateKind::Hovered),
            "press" | "pressed" | "active" => Some(StateKind::Pressed),
            "focus-visible" | "focusVisible" => Some(StateKind::FocusVisible),
            "focus" | "focused" => Some(StateKind::Focused),
            "checked" => Some(StateKind::Checked),
            "readonly" | "readOnly" => Some(StateKind::ReadOnly),
            "disabled" => Some(StateKind::Disabled),
            "invalid" => Some(StateKind::Invalid),
            _ => None,
        }
    }
}

/// Boolean interaction state supplied by the hosting component's
/// hover/focus/press hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionState {
    pub is_hovered: bool,
    pub is_pressed: bool,
    pub is_focus_visible: bool,
    pub is_focused: bool,
    pub is_checked: bool,
    pub is_read_only: bool,
    pub is_disabled: bool,
    pub is_invalid: bool,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, kind: StateKind) -> bool {
        match kind {
            StateKind::Hovered => self.is_hovered,
            StateKind::Pressed => self.is_pressed,
            StateKind::FocusVisible => self.is_focus_visible,
            StateKind::Focused => self.is_focused,
            StateKind::Checked => self.is_checked,
            StateKind::ReadOnly => self.is_read_only,
            StateKind::Disabled => self.is_disabled,
            StateKind::Invalid => self.is_invalid,
        }
    }

    pub fn set(&mut self, kind: StateKind, active: bool) {
        let slot = match kind {
            StateKind::Hovered => &mut self.is_hovered,
            StateKind::Pressed => &mut self.is_pressed,
            StateKind::FocusVisible => &mut self.is_focus_visible,
            StateKind::Focused => &mut self.is_focused,
            StateKind::Checked => &mut self.is_checked,
            StateKind::ReadOnly => &mut self.is_read_only,
            StateKind::Disabled => &mut self.is_disabled,
            StateKind::Invalid => &mut self.is_invalid,
        };
        *slot = active;
    }

    /// Builder-style activation.
    pub fn with(mut self, kind: StateKind) -> Self {
        self.set(kind, true);
        self
    }

    /// Active states in merge order.
    pub fn active(&self) -> impl Iterator<Item = StateKind> + '_ {
        StateKind::ALL.iter().copied().filter(move |kind| self.is_active(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_keeps_integers() {
        let value: PropValue = serde_json::from_str(r#"{"p": 4, "bg": "red.500", "w": [1, null, 3]}"#).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["p"], PropValue::Number(4.0));
        assert_eq!(obj["w"].as_array().unwrap()[1], PropValue::Null);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"bg":"red.500","p":4,"w":[1,null,3]}"#
        );
    }

    #[test]
    fn test_merge_defined_skips_undefined() {
        let mut base = PropBag::new().with("color", "black");
        let overlay = PropBag::new()
            .with("color", PropValue::Undefined)
            .with("bg", "white");
        base.merge_defined(&overlay);
        assert_eq!(base.get("color"), Some(&PropValue::from("black")));
        assert_eq!(base.get("bg"), Some(&PropValue::from("white")));
    }

    #[test]
    fn test_token_key() {
        assert_eq!(PropValue::from(4).token_key().as_deref(), Some("4"));
        assert_eq!(PropValue::from(0.5).token_key().as_deref(), Some("0.5"));
        assert_eq!(PropValue::from("md").token_key().as_deref(), Some("md"));
        assert_eq!(PropValue::Bool(true).token_key(), None);
    }

    #[test]
    fn test_state_names_round_trip() {
        for kind in StateKind::ALL {
            assert_eq!(StateKind::from_prop_name(kind.prop_name()), Some(kind));
        }
        assert_eq!(StateKind::from_prop_name("_unknown"), None);
    }

    #[test]
    fn test_active_states_follow_merge_order() {
        let state = InteractionState::new()
            .with(StateKind::Invalid)
            .with(StateKind::Hovered)
            .with(StateKind::FocusVisible);
        let active: Vec<_> = state.active().collect();
        assert_eq!(
            active,
            vec![StateKind::Hovered, StateKind::FocusVisible, StateKind::Invalid]
        );
    }

    #[test]
    fn test_platform_from_name() {
        assert_eq!(Platform::from_name("Web"), Some(Platform::Web));
        assert_eq!(Platform::from_name("android"), Some(Platform::Android));
        assert_eq!(Platform::from_name("tv"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Platform::default(), Platform::Web);
        assert_eq!(StrictMode::default(), StrictMode::Off);
    }
}
