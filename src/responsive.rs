//! Per-breakpoint value selection
//!
//! A styling value is either a plain scalar, an array indexed by breakpoint
//! (`[a, null, b]`), or an object keyed by breakpoint name
//! (`{ "base": a, "md": b }`). Selection is mobile-first: the value set on the
//! closest breakpoint at or below the current one wins.

use crate::theme::Theme;
use crate::types::{PropBag, PropValue, StateKind};
use std::collections::BTreeMap;

/// Outcome of resolving one value against the breakpoint context
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// A value is in effect at the current breakpoint.
    Resolved(T),
    /// The breakpoint is not known yet; the caller must skip this render.
    Deferred,
    /// Nothing is defined at or below the current breakpoint.
    Absent,
}

impl<T> Resolution<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Deferred => Resolution::Deferred,
            Resolution::Absent => Resolution::Absent,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Resolution::Deferred)
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            _ => None,
        }
    }
}

/// Shape of a styling value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponsiveValue<'a> {
    Scalar(&'a PropValue),
    PerIndex(&'a [PropValue]),
    Named(&'a BTreeMap<String, PropValue>),
}

impl<'a> ResponsiveValue<'a> {
    /// Objects count as responsive only when every key names a breakpoint,
    /// so values like `shadowOffset: { width, height }` stay scalars.
    pub fn classify(value: &'a PropValue, theme: &Theme) -> Self {
        match value {
            PropValue::Array(items) => ResponsiveValue::PerIndex(items),
            PropValue::Object(map)
                if !map.is_empty()
                    && map.keys().all(|key| theme.breakpoint_index(key).is_some()) =>
            {
                ResponsiveValue::Named(map)
            }
            other => ResponsiveValue::Scalar(other),
        }
    }

    pub fn is_responsive(&self) -> bool {
        !matches!(self, ResponsiveValue::Scalar(_))
    }
}

/// Source of the current viewport width, owned by the host
pub trait BreakpointProvider {
    /// `None` while the viewport has not been measured yet
    fn viewport_width(&self) -> Option<f32>;
}

/// Provider with a fixed, externally supplied width
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedViewport(pub Option<f32>);

impl BreakpointProvider for FixedViewport {
    fn viewport_width(&self) -> Option<f32> {
        self.0
    }
}

/// The active breakpoint index, or pending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BreakpointContext {
    current: Option<usize>,
}

impl BreakpointContext {
    pub fn at(index: usize) -> Self {
        Self { current: Some(index) }
    }

    pub fn pending() -> Self {
        Self { current: None }
    }

    pub fn from_width(theme: &Theme, width: Option<f32>) -> Self {
        Self {
            current: width.map(|w| theme.breakpoint_for_width(w)),
        }
    }

    pub fn from_provider(theme: &Theme, provider: &dyn BreakpointProvider) -> Self {
        Self::from_width(theme, provider.viewport_width())
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }
}

/// Select the value in effect at the current breakpoint.
pub fn resolve_value(value: &PropValue, ctx: BreakpointContext, theme: &Theme) -> Resolution<PropValue> {
    if value.is_undefined() {
        return Resolution::Absent;
    }

    let shape = ResponsiveValue::classify(value, theme);
    let current = match (shape, ctx.current) {
        (ResponsiveValue::Scalar(scalar), _) => return Resolution::Resolved(scalar.clone()),
        (_, None) => return Resolution::Deferred,
        (_, Some(current)) => current,
    };

    let found = match shape {
        ResponsiveValue::PerIndex(items) => items
            .iter()
            .take(current.saturating_add(1))
            .rev()
            .find(|item| !item.is_nullish()),
        ResponsiveValue::Named(map) => theme
            .breakpoints()
            .iter()
            .take(current.saturating_add(1))
            .rev()
            .filter_map(|bp| map.get(&bp.name))
            .find(|item| !item.is_nullish()),
        ResponsiveValue::Scalar(_) => None,
    };

    match found {
        Some(value) => Resolution::Resolved(value.clone()),
        None => Resolution::Absent,
    }
}

/// Resolve every value of a bag, recursing into pseudo-state props.
/// Absent values are dropped; any deferred value defers the whole bag.
pub fn resolve_bag(bag: &PropBag, ctx: BreakpointContext, theme: &Theme) -> Resolution<PropBag> {
    let mut resolved = PropBag::new();

    for (key, value) in bag.iter() {
        let outcome = match (StateKind::from_prop_name(key), value) {
            (Some(_), PropValue::Object(inner)) => {
                resolve_bag(&PropBag::from(inner.clone()), ctx, theme).map(PropValue::from)
            }
            _ => resolve_value(value, ctx, theme),
        };

        match outcome {
            Resolution::Resolved(value) => {
                resolved.insert(key.clone(), value);
            }
            Resolution::Absent => {}
            Resolution::Deferred => return Resolution::Deferred,
        }
    }

    Resolution::Resolved(resolved)
}

/// Whether any value in `bag` (or inside its pseudo-state props) varies by breakpoint.
pub fn has_responsive_props(bag: &PropBag, theme: &Theme) -> bool {
    bag.iter().any(|(key, value)| match (StateKind::from_prop_name(key), value) {
        (Some(_), PropValue::Object(inner)) => {
            has_responsive_props(&PropBag::from(inner.clone()), theme)
        }
        _ => ResponsiveValue::classify(value, theme).is_responsive(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> Theme {
        Theme::empty()
    }

    fn sparse() -> PropValue {
        PropValue::Array(vec![
            PropValue::from("red"),
            PropValue::Null,
            PropValue::from("blue"),
        ])
    }

    #[test]
    fn test_scalar_is_returned_unchanged() {
        let theme = theme();
        let value = PropValue::from(4);
        assert_eq!(
            resolve_value(&value, BreakpointContext::at(3), &theme),
            Resolution::Resolved(PropValue::from(4))
        );
        assert_eq!(
            resolve_value(&value, BreakpointContext::pending(), &theme),
            Resolution::Resolved(PropValue::from(4))
        );
    }

    #[test]
    fn test_mobile_first_cascade() {
        let theme = theme();
        let value = sparse();
        let at = |index| resolve_value(&value, BreakpointContext::at(index), &theme);

        assert_eq!(at(0), Resolution::Resolved(PropValue::from("red")));
        assert_eq!(at(1), Resolution::Resolved(PropValue::from("red")));
        assert_eq!(at(2), Resolution::Resolved(PropValue::from("blue")));
        assert_eq!(at(3), Resolution::Resolved(PropValue::from("blue")));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let theme = theme();
        let value = sparse();
        for index in 0..6 {
            let ctx = BreakpointContext::at(index);
            assert_eq!(resolve_value(&value, ctx, &theme), resolve_value(&value, ctx, &theme));
        }
    }

    #[test]
    fn test_named_breakpoints() {
        let theme = theme();
        let value: PropValue = serde_json::from_str(r#"{ "sm": 2, "lg": 6 }"#).unwrap();

        assert_eq!(resolve_value(&value, BreakpointContext::at(0), &theme), Resolution::Absent);
        assert_eq!(
            resolve_value(&value, BreakpointContext::at(1), &theme),
            Resolution::Resolved(PropValue::from(2))
        );
        assert_eq!(
            resolve_value(&value, BreakpointContext::at(3), &theme),
            Resolution::Resolved(PropValue::from(6))
        );
    }

    #[test]
    fn test_out_of_range_index_uses_largest_breakpoint() {
        let theme = theme();
        let ctx = BreakpointContext::at(usize::MAX);
        let named: PropValue = serde_json::from_str(r#"{ "sm": 2, "lg": 6 }"#).unwrap();

        assert_eq!(resolve_value(&named, ctx, &theme), Resolution::Resolved(PropValue::from(6)));
        assert_eq!(
            resolve_value(&sparse(), ctx, &theme),
            resolve_value(&sparse(), BreakpointContext::at(3), &theme)
        );
    }

    #[test]
    fn test_nothing_defined_below_current_is_absent() {
        let theme = theme();
        let value = PropValue::Array(vec![PropValue::Null, PropValue::Null, PropValue::from(8)]);
        assert_eq!(resolve_value(&value, BreakpointContext::at(1), &theme), Resolution::Absent);
    }

    #[test]
    fn test_pending_breakpoint_defers_responsive_values() {
        let theme = theme();
        assert_eq!(
            resolve_value(&sparse(), BreakpointContext::pending(), &theme),
            Resolution::Deferred
        );
    }

    #[test]
    fn test_non_breakpoint_object_is_scalar() {
        let theme = theme();
        let offset: PropValue = serde_json::from_str(r#"{ "width": 0, "height": 2 }"#).unwrap();
        assert_eq!(ResponsiveValue::classify(&offset, &theme), ResponsiveValue::Scalar(&offset));
    }

    #[test]
    fn test_resolve_bag_drops_absent_and_recurses() {
        let theme = theme();
        let bag = PropBag::new()
            .with("p", PropValue::Array(vec![PropValue::Null, PropValue::from(4)]))
            .with("m", 2)
            .with("_hover", PropBag::new().with("bg", vec!["red.100", "red.200"]));

        let resolved = resolve_bag(&bag, BreakpointContext::at(0), &theme).resolved().unwrap();
        assert!(!resolved.contains_key("p"));
        assert_eq!(resolved.get("m"), Some(&PropValue::from(2)));
        let hover = resolved.get("_hover").unwrap().as_object().unwrap();
        assert_eq!(hover["bg"], PropValue::from("red.100"));
    }

    #[test]
    fn test_resolve_bag_deferred_when_pending() {
        let theme = theme();
        let bag = PropBag::new().with("m", 2).with("w", vec![10, 20]);
        assert!(resolve_bag(&bag, BreakpointContext::pending(), &theme).is_deferred());
        assert!(has_responsive_props(&bag, &theme));
        assert!(!has_responsive_props(&PropBag::new().with("m", 2), &theme));
    }

    #[test]
    fn test_context_from_provider() {
        let theme = theme();
        let ctx = BreakpointContext::from_provider(&theme, &FixedViewport(Some(800.0)));
        assert_eq!(ctx.current(), Some(2));
        let pending = BreakpointContext::from_provider(&theme, &FixedViewport(None));
        assert_eq!(pending.current(), None);
    }
}
