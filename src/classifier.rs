//! Split a prop bag into styling props and passthrough props

use crate::core::{PropRegistry, StyleCategory};
use crate::types::PropBag;

/// Result of [`classify`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Props known to the registry, including pseudo-state props
    pub styling: PropBag,
    /// Everything else, forwarded untouched to the render target
    pub rest: PropBag,
}

/// Partition `props` against the registry in one pass.
///
/// Undefined values land in neither side.
pub fn classify(props: &PropBag, registry: &PropRegistry) -> Partition {
    let mut partition = Partition::default();

    for (key, value) in props.iter() {
        if value.is_undefined() {
            continue;
        }
        if registry.contains(key) {
            partition.styling.insert(key.clone(), value.clone());
        } else {
            partition.rest.insert(key.clone(), value.clone());
        }
    }

    partition
}

/// Pull out every prop that belongs to one of `categories`, plus any names in
/// `extra_keys`. Returns `(extracted, remaining)`.
///
/// Composite components use this to move e.g. border props onto an inner
/// element while layout props stay on the wrapper.
pub fn extract_in_categories(
    props: &PropBag,
    categories: &[StyleCategory],
    extra_keys: &[&str],
    registry: &PropRegistry,
) -> (PropBag, PropBag) {
    let mut extracted = PropBag::new();
    let mut remaining = PropBag::new();

    for (key, value) in props.iter() {
        let in_category = registry
            .category_of(key)
            .map_or(false, |category| categories.contains(&category));

        if in_category || extra_keys.contains(&key.as_str()) {
            extracted.insert(key.clone(), value.clone());
        } else {
            remaining.insert(key.clone(), value.clone());
        }
    }

    (extracted, remaining)
}
