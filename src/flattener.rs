//! Merge theme layers and author props into one flat style
//!
//! Layers, lowest priority first:
//!
//! 1. component base style
//! 2. size recipe
//! 3. variant recipe
//! 4. theme state recipes, in [`StateKind::ALL`] order, each only while active
//! 5. author plain styling props, then author pseudo-state props of active states
//! 6. explicit `style` override
//!
//! Every prop layer is expanded through the registry into CSS-like keys before
//! merging, so `bg` in a recipe and `backgroundColor` from the author land on
//! the same key and the higher layer wins outright.

use crate::core::{PropRegistry, StyleCategory, COLOR_SCHEME_PLACEHOLDER};
use crate::responsive::{resolve_bag, BreakpointContext, Resolution};
use crate::theme::{ComponentTheme, Theme};
use crate::types::{InteractionState, PropBag, PropValue, StateKind, StyleMap};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Everything the flattener reads for one component instance
#[derive(Debug, Clone, Copy)]
pub struct FlattenInput<'a> {
    pub component: Option<&'a ComponentTheme>,
    pub size: Option<&'a str>,
    pub variant: Option<&'a str>,
    pub color_scheme: Option<&'a str>,
    pub state: InteractionState,
    /// Author styling props, pseudo-state props included
    pub author: &'a PropBag,
    pub style_override: Option<&'a StyleMap>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub style: StyleMap,
    /// Non-style props contributed by theme recipes (e.g. `placeholderTextColor`)
    pub theme_rest: PropBag,
}

/// A recipe after placeholder substitution and responsive resolution,
/// split into its plain props and its pseudo-state props.
#[derive(Debug, Default)]
struct Layer {
    plain: PropBag,
    states: BTreeMap<StateKind, PropBag>,
}

impl Layer {
    fn build(
        recipe: Option<&PropBag>,
        color_scheme: Option<&str>,
        ctx: BreakpointContext,
        theme: &Theme,
    ) -> Resolution<Self> {
        let Some(recipe) = recipe else {
            return Resolution::Resolved(Layer::default());
        };

        let substituted = match color_scheme {
            Some(scheme) => substitute_bag(recipe, scheme),
            None => recipe.clone(),
        };

        resolve_bag(&substituted, ctx, theme).map(Layer::split)
    }

    fn split(bag: PropBag) -> Self {
        let mut layer = Layer::default();
        for (key, value) in bag {
            match (StateKind::from_prop_name(&key), value) {
                (Some(kind), PropValue::Object(inner)) => {
                    layer.states.insert(kind, PropBag::from(inner));
                }
                (_, value) => {
                    layer.plain.insert(key, value);
                }
            }
        }
        layer
    }
}

/// Run the six-layer merge. Deferred when any layer holds a responsive value
/// and the breakpoint is still pending.
pub fn flatten(
    input: &FlattenInput<'_>,
    registry: &PropRegistry,
    theme: &Theme,
    ctx: BreakpointContext,
) -> Resolution<Flattened> {
    let component = input.component;
    let scheme = input.color_scheme;

    let recipes = [
        component.map(|c| &c.base_style),
        component.zip(input.size).and_then(|(c, size)| c.sizes.get(size)),
        component.zip(input.variant).and_then(|(c, variant)| c.variants.get(variant)),
    ];

    let mut layers = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        match Layer::build(recipe, scheme, ctx, theme) {
            Resolution::Resolved(layer) => layers.push(layer),
            Resolution::Deferred => return Resolution::Deferred,
            Resolution::Absent => layers.push(Layer::default()),
        }
    }

    let author = match resolve_bag(input.author, ctx, theme) {
        Resolution::Resolved(bag) => Layer::split(bag),
        Resolution::Deferred => return Resolution::Deferred,
        Resolution::Absent => Layer::default(),
    };

    let mut out = Flattened::default();

    for layer in &layers {
        apply_layer(&mut out, &layer.plain, registry);
    }

    for kind in input.state.active() {
        let component_state = match Layer::build(
            component.and_then(|c| c.states.get(&kind)),
            scheme,
            ctx,
            theme,
        ) {
            Resolution::Resolved(layer) => layer.plain,
            Resolution::Deferred => return Resolution::Deferred,
            Resolution::Absent => PropBag::new(),
        };
        apply_layer(&mut out, &component_state, registry);

        for layer in &layers {
            if let Some(recipe) = layer.states.get(&kind) {
                apply_layer(&mut out, recipe, registry);
            }
        }
    }

    apply_layer(&mut out, &author.plain, registry);

    // Author pseudo props are more specific than author plain props.
    for kind in input.state.active() {
        if let Some(recipe) = author.states.get(&kind) {
            apply_layer(&mut out, recipe, registry);
        }
    }

    if let Some(style_override) = input.style_override {
        for (key, value) in style_override {
            if value.is_defined() {
                out.style.insert(key.clone(), value.clone());
            }
        }
    }

    Resolution::Resolved(out)
}

/// Expand one prop layer into CSS-like keys and overwrite `out` with it.
fn apply_layer(out: &mut Flattened, layer: &PropBag, registry: &PropRegistry) {
    let mut entries: Vec<_> = layer
        .iter()
        .filter(|(_, value)| value.is_defined())
        .filter_map(|(name, value)| match registry.get(name) {
            Some(prop) if prop.category != StyleCategory::Pseudo => Some((prop, value)),
            Some(_) => None,
            None => {
                out.theme_rest.insert(name.clone(), value.clone());
                None
            }
        })
        .collect();

    entries.sort_by(|(a, _), (b, _)| a.specificity().cmp(&b.specificity()).then(a.name.cmp(&b.name)));

    for (prop, value) in entries {
        for target in prop.targets {
            out.style.insert((*target).to_string(), value.clone());
        }
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Replace `${colorScheme}` in every string of a recipe. Other placeholders are left as-is.
fn substitute_bag(bag: &PropBag, scheme: &str) -> PropBag {
    bag.iter()
        .map(|(key, value)| (key.clone(), substitute_value(value, scheme)))
        .collect()
}

fn substitute_value(value: &PropValue, scheme: &str) -> PropValue {
    match value {
        PropValue::String(s) if s.contains("${") => {
            let replaced = placeholder_pattern().replace_all(s, |caps: &regex::Captures<'_>| {
                if &caps[1] == COLOR_SCHEME_PLACEHOLDER {
                    scheme.to_string()
                } else {
                    caps[0].to_string()
                }
            });
            PropValue::String(replaced.into_owned())
        }
        PropValue::Array(items) => {
            PropValue::Array(items.iter().map(|item| substitute_value(item, scheme)).collect())
        }
        PropValue::Object(map) => PropValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_value(v, scheme)))
                .collect(),
        ),
        other => other.clone(),
    }
}
