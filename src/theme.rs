//! Design theme: breakpoints, token scales and per-component recipes
//!
//! A [`Theme`] is parsed and validated once, then shared read-only behind an
//! `Arc`. Every constructed theme gets a fresh [`ThemeId`]; resolution caches
//! key on that id, so swapping themes is always observed as a new identity.

use crate::core::{Scale, DEFAULT_BREAKPOINTS};
use crate::error::{Result, StyleError};
use crate::types::{PropBag, PropValue, StateKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THEME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one constructed theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeId(u64);

impl ThemeId {
    fn next() -> Self {
        ThemeId(NEXT_THEME_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "theme#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    pub name: String,
    pub min_width: f32,
}

/// Style recipes for one component kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTheme {
    pub base_style: PropBag,
    pub sizes: BTreeMap<String, PropBag>,
    pub variants: BTreeMap<String, PropBag>,
    pub default_props: PropBag,
    pub states: BTreeMap<StateKind, PropBag>,
}

#[derive(Debug)]
pub struct Theme {
    id: ThemeId,
    breakpoints: Vec<Breakpoint>,
    scales: BTreeMap<&'static str, PropValue>,
    components: BTreeMap<String, ComponentTheme>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ThemeFile {
    #[serde(default)]
    breakpoints: BTreeMap<String, f32>,
    #[serde(default)]
    colors: PropValue,
    #[serde(default)]
    space: PropValue,
    #[serde(default)]
    sizes: PropValue,
    #[serde(default)]
    radii: PropValue,
    #[serde(default)]
    border_widths: PropValue,
    #[serde(default)]
    fonts: PropValue,
    #[serde(default)]
    font_sizes: PropValue,
    #[serde(default)]
    font_weights: PropValue,
    #[serde(default)]
    line_heights: PropValue,
    #[serde(default)]
    letter_spacings: PropValue,
    #[serde(default)]
    shadows: PropValue,
    #[serde(default)]
    components: BTreeMap<String, PropValue>,
}

impl Theme {
    /// Theme with default breakpoints, no tokens and no components
    pub fn empty() -> Self {
        Self {
            id: ThemeId::next(),
            breakpoints: default_breakpoints(),
            scales: BTreeMap::new(),
            components: BTreeMap::new(),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let file: ThemeFile = serde_json::from_str(source)?;
        Self::from_file(file)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: ThemeFile = toml::from_str(source)?;
        Self::from_file(file)
    }

    /// Load a `.json` or `.toml` theme file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| StyleError::FileNotFound {
            path: format!("{}: {}", path.display(), e),
        })?;

        let theme = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source)?,
            Some("toml") => Self::from_toml_str(&source)?,
            _ => {
                return Err(StyleError::invalid_format(format!(
                    "Theme file must be .json or .toml: {}",
                    path.display()
                )))
            }
        };

        log::info!(
            "Loaded {} from {} ({} components)",
            theme.id,
            path.display(),
            theme.components.len()
        );
        Ok(theme)
    }

    fn from_file(file: ThemeFile) -> Result<Self> {
        let breakpoints = parse_breakpoints(file.breakpoints)?;

        let mut scales = BTreeMap::new();
        for (scale, value) in [
            (Scale::Colors, file.colors),
            (Scale::Space, file.space),
            (Scale::Sizes, file.sizes),
            (Scale::Radii, file.radii),
            (Scale::BorderWidths, file.border_widths),
            (Scale::Fonts, file.fonts),
            (Scale::FontSizes, file.font_sizes),
            (Scale::FontWeights, file.font_weights),
            (Scale::LineHeights, file.line_heights),
            (Scale::LetterSpacings, file.letter_spacings),
            (Scale::Shadows, file.shadows),
        ] {
            match value {
                PropValue::Undefined => {}
                PropValue::Object(_) => {
                    scales.insert(scale.theme_key(), value);
                }
                _ => {
                    return Err(StyleError::theme(
                        scale.theme_key(),
                        "token scale must be an object",
                    ))
                }
            }
        }

        if let Some(PropValue::Object(shadows)) = scales.get(Scale::Shadows.theme_key()) {
            for (level, shadow) in shadows {
                if !matches!(shadow, PropValue::Object(_)) {
                    return Err(StyleError::theme(
                        format!("shadows.{}", level),
                        "shadow token must be an object",
                    ));
                }
            }
        }

        let mut components = BTreeMap::new();
        for (name, raw) in file.components {
            let component = parse_component(&name, raw)?;
            components.insert(name, component);
        }

        Ok(Self {
            id: ThemeId::next(),
            breakpoints,
            scales,
            components,
        })
    }

    pub fn id(&self) -> ThemeId {
        self.id
    }

    /// Breakpoints sorted by ascending min width
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn breakpoint_index(&self, name: &str) -> Option<usize> {
        self.breakpoints.iter().position(|bp| bp.name == name)
    }

    /// Largest breakpoint whose min width fits in `width`
    pub fn breakpoint_for_width(&self, width: f32) -> usize {
        self.breakpoints
            .iter()
            .rposition(|bp| bp.min_width <= width)
            .unwrap_or(0)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentTheme> {
        self.components.get(name)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &String> {
        self.components.keys()
    }

    /// Look up a token in a scale, by direct key first and then by dotted path
    /// (`primary.500`).
    pub fn token(&self, scale: Scale, key: &str) -> Option<&PropValue> {
        let root = self.scales.get(scale.theme_key())?;

        if let Some(found) = root.as_object().and_then(|map| map.get(key)) {
            return Some(found);
        }

        let mut current = root;
        for segment in key.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

fn default_breakpoints() -> Vec<Breakpoint> {
    DEFAULT_BREAKPOINTS
        .iter()
        .map(|(name, width)| Breakpoint {
            name: name.to_string(),
            min_width: *width,
        })
        .collect()
}

fn parse_breakpoints(raw: BTreeMap<String, f32>) -> Result<Vec<Breakpoint>> {
    if raw.is_empty() {
        return Ok(default_breakpoints());
    }

    let mut breakpoints: Vec<Breakpoint> = raw
        .into_iter()
        .map(|(name, min_width)| Breakpoint { name, min_width })
        .collect();

    for bp in &breakpoints {
        if !bp.min_width.is_finite() || bp.min_width < 0.0 {
            return Err(StyleError::theme(
                format!("breakpoints.{}", bp.name),
                format!("min width must be a non-negative number, got {}", bp.min_width),
            ));
        }
    }

    breakpoints.sort_by(|a, b| a.min_width.total_cmp(&b.min_width));

    for pair in breakpoints.windows(2) {
        if pair[0].min_width == pair[1].min_width {
            return Err(StyleError::theme(
                format!("breakpoints.{}", pair[1].name),
                format!("shares min width {} with '{}'", pair[1].min_width, pair[0].name),
            ));
        }
    }

    Ok(breakpoints)
}

fn parse_component(name: &str, raw: PropValue) -> Result<ComponentTheme> {
    let path = format!("components.{}", name);
    let PropValue::Object(fields) = raw else {
        return Err(StyleError::theme(path, "component theme must be an object"));
    };

    let mut component = ComponentTheme::default();

    for (key, value) in fields {
        let field_path = format!("{}.{}", path, key);
        match key.as_str() {
            "baseStyle" => component.base_style = parse_recipe(&field_path, value)?,
            "defaultProps" => component.default_props = expect_object(&field_path, value)?,
            "sizes" => component.sizes = parse_recipe_table(&field_path, value)?,
            "variants" => component.variants = parse_recipe_table(&field_path, value)?,
            other => match StateKind::from_prop_name(other) {
                Some(kind) => {
                    let recipe = expect_object(&field_path, value)?;
                    reject_nested_pseudo(&field_path, &recipe)?;
                    component.states.insert(kind, recipe);
                }
                None => {
                    return Err(StyleError::theme(field_path, "unknown component theme key"));
                }
            },
        }
    }

    Ok(component)
}

fn parse_recipe_table(path: &str, value: PropValue) -> Result<BTreeMap<String, PropBag>> {
    let PropValue::Object(entries) = value else {
        return Err(StyleError::theme(path, "recipe table must be an object"));
    };

    entries
        .into_iter()
        .map(|(name, recipe)| {
            let recipe_path = format!("{}.{}", path, name);
            parse_recipe(&recipe_path, recipe).map(|bag| (name, bag))
        })
        .collect()
}

/// A recipe is a prop bag; pseudo-state props inside it must be prop bags too.
fn parse_recipe(path: &str, value: PropValue) -> Result<PropBag> {
    let recipe = expect_object(path, value)?;
    for (key, nested) in recipe.iter() {
        if StateKind::from_prop_name(key).is_some() {
            let nested_path = format!("{}.{}", path, key);
            let PropValue::Object(map) = nested else {
                return Err(StyleError::theme(nested_path, "state recipe must be an object"));
            };
            reject_nested_pseudo(&nested_path, &PropBag::from(map.clone()))?;
        }
    }
    Ok(recipe)
}

fn reject_nested_pseudo(path: &str, recipe: &PropBag) -> Result<()> {
    match recipe.keys().find(|key| StateKind::from_prop_name(key).is_some()) {
        Some(key) => Err(StyleError::theme(
            format!("{}.{}", path, key),
            "state recipes cannot nest other state recipes",
        )),
        None => Ok(()),
    }
}

fn expect_object(path: &str, value: PropValue) -> Result<PropBag> {
    match value {
        PropValue::Object(map) => Ok(PropBag::from(map)),
        _ => Err(StyleError::theme(path, "recipe must be an object")),
    }
}
