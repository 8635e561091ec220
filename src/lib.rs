//! Propstyle Style-Prop Resolution Engine
//!
//! Resolves the styling props a UI component receives (`p`, `bg`, `_hover`,
//! responsive arrays and more) against a design theme, and produces a flat
//! platform style object plus the props that should pass through untouched.
//!
//! # Features
//!
//! - Prop classification against a declarative style-prop registry
//! - Component theme recipes: base style, sizes, variants, default props
//! - Interaction-state layers (`_hover`, `_pressed`, `_focus`, ...) in a fixed order
//! - Mobile-first responsive values with a pending-breakpoint render skip
//! - Token lookup, shorthand expansion and shadow expansion per platform
//! - Strict mode that flags raw values where theme tokens are expected
//! - Per-instance memoization keyed on structural prop fingerprints
//!
//! # Basic Usage
//!
//! ```rust
//! use propstyle::{
//!     resolve_props, EngineOptions, InteractionState, PropBag, PropRegistry, Result, Theme,
//! };
//!
//! fn main() -> Result<()> {
//!     let theme = Theme::from_json_str(r#"{ "space": { "4": 16 } }"#)?;
//!     let registry = PropRegistry::standard()?;
//!     let props = PropBag::new().with("p", 4).with("onPress", "submit");
//!     let (plan, _stats) = resolve_props(
//!         &theme,
//!         &registry,
//!         "Box",
//!         &props,
//!         InteractionState::new(),
//!         Some(400.0),
//!         &EngineOptions::default(),
//!     )?;
//!     assert!(!plan.is_skip());
//!     Ok(())
//! }
//! ```
//!
//! # Resolution Pipeline
//!
//! 1. **Phase 1**: Classifier - Split raw props into styling and passthrough props
//! 2. **Phase 2**: Responsive - Pick breakpoint values for selectors and props
//! 3. **Phase 3**: Flattener - Merge theme recipes, state layers, author props and the style override
//! 4. **Phase 4**: Compiler - Resolve tokens and shorthands into a platform style object
//! 5. **Phase 5**: Cache - Memoize the output per component instance

pub mod types;
pub mod error;
pub mod core;
pub mod theme;
pub mod classifier;
pub mod responsive;
pub mod flattener;
pub mod compiler;
pub mod cache;
pub mod resolver;
pub mod cli;

use serde::Serialize;
use std::path::Path;

// Re-export commonly used types and functions
pub use error::{Result, StyleError};
pub use types::*;
pub use crate::core::{PropRegistry, Scale, StyleCategory, StyleProp};
pub use theme::{Breakpoint, ComponentTheme, Theme, ThemeId};
pub use classifier::{classify, extract_in_categories, Partition};
pub use responsive::{
    BreakpointContext, BreakpointProvider, FixedViewport, Resolution, ResponsiveValue,
};
pub use flattener::{flatten, FlattenInput, Flattened};
pub use compiler::{compile, CompileOptions, ResolvedStyleOutput};
pub use cache::{CacheKey, CacheStats, Fingerprint, ResolutionCache};
pub use resolver::{resolve_once, RenderPlan, ResolveContext, ResolvedProps, StyleResolver};

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Engine build information
pub const BUILD_INFO: EngineInfo = EngineInfo {
    version: VERSION,
    name: NAME,
    description: DESCRIPTION,
    platforms: &["web", "ios", "android"],
    supported_features: &[
        "shorthands",
        "tokens",
        "variants",
        "sizes",
        "pseudo-states",
        "responsive",
        "shadows",
        "strict-mode",
    ],
};

/// Engine information structure
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub platforms: &'static [&'static str],
    pub supported_features: &'static [&'static str],
}

/// Resolution options shared by every component instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Target platform for the compiled style object
    pub platform: Platform,

    /// How to treat raw values where a theme token is expected
    pub strict_mode: StrictMode,

    /// Log every resolution at debug level
    pub debug: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            platform: Platform::Web,
            strict_mode: StrictMode::Off,
            debug: false,
        }
    }
}

/// Statistics for one resolution run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionStats {
    /// Number of styling props the author passed
    pub styling_prop_count: usize,

    /// Number of props forwarded to the render target
    pub rest_prop_count: usize,

    /// Number of keys in the compiled style object
    pub style_key_count: usize,

    /// Breakpoint the run resolved against
    pub breakpoint: Option<String>,

    /// Whether rendering was skipped for a pending breakpoint
    pub skipped: bool,

    /// Resolution time in microseconds
    pub resolve_time_us: u64,
}

/// Resolve one set of props against a theme for a viewport width.
///
/// `None` for the width models a viewport that has not been measured yet.
/// The registry is borrowed so hosts build it once per process.
pub fn resolve_props(
    theme: &Theme,
    registry: &PropRegistry,
    component: &str,
    raw: &PropBag,
    state: InteractionState,
    viewport_width: Option<f32>,
    options: &EngineOptions,
) -> Result<(RenderPlan, ResolutionStats)> {
    use std::time::Instant;

    let start_time = Instant::now();

    if options.debug {
        log::info!("{} v{}", NAME, VERSION);
        log::debug!("Engine options: {:?}", options);
    }

    let breakpoint = BreakpointContext::from_width(theme, viewport_width);

    let mut stats = ResolutionStats {
        styling_prop_count: raw
            .iter()
            .filter(|(key, value)| value.is_defined() && registry.contains(key))
            .count(),
        breakpoint: breakpoint
            .current()
            .and_then(|index| theme.breakpoints().get(index))
            .map(|bp| bp.name.clone()),
        ..ResolutionStats::default()
    };

    if options.debug {
        log::debug!(
            "Resolving {} with {} props at breakpoint {:?}",
            component,
            raw.len(),
            stats.breakpoint
        );
    }

    let ctx = ResolveContext {
        theme,
        registry,
        breakpoint,
        options,
    };
    let plan = resolve_once(component, raw, state, &ctx)?;

    match &plan {
        RenderPlan::Render(props) => {
            stats.rest_prop_count = props.rest.len();
            stats.style_key_count = props.style.style.len();
        }
        RenderPlan::Skip => stats.skipped = true,
    }
    stats.resolve_time_us = start_time.elapsed().as_micros() as u64;

    if options.debug {
        log::debug!("Full stats: {:?}", stats);
    }

    Ok((plan, stats))
}

/// Read a `.json` or `.toml` props file into a bag
pub fn load_props(path: impl AsRef<Path>) -> Result<PropBag> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| StyleError::FileNotFound {
        path: format!("{}: {}", path.display(), e),
    })?;

    let value: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&source)?,
        Some("toml") => {
            let table: toml::Value = toml::from_str(&source)?;
            serde_json::to_value(table)?
        }
        _ => {
            return Err(StyleError::invalid_format(format!(
                "Props file must be .json or .toml: {}",
                path.display()
            )))
        }
    };

    match PropValue::from(value) {
        PropValue::Object(map) => Ok(PropBag::from(map)),
        other => Err(StyleError::invalid_format(format!(
            "Props file must hold an object, found {}",
            other.to_compact_string()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const THEME: &str = r##"{
        "space": { "4": 16 },
        "colors": { "red": { "500": "#ef4444" } }
    }"##;

    #[test]
    fn test_resolve_props_reports_stats() {
        let theme = Theme::from_json_str(THEME).unwrap();
        let registry = PropRegistry::standard().unwrap();
        let raw = PropBag::new().with("p", 4).with("bg", "red.500").with("testID", "card");

        let (plan, stats) = resolve_props(
            &theme,
            &registry,
            "Box",
            &raw,
            InteractionState::new(),
            Some(800.0),
            &EngineOptions::default(),
        )
        .unwrap();

        let props = plan.into_resolved().unwrap();
        assert_eq!(props.style.style["backgroundColor"], PropValue::from("#ef4444"));
        assert_eq!(stats.styling_prop_count, 2);
        assert_eq!(stats.rest_prop_count, 1);
        assert_eq!(stats.breakpoint.as_deref(), Some("md"));
        assert!(!stats.skipped);
    }

    #[test]
    fn test_resolve_props_shares_one_registry() {
        let theme = Theme::from_json_str(THEME).unwrap();
        let registry = PropRegistry::standard().unwrap();
        let raw = PropBag::new()
            .with("p", 4)
            .with("m", PropValue::Undefined)
            .with("_hover", PropBag::new().with("bg", "red.500"))
            .with("variant", "outline");

        for component in ["Box", "Button"] {
            let (plan, stats) = resolve_props(
                &theme,
                &registry,
                component,
                &raw,
                InteractionState::new(),
                Some(800.0),
                &EngineOptions::default(),
            )
            .unwrap();
            assert_eq!(stats.styling_prop_count, classify(&raw, &registry).styling.len());
            assert_eq!(stats.styling_prop_count, 2);
            assert_eq!(plan.into_resolved().unwrap().style.style["paddingTop"], PropValue::from(16));
        }
    }

    #[test]
    fn test_unmeasured_viewport_skips_responsive_props() {
        let theme = Theme::from_json_str(THEME).unwrap();
        let registry = PropRegistry::standard().unwrap();
        let raw = PropBag::new().with("p", vec![4, 8]);

        let (plan, stats) = resolve_props(
            &theme,
            &registry,
            "Box",
            &raw,
            InteractionState::new(),
            None,
            &EngineOptions::default(),
        )
        .unwrap();

        assert!(plan.is_skip());
        assert!(stats.skipped);
        assert_eq!(stats.breakpoint, None);
    }

    #[test]
    fn test_load_props_json_and_toml() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{ "p": 4, "variant": "solid" }}"#).unwrap();
        let bag = load_props(json.path()).unwrap();
        assert_eq!(bag.get("p"), Some(&PropValue::from(4)));

        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(toml_file, "bg = \"red.500\"").unwrap();
        writeln!(toml_file, "[_hover]").unwrap();
        writeln!(toml_file, "bg = \"red.600\"").unwrap();
        let bag = load_props(toml_file.path()).unwrap();
        assert_eq!(bag.get("bg"), Some(&PropValue::from("red.500")));
        assert!(bag.get("_hover").unwrap().as_object().is_some());
    }

    #[test]
    fn test_load_props_rejects_unknown_extension() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(load_props(file.path()), Err(StyleError::InvalidFormat { .. })));
    }
}
