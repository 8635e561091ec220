//! Per-instance entry point: raw props in, platform style and passthrough props out

use crate::cache::{CacheKey, CacheStats, Fingerprint, ResolutionCache};
use crate::classifier::classify;
use crate::compiler::{compile, CompileOptions, ResolvedStyleOutput};
use crate::core::{PropRegistry, COLOR_SCHEME_PROP, DEBUG_PROP, SIZE_PROP, STYLE_OVERRIDE_PROP, VARIANT_PROP};
use crate::error::Result;
use crate::flattener::{flatten, FlattenInput};
use crate::responsive::{resolve_value, BreakpointContext, Resolution};
use crate::theme::Theme;
use crate::types::{InteractionState, PropBag, PropValue, StyleMap};
use crate::EngineOptions;
use std::rc::Rc;

/// Shared, read-only inputs for one render pass
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub theme: &'a Theme,
    pub registry: &'a PropRegistry,
    pub breakpoint: BreakpointContext,
    pub options: &'a EngineOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProps {
    /// Cached style output; shared with the cache entry
    pub style: Rc<ResolvedStyleOutput>,
    /// Non-styling props for the render target
    pub rest: PropBag,
}

/// What the host should do this render pass
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPlan {
    Render(ResolvedProps),
    /// A responsive value needs a breakpoint that is not measured yet.
    Skip,
}

impl RenderPlan {
    pub fn into_resolved(self) -> Option<ResolvedProps> {
        match self {
            RenderPlan::Render(props) => Some(props),
            RenderPlan::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, RenderPlan::Skip)
    }
}

/// Style resolution for one component instance. Dropping it frees its cache.
#[derive(Debug)]
pub struct StyleResolver {
    component: String,
    cache: ResolutionCache,
}

impl StyleResolver {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            cache: ResolutionCache::new(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn resolve(
        &mut self,
        raw: &PropBag,
        state: InteractionState,
        ctx: &ResolveContext<'_>,
    ) -> Result<RenderPlan> {
        let component_theme = ctx.theme.component(&self.component);

        let mut props = component_theme
            .map(|c| c.default_props.clone())
            .unwrap_or_default();
        props.merge_defined(raw);

        let style_override = props.remove(STYLE_OVERRIDE_PROP).and_then(|value| style_override(&value));
        let debug = ctx.options.debug
            || props.remove(DEBUG_PROP).and_then(|v| v.as_bool()).unwrap_or(false);

        let partition = classify(&props, ctx.registry);

        // Selectors may themselves be responsive
        let mut selected = [None, None, None];
        for (slot, name) in selected.iter_mut().zip([SIZE_PROP, VARIANT_PROP, COLOR_SCHEME_PROP]) {
            if let Some(value) = partition.rest.get(name) {
                match resolve_value(value, ctx.breakpoint, ctx.theme) {
                    Resolution::Resolved(value) => *slot = value.token_key(),
                    Resolution::Absent => {}
                    Resolution::Deferred => return Ok(self.skip(debug)),
                }
            }
        }
        let [size, variant, color_scheme] = selected;

        let key = CacheKey {
            component: self.component.clone(),
            styling: Fingerprint::of_bag(&partition.styling),
            style_override: Fingerprint::of_style(style_override.as_ref()),
            props: Fingerprint::of_bag(&props),
            state,
            theme: ctx.theme.id(),
            breakpoint: ctx.breakpoint.current(),
            platform: ctx.options.platform,
            debug,
            strict_mode: ctx.options.strict_mode,
        };

        let output = match self.cache.get(&key) {
            Some(output) => output,
            None => {
                let input = FlattenInput {
                    component: component_theme,
                    size: size.as_deref(),
                    variant: variant.as_deref(),
                    color_scheme: color_scheme.as_deref(),
                    state,
                    author: &partition.styling,
                    style_override: style_override.as_ref(),
                };

                let flattened = match flatten(&input, ctx.registry, ctx.theme, ctx.breakpoint) {
                    Resolution::Resolved(flattened) => flattened,
                    Resolution::Deferred | Resolution::Absent => return Ok(self.skip(debug)),
                };

                let compile_options = CompileOptions {
                    platform: ctx.options.platform,
                    state,
                    strict_mode: ctx.options.strict_mode,
                    component: &self.component,
                };
                let mut output = compile(&flattened.style, ctx.theme, &compile_options)?;
                output.theme_props = flattened.theme_rest;

                if debug {
                    log::debug!(
                        "{} resolved at breakpoint {:?} on {}: {:?}",
                        self.component,
                        ctx.breakpoint.current(),
                        ctx.options.platform.name(),
                        output.style
                    );
                }

                self.cache.insert(key, output)
            }
        };

        let mut rest = output.theme_props.clone();
        rest.merge_defined(&partition.rest);

        Ok(RenderPlan::Render(ResolvedProps { style: output, rest }))
    }

    fn skip(&self, debug: bool) -> RenderPlan {
        if debug {
            log::debug!("{}: breakpoint pending, skipping render", self.component);
        }
        RenderPlan::Skip
    }

    /// Free cached entries, as on unmount.
    pub fn unmount(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// One-shot resolution without a long-lived cache
pub fn resolve_once(
    component: &str,
    raw: &PropBag,
    state: InteractionState,
    ctx: &ResolveContext<'_>,
) -> Result<RenderPlan> {
    StyleResolver::new(component).resolve(raw, state, ctx)
}

/// The `style` prop: one object, or an array of objects merged left to right.
fn style_override(value: &PropValue) -> Option<StyleMap> {
    match value {
        PropValue::Object(map) => Some(map.clone()),
        PropValue::Array(items) => {
            let mut merged = StyleMap::new();
            for item in items {
                match item {
                    PropValue::Object(map) => merged.extend(
                        map.iter()
                            .filter(|(_, v)| v.is_defined())
                            .map(|(k, v)| (k.clone(), v.clone())),
                    ),
                    other if other.is_nullish() => {}
                    other => log::warn!("Ignoring non-object style entry {}", other),
                }
            }
            Some(merged)
        }
        other if other.is_nullish() => None,
        other => {
            log::warn!("Ignoring non-object style prop {}", other);
            None
        }
    }
}
