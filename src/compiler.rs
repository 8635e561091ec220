//! Turn a flattened semantic style into a platform style
//!
//! Theme tokens are looked up per key scale, the semantic `shadow` key is
//! expanded for the target, keys the target cannot use are dropped, and on web
//! the interaction state is mirrored into `data-*` attributes.

use crate::core::{Scale, COLOR_KEYWORDS, NATIVE_ONLY_KEYS, SHADOW_KEY, WEB_ONLY_KEYS};
use crate::error::{Result, StyleError};
use crate::theme::Theme;
use crate::types::{InteractionState, Platform, PropBag, PropValue, StateKind, StrictMode, StyleMap};
use serde::Serialize;
use std::collections::BTreeMap;

/// Final product of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedStyleOutput {
    pub style: StyleMap,
    /// `data-*` flags for attribute selectors; empty on native targets
    #[serde(rename = "dataSet")]
    pub data_set: BTreeMap<String, bool>,
    /// Non-style props contributed by theme recipes
    #[serde(skip_serializing_if = "PropBag::is_empty")]
    pub theme_props: PropBag,
}

/// Compiler inputs besides the style itself
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions<'a> {
    pub platform: Platform,
    pub state: InteractionState,
    pub strict_mode: StrictMode,
    /// Component name, used in strict-mode reports
    pub component: &'a str,
}

pub fn compile(style: &StyleMap, theme: &Theme, options: &CompileOptions<'_>) -> Result<ResolvedStyleOutput> {
    let mut out = ResolvedStyleOutput::default();

    // Shadow first so explicit shadow* keys written by the author win.
    if let Some(level) = style.get(SHADOW_KEY).filter(|v| !v.is_nullish()) {
        expand_shadow(level, theme, options, &mut out.style)?;
    }

    for (key, value) in style {
        if key == SHADOW_KEY || value.is_nullish() || !supported_on(key, options.platform) {
            continue;
        }

        let mut compiled = resolve_token(key, value, theme, options)?;
        if options.platform != Platform::Web {
            compiled = native_value(compiled);
        }
        out.style.insert(key.clone(), compiled);
    }

    if options.platform == Platform::Web {
        for kind in StateKind::ALL {
            out.data_set
                .insert(kind.data_attribute().to_string(), options.state.is_active(kind));
        }
    }

    Ok(out)
}

fn supported_on(key: &str, platform: Platform) -> bool {
    match platform {
        Platform::Web => !NATIVE_ONLY_KEYS.contains(&key),
        Platform::Ios | Platform::Android => !WEB_ONLY_KEYS.contains(&key),
    }
}

/// Replace a value with its theme token when the key has a scale.
fn resolve_token(key: &str, value: &PropValue, theme: &Theme, options: &CompileOptions<'_>) -> Result<PropValue> {
    let Some(scale) = Scale::for_key(key) else {
        return Ok(value.clone());
    };

    if let Some(token) = lookup_token(scale, value, theme) {
        return Ok(token);
    }

    check_raw_value(key, value, scale, options)?;
    Ok(value.clone())
}

fn lookup_token(scale: Scale, value: &PropValue, theme: &Theme) -> Option<PropValue> {
    let key = value.token_key()?;

    let find = |k: &str| {
        theme
            .token(scale, k)
            .or_else(|| match scale {
                Scale::Sizes => theme.token(Scale::Space, k),
                _ => None,
            })
            .filter(|token| token.is_scalar())
            .cloned()
    };

    if let Some(token) = find(&key) {
        return Some(token);
    }

    // Negative spacing: `-4` is the space token `4`, negated.
    let positive = key.strip_prefix('-')?;
    if !matches!(scale, Scale::Space | Scale::Sizes) {
        return None;
    }
    match find(positive)? {
        PropValue::Number(n) => Some(PropValue::Number(-n)),
        PropValue::String(s) => Some(PropValue::String(format!("-{}", s))),
        _ => None,
    }
}

fn check_raw_value(key: &str, value: &PropValue, scale: Scale, options: &CompileOptions<'_>) -> Result<()> {
    if options.strict_mode == StrictMode::Off || !is_strict_violation(value, scale) {
        return Ok(());
    }

    match options.strict_mode {
        StrictMode::Error => Err(StyleError::strict(options.component, key, value.to_compact_string())),
        _ => {
            log::warn!(
                "{}: '{}' uses raw value {} instead of a {} token",
                options.component,
                key,
                value.to_compact_string(),
                scale.theme_key()
            );
            Ok(())
        }
    }
}

fn is_strict_violation(value: &PropValue, scale: Scale) -> bool {
    match value {
        PropValue::Number(n) => *n != 0.0,
        PropValue::String(s) => !(scale == Scale::Colors && COLOR_KEYWORDS.contains(&s.as_str())),
        _ => false,
    }
}

/// Native targets take bare numbers for pixel lengths.
fn native_value(value: PropValue) -> PropValue {
    match value {
        PropValue::String(s) => match s.strip_suffix("px").and_then(|n| n.trim().parse::<f64>().ok()) {
            Some(n) => PropValue::Number(n),
            None => PropValue::String(s),
        },
        other => other,
    }
}

fn expand_shadow(level: &PropValue, theme: &Theme, options: &CompileOptions<'_>, style: &mut StyleMap) -> Result<()> {
    let token = match level {
        PropValue::Object(map) => Some(map.clone()),
        other => other
            .token_key()
            .and_then(|key| theme.token(Scale::Shadows, &key))
            .and_then(|token| token.as_object().cloned()),
    };

    let Some(shadow) = token else {
        check_raw_value(SHADOW_KEY, level, Scale::Shadows, options)?;
        log::debug!("{}: no shadow token for {}", options.component, level);
        return Ok(());
    };

    let color = match shadow.get("shadowColor") {
        Some(color) => resolve_token("shadowColor", color, theme, options)?,
        None => PropValue::from("black"),
    };
    let offset = shadow.get("shadowOffset").and_then(|o| o.as_object());
    let offset_x = offset.and_then(|o| o.get("width")).and_then(|v| v.as_f64()).unwrap_or(0.0);
    let offset_y = offset.and_then(|o| o.get("height")).and_then(|v| v.as_f64()).unwrap_or(0.0);
    let opacity = shadow.get("shadowOpacity").and_then(|v| v.as_f64()).unwrap_or(1.0);
    let radius = shadow.get("shadowRadius").and_then(|v| v.as_f64()).unwrap_or(0.0);

    match options.platform {
        Platform::Web => {
            let color = color_with_opacity(&color.to_string(), opacity);
            style.insert(
                "boxShadow".to_string(),
                PropValue::String(format!(
                    "{}px {}px {}px {}",
                    format_number(offset_x),
                    format_number(offset_y),
                    format_number(radius),
                    color
                )),
            );
        }
        Platform::Ios | Platform::Android => {
            let mut offset_map = BTreeMap::new();
            offset_map.insert("width".to_string(), PropValue::Number(offset_x));
            offset_map.insert("height".to_string(), PropValue::Number(offset_y));

            style.insert("shadowColor".to_string(), color);
            style.insert("shadowOffset".to_string(), PropValue::Object(offset_map));
            style.insert("shadowOpacity".to_string(), PropValue::Number(opacity));
            style.insert("shadowRadius".to_string(), PropValue::Number(radius));

            if options.platform == Platform::Android {
                if let Some(elevation) = shadow.get("elevation").filter(|v| v.is_defined()) {
                    style.insert("elevation".to_string(), elevation.clone());
                }
            }
        }
    }

    Ok(())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// `#rrggbb` / `#rgb` plus an opacity as `rgba(...)`; other colors pass through.
fn color_with_opacity(color: &str, opacity: f64) -> String {
    match parse_hex_color(color) {
        Some((r, g, b)) if opacity < 1.0 => {
            format!("rgba({}, {}, {}, {})", r, g, b, format_number(opacity))
        }
        _ => color.to_string(),
    }
}

fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').filter(|hex| hex.is_ascii())?;
    match hex.len() {
        6 => Some((
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some((channel(0)?, channel(1)?, channel(2)?))
        }
        _ => None,
    }
}
