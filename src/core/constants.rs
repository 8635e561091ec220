// FILE: src/core/constants.rs

// Default breakpoints (name, min viewport width) used when a theme omits them
pub const DEFAULT_BREAKPOINTS: &[(&str, f32)] = &[
    ("base", 0.0),
    ("sm", 480.0),
    ("md", 768.0),
    ("lg", 992.0),
    ("xl", 1280.0),
    ("2xl", 1536.0),
];

// Props with engine-level meaning
pub const STYLE_OVERRIDE_PROP: &str = "style";
pub const DEBUG_PROP: &str = "debug";
pub const VARIANT_PROP: &str = "variant";
pub const SIZE_PROP: &str = "size";
pub const COLOR_SCHEME_PROP: &str = "colorScheme";

// Placeholder substituted inside theme recipes
pub const COLOR_SCHEME_PLACEHOLDER: &str = "colorScheme";

// Semantic key expanded by the compiler into platform shadow properties
pub const SHADOW_KEY: &str = "shadow";

// Color values that are never theme tokens and never strict-mode violations
pub const COLOR_KEYWORDS: &[&str] = &["transparent", "currentColor", "inherit", "white", "black"];

// Keys only the web target understands
pub const WEB_ONLY_KEYS: &[&str] = &[
    "cursor",
    "outlineWidth",
    "outlineColor",
    "outlineStyle",
    "outlineOffset",
    "userSelect",
    "boxShadow",
    "transition",
];

// Keys only native targets understand
pub const NATIVE_ONLY_KEYS: &[&str] = &["elevation", "tintColor"];
