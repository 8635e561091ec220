// FILE: src/core/properties.rs

use crate::error::{Result, StyleError};
use std::collections::HashMap;

/// Style category a styling prop belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleCategory {
    Margin,
    Padding,
    Layout,
    Flexbox,
    Position,
    Border,
    Background,
    Color,
    Typography,
    Shadow,
    Other,
    Pseudo,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 12] = [
        StyleCategory::Margin,
        StyleCategory::Padding,
        StyleCategory::Layout,
        StyleCategory::Flexbox,
        StyleCategory::Position,
        StyleCategory::Border,
        StyleCategory::Background,
        StyleCategory::Color,
        StyleCategory::Typography,
        StyleCategory::Shadow,
        StyleCategory::Other,
        StyleCategory::Pseudo,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "margin" => Some(Self::Margin),
            "padding" => Some(Self::Padding),
            "layout" => Some(Self::Layout),
            "flexbox" => Some(Self::Flexbox),
            "position" => Some(Self::Position),
            "border" => Some(Self::Border),
            "background" => Some(Self::Background),
            "color" => Some(Self::Color),
            "typography" => Some(Self::Typography),
            "shadow" => Some(Self::Shadow),
            "other" => Some(Self::Other),
            "pseudo" => Some(Self::Pseudo),
            _ => None,
        }
    }
}

/// Theme token scale a CSS key draws its values from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Space,
    Sizes,
    Colors,
    Radii,
    BorderWidths,
    Fonts,
    FontSizes,
    FontWeights,
    LineHeights,
    LetterSpacings,
    Shadows,
}

impl Scale {
    /// Theme file key for this scale
    pub fn theme_key(&self) -> &'static str {
        match self {
            Scale::Space => "space",
            Scale::Sizes => "sizes",
            Scale::Colors => "colors",
            Scale::Radii => "radii",
            Scale::BorderWidths => "borderWidths",
            Scale::Fonts => "fonts",
            Scale::FontSizes => "fontSizes",
            Scale::FontWeights => "fontWeights",
            Scale::LineHeights => "lineHeights",
            Scale::LetterSpacings => "letterSpacings",
            Scale::Shadows => "shadows",
        }
    }

    /// Scale for a CSS-like key, if it takes theme tokens
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            "marginTop" | "marginRight" | "marginBottom" | "marginLeft"
            | "paddingTop" | "paddingRight" | "paddingBottom" | "paddingLeft"
            | "top" | "right" | "bottom" | "left"
            | "gap" | "rowGap" | "columnGap" => Some(Scale::Space),

            "width" | "height" | "minWidth" | "maxWidth" | "minHeight" | "maxHeight"
            | "flexBasis" => Some(Scale::Sizes),

            "color" | "backgroundColor" | "borderColor"
            | "borderTopColor" | "borderRightColor" | "borderBottomColor" | "borderLeftColor"
            | "shadowColor" | "outlineColor" | "tintColor" | "textDecorationColor" => Some(Scale::Colors),

            "borderRadius" | "borderTopLeftRadius" | "borderTopRightRadius"
            | "borderBottomLeftRadius" | "borderBottomRightRadius" => Some(Scale::Radii),

            "borderWidth" | "borderTopWidth" | "borderRightWidth" | "borderBottomWidth"
            | "borderLeftWidth" | "outlineWidth" => Some(Scale::BorderWidths),

            "fontFamily" => Some(Scale::Fonts),
            "fontSize" => Some(Scale::FontSizes),
            "fontWeight" => Some(Scale::FontWeights),
            "lineHeight" => Some(Scale::LineHeights),
            "letterSpacing" => Some(Scale::LetterSpacings),
            "shadow" => Some(Scale::Shadows),
            _ => None,
        }
    }
}

/// One registered styling prop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleProp {
    pub name: &'static str,
    pub category: StyleCategory,
    /// CSS-like keys this prop writes, in write order
    pub targets: &'static [&'static str],
}

impl StyleProp {
    /// Props that write more keys are applied first inside one layer,
    /// so `pl` beats `px` beats `p` whatever order they arrive in.
    pub fn specificity(&self) -> usize {
        usize::MAX - self.targets.len()
    }
}

const MARGIN: &[&str] = &["marginTop", "marginRight", "marginBottom", "marginLeft"];
const MARGIN_X: &[&str] = &["marginLeft", "marginRight"];
const MARGIN_Y: &[&str] = &["marginTop", "marginBottom"];
const PADDING: &[&str] = &["paddingTop", "paddingRight", "paddingBottom", "paddingLeft"];
const PADDING_X: &[&str] = &["paddingLeft", "paddingRight"];
const PADDING_Y: &[&str] = &["paddingTop", "paddingBottom"];
const ROUNDED_TOP: &[&str] = &["borderTopLeftRadius", "borderTopRightRadius"];
const ROUNDED_BOTTOM: &[&str] = &["borderBottomLeftRadius", "borderBottomRightRadius"];
const ROUNDED_LEFT: &[&str] = &["borderTopLeftRadius", "borderBottomLeftRadius"];
const ROUNDED_RIGHT: &[&str] = &["borderTopRightRadius", "borderBottomRightRadius"];

macro_rules! style_props {
    ($( $category:ident => { $( $($name:literal)|+ => $targets:expr ),* $(,)? } )*) => {
        &[
            $( $( $( StyleProp { name: $name, category: StyleCategory::$category, targets: $targets }, )+ )* )*
        ]
    };
}

/// Centralized prop name to category mapping - used by every resolution phase
pub const STYLE_PROPS: &[StyleProp] = style_props! {
    Margin => {
        "m" | "margin" => MARGIN,
        "mx" | "marginX" => MARGIN_X,
        "my" | "marginY" => MARGIN_Y,
        "mt" | "marginTop" => &["marginTop"],
        "mr" | "marginRight" => &["marginRight"],
        "mb" | "marginBottom" => &["marginBottom"],
        "ml" | "marginLeft" => &["marginLeft"],
    }
    Padding => {
        "p" | "padding" => PADDING,
        "px" | "paddingX" => PADDING_X,
        "py" | "paddingY" => PADDING_Y,
        "pt" | "paddingTop" => &["paddingTop"],
        "pr" | "paddingRight" => &["paddingRight"],
        "pb" | "paddingBottom" => &["paddingBottom"],
        "pl" | "paddingLeft" => &["paddingLeft"],
    }
    Layout => {
        "w" | "width" => &["width"],
        "h" | "height" => &["height"],
        "minW" | "minWidth" => &["minWidth"],
        "maxW" | "maxWidth" => &["maxWidth"],
        "minH" | "minHeight" => &["minHeight"],
        "maxH" | "maxHeight" => &["maxHeight"],
        "display" => &["display"],
        "overflow" => &["overflow"],
        "overflowX" => &["overflowX"],
        "overflowY" => &["overflowY"],
        "aspectRatio" => &["aspectRatio"],
    }
    Flexbox => {
        "alignItems" => &["alignItems"],
        "alignContent" => &["alignContent"],
        "alignSelf" => &["alignSelf"],
        "justifyContent" => &["justifyContent"],
        "justifyItems" => &["justifyItems"],
        "justifySelf" => &["justifySelf"],
        "flexWrap" => &["flexWrap"],
        "flexDir" | "flexDirection" => &["flexDirection"],
        "flex" => &["flex"],
        "flexGrow" => &["flexGrow"],
        "flexShrink" => &["flexShrink"],
        "flexBasis" => &["flexBasis"],
        "order" => &["order"],
        "gap" => &["gap"],
        "rowGap" => &["rowGap"],
        "columnGap" => &["columnGap"],
    }
    Position => {
        "position" => &["position"],
        "zIndex" => &["zIndex"],
        "top" => &["top"],
        "right" => &["right"],
        "bottom" => &["bottom"],
        "left" => &["left"],
    }
    Border => {
        "borderWidth" => &["borderWidth"],
        "borderStyle" => &["borderStyle"],
        "borderColor" => &["borderColor"],
        "borderTopWidth" => &["borderTopWidth"],
        "borderRightWidth" => &["borderRightWidth"],
        "borderBottomWidth" => &["borderBottomWidth"],
        "borderLeftWidth" => &["borderLeftWidth"],
        "borderTopColor" => &["borderTopColor"],
        "borderRightColor" => &["borderRightColor"],
        "borderBottomColor" => &["borderBottomColor"],
        "borderLeftColor" => &["borderLeftColor"],
        "rounded" | "borderRadius" => &["borderRadius"],
        "roundedTop" => ROUNDED_TOP,
        "roundedBottom" => ROUNDED_BOTTOM,
        "roundedLeft" => ROUNDED_LEFT,
        "roundedRight" => ROUNDED_RIGHT,
        "roundedTopLeft" | "borderTopLeftRadius" => &["borderTopLeftRadius"],
        "roundedTopRight" | "borderTopRightRadius" => &["borderTopRightRadius"],
        "roundedBottomLeft" | "borderBottomLeftRadius" => &["borderBottomLeftRadius"],
        "roundedBottomRight" | "borderBottomRightRadius" => &["borderBottomRightRadius"],
    }
    Background => {
        "bg" | "bgColor" | "background" | "backgroundColor" => &["backgroundColor"],
    }
    Color => {
        "c" | "color" => &["color"],
        "tintColor" => &["tintColor"],
    }
    Typography => {
        "fontFamily" => &["fontFamily"],
        "fontSize" => &["fontSize"],
        "fontWeight" => &["fontWeight"],
        "fontStyle" => &["fontStyle"],
        "lineHeight" => &["lineHeight"],
        "letterSpacing" => &["letterSpacing"],
        "textAlign" => &["textAlign"],
        "textTransform" => &["textTransform"],
        "textDecoration" | "textDecorationLine" => &["textDecorationLine"],
        "textDecorationColor" => &["textDecorationColor"],
    }
    Shadow => {
        "shadow" => &["shadow"],
        "shadowColor" => &["shadowColor"],
        "shadowOpacity" => &["shadowOpacity"],
        "shadowRadius" => &["shadowRadius"],
        "shadowOffset" => &["shadowOffset"],
        "elevation" => &["elevation"],
    }
    Other => {
        "opacity" => &["opacity"],
        "cursor" => &["cursor"],
        "userSelect" => &["userSelect"],
        "outlineWidth" => &["outlineWidth"],
        "outlineColor" => &["outlineColor"],
        "outlineStyle" => &["outlineStyle"],
        "outlineOffset" => &["outlineOffset"],
        "transition" => &["transition"],
    }
    Pseudo => {
        "_hover" | "_pressed" | "_focusVisible" | "_focus" => &[],
        "_checked" | "_readOnly" | "_disabled" | "_invalid" => &[],
    }
};

/// Read-only lookup over [`STYLE_PROPS`], built and validated once at startup
#[derive(Debug, Clone)]
pub struct PropRegistry {
    by_name: HashMap<&'static str, &'static StyleProp>,
}

impl PropRegistry {
    /// Registry over the built-in prop table.
    pub fn standard() -> Result<Self> {
        Self::from_table(STYLE_PROPS)
    }

    pub fn from_table(table: &'static [StyleProp]) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(table.len());

        for prop in table {
            if by_name.insert(prop.name, prop).is_some() {
                return Err(StyleError::registry(format!(
                    "prop '{}' is registered more than once",
                    prop.name
                )));
            }
        }

        let registry = Self { by_name };
        registry.validate()?;
        log::debug!("Prop registry ready with {} props", registry.len());
        Ok(registry)
    }

    /// Completeness check: every category has props, every non-pseudo prop
    /// writes at least one key, and pseudo props name known states.
    pub fn validate(&self) -> Result<()> {
        for category in StyleCategory::ALL {
            if !self.by_name.values().any(|p| p.category == category) {
                return Err(StyleError::registry(format!(
                    "no props registered for category {:?}",
                    category
                )));
            }
        }

        for prop in self.by_name.values() {
            match prop.category {
                StyleCategory::Pseudo => {
                    if crate::types::StateKind::from_prop_name(prop.name).is_none() {
                        return Err(StyleError::registry(format!(
                            "pseudo prop '{}' does not name an interaction state",
                            prop.name
                        )));
                    }
                }
                _ if prop.targets.is_empty() => {
                    return Err(StyleError::registry(format!(
                        "prop '{}' expands to no style keys",
                        prop.name
                    )));
                }
                _ => {}
            }
        }

        for kind in crate::types::StateKind::ALL {
            if !self.by_name.contains_key(kind.prop_name()) {
                return Err(StyleError::registry(format!(
                    "state {:?} has no pseudo prop",
                    kind
                )));
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&'static StyleProp> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn category_of(&self, name: &str) -> Option<StyleCategory> {
        self.get(name).map(|p| p.category)
    }

    /// All prop names in a category, sorted
    pub fn props_in(&self, category: StyleCategory) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .by_name
            .values()
            .filter(|p| p.category == category)
            .map(|p| p.name)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
