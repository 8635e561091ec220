// FILE: src/core/mod.rs

pub mod constants;
pub mod properties;

pub use constants::*;
pub use properties::{PropRegistry, Scale, StyleCategory, StyleProp, STYLE_PROPS};
