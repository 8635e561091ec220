//! Per-instance memoization of resolution output
//!
//! Keys are structural: prop bags are reduced to an md5 [`Fingerprint`] of a
//! tagged canonical encoding, so two bags with equal contents produce equal
//! keys no matter how they were built. Entries live as long as the owning
//! instance; a theme swap clears everything.

use crate::compiler::ResolvedStyleOutput;
use crate::theme::ThemeId;
use crate::types::{InteractionState, Platform, PropBag, PropValue, StrictMode, StyleMap};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// 128-bit structural digest of a value
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn of_value(value: &PropValue) -> Self {
        let mut ctx = md5::Context::new();
        write_value(&mut ctx, value);
        Fingerprint(ctx.compute().0)
    }

    /// Undefined entries are skipped, so `{a: 1}` and `{a: 1, b: undefined}` match.
    pub fn of_bag(bag: &PropBag) -> Self {
        let mut ctx = md5::Context::new();
        write_map(&mut ctx, bag.as_map());
        Fingerprint(ctx.compute().0)
    }

    pub fn of_style(style: Option<&StyleMap>) -> Self {
        let mut ctx = md5::Context::new();
        match style {
            Some(map) => write_map(&mut ctx, map),
            None => ctx.consume(b"-"),
        }
        Fingerprint(ctx.compute().0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

fn write_len(ctx: &mut md5::Context, len: usize) {
    ctx.consume((len as u64).to_le_bytes());
}

fn write_str(ctx: &mut md5::Context, s: &str) {
    write_len(ctx, s.len());
    ctx.consume(s.as_bytes());
}

fn write_map(ctx: &mut md5::Context, map: &BTreeMap<String, PropValue>) {
    let defined: Vec<_> = map.iter().filter(|(_, v)| v.is_defined()).collect();
    ctx.consume(b"o");
    write_len(ctx, defined.len());
    for (key, value) in defined {
        write_str(ctx, key);
        write_value(ctx, value);
    }
}

fn write_value(ctx: &mut md5::Context, value: &PropValue) {
    match value {
        PropValue::Undefined => ctx.consume(b"u"),
        PropValue::Null => ctx.consume(b"n"),
        PropValue::Bool(b) => {
            ctx.consume(b"b");
            ctx.consume([*b as u8]);
        }
        PropValue::Number(n) => {
            // -0.0 and 0.0 are the same style value
            let normalized = if *n == 0.0 { 0.0f64 } else { *n };
            ctx.consume(b"f");
            ctx.consume(normalized.to_bits().to_le_bytes());
        }
        PropValue::String(s) => {
            ctx.consume(b"s");
            write_str(ctx, s);
        }
        PropValue::Array(items) => {
            ctx.consume(b"a");
            write_len(ctx, items.len());
            for item in items {
                write_value(ctx, item);
            }
        }
        PropValue::Object(map) => write_map(ctx, map),
    }
}

/// Everything that can change the output of one resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub component: String,
    pub styling: Fingerprint,
    pub style_override: Fingerprint,
    pub props: Fingerprint,
    pub state: InteractionState,
    pub theme: ThemeId,
    pub breakpoint: Option<usize>,
    pub platform: Platform,
    pub debug: bool,
    pub strict_mode: StrictMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub recomputations: u64,
    pub invalidations: u64,
    pub entries: usize,
}

/// Memo table owned by one component instance
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<CacheKey, Rc<ResolvedStyleOutput>>,
    theme: Option<ThemeId>,
    hits: u64,
    recomputations: u64,
    invalidations: u64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry if the theme identity changed since the last call.
    pub fn observe_theme(&mut self, theme: ThemeId) {
        match self.theme {
            Some(current) if current == theme => {}
            Some(current) => {
                log::debug!(
                    "Theme changed from {} to {}, dropping {} cached entries",
                    current,
                    theme,
                    self.entries.len()
                );
                self.entries.clear();
                self.invalidations += 1;
                self.theme = Some(theme);
            }
            None => self.theme = Some(theme),
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<Rc<ResolvedStyleOutput>> {
        self.observe_theme(key.theme);
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
            log::trace!("Cache hit for {} ({})", key.component, key.styling);
        }
        found
    }

    /// Store a freshly computed output and count the recomputation.
    pub fn insert(&mut self, key: CacheKey, output: ResolvedStyleOutput) -> Rc<ResolvedStyleOutput> {
        self.observe_theme(key.theme);
        self.recomputations += 1;
        let output = Rc::new(output);
        self.entries.insert(key, Rc::clone(&output));
        output
    }

    /// Release every entry, e.g. when the owning instance unmounts.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.theme = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            recomputations: self.recomputations,
            invalidations: self.invalidations,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn key(theme: ThemeId, styling: &PropBag) -> CacheKey {
        CacheKey {
            component: "Box".to_string(),
            styling: Fingerprint::of_bag(styling),
            style_override: Fingerprint::of_style(None),
            props: Fingerprint::of_bag(styling),
            state: InteractionState::new(),
            theme,
            breakpoint: Some(0),
            platform: Platform::Web,
            debug: false,
            strict_mode: StrictMode::Off,
        }
    }

    #[test]
    fn test_fingerprint_is_structural() {
        let a = PropBag::new().with("p", 4).with("bg", "red.500");
        let b = PropBag::new().with("bg", "red.500").with("p", 4);
        assert_eq!(Fingerprint::of_bag(&a), Fingerprint::of_bag(&b));

        let c = b.clone().with("m", PropValue::Undefined);
        assert_eq!(Fingerprint::of_bag(&a), Fingerprint::of_bag(&c));

        let d = PropBag::new().with("p", 5).with("bg", "red.500");
        assert_ne!(Fingerprint::of_bag(&a), Fingerprint::of_bag(&d));
    }

    #[test]
    fn test_fingerprint_distinguishes_types() {
        assert_ne!(
            Fingerprint::of_value(&PropValue::from("4")),
            Fingerprint::of_value(&PropValue::from(4))
        );
        assert_ne!(
            Fingerprint::of_value(&PropValue::Null),
            Fingerprint::of_value(&PropValue::Undefined)
        );
        assert_ne!(
            Fingerprint::of_value(&PropValue::from(vec!["ab"])),
            Fingerprint::of_value(&PropValue::from(vec!["a", "b"]))
        );
        assert_ne!(Fingerprint::of_style(None), Fingerprint::of_style(Some(&StyleMap::new())));
    }

    #[test]
    fn test_hit_after_insert() {
        let theme = Theme::empty();
        let mut cache = ResolutionCache::new();
        let styling = PropBag::new().with("p", 4);

        assert!(cache.get(&key(theme.id(), &styling)).is_none());
        let stored = cache.insert(key(theme.id(), &styling), ResolvedStyleOutput::default());

        let again = PropBag::new().with("p", 4);
        let hit = cache.get(&key(theme.id(), &again)).unwrap();
        assert!(Rc::ptr_eq(&stored, &hit));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.recomputations(), 1);
    }

    #[test]
    fn test_theme_swap_clears_entries() {
        let first = Theme::empty();
        let second = Theme::empty();
        let mut cache = ResolutionCache::new();
        let styling = PropBag::new();

        cache.insert(key(first.id(), &styling), ResolvedStyleOutput::default());
        assert_eq!(cache.len(), 1);

        assert!(cache.get(&key(second.id(), &styling)).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_fingerprint_hex() {
        let fp = Fingerprint::of_bag(&PropBag::new());
        assert_eq!(fp.to_hex().len(), 32);
        assert_eq!(format!("{}", fp), fp.to_hex());
    }
}
