use propstyle::*;
use std::io::Write;
use std::sync::Arc;

const THEME: &str = r##"{
    "breakpoints": { "base": 0, "sm": 480, "md": 768, "lg": 992 },
    "colors": {
        "primary": { "500": "#06b6d4", "600": "#0891b2" },
        "muted": { "300": "#d4d4d4", "400": "#a3a3a3" },
        "red": { "500": "#ef4444" }
    },
    "space": { "1": 4, "2": 8, "3": 12, "4": 16 },
    "sizes": { "full": "100%" },
    "radii": { "sm": 4 },
    "borderWidths": { "1": 1 },
    "shadows": {
        "3": {
            "shadowColor": "black",
            "shadowOffset": { "width": 0, "height": 2 },
            "shadowOpacity": 0.25,
            "shadowRadius": 3.84,
            "elevation": 5
        }
    },
    "components": {
        "Input": {
            "baseStyle": {
                "borderWidth": 1,
                "borderColor": "muted.300",
                "rounded": "sm",
                "placeholderTextColor": "muted.400",
                "_invalid": { "borderColor": "red.500" }
            },
            "_focus": { "borderColor": "primary.500" }
        },
        "Button": {
            "baseStyle": { "px": 3, "py": 2 },
            "variants": { "solid": { "bg": "${colorScheme}.500" } },
            "defaultProps": { "variant": "solid", "colorScheme": "primary" },
            "_hover": { "bg": "${colorScheme}.600" }
        }
    }
}"##;

struct Fixture {
    theme: Arc<Theme>,
    registry: PropRegistry,
    options: EngineOptions,
}

impl Fixture {
    fn new() -> Self {
        Self {
            theme: Arc::new(Theme::from_json_str(THEME).unwrap()),
            registry: PropRegistry::standard().unwrap(),
            options: EngineOptions::default(),
        }
    }

    fn ctx(&self, width: Option<f32>) -> ResolveContext<'_> {
        ResolveContext {
            theme: &self.theme,
            registry: &self.registry,
            breakpoint: BreakpointContext::from_width(&self.theme, width),
            options: &self.options,
        }
    }
}

fn render(plan: RenderPlan) -> ResolvedProps {
    plan.into_resolved().expect("expected a render plan")
}

#[test]
fn structurally_equal_props_recompute_once() {
    let fixture = Fixture::new();
    let mut resolver = StyleResolver::new("Button");

    let first = PropBag::new().with("m", 2).with("onPress", "save");
    let second = PropBag::new().with("onPress", "save").with("m", 2);

    let a = render(resolver.resolve(&first, InteractionState::new(), &fixture.ctx(Some(800.0))).unwrap());
    let b = render(resolver.resolve(&second, InteractionState::new(), &fixture.ctx(Some(800.0))).unwrap());

    assert_eq!(resolver.stats().recomputations, 1);
    assert_eq!(resolver.stats().hits, 1);
    assert!(std::rc::Rc::ptr_eq(&a.style, &b.style));
    assert_eq!(a.rest, b.rest);
}

#[test]
fn theme_swap_forces_recompute() {
    let mut fixture = Fixture::new();
    let mut resolver = StyleResolver::new("Button");
    let props = PropBag::new().with("p", 1);

    resolver.resolve(&props, InteractionState::new(), &fixture.ctx(Some(800.0))).unwrap();
    fixture.theme = Arc::new(Theme::from_json_str(THEME).unwrap());
    resolver.resolve(&props, InteractionState::new(), &fixture.ctx(Some(800.0))).unwrap();

    let stats = resolver.stats();
    assert_eq!(stats.recomputations, 2);
    assert_eq!(stats.invalidations, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn state_changes_do_not_reuse_entries() {
    let fixture = Fixture::new();
    let mut resolver = StyleResolver::new("Button");
    let props = PropBag::new();

    let idle = render(resolver.resolve(&props, InteractionState::new(), &fixture.ctx(Some(800.0))).unwrap());
    let hovered = render(
        resolver
            .resolve(&props, InteractionState::new().with(StateKind::Hovered), &fixture.ctx(Some(800.0)))
            .unwrap(),
    );

    assert_eq!(idle.style.style["backgroundColor"], PropValue::from("#06b6d4"));
    assert_eq!(hovered.style.style["backgroundColor"], PropValue::from("#0891b2"));
    assert_eq!(resolver.stats().recomputations, 2);
}

#[test]
fn unmeasured_viewport_skips_then_renders() {
    let fixture = Fixture::new();
    let mut resolver = StyleResolver::new("Box");
    let props = PropBag::new().with("p", PropBag::new().with("base", 1).with("md", 4));

    let pending = resolver.resolve(&props, InteractionState::new(), &fixture.ctx(None)).unwrap();
    assert!(pending.is_skip());
    assert_eq!(resolver.stats().entries, 0);

    let small = render(resolver.resolve(&props, InteractionState::new(), &fixture.ctx(Some(500.0))).unwrap());
    assert_eq!(small.style.style["paddingTop"], PropValue::from(4));

    let wide = render(resolver.resolve(&props, InteractionState::new(), &fixture.ctx(Some(1000.0))).unwrap());
    assert_eq!(wide.style.style["paddingTop"], PropValue::from(16));
}

#[test]
fn select_redistributes_props_to_inner_input() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx(Some(800.0));

    let select_props = PropBag::new()
        .with("borderColor", "primary.600")
        .with("w", "full")
        .with("m", 1)
        .with("placeholder", "Choose a fruit")
        .with("isDisabled", false);

    let (border, remaining) =
        extract_in_categories(&select_props, &[StyleCategory::Border], &["placeholder"], &fixture.registry);
    let (layout, rest) = extract_in_categories(
        &remaining,
        &[StyleCategory::Layout, StyleCategory::Margin],
        &[],
        &fixture.registry,
    );

    let mut input = StyleResolver::new("Input");
    let mut wrapper = StyleResolver::new("Box");
    let input_out = render(input.resolve(&border, InteractionState::new(), &ctx).unwrap());
    let wrapper_out = render(wrapper.resolve(&layout, InteractionState::new(), &ctx).unwrap());

    assert_eq!(input_out.style.style["borderColor"], PropValue::from("#0891b2"));
    assert_eq!(input_out.style.style["borderWidth"], PropValue::from(1));
    assert_eq!(input_out.style.style["borderRadius"], PropValue::from(4));
    assert_eq!(input_out.rest.get("placeholder"), Some(&PropValue::from("Choose a fruit")));
    assert_eq!(input_out.rest.get("placeholderTextColor"), Some(&PropValue::from("muted.400")));
    assert!(!input_out.style.style.contains_key("width"));

    assert_eq!(wrapper_out.style.style["width"], PropValue::from("100%"));
    assert_eq!(wrapper_out.style.style["marginLeft"], PropValue::from(4));
    assert!(!wrapper_out.style.style.contains_key("borderColor"));

    assert_eq!(rest.get("isDisabled"), Some(&PropValue::from(false)));
}

#[test]
fn later_states_win_over_earlier_ones() {
    let fixture = Fixture::new();
    let mut resolver = StyleResolver::new("Input");
    let state = InteractionState::new()
        .with(StateKind::Focused)
        .with(StateKind::Invalid);

    let out = render(resolver.resolve(&PropBag::new(), state, &fixture.ctx(Some(800.0))).unwrap());
    assert_eq!(out.style.style["borderColor"], PropValue::from("#ef4444"));
    assert_eq!(out.style.data_set["data-focus"], true);
    assert_eq!(out.style.data_set["data-invalid"], true);
}

#[test]
fn strict_error_is_not_cached() {
    let mut fixture = Fixture::new();
    fixture.options.strict_mode = StrictMode::Error;
    let mut resolver = StyleResolver::new("Box");
    let props = PropBag::new().with("bg", "#123456");

    let err = resolver
        .resolve(&props, InteractionState::new(), &fixture.ctx(Some(800.0)))
        .unwrap_err();
    assert!(matches!(err, StyleError::Strict { .. }));
    assert_eq!(resolver.stats().entries, 0);

    let tokens = PropBag::new().with("bg", "primary.500").with("p", 0);
    assert!(resolver
        .resolve(&tokens, InteractionState::new(), &fixture.ctx(Some(800.0)))
        .is_ok());
}

#[test]
fn android_shadow_expands_with_elevation() {
    let mut fixture = Fixture::new();
    fixture.options.platform = Platform::Android;
    let props = PropBag::new().with("shadow", 3).with("cursor", "pointer").with("w", "12px");

    let out = render(resolve_once("Box", &props, InteractionState::new(), &fixture.ctx(Some(400.0))).unwrap());
    let style = &out.style.style;

    assert_eq!(style["shadowColor"], PropValue::from("black"));
    assert_eq!(style["shadowOpacity"], PropValue::from(0.25));
    assert_eq!(style["elevation"], PropValue::from(5));
    assert_eq!(style["width"], PropValue::from(12));
    assert!(!style.contains_key("cursor"));
    assert!(!style.contains_key("boxShadow"));
    assert!(out.style.data_set.is_empty());
}

#[test]
fn toml_theme_file_loads() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[breakpoints]
base = 0
md = 768

[space]
2 = 8

[components.Badge.baseStyle]
px = 2
"#
    )
    .unwrap();

    let theme = Theme::load(file.path()).unwrap();
    assert_eq!(theme.breakpoints().len(), 2);

    let registry = PropRegistry::standard().unwrap();
    let (plan, stats) = resolve_props(
        &theme,
        &registry,
        "Badge",
        &PropBag::new(),
        InteractionState::new(),
        Some(1000.0),
        &EngineOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.breakpoint.as_deref(), Some("md"));
    assert_eq!(render(plan).style.style["paddingLeft"], PropValue::from(8));
}
