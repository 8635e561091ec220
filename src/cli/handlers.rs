// FILE: src/cli/handlers.rs
use crate::{
    cli::OutputFormat,
    load_props, resolve_once, resolve_props, BreakpointContext, EngineOptions, PropRegistry,
    RenderPlan, ResolutionStats, ResolveContext, Result, StyleCategory, StyleError, StyleResolver,
    Theme,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::json;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Instant;

// --- RESOLVE ---
pub fn handle_resolve_command(cli: &super::StyleCli, matches: &clap::ArgMatches) -> Result<()> {
    let props_path = required_arg(matches, "props")?;
    let theme_path = cli.theme_path(matches);
    let component = required_arg(matches, "component")?;
    let options = cli.build_engine_options(matches)?;
    let width = cli.viewport_width(matches);
    let state = super::parse_states(
        matches
            .get_many::<String>("state")
            .into_iter()
            .flatten()
            .map(String::as_str),
    )?;
    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(OutputFormat::Json);

    if matches.get_flag("watch") {
        return watch_and_resolve(props_path, theme_path.as_deref(), component, width, state, &options, format);
    }

    let theme = load_theme(theme_path.as_deref())?;
    let raw = load_props(props_path)?;
    let registry = PropRegistry::standard()?;
    let (plan, stats) = resolve_props(&theme, &registry, component, &raw, state, width, &options)?;

    print_plan(&plan, format)?;
    if matches.get_flag("stats") {
        print_detailed_stats(&stats);
    }
    Ok(())
}

/// Keep one resolver alive across edits so unchanged inputs hit its cache.
fn watch_and_resolve(
    props_path: &str,
    theme_path: Option<&str>,
    component: &str,
    width: Option<f32>,
    state: crate::InteractionState,
    options: &EngineOptions,
    format: OutputFormat,
) -> Result<()> {
    println!("👀 Watching {} for changes...", props_path);

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| StyleError::Watch {
        message: format!("Failed to create file watcher: {}", e),
    })?;

    for path in std::iter::once(props_path).chain(theme_path) {
        watcher
            .watch(Path::new(path), RecursiveMode::NonRecursive)
            .map_err(|e| StyleError::Watch {
                message: format!("Failed to watch {}: {}", path, e),
            })?;
    }

    let registry = PropRegistry::standard()?;
    let mut resolver = StyleResolver::new(component);
    let mut theme = load_theme(theme_path)?;

    let run = |theme: &Theme, resolver: &mut StyleResolver| -> Result<()> {
        let raw = load_props(props_path)?;
        let ctx = ResolveContext {
            theme,
            registry: &registry,
            breakpoint: BreakpointContext::from_width(theme, width),
            options,
        };
        let plan = resolver.resolve(&raw, state, &ctx)?;
        print_plan(&plan, format)?;
        let stats = resolver.stats();
        log::info!(
            "{} hits, {} recomputations, {} invalidations",
            stats.hits,
            stats.recomputations,
            stats.invalidations
        );
        Ok(())
    };

    if let Err(e) = run(&theme, &mut resolver) {
        eprintln!("❌ Initial resolution failed: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                let theme_changed = theme_path.map_or(false, |theme_path| {
                    event.paths.iter().any(|p| p.ends_with(Path::new(theme_path).file_name().unwrap_or_default()))
                });
                if theme_changed {
                    println!("🔄 Theme changed, reloading...");
                    match load_theme(theme_path) {
                        Ok(reloaded) => theme = reloaded,
                        Err(e) => {
                            eprintln!("❌ Theme reload failed: {}", e);
                            continue;
                        }
                    }
                } else {
                    println!("🔄 Props changed, resolving...");
                }

                if let Err(e) = run(&theme, &mut resolver) {
                    eprintln!("❌ Resolution failed: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required_arg(matches, "input")?;
    let recursive = matches.get_flag("recursive");

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(input_path)
    } else {
        check_single_file(Path::new(input_path))
    }
}

fn check_single_file(input_path: &Path) -> Result<()> {
    println!("🔍 Checking {}", input_path.display());
    match Theme::load(input_path) {
        Ok(theme) => {
            println!(
                "✅ {} - {} breakpoints, {} components",
                input_path.display(),
                theme.breakpoints().len(),
                theme.component_names().count()
            );
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", input_path.display(), e);
            Err(e)
        }
    }
}

fn check_directory_recursive(dir_path: &str) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            StyleError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_theme = matches!(
            entry.path().extension().and_then(|ext| ext.to_str()),
            Some("json") | Some("toml")
        );
        if is_theme {
            total_files += 1;
            if check_single_file(entry.path()).is_err() {
                error_files += 1;
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(StyleError::theme(dir_path, format!("{} files have errors", error_files)))
    } else {
        Ok(())
    }
}

// --- PROPS ---
pub fn handle_props_command(matches: &clap::ArgMatches) -> Result<()> {
    let registry = PropRegistry::standard()?;

    let categories: Vec<StyleCategory> = match matches.get_one::<String>("category") {
        Some(name) => vec![StyleCategory::from_name(name).ok_or_else(|| {
            StyleError::invalid_format(format!("Unknown style category: {}", name))
        })?],
        None => StyleCategory::ALL.to_vec(),
    };

    for category in categories {
        let names = registry.props_in(category);
        println!("{:?} ({})", category, names.len());
        for name in names {
            let targets = registry.get(name).map(|prop| prop.targets.join(", ")).unwrap_or_default();
            if targets.is_empty() {
                println!("   {}", name);
            } else {
                println!("   {} -> {}", name, targets);
            }
        }
    }
    Ok(())
}

// --- BENCHMARK ---
pub fn handle_benchmark_command(cli: &super::StyleCli, matches: &clap::ArgMatches) -> Result<()> {
    let props_path = required_arg(matches, "props")?;
    let component = required_arg(matches, "component")?;
    let iterations: usize = required_arg(matches, "iterations")?
        .parse()
        .map_err(|_| StyleError::invalid_format("Invalid iterations number"))?;

    let theme = load_theme(cli.theme_path(matches).as_deref())?;
    let raw = load_props(props_path)?;
    let options = EngineOptions::default();
    let registry = PropRegistry::standard()?;
    let ctx = ResolveContext {
        theme: &theme,
        registry: &registry,
        breakpoint: BreakpointContext::from_width(&theme, cli.viewport_width(matches)),
        options: &options,
    };
    let state = crate::InteractionState::new();

    println!("🏁 Running resolution benchmarks");
    println!("   Props: {}", props_path);
    println!("   Iterations: {}", iterations);

    let start = Instant::now();
    for _ in 0..iterations {
        resolve_once(component, &raw, state, &ctx)?;
    }
    let uncached = start.elapsed();

    let mut resolver = StyleResolver::new(component);
    let start = Instant::now();
    for _ in 0..iterations {
        resolver.resolve(&raw, state, &ctx)?;
    }
    let cached = start.elapsed();

    let per_iteration = |total: std::time::Duration| total.as_nanos() as f64 / iterations.max(1) as f64 / 1000.0;

    println!("\n📊 Benchmark Results:");
    println!("   Uncached: {:.2}µs per resolution", per_iteration(uncached));
    println!("   Cached:   {:.2}µs per resolution", per_iteration(cached));
    println!("   Recomputations: {}", resolver.stats().recomputations);
    Ok(())
}

// --- HELPERS ---
fn required_arg<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| StyleError::invalid_format(format!("Missing argument: {}", name)))
}

fn load_theme(path: Option<&str>) -> Result<Theme> {
    match path {
        Some(path) => Theme::load(path),
        None => {
            log::info!("No theme given, resolving against an empty theme");
            Ok(Theme::empty())
        }
    }
}

fn plan_to_json(plan: &RenderPlan) -> Result<serde_json::Value> {
    Ok(match plan {
        RenderPlan::Render(props) => json!({
            "style": serde_json::to_value(props.style.as_ref())?,
            "rest": serde_json::Value::from(crate::PropValue::from(props.rest.clone())),
        }),
        RenderPlan::Skip => json!({ "skip": true }),
    })
}

fn print_plan(plan: &RenderPlan, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan_to_json(plan)?)?),
        OutputFormat::Debug => println!("{:#?}", plan),
    }
    Ok(())
}

fn print_detailed_stats(stats: &ResolutionStats) {
    println!("\n📊 Resolution Statistics:");
    println!("   Breakpoint: {}", stats.breakpoint.as_deref().unwrap_or("pending"));
    println!("   Styling props: {}", stats.styling_prop_count);
    println!("   Passthrough props: {}", stats.rest_prop_count);
    println!("   Style keys: {}", stats.style_key_count);
    println!("   Skipped: {}", stats.skipped);
    println!("   Resolve time: {}µs", stats.resolve_time_us);
}
