mod config;
mod handlers;

use crate::error::{Result, StyleError};
use crate::types::{InteractionState, Platform, StateKind, StrictMode};
use crate::EngineOptions;
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetPlatform {
    Web,
    Ios,
    Android,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrictLevel {
    Off,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Debug,
}

pub struct StyleCli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Default for StyleCli {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"))?;

        let result = match matches.subcommand() {
            Some(("resolve", sub_matches)) => handlers::handle_resolve_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(sub_matches),
            Some(("props", sub_matches)) => handlers::handle_props_command(sub_matches),
            Some(("benchmark", sub_matches)) => handlers::handle_benchmark_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        };

        log::debug!("Finished in {}ms", self.start_time.elapsed().as_millis());
        result
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("Propstyle Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("resolve")
                    .about("Resolve a props file against a theme")
                    .arg(Arg::new("props").help("Props file (.json or .toml)").required(true).index(1))
                    .arg(Arg::new("theme").short('t').long("theme").value_name("FILE").help("Theme file (.json or .toml)"))
                    .arg(Arg::new("component").short('C').long("component").value_name("NAME").help("Component theme to apply").default_value("Box"))
                    .arg(Arg::new("width").short('W').long("width").value_name("PX").help("Viewport width; omit to model an unmeasured viewport").value_parser(clap::value_parser!(f32)))
                    .arg(Arg::new("state").short('s').long("state").value_name("STATE").help("Active interaction state (hover, pressed, focus, ...)").action(ArgAction::Append))
                    .arg(Arg::new("platform").short('p').long("platform").value_parser(clap::value_parser!(TargetPlatform)).help("Target platform"))
                    .arg(Arg::new("strict").long("strict").value_parser(clap::value_parser!(StrictLevel)).help("Strict token mode"))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("json").help("Output format"))
                    .arg(Arg::new("debug").short('d').long("debug").help("Log each resolution step").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Show resolution statistics").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch the props and theme files and resolve again on change").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Validate theme files")
                    .arg(Arg::new("input").help("Theme file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check every theme file in the directory recursively").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("props")
                    .about("List the registered style props")
                    .arg(Arg::new("category").value_name("CATEGORY").help("Only list one category (space, color, layout, ...)").index(1)),
            )
            .subcommand(
                Command::new("benchmark")
                    .about("Time cached and uncached resolution of a props file")
                    .arg(Arg::new("props").help("Props file (.json or .toml)").required(true).index(1))
                    .arg(Arg::new("theme").short('t').long("theme").value_name("FILE").help("Theme file (.json or .toml)"))
                    .arg(Arg::new("component").short('C').long("component").value_name("NAME").default_value("Box").help("Component theme to apply"))
                    .arg(Arg::new("width").short('W').long("width").value_name("PX").help("Viewport width").value_parser(clap::value_parser!(f32)))
                    .arg(Arg::new("iterations").short('n').long("iterations").value_name("N").help("Number of benchmark iterations").default_value("1000")),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Command-line flags win over the config file, which wins over defaults.
    pub fn build_engine_options(&self, matches: &clap::ArgMatches) -> Result<EngineOptions> {
        let mut options = EngineOptions::default();

        if let Some(name) = &self.config.platform {
            options.platform = Platform::from_name(name).ok_or_else(|| {
                StyleError::invalid_format(format!("Unknown platform in config: {}", name))
            })?;
        }
        if let Some(platform) = matches.get_one::<TargetPlatform>("platform") {
            options.platform = match platform {
                TargetPlatform::Web => Platform::Web,
                TargetPlatform::Ios => Platform::Ios,
                TargetPlatform::Android => Platform::Android,
            };
        }

        if let Some(strict_mode) = self.config.strict_mode {
            options.strict_mode = strict_mode;
        }
        if let Some(level) = matches.get_one::<StrictLevel>("strict") {
            options.strict_mode = match level {
                StrictLevel::Off => StrictMode::Off,
                StrictLevel::Warn => StrictMode::Warn,
                StrictLevel::Error => StrictMode::Error,
            };
        }

        options.debug = matches.get_flag("debug") || self.config.debug.unwrap_or(false);
        Ok(options)
    }

    pub fn theme_path(&self, matches: &clap::ArgMatches) -> Option<String> {
        matches
            .get_one::<String>("theme")
            .cloned()
            .or_else(|| self.config.theme.clone())
    }

    pub fn viewport_width(&self, matches: &clap::ArgMatches) -> Option<f32> {
        matches
            .get_one::<f32>("width")
            .copied()
            .or(self.config.viewport_width)
    }
}

/// Parse `--state` values into an interaction state.
pub fn parse_states<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<InteractionState> {
    let mut state = InteractionState::new();
    for name in names {
        for part in name.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let kind = StateKind::from_short_name(part).ok_or_else(|| {
                StyleError::invalid_format(format!("Unknown interaction state: {}", part))
            })?;
            state.set(kind, true);
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_states() {
        let state = parse_states(["hover,focus-visible", "disabled"]).unwrap();
        assert!(state.is_hovered);
        assert!(state.is_focus_visible);
        assert!(state.is_disabled);
        assert!(!state.is_pressed);
    }

    #[test]
    fn test_parse_states_rejects_unknown() {
        assert!(parse_states(["wiggle"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        StyleCli::new().build_cli().debug_assert();
    }
}
