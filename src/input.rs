//! Provides a means to read, parse and hold configuration options for scans.
use crate::candidates::UNIVERSITY_DATASET_URL;
use clap::{Parser, ValueEnum};
use serde_derive::Deserialize;
use std::fs;
use std::path::PathBuf;

/// How many ranked results are shown when nothing else is asked for.
pub const DEFAULT_LIMIT: usize = 10;

/// Represents how the final ranking is printed.
///   - Table prints aligned columns with a header row.
///   - Greppable prints `domain,latency_ms,server` lines and nothing else.
///   - Json prints one JSON document with the report and its counters.
#[derive(Deserialize, Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned columns for a terminal.
    Table,
    /// Comma-separated lines.
    Greppable,
    /// A single JSON document.
    Json,
}

fn parse_region(input: &str) -> Result<String, String> {
    let region = input.trim();
    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(region.to_ascii_uppercase())
    } else {
        Err(format!(
            "Invalid region '{input}'. Expected a two-letter country code such as US or DE."
        ))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "originscan",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
/// Finds university web servers in your region that answer directly instead
/// of through a CDN, and ranks them by latency.
/// WARNING Every candidate receives up to two HEAD requests; only scan hosts
/// you are allowed to probe.
pub struct Opts {
    /// Number of results to display.
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Two-letter region code to scan. Skips automatic location detection.
    #[arg(short, long, value_parser = parse_region)]
    pub region: Option<String>,

    /// URL or local path of the university JSON dataset.
    #[arg(short, long, default_value = UNIVERSITY_DATASET_URL)]
    pub dataset: String,

    /// How the ranked results are printed.
    #[arg(short, long, value_enum, ignore_case = true, default_value = "table")]
    pub format: OutputFormat,

    /// Whether to ignore the configuration file or not.
    #[arg(long)]
    pub no_config: bool,

    /// Hide the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Custom path to config file
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,
}

#[cfg(not(tarpaulin_include))]
impl Opts {
    /// Parses the process arguments.
    pub fn read() -> Self {
        Self::parse()
    }

    /// Machine-readable formats keep stdout free of status lines.
    pub fn quiet(&self) -> bool {
        self.format != OutputFormat::Table
    }

    /// Reads the command line arguments into an Opts struct and merge
    /// values found within the user configuration file.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_required(config);
            self.merge_optional(config);
        }
    }

    fn merge_required(&mut self, config: &Config) {
        macro_rules! merge_required {
            ($($field: ident),+) => {
                $(
                    if let Some(e) = &config.$field {
                        self.$field = e.clone();
                    }
                )+
            }
        }

        merge_required!(limit, dataset, format, accessible);
    }

    fn merge_optional(&mut self, config: &Config) {
        // A region given on the command line wins over the config file.
        if self.region.is_none() {
            self.region.clone_from(&config.region);
        }
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            region: None,
            dataset: UNIVERSITY_DATASET_URL.to_owned(),
            format: OutputFormat::Table,
            no_config: true,
            no_banner: false,
            config_path: None,
            accessible: false,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[cfg(not(tarpaulin_include))]
#[derive(Debug, Deserialize)]
pub struct Config {
    limit: Option<usize>,
    region: Option<String>,
    dataset: Option<String>,
    format: Option<OutputFormat>,
    accessible: Option<bool>,
}

#[cfg(not(tarpaulin_include))]
impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct.
    ///
    /// # Format
    ///
    /// limit = 25
    /// region = "DE"
    /// dataset = "/srv/data/world_universities_and_domains.json"
    /// format = "Json"
    /// accessible = false
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Result<Self, String> {
        let config_path = custom_config_path.or_else(default_config_path);
        let content = config_path
            .filter(|path| path.exists())
            .and_then(|path| fs::read_to_string(path).ok())
            .unwrap_or_default();

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, String> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| format!("Found {e} in configuration file."))?;
        config.region = config
            .region
            .as_deref()
            .map(parse_region)
            .transpose()
            .map_err(|e| format!("Found {e} in configuration file."))?;
        Ok(config)
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> Option<PathBuf> {
    let mut config_path = dirs::home_dir()?;
    config_path.push(".originscan.toml");
    Some(config_path)
}
