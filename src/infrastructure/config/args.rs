use super::app_config::{BackendChoice, LogLevel};
use crate::domain::entities::StoreStrategy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mediacache",
    version,
    about = "Fetch, transform and cache images and videos",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Cache backend.
    #[arg(long, value_enum)]
    pub backend: Option<BackendChoice>,

    /// Save directory for the disk backend.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of cached entries.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Payload stored after a successful request.
    #[arg(long, value_enum)]
    pub store_strategy: Option<StrategyChoice>,

    /// Do not rebuild the index from the save directory on startup.
    #[arg(long)]
    pub no_scan: bool,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch resources through the cache.
    Fetch(FetchArgs),
    /// List cached entries, oldest first.
    List,
    /// Remove the entries cached for the given locators.
    Remove {
        /// Source locators.
        #[arg(required = true)]
        locators: Vec<String>,
    },
    /// Empty the cache.
    Clear {
        /// Also delete persisted files.
        #[arg(long)]
        purge: bool,
    },
}

/// Arguments of the `fetch` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FetchArgs {
    /// Source locators (http, https or file URLs, or local paths).
    #[arg(required = true)]
    pub locators: Vec<String>,

    /// Skip the cache lookup and always fetch.
    #[arg(long)]
    pub overwrite: bool,

    /// Extra request header, `Name: value`.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Resize to exactly `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_dimensions)]
    pub resize: Option<(u32, u32)>,

    /// Fit within `WIDTHxHEIGHT`, keeping the aspect ratio.
    #[arg(long, value_parser = parse_dimensions)]
    pub fit: Option<(u32, u32)>,

    /// Crop a centered `WIDTHxHEIGHT` region.
    #[arg(long, value_parser = parse_dimensions)]
    pub crop: Option<(u32, u32)>,

    /// Rotate clockwise by 90, 180 or 270 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub rotate: Option<i32>,

    /// Mirror along an axis.
    #[arg(long, value_enum)]
    pub flip: Option<FlipAxis>,

    /// Convert to grayscale.
    #[arg(long)]
    pub grayscale: bool,

    /// Gaussian blur sigma.
    #[arg(long)]
    pub blur: Option<f32>,

    /// Brightness offset.
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<i32>,

    /// Contrast adjustment.
    #[arg(long, allow_hyphen_values = true)]
    pub contrast: Option<f32>,

    /// Directory the output of every successful request is written to.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlipAxis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// Command-line form of [`StoreStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    /// Persist the bytes as fetched.
    Original,
    /// Persist the transformed output.
    Transformed,
}

impl From<StrategyChoice> for StoreStrategy {
    fn from(choice: StrategyChoice) -> Self {
        match choice {
            StrategyChoice::Original => Self::Original,
            StrategyChoice::Transformed => Self::Transformed,
        }
    }
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let width = width
        .trim()
        .parse()
        .map_err(|e| format!("invalid width: {e}"))?;
    let height = height
        .trim()
        .parse()
        .map_err(|e| format!("invalid height: {e}"))?;
    Ok((width, height))
}

fn parse_header(value: &str) -> Result<(String, String), String> {
    let (name, header_value) = value
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{value}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), header_value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("640x480", Ok((640, 480)) ; "lowercase")]
    #[test_case("10X2", Ok((10, 2)) ; "uppercase")]
    #[test_case("640", Err(()) ; "missing_height")]
    #[test_case("ax2", Err(()) ; "not_a_number")]
    fn test_parse_dimensions(value: &str, expected: Result<(u32, u32), ()>) {
        assert_eq!(parse_dimensions(value).map_err(|_| ()), expected);
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Authorization: Bearer a:b"),
            Ok(("Authorization".to_string(), "Bearer a:b".to_string()))
        );
        assert!(parse_header("no separator").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_parse_fetch_command() {
        let args = CliArgs::parse_from([
            "mediacache",
            "fetch",
            "https://example.com/a.png",
            "--rotate",
            "-90",
            "--fit",
            "100x100",
            "-H",
            "Accept: image/*",
            "--grayscale",
        ]);

        let Command::Fetch(fetch) = args.command else {
            panic!("expected fetch command");
        };
        assert_eq!(fetch.locators, ["https://example.com/a.png"]);
        assert_eq!(fetch.rotate, Some(-90));
        assert_eq!(fetch.fit, Some((100, 100)));
        assert_eq!(fetch.headers.len(), 1);
        assert!(fetch.grayscale);
    }

    #[test_case("original", StoreStrategy::Original ; "original")]
    #[test_case("transformed", StoreStrategy::Transformed ; "transformed")]
    fn test_parse_store_strategy(value: &str, expected: StoreStrategy) {
        let args = CliArgs::parse_from(["mediacache", "--store-strategy", value, "list"]);
        assert_eq!(args.store_strategy.map(StoreStrategy::from), Some(expected));
    }

    #[test]
    fn test_unknown_store_strategy_is_rejected() {
        let result = CliArgs::try_parse_from(["mediacache", "--store-strategy", "both", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clear_defaults_to_forget() {
        let args = CliArgs::parse_from(["mediacache", "clear"]);
        assert!(matches!(args.command, Command::Clear { purge: false }));
    }
}
