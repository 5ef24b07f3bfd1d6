//! Command dispatch logic for css-distill

use super::{ExtractArgs, InitArgs, ValidateArgs, extract, init_config, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "css-distill", author, version, long_about = None, display_name = "css-distill")]
#[command(about = "Distill a website's styles into design tokens")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and write its design tokens
    Extract(Box<ExtractArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        Command::Extract(extract_args) => extract(host, extract_args).await,
        Command::Init(init_args) => init_config(host, init_args),
        Command::Validate(validate_args) => validate_config(host, validate_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::parse_from([
            "css-distill",
            "extract",
            "https://site.test/",
            "--max-pages",
            "5",
            "--concurrency",
            "2",
            "--ignore-cached",
            "--quiet",
            "--color",
            "never",
            "-o",
            "out",
        ]);

        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.url.as_deref(), Some("https://site.test/"));
        assert_eq!(args.max_pages, Some(5));
        assert_eq!(args.concurrency, Some(2));
        assert!(args.ignore_cached);
        assert!(args.quiet);
        assert_eq!(args.output_dir, "out");
    }

    #[test]
    fn test_url_optional_with_recording() {
        assert!(Cli::try_parse_from(["css-distill", "extract"]).is_err());
        assert!(Cli::try_parse_from(["css-distill", "extract", "--recording", "rec.json"]).is_ok());
    }
}
