use clap::{Parser, Subcommand};
use podcast_site::config::{self, BuildConfig};
use podcast_site::fetch::Fetcher;
use podcast_site::{generate, output};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let hash = env!("BUILD_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "podcast-site")]
#[command(about = "Static site generator for a podcast RSS feed")]
#[command(long_about = "\
Static site generator for a podcast RSS feed

The feed is the data source. Each episode gets its own page, the home page
shows the latest episode and a grid of recent ones, and the episode list is
searchable in the browser.

Output structure:

  site/
  ├── index.html          # Latest episode + recent grid
  ├── episodes.html       # All episodes, with search
  ├── about.html          # Show description or configured markdown
  ├── artwork.jpg         # Show artwork (downloaded once)
  └── episodes/
      └── 42.html         # One page per episode

Run 'podcast-site gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory (overrides output_root)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Read the feed from a local file instead of fetching feed_url
    #[arg(long, value_name = "FEED.xml", global = true)]
    local: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the feed and write the site (default)
    Build,
    /// Fetch and parse the feed without writing anything
    Check {
        /// Print the parsed feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match init_logging(cli.verbose) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(
    verbose: bool,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    let level = if verbose { "debug" } else { "info" };
    flexi_logger::Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .start()
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command.as_ref().unwrap_or(&Command::Build) {
        Command::Build => {
            let (build, fetcher) = prepare(&cli)?;
            let report = generate::build_site(&build, &fetcher)?;
            output::print_build_output(&report);
        }
        Command::Check { json } => {
            let (build, fetcher) = prepare(&cli)?;
            let feed = generate::check_feed(&build, &fetcher)?;
            if *json {
                println!("{}", output::format_check_json(&feed)?);
            } else {
                output::print_check_output(&feed);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config and apply command-line overrides.
fn prepare(cli: &Cli) -> Result<(BuildConfig, Fetcher), config::ConfigError> {
    let site = config::load_config(&cli.config)?;
    let fetcher = Fetcher::from_config(&site.fetch);
    let build = BuildConfig::resolve(site, cli.local.clone(), cli.output.clone());
    Ok((build, fetcher))
}
