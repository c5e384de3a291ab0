use aplos::pipeline::{BuildOptions, BuildOutcome, BuildReport};
use aplos::{config, matcher, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `APLOS_LOG=aplos=debug`.
const LOG_ENV: &str = "APLOS_LOG";

#[derive(Parser)]
#[command(name = "aplos")]
#[command(about = "File-system page router generator for React applications")]
#[command(long_about = "\
File-system page router generator for React applications

Your pages directory is the routing table. Files become routes, [param]
segments become dynamic parameters, and _layout files wrap every page
beneath them.

Project structure:

  my-app/
  ├── aplos.toml                   # Config (optional)
  └── src/pages/
      ├── _app.tsx                 # Application wrapper (optional)
      ├── _layout.tsx              # Root layout → RootLayout
      ├── _components/             # Reserved: never routed
      ├── index.tsx                # /
      ├── about.tsx                # /about
      └── blog/
          ├── _layout.tsx          # Wraps /blog/* → BlogLayout
          ├── index.tsx            # /blog
          └── [id].tsx             # /blog/:id

Outputs are written to .aplos/cache/: router.json, app.js and config.json.

Run 'aplos gen-config' to generate a documented aplos.toml.")]
#[command(version)]
struct Cli {
    /// Project root containing aplos.toml and the pages directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Log debug output to stderr (overridden by APLOS_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that write outputs.
#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Rewrite every output even if unchanged
    #[arg(long)]
    force: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate router.json, app.js and config.json
    Build(BuildArgs),
    /// Build, then print the route table
    Routes,
    /// Build, then show which route serves a URL
    Match {
        /// URL path to match, e.g. /blog/42
        url: String,
    },
    /// Print a stock aplos.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => {
            let options = BuildOptions { force: args.force };
            if let Some(report) = run_build(&cli.project, options)? {
                output::print_build_output(&report, &cli.project);
            }
        }
        Command::Routes => {
            if let Some(report) = run_build(&cli.project, BuildOptions::default())? {
                output::print_route_table(&report.routes.table);
            }
        }
        Command::Match { url } => {
            let Some(report) = run_build(&cli.project, BuildOptions::default())? else {
                return Ok(ExitCode::FAILURE);
            };
            let table = &report.routes.table;
            let found = matcher::match_url(table, &url);
            output::print_match(&url, found.as_ref(), table);
            if found.is_none() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load the config and build. Prints the diagnostic and returns `None` when
/// the project has no pages directory.
fn run_build(
    project: &Path,
    options: BuildOptions,
) -> Result<Option<BuildReport>, Box<dyn std::error::Error>> {
    let config = config::load_config(project)?;
    match pipeline::build(&config, project, options)? {
        BuildOutcome::Built(report) => Ok(Some(report)),
        BuildOutcome::NoPagesDirectory(path) => {
            output::print_missing_pages(&path);
            Ok(None)
        }
    }
}

/// Install the stderr log subscriber. `APLOS_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
