use clap::{Parser, Subcommand};
use contentpress::config::{self, Config};
use contentpress::output;
use contentpress::pipeline::Pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contentpress")]
#[command(about = "Static site build step for Contentful entries")]
#[command(long_about = "\
Static site build step for Contentful entries

Entries are fetched from the Contentful Content Delivery API when the config
has a [contentful] table, or read from local files otherwise. Each entry
becomes a page; listings aggregate entries of one or more content types.

Project structure:

  contentpress.toml               # Build config
  src/                            # Source tree, copied to the output
  ├── index.md                    # Markdown → index.html
  └── post/                       # Local entries of content type 'post'
      └── rabbit.md               # Front matter 'contentful: {id, fields}'
  templates/
  ├── base.html                   # Layout: wraps {{ contents }}
  ├── post.html                   # Entry template for 'post'
  └── posts.html                  # Listing template, iterates {{ entries }}

The access token may be given as CONTENTFUL_ACCESS_TOKEN instead of in the
config file. Log verbosity follows RUST_LOG (default: info).

Run 'contentpress gen-config' to print a documented contentpress.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch entries, render, and write the output directory
    Build,
    /// Run every stage except writing, and list the planned files
    Check,
    /// Print a stock contentpress.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build => {
            let config = Config::load(&cli.config)?;
            println!("==> Building {} → {}", config.src.display(), config.dest.display());
            let report = Pipeline::new(config).build().await?;
            output::print_build_output(&report);
        }
        Command::Check => {
            let config = Config::load(&cli.config)?;
            println!("==> Checking {}", cli.config.display());
            let pipeline = Pipeline::new(config);
            pipeline.check()?;
            output::print_check_output(pipeline.config());
            let staged = pipeline.run().await?;
            println!();
            output::print_planned_files(&staged.files);
            println!("==> Build would write {} files", staged.files.len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
