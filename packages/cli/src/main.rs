use std::path::PathBuf;

use assetfs_cli::{Command, Options};
use clap::{ArgAction, Parser};

/// assetfs - browse bundled assets as a document tree
#[derive(Parser, Debug)]
#[command(name = "assetfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the assets
    #[arg(long, short = 'a')]
    assets: PathBuf,

    /// Preferences file for recents [default: <data dir>/assetfs/prefs.json]
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Config file [default: <config dir>/assetfs/config.toml]
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print JSON rows instead of a table
    #[arg(long)]
    json: bool,

    /// More logging; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = Options {
        assets: args.assets,
        prefs: args.prefs,
        config: args.config,
        json: args.json,
    };

    match assetfs_cli::run(&options, args.command).await {
        Ok(text) if text.is_empty() => {}
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
