use clap::Parser;
use env_logger::Env;

use gbt::cli::{Cli, CommandPlan};
use gbt::styling::{ERROR, eprintln};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let plan = match CommandPlan::from_words(&cli.words) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{ERROR}{e}{ERROR:#}");
            std::process::exit(1);
        }
    };
    log::debug!("Running {plan:?}");

    if let Err(e) = gbt::commands::run(plan, cli.config.as_deref()) {
        eprintln!("{ERROR}error:{ERROR:#} {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or everything gbt does with `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "gbt=debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
