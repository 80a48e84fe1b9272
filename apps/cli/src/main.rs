mod cli;
mod config;
mod main_lib;

use config::Config;
use main_lib::{build_report, init_tracing, load_args_and_config, render};

fn main() -> anyhow::Result<()> {
    let (args, config) = match load_args_and_config(std::env::args_os(), Config::from_env) {
        Ok(loaded) => loaded,
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(usage) => usage.exit(),
            Err(err) => return Err(err),
        },
    };
    init_tracing(&config.log_format);

    let report = build_report(&args, &config)?;
    println!("{}", render(&report, args.pretty)?);
    Ok(())
}
