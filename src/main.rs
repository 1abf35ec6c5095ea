use clap::Parser;
use log::{debug, info};
use snafu::ErrorCompat;

mod args;
mod dash;

fn main() {
    let args = args::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("main: args: {:?}", args);

    if let Err(e) = dash::run_dashboard(&args) {
        if e.is_data_unavailable() {
            eprintln!("No dashboard without data: {}", e);
        } else if e.is_schema_error() {
            eprintln!("The data file does not have the expected format: {}", e);
        } else {
            eprintln!("An error occured: {}", e);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
    info!("Done");
}
