use clap::Parser;
use kuri::cli::{init_tracing, run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level().as_deref());
    run(cli)
}
