use std::env;
use std::io;
use std::process::ExitCode;

use agentctl::{parse_args, run, usage_text, Invocation};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match parse_args(&args)? {
        Invocation::Help => {
            println!("{}", usage_text());
            Ok(())
        }
        Invocation::Run { kind, options } => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            run(kind, options, &mut lock)
        }
    }
}

// Library logs go to stderr so piped output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}
