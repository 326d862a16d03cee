use std::process::ExitCode;

use bm_bench::{run, Cli, RunConfig, DEFAULT_LOG_FILTER};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> bm_bench::Result<()> {
    let config = RunConfig::resolve(cli)?;

    let report = run(&config, |rep| {
        if config.print {
            print!("{}{}{}", rep.a, rep.b, rep.c);
        }
        println!("repetition {} ({:.6}s)", rep.number, rep.seconds);
    })?;

    println!(
        "Completed {} matrix multiplications. Results are in {}",
        report.timings.len(),
        config.log_file.display()
    );
    if let Some(mean) = report.mean_seconds() {
        println!("mean {:.6}s per multiplication", mean);
    }
    Ok(())
}
