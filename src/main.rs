use anyhow::Result;
use clap::Parser;
use ctf2prv::{arg_types::ArgTypes, cli::Cli, convert::Outputs, json_source::JsonTraceSource};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for diagnostic output
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut source = JsonTraceSource::open_tree(&cli.trace)?;
    let mut outputs = Outputs::create(&cli.output)?;
    let summary = ctf2prv::convert::run(&mut source, &ArgTypes::with_defaults(), &mut outputs)?;

    tracing::info!(
        records = summary.records,
        output = %cli.output,
        "wrote .prv/.pcf/.row"
    );
    Ok(())
}
