use anyhow::{Context, Result};
use clap::Parser;
use s8df::config::{Args, Config};
use s8df::converter::Converter;
use s8df::data::tree::open_event_source;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt().with_max_level(args.log_level).with_target(false).init();

    let config = Config::from_args(&args)?;
    config.log_summary();

    let mut source = open_event_source(&config.input)
        .with_context(|| format!("failed to open input {}", config.input.display()))?;

    let mut converter = Converter::new(config);
    converter.run(source.as_mut()).context("conversion failed")?;

    Ok(())
}
