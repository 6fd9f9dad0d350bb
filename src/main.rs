// CLI binary entry point for chunkscope

mod cli;

use clap::Parser;

use cli::Config;

fn init_logging(config: &Config) {
    let default_level = if config.quiet {
        "error"
    } else if config.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config);

    cli::commands::run(&config)?;
    Ok(())
}
