//! cmdspec CLI entry point

fn main() {
    let config = cmdspec::cli::parse_config();

    // Structured logging on stderr, filtered by RUST_LOG or the run mode
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter())),
        )
        .try_init();

    cmdspec::cli::run(&config);
}
