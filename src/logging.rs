//! Logging setup for the command line binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for this crate
/// when `verbose` is on. Output goes to stderr so stdout stays pure JSON.
/// `log` records are forwarded to the same subscriber.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,prodsearch=debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let console_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    // a second init (tests, embedding the library) is not an error
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
