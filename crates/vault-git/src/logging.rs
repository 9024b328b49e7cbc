//! Log output for applications embedding the vault
//!
//! The library itself only emits `tracing` events: repository opens and
//! transaction lifecycle at `debug`, new repositories at `info`, and failed
//! cleanups at `warn`. This module installs a subscriber for binaries that
//! have none of their own. Enabled by the default `logging` feature.

use std::io::IsTerminal;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "warn,vault_git=info,vault_fs=info";

/// Install a global subscriber printing compact lines to stderr.
///
/// `RUST_LOG` overrides [`DEFAULT_DIRECTIVES`]; for example
/// `RUST_LOG=vault_git=debug,vault_fs=trace` shows every transaction and
/// lock hand-off. Fails if a global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVES))?;
    subscriber(filter, std::io::stderr, std::io::stderr().is_terminal()).try_init()?;
    Ok(())
}

fn subscriber<W>(
    filter: EnvFilter,
    writer: W,
    ansi: bool,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(ansi)
        .compact()
        .with_writer(writer);

    tracing_subscriber::registry().with(filter).with(fmt_layer)
}
