// SPDX-License-Identifier: MIT OR Apache-2.0
//! `castline` - headless broadcast timeline editor
//!
//! Opens a timeline document, optionally replays a recorded script of
//! pointer and keyboard events through the editing engine, and writes the
//! edited document (or the final read model) back out.
//!
//! ## Architecture
//!
//! All editing happens in `castline_timeline`; this binary only wires files
//! and logging around a single `TimelineEditor`.

mod cli;
mod error;
mod session;

use clap::Parser;
use cli::Options;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "castline_timeline=info,castline_app=info";

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so stdout carries only the document
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Castline v{}", env!("CARGO_PKG_VERSION"));

    let options = Options::parse();

    match session::run(&options) {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Session failed: {e}");
            std::process::exit(1);
        }
    }
}
