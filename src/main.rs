use clap::Parser;

use pmt_monitor::cli::Cli;
use pmt_monitor::discovery::FamilyRegistry;

/// Entry point for the PMT Monitor telemetry tool.
///
/// Lists PMT telemetry endpoints, polls single counters, dumps whole
/// endpoints and reads raw bit fields.
///
/// # Errors
///
/// Returns an error if the requested device or counter cannot be found or the
/// telemetry region cannot be mapped.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run -- read telem0 "PKG::energy"
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    pmt_monitor::run(cli, &FamilyRegistry::builtin()).await
}
