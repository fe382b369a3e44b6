//! Application entry point for the 3D SCA tree viewer.
//!
//! This binary sets up logging and eframe/egui, then delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer`
//! module.

mod viewer;

use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging is routed through `tracing` with the usual `RUST_LOG`
/// environment filter, so growth iterations from `grow-core` can be
/// observed with e.g. `RUST_LOG=grow_core=debug`.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "3D SCA Tree",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()))),
    )
}
