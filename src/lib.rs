//! Entry-point shim for a GDExtension host.
//!
//! The host loads this library and calls `gdshim_library_init`. That call is
//! forwarded to whichever function was handed to [`register_entry_point`]
//! (or the C-side `gdshim_define_entry_point`) after the library was loaded.
//! The crate also exports a few numeric coercions with native C semantics.

use std::sync::Once;

use log::error;

pub mod config;
pub mod entry;
pub mod error;
pub mod extension;
pub mod logger;
pub mod numeric;

pub use entry::{register_entry_point, EntryPointSlot};
pub use error::{Error, Result};
pub use extension::{initialize_module, ExtensionHooks, ExtensionModule};
pub use gdshim_include as include;

static BOOTSTRAP_ONCE: Once = Once::new();

fn panic_hook(info: &std::panic::PanicHookInfo) {
    error!("godot-entry-shim panic: {}", info);
}

fn main_entry() -> anyhow::Result<()> {
    let config_result = config::Config::initialize();

    logger::init_logger();

    std::panic::set_hook(Box::new(panic_hook));

    config_result?;
    Ok(())
}

/// Set up config and logging the first time the host calls in.
pub(crate) fn bootstrap() {
    BOOTSTRAP_ONCE.call_once(|| {
        if let Err(e) = main_entry() {
            error!("Bootstrap failed, continuing with defaults: {}", e);
        }
    });
}
