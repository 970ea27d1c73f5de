//! `log` backend: `console_log` in the browser, `env_logger` on native
//! targets (tests).

use log::LevelFilter;

/// Install the logger. Safe to call more than once; later calls only move
/// the global max level.
pub fn init(level: LevelFilter) {
    install(level);
    log::set_max_level(level);
}

#[cfg(target_arch = "wasm32")]
fn install(level: LevelFilter) {
    if let Some(level) = level.to_level() {
        // Errors only when a logger is already set.
        let _ = console_log::init_with_level(level);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn install(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .is_test(true)
        .try_init();
}
