use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Extra decoder diagnostics, enabled by setting `SCREEN_QR_DEBUG`
pub(crate) fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| std::env::var("SCREEN_QR_DEBUG").is_ok())
}

/// Level for per-pass decoder diagnostics
pub(crate) fn diagnostic_level() -> log::Level {
    if debug_enabled() {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}
