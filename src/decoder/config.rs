use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

static MAX_UPSCALE: OnceLock<usize> = OnceLock::new();

/// Largest integer factor tried when enlarging small captures
pub(crate) fn max_upscale() -> usize {
    *MAX_UPSCALE.get_or_init(|| parse_env_usize("SCREEN_QR_MAX_UPSCALE", 3).clamp(1, 4))
}

static UPSCALE_BELOW: OnceLock<usize> = OnceLock::new();

/// Captures whose shorter edge is below this many pixels get upscaled passes
pub(crate) fn upscale_below() -> usize {
    *UPSCALE_BELOW.get_or_init(|| parse_env_usize("SCREEN_QR_UPSCALE_BELOW", 400))
}
