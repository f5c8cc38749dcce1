//! Hardware capability detection and backend selection.
//!
//! Detection runs once, on first use. The enabled set is the detected set
//! intersected with the `MEANING_KERNEL_CAPABILITIES` environment override and
//! any mask passed to [`configure`]. Backends only select code paths: every
//! operation returns the same result whichever backend runs it.
//!
//! # Example
//! ```
//! use meaning_kernel::{capabilities, cap};
//!
//! let caps = capabilities::available();
//! if caps & cap::NEON != 0 {
//!     println!("NEON is available");
//! }
//! if caps & cap::HASWELL != 0 {
//!     println!("AVX2 (Haswell) is available");
//! }
//! ```

use core::sync::atomic::{AtomicU64, Ordering};

/// Capability bit masks.
pub mod cap {
    pub const SERIAL: u64 = 1 << 0; // Always: Fallback
    pub const NEON: u64 = 1 << 1; // 2013: ARM NEON
    pub const HASWELL: u64 = 1 << 2; // 2013: Intel AVX2
}

/// Environment variable consulted once at detection time.
pub const CAPABILITIES_ENV: &str = "MEANING_KERNEL_CAPABILITIES";

const UNINITIALIZED: u64 = 0;

static AVAILABLE: AtomicU64 = AtomicU64::new(UNINITIALIZED);
static ENABLED: AtomicU64 = AtomicU64::new(UNINITIALIZED);

/// Returns the bitmask of capabilities the current CPU supports.
pub fn available() -> u64 {
    let caps = AVAILABLE.load(Ordering::Relaxed);
    if caps != UNINITIALIZED {
        return caps;
    }
    initialize().0
}

/// Returns the bitmask of capabilities operations are allowed to use.
pub fn enabled() -> u64 {
    let caps = ENABLED.load(Ordering::Relaxed);
    if caps != UNINITIALIZED {
        return caps;
    }
    initialize().1
}

/// Restricts dispatch to `mask & available()`, returning the effective mask.
///
/// [`cap::SERIAL`] is always kept, so `configure(0)` forces the serial backend
/// and `configure(!0)` re-enables everything the CPU supports.
pub fn configure(mask: u64) -> u64 {
    let effective = (available() & mask) | cap::SERIAL;
    ENABLED.store(effective, Ordering::Relaxed);
    tracing::info!(
        requested = mask,
        effective,
        backend = describe(effective),
        "configured kernel capabilities"
    );
    effective
}

/// Human-readable name of the widest backend in `caps`.
pub fn describe(caps: u64) -> &'static str {
    if caps & cap::HASWELL != 0 {
        "haswell"
    } else if caps & cap::NEON != 0 {
        "neon"
    } else {
        "serial"
    }
}

fn initialize() -> (u64, u64) {
    let detected = detect();
    let effective = resolve_from_env(detected);

    // Racing initializers compute the same values, so plain stores are fine.
    AVAILABLE.store(detected, Ordering::Relaxed);
    if ENABLED
        .compare_exchange(
            UNINITIALIZED,
            effective,
            Ordering::Relaxed,
            Ordering::Relaxed,
        )
        .is_ok()
    {
        tracing::debug!(
            detected,
            effective,
            backend = describe(effective),
            "detected kernel capabilities"
        );
    }
    (detected, ENABLED.load(Ordering::Relaxed))
}

fn resolve_from_env(detected: u64) -> u64 {
    let requested = std::env::var(CAPABILITIES_ENV).ok();
    resolve(detected, requested.as_deref())
}

/// Intersects `detected` with an optional backend list; serial always survives.
fn resolve(detected: u64, requested: Option<&str>) -> u64 {
    let requested = requested.map(parse_mask).unwrap_or(!0);
    (detected & requested) | cap::SERIAL
}

fn detect() -> u64 {
    #[allow(unused_mut)]
    let mut caps = cap::SERIAL;

    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("avx2") {
            caps |= cap::HASWELL;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            caps |= cap::NEON;
        }
    }

    caps
}

/// Parses a comma-separated backend list such as `"serial"` or `"neon,haswell"`.
///
/// `auto` (or an empty value) allows everything; unknown names are ignored.
pub(crate) fn parse_mask(value: &str) -> u64 {
    let mut mask = cap::SERIAL;
    let mut any = false;
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        any = true;
        match name.to_ascii_lowercase().as_str() {
            "auto" | "all" => return !0,
            "serial" => {}
            "neon" => mask |= cap::NEON,
            "haswell" | "avx2" => mask |= cap::HASWELL,
            other => tracing::warn!(name = other, "ignoring unknown capability name"),
        }
    }
    if any {
        mask
    } else {
        !0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_always_available() {
        assert_ne!(available() & cap::SERIAL, 0);
        assert_ne!(enabled() & cap::SERIAL, 0);
        assert_eq!(enabled() & !available(), 0);
    }

    #[test]
    fn parse_backend_lists() {
        assert_eq!(parse_mask("serial"), cap::SERIAL);
        let all = cap::SERIAL | cap::NEON | cap::HASWELL;
        assert_eq!(parse_mask("neon, haswell"), all);
        assert_eq!(parse_mask("AVX2"), cap::SERIAL | cap::HASWELL);
        assert_eq!(parse_mask("auto"), !0);
        assert_eq!(parse_mask(""), !0);
        assert_eq!(parse_mask("sve"), cap::SERIAL);
    }

    #[test]
    fn resolve_intersects_with_detected() {
        let detected = cap::SERIAL | cap::HASWELL;
        assert_eq!(resolve(detected, None), detected);
        assert_eq!(resolve(detected, Some("serial")), cap::SERIAL);
        assert_eq!(resolve(detected, Some("neon")), cap::SERIAL);
        assert_eq!(resolve(detected, Some("avx2")), detected);
        assert_eq!(resolve(cap::SERIAL, Some("")), cap::SERIAL);
    }

    #[test]
    fn environment_override_restricts_backends() {
        // Any concurrent first-time detection only narrows dispatch, never results.
        std::env::set_var(CAPABILITIES_ENV, "serial");
        assert_eq!(resolve_from_env(available()), cap::SERIAL);
        std::env::set_var(CAPABILITIES_ENV, "auto");
        assert_eq!(resolve_from_env(available()), available());
        std::env::remove_var(CAPABILITIES_ENV);
        assert_eq!(resolve_from_env(available()), available());
    }

    #[test]
    fn describe_picks_widest() {
        assert_eq!(describe(cap::SERIAL), "serial");
        assert_eq!(describe(cap::SERIAL | cap::NEON), "neon");
        assert_eq!(describe(cap::SERIAL | cap::HASWELL), "haswell");
    }
}
