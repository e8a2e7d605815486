#![forbid(unsafe_code)]

//! Host timing and config helpers shared by the wasm export and native tests.

use core::time::Duration;

use framesync_core::{SyncConfig, SyncError};
use tracing::debug;

/// Largest delay `setTimeout` honors; larger values fire immediately.
const MAX_TIMEOUT_MS: u128 = i32::MAX as u128;

/// Milliseconds to wait from `now` until `deadline`, rounded up so the
/// wake-up never lands before the deadline.
#[must_use]
pub fn wake_delay_ms(now: Duration, deadline: Duration) -> u32 {
    let micros = deadline.saturating_sub(now).as_micros();
    micros.div_ceil(1_000).min(MAX_TIMEOUT_MS) as u32
}

/// Parse the optional JSON config handed to the constructor.
///
/// `None` or a blank string yields the defaults.
pub fn load_config(json: Option<&str>) -> Result<SyncConfig, SyncError> {
    match json.map(str::trim) {
        None | Some("") => Ok(SyncConfig::default()),
        Some(json) => {
            let config = SyncConfig::from_json_str(json)?;
            debug!(?config, "loaded frame sync config");
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wake_delay_rounds_up_partial_millis() {
        let now = Duration::from_micros(1_500);
        assert_eq!(wake_delay_ms(now, Duration::from_millis(100)), 99);
        assert_eq!(wake_delay_ms(Duration::from_micros(99_001), Duration::from_millis(100)), 1);
    }

    #[test]
    fn overdue_deadline_wakes_immediately() {
        assert_eq!(
            wake_delay_ms(Duration::from_millis(700), Duration::from_millis(600)),
            0
        );
    }

    #[test]
    fn far_deadline_is_clamped() {
        assert_eq!(
            wake_delay_ms(Duration::ZERO, Duration::from_secs(60 * 60 * 24 * 365)),
            i32::MAX as u32
        );
    }

    #[test]
    fn blank_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), SyncConfig::default());
        assert_eq!(load_config(Some("  ")).unwrap(), SyncConfig::default());
    }

    #[test]
    fn config_overrides_apply() {
        let config = load_config(Some(r#"{"target_origin":"https://host.test"}"#)).unwrap();
        assert_eq!(config.target_origin, "https://host.test");
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(load_config(Some(r#"{"collapse_fallback_ms":0}"#)).is_err());
    }
}
