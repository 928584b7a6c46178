//! Logging setup for binaries and demos embedding the editor.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the host.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Returns `false` if a
/// global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let _ = init("track_editor=debug");
        assert!(!init("track_editor=debug"));
    }
}
