//! Diagnostics setup and secret redaction

use std::io;
use tracing_subscriber::EnvFilter;

/// Longest secret prefix ever shown in redacted output
const MAX_VISIBLE_PREFIX: usize = 10;

/// Install the stderr subscriber. `RUST_LOG` wins over the debug flag.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Prefix-truncated form of a secret, safe to print in debug output.
///
/// At most a quarter of the secret (capped at ten characters) stays visible,
/// so short values are fully masked.
pub fn redact(secret: &str) -> String {
    let visible = (secret.chars().count() / 4).min(MAX_VISIBLE_PREFIX);
    let prefix: String = secret.chars().take(visible).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_long_secret() {
        let secret = "a1b2c3d4e5f6g7h8i9j0k1l2m3n4o5p6q7r8s9t0";
        assert_eq!(redact(secret), "a1b2c3d4e5...");
    }

    #[test]
    fn test_redact_short_secret_hides_everything() {
        assert_eq!(redact("abc"), "...");
        assert_eq!(redact(""), "...");
    }

    #[test]
    fn test_redact_never_reveals_full_value() {
        let secret = "0123456789ab";
        let redacted = redact(secret);
        assert!(!redacted.contains(secret));
        assert_eq!(redacted, "012...");
    }
}
