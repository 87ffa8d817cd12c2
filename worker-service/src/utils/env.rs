use std::str::FromStr;
use tracing::warn;

/// Reads `name` from the environment, falling back to `default` when it is
/// unset, blank, or does not parse.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {:?}", name, value, default);
            default
        }),
        _ => default,
    }
}
