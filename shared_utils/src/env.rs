use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// An environment variable is set but its value could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {value:?} ({reason})")]
pub struct EnvParseError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

/// Reads an optional environment variable.
///
/// Values are trimmed; an unset, non-unicode, or blank variable yields `None`.
pub fn get_env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank, and an
/// [`EnvParseError`] when it is set to something `T` cannot parse. A typo in a
/// deployment variable should fail loudly instead of quietly using a default.
pub fn parse_env_opt<T>(name: &str) -> Result<Option<T>, EnvParseError>
where
    T: FromStr,
    T::Err: Display,
{
    match get_env_opt(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| EnvParseError {
            name: name.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}

/// Like [`parse_env_opt`], falling back to `default` when the variable is absent.
pub fn env_or<T>(name: &str, default: T) -> Result<T, EnvParseError>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(parse_env_opt(name)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const VAR: &str = "SHARED_UTILS_TEST_VAR";

    fn set(value: &str) {
        unsafe { std::env::set_var(VAR, value) }
    }

    fn clear() {
        unsafe { std::env::remove_var(VAR) }
    }

    #[test]
    #[serial]
    fn blank_values_are_treated_as_unset() {
        set("   ");
        assert_eq!(get_env_opt(VAR), None);
        assert_eq!(env_or(VAR, 7u32).unwrap(), 7);
        clear();
    }

    #[test]
    #[serial]
    fn parses_trimmed_values() {
        set(" 42 ");
        assert_eq!(env_or(VAR, 7u32).unwrap(), 42);
        clear();
    }

    #[test]
    #[serial]
    fn garbage_is_an_error_not_a_default() {
        set("ten");
        let err = env_or(VAR, 7u32).unwrap_err();
        assert_eq!(err.name, VAR);
        assert_eq!(err.value, "ten");
        clear();
    }
}
