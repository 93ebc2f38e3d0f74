use std::{env, path::PathBuf};

use crate::error::{ConfigError, Result};

/// Returns the user's home directory, `/` when `HOME` is unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// Resolves a user-supplied path.
///
/// A leading `~` is replaced with the home directory, `$VAR` and `${VAR}` are expanded from
/// the environment, and relative paths are joined onto the current directory.
///
/// # Errors
///
/// * [`ConfigError::EmptyPath`] if the path is empty
/// * [`ConfigError::MissingEnvVar`] if a referenced variable is not set
/// * [`ConfigError::IoError`] if the current directory cannot be determined
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let path = path.trim();

    if path.is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    let expanded = expand_variables(path)?;
    let expanded = match expanded.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{rest}", home_dir().display())
        }
        _ => expanded,
    };

    let path_buf = PathBuf::from(expanded);
    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        Ok(env::current_dir()?.join(path_buf))
    }
}

fn expand_variables(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&c| c != '}').collect()
        } else {
            let mut var = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    var.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            var
        };

        if var.is_empty() {
            result.push('$');
            continue;
        }

        let value = env::var(&var).map_err(|_| {
            ConfigError::MissingEnvVar {
                var: var.clone(),
                input: input.to_string(),
            }
        })?;
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_path("/srv/collections").unwrap(),
            PathBuf::from("/srv/collections")
        );
    }

    #[test]
    fn test_resolve_relative() {
        let cwd = env::current_dir().unwrap();
        assert_eq!(resolve_path("collections").unwrap(), cwd.join("collections"));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve_path("  "), Err(ConfigError::EmptyPath)));
    }

    #[test]
    #[serial]
    fn test_resolve_variables_and_tilde() {
        env::set_var("GRABBER_TEST_ROOT", "/data");
        assert_eq!(
            resolve_path("$GRABBER_TEST_ROOT/galaxy").unwrap(),
            PathBuf::from("/data/galaxy")
        );
        assert_eq!(
            resolve_path("${GRABBER_TEST_ROOT}/galaxy").unwrap(),
            PathBuf::from("/data/galaxy")
        );
        env::remove_var("GRABBER_TEST_ROOT");

        env::set_var("HOME", "/home/grabber");
        assert_eq!(
            resolve_path("~/collections").unwrap(),
            PathBuf::from("/home/grabber/collections")
        );
    }

    #[test]
    #[serial]
    fn test_resolve_missing_variable() {
        env::remove_var("GRABBER_TEST_UNSET");
        assert!(matches!(
            resolve_path("$GRABBER_TEST_UNSET/x"),
            Err(ConfigError::MissingEnvVar { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_xdg_config_home() {
        env::set_var("XDG_CONFIG_HOME", "/xdg");
        assert_eq!(xdg_config_home(), PathBuf::from("/xdg"));
        env::remove_var("XDG_CONFIG_HOME");
        env::set_var("HOME", "/home/grabber");
        assert_eq!(xdg_config_home(), PathBuf::from("/home/grabber/.config"));
    }
}
