use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::{
    error::{PathError, PathResult},
    user::get_username,
};

/// Resolves a user supplied path such as `bin_path` from the config file.
///
/// A leading `~` becomes the home directory, `$VAR` and `${VAR}` are replaced by the
/// environment variable of that name, and relative results are joined onto the current
/// working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is blank
/// * [`PathError::MissingEnvVar`] if a referenced variable is unset
/// * [`PathError::UnclosedVariable`] if a `${` is never closed
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
///
/// # Example
///
/// ```
/// use yanked_utils::path::resolve_path;
///
/// let bin = resolve_path("/opt/scripts").unwrap();
/// assert_eq!(bin, std::path::PathBuf::from("/opt/scripts"));
/// ```
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(|err| PathError::CurrentDir { source: err })
}

/// `$HOME`, or `/home/<user>` when it is unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("/home/{}", get_username())))
}

/// `$XDG_CONFIG_HOME`, or `~/.config` when it is unset.
pub fn xdg_config_home() -> PathBuf {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

fn expand(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    if chars.next_if_eq(&'~').is_some() {
        out.push_str(&home_dir().to_string_lossy());
    }

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let var = if chars.next_if_eq(&'{').is_some() {
            braced_name(&mut chars)?
        } else {
            bare_name(&mut chars)
        };

        if var.is_empty() {
            out.push('$');
        } else if var == "HOME" {
            out.push_str(&home_dir().to_string_lossy());
        } else {
            let value = env::var(&var).map_err(|_| PathError::MissingEnvVar {
                input: input.into(),
                var,
            })?;
            out.push_str(&value);
        }
    }

    Ok(out)
}

fn braced_name(chars: &mut Peekable<Chars>) -> PathResult<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Ok(name);
        }
        name.push(c);
    }
    Err(PathError::UnclosedVariable {
        input: format!("${{{name}"),
    })
}

fn bare_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    struct EnvGuard(Vec<(&'static str, Option<String>)>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, value)| {
                    let old = env::var(key).ok();
                    match value {
                        Some(v) => env::set_var(key, v),
                        None => env::remove_var(key),
                    }
                    (*key, old)
                })
                .collect();
            EnvGuard(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, old) in &self.0 {
                match old {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_expand_variables() {
        let _env = EnvGuard::set(&[("YANKED_VAR1", Some("val1")), ("YANKED_VAR2", Some("val2"))]);

        assert_eq!(expand("$YANKED_VAR1/path").unwrap(), "val1/path");
        assert_eq!(expand("$YANKED_VAR1/${YANKED_VAR2}").unwrap(), "val1/val2");
        assert_eq!(expand("path/$").unwrap(), "path/$");
        assert_eq!(expand("path/$!x").unwrap(), "path/$!x");
        assert_eq!(expand("a/~/b").unwrap(), "a/~/b");
    }

    #[test]
    #[serial]
    fn test_expand_errors() {
        let _env = EnvGuard::set(&[("YANKED_UNSET", None)]);

        assert!(matches!(
            expand("$YANKED_UNSET/bin"),
            Err(PathError::MissingEnvVar { var, .. }) if var == "YANKED_UNSET"
        ));
        assert!(matches!(
            expand("${YANKED_VAR1"),
            Err(PathError::UnclosedVariable { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_resolve_path() {
        let _env = EnvGuard::set(&[("HOME", Some("/tmp/home"))]);

        assert!(matches!(resolve_path("  "), Err(PathError::Empty)));
        assert_eq!(resolve_path("/abs/path").unwrap(), PathBuf::from("/abs/path"));
        assert_eq!(
            resolve_path("~/.local/bin").unwrap(),
            PathBuf::from("/tmp/home/.local/bin")
        );
        assert_eq!(resolve_path("$HOME/bin").unwrap(), PathBuf::from("/tmp/home/bin"));
        assert_eq!(
            resolve_path("relative/~/bin").unwrap(),
            env::current_dir().unwrap().join("relative/~/bin")
        );
    }

    #[test]
    #[serial]
    fn test_home_and_config_dirs() {
        let _env = EnvGuard::set(&[("HOME", None), ("XDG_CONFIG_HOME", None)]);
        let fallback = PathBuf::from(format!("/home/{}", get_username()));
        assert_eq!(home_dir(), fallback);
        assert_eq!(xdg_config_home(), fallback.join(".config"));

        let _env = EnvGuard::set(&[("XDG_CONFIG_HOME", Some("/tmp/config"))]);
        assert_eq!(xdg_config_home(), PathBuf::from("/tmp/config"));
    }
}
