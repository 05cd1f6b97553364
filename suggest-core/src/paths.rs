use std::path::{Path, PathBuf};

/// Resolve a path written in a config file.
///
/// A leading `~` expands to the home directory (`None` if it can't be
/// determined). Other relative paths are taken relative to `base`, the
/// directory holding the config file, when one is given.
pub fn resolve_path(path: &str, base: Option<&Path>) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    let path = PathBuf::from(path);
    match base {
        Some(base) if path.is_relative() => Some(base.join(path)),
        _ => Some(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_ignores_base() {
        assert_eq!(
            resolve_path("/data/catalog.json", Some(Path::new("/etc/suggest"))),
            Some(PathBuf::from("/data/catalog.json"))
        );
    }

    #[test]
    fn relative_path_joins_base() {
        assert_eq!(
            resolve_path("catalog.json", Some(Path::new("/etc/suggest"))),
            Some(PathBuf::from("/etc/suggest/catalog.json"))
        );
        assert_eq!(
            resolve_path("catalog.json", None),
            Some(PathBuf::from("catalog.json"))
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let result = resolve_path("~/catalog.json", None).expect("home dir should exist in test env");
        assert!(result.ends_with("catalog.json"));
        assert!(!result.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn tilde_in_middle_is_literal() {
        assert_eq!(
            resolve_path("/a/~/b", None),
            Some(PathBuf::from("/a/~/b"))
        );
    }
}
