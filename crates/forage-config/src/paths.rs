//! Path-alias resolution for settings-provided folder strings.
//!
//! Folder values in the settings document may start with the `[assets]` or
//! `[data]` token; the resolver expands those to the configured base
//! directories so documents stay portable across installs.

use std::path::{Path, PathBuf};

/// Token that expands to the configured assets root.
pub const ASSETS_TOKEN: &str = "[assets]";
/// Token that expands to the configured data root.
pub const DATA_TOKEN: &str = "[data]";

/// Expands leading path-alias tokens to configured base directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    assets_root: PathBuf,
    data_root: PathBuf,
}

impl PathResolver {
    /// Build a resolver over the two configured base directories.
    #[must_use]
    pub const fn new(assets_root: PathBuf, data_root: PathBuf) -> Self {
        Self {
            assets_root,
            data_root,
        }
    }

    /// Base directory substituted for the `[assets]` token.
    #[must_use]
    pub fn assets_root(&self) -> &Path {
        self.assets_root.as_path()
    }

    /// Base directory substituted for the `[data]` token.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        self.data_root.as_path()
    }

    /// Resolve a raw path string, expanding a leading token when present.
    ///
    /// Tokens are case-sensitive and only match at the start of the string;
    /// strings without a leading token pass through unchanged.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> PathBuf {
        expand(raw, ASSETS_TOKEN, &self.assets_root)
            .or_else(|| expand(raw, DATA_TOKEN, &self.data_root))
            .unwrap_or_else(|| PathBuf::from(raw))
    }
}

fn expand(raw: &str, token: &str, root: &Path) -> Option<PathBuf> {
    let rest = raw.strip_prefix(token)?;
    let trimmed = rest.trim_start_matches(['/', '\\']);
    Some(if trimmed.is_empty() {
        root.to_path_buf()
    } else {
        root.join(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new(PathBuf::from("/srv/assets"), PathBuf::from("/var/forage"))
    }

    #[test]
    fn resolves_tokens_to_configured_roots() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("[assets]/textures/a.png"),
            PathBuf::from("/srv/assets/textures/a.png")
        );
        assert_eq!(
            resolver.resolve("[data]/cache"),
            PathBuf::from("/var/forage/cache")
        );
        assert_eq!(
            resolver.resolve("[data]\\cache"),
            PathBuf::from("/var/forage/cache")
        );
    }

    #[test]
    fn bare_token_maps_to_the_root_itself() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("[assets]"), PathBuf::from("/srv/assets"));
        assert_eq!(resolver.resolve("[data]"), PathBuf::from("/var/forage"));
    }

    #[test]
    fn plain_paths_pass_through_unchanged() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("relative/file.txt"),
            PathBuf::from("relative/file.txt")
        );
        assert_eq!(resolver.resolve("/abs/file.txt"), PathBuf::from("/abs/file.txt"));
    }

    #[test]
    fn tokens_only_match_at_the_start() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("media/[assets]/a.png"),
            PathBuf::from("media/[assets]/a.png")
        );
    }
}
