//! Render configuration.

use std::path::PathBuf;

/// Remotion renderer configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// CLI invocation, program first (e.g. `npx remotion`)
    pub cli: Vec<String>,
    /// Entry point of the Remotion project to bundle
    pub entry_point: PathBuf,
    /// Directory the bundle is written to
    pub bundle_dir: PathBuf,
    /// Already-built bundle or serve URL; skips the bundle step when set
    pub serve_url: Option<String>,
    /// Directory rendered videos are written to
    pub videos_dir: PathBuf,
    /// Frames rendered in parallel, left to Remotion when unset
    pub concurrency: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cli: vec!["npx".to_string(), "remotion".to_string()],
            entry_point: PathBuf::from("remotion/index.ts"),
            bundle_dir: std::env::temp_dir().join("cstudio-remotion-bundle"),
            serve_url: None,
            videos_dir: PathBuf::from("videos"),
            concurrency: None,
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cli = std::env::var("REMOTION_CLI")
            .ok()
            .map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty())
            .unwrap_or(defaults.cli);

        Self {
            cli,
            entry_point: std::env::var("REMOTION_ENTRY_POINT")
                .map(PathBuf::from)
                .unwrap_or(defaults.entry_point),
            bundle_dir: std::env::var("REMOTION_BUNDLE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.bundle_dir),
            serve_url: std::env::var("REMOTION_SERVE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            videos_dir: std::env::var("VIDEOS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.videos_dir),
            concurrency: std::env::var("REMOTION_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        self.cli.first().map(String::as_str).unwrap_or("npx")
    }

    /// Arguments that precede the subcommand (`remotion` for `npx remotion`).
    pub fn prefix_args(&self) -> &[String] {
        self.cli.get(1..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var("REMOTION_CLI");
        std::env::remove_var("VIDEOS_DIR");
        std::env::remove_var("REMOTION_SERVE_URL");

        let config = RenderConfig::from_env();
        assert_eq!(config.program(), "npx");
        assert_eq!(config.prefix_args(), &["remotion".to_string()]);
        assert_eq!(config.videos_dir, PathBuf::from("videos"));
        assert!(config.serve_url.is_none());
    }

    #[test]
    #[serial]
    fn test_custom_cli() {
        std::env::set_var("REMOTION_CLI", "/opt/bin/remotion");
        let config = RenderConfig::from_env();
        assert_eq!(config.program(), "/opt/bin/remotion");
        assert!(config.prefix_args().is_empty());
        std::env::remove_var("REMOTION_CLI");
    }
}
