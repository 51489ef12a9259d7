//! Command line configuration.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::DEFAULT_HOME;
use crate::prefs::FileStore;
use crate::remote::GITHUB_API;
use crate::site::{DEFAULT_MANIFEST, SiteOptions};

/// Command line configuration for docnav.
#[derive(Debug, Clone, Parser)]
#[command(name = "docnav", version, about, long_about = None)]
pub struct Config {
    /// Log progress at info level (otherwise RUST_LOG decides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Mirror a GitHub directory into a manifest document
    Manifest(ManifestArgs),
    /// Render every manifest document into a static site
    Build(BuildArgs),
    /// Show or change viewer preferences
    Prefs(PrefsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Repository owner
    #[arg(long, default_value = "xiersg")]
    pub owner: String,

    /// Repository name
    #[arg(long, default_value = "GdutRSS")]
    pub repo: String,

    /// Branch to list
    #[arg(long, default_value = "gh-pages")]
    pub branch: String,

    /// Directory to mirror, relative to the repository root
    #[arg(long, default_value = "topics")]
    pub root: String,

    /// Manifest output file
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    pub output: PathBuf,

    /// GitHub API base URL
    #[arg(long, default_value = GITHUB_API)]
    pub api_base: String,
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Local site directory holding the manifest and documents
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Base URL relative targets resolve against when no source directory is given
    #[arg(long)]
    pub base_url: Option<String>,

    /// Manifest fetch target, relative to the source
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    pub manifest: String,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    pub output: PathBuf,

    /// Document rendered as the index page
    #[arg(long, default_value = DEFAULT_HOME)]
    pub home: String,

    /// Read documents from the source directory by path instead of their download URL
    #[arg(long)]
    pub local: bool,

    /// Preference file (defaults to the user config directory)
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// Do not open the generated index
    #[arg(long)]
    pub no_open: bool,
}

impl BuildArgs {
    pub fn site_options(&self) -> SiteOptions {
        SiteOptions {
            manifest: self.manifest.clone(),
            source_root: self.source.clone(),
            base_url: self.base_url.clone(),
            output: self.output.clone(),
            home: self.home.clone(),
            fetch_by_path: self.local,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct PrefsArgs {
    /// Preference file (defaults to the user config directory)
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    #[command(subcommand)]
    pub action: PrefsAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum PrefsAction {
    /// Print the stored preferences
    Show,
    /// Switch between day and night
    ToggleTheme,
    /// Increase the font size by one pixel
    FontUp,
    /// Decrease the font size by one pixel
    FontDown,
    /// Restore the default font size
    FontReset,
}

/// Preference file to use: the explicit one or the per-user default.
pub fn prefs_path(explicit: Option<&PathBuf>) -> PathBuf {
    explicit.cloned().unwrap_or_else(FileStore::default_path)
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Repository owner, name or branch is empty
    /// - Source directory does not exist
    /// - `--local` is given without a source directory
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Manifest(args) => {
                if args.owner.trim().is_empty() || args.repo.trim().is_empty() {
                    bail!("Repository owner and name must not be empty");
                }
                if args.branch.trim().is_empty() {
                    bail!("Branch must not be empty");
                }
            }
            Command::Build(args) => {
                if let Some(source) = &args.source
                    && !source.is_dir()
                {
                    bail!("Source directory does not exist: {}", source.display());
                }
                if args.local && args.source.is_none() {
                    bail!("--local requires --source");
                }
            }
            Command::Prefs(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_args() -> BuildArgs {
        BuildArgs {
            source: Some(PathBuf::from(".")),
            base_url: None,
            manifest: DEFAULT_MANIFEST.to_string(),
            output: PathBuf::from("dist"),
            home: DEFAULT_HOME.to_string(),
            local: true,
            prefs: None,
            no_open: true,
        }
    }

    #[test]
    fn test_parse_manifest_defaults() {
        // Act
        let config = Config::try_parse_from(["docnav", "manifest"]).expect("Should parse");

        // Assert
        match config.command {
            Command::Manifest(args) => {
                assert_eq!(args.branch, "gh-pages");
                assert_eq!(args.root, "topics");
                assert_eq!(args.output, PathBuf::from("directory.json"));
                assert_eq!(args.api_base, GITHUB_API);
            }
            other => panic!("Expected manifest command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_build_with_global_verbose() {
        // Act
        let config = Config::try_parse_from([
            "docnav", "build", "--source", "site", "--local", "--no-open", "-v",
        ])
        .expect("Should parse");

        // Assert
        assert!(config.verbose);
        match config.command {
            Command::Build(args) => {
                assert_eq!(args.source, Some(PathBuf::from("site")));
                assert!(args.local && args.no_open);
                assert_eq!(args.home, "index.md");
            }
            other => panic!("Expected build command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_prefs_action() {
        // Act
        let config =
            Config::try_parse_from(["docnav", "prefs", "toggle-theme"]).expect("Should parse");

        // Assert
        match config.command {
            Command::Prefs(args) => assert_eq!(args.action, PrefsAction::ToggleTheme),
            other => panic!("Expected prefs command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_existing_source() {
        // Arrange
        let config = Config {
            verbose: false,
            command: Command::Build(build_args()),
        };

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_ok(), "Current directory should be valid");
    }

    #[test]
    fn test_validate_local_without_source() {
        // Arrange
        let config = Config {
            verbose: false,
            command: Command::Build(BuildArgs {
                source: None,
                ..build_args()
            }),
        };

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_missing_source() {
        // Arrange
        let config = Config {
            verbose: false,
            command: Command::Build(BuildArgs {
                source: Some(PathBuf::from("/nonexistent/docnav/site")),
                ..build_args()
            }),
        };

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_site_options_from_build_args() {
        // Act
        let options = build_args().site_options();

        // Assert
        assert!(options.fetch_by_path);
        assert_eq!(options.manifest, "directory.json");
        assert_eq!(options.output, PathBuf::from("dist"));
    }
}
