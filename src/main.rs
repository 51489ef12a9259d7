use anyhow::{Context, Result};
use docnav::{
    BuildArgs, Command, Config, Engine, FileStore, GitHubContents, ManifestArgs, PrefsAction,
    PrefsArgs, Preferences, SiteFetcher, build_manifest, generate_site, prefs_path,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = log_filter(config.verbose, std::env::var("RUST_LOG").ok().as_deref());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate().context("Invalid configuration")?;

    match &config.command {
        Command::Manifest(args) => run_manifest(args),
        Command::Build(args) => run_build(args),
        Command::Prefs(args) => run_prefs(args),
    }
}

/// --verbose enables INFO level, otherwise use RUST_LOG or default to WARN.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn run_manifest(args: &ManifestArgs) -> Result<()> {
    let client = GitHubContents::new(&args.api_base, &args.owner, &args.repo, &args.branch);

    let manifest = build_manifest(&client, &args.root).with_context(|| {
        format!(
            "Failed to build manifest for {}/{}@{}",
            args.owner, args.repo, args.branch
        )
    })?;

    // Only a complete walk reaches disk
    manifest
        .write(&args.output)
        .with_context(|| format!("Failed to write manifest {}", args.output.display()))?;

    println!(
        "Generated: {} ({} documents)",
        args.output.display(),
        manifest.documents().len()
    );
    Ok(())
}

fn run_build(args: &BuildArgs) -> Result<()> {
    let path = prefs_path(args.prefs.as_ref());
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open preferences {}", path.display()))?;

    let summary = generate_site(&args.site_options(), &store).context("Failed to build site")?;

    println!("Generated {} document pages", summary.pages);
    for failed in &summary.failed {
        eprintln!("Warning: Failed to load {}", failed);
    }
    println!("Generated: {}", summary.index.display());

    if !args.no_open {
        info!(index = %summary.index.display(), "Opening site");
        open::that(&summary.index)
            .with_context(|| format!("Failed to open {}", summary.index.display()))?;
    }

    Ok(())
}

fn run_prefs(args: &PrefsArgs) -> Result<()> {
    let path = prefs_path(args.prefs.as_ref());
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open preferences {}", path.display()))?;
    let mut engine = Engine::new(SiteFetcher::new(), &store);

    match args.action {
        PrefsAction::Show => {}
        PrefsAction::ToggleTheme => {
            engine.toggle_theme();
        }
        PrefsAction::FontUp => {
            engine.increase_font();
        }
        PrefsAction::FontDown => {
            engine.decrease_font();
        }
        PrefsAction::FontReset => {
            engine.reset_font();
        }
    }

    print_preferences(engine.state().preferences(), &path);
    Ok(())
}

fn print_preferences(prefs: &Preferences, path: &std::path::Path) {
    println!("file:      {}", path.display());
    println!("theme:     {}", prefs.theme.as_str());
    println!("font-size: {}", prefs.font_size_value());
    if prefs.expanded.is_empty() {
        println!("expanded:  (none)");
    } else {
        println!("expanded:  {}", prefs.expanded.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        // Act
        let filter = log_filter(false, None);

        // Assert
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_log_filter_prefers_verbose_then_rust_log() {
        // Act
        let verbose = log_filter(true, Some("debug"));
        let from_env = log_filter(false, Some("docnav=debug"));
        let invalid = log_filter(false, Some("docnav=[bad"));

        // Assert
        assert_eq!(verbose.to_string(), "info");
        assert_eq!(from_env.to_string(), "docnav=debug");
        assert_eq!(invalid.to_string(), "warn");
    }
}
