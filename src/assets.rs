//! Bundled CSS and script assets

use anyhow::{Context, Result};
use std::{fs, path::Path};

const BASE: &str = include_str!("../assets/base.css");
const LAYOUT: &str = include_str!("../assets/components/layout.css");
const NAV: &str = include_str!("../assets/components/nav.css");
const MARKDOWN: &str = include_str!("../assets/markdown.css");
const NIGHT: &str = include_str!("../assets/night.css");

const VIEWER_SCRIPT: &str = include_str!("../assets/viewer.js");

/// Stylesheet every page links, relative to the assets directory.
pub const STYLESHEET: &str = "docnav.css";
/// Theme and font control script, relative to the assets directory.
pub const SCRIPT: &str = "viewer.js";

/// Writes the bundled stylesheet and the viewer script to `assets_dir`
pub fn write_assets(assets_dir: &Path) -> Result<()> {
    fs::create_dir_all(assets_dir).context("Failed to create assets directory")?;
    write_bundled(assets_dir, STYLESHEET, &[BASE, LAYOUT, NAV, MARKDOWN, NIGHT])?;
    write_bundled(assets_dir, SCRIPT, &[VIEWER_SCRIPT])?;
    Ok(())
}

fn write_bundled(dir: &Path, name: &str, parts: &[&str]) -> Result<()> {
    let contents = parts.join("\n");
    fs::write(dir.join(name), contents)
        .with_context(|| format!("Failed to write asset: {}", name))?;
    Ok(())
}
