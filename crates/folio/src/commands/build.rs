//! `folio build` command implementation.
//!
//! Writes every sidebar document as the same JSON the server returns:
//!
//! ```text
//! <out>/
//!   config.json
//!   sidebar.json
//!   docs/<category>/<slug>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use folio_config::{CliSettings, Config, RenderMode};
use folio_site::{PageRequest, Site, navigation};
use serde::Serialize;

use super::site_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for the generated pages.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            mode: Some(RenderMode::Static),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = site_from_config(&config, RenderMode::Static)?;

        output.field("Output", self.output_dir.display());

        let report = write_site(&site, &self.output_dir)?;
        for slug in &report.skipped {
            output.warning(&format!("Skipped {slug}: page not found"));
        }

        output.success(&format!(
            "Built {} pages to {}",
            report.written.len(),
            self.output_dir.display()
        ));
        Ok(())
    }
}

/// Result of a static build.
#[derive(Debug, Default)]
pub(crate) struct BuildReport {
    /// Page files written, relative to the output directory.
    pub(crate) written: Vec<PathBuf>,
    /// Sidebar slugs that did not render.
    pub(crate) skipped: Vec<String>,
}

/// Prebuild the site and write it to `out_dir`.
pub(crate) fn write_site(site: &Site, out_dir: &Path) -> Result<BuildReport, CliError> {
    site.prebuild()?;

    let sidebar = site.sidebar()?;
    let settings = site
        .settings()?
        .ok_or_else(|| CliError::Build("site settings document not found".to_owned()))?;

    fs::create_dir_all(out_dir)?;
    write_json(&out_dir.join("config.json"), &settings)?;
    write_json(&out_dir.join("sidebar.json"), &sidebar)?;

    let mut report = BuildReport::default();
    for doc in navigation::flatten(&sidebar) {
        let relative = PathBuf::from(format!("{}.json", doc.href().trim_start_matches('/')));
        if report.written.contains(&relative) {
            continue;
        }

        match site.render(&PageRequest::new(&doc.slug.current)) {
            Ok(page) => {
                write_json(&out_dir.join(&relative), &page)?;
                report.written.push(relative);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping page");
                report.skipped.push(doc.slug.current.clone());
            }
        }
    }

    Ok(report)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::Build(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}
