use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use log::{debug, info};
use tempfile::TempDir;

use crate::config::Config;
use crate::profile::ResolvedProfile;

/// Where the exported document belongs:
/// `<output_dir>/<client>/<provider>_<client>_<invoice_number>.pdf`, with
/// spaces in names turned into dashes.
pub fn pdf_output_path(
    config: &Config,
    resolved: &ResolvedProfile,
    invoice_number: &str,
) -> anyhow::Result<PathBuf> {
    let provider = resolved
        .provider()
        .item("name")
        .map(|item| item.value())
        .filter(|value| !value.is_empty())
        .context("provider has no \"name\" data item")?
        .replace(' ', "-");
    let client = resolved
        .client()
        .item("name")
        .map(|item| item.value())
        .filter(|value| !value.is_empty())
        .context("client has no \"name\" data item")?
        .replace(' ', "-");

    Ok(config
        .paths()
        .output_dir()
        .join(&client)
        .join(format!("{provider}_{client}_{invoice_number}.pdf")))
}

/// Converts the working instance to a PDF at `target` by running LibreOffice
/// headless. The instance must be fully written and saved before this is
/// called; the converter only ever sees the file on disk.
pub fn export_pdf(config: &Config, target: &Path) -> anyhow::Result<PathBuf> {
    let instance = config.paths().instance();
    if !instance.is_file() {
        anyhow::bail!(
            "no working invoice to export at `{}`, run `write` first",
            instance.display()
        );
    }

    // convert into a scratch directory first, so a failed run never leaves a
    // half-written file at the target
    let scratch = TempDir::new()?;

    info!("converting {} to pdf", instance.display());
    let output = Command::new(config.tools().soffice_path())
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(scratch.path())
        .arg(instance)
        .output()
        .with_context(|| {
            format!(
                "failed to run `{}`, is LibreOffice installed?",
                config.tools().soffice_path().display()
            )
        })?;

    if !output.status.success() {
        anyhow::bail!(
            "pdf conversion failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let stem = instance
        .file_stem()
        .context("instance path has no file name")?;
    let produced = scratch.path().join(stem).with_extension("pdf");
    debug!("converter wrote {}", produced.display());

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&produced, target)
        .with_context(|| format!("converter produced no file at `{}`", produced.display()))?;

    info!("exported {}", target.display());
    Ok(target.to_path_buf())
}
