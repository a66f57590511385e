use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::utils;

/// The last `write`'s resolved values, persisted so that `remove`, `export`
/// and `send` can reuse them within the same session. Whole-file read and
/// write, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    profile_name: String,
    date: String,
    hour: f64,
    rate: f64,
    description: String,
    gst_code: String,
    invoice_number: String,
    template_path: PathBuf,
    append: bool,
    silent: bool,
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf_path: Option<PathBuf>,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile_name: impl Into<String>,
        date: impl Into<String>,
        hour: f64,
        rate: f64,
        description: impl Into<String>,
        gst_code: impl Into<String>,
        invoice_number: impl Into<String>,
        template_path: impl Into<PathBuf>,
        append: bool,
        silent: bool,
    ) -> Self {
        Self {
            profile_name: profile_name.into(),
            date: date.into(),
            hour,
            rate,
            description: description.into(),
            gst_code: gst_code.into(),
            invoice_number: invoice_number.into(),
            template_path: template_path.into(),
            append,
            silent,
            timestamp: Utc::now().timestamp(),
            pdf_path: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = utils::read_to_string(path).with_context(|| {
            format!(
                "no session found at `{}`, run `write` first",
                path.display()
            )
        })?;

        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse session file `{}`", path.display()))
    }

    pub fn store(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        utils::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn pdf_path(&self) -> Option<&Path> {
        self.pdf_path.as_deref()
    }

    pub fn set_pdf_path(&mut self, path: impl Into<PathBuf>) {
        self.pdf_path = Some(path.into());
    }
}
