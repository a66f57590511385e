use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::mail::Mail;
use crate::profile::Collection;
use crate::utils;

/// Everything the tool needs to know about its surroundings, loaded once at
/// process start and passed by reference into each component. There is no
/// ambient path lookup anywhere else.
#[derive(Debug, Clone)]
pub struct Config {
    paths: Paths,
    tools: Tools,
    mail: Option<Mail>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    paths: Paths,
    #[serde(default)]
    tools: Tools,
    mail: Option<Mail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    data_dir: PathBuf,
    template: PathBuf,
    instance: PathBuf,
    output_dir: PathBuf,
    session: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tools {
    soffice_path: Option<PathBuf>,
}

impl Paths {
    /// Relative paths in the config file are anchored at the config file's
    /// directory, so the tool behaves the same from any working directory.
    fn anchored_at(mut self, base: &Path) -> Self {
        for path in [
            &mut self.data_dir,
            &mut self.template,
            &mut self.instance,
            &mut self.output_dir,
            &mut self.session,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }

        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn collection(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn instance(&self) -> &Path {
        &self.instance
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn session(&self) -> &Path {
        &self.session
    }
}

impl Tools {
    pub fn soffice_path(&self) -> &Path {
        self.soffice_path
            .as_deref()
            .unwrap_or_else(|| Path::new("soffice"))
    }
}

impl Config {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file: ConfigFile = utils::toml_from_reader(
            File::open(path)
                .with_context(|| format!("failed to open config file `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to parse `{}`", path.display()))?;

        let base = dunce::canonicalize(path)?
            .parent()
            .ok_or_else(|| anyhow::anyhow!("config file should have a parent directory"))?
            .to_path_buf();

        Ok(Self {
            paths: file.paths.anchored_at(&base),
            tools: file.tools,
            mail: file.mail,
        })
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    pub fn mail(&self) -> Option<&Mail> {
        self.mail.as_ref()
    }
}
