use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use derive_more::Display;
use log::trace;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::profile::{Client, DefaultParam, Profile, Provider, Recipient};

/// The five named-record collections making up the profile graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Collection {
    #[display("profiles")]
    Profiles,
    #[display("providers")]
    Providers,
    #[display("clients")]
    Clients,
    #[display("recipients")]
    Recipients,
    #[display("default parameters")]
    DefaultParams,
}

impl Collection {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Profiles => "profiles.json",
            Self::Providers => "providers.json",
            Self::Clients => "clients.json",
            Self::Recipients => "recipients.json",
            Self::DefaultParams => "default_params.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{collection}: no record named \"{name}\"")]
    NotFound { collection: Collection, name: String },
    #[error("failed to read {collection} from `{path}`: {source}")]
    Io {
        collection: Collection,
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse {collection} from `{path}`: {source}")]
    Parse {
        collection: Collection,
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Anything that can be looked up by its `name` field.
pub trait Record {
    fn name(&self) -> &str;
}

macro_rules! impl_record {
    ($($name:ty),+) => {
        $(
            impl Record for $name {
                fn name(&self) -> &str {
                    <$name>::name(self)
                }
            }
        )+
    };
}

impl_record!(Profile, Provider, Client, Recipient, DefaultParam);

/// Lookups into the profile graph. Every lookup re-reads and re-parses the
/// backing file, so edits made while the tool runs are visible on the next
/// command; no snapshot is held across calls.
pub struct ProfileStore {
    data_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn load<T>(&self, collection: Collection) -> Result<Vec<T>, ResolveError>
    where
        T: DeserializeOwned,
    {
        let path = self.data_dir.join(collection.file_name());
        trace!("reading {} from: {}", collection, path.display());

        let file = File::open(&path).map_err(|source| ResolveError::Io {
            collection,
            path: path.clone(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| ResolveError::Parse {
            collection,
            path,
            source,
        })
    }

    /// Looks a record up by name. Collections are ordered; on duplicate
    /// names the first match wins.
    pub fn resolve<T>(&self, collection: Collection, name: &str) -> Result<T, ResolveError>
    where
        T: Record + DeserializeOwned,
    {
        self.load::<T>(collection)?
            .into_iter()
            .find(|record| record.name() == name)
            .ok_or_else(|| ResolveError::NotFound {
                collection,
                name: name.to_string(),
            })
    }

    /// Resolves a profile and all four records it references. Any dangling
    /// ref fails the whole resolution; there is no partial assembly.
    pub fn resolve_profile(&self, name: &str) -> Result<ResolvedProfile, ResolveError> {
        let profile: Profile = self.resolve(Collection::Profiles, name)?;
        let provider = self.resolve(Collection::Providers, profile.provider_ref())?;
        let client = self.resolve(Collection::Clients, profile.client_ref())?;
        let recipient = self.resolve(Collection::Recipients, profile.recipient_ref())?;
        let params = self.resolve(Collection::DefaultParams, profile.params_ref())?;

        Ok(ResolvedProfile {
            profile,
            provider,
            client,
            recipient,
            params,
        })
    }
}

/// A profile with its back-references materialized.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    profile: Profile,
    provider: Provider,
    client: Client,
    recipient: Recipient,
    params: DefaultParam,
}

impl ResolvedProfile {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn params(&self) -> &DefaultParam {
        &self.params
    }
}
