#[macro_use]
extern crate lazy_static;

pub mod depositors;
pub mod tokens;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use depositors::{parse_depositors, DepositorsError};
pub use tokens::{Token, TokenDescriptor};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("couldn't read deployment manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("couldn't parse deployment manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The addresses of the contracts that the frontend deployment wrote out. The
/// manager is the only contract the vault scripts need; every other address
/// in the manifest is kept by name.
#[derive(Default, Debug, Eq, PartialEq, Clone, Deserialize, Serialize)]
#[serde(try_from = "RawAddresses")]
pub struct Addresses {
    pub manager: Address,
    #[serde(flatten)]
    pub others: BTreeMap<String, Address>,
}

impl Addresses {
    /// Reads the manifest at `path`. This is read once at startup and is
    /// never retried.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Looks up a deployed contract by the name it has in the manifest.
    pub fn get(&self, name: &str) -> Option<Address> {
        if name == "manager" {
            Some(self.manager)
        } else {
            self.others.get(name).copied()
        }
    }
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawAddresses(BTreeMap<String, Value>);

impl TryFrom<RawAddresses> for Addresses {
    type Error = String;

    fn try_from(r: RawAddresses) -> Result<Self, Self::Error> {
        let mut fields = r.0;
        let manager = match fields.remove("manager") {
            Some(Value::String(s)) => s
                .parse::<Address>()
                .map_err(|e| format!("invalid manager address {s:?}: {e}"))?,
            Some(other) => return Err(format!("expected manager to be a string, got {other}")),
            None => return Err("missing field `manager`".to_string()),
        };

        // The frontend writes other metadata next to the addresses, so
        // anything that isn't an address string is skipped.
        let others = fields
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::String(s) => s.parse::<Address>().ok().map(|address| (name, address)),
                _ => None,
            })
            .collect();

        Ok(Self { manager, others })
    }
}
