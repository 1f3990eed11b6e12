use crate::chem::mol::ReadMolecule;
use crate::codec::{encode, CodecResult, Molecule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object holding user-defined properties of one entry.
pub type Properties = Map<String, Value>;

/// One row of the molecule table.
///
/// `molecule` is `None` only for property placeholders, rows created by a
/// property write on a key that never received a molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    #[serde(default)]
    pub molecule: Option<Molecule>,
    #[serde(default)]
    pub properties: Properties,
}

impl Entry {
    pub fn new(key: impl Into<String>, molecule: Molecule) -> Self {
        Self {
            key: key.into(),
            molecule: Some(molecule),
            properties: Properties::new(),
        }
    }

    pub fn with_properties(
        key: impl Into<String>,
        molecule: Molecule,
        properties: Properties,
    ) -> Self {
        Self {
            key: key.into(),
            molecule: Some(molecule),
            properties,
        }
    }

    /// Encodes a native molecule and wraps it into an entry.
    ///
    /// Fails with the codec error of that molecule only; bulk importers can
    /// skip the item and continue.
    pub fn from_mol<M: ReadMolecule + ?Sized>(
        key: impl Into<String>,
        molecule: &M,
        properties: Option<Properties>,
    ) -> CodecResult<Self> {
        Ok(Self {
            key: key.into(),
            molecule: Some(encode(molecule)?),
            properties: properties.unwrap_or_default(),
        })
    }
}

/// Key plus properties, without a molecule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub key: String,
    #[serde(default)]
    pub properties: Properties,
}

impl PropertyEntry {
    pub fn new(key: impl Into<String>, properties: Properties) -> Self {
        Self {
            key: key.into(),
            properties,
        }
    }
}

impl From<Entry> for PropertyEntry {
    fn from(entry: Entry) -> Self {
        Self {
            key: entry.key,
            properties: entry.properties,
        }
    }
}
