//! Per-parameter type metadata consumed by the writer.
//!
//! The YAML form uses the same keys as existing `ptypes.yaml` files:
//!
//! ```yaml
//! TITLE:
//!   type: utf-8
//!   used: false
//!   size: 128
//! APP_VER:
//!   type: utf-8
//!   used: true
//!   size: 8
//! ATTRIBUTE:
//!   type: integer
//!   used: true
//!   size: 4
//! ```
//!
//! `used` marks a fixed-length value. Older files store the fixed byte count
//! there instead of a boolean; any non-zero count is read as fixed-length.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SfoError};
use crate::format::{Layout, TypeCode};

/// Lookup from parameter name to its declared storage.
pub trait TypeLookup {
    fn param_type(&self, name: &[u8]) -> Option<&ParamType>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamType {
    /// One of the [`TypeCode::meta_name`] strings. Unknown names load fine
    /// and are rejected only when a value of this type is written.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(rename = "used", default, deserialize_with = "deserialize_used")]
    pub fixed_length: bool,
    /// Bytes allocated in the data table.
    pub size: u32,
}

impl ParamType {
    pub fn new(code: TypeCode, fixed_length: bool, size: u32) -> Self {
        Self {
            ty: code.meta_name().to_string(),
            fixed_length,
            size,
        }
    }

    pub fn type_code(&self) -> Result<TypeCode> {
        TypeCode::from_meta_name(&self.ty).ok_or_else(|| SfoError::UnsupportedType(self.ty.clone()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UsedField {
    Flag(bool),
    Count(u64),
}

fn deserialize_used<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<UsedField>::deserialize(deserializer)? {
        None | Some(UsedField::Flag(false)) | Some(UsedField::Count(0)) => false,
        Some(UsedField::Flag(true)) | Some(UsedField::Count(_)) => true,
    })
}

/// Type metadata keyed by parameter name, as stored in a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamTypes(BTreeMap<String, ParamType>);

impl ParamTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let types = Self::from_yaml_str(&text)?;
        log::debug!(
            "loaded {} parameter types from {}",
            types.len(),
            path.as_ref().display()
        );
        Ok(types)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Derive metadata from an existing file so it can be written back with
    /// the same allocations.
    ///
    /// A parameter counts as fixed-length when its meaningful length fills
    /// the whole allocation. YAML keys are text, so a name that is not UTF-8
    /// fails with [`SfoError::NonUtf8Name`].
    pub fn infer(layout: &Layout) -> Result<Self> {
        let mut types = Self::new();
        for entry in &layout.entries {
            let code = TypeCode::try_from(entry.record.type_code)?;
            let fixed = entry.record.data_len == entry.record.data_max_len;
            let name = std::str::from_utf8(&entry.name)
                .map_err(|_| SfoError::NonUtf8Name(entry.name.escape_ascii().to_string()))?;
            types.insert(name, ParamType::new(code, fixed, entry.record.data_max_len));
        }
        Ok(types)
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: ParamType) -> Option<ParamType> {
        self.0.insert(name.into(), ty)
    }

    pub fn get(&self, name: &str) -> Option<&ParamType> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamType)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TypeLookup for ParamTypes {
    fn param_type(&self, name: &[u8]) -> Option<&ParamType> {
        std::str::from_utf8(name).ok().and_then(|n| self.0.get(n))
    }
}

impl TypeLookup for BTreeMap<Vec<u8>, ParamType> {
    fn param_type(&self, name: &[u8]) -> Option<&ParamType> {
        self.get(name)
    }
}

impl<S: BuildHasher> TypeLookup for HashMap<Vec<u8>, ParamType, S> {
    fn param_type(&self, name: &[u8]) -> Option<&ParamType> {
        self.get(name)
    }
}

impl<T: TypeLookup + ?Sized> TypeLookup for &T {
    fn param_type(&self, name: &[u8]) -> Option<&ParamType> {
        (**self).param_type(name)
    }
}
