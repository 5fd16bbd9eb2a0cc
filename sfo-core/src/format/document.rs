use std::collections::HashSet;

use itertools::Itertools;

use super::Value;
use crate::error::{Result, SfoError};

/// Parsed SFO file: header identity plus parameters in file order.
///
/// Equality ignores parameter order, since the writer always re-sorts names.
#[derive(Debug, Clone)]
pub struct Document {
    pub signature: [u8; 4],
    pub version: [u8; 4],
    params: Vec<(Vec<u8>, Value)>,
}

impl Document {
    pub const DEFAULT_SIGNATURE: [u8; 4] = *b"\0PSF";

    pub fn new(signature: [u8; 4], version: [u8; 4]) -> Self {
        Self {
            signature,
            version,
            params: Vec::new(),
        }
    }

    /// Build a document from named values, rejecting repeated names.
    pub fn from_params<N, I>(signature: [u8; 4], version: [u8; 4], params: I) -> Result<Self>
    where
        N: Into<Vec<u8>>,
        I: IntoIterator<Item = (N, Value)>,
    {
        let params: Vec<(Vec<u8>, Value)> =
            params.into_iter().map(|(n, v)| (n.into(), v)).collect();

        let mut seen = HashSet::with_capacity(params.len());
        for (name, _) in &params {
            if !seen.insert(name.as_slice()) {
                return Err(SfoError::DuplicateName(
                    String::from_utf8_lossy(name).into_owned(),
                ));
            }
        }

        Ok(Self {
            signature,
            version,
            params,
        })
    }

    /// Dotted form of the four version bytes, e.g. `1.1.0.0`.
    pub fn version_string(&self) -> String {
        self.version.iter().join(".")
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&Value> {
        let name = name.as_ref();
        self.params
            .iter()
            .find(|(n, _)| n.as_slice() == name)
            .map(|(_, v)| v)
    }

    /// Insert or replace a parameter. A replaced value keeps its position.
    pub fn insert(&mut self, name: impl Into<Vec<u8>>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.params.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: impl AsRef<[u8]>) -> Option<Value> {
        let name = name.as_ref();
        let idx = self.params.iter().position(|(n, _)| n.as_slice() == name)?;
        Some(self.params.remove(idx).1)
    }

    /// Parameters in insertion (file) order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.params.iter().map(|(n, v)| (n.as_slice(), v))
    }

    /// Parameters in the order the writer lays them out.
    pub fn sorted(&self) -> Vec<(&[u8], &Value)> {
        self.iter().sorted_by(|a, b| a.0.cmp(b.0)).collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIGNATURE, [1, 1, 0, 0])
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
            && self.version == other.version
            && self.params.len() == other.params.len()
            && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for Document {}
