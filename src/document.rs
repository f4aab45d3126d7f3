//! # Request Document
//!
//! The nested JSON object assembled from field items. Values are placed
//! by dotted path; intermediate objects are created on demand.

use crate::error::{Error, Result};
use crate::items::DottedPath;
use serde_json::{Map, Value};

/// JSON object under construction for the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDocument {
    root: Map<String, Value>,
}

impl RequestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Set `value` at `path`, creating intermediate objects.
    ///
    /// Fails with [`Error::PathConflict`] if an intermediate key already
    /// holds something other than an object. Conflicts can only occur on
    /// keys that already exist, which are checked before anything new is
    /// inserted, so a failed merge leaves the document untouched.
    pub fn merge(&mut self, path: &DottedPath, value: Value) -> Result<()> {
        let (parents, leaf) = path.split_leaf();

        let mut current = &mut self.root;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match slot {
                Value::Object(map) => map,
                _ => {
                    return Err(Error::PathConflict {
                        path: path.to_string(),
                        segment: segment.clone(),
                    })
                }
            };
        }

        current.insert(leaf.to_string(), value);
        Ok(())
    }

    /// Serialize as a JSON body.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.root).map_err(|e| Error::Io { source: e.into() })
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}
