//! Query shapes understood by every document store
//!
//! A store call is described by a [`Filter`] (which documents), a
//! [`Projection`] (which fields) and an optional [`Populate`] (which
//! reference to expand).

use serde_json::{Map, Value};

/// A stored document: a JSON object keyed by field name
pub type Document = Map<String, Value>;

/// Field every document carries as its primary key
pub const ID_FIELD: &str = "_id";

/// Equality filter: a document matches when every listed field is equal
///
/// An empty filter matches everything.
pub type Filter = Document;

/// Which fields of a document to return
///
/// `_id` is always kept.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Every stored field
    All,
    /// Only the listed fields
    Fields(Vec<String>),
}

impl Projection {
    pub fn fields(fields: &[&str]) -> Self {
        Projection::Fields(fields.iter().map(|f| f.to_string()).collect())
    }

    /// Keep only the projected fields of `doc`
    pub fn apply(&self, doc: Document) -> Document {
        match self {
            Projection::All => doc,
            Projection::Fields(fields) => doc
                .into_iter()
                .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|f| f == key))
                .collect(),
        }
    }
}

/// Expand a reference field into a subset of the referenced document
///
/// After expansion the field holds `{ "_id": …, <selected fields> }`, or
/// `null` when the referenced document no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Populate {
    /// Field holding the referenced id
    pub field: String,
    /// Collection the id points into
    pub from: String,
    /// Fields of the referenced document to inline
    pub select: Projection,
}

impl Populate {
    pub fn new(field: &str, from: &str, select: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            from: from.to_string(),
            select: Projection::fields(select),
        }
    }

    /// Id referenced by `doc`, if the field holds a plain id
    pub fn reference<'a>(&self, doc: &'a Document) -> Option<&'a str> {
        doc.get(&self.field).and_then(Value::as_str)
    }
}

/// Check an equality filter against a document
pub fn matches(filter: &Filter, doc: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}
