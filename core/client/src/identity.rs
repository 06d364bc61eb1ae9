//! Document identity tracking across repeated saves.
//!
//! A document handle starts either bound to an id or unbound. An unbound
//! handle binds exactly once: to the `_id` of the first saved payload, or to
//! the id the server assigns in answer to the first POST.

use serde_json::{Map, Value};

use cblite_common::{DocumentId, Error, Result};

/// Field carrying a document's identity inside its body.
pub const ID_FIELD: &str = "_id";

/// Identity state of a document handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Binding {
    /// No id known yet.
    #[default]
    Unbound,
    /// Permanently bound.
    Bound(DocumentId),
}

impl Binding {
    /// The bound id, if any.
    pub fn id(&self) -> Option<&DocumentId> {
        match self {
            Binding::Unbound => None,
            Binding::Bound(id) => Some(id),
        }
    }

    /// Bind to `id`. Returns false, leaving the state untouched, if already bound.
    pub fn bind(&mut self, id: DocumentId) -> bool {
        match self {
            Binding::Unbound => {
                *self = Binding::Bound(id);
                true
            }
            Binding::Bound(_) => false,
        }
    }
}

/// HTTP method chosen for a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMethod {
    /// Write to a known id.
    Put,
    /// Let the server generate the id.
    Post,
}

/// Where a save goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub method: SaveMethod,
    pub id: Option<DocumentId>,
}

/// Name of a payload's kind. `None` stands for a missing payload.
pub fn payload_kind(payload: Option<&Value>) -> &'static str {
    match payload {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Accept only JSON objects as document bodies.
pub fn validate_payload(payload: Option<Value>) -> Result<Map<String, Value>> {
    match payload {
        Some(Value::Object(map)) => Ok(map),
        other => Err(Error::InvalidPayloadKind {
            kind: payload_kind(other.as_ref()),
        }),
    }
}

/// Decide PUT or POST for a save, binding `_id` when the handle is unbound.
///
/// A bound handle always wins over an embedded `_id`. Only non-empty string
/// `_id` values are taken as identities.
pub fn resolve_save_target(binding: &mut Binding, payload: &Map<String, Value>) -> SaveTarget {
    if let Some(id) = binding.id() {
        return SaveTarget {
            method: SaveMethod::Put,
            id: Some(id.clone()),
        };
    }

    let embedded = payload
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|id| DocumentId::new(id).ok());

    match embedded {
        Some(id) => {
            binding.bind(id.clone());
            SaveTarget {
                method: SaveMethod::Put,
                id: Some(id),
            }
        }
        None => SaveTarget {
            method: SaveMethod::Post,
            id: None,
        },
    }
}
