use mongodb::bson::{Bson, Document};
use serde::Deserialize;

/// A stored robot document, returned to clients exactly as the database
/// holds it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Record(Document);

impl Record {
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// Renders the record for JSON clients. ObjectIds become hex strings and
    /// dates become RFC 3339 strings; other BSON-only types use relaxed
    /// Extended JSON.
    pub fn into_json(self) -> serde_json::Value {
        bson_to_json(Bson::Document(self.0))
    }
}

fn bson_to_json(value: Bson) -> serde_json::Value {
    match value {
        Bson::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => serde_json::Value::String(s),
            // Outside the RFC 3339 year range
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Document(doc) => serde_json::Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(bson_to_json).collect())
        }
        other => other.into_relaxed_extjson(),
    }
}

impl From<Document> for Record {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}
