//! Result rows handed to the protocol adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document_id::DocumentId;
use crate::kind::NodeKind;

/// Metadata describing one document in the tree.
///
/// `size` is always `None` for stores that do not expose blob sizes, and
/// `last_modified` is the time the document was last opened through the
/// bridge, if it ever was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub id: DocumentId,
    pub display_name: String,
    pub kind: NodeKind,
    pub mime_type: String,
    pub size: Option<u64>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_modified: Option<DateTime<Utc>>,
    pub thumbnail_supported: bool,
    pub prefers_grid: bool,
}

impl DocumentMetadata {
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}

/// Description of a browsable root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootDescriptor {
    pub root_id: String,
    pub title: String,
    pub supports_recents: bool,
    pub supports_search: bool,
    pub local_only: bool,
    pub accepted_mime_types: Vec<String>,
    pub document_id: DocumentId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn metadata_serializes_camel_case() {
        let meta = DocumentMetadata {
            id: DocumentId::parse("Cats/Grumpy Cat.jpg").unwrap(),
            display_name: "Grumpy Cat".to_string(),
            kind: NodeKind::File,
            mime_type: "image/jpeg".to_string(),
            size: None,
            last_modified: Some(Utc.timestamp_millis_opt(1_500_000_000_000).unwrap()),
            thumbnail_supported: true,
            prefers_grid: false,
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["id"], "Cats/Grumpy Cat.jpg");
        assert_eq!(json["displayName"], "Grumpy Cat");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["size"], serde_json::Value::Null);
        assert_eq!(json["lastModified"], 1_500_000_000_000i64);
        assert_eq!(json["thumbnailSupported"], true);

        let back: DocumentMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn root_descriptor_serializes_camel_case() {
        let root = RootDescriptor {
            root_id: "assets".to_string(),
            title: "Assets".to_string(),
            supports_recents: true,
            supports_search: true,
            local_only: true,
            accepted_mime_types: vec!["image/*".to_string()],
            document_id: DocumentId::store_root(),
        };

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["rootId"], "assets");
        assert_eq!(json["acceptedMimeTypes"][0], "image/*");
        assert_eq!(json["documentId"], "");
    }
}
