//! Resource models for the Raindrop REST API.
//!
//! # Design
//! The remote service is strict about key names, so every field carries its
//! wire name explicitly where it differs from the Rust name (`_id`, `$id`,
//! `lastUpdate`, ...). Empty values are left out of the emitted JSON; the
//! only keys always written are the ones the service requires (a raindrop's
//! `link`, an id list's `ids`, a suggestion request's `link`, a reminder's
//! `date`). Every field defaults on input so partial server payloads decode.

use serde::{Deserialize, Serialize};

pub(crate) fn is_zero(value: &i64) -> bool {
    *value == 0
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// A `{"$id": n}` reference to another entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRef {
    #[serde(rename = "$id")]
    pub id: i64,
}

impl IdRef {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Reference from a raindrop or collection to its (parent) collection.
pub type CollectionRef = IdRef;

/// Reference to the owning user.
pub type UserRef = IdRef;

/// A bookmark folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CollectionRef>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sort: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub view: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cover: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<CollectionAccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<Collaborator>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(rename = "lastUpdate", default, skip_serializing_if = "String::is_empty")]
    pub last_update: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

/// Access level of the current user on a collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionAccess {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub level: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub draggable: bool,
}

/// A member of a shared collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collaborator {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(rename = "email_MD5", default, skip_serializing_if = "String::is_empty")]
    pub email_md5: String,
    #[serde(rename = "fullName", default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
}

/// A single bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Raindrop {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Always emitted, even when empty.
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionRef>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub important: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub order: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(rename = "lastUpdate", default, skip_serializing_if = "String::is_empty")]
    pub last_update: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<Highlight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
}

impl Raindrop {
    /// A raindrop carrying only its link.
    pub fn with_link(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }
}

/// A media attachment (image or video) of a raindrop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Media {
    #[serde(default)]
    pub link: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// A text annotation on a raindrop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Highlight {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Link of the raindrop this highlight belongs to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    #[serde(default)]
    pub date: String,
}

/// Batch mutation applied to every raindrop listed in `ids`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkUpdate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub important: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionRef>,
}

/// Body for bulk removals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdList {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Body for link-based suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkBody {
    #[serde(default)]
    pub link: String,
}

/// Body for bulk creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RaindropList {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Raindrop>,
}

/// Collections and tags the service suggests for a link or raindrop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// `{"result": true, "item": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse<T> {
    #[serde(default)]
    pub result: bool,
    pub item: T,
}

/// `{"result": true, "items": [...], "count": n}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemsResponse<T> {
    #[serde(default)]
    pub result: bool,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

/// `{"result": false, "errorMessage": "..."}` and bare acknowledgements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(rename = "errorMessage", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raindrop_with_only_link_emits_only_link() {
        let json = serde_json::to_string(&Raindrop::with_link("https://example.com")).unwrap();
        assert_eq!(json, r#"{"link":"https://example.com"}"#);
    }

    #[test]
    fn raindrop_link_is_emitted_even_when_empty() {
        let json = serde_json::to_value(Raindrop::default()).unwrap();
        assert_eq!(json, json!({ "link": "" }));
    }

    #[test]
    fn empty_collection_serializes_to_empty_object() {
        let json = serde_json::to_value(Collection::default()).unwrap();
        assert_eq!(json, json!({}));
    }

    #[test]
    fn wire_keys_are_preserved() {
        let raindrop = Raindrop {
            id: Some(7),
            link: "https://example.com".to_string(),
            kind: "article".to_string(),
            last_update: "2024-01-02T00:00:00Z".to_string(),
            collection: Some(CollectionRef::new(46406303)),
            ..Raindrop::default()
        };
        let json = serde_json::to_value(&raindrop).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["type"], "article");
        assert_eq!(json["lastUpdate"], "2024-01-02T00:00:00Z");
        assert_eq!(json["collection"]["$id"], 46406303);

        let collaborator = Collaborator {
            email_md5: "abc".to_string(),
            full_name: "Ada".to_string(),
            ..Collaborator::default()
        };
        let json = serde_json::to_value(&collaborator).unwrap();
        assert_eq!(json, json!({ "email_MD5": "abc", "fullName": "Ada" }));
    }

    #[test]
    fn id_list_always_emits_ids() {
        let json = serde_json::to_value(IdList::default()).unwrap();
        assert_eq!(json, json!({ "ids": [] }));
    }

    #[test]
    fn bulk_update_omits_unset_fields() {
        let update = BulkUpdate {
            ids: vec![1, 2],
            tags: vec!["rust".to_string()],
            ..BulkUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, json!({ "ids": [1, 2], "tags": ["rust"] }));
    }

    #[test]
    fn fully_populated_raindrop_roundtrips() {
        let raindrop = Raindrop {
            id: Some(823844493),
            link: "https://www.youtube.com/watch?v=Z6grOAUEIrQ".to_string(),
            title: "Talk".to_string(),
            excerpt: "An excerpt".to_string(),
            note: "watch later".to_string(),
            cover: "https://img.example.com/c.png".to_string(),
            tags: vec!["video".to_string(), "nmbs_test".to_string()],
            media: vec![Media {
                link: "https://img.example.com/m.png".to_string(),
                kind: "image".to_string(),
            }],
            kind: "video".to_string(),
            collection: Some(CollectionRef::new(46406303)),
            important: true,
            order: 3,
            created: "2024-01-01T00:00:00Z".to_string(),
            last_update: "2024-01-02T00:00:00Z".to_string(),
            highlights: vec![Highlight {
                id: "h1".to_string(),
                text: "quoted".to_string(),
                color: "yellow".to_string(),
                tags: vec!["q".to_string()],
                ..Highlight::default()
            }],
            reminder: Some(Reminder {
                date: "2024-02-01T09:00:00Z".to_string(),
            }),
        };
        let json = serde_json::to_string(&raindrop).unwrap();
        let back: Raindrop = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raindrop);
    }

    #[test]
    fn partial_server_payload_decodes() {
        let body = r#"{"result":true,"item":{"_id":5,"title":"Reading","access":{"level":4}}}"#;
        let parsed: ItemResponse<Collection> = serde_json::from_str(body).unwrap();
        assert!(parsed.result);
        assert_eq!(parsed.item.id, Some(5));
        assert_eq!(parsed.item.access.map(|a| a.level), Some(4));
        assert!(parsed.item.cover.is_empty());
    }

    #[test]
    fn items_response_defaults_missing_items() {
        let parsed: ItemsResponse<Raindrop> = serde_json::from_str(r#"{"result":true}"#).unwrap();
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.count, None);
    }
}
