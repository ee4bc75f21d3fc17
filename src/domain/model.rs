use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Remote node id of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A shared parameter as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedParameter {
    pub id: String,
    pub name: String,
    pub guid: Uuid,
    pub data_type: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "flag_on")]
    pub visible: String,
    #[serde(default = "flag_on")]
    pub user_modifiable: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub collections: Vec<CollectionId>,
}

fn flag_on() -> String {
    "1".to_string()
}

/// One line of a shared parameter interchange document, with its group resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub name: String,
    pub guid: Uuid,
    pub group_ref: u32,
    pub group_name: String,
    pub data_type: String,
    pub data_category: String,
    pub description: String,
    pub visible: String,
    pub user_modifiable: String,
    pub batch_id: String,
}

/// A parameter entered by hand rather than imported.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParameter {
    pub name: String,
    pub guid: Option<Uuid>,
    pub data_type: String,
    pub group: String,
    pub description: String,
    pub visible: bool,
    pub user_modifiable: bool,
}

impl NewParameter {
    /// Fills in a fresh GUID if none was given; flags become `"1"`/`"0"`.
    pub fn into_record(self) -> ImportRecord {
        ImportRecord {
            name: self.name,
            guid: self.guid.unwrap_or_else(Uuid::new_v4),
            group_ref: 0,
            group_name: self.group,
            data_type: self.data_type,
            data_category: String::new(),
            description: self.description,
            visible: flag(self.visible),
            user_modifiable: flag(self.user_modifiable),
            batch_id: String::new(),
        }
    }
}

fn flag(on: bool) -> String {
    let value = if on { "1" } else { "0" };
    value.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub uid: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub current_user: CurrentUser,
    pub csrf_token: String,
}

/// One page of results plus the server-reported total across all pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterPage {
    pub records: Vec<SharedParameter>,
    pub total_items: usize,
}

/// Which records a paged listing shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    User(String),
    Collection(CollectionId),
}

/// Outcome of deduplicating one import record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportDecision {
    Create,
    Skip,
}

/// Fields compared when deciding whether two parameters are the same definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchKey<'a> {
    pub name: &'a str,
    pub data_type: &'a str,
    pub group: &'a str,
}

pub trait HasMatchKey {
    fn match_key(&self) -> MatchKey<'_>;
}

impl HasMatchKey for ImportRecord {
    fn match_key(&self) -> MatchKey<'_> {
        MatchKey {
            name: &self.name,
            data_type: &self.data_type,
            group: &self.group_name,
        }
    }
}

impl HasMatchKey for SharedParameter {
    fn match_key(&self) -> MatchKey<'_> {
        MatchKey {
            name: &self.name,
            data_type: &self.data_type,
            group: &self.group,
        }
    }
}
