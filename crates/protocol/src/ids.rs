use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity of one mounted viewer.
///
/// Events on the bus carry the id of the viewer that produced them, and a
/// viewer drops events bearing its own id. Ids are compared by content, so
/// two viewers built with the same name are treated as the same viewer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ViewerId(Arc<str>);

impl ViewerId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `event_origin` names this viewer.
    pub fn is_origin_of(&self, event_origin: &ViewerId) -> bool {
        Arc::ptr_eq(&self.0, &event_origin.0) || self == event_origin
    }
}

impl PartialEq<&str> for ViewerId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::borrow::Borrow<str> for ViewerId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for ViewerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ViewerId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<ViewerId> for String {
    fn from(id: ViewerId) -> Self {
        id.as_str().to_owned()
    }
}

impl std::fmt::Display for ViewerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
