use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single `{Key, Value}` tag attached to a cloud resource.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct ResourceTag {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value", default)]
    value: String,
}

impl ResourceTag {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A resource that matched a policy.
///
/// Apart from its tags, a resource is an opaque bag of attributes that only the renderer looks at.
#[derive(Debug, PartialEq, Deserialize, Serialize, Clone, Default)]
pub struct Resource {
    #[serde(rename = "Tags", default)]
    tags: Vec<ResourceTag>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Resource {
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns the value of the tag with the specified key.
    ///
    /// Keys are not unique, so the most recently appended tag wins.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|tag| tag.key() == key)
            .map(|tag| tag.value())
    }
}

#[cfg(test)]
impl ResourceTag {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
impl Resource {
    pub fn tags(&self) -> &[ResourceTag] {
        &self.tags
    }

    pub fn push_tag(&mut self, tag: ResourceTag) {
        self.tags.push(tag)
    }
}
