use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recurring UI component instance, identified by its type and variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentValue {
    pub component_type: String,
    pub variant: String,
    pub modifiers: Vec<String>,

    /// Representative computed styles of the instance this value was taken from.
    pub properties: BTreeMap<String, String>,
}

impl ComponentValue {
    /// Only type and variant identify a component; styles differ between instances.
    #[must_use]
    pub fn identity_key(&self) -> String {
        format!("{}/{}", self.component_type, self.variant)
    }
}
