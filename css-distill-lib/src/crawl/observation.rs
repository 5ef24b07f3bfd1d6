use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One property value read off one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub selector: String,
    pub property: String,
    pub raw_value: String,
    pub element_tag: String,

    /// Which element on the page the value was read from, when the source numbers its elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_index: Option<usize>,

    /// Nearby text or markup that helps a human place the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_context: Option<String>,
}

impl Observation {
    #[must_use]
    pub fn new(selector: impl Into<String>, property: impl Into<String>, raw_value: impl Into<String>, element_tag: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            property: property.into(),
            raw_value: raw_value.into(),
            element_tag: element_tag.into(),
            element_index: None,
            inner_context: None,
        }
    }

    #[must_use]
    pub const fn with_element_index(mut self, index: usize) -> Self {
        self.element_index = Some(index);
        self
    }
}

/// Everything read from one page, plus the component annotations found in its markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObservations {
    pub url: String,

    #[serde(default)]
    pub title: String,
    pub observations: Vec<Observation>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: AnnotationMap,
}

impl PageObservations {
    /// The element each observation belongs to, parallel to `observations`.
    ///
    /// Numbered observations share an element when they share an index. Unnumbered observations of
    /// one selector belong to the same element until a property repeats, which starts the next one.
    #[must_use]
    pub fn element_ids(&self) -> Vec<usize> {
        let mut next = 0;
        let mut numbered: HashMap<usize, usize> = HashMap::new();
        let mut open: HashMap<&str, (usize, HashSet<&str>)> = HashMap::new();
        let mut ids = Vec::with_capacity(self.observations.len());

        for observation in &self.observations {
            let property = observation.property.as_str();

            let id = if let Some(index) = observation.element_index {
                *numbered.entry(index).or_insert_with(|| {
                    next += 1;
                    next - 1
                })
            } else if let Some((id, properties)) = open
                .get_mut(observation.selector.as_str())
                .filter(|element| !element.1.contains(property))
            {
                let _ = properties.insert(property);
                *id
            } else {
                let id = next;
                next += 1;
                let _ = open.insert(observation.selector.as_str(), (id, HashSet::from([property])));
                id
            };

            ids.push(id);
        }

        ids
    }
}

/// Element selector to the component name a template-debug comment gave it.
pub type AnnotationMap = BTreeMap<String, String>;
