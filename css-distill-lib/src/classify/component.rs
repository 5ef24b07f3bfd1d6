use super::Classification;
use crate::values::kebab_segment;

/// The parts of a selector's last compound that matter for component detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorParts {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub data_component: Option<String>,
}

impl SelectorParts {
    /// Parse the rightmost compound of `selector`, e.g. `button.btn.btn--primary` in `.nav > button.btn.btn--primary`.
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        let compound = selector
            .rsplit(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~'))
            .find(|part| !part.is_empty())
            .unwrap_or_default();

        let mut parts = Self::default();
        let mut rest = compound;

        let tag_len = rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-')).unwrap_or(rest.len());
        if tag_len > 0 {
            parts.tag = Some(rest[..tag_len].to_ascii_lowercase());
        }
        rest = &rest[tag_len..];

        while let Some(first) = rest.chars().next() {
            match first {
                '[' => {
                    let end = rest.find(']').map_or(rest.len(), |i| i + 1);
                    if let Some(value) = data_component_value(&rest[..end]) {
                        parts.data_component = Some(value);
                    }
                    rest = &rest[end..];
                }
                '.' | '#' | ':' => {
                    let body = &rest[1..];
                    let len = body.find(['.', '#', ':', '[']).unwrap_or(body.len());
                    if first == '.' && len > 0 {
                        parts.classes.push(body[..len].to_string());
                    }
                    rest = &body[len..];
                }
                _ => {
                    rest = &rest[first.len_utf8()..];
                }
            }
        }

        parts
    }
}

fn data_component_value(attribute: &str) -> Option<String> {
    let inner = attribute.strip_prefix('[')?.strip_suffix(']')?;
    let (name, value) = inner.split_once('=')?;
    if name.trim() != "data-component" {
        return None;
    }

    let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
    (!value.is_empty()).then(|| value.to_string())
}

/// A component type and variant detected on one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMatch {
    pub component_type: String,
    pub variant: String,
    pub modifiers: Vec<String>,
}

impl ComponentMatch {
    #[must_use]
    pub fn classification(&self) -> Classification {
        let name = if self.variant == "default" {
            format!("component-{}", self.component_type)
        } else {
            format!("component-{}-{}", self.component_type, self.variant)
        };

        Classification::new(self.component_type.clone(), name)
    }
}

/// Detects configured component names on elements.
#[derive(Debug, Clone)]
pub struct ComponentMatcher {
    names: Vec<String>,
}

impl ComponentMatcher {
    #[must_use]
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.iter().map(|n| n.trim().to_ascii_lowercase()).filter(|n| !n.is_empty()).collect(),
        }
    }

    /// Identify the component an element belongs to.
    ///
    /// An annotation for the element wins; otherwise the first configured name found as a
    /// `data-component` value, a class, or a BEM `block__element` / `block--modifier` class.
    #[must_use]
    pub fn detect(&self, parts: &SelectorParts, annotation: Option<&str>) -> Option<ComponentMatch> {
        let classes: Vec<String> = parts.classes.iter().map(|c| c.to_ascii_lowercase()).collect();

        if let Some(annotation) = annotation.map(kebab_segment).filter(|a| !a.is_empty()) {
            return Some(build_match(annotation.clone(), &annotation, &classes));
        }

        if let Some(value) = parts.data_component.as_deref().map(str::to_ascii_lowercase)
            && self.names.contains(&value)
        {
            return Some(build_match(kebab_segment(&value), &value, &classes));
        }

        for name in &self.names {
            let element_prefix = format!("{name}__");
            let modifier_prefix = format!("{name}--");

            if let Some(element_class) = classes.iter().find(|class| class.starts_with(&element_prefix)) {
                let element = &element_class[element_prefix.len()..];
                let element = element.split_once("--").map_or(element, |(element, _)| element);
                let component_type = format!("{}-{}", kebab_segment(name), kebab_segment(element));
                return Some(build_match(component_type, name, &classes));
            }

            if classes.iter().any(|class| class == name || class.starts_with(&modifier_prefix)) {
                return Some(build_match(kebab_segment(name), name, &classes));
            }
        }

        None
    }
}

fn build_match(component_type: String, block: &str, classes: &[String]) -> ComponentMatch {
    let modifier_prefix = format!("{block}--");
    let element_prefix = format!("{block}__");

    let mut modifiers: Vec<String> = classes
        .iter()
        .filter_map(|class| {
            if class == block {
                None
            } else if let Some(modifier) = class.strip_prefix(&modifier_prefix) {
                Some(modifier.to_string())
            } else if class.starts_with(&element_prefix) {
                class.split_once("--").map(|(_, modifier)| modifier.to_string())
            } else {
                Some(class.clone())
            }
        })
        .map(|modifier| kebab_segment(&modifier))
        .filter(|modifier| !modifier.is_empty())
        .collect();

    modifiers.sort();
    modifiers.dedup();

    let variant = if modifiers.is_empty() {
        "default".to_string()
    } else {
        modifiers.join("-")
    };

    ComponentMatch {
        component_type,
        variant,
        modifiers,
    }
}
