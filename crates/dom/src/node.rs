use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element(ElementData),
    Text(String),
}

/// Tag name (lowercase) and attributes of an element, in insertion order.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub attrs: SmallVec<[(String, String); 4]>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: SmallVec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            value.clone_into(&mut slot.1);
        } else {
            self.attrs.push((name, value.to_owned()));
        }
    }

    /// Whether the whitespace-separated attribute `name` contains `token`
    /// (ASCII case-insensitive, as for `rel`).
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.attribute(name).is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|item| item.eq_ignore_ascii_case(token))
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
}

impl DomNode {
    pub const fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Document | NodeKind::Text(_) => None,
        }
    }

    pub const fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Document | NodeKind::Text(_) => None,
        }
    }
}
