/// One child of an element as read from the legacy export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Element(Element),
    Comment(String),
}

impl Content {
    #[cfg(test)]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn append_text_content(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.append_text_content(out);
                }
            }
            Self::Comment(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    #[cfg(test)]
    pub fn with_class(self, class: &str) -> Self {
        self.with_attr("class", class)
    }

    #[cfg(test)]
    pub fn with_child(mut self, child: Content) -> Self {
        self.children.push(child);
        self
    }

    #[cfg(test)]
    pub fn with_text(self, text: &str) -> Self {
        self.with_child(Content::text(text))
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|value| value == class)
    }

    pub fn has_any_class(&self, classes: &[&str]) -> bool {
        classes.iter().any(|class| self.has_class(class))
    }

    /// True when some element strictly below this one carries `class`.
    pub fn has_descendant_with_class(&self, class: &str) -> bool {
        self.children.iter().any(|child| match child {
            Content::Element(element) => {
                element.has_class(class) || element.has_descendant_with_class(class)
            }
            Content::Text(_) | Content::Comment(_) => false,
        })
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.append_text_content(&mut out);
        }
        out
    }
}

/// A top-level element child of the legacy root container, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub index: usize,
    pub element: Element,
}

impl Block {
    pub fn new(index: usize, element: Element) -> Self {
        Self { index, element }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.element.has_class(class)
    }
}
