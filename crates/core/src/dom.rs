use std::fmt;
use std::rc::Rc;

use crate::error::ClientError;

/// Event handler bound to an element property such as `onclick`.
pub type Handler = Rc<dyn Fn()>;

pub enum AttrValue {
    Text(String),
    Handler(Handler),
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            AttrValue::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

#[derive(Debug)]
pub enum Child {
    Text(String),
    Element(ElementSpec),
}

/// Ordered description of one element: tag, attributes, children.
#[derive(Debug)]
pub struct ElementSpec {
    pub tag: String,
    pub attrs: Vec<(String, AttrValue)>,
    pub children: Vec<Child>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), AttrValue::Text(value.into())));
        self
    }

    /// Bind `handler` to an event property, e.g. `on("onclick", ..)`.
    pub fn on(mut self, property: impl Into<String>, handler: Handler) -> Self {
        self.attrs.push((property.into(), AttrValue::Handler(handler)));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(Child::Element(child));
        self
    }
}

/// Where a textual attribute lands on the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTarget {
    Attribute(String),
    Property(String),
}

// Names written through setAttribute, with their DOM spelling.
const DIRECT_ATTRIBUTES: &[(&str, &str)] = &[
    ("cellpadding", "cellPadding"),
    ("cellspacing", "cellSpacing"),
    ("colspan", "colSpan"),
    ("frameborder", "frameBorder"),
    ("height", "height"),
    ("maxlength", "maxLength"),
    ("nonce", "nonce"),
    ("role", "role"),
    ("rowspan", "rowSpan"),
    ("type", "type"),
    ("usemap", "useMap"),
    ("valign", "vAlign"),
    ("width", "width"),
];

/// Route an attribute name to either `setAttribute` or a DOM property.
pub fn attr_target(name: &str) -> AttrTarget {
    match name {
        "class" => return AttrTarget::Property("className".to_string()),
        "for" => return AttrTarget::Property("htmlFor".to_string()),
        "style" => return AttrTarget::Attribute("style".to_string()),
        _ => {}
    }
    if let Some((_, dom_name)) = DIRECT_ATTRIBUTES.iter().find(|(n, _)| *n == name) {
        return AttrTarget::Attribute((*dom_name).to_string());
    }
    if name.starts_with("aria-") || name.starts_with("data-") {
        return AttrTarget::Attribute(name.to_string());
    }
    AttrTarget::Property(name.to_string())
}

/// Document operations the page needs.
///
/// `by_id` only sees elements attached to the document; nodes returned by
/// `create_element` stay invisible to it until appended.
pub trait Dom {
    type Node: Clone;

    fn by_id(&self, id: &str) -> Option<Self::Node>;

    fn create_element(&self, tag: &str) -> Result<Self::Node, ClientError>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), ClientError>;

    fn set_property(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), ClientError>;

    /// Replace the handler stored in an event property such as `onclick`.
    fn bind_handler(
        &self,
        node: &Self::Node,
        property: &str,
        handler: Handler,
    ) -> Result<(), ClientError>;

    fn append_text(&self, parent: &Self::Node, text: &str) -> Result<(), ClientError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), ClientError>;

    fn remove_children(&self, node: &Self::Node) -> Result<(), ClientError>;

    /// Current `value` of a form control; empty when it has none.
    fn value(&self, node: &Self::Node) -> String;

    /// Build `spec` into a detached element.
    fn create(&self, spec: &ElementSpec) -> Result<Self::Node, ClientError> {
        let node = self.create_element(&spec.tag)?;
        for (name, value) in &spec.attrs {
            match value {
                AttrValue::Text(v) => match attr_target(name) {
                    AttrTarget::Attribute(n) => self.set_attribute(&node, &n, v)?,
                    AttrTarget::Property(n) => self.set_property(&node, &n, v)?,
                },
                AttrValue::Handler(h) => self.bind_handler(&node, name, Rc::clone(h))?,
            }
        }
        for child in &spec.children {
            match child {
                Child::Text(t) => self.append_text(&node, t)?,
                Child::Element(c) => {
                    let c = self.create(c)?;
                    self.append_child(&node, &c)?;
                }
            }
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDom;

    #[test]
    fn attribute_routing() {
        assert_eq!(attr_target("type"), AttrTarget::Attribute("type".into()));
        assert_eq!(attr_target("colspan"), AttrTarget::Attribute("colSpan".into()));
        assert_eq!(attr_target("data-x"), AttrTarget::Attribute("data-x".into()));
        assert_eq!(attr_target("aria-label"), AttrTarget::Attribute("aria-label".into()));
        assert_eq!(attr_target("class"), AttrTarget::Property("className".into()));
        assert_eq!(attr_target("for"), AttrTarget::Property("htmlFor".into()));
        assert_eq!(attr_target("id"), AttrTarget::Property("id".into()));
        assert_eq!(attr_target("value"), AttrTarget::Property("value".into()));
    }

    #[test]
    fn create_applies_attrs_then_children_in_order() {
        let dom = FakeDom::new();
        let spec = ElementSpec::new("div")
            .attr("id", "outer")
            .attr("class", "box")
            .text("a")
            .child(ElementSpec::new("span").text("b"))
            .text("c");
        let div = dom.create(&spec).unwrap();

        assert_eq!(dom.tag(div).as_deref(), Some("div"));
        assert_eq!(dom.property(div, "id").as_deref(), Some("outer"));
        assert_eq!(dom.property(div, "className").as_deref(), Some("box"));
        assert_eq!(dom.text_content(div), "abc");

        let kids = dom.children(div);
        assert_eq!(kids.len(), 3);
        assert_eq!(dom.tag(kids[1]).as_deref(), Some("span"));
    }

    #[test]
    fn detached_elements_are_not_found_by_id() {
        let dom = FakeDom::new();
        let el = dom.create(&ElementSpec::new("p").attr("id", "floating")).unwrap();
        assert!(dom.by_id("floating").is_none());

        let body = dom.body();
        dom.append_child(&body, &el).unwrap();
        assert_eq!(dom.by_id("floating"), Some(el));
    }

    #[test]
    fn missing_lookup_is_none_not_error() {
        let dom = FakeDom::new();
        assert!(dom.by_id("nope").is_none());
    }
}
