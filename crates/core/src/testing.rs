//! In-memory platform used by the host tests.
//!
//! `FakeDom` is a tiny arena document: nodes are indices, `by_id` only walks
//! nodes reachable from `body`, and `click` runs the bound `onclick` handler the
//! way a browser would.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::{Dom, Handler};
use crate::error::ClientError;
use crate::http::{deliver_on_success, Transport, TriggerRequest};
use crate::page::Console;
use crate::socket::{LogSocket, SocketEvent};

pub type NodeId = usize;

enum NodeKind {
    Element(String),
    Text(String),
}

struct FakeNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    properties: BTreeMap<String, String>,
    handlers: BTreeMap<String, Handler>,
}

impl FakeNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.properties
            .get("id")
            .or_else(|| self.attributes.get("id"))
            .map(String::as_str)
    }
}

#[derive(Clone)]
pub struct FakeDom {
    nodes: Rc<RefCell<Vec<FakeNode>>>,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDom {
    /// A document holding a single `body` element.
    pub fn new() -> Self {
        Self {
            nodes: Rc::new(RefCell::new(vec![FakeNode::new(NodeKind::Element(
                "body".to_string(),
            ))])),
        }
    }

    pub fn body(&self) -> NodeId {
        0
    }

    fn push(&self, node: FakeNode) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        nodes.len() - 1
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(old) = nodes[child].parent.take() {
            nodes[old].children.retain(|&c| c != child);
        }
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }

    /// Append a new element under `parent`, optionally with an `id`.
    pub fn add_element(&self, parent: NodeId, tag: &str, id: Option<&str>) -> NodeId {
        let mut node = FakeNode::new(NodeKind::Element(tag.to_string()));
        if let Some(id) = id {
            node.properties.insert("id".to_string(), id.to_string());
        }
        let n = self.push(node);
        self.attach(parent, n);
        n
    }

    pub fn add_text(&self, parent: NodeId, text: &str) -> NodeId {
        let n = self.push(FakeNode::new(NodeKind::Text(text.to_string())));
        self.attach(parent, n);
        n
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow()[node].kind {
            NodeKind::Element(tag) => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node].children.clone()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node].attributes.get(name).cloned()
    }

    pub fn property(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node].properties.get(name).cloned()
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let NodeKind::Text(t) = &nodes[n].kind {
                out.push_str(t);
            }
            stack.extend(nodes[n].children.iter().rev());
        }
        out
    }

    pub fn set_value(&self, node: NodeId, value: &str) {
        self.nodes.borrow_mut()[node]
            .properties
            .insert("value".to_string(), value.to_string());
    }

    /// Run the node's `onclick` handler, if any.
    pub fn click(&self, node: NodeId) {
        let handler = self.nodes.borrow()[node].handlers.get("onclick").cloned();
        if let Some(h) = handler {
            h();
        }
    }

    fn attached(&self) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![self.body()];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(nodes[n].children.iter().rev());
        }
        out
    }

    /// Handlers bound on nodes currently reachable from `body`.
    pub fn attached_handler_count(&self) -> usize {
        let attached = self.attached();
        let nodes = self.nodes.borrow();
        attached.iter().map(|&n| nodes[n].handlers.len()).sum()
    }

    fn element(&self, node: NodeId) -> Result<(), ClientError> {
        match self.nodes.borrow().get(node).map(|n| &n.kind) {
            Some(NodeKind::Element(_)) => Ok(()),
            Some(NodeKind::Text(_)) => Err(ClientError::Dom(format!("node {node} is text"))),
            None => Err(ClientError::Dom(format!("no node {node}"))),
        }
    }
}

impl Dom for FakeDom {
    type Node = NodeId;

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let attached = self.attached();
        let nodes = self.nodes.borrow();
        attached.into_iter().find(|&n| nodes[n].id() == Some(id))
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, ClientError> {
        if tag.is_empty() {
            return Err(ClientError::Dom("empty tag".to_string()));
        }
        Ok(self.push(FakeNode::new(NodeKind::Element(tag.to_string()))))
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), ClientError> {
        self.element(*node)?;
        self.nodes.borrow_mut()[*node]
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_property(&self, node: &NodeId, name: &str, value: &str) -> Result<(), ClientError> {
        self.element(*node)?;
        self.nodes.borrow_mut()[*node]
            .properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn bind_handler(
        &self,
        node: &NodeId,
        property: &str,
        handler: Handler,
    ) -> Result<(), ClientError> {
        self.element(*node)?;
        self.nodes.borrow_mut()[*node]
            .handlers
            .insert(property.to_string(), handler);
        Ok(())
    }

    fn append_text(&self, parent: &NodeId, text: &str) -> Result<(), ClientError> {
        self.element(*parent)?;
        self.add_text(*parent, text);
        Ok(())
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), ClientError> {
        self.element(*parent)?;
        if self.nodes.borrow().get(*child).is_none() {
            return Err(ClientError::Dom(format!("no node {child}")));
        }
        self.attach(*parent, *child);
        Ok(())
    }

    fn remove_children(&self, node: &NodeId) -> Result<(), ClientError> {
        self.element(*node)?;
        let mut nodes = self.nodes.borrow_mut();
        let kids = std::mem::take(&mut nodes[*node].children);
        for k in kids {
            nodes[k].parent = None;
        }
        Ok(())
    }

    fn value(&self, node: &NodeId) -> String {
        self.property(*node, "value").unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Text(String),
    Object(String),
}

/// Records every console call. Objects are plain strings.
#[derive(Clone, Default)]
pub struct FakeConsole {
    lines: Rc<RefCell<Vec<LogLine>>>,
}

impl FakeConsole {
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.borrow().clone()
    }
}

impl Console for FakeConsole {
    type Object = String;

    fn log(&self, text: &str) {
        self.lines.borrow_mut().push(LogLine::Text(text.to_string()));
    }

    fn log_obj(&self, obj: &String) {
        self.lines.borrow_mut().push(LogLine::Object(obj.clone()));
    }
}

struct Pending {
    request: TriggerRequest,
    on_success: Option<Box<dyn FnOnce(String)>>,
}

/// Holds sent requests until the test completes them with a status.
#[derive(Clone, Default)]
pub struct FakeTransport {
    sent: Rc<RefCell<Vec<Pending>>>,
}

impl FakeTransport {
    pub fn requests(&self) -> Vec<TriggerRequest> {
        self.sent.borrow().iter().map(|p| p.request.clone()).collect()
    }

    /// Finish request `handle` the way a real transport does.
    pub fn complete(&self, handle: usize, status: u16, response: &str) {
        let mut cb = self
            .sent
            .borrow_mut()
            .get_mut(handle)
            .and_then(|p| p.on_success.take());
        deliver_on_success(status, response.to_string(), &mut cb);
    }
}

impl Transport for FakeTransport {
    type Response = String;
    type Handle = usize;

    fn send(
        &self,
        request: TriggerRequest,
        on_success: Box<dyn FnOnce(String)>,
    ) -> Result<usize, ClientError> {
        let mut sent = self.sent.borrow_mut();
        sent.push(Pending {
            request,
            on_success: Some(on_success),
        });
        Ok(sent.len() - 1)
    }
}

#[derive(Default)]
struct SocketInner {
    opened: Vec<String>,
    listener: Option<Box<dyn FnMut(SocketEvent<String>)>>,
}

/// Remembers the opened URL and lets the test push lifecycle events.
#[derive(Clone, Default)]
pub struct FakeSocket {
    inner: Rc<RefCell<SocketInner>>,
}

impl FakeSocket {
    pub fn opened_urls(&self) -> Vec<String> {
        self.inner.borrow().opened.clone()
    }

    pub fn emit(&self, event: SocketEvent<String>) {
        let listener = self.inner.borrow_mut().listener.take();
        if let Some(mut l) = listener {
            l(event);
            self.inner.borrow_mut().listener = Some(l);
        }
    }
}

impl LogSocket for FakeSocket {
    type Error = String;
    type Connection = ();

    fn open(
        &self,
        url: &str,
        listener: Box<dyn FnMut(SocketEvent<String>)>,
    ) -> Result<(), ClientError> {
        let mut inner = self.inner.borrow_mut();
        inner.opened.push(url.to_string());
        inner.listener = Some(listener);
        Ok(())
    }
}
