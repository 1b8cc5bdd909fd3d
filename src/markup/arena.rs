//! Arena that html5ever parses into before the document is lowered to an owned tree.

use html5ever::QualName;

use super::{Element, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Doctype,
}

#[derive(Debug)]
pub struct ArenaNode {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Flat node storage with parent/child links by index.
#[derive(Debug)]
pub struct Arena {
    nodes: Vec<ArenaNode>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        let mut arena = Self { nodes: Vec::new() };
        arena.alloc(NodeData::Document);
        arena
    }

    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ArenaNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<(String, String)>) -> NodeId {
        self.alloc(NodeData::Element { name, attrs })
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(NodeData::Text(text))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(NodeData::Comment(text))
    }

    pub fn create_doctype(&mut self) -> NodeId {
        self.alloc(NodeData::Doctype)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Appends text, merging into the last child when it is already a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.nodes[parent.0].children.last()
            && let NodeData::Text(existing) = &mut self.nodes[last.0].data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let Some(parent) = self.nodes[sibling.0].parent else {
            return;
        };
        self.detach(new_node);
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|&id| id == sibling)
            .unwrap_or(siblings.len());
        siblings.insert(position, new_node);
        self.nodes[new_node.0].parent = Some(parent);
    }

    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        let Some(parent) = self.nodes[sibling.0].parent else {
            return;
        };
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == sibling);
        if let Some(position) = position
            && position > 0
        {
            let previous = self.nodes[parent.0].children[position - 1];
            if let NodeData::Text(existing) = &mut self.nodes[previous.0].data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create_text(text.to_string());
        self.insert_before(sibling, node);
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in children {
            self.nodes[child.0].parent = Some(to);
            self.nodes[to.0].children.push(child);
        }
    }

    pub fn add_attrs_if_missing(&mut self, id: NodeId, extra: Vec<(String, String)>) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            for (name, value) in extra {
                if !attrs.iter().any(|(existing, _)| *existing == name) {
                    attrs.push((name, value));
                }
            }
        }
    }

    /// Lowers the first root element (normally `html`) into an owned tree.
    pub fn to_tree(&self) -> Element {
        let root = self.nodes[self.document().0]
            .children
            .iter()
            .copied()
            .find(|&id| matches!(self.nodes[id.0].data, NodeData::Element { .. }));
        match root.and_then(|id| self.lower(id)) {
            Some(Node::Element(element)) => element,
            _ => Element::new("html"),
        }
    }

    fn lower(&self, id: NodeId) -> Option<Node> {
        match &self.nodes[id.0].data {
            NodeData::Element { name, attrs } => {
                let children = self.nodes[id.0]
                    .children
                    .iter()
                    .filter_map(|&child| self.lower(child))
                    .collect();
                Some(Node::Element(Element {
                    name: name.local.to_string(),
                    attrs: attrs.clone(),
                    children,
                }))
            }
            NodeData::Text(text) => Some(Node::Text(text.clone())),
            NodeData::Comment(text) => Some(Node::Comment(text.clone())),
            NodeData::Document | NodeData::Doctype => None,
        }
    }
}
