//! Owned markup tree used by the restructuring pipeline.
//!
//! Documents are parsed with html5ever into an [`arena::Arena`] and lowered into
//! plain [`Element`] values. Every rewrite pass works on a clone, so the tree a
//! pass reads from is never the tree it writes to.

mod arena;
mod tree_sink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use self::tree_sink::ArenaSink;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Parses an HTML document and returns its root (`html`) element.
pub fn parse_html(html: &str) -> Element {
    let sink = ArenaSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_arena()
        .to_tree()
}

/// Collapses spaces, newlines and non-breaking spaces into single spaces.
/// Tabs are kept because the classifier treats them as layout signals.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        match ch {
            ' ' | '\n' | '\r' | '\u{a0}' | '\u{c}' => pending_space = true,
            _ => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
            }
        }
    }
    out
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Normalized text content of the element and all its descendants.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        normalize_text(&raw)
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.collect_text(out),
                Node::Text(text) => out.push_str(text),
                Node::Comment(_) => {}
            }
        }
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First descendant in document order satisfying the predicate.
    pub fn find<F>(&self, predicate: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool + Copy,
    {
        for child in self.element_children() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Element> {
        self.find(|element| element.is(name))
    }

    /// Child-index path of the first descendant satisfying the predicate, in
    /// document order. Indices address `children`, text nodes included.
    pub fn position<F>(&self, predicate: F) -> Option<Vec<usize>>
    where
        F: Fn(&Element) -> bool + Copy,
    {
        for (index, child) in self.children.iter().enumerate() {
            let Node::Element(element) = child else {
                continue;
            };
            if predicate(element) {
                return Some(vec![index]);
            }
            if let Some(mut path) = element.position(predicate) {
                path.insert(0, index);
                return Some(path);
            }
        }
        None
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        match self.children.get_mut(*first) {
            Some(Node::Element(element)) => element.at_path_mut(rest),
            _ => None,
        }
    }

    /// Visits every descendant element in document order.
    pub fn walk_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Element),
    {
        for child in self.children.iter_mut() {
            if let Node::Element(element) = child {
                visit(element);
                element.walk_mut(visit);
            }
        }
    }

    pub fn rename_all(&mut self, from: &str, to: &str) {
        self.walk_mut(&mut |element: &mut Element| {
            if element.is(from) {
                element.name = to.to_string();
            }
        });
    }

    /// Drops descendant elements for which `keep` returns false.
    pub fn retain_elements<F>(&mut self, keep: &F)
    where
        F: Fn(&Element) -> bool,
    {
        self.children.retain(|child| match child {
            Node::Element(element) => keep(element),
            _ => true,
        });
        for child in self.children.iter_mut() {
            if let Node::Element(element) = child {
                element.retain_elements(keep);
            }
        }
    }

    /// Replaces matching descendants by their children, preserving order.
    pub fn unwrap_elements<F>(&mut self, matches: &F)
    where
        F: Fn(&Element) -> bool,
    {
        let children = std::mem::take(&mut self.children);
        for child in children {
            match child {
                Node::Element(mut element) => {
                    element.unwrap_elements(matches);
                    if matches(&element) {
                        self.children.extend(element.children);
                    } else {
                        self.children.push(Node::Element(element));
                    }
                }
                other => self.children.push(other),
            }
        }
    }

    /// Wraps each matching descendant into the element produced by `wrapper`.
    pub fn wrap_elements<F, W>(&mut self, matches: &F, wrapper: &W)
    where
        F: Fn(&Element) -> bool,
        W: Fn() -> Element,
    {
        for child in self.children.iter_mut() {
            if let Node::Element(element) = child {
                element.wrap_elements(matches, wrapper);
                if matches(element) {
                    let inner = std::mem::replace(element, wrapper());
                    element.push(inner);
                }
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.name.as_str()) {
            return;
        }
        self.write_children(out);
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    fn write_children(&self, out: &mut String) {
        let raw = RAW_TEXT_ELEMENTS.contains(&self.name.as_str());
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_html(out),
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
