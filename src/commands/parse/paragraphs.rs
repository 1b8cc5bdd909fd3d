use anyhow::{Context, Result};
use regex::Regex;
use tracing::trace;

use crate::markup::{Element, Node};

use super::normalize::BREAK_SENTINEL;
use super::vocabulary::CONSORTIUM_BYLINE;

pub const VALUE_TABLE_PLACEHOLDER: &str = "value-table";

const BLOCK_TAGS: &[&str] = &["p", "table", "ol", "ul"];
const CONTAINER_TAGS: &[&str] = &["li", "td"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub element: Element,
    pub text: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    lines: Vec<Line>,
    is_example: bool,
    is_reference_list: bool,
    is_header: bool,
}

impl Paragraph {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn is_example(&self) -> bool {
        self.is_example
    }

    pub fn is_reference_list(&self) -> bool {
        self.is_reference_list
    }

    pub fn is_header(&self) -> bool {
        self.is_header
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    EnterReferences,
    Relabel(&'static str),
    Drop,
}

struct LineRule {
    name: &'static str,
    pattern: Regex,
    paragraph_start_only: bool,
    action: LineAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleVerdict {
    Example,
    NotExample,
}

struct ExampleRule {
    name: &'static str,
    pattern: Regex,
    paragraph_tag_only: bool,
    verdict: ExampleVerdict,
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("failed to compile {name} regex"))
}

pub struct ParagraphClassifier {
    line_rules: Vec<LineRule>,
    example_rules: Vec<ExampleRule>,
    header_regex: Regex,
    value_table_regexes: Vec<Regex>,
    value_list_first_regex: Regex,
    value_list_next_regex: Regex,
}

impl ParagraphClassifier {
    pub fn new() -> Result<Self> {
        let line_rules = vec![
            LineRule {
                name: "references-marker",
                pattern: compile("references marker", r"^References?$")?,
                paragraph_start_only: false,
                action: LineAction::EnterReferences,
            },
            LineRule {
                name: "numbered-heading",
                pattern: compile("numbered heading", r"^[0-9]+\.\s+[A-Za-z]+(\s+[A-Za-z]+)*$")?,
                paragraph_start_only: true,
                action: LineAction::Relabel("h3"),
            },
            LineRule {
                name: "numbered-subheading",
                pattern: compile("numbered subheading", r"^[0-9]+\.[0-9]+\.\s+[A-Z]")?,
                paragraph_start_only: true,
                action: LineAction::Relabel("h4"),
            },
            LineRule {
                name: "consortium-byline",
                pattern: compile(
                    "consortium byline",
                    &format!("{}$", regex::escape(CONSORTIUM_BYLINE)),
                )?,
                paragraph_start_only: false,
                action: LineAction::Drop,
            },
        ];

        let example_rules = vec![
            ExampleRule {
                name: "value-list-entry",
                pattern: compile("value list entry", r"^[0-9]\.\s+[^\t]+\t[0-9]+$")?,
                paragraph_tag_only: false,
                verdict: ExampleVerdict::NotExample,
            },
            ExampleRule {
                name: "numbered-language-example",
                pattern: compile(
                    "numbered language example",
                    r"^\((?P<no>[0-9]+)\)\s+(?P<lang>[^\(]+)(\((?P<ref>[^0-9]+[0-9]{4}([a-z])?(:\s*[0-9]+)?)\))?$",
                )?,
                paragraph_tag_only: false,
                verdict: ExampleVerdict::Example,
            },
            ExampleRule {
                name: "tabbed-paragraph",
                pattern: compile("tabbed paragraph", r"\t")?,
                paragraph_tag_only: true,
                verdict: ExampleVerdict::Example,
            },
        ];

        Ok(Self {
            line_rules,
            example_rules,
            header_regex: compile("chapter header", r"^Chapter\s+[0-9]+$")?,
            value_table_regexes: vec![
                compile("exclusive value table", r"^[\-\s]+excl\s+")?,
                compile("numbered value table", r"^[\-\s]*1\.[^0-9]+[0-9]+\s+2\.\s+")?,
            ],
            value_list_first_regex: compile("value list head", r"^1\.\s+(.+?)\s+[0-9]+$")?,
            value_list_next_regex: compile("value list item", r"^[0-9]\.\s+(.+?)\s+[0-9]+$")?,
        })
    }

    /// First applicable block rule for a line of text.
    pub fn classify_line(&self, text: &str, at_paragraph_start: bool) -> Option<LineAction> {
        self.line_rules
            .iter()
            .filter(|rule| at_paragraph_start || !rule.paragraph_start_only)
            .find(|rule| rule.pattern.is_match(text))
            .inspect(|rule| trace!(rule = rule.name, text, "line rule matched"))
            .map(|rule| rule.action)
    }

    pub fn example_verdict(&self, text: &str, tag: &str) -> ExampleVerdict {
        self.example_rules
            .iter()
            .filter(|rule| !rule.paragraph_tag_only || tag == "p")
            .find(|rule| rule.pattern.is_match(text))
            .inspect(|rule| trace!(rule = rule.name, text, "example rule matched"))
            .map(|rule| rule.verdict)
            .unwrap_or(ExampleVerdict::NotExample)
    }

    pub fn paragraph(&self, lines: Vec<Line>, reference_list: bool) -> Paragraph {
        let (is_example, is_header) = match lines.first() {
            Some(first) => (
                !reference_list
                    && self.example_verdict(&first.text, &first.tag) == ExampleVerdict::Example,
                self.header_regex.is_match(&first.text),
            ),
            None => (false, false),
        };
        Paragraph {
            lines,
            is_example,
            is_reference_list: reference_list,
            is_header,
        }
    }

    fn is_value_table(&self, text: &str) -> bool {
        self.value_table_regexes
            .iter()
            .any(|regex| regex.is_match(text))
    }

    /// Returns a copy of `root` in which the first value table, whether a real
    /// table or a run of numbered `p` entries, is replaced by a placeholder.
    pub fn collapse_value_tables(&self, root: &Element) -> Element {
        let mut tree = root.clone();
        self.collapse_first_value_table(&mut tree);
        tree
    }

    fn collapse_first_value_table(&self, parent: &mut Element) -> bool {
        for index in 0..parent.children.len() {
            let Node::Element(child) = &parent.children[index] else {
                continue;
            };

            if child.is("table") && self.is_value_table(&child.text()) {
                parent.children[index] = Node::Element(value_table_placeholder());
                return true;
            }

            if child.is("p") && self.value_list_first_regex.is_match(&child.text()) {
                let followers = self.value_list_followers(parent, index);
                if !followers.is_empty() {
                    for follower in followers.into_iter().rev() {
                        parent.children.remove(follower);
                    }
                    parent.children[index] = Node::Element(value_table_placeholder());
                    return true;
                }
            }

            if let Node::Element(child) = &mut parent.children[index]
                && self.collapse_first_value_table(child)
            {
                return true;
            }
        }
        false
    }

    fn value_list_followers(&self, parent: &Element, index: usize) -> Vec<usize> {
        let mut followers = Vec::new();
        for (position, node) in parent.children.iter().enumerate().skip(index + 1) {
            let Node::Element(sibling) = node else {
                continue;
            };
            if !sibling.is("p") || !self.value_list_next_regex.is_match(&sibling.text()) {
                break;
            }
            followers.push(position);
        }
        followers
    }

    /// Lazily segments the block elements below `root` into paragraphs.
    pub fn paragraphs<'a>(&'a self, root: &'a Element) -> Paragraphs<'a> {
        Paragraphs {
            classifier: self,
            stack: vec![Frame {
                element: root,
                next_child: 0,
            }],
            lines: Vec::new(),
            in_references: false,
        }
    }
}

fn value_table_placeholder() -> Element {
    Element::new("p").with_text(VALUE_TABLE_PLACEHOLDER)
}

struct Frame<'a> {
    element: &'a Element,
    next_child: usize,
}

struct Block<'a> {
    element: &'a Element,
    text: String,
    parent: &'a Element,
}

pub struct Paragraphs<'a> {
    classifier: &'a ParagraphClassifier,
    stack: Vec<Frame<'a>>,
    lines: Vec<Line>,
    in_references: bool,
}

impl<'a> Paragraphs<'a> {
    /// Next non-empty block element in document order.
    fn next_block(&mut self) -> Option<Block<'a>> {
        while let Some(frame) = self.stack.last_mut() {
            let parent = frame.element;
            let Some(child) = parent.children.get(frame.next_child) else {
                self.stack.pop();
                continue;
            };
            frame.next_child += 1;
            let Node::Element(child) = child else {
                continue;
            };
            self.stack.push(Frame {
                element: child,
                next_child: 0,
            });

            if BLOCK_TAGS.contains(&child.name.as_str()) {
                let text = child.text();
                if !text.is_empty() {
                    return Some(Block {
                        element: child,
                        text,
                        parent,
                    });
                }
            }
        }
        None
    }
}

impl Iterator for Paragraphs<'_> {
    type Item = Paragraph;

    fn next(&mut self) -> Option<Paragraph> {
        while let Some(block) = self.next_block() {
            if CONTAINER_TAGS.contains(&block.parent.name.as_str()) {
                continue;
            }

            let Block { element, mut text, .. } = block;
            let mut element = element.clone();
            let is_break = text == BREAK_SENTINEL;
            match self
                .classifier
                .classify_line(&text, self.lines.is_empty())
            {
                Some(LineAction::EnterReferences) => {
                    self.in_references = true;
                    text.clear();
                }
                Some(LineAction::Relabel(tag)) => element.name = tag.to_string(),
                Some(LineAction::Drop) => continue,
                None => {}
            }

            let mut flushed = None;
            if is_break && !self.in_references && !self.lines.is_empty() {
                let lines = std::mem::take(&mut self.lines);
                flushed = Some(self.classifier.paragraph(lines, false));
            }

            if !text.is_empty() && !is_break {
                self.lines.push(Line {
                    tag: element.name.clone(),
                    element,
                    text,
                });
            }

            if flushed.is_some() {
                return flushed;
            }
        }

        if self.lines.is_empty() {
            return None;
        }
        let lines = std::mem::take(&mut self.lines);
        Some(self.classifier.paragraph(lines, self.in_references))
    }
}
