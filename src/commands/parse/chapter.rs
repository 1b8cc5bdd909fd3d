use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::cli::Family;
use crate::markup::Element;
use crate::model::{DocumentMetadata, LinkStats};

use super::chunks::{Chunk, group_examples};
use super::family::{DocumentFamily, Refactored};
use super::linker::ExampleIndex;
use super::normalize::Normalizer;
use super::paragraphs::{Paragraph, ParagraphClassifier};
use super::references::ReferenceParser;

const EXAMPLE_CLASS: &str = "example";
const EXAMPLE_STYLE: &str = "font-size:100%;padding-left:1.8em;margin-left:0.3em";
const HANGING_INDENT: &str = "text-indent:-2em";

pub struct ChapterFamily<'a> {
    normalizer: Normalizer,
    classifier: ParagraphClassifier,
    references: ReferenceParser,
    examples: &'a ExampleIndex,
    numbered_regex: Regex,
}

impl<'a> ChapterFamily<'a> {
    pub fn new(examples: &'a ExampleIndex) -> Result<Self> {
        Ok(Self {
            normalizer: Normalizer::new(Family::Chapter)?,
            classifier: ParagraphClassifier::new()?,
            references: ReferenceParser::new()?,
            examples,
            numbered_regex: Regex::new(r"^\([0-9]+\)")
                .context("failed to compile numbered example regex")?,
        })
    }

    fn example_container(&self, run: Vec<Paragraph>, links: &mut LinkStats) -> Element {
        let mut container = Element::new("blockquote")
            .with_attr("class", EXAMPLE_CLASS)
            .with_attr("style", EXAMPLE_STYLE);
        let mut linked_ids: Vec<String> = Vec::new();

        for paragraph in run {
            for line in paragraph.into_lines() {
                let mut element = line.element;
                if self.numbered_regex.is_match(&line.text) {
                    element.set_attr("style", HANGING_INDENT);
                }
                if let Some(id) = self.examples.link(&line.text, links).example_id()
                    && !linked_ids.iter().any(|known| known == id)
                {
                    linked_ids.push(id.to_string());
                }
                container.push(element);
            }
        }

        if let Some(first) = linked_ids.first() {
            container.set_attr("id", format!("ex-{first}"));
        }
        for id in &linked_ids {
            container.push(
                Element::new("small").with_child(
                    Element::new("a")
                        .with_attr("href", format!("/sentences/{id}"))
                        .with_text(format!("See example {id}")),
                ),
            );
        }
        container
    }
}

impl DocumentFamily for ChapterFamily<'_> {
    fn document_id(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;
        Ok(name.split('.').next().unwrap_or(name).to_string())
    }

    fn preprocess(&self, html: &str) -> String {
        self.normalizer.normalize(html)
    }

    fn refactor(
        &self,
        document_id: &str,
        document: &Element,
        metadata: &mut DocumentMetadata,
    ) -> Result<Refactored> {
        let source = self.classifier.collapse_value_tables(document);
        let mut body = Element::new("body");
        let mut links = LinkStats::default();

        for chunk in group_examples(self.classifier.paragraphs(&source)) {
            match chunk {
                Chunk::Examples(run) => {
                    debug!(document = document_id, paragraphs = run.len(), "example run");
                    let container = self.example_container(run, &mut links);
                    body.push(container);
                }
                Chunk::Paragraph(paragraph) if paragraph.is_header() => {}
                Chunk::Paragraph(paragraph) if paragraph.is_reference_list() => {
                    metadata.refs.extend(
                        paragraph
                            .lines()
                            .iter()
                            .map(|line| self.references.parse(&line.element, None)),
                    );
                }
                Chunk::Paragraph(paragraph) => {
                    for line in paragraph.into_lines() {
                        body.push(line.element);
                    }
                }
            }
        }

        body.unwrap_elements(&|element: &Element| element.is("font"));

        info!(
            document = document_id,
            linked = links.linked,
            not_linked = links.not_linked,
            ambiguous = links.ambiguous,
            refs = metadata.refs.len(),
            "linked example quotations"
        );

        Ok(Refactored { body, links })
    }

    fn postprocess(&self, html: &str) -> String {
        self.normalizer.postprocess(html)
    }
}
