use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::Family;
use crate::markup::{Element, Node};
use crate::model::{DocumentMetadata, LinkStats};
use crate::util::slug;

use super::corpus::LanguageLookup;
use super::error::RefactorError;
use super::family::{DocumentFamily, Refactored};
use super::normalize::Normalizer;
use super::references::ReferenceParser;
use super::vocabulary::{REFERENCE_CATEGORIES, SURVEY_SECTIONS};

const FRONT_MATTER: [&str; 4] = ["p", "p", "table", "h3"];
const CONTEXT_CHARS: usize = 60;

pub struct SurveyFamily<'a> {
    normalizer: Normalizer,
    references: ReferenceParser,
    languages: &'a LanguageLookup,
    file_name_regex: Regex,
    heading_regex: Regex,
    author_separator_regex: Regex,
}

impl<'a> SurveyFamily<'a> {
    pub fn new(languages: &'a LanguageLookup) -> Result<Self> {
        let sections = SURVEY_SECTIONS
            .iter()
            .map(|section| regex::escape(&section.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            normalizer: Normalizer::new(Family::Survey)?,
            references: ReferenceParser::new()?,
            languages,
            file_name_regex: Regex::new(r"(?P<vol>I+)_(?P<no>[0-9]+)?_(?P<name>[^._]+)")
                .context("failed to compile survey file name regex")?,
            heading_regex: Regex::new(&format!(
                r"^((?P<no>[0-9]+\.(?P<sub>[0-9]+\.?)?)[\s\x{{a0}}]*)?(?P<title>{sections})$"
            ))
            .context("failed to compile section heading regex")?,
            author_separator_regex: Regex::new(r",|&| and ")
                .context("failed to compile author separator regex")?,
        })
    }

    fn promote_headings(&self, parent: &mut Element) {
        let in_cell = parent.is("td");
        for child in parent.children.iter_mut() {
            let Node::Element(element) = child else {
                continue;
            };
            self.promote_headings(element);
            if !element.is("p") {
                continue;
            }
            if element.attr("class") == Some("Zitat") {
                let quote = std::mem::replace(element, Element::new("blockquote"));
                element.push(quote);
                continue;
            }
            if in_cell {
                continue;
            }
            if let Some(captures) = self.heading_regex.captures(&element.text().to_lowercase()) {
                element.name = if captures.name("sub").is_some() {
                    "h2"
                } else {
                    "h1"
                }
                .to_string();
            }
        }
    }

    fn extract_front_matter(
        &self,
        body: &mut Element,
        metadata: &mut DocumentMetadata,
    ) -> Result<(), RefactorError> {
        let path = body
            .position(|element| element.is("div"))
            .ok_or(RefactorError::MissingContainer("div"))?;
        let div = body
            .at_path_mut(&path)
            .ok_or(RefactorError::MissingContainer("div"))?;

        let leading: Vec<(usize, &Element)> = div
            .children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| match child {
                Node::Element(element) => Some((index, element)),
                _ => None,
            })
            .take(FRONT_MATTER.len())
            .collect();

        let found: Vec<&str> = leading
            .iter()
            .map(|(_, element)| element.name.as_str())
            .collect();
        if found != FRONT_MATTER {
            return Err(RefactorError::FrontMatterMismatch {
                expected: FRONT_MATTER.join(", "),
                found: found.join(", "),
                context: describe(leading.iter().map(|(_, element)| *element)),
            });
        }

        metadata.title = Some(leading[0].1.text());
        metadata.authors = self
            .author_separator_regex
            .split(&leading[1].1.text())
            .map(str::trim)
            .filter(|author| !author.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        let mut consumed: Vec<usize> = leading[..3].iter().map(|(index, _)| *index).collect();
        consumed.sort_unstable();
        for index in consumed.into_iter().rev() {
            div.children.remove(index);
        }
        Ok(())
    }

    fn extract_references(
        &self,
        document_id: &str,
        body: &mut Element,
        metadata: &mut DocumentMetadata,
    ) -> Result<(), RefactorError> {
        let Some(path) =
            body.position(|element| element.is("h3") && element.text().starts_with("References"))
        else {
            debug!(document = document_id, "no references section");
            return Ok(());
        };
        let Some((heading_index, parent_path)) = path.split_last() else {
            return Ok(());
        };
        let Some(parent) = body.at_path_mut(parent_path) else {
            return Ok(());
        };

        let mut consumed = vec![*heading_index];
        let mut category: Option<String> = None;

        for (index, child) in parent.children.iter().enumerate().skip(heading_index + 1) {
            let Node::Element(element) = child else {
                continue;
            };
            let text = element.text();
            if text.is_empty() {
                continue;
            }

            if element.is("h3") || element.is("h4") {
                category = Some(text);
                consumed.push(index);
                continue;
            }
            if !element.is("p") {
                continue;
            }

            if REFERENCE_CATEGORIES.contains(&text.as_str()) {
                category = Some(text);
            } else if element.has_class("comment") {
                metadata.refs_comments.push(text);
            } else if text.split_whitespace().count() < 3 {
                return Err(RefactorError::AmbiguousReferenceLine { text });
            } else {
                if !self.references.has_year(&text) {
                    warn!(document = document_id, reference = %text, "reference without year");
                }
                metadata
                    .refs
                    .push(self.references.parse(element, category.as_deref()));
            }
            consumed.push(index);
        }

        for index in consumed.into_iter().rev() {
            parent.children.remove(index);
        }
        Ok(())
    }
}

impl DocumentFamily for SurveyFamily<'_> {
    fn document_id(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;
        let captures = self
            .file_name_regex
            .captures(name)
            .ok_or_else(|| RefactorError::UnrecognizedFileName(name.to_string()))?;

        let volume = captures.name("vol").map_or("", |m| m.as_str());
        let number = captures.name("no").map(|m| m.as_str());
        let language = captures.name("name").map_or("", |m| m.as_str());

        match (self.languages.get(&slug(language)), number) {
            (Some(language_id), Some(number)) => Ok(format!("{language_id}.{volume}-{number}")),
            (Some(language_id), None) => Ok(format!("{language_id}.{volume}")),
            (None, Some(_)) => Err(RefactorError::UnknownLanguage(name.to_string()).into()),
            (None, None) => Ok(format!("{volume}-{language}")),
        }
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
        let mut body = document
            .find_by_name("body")
            .cloned()
            .ok_or(RefactorError::MissingContainer("body"))?;

        let mut clean = |element: &mut Element| {
            clean_style(element);
            element.remove_attr("lang");
        };
        clean(&mut body);
        body.walk_mut(&mut clean);

        body.retain_elements(&|element: &Element| {
            !matches!(element.name.as_str(), "p" | "h1" | "h2") || !element.text().is_empty()
        });

        self.promote_headings(&mut body);
        body.rename_all("h1", "h2");
        body.rename_all("h2", "h3");

        body.unwrap_elements(&|element: &Element| {
            element.is("a")
                && element
                    .attr("name")
                    .is_some_and(|name| name.starts_with("OLE_LINK"))
        });

        if document_id.contains('.') {
            self.extract_front_matter(&mut body, metadata)
                .with_context(|| format!("failed to read front matter of {document_id}"))?;
        }

        self.extract_references(document_id, &mut body, metadata)
            .with_context(|| format!("failed to read references of {document_id}"))?;

        body.wrap_elements(&|element: &Element| element.is("table"), &|| {
            Element::new("div").with_attr("class", "table")
        });

        info!(
            document = document_id,
            refs = metadata.refs.len(),
            comments = metadata.refs_comments.len(),
            "restructured survey"
        );

        Ok(Refactored {
            body,
            links: LinkStats::default(),
        })
    }

    fn postprocess(&self, html: &str) -> String {
        self.normalizer.postprocess(html)
    }
}

pub(super) fn clean_style(element: &mut Element) {
    let Some(style) = element.attr("style") else {
        return;
    };

    let rules: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .map(|rule| match rule {
            "tab-stops:14.2pt" | "text-indent:36.0pt" => "margin-top:0.4em",
            other => other,
        })
        .filter(|rule| !rule.is_empty() && !rule.starts_with("mso-"))
        .filter(|rule| {
            let compact: String = rule.chars().filter(|ch| !ch.is_whitespace()).collect();
            compact != "font-family:Junicode" && compact != "font-family:JunicodeRegular"
        })
        .collect();

    if rules.is_empty() {
        element.remove_attr("style");
    } else {
        let cleaned = rules.join(";");
        element.set_attr("style", cleaned);
    }
}

fn describe<'e>(elements: impl Iterator<Item = &'e Element>) -> String {
    elements
        .map(|element| {
            let text: String = element.text().chars().take(CONTEXT_CHARS).collect();
            format!("<{}> {:?}", element.name, text)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
