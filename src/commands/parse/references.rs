use anyhow::{Context, Result};
use regex::Regex;

use crate::markup::Element;
use crate::model::ReferenceRecord;
use crate::util::slug;

pub struct ReferenceParser {
    line_regex: Regex,
    year_regex: Regex,
    title_end_regex: Regex,
}

impl ReferenceParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            line_regex: Regex::new(
                r"^(?P<authors>.+?)[.,]?\s+\(?(?P<year>[0-9]{4}[a-z]?|n\.d\.|forthcoming)\)?[.:,]?\s+(?P<title>.+)$",
            )
            .context("failed to compile reference line regex")?,
            year_regex: Regex::new(r"\b[0-9]{4}[a-z]?\b")
                .context("failed to compile reference year regex")?,
            title_end_regex: Regex::new(r"[.?!]\s")
                .context("failed to compile title boundary regex")?,
        })
    }

    pub fn has_year(&self, text: &str) -> bool {
        self.year_regex.is_match(text)
    }

    pub fn parse(&self, element: &Element, category: Option<&str>) -> ReferenceRecord {
        let text = element.text();
        let mut record = ReferenceRecord {
            html: element.inner_html(),
            category: category.map(ToOwned::to_owned),
            ..ReferenceRecord::default()
        };

        if let Some(captures) = self.line_regex.captures(&text) {
            let authors = captures.name("authors").map_or("", |m| m.as_str());
            let year = captures.name("year").map_or("", |m| m.as_str());
            let title = captures.name("title").map_or("", |m| m.as_str());

            let surname = first_surname(authors);
            if !surname.is_empty() {
                record.key = Some(format!("{}{}", slug(surname), slug(year)));
            }
            record.year = Some(year.to_string());
            record.title = Some(self.title_of(title)).filter(|title| !title.is_empty());
        }

        record.text = text;
        record
    }

    fn title_of(&self, rest: &str) -> String {
        let end = self
            .title_end_regex
            .find(rest)
            .map(|m| m.start() + 1)
            .unwrap_or(rest.len());
        rest[..end].trim().trim_end_matches('.').to_string()
    }
}

fn first_surname(authors: &str) -> &str {
    let first = authors
        .split(" and ")
        .next()
        .and_then(|author| author.split('&').next())
        .unwrap_or(authors)
        .trim();
    match first.split_once(',') {
        Some((surname, _)) => surname.trim(),
        None => first.split_whitespace().last().unwrap_or(first),
    }
}
