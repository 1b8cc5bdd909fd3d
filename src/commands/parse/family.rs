use std::path::Path;

use anyhow::Result;

use crate::markup::{Element, parse_html};
use crate::model::{DocumentMetadata, LinkStats};

#[derive(Debug, Clone)]
pub struct Refactored {
    pub body: Element,
    pub links: LinkStats,
}

#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub html: String,
    pub links: LinkStats,
}

pub trait DocumentFamily {
    fn document_id(&self, path: &Path) -> Result<String>;

    fn preprocess(&self, html: &str) -> String;

    fn refactor(
        &self,
        document_id: &str,
        document: &Element,
        metadata: &mut DocumentMetadata,
    ) -> Result<Refactored>;

    fn postprocess(&self, html: &str) -> String;

    fn process(
        &self,
        document_id: &str,
        html: &str,
        metadata: &mut DocumentMetadata,
    ) -> Result<ProcessedDocument> {
        let document = parse_html(&self.preprocess(html));
        let refactored = self.refactor(document_id, &document, metadata)?;
        Ok(ProcessedDocument {
            html: self.postprocess(&refactored.body.to_html()),
            links: refactored.links,
        })
    }
}
