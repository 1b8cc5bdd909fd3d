use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub refs: Vec<ReferenceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs_comments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub text: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub linked: usize,
    pub not_linked: usize,
    pub ambiguous: usize,
}

impl AddAssign for LinkStats {
    fn add_assign(&mut self, other: Self) {
        self.linked += other.linked;
        self.not_linked += other.not_linked;
        self.ambiguous += other.ambiguous;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub filename: String,
    pub sha256: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub family: String,
    pub started_at: String,
    pub updated_at: String,
    pub source_directory: String,
    pub output_directory: String,
    pub source_count: usize,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub source: String,
    pub sha256: Option<String>,
    pub document_id: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub links: LinkStats,
    pub refs_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub family: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub name_filter: String,
    pub corpus_db_path: Option<String>,
    pub document_count: usize,
    pub failed_count: usize,
    pub links: LinkStats,
    pub documents: Vec<DocumentOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub key: String,
    pub left: String,
    pub right: String,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupReport {
    pub total: usize,
    pub unmatched: usize,
    pub distinct: usize,
    pub threshold: u8,
    pub groups: Vec<DuplicateGroup>,
    pub pairs: Vec<DuplicatePair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefsRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub family: String,
    pub generated_at: String,
    pub name_filter: String,
    pub metadata_files: Vec<String>,
    pub report: DedupReport,
}
