use crate::model::ReferenceRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub key: String,
    pub title: String,
    pub unmatched: bool,
}

/// Turns an extracted reference into a bibliographic key and title.
pub trait ReferenceResolver {
    fn resolve(&self, index: usize, record: &ReferenceRecord) -> ResolvedReference;

    fn resolve_all(&self, records: &[ReferenceRecord]) -> Vec<ResolvedReference> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.resolve(index, record))
            .collect()
    }
}

/// Uses the key and title parsed at extraction time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredFieldResolver;

impl ReferenceResolver for StructuredFieldResolver {
    fn resolve(&self, index: usize, record: &ReferenceRecord) -> ResolvedReference {
        match (&record.key, &record.title) {
            (Some(key), Some(title)) => ResolvedReference {
                key: key.clone(),
                title: title.clone(),
                unmatched: false,
            },
            _ => ResolvedReference {
                key: format!("unkeyed-{index}"),
                title: record.title.clone().unwrap_or_else(|| record.text.clone()),
                unmatched: true,
            },
        }
    }
}
