use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::util::slug;

use super::linker::ExampleIndex;

/// Language slug to language id.
pub type LanguageLookup = HashMap<String, String>;

#[derive(Debug, Default)]
pub struct Corpus {
    pub examples: ExampleIndex,
    pub languages: LanguageLookup,
}

impl Corpus {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(db_path: &Path) -> Result<Self> {
        let connection = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open corpus {}", db_path.display()))?;

        let mut examples = ExampleIndex::new();
        for (id, name) in id_name_pairs(&connection, "sentence")? {
            examples.insert(&name, id);
        }

        let languages: LanguageLookup = id_name_pairs(&connection, "language")?
            .into_iter()
            .map(|(id, name)| (slug(&name), id))
            .collect();

        info!(
            corpus = %db_path.display(),
            example_slugs = examples.len(),
            languages = languages.len(),
            "loaded corpus"
        );

        Ok(Self {
            examples,
            languages,
        })
    }
}

fn id_name_pairs(connection: &Connection, table: &str) -> Result<Vec<(String, String)>> {
    let mut statement = connection
        .prepare(&format!(
            "
            SELECT CAST(id AS TEXT), name
            FROM {table}
            WHERE name IS NOT NULL
            ORDER BY id
            "
        ))
        .with_context(|| format!("failed to query corpus table {table}"))?;

    let mut rows = statement.query([])?;
    let mut pairs = Vec::new();

    while let Some(row) = rows.next()? {
        pairs.push((row.get(0)?, row.get(1)?));
    }

    Ok(pairs)
}
