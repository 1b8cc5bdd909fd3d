use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{error, info};

use crate::cli::{Family, ParseArgs};
use crate::model::{DocumentMetadata, DocumentOutcome, LinkStats, ParseRunManifest};
use crate::util::{
    decode_html, ensure_directory, list_files, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};

use super::chapter::ChapterFamily;
use super::corpus::Corpus;
use super::family::DocumentFamily;
use super::survey::SurveyFamily;

const MANIFEST_VERSION: u32 = 1;
const SOURCE_EXTENSIONS: &[&str] = &["html", "htm"];

pub fn run(args: ParseArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("parse-{}", utc_compact_string(started_ts));

    let family_root = args.family.root(&args.data_root);
    let source_dir = family_root.join("lo");
    let output_dir = family_root.join("processed");
    let manifest_dir = family_root.join("manifests");
    ensure_directory(&output_dir)?;
    ensure_directory(&manifest_dir)?;

    let corpus = match &args.corpus_db {
        Some(path) => Corpus::load(path)?,
        None => Corpus::empty(),
    };

    let family: Box<dyn DocumentFamily + '_> = match args.family {
        Family::Chapter => Box::new(ChapterFamily::new(&corpus.examples)?),
        Family::Survey => Box::new(SurveyFamily::new(&corpus.languages)?),
    };

    let sources = list_files(&source_dir, SOURCE_EXTENSIONS, &args.in_name)?;
    info!(
        family = args.family.as_str(),
        run_id = %run_id,
        sources = sources.len(),
        "starting parse"
    );

    let mut documents = Vec::with_capacity(sources.len());
    let mut links = LinkStats::default();

    for source in &sources {
        let outcome = match process_document(family.as_ref(), source, &output_dir) {
            Ok(outcome) => {
                links += outcome.links;
                outcome
            }
            Err(err) => {
                error!(source = %source.display(), error = %format!("{err:#}"), "document failed");
                DocumentOutcome {
                    source: source.display().to_string(),
                    sha256: sha256_file(source).ok(),
                    document_id: None,
                    status: "failed".to_string(),
                    error: Some(format!("{err:#}")),
                    links: LinkStats::default(),
                    refs_count: 0,
                }
            }
        };
        documents.push(outcome);
    }

    let failed_count = documents
        .iter()
        .filter(|outcome| outcome.error.is_some())
        .count();

    let manifest = ParseRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        family: args.family.as_str().to_string(),
        status: if failed_count == 0 { "completed" } else { "failed" }.to_string(),
        started_at,
        updated_at: now_utc_string(),
        name_filter: args.in_name.clone(),
        corpus_db_path: args
            .corpus_db
            .as_ref()
            .map(|path| path.display().to_string()),
        document_count: documents.len(),
        failed_count,
        links,
        documents,
    };

    let manifest_path = manifest_dir.join(format!(
        "parse_run_{}.json",
        utc_compact_string(started_ts)
    ));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        documents = manifest.document_count,
        failed = failed_count,
        linked = links.linked,
        not_linked = links.not_linked,
        ambiguous = links.ambiguous,
        manifest = %manifest_path.display(),
        "parse completed"
    );

    if failed_count > 0 {
        bail!(
            "{failed_count} of {} documents failed; see {}",
            manifest.document_count,
            manifest_path.display()
        );
    }

    Ok(())
}

pub(super) fn process_document(
    family: &dyn DocumentFamily,
    source: &Path,
    output_dir: &Path,
) -> Result<DocumentOutcome> {
    let sha256 = sha256_file(source)?;
    let raw = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let html = decode_html(&raw);

    let document_id = family.document_id(source)?;
    let mut metadata = DocumentMetadata::default();
    let processed = family
        .process(&document_id, &html, &mut metadata)
        .with_context(|| format!("failed to restructure {}", source.display()))?;

    let html_path = output_dir.join(format!("{document_id}.html"));
    fs::write(&html_path, processed.html.as_bytes())
        .with_context(|| format!("failed to write {}", html_path.display()))?;
    write_json_pretty(&output_dir.join(format!("{document_id}.json")), &metadata)?;

    info!(
        document = %document_id,
        refs = metadata.refs.len(),
        output = %html_path.display(),
        "document processed"
    );

    Ok(DocumentOutcome {
        source: source.display().to_string(),
        sha256: Some(sha256),
        document_id: Some(document_id),
        status: "processed".to_string(),
        error: None,
        links: processed.links,
        refs_count: metadata.refs.len(),
    })
}
