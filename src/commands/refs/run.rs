use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::RefsArgs;
use crate::model::{DocumentMetadata, ReferenceRecord, RefsRunManifest};
use crate::util::{
    ensure_directory, list_files, now_utc_string, read_json, utc_compact_string,
    write_json_pretty,
};

use super::dedup::deduplicate;
use super::resolve::{ReferenceResolver, StructuredFieldResolver};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: RefsArgs) -> Result<()> {
    let generated_ts = Utc::now();
    let family_root = args.family.root(&args.data_root);
    let processed_dir = family_root.join("processed");
    let manifest_dir = family_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let metadata_files = list_files(&processed_dir, &["json"], &args.in_name)?;
    let mut records: Vec<ReferenceRecord> = Vec::new();
    for path in &metadata_files {
        let metadata: DocumentMetadata = read_json(path)?;
        records.extend(metadata.refs);
    }

    info!(
        family = args.family.as_str(),
        files = metadata_files.len(),
        references = records.len(),
        "collected references"
    );

    let resolved = StructuredFieldResolver.resolve_all(&records);
    let report = deduplicate(&resolved, args.similarity_threshold);

    for pair in &report.pairs {
        warn!(
            key = %pair.key,
            left = %pair.left,
            right = %pair.right,
            score = pair.score,
            "possible duplicate reference"
        );
    }

    info!(
        total = report.total,
        unmatched = report.unmatched,
        distinct = report.distinct,
        duplicate_candidates = report.pairs.len(),
        "reference report"
    );

    let manifest = RefsRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id: format!("refs-{}", utc_compact_string(generated_ts)),
        family: args.family.as_str().to_string(),
        generated_at: now_utc_string(),
        name_filter: args.in_name.clone(),
        metadata_files: metadata_files
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        report,
    };

    let report_path = args.report_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "refs_report_{}.json",
            utc_compact_string(generated_ts)
        ))
    });
    write_json_pretty(&report_path, &manifest)?;
    info!(report = %report_path.display(), "wrote reference report");

    Ok(())
}
