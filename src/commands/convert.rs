use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::{ConvertArgs, Family};
use crate::model::{ConvertRunManifest, SourceEntry};
use crate::util::{
    ensure_directory, list_files, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("convert-{}", utc_compact_string(started_ts));

    let family_root = args.family.root(&args.data_root);
    let source_dir = family_root.join("in");
    let output_dir = family_root.join("lo");
    let manifest_dir = family_root.join("manifests");

    let sources = list_files(&source_dir, source_extensions(args.family), "")?;
    info!(
        family = args.family.as_str(),
        run_id = %run_id,
        sources = sources.len(),
        dry_run = args.dry_run,
        "starting convert"
    );

    if args.dry_run {
        for source in &sources {
            info!(source = %source.display(), "would convert");
        }
        return Ok(());
    }

    ensure_directory(&output_dir)?;
    ensure_directory(&manifest_dir)?;

    let mut entries = Vec::with_capacity(sources.len());
    for source in &sources {
        let sha256 = sha256_file(source)?;
        let output = match args.family {
            Family::Chapter => convert_with_soffice(&args.soffice_bin, source, &output_dir)?,
            Family::Survey => copy_export(source, &output_dir)?,
        };
        info!(source = %source.display(), output = %output.display(), "converted");

        entries.push(SourceEntry {
            filename: file_name(source)?,
            sha256,
            output: output.display().to_string(),
        });
    }

    let manifest = ConvertRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        family: args.family.as_str().to_string(),
        started_at,
        updated_at: now_utc_string(),
        source_directory: source_dir.display().to_string(),
        output_directory: output_dir.display().to_string(),
        source_count: entries.len(),
        sources: entries,
    };

    let manifest_path = manifest_dir.join(format!(
        "convert_run_{}.json",
        utc_compact_string(started_ts)
    ));
    write_json_pretty(&manifest_path, &manifest)?;
    info!(
        sources = manifest.source_count,
        manifest = %manifest_path.display(),
        "convert completed"
    );

    Ok(())
}

fn source_extensions(family: Family) -> &'static [&'static str] {
    match family {
        Family::Chapter => &["doc", "docx"],
        Family::Survey => &["htm", "html"],
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))
}

fn convert_with_soffice(soffice_bin: &str, source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let output = Command::new(soffice_bin)
        .arg("--headless")
        .arg("--convert-to")
        .arg("html")
        .arg("--outdir")
        .arg(output_dir)
        .arg(source)
        .output()
        .with_context(|| format!("failed to execute {soffice_bin} for {}", source.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{soffice_bin} returned non-zero exit status for {}: {}",
            source.display(),
            stderr.trim()
        );
    }

    let mut converted_name = source.file_stem().unwrap_or(source.as_os_str()).to_os_string();
    converted_name.push(".html");
    let converted = output_dir.join(converted_name);
    if !converted.exists() {
        bail!(
            "{soffice_bin} did not produce expected output for {}",
            source.display()
        );
    }

    Ok(converted)
}

fn copy_export(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let target = output_dir.join(file_name(source)?);
    fs::copy(source, &target).with_context(|| {
        format!(
            "failed to copy {} to {}",
            source.display(),
            target.display()
        )
    })?;
    Ok(target)
}
