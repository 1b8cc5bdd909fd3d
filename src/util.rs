use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use regex::bytes::Regex;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static CHARSET_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i-u)<meta[^>]*charset\s*=\s*["']?([A-Za-z0-9_.:-]+)"#).ok());

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Decodes an HTML export. Valid UTF-8 is taken as is; otherwise the
/// `<meta>` charset label is honoured, falling back to windows-1252.
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(encoding) = declared_charset(bytes).and_then(encoding_rs::Encoding::for_label) {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

fn declared_charset(bytes: &[u8]) -> Option<&[u8]> {
    let regex = CHARSET_REGEX.as_ref()?;
    regex
        .captures(bytes)
        .and_then(|captures| captures.get(1))
        .map(|label| label.as_bytes())
}

pub fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))
}

/// Regular files in `dir` whose extension is one of `extensions` (case-insensitive)
/// and whose stem contains `name_filter`, sorted by path.
pub fn list_files(dir: &Path, extensions: &[&str], name_filter: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
            .unwrap_or(false);
        if !matches_extension {
            continue;
        }

        if file_stem(&path)?.contains(name_filter) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

pub fn slug(text: &str) -> String {
    slugify(text, true)
}

pub fn slug_preserving_whitespace(text: &str) -> String {
    slugify(text, false)
}

/// Lowercase ASCII slug: decomposes, drops combining marks, then keeps
/// only ASCII letters and digits.
fn slugify(text: &str, remove_whitespace: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.nfd().filter(|ch| !is_combining_mark(*ch)) {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            continue;
        }
        if pending_space && !remove_whitespace && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch.to_ascii_lowercase());
    }
    out
}
