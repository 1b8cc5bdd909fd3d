use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::{DedupReport, DuplicateGroup, DuplicatePair};
use crate::util::{slug, slug_preserving_whitespace};

use super::resolve::ResolvedReference;
use super::similarity::partial_ratio;

pub fn deduplicate(references: &[ResolvedReference], threshold: u8) -> DedupReport {
    let unmatched = references
        .iter()
        .filter(|reference| reference.unmatched)
        .count();

    let distinct: BTreeSet<(String, String)> = references
        .iter()
        .map(|reference| {
            (
                slug(&reference.key),
                slug_preserving_whitespace(&reference.title),
            )
        })
        .collect();

    let mut by_key: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for reference in references.iter().filter(|reference| !reference.unmatched) {
        by_key
            .entry(slug(&reference.key))
            .or_default()
            .insert(reference.title.as_str());
    }

    let mut groups = Vec::new();
    let mut pairs = Vec::new();

    for (key, titles) in by_key {
        if titles.len() < 2 {
            continue;
        }
        let titles: Vec<&str> = titles.into_iter().collect();

        for (offset, left) in titles.iter().enumerate() {
            for right in &titles[offset + 1..] {
                let score = partial_ratio(
                    &slug_preserving_whitespace(left),
                    &slug_preserving_whitespace(right),
                );
                debug!(key = %key, left, right, score, "compared titles");
                if score > threshold {
                    pairs.push(DuplicatePair {
                        key: key.clone(),
                        left: left.to_string(),
                        right: right.to_string(),
                        score,
                    });
                }
            }
        }

        groups.push(DuplicateGroup {
            key,
            titles: titles.into_iter().map(ToOwned::to_owned).collect(),
        });
    }

    DedupReport {
        total: references.len(),
        unmatched,
        distinct: distinct.len(),
        threshold,
        groups,
        pairs,
    }
}
