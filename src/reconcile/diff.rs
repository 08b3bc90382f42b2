// ABOUTME: Inventory differ over rendered manifest documents and values text.
// ABOUTME: Produces a changed flag and a line-oriented report with context elision.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_yaml::Value;
use similar::{ChangeTag, TextDiff};

use crate::types::{Namespace, ReleaseName};

use super::error::ReconcileError;

/// Options controlling diff output.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Kinds whose content is never printed; the report carries a one-line
    /// suppression notice instead. Secrets are the usual entry here.
    pub suppressed_kinds: Vec<String>,
    /// Lines of unchanged context to keep around each change. `None` prints
    /// every line; `Some(0)` prints only changed lines.
    pub context_lines: Option<usize>,
}

/// Result of diffing one release: the changed flag and the report text.
#[derive(Debug, Clone, Default)]
pub struct ReleaseDiff {
    pub changed: bool,
    pub report: String,
}

/// One parsed manifest sub-document, keyed by its identity fields.
#[derive(Debug, Clone)]
struct MappingResult {
    kind: String,
    raw: String,
}

/// Diff a release's rendered manifest and raw values against a proposed
/// rendering.
///
/// `changed` is the logical OR of any manifest key being added, removed, or
/// modified and the raw values text differing. A values-only change with
/// identical rendered manifests still reports `changed = true`.
pub fn diff_release(
    release: &ReleaseName,
    namespace: &Namespace,
    current_manifest: &str,
    proposed_manifest: &str,
    current_values: &str,
    proposed_values: &str,
    opts: &DiffOptions,
) -> Result<ReleaseDiff, ReconcileError> {
    let (mut changed, mut report) =
        diff_manifests(release, namespace, current_manifest, proposed_manifest, opts)?;

    if current_values != proposed_values {
        changed = true;
        writeln!(report, "values have changed").expect("writing to String cannot fail");
        write_line_diff(&mut report, current_values, proposed_values, opts.context_lines);
    }

    Ok(ReleaseDiff { changed, report })
}

/// Diff two rendered manifest texts, ignoring values. Returns the changed
/// flag and the report accumulated so far.
pub fn diff_manifests(
    release: &ReleaseName,
    namespace: &Namespace,
    current: &str,
    proposed: &str,
    opts: &DiffOptions,
) -> Result<(bool, String), ReconcileError> {
    let current_map = build_mappings(release, namespace, current)?;
    let proposed_map = build_mappings(release, namespace, proposed)?;

    let mut keys: Vec<&String> = current_map.keys().chain(proposed_map.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut changed = false;
    let mut report = String::new();

    for key in keys {
        match (current_map.get(key), proposed_map.get(key)) {
            (Some(old), None) => {
                changed = true;
                write_section(&mut report, key, old, "has been removed", &old.raw, "", opts);
            }
            (None, Some(new)) => {
                changed = true;
                write_section(&mut report, key, new, "has been added", "", &new.raw, opts);
            }
            (Some(old), Some(new)) if old.raw != new.raw => {
                changed = true;
                write_section(&mut report, key, new, "has changed", &old.raw, &new.raw, opts);
            }
            _ => {}
        }
    }

    Ok((changed, report))
}

fn write_section(
    out: &mut String,
    key: &str,
    mapping: &MappingResult,
    verb: &str,
    old: &str,
    new: &str,
    opts: &DiffOptions,
) {
    if opts.suppressed_kinds.iter().any(|k| k == &mapping.kind) {
        writeln!(
            out,
            "{} {} (changes suppressed for kind {})",
            key, verb, mapping.kind
        )
        .expect("writing to String cannot fail");
        return;
    }

    writeln!(out, "{} {}", key, verb).expect("writing to String cannot fail");
    write_line_diff(out, old, new, opts.context_lines);
}

/// Emit a line diff with `+`/`-`/two-space prefixes, eliding unchanged lines
/// farther than `context` from the nearest change.
fn write_line_diff(out: &mut String, old: &str, new: &str, context: Option<usize>) {
    let diff = TextDiff::from_lines(old, new);
    let records: Vec<(ChangeTag, String)> = diff
        .iter_all_changes()
        .map(|c| (c.tag(), c.value().trim_end_matches('\n').to_string()))
        .collect();

    if records.iter().all(|(tag, _)| *tag == ChangeTag::Equal) {
        return;
    }

    let include = match context {
        None => vec![true; records.len()],
        Some(context) => within_context(&records, context),
    };

    let mut elided = false;
    for (keep, (tag, line)) in include.iter().zip(records.iter()) {
        if !keep {
            if !elided {
                writeln!(out, "...").expect("writing to String cannot fail");
                elided = true;
            }
            continue;
        }
        elided = false;

        let prefix = match tag {
            ChangeTag::Equal => "  ",
            ChangeTag::Delete => "- ",
            ChangeTag::Insert => "+ ",
        };
        writeln!(out, "{}{}", prefix, line).expect("writing to String cannot fail");
    }
}

/// For each record, whether it lies within `context` lines of a change in
/// either direction.
fn within_context(records: &[(ChangeTag, String)], context: usize) -> Vec<bool> {
    let far = records.len();
    let mut distance = vec![far; records.len()];

    let mut last_change = None;
    for (i, (tag, _)) in records.iter().enumerate() {
        if *tag != ChangeTag::Equal {
            last_change = Some(i);
        }
        if let Some(c) = last_change {
            distance[i] = distance[i].min(i - c);
        }
    }

    last_change = None;
    for (i, (tag, _)) in records.iter().enumerate().rev() {
        if *tag != ChangeTag::Equal {
            last_change = Some(i);
        }
        if let Some(c) = last_change {
            distance[i] = distance[i].min(c - i);
        }
    }

    distance.into_iter().map(|d| d <= context).collect()
}

/// Split a manifest text on the `---` document separator and key each
/// sub-document by namespace, name, kind, and API group.
fn build_mappings(
    release: &ReleaseName,
    default_namespace: &Namespace,
    text: &str,
) -> Result<BTreeMap<String, MappingResult>, ReconcileError> {
    let mut mappings = BTreeMap::new();

    for doc in split_documents(text) {
        let value: Value =
            serde_yaml::from_str(&doc).map_err(|source| ReconcileError::ManifestParse {
                release: release.to_string(),
                source,
            })?;

        // Comment-only or null documents carry no resource.
        let Value::Mapping(_) = value else { continue };

        let kind = required_str(&value, "kind", release)?;
        let api_version = required_str(&value, "apiVersion", release)?;
        let group = match api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        };

        let metadata = &value["metadata"];
        let name = metadata["name"]
            .as_str()
            .ok_or(ReconcileError::MissingField {
                release: release.to_string(),
                field: "metadata.name",
            })?;
        let namespace = metadata["namespace"]
            .as_str()
            .unwrap_or(default_namespace.as_str());

        let key = format!("{}#{}#{}#{}", namespace, name, kind, group);
        mappings.insert(
            key,
            MappingResult {
                kind: kind.to_string(),
                raw: doc,
            },
        );
    }

    Ok(mappings)
}

fn required_str<'a>(
    value: &'a Value,
    field: &'static str,
    release: &ReleaseName,
) -> Result<&'a str, ReconcileError> {
    value[field].as_str().ok_or(ReconcileError::MissingField {
        release: release.to_string(),
        field,
    })
}

fn split_documents(text: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim_end() == "---" {
            docs.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    docs.push(current);

    docs.retain(|d| !d.trim().is_empty());
    docs
}
