//! Rendering of comparison results.
//!
//! The report layout is consumed by snapshot tooling, so the literal text
//! (spacing, labels, blank lines) is part of the contract.

use crate::types::{Classification, DataMap, DifferenceEntry, LocalResource, ResourceKind, Verdict};

/// Rendered result of comparing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    /// Full text block, including merge snippets
    pub text: String,
    /// Keys whose deployed value differs from the local one, with the deployed value
    pub replace_local_keys: DataMap,
    /// Keys present only in the cluster, with the deployed value
    pub missing_local_keys: DataMap,
    /// Contribution of this resource to the run verdict
    pub verdict: Verdict,
}

/// Render the report for one compared resource.
pub fn render(resource: &LocalResource, differences: &[DifferenceEntry]) -> ResourceReport {
    render_parts(
        resource.kind(),
        resource.name(),
        resource.namespace(),
        resource.merge_field(),
        differences,
    )
}

/// Render from the individual identity parts.
fn render_parts(
    kind: ResourceKind,
    name: &str,
    namespace: &str,
    merge_field: &str,
    differences: &[DifferenceEntry],
) -> ResourceReport {
    let mut text = format!("=== {name} (Namespace: {namespace}) ===\n");
    let mut replace_local_keys = DataMap::new();
    let mut missing_local_keys = DataMap::new();

    if differences.is_empty() {
        text.push_str(&format!(
            "All {kind} match between the local file and the deployed Kubernetes {kind}.\n\n"
        ));
        return ResourceReport {
            text,
            replace_local_keys,
            missing_local_keys,
            verdict: Verdict::Match,
        };
    }

    text.push_str("Differences found:\n");

    for diff in differences {
        let label = diff.classification().label();
        match (&diff.local, &diff.deployed) {
            (Some(local), Some(deployed)) => {
                text.push_str(&format!(" - [{label}] {}:\n", diff.key));
                text.push_str(&format!("   Local:     {local}\n"));
                text.push_str(&format!("   Deployed:  {deployed}\n\n"));
                replace_local_keys.insert(diff.key.clone(), deployed.clone());
            }
            (Some(value), None) | (None, Some(value)) => {
                text.push_str(&format!(" - [{label}] {}:\n", diff.key));
                text.push_str(&format!("   Value: {value}\n\n"));
                if diff.classification() == Classification::OnlyInDeployed {
                    missing_local_keys.insert(diff.key.clone(), value.clone());
                }
            }
            (None, None) => {}
        }
    }

    let kind_lower = kind.as_str().to_lowercase();
    if !replace_local_keys.is_empty() {
        text.push_str(&format!(
            "Merge the following key-value pairs into your local file to match deployed {kind_lower}:\n"
        ));
        text.push_str(&snippet(merge_field, &replace_local_keys));
    }
    if !missing_local_keys.is_empty() {
        text.push_str(&format!(
            "Add the following key-value pairs locally to match the deployed {kind_lower}:\n"
        ));
        text.push_str(&snippet(merge_field, &missing_local_keys));
    }

    ResourceReport {
        text,
        replace_local_keys,
        missing_local_keys,
        verdict: Verdict::Differences,
    }
}

/// Fenced YAML block nesting `entries` under `merge_field`.
fn snippet(merge_field: &str, entries: &DataMap) -> String {
    let mut out = String::from("```yaml\n");
    out.push_str(&format!("{merge_field}:\n"));
    for (key, value) in entries {
        out.push_str(&format!("  {key}: {}\n", format_value(value)));
    }
    out.push_str("```\n\n");
    out
}

/// Format a value for a merge snippet.
///
/// Multi-line values become a `|-` block scalar with every line indented by
/// four spaces. Anything else is double-quoted with only `"` escaped;
/// backslashes and control characters are emitted as-is.
pub fn format_value(value: &str) -> String {
    if value.contains('\n') {
        let lines: Vec<String> = value.split('\n').map(|line| format!("    {line}")).collect();
        return format!("|-\n{}", lines.join("\n"));
    }
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Final line printed after all resources were processed.
pub fn summary_line(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Differences => "Summary: Differences were found in some resources.",
        Verdict::Match => "Summary: All secrets match across environments.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare;

    fn data(pairs: &[(&str, &str)]) -> DataMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn secret(pairs: &[(&str, &str)]) -> LocalResource {
        LocalResource::new(ResourceKind::Secret, "db", "prod", data(pairs)).unwrap()
    }

    #[test]
    fn test_format_value_single_line() {
        assert_eq!(format_value("hello"), "\"hello\"");
        assert_eq!(format_value(""), "\"\"");
        assert_eq!(format_value("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_format_value_does_not_escape_backslashes() {
        assert_eq!(format_value("C:\\path"), "\"C:\\path\"");
        assert_eq!(format_value("tab\there"), "\"tab\there\"");
    }

    #[test]
    fn test_format_value_multiline() {
        assert_eq!(format_value("line1\nline2"), "|-\n    line1\n    line2");
        assert_eq!(format_value("a\n"), "|-\n    a\n    ");

        let formatted = format_value("x\n\"quoted\"\nz");
        assert!(formatted.starts_with("|-"));
        for line in formatted.lines().skip(1) {
            assert!(line.starts_with("    "));
        }
        assert!(formatted.contains("    \"quoted\""));
    }

    #[test]
    fn test_render_all_match() {
        let res = secret(&[("A", "1")]);
        let diffs = compare(res.declared_data(), &data(&[("A", "1")]));
        let report = render(&res, &diffs);

        assert_eq!(
            report.text,
            "=== db (Namespace: prod) ===\n\
             All Secret match between the local file and the deployed Kubernetes Secret.\n\n"
        );
        assert_eq!(report.verdict, Verdict::Match);
        assert!(report.replace_local_keys.is_empty());
        assert!(report.missing_local_keys.is_empty());
    }

    #[test]
    fn test_render_different_emits_merge_snippet() {
        let res = secret(&[("A", "1")]);
        let diffs = compare(res.declared_data(), &data(&[("A", "2")]));
        let report = render(&res, &diffs);

        assert_eq!(report.verdict, Verdict::Differences);
        assert_eq!(report.replace_local_keys, data(&[("A", "2")]));
        assert!(report.missing_local_keys.is_empty());
        assert_eq!(
            report.text,
            "=== db (Namespace: prod) ===\n\
             Differences found:\n \
             - [DIFFERENT] A:\n   \
             Local:     1\n   \
             Deployed:  2\n\n\
             Merge the following key-value pairs into your local file to match deployed secret:\n\
             ```yaml\n\
             stringData:\n  \
             A: \"2\"\n\
             ```\n\n"
        );
    }

    #[test]
    fn test_render_only_in_local_has_no_snippet() {
        let res = secret(&[("A", "1")]);
        let diffs = compare(res.declared_data(), &DataMap::new());
        let report = render(&res, &diffs);

        assert_eq!(report.verdict, Verdict::Differences);
        assert!(report.replace_local_keys.is_empty());
        assert!(report.missing_local_keys.is_empty());
        assert_eq!(
            report.text,
            "=== db (Namespace: prod) ===\n\
             Differences found:\n \
             - [ONLY IN LOCAL] A:\n   \
             Value: 1\n\n"
        );
    }

    #[test]
    fn test_render_only_in_deployed_emits_add_snippet() {
        let res = LocalResource::new(
            ResourceKind::ConfigMap,
            "app",
            "staging",
            data(&[("A", "1")]),
        )
        .unwrap();
        let diffs = compare(
            res.declared_data(),
            &data(&[("A", "1"), ("cert.pem", "-----BEGIN-----\nabc")]),
        );
        let report = render(&res, &diffs);

        assert_eq!(
            report.missing_local_keys,
            data(&[("cert.pem", "-----BEGIN-----\nabc")])
        );
        assert_eq!(
            report.text,
            "=== app (Namespace: staging) ===\n\
             Differences found:\n \
             - [ONLY IN DEPLOYED] cert.pem:\n   \
             Value: -----BEGIN-----\nabc\n\n\
             Add the following key-value pairs locally to match the deployed configmap:\n\
             ```yaml\n\
             data:\n  \
             cert.pem: |-\n    \
             -----BEGIN-----\n    \
             abc\n\
             ```\n\n"
        );
    }

    #[test]
    fn test_render_both_snippets_in_order() {
        let res = secret(&[("A", "1"), ("L", "x")]);
        let diffs = compare(res.declared_data(), &data(&[("A", "2"), ("R", "y")]));
        let report = render(&res, &diffs);

        let merge = report.text.find("Merge the following").unwrap();
        let add = report.text.find("Add the following").unwrap();
        assert!(merge < add);
        assert_eq!(report.replace_local_keys, data(&[("A", "2")]));
        assert_eq!(report.missing_local_keys, data(&[("R", "y")]));
        assert!(!report.replace_local_keys.contains_key("L"));
        assert!(!report.missing_local_keys.contains_key("L"));
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(Verdict::Differences),
            "Summary: Differences were found in some resources."
        );
        assert_eq!(
            summary_line(Verdict::Match),
            "Summary: All secrets match across environments."
        );
    }
}
