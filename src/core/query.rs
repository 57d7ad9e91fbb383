use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::core::value::Value;
use crate::core::value_path::ValuePath;

/// A query is a path query iff it starts like a path; anything else is a
/// free-text search term matched as a regex fragment against whole paths.
pub fn is_path_query(query: &str) -> bool {
    matches!(query.chars().next(), Some('.') | Some('['))
}

/// Compile a query into a case-insensitive matcher over paths.
///
/// Path-grammar characters in the query are escaped so they match
/// literally, and `*` becomes a single-digit class so `.friends[*].name`
/// matches every numeric index. Path queries are anchored to the start of
/// the path. Returns `None` for an empty query or when the pattern fails
/// to compile; filtering is disabled rather than surfacing the error.
pub fn compile_matcher(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(query.len() + 8);
    if is_path_query(query) {
        pattern.push('^');
    }
    for ch in query.chars() {
        match ch {
            '.' | '[' | ']' => {
                pattern.push('\\');
                pattern.push(ch);
            }
            '*' => pattern.push_str("\\d"),
            _ => pattern.push(ch),
        }
    }
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Every reachable path in `value`, containers included, depth first.
/// The root itself is not listed; object keys carry their leading dot.
pub fn enumerate_paths(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_paths(value, &ValuePath::root(), &mut out);
    out
}

fn collect_paths(value: &Value, prefix: &ValuePath, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = prefix.child_key(key.clone());
                out.push(path.to_string());
                collect_paths(child, &path, out);
            }
        }
        Value::List(list) => {
            for (index, child) in list.iter().enumerate() {
                let path = prefix.child_index(index);
                out.push(path.to_string());
                collect_paths(child, &path, out);
            }
        }
        _ => {}
    }
}

/// Filter `all` down to the paths that survive the hidden prefixes and the
/// matcher. A path is dropped when it contains any non-empty hidden prefix
/// as a substring; otherwise it is kept when there is no matcher or the
/// matcher accepts it.
pub fn visible_paths(all: &[String], matcher: Option<&Regex>, hidden_paths: &[String]) -> Vec<String> {
    all.iter()
        .filter(|path| {
            let hidden = hidden_paths
                .iter()
                .any(|prefix| !prefix.is_empty() && path.contains(prefix.as_str()));
            if hidden {
                return false;
            }
            matcher.map(|regex| regex.is_match(path)).unwrap_or(true)
        })
        .cloned()
        .collect()
}

/// The ordered, increasingly specific prefixes of a path, ending with the
/// path itself: `.friends[0].name` → `.friends`, `.friends[0]`,
/// `.friends[0].name`. Plain dotted input is normalized first.
pub fn path_prefixes(path: &str) -> Vec<String> {
    let normalized = if is_path_query(path) {
        path.to_string()
    } else {
        format!(".{path}")
    };
    let mut cuts: Vec<usize> = normalized
        .char_indices()
        .filter(|(idx, ch)| *idx > 0 && (*ch == '.' || *ch == '['))
        .map(|(idx, _)| idx)
        .collect();
    cuts.push(normalized.len());
    cuts.into_iter()
        .map(|end| normalized[..end].to_string())
        .collect()
}

/// Close a path set over ancestors so a visible leaf keeps its whole
/// ancestor chain rendered. Idempotent.
pub fn expand_with_ancestors<I>(paths: I) -> HashSet<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = HashSet::new();
    for path in paths {
        for prefix in path_prefixes(path.as_str()) {
            out.insert(prefix);
        }
    }
    out
}

/// The computed visibility constraint passed down the tree.
///
/// `visible: None` means the computation was skipped outright — no matcher
/// compiled and no hidden prefixes configured — and every row renders.
/// The distinction is observable: absence of any filter means absence of
/// any suppression, including for malformed queries.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    visible: Option<HashSet<String>>,
}

impl PathFilter {
    /// No constraint; everything renders.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn compute(value: &Value, query: &str, hidden_paths: &[String]) -> Self {
        let matcher = compile_matcher(query);
        if matcher.is_none() && hidden_paths.is_empty() {
            return Self::all();
        }
        let all = enumerate_paths(value);
        let visible = visible_paths(&all, matcher.as_ref(), hidden_paths);
        Self {
            visible: Some(expand_with_ancestors(visible)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.visible.is_some()
    }

    pub fn allows(&self, path: &str) -> bool {
        match &self.visible {
            None => true,
            // the root row always renders
            Some(set) => path.is_empty() || set.contains(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Value {
        Value::from_json_text(
            r#"{
                "name": "James",
                "age": 26,
                "friends": [
                    {"name": "Minsu", "age": 24},
                    {"name": "Mark", "age": 32}
                ]
            }"#,
        )
        .expect("sample json should parse")
    }

    #[test]
    fn classifies_path_and_text_queries() {
        assert!(is_path_query(".friends"));
        assert!(is_path_query("[0]"));
        assert!(!is_path_query("friends"));
        assert!(!is_path_query(""));
    }

    #[test]
    fn enumerates_containers_and_leaves_depth_first() {
        let paths = enumerate_paths(&sample());
        assert_eq!(
            paths,
            vec![
                ".name",
                ".age",
                ".friends",
                ".friends[0]",
                ".friends[0].name",
                ".friends[0].age",
                ".friends[1]",
                ".friends[1].name",
                ".friends[1].age",
            ]
        );
    }

    #[test]
    fn wildcard_path_query_matches_every_index() {
        let matcher = compile_matcher(".friends[*].name").expect("matcher should compile");
        assert!(matcher.is_match(".friends[0].name"));
        assert!(matcher.is_match(".friends[1].name"));
        assert!(!matcher.is_match(".name"));
    }

    #[test]
    fn path_query_is_anchored_and_text_query_is_not() {
        let path = compile_matcher(".name").expect("matcher should compile");
        assert!(path.is_match(".name"));
        assert!(!path.is_match(".friends[0].name"));

        let text = compile_matcher("name").expect("matcher should compile");
        assert!(text.is_match(".name"));
        assert!(text.is_match(".friends[0].name"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let matcher = compile_matcher("NAME").expect("matcher should compile");
        assert!(matcher.is_match(".friends[0].name"));
    }

    #[test]
    fn malformed_query_degrades_to_no_matcher() {
        assert!(compile_matcher("(unclosed").is_none());
        assert!(compile_matcher("").is_none());
    }

    #[test]
    fn hidden_prefixes_exclude_by_substring_and_ignore_empties() {
        let all = enumerate_paths(&sample());
        let visible = visible_paths(&all, None, &["friends[0]".to_string(), String::new()]);
        assert!(visible.contains(&".friends[1].name".to_string()));
        assert!(!visible.iter().any(|p| p.contains("friends[0]")));
    }

    #[test]
    fn ancestor_expansion_keeps_the_chain_connected() {
        let matcher = compile_matcher(".friends[*].name").expect("matcher should compile");
        let all = enumerate_paths(&sample());
        let visible = visible_paths(&all, Some(&matcher), &[]);
        let expanded = expand_with_ancestors(visible);
        for path in [
            ".friends",
            ".friends[0]",
            ".friends[0].name",
            ".friends[1]",
            ".friends[1].name",
        ] {
            assert!(expanded.contains(path), "missing {path}");
        }
        assert!(!expanded.contains(".friends[0].age"));
    }

    #[test]
    fn filter_is_inactive_without_query_or_hidden_paths() {
        let filter = PathFilter::compute(&sample(), "", &[]);
        assert!(!filter.is_active());
        assert!(filter.allows(".anything.at.all"));

        // a malformed query with no hidden prefixes must not suppress rows
        let degraded = PathFilter::compute(&sample(), "(broken", &[]);
        assert!(!degraded.is_active());
    }

    #[test]
    fn filter_allows_root_even_when_active() {
        let filter = PathFilter::compute(&sample(), ".friends", &[]);
        assert!(filter.is_active());
        assert!(filter.allows(""));
        assert!(filter.allows(".friends"));
        assert!(!filter.allows(".name"));
    }

    proptest! {
        #[test]
        fn visible_paths_never_invents_paths(query in ".{0,12}") {
            let all = enumerate_paths(&sample());
            let matcher = compile_matcher(&query);
            let visible = visible_paths(&all, matcher.as_ref(), &[]);
            for path in visible {
                prop_assert!(all.contains(&path));
            }
        }

        #[test]
        fn ancestor_expansion_is_idempotent(indices in proptest::collection::vec(0usize..3, 0..6)) {
            let paths: Vec<String> = indices
                .iter()
                .map(|i| format!(".friends[{i}].name"))
                .collect();
            let once = expand_with_ancestors(paths);
            let twice = expand_with_ancestors(once.iter().cloned());
            prop_assert_eq!(once, twice);
        }
    }
}
