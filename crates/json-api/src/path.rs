//! Parsing of dotted relationship include paths.

use indexmap::IndexMap;

/// Bucket a flat list of dotted relationship paths by their first segment.
///
/// Given:
///
/// ```text
/// ["user", "user.employer", "user.employer.country", "comments"]
/// ```
///
/// produce a one-level-deep tree that can be passed on to the next
/// serializer:
///
/// ```text
/// {"user": ["employer", "employer.country"], "comments": []}
/// ```
///
/// Each path is split on the *first* dot only, so `a.b.c` contributes the
/// single nested path `b.c` under `a`. Keys are deduplicated and ordered by
/// first appearance.
pub fn parse_relationship_paths(paths: &[String]) -> IndexMap<String, Vec<String>> {
    let mut tree: IndexMap<String, Vec<String>> = IndexMap::new();

    for path in paths {
        let (primary, nested) = match path.split_once('.') {
            Some((primary, nested)) => (primary, Some(nested)),
            None => (path.as_str(), None),
        };

        let entry = tree.entry(primary.to_string()).or_default();

        if let Some(nested) = nested
            && !nested.is_empty()
        {
            entry.push(nested.to_string());
        }
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(input: &[&str]) -> Vec<String> {
        input.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_parse_relationship_paths() {
        let tree = parse_relationship_paths(&paths(&[
            "user",
            "user.employer",
            "user.employer.country",
            "comments",
        ]));

        let expected: Vec<(&str, Vec<&str>)> = vec![
            ("user", vec!["employer", "employer.country"]),
            ("comments", vec![]),
        ];
        let actual: Vec<(&str, Vec<&str>)> = tree
            .iter()
            .map(|(k, v)| (k.as_str(), v.iter().map(|s| s.as_str()).collect()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_parse_deep_path_without_prefix() {
        let tree = parse_relationship_paths(&paths(&["user.employer.country"]));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree["user"], vec!["employer.country".to_string()]);
    }

    #[test]
    fn test_parse_preserves_first_appearance_order() {
        let tree = parse_relationship_paths(&paths(&["b", "a", "b.x"]));

        let keys: Vec<&str> = tree.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(tree["b"], vec!["x".to_string()]);
    }

    #[test]
    fn test_parse_trailing_dot_adds_no_nested_path() {
        let tree = parse_relationship_paths(&paths(&["user."]));

        assert!(tree["user"].is_empty());
    }
}
