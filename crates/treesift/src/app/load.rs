//! Loading tree listings from files or stdin.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::errors::{SchemaViolation, TreeError};
use crate::domain::model::{TreeDocument, TreeEntry};

/// Where a tree listing is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Stdin,
}

impl DocumentSource {
    /// Interpret `-` as stdin, anything else as a file path.
    pub fn from_arg(arg: impl AsRef<Path>) -> Self {
        let arg = arg.as_ref();
        if arg == Path::new("-") {
            DocumentSource::Stdin
        } else {
            DocumentSource::File(arg.to_path_buf())
        }
    }

    pub fn name(&self) -> String {
        match self {
            DocumentSource::File(path) => path.display().to_string(),
            DocumentSource::Stdin => "<stdin>".to_string(),
        }
    }
}

/// Read and validate a tree listing.
pub fn load_document(source: &DocumentSource) -> Result<TreeDocument, TreeError> {
    let bytes = read_source(source).map_err(|err| TreeError::ResourceNotFound {
        source_name: source.name(),
        source: err,
    })?;
    let document = parse_document(&bytes)?;

    tracing::info!(
        source = %source.name(),
        entries = document.tree.len(),
        "loaded tree listing"
    );
    if document.truncated {
        tracing::warn!(source = %source.name(), "tree listing is truncated; results may be incomplete");
    }
    Ok(document)
}

/// Raw bytes of the source. Decoding is left to the parser so bad UTF-8 is malformed input.
fn read_source(source: &DocumentSource) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match source {
        DocumentSource::File(path) => {
            File::open(path)?.read_to_end(&mut bytes)?;
        }
        DocumentSource::Stdin => {
            io::stdin().lock().read_to_end(&mut bytes)?;
        }
    }
    Ok(bytes)
}

/// Parse listing bytes, distinguishing syntax errors from shape errors.
pub fn parse_document(input: impl AsRef<[u8]>) -> Result<TreeDocument, TreeError> {
    let value: Value =
        serde_json::from_slice(input.as_ref()).map_err(TreeError::MalformedInput)?;

    let mut root = match value {
        Value::Object(root) => root,
        other => {
            return Err(SchemaViolation::NotAnObject {
                found: kind_of(&other),
            }
            .into());
        }
    };

    let tree = match root.remove("tree") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(SchemaViolation::TreeNotArray {
                found: kind_of(&other),
            }
            .into());
        }
        None => return Err(SchemaViolation::MissingTree.into()),
    };

    let tree = tree
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<TreeEntry>(item)
                .map_err(|source| SchemaViolation::InvalidEntry { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let truncated = root
        .get("truncated")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(TreeDocument { tree, truncated })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_entries_and_ignores_extra_fields() {
        let doc = parse_document(
            r#"{
                "sha": "root",
                "url": "https://example.invalid/tree",
                "tree": [
                    {"path": "src/lib/utils.ts", "mode": "100644", "type": "blob", "sha": "def456", "size": 166}
                ],
                "truncated": false
            }"#,
        )
        .unwrap();

        assert_eq!(
            doc.tree,
            vec![TreeEntry {
                path: "src/lib/utils.ts".into(),
                sha: "def456".into(),
            }]
        );
        assert!(!doc.truncated);
    }

    #[test]
    fn reads_truncated_flag() {
        let doc = parse_document(r#"{"tree": [], "truncated": true}"#).unwrap();
        assert!(doc.truncated);
        assert!(doc.tree.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed_input() {
        let err = parse_document("{\"tree\": [").unwrap_err();
        assert!(matches!(err, TreeError::MalformedInput(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn invalid_utf8_is_malformed_input() {
        let err = parse_document(b"{\"tree\":[{\"path\":\"src/lib/utils.ts\",\"sha\":\"\xff\"}]}")
            .unwrap_err();
        assert!(matches!(err, TreeError::MalformedInput(_)));
    }

    #[test]
    fn invalid_utf8_file_is_malformed_input() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("tree_client.json");
        fs::write(&path, b"{\"tree\":[{\"path\":\"src/lib/utils.ts\",\"sha\":\"\xff\"}]}")?;

        let err = load_document(&DocumentSource::File(path)).unwrap_err();
        assert!(matches!(err, TreeError::MalformedInput(_)));
        assert_eq!(err.exit_code(), 4);
        Ok(())
    }

    #[test]
    fn missing_tree_is_schema_violation() {
        let err = parse_document(r#"{"sha": "abc"}"#).unwrap_err();
        assert!(matches!(
            err,
            TreeError::SchemaViolation(SchemaViolation::MissingTree)
        ));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn non_array_tree_is_schema_violation() {
        let err = parse_document(r#"{"tree": {"path": "a"}}"#).unwrap_err();
        assert!(matches!(
            err,
            TreeError::SchemaViolation(SchemaViolation::TreeNotArray { found: "an object" })
        ));
    }

    #[test]
    fn non_object_root_is_schema_violation() {
        let err = parse_document("[1, 2]").unwrap_err();
        assert!(matches!(
            err,
            TreeError::SchemaViolation(SchemaViolation::NotAnObject { found: "an array" })
        ));
    }

    #[test]
    fn entry_without_sha_reports_index() {
        let err = parse_document(
            r#"{"tree": [{"path": "a", "sha": "1"}, {"path": "src/components/ui/x.tsx"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TreeError::SchemaViolation(SchemaViolation::InvalidEntry { index: 1, .. })
        ));
    }

    #[test]
    fn non_string_sha_is_rejected() {
        let err = parse_document(r#"{"tree": [{"path": "a", "sha": 7}]}"#).unwrap_err();
        assert!(matches!(
            err,
            TreeError::SchemaViolation(SchemaViolation::InvalidEntry { index: 0, .. })
        ));
    }

    #[test]
    fn missing_file_is_resource_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let source = DocumentSource::File(temp.path().join("tree_client.json"));
        let err = load_document(&source).unwrap_err();
        assert!(matches!(err, TreeError::ResourceNotFound { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn loads_from_file() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("tree_client.json");
        fs::write(&path, r#"{"tree": [{"path": "README.md", "sha": "r1"}]}"#)?;

        let doc = load_document(&DocumentSource::File(path))?;
        assert_eq!(doc.tree.len(), 1);
        assert_eq!(doc.tree[0].sha, "r1");
        Ok(())
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(DocumentSource::from_arg("-"), DocumentSource::Stdin);
        assert_eq!(
            DocumentSource::from_arg("tree.json"),
            DocumentSource::File(PathBuf::from("tree.json"))
        );
    }
}
