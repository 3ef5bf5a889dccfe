//! Issue snapshot ingestion.
//!
//! Reads a pre-fetched JSON dump of repository issues (the GitHub REST
//! shape) and normalizes it into [`Document`]s. Labels arrive either as
//! bare strings or as `{ "name", "color" }` objects; both collapse to
//! [`Label`] here so the linking engine never sees the difference. Pull
//! requests are skipped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::instrument;
use zettelwiki_core::{Document, DocumentId, DocumentState, Error, Label, Result};

/// A label as found in a snapshot
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Name(String),
    Object {
        name: String,
        #[serde(default)]
        color: Option<String>,
    },
}

impl From<RawLabel> for Label {
    fn from(raw: RawLabel) -> Self {
        match raw {
            RawLabel::Name(name) => Label::new(name),
            RawLabel::Object { name, color } => Label::with_color(name, color.unwrap_or_default()),
        }
    }
}

/// One issue as found in a snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "epoch")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl RawIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Normalize into a document
    pub fn into_document(self) -> Document {
        let state = match self.state.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("closed") => DocumentState::Closed,
            _ => DocumentState::Open,
        };

        Document {
            id: DocumentId(self.number),
            title: self.title.unwrap_or_default(),
            body: self.body.filter(|b| !b.is_empty()),
            created_at: self.created_at,
            updated_at: self.updated_at,
            labels: self
                .labels
                .into_iter()
                .map(Label::from)
                .filter(|l| !l.name.trim().is_empty())
                .collect(),
            state,
            comment_count: self.comments,
        }
    }
}

/// Top-level snapshot: a bare array, or an object wrapping `issues`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Issues(Vec<RawIssue>),
    Wrapped { issues: Vec<RawIssue> },
}

/// Parse snapshot JSON into documents, in file order
pub fn parse_snapshot(raw: &str) -> Result<Vec<Document>> {
    let snapshot: Snapshot = serde_json::from_str(raw)
        .map_err(|e| Error::parse_error(format!("Invalid issue snapshot: {}", e)))?;
    let issues = match snapshot {
        Snapshot::Issues(issues) | Snapshot::Wrapped { issues } => issues,
    };

    let total = issues.len();
    let documents: Vec<Document> = issues
        .into_iter()
        .filter(|issue| !issue.is_pull_request())
        .map(RawIssue::into_document)
        .collect();

    log::debug!(
        "Parsed snapshot: {} issues, {} pull requests skipped",
        documents.len(),
        total - documents.len()
    );
    Ok(documents)
}

/// Read and parse a snapshot file
#[instrument(skip_all, fields(path = %path.display()), name = "snapshot_load")]
pub async fn load_snapshot(path: &Path) -> Result<Vec<Document>> {
    if !tokio::fs::try_exists(path).await? {
        return Err(Error::file_not_found(path));
    }
    let raw = tokio::fs::read_to_string(path).await?;
    let documents = parse_snapshot(&raw)?;
    log::info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_string_or_object() {
        let raw = r#"[
            {"number": 1, "title": "A", "labels": ["wiki", {"name": "bug", "color": "d73a4a"}, {"name": "x"}]}
        ]"#;
        let docs = parse_snapshot(raw).unwrap();
        assert_eq!(
            docs[0].labels,
            vec![Label::new("wiki"), Label::with_color("bug", "d73a4a"), Label::new("x")]
        );
    }

    #[test]
    fn test_wrapped_snapshot_and_pull_requests() {
        let raw = r#"{"issues": [
            {"number": 1, "title": "Issue", "state": "CLOSED", "comments": 3},
            {"number": 2, "title": "PR", "pull_request": {"url": "x"}}
        ]}"#;
        let docs = parse_snapshot(raw).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].state, DocumentState::Closed);
        assert_eq!(docs[0].comment_count, 3);
    }

    #[test]
    fn test_missing_fields_default() {
        let docs = parse_snapshot(r#"[{"number": 7, "body": ""}]"#).unwrap();
        assert_eq!(docs[0].title, "");
        assert!(docs[0].body.is_none());
        assert_eq!(docs[0].created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(docs[0].state, DocumentState::Open);
    }

    #[test]
    fn test_timestamps() {
        let raw = r#"[{
            "number": 1,
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-02-03T04:05:06Z"
        }]"#;
        let docs = parse_snapshot(raw).unwrap();
        assert_eq!(docs[0].created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_invalid_snapshot() {
        let err = parse_snapshot("{not json").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
        assert!(parse_snapshot(r#"{"other": []}"#).is_err());
    }
}
