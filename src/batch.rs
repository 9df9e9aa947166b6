//! Evaluate a saved profile without the wizard.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{PartBProfile, PartDProfile, evaluate};
use crate::error::BatchError;
use crate::report::Report;

/// A complete profile tagged with the tool it belongs to, e.g.
/// `{"tool": "part_b", "profile": {"age": 67, ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "profile", rename_all = "snake_case")]
pub enum ProfileDocument {
    PartB(PartBProfile),
    PartD(PartDProfile),
}

/// Validate the conditional fields and build the report.
pub fn evaluate_document(document: &ProfileDocument) -> Result<Report, BatchError> {
    match document {
        ProfileDocument::PartB(profile) => {
            profile.check_consistency().map_err(BatchError::Inconsistent)?;
            Ok(Report::part_b(profile, &evaluate(profile)))
        }
        ProfileDocument::PartD(profile) => {
            profile.check_consistency().map_err(BatchError::Inconsistent)?;
            Ok(Report::part_d(profile, &profile.evaluate()))
        }
    }
}

pub fn evaluate_str(json: &str) -> Result<Report, BatchError> {
    let document: ProfileDocument = serde_json::from_str(json)?;
    evaluate_document(&document)
}

/// Read a profile document from disk and evaluate it.
pub async fn evaluate_file(path: &Path) -> Result<Report, BatchError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let report = evaluate_str(&json)?;
    info!(path = %path.display(), tool = %report.tool, status = %report.status, "Evaluated profile file");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DecisionStatus;
    use crate::wizard::Tool;
    use std::io::Write;

    #[test]
    fn evaluates_part_b_document() {
        let report = evaluate_str(
            r#"{"tool":"part_b","profile":{"age":64,"currentlyWorking":true,"coverageSource":"employer_self","employerSizeBand":"ge20","contributingToHSA":false}}"#,
        )
        .unwrap();
        assert_eq!(report.tool, Tool::PartB);
        assert_eq!(report.status, DecisionStatus::NeedsHumanReview);
    }

    #[test]
    fn evaluates_part_d_document() {
        let report = evaluate_str(
            r#"{"tool":"part_d","profile":{"eligible":true,"coverage":"yes","creditable":"no","gap":"no"}}"#,
        )
        .unwrap();
        assert_eq!(report.classification, "B");
    }

    #[test]
    fn rejects_inconsistent_profiles() {
        let err = evaluate_str(
            r#"{"tool":"part_b","profile":{"age":67,"currentlyWorking":true,"coverageSource":"cobra","employerSizeBand":"lt20","contributingToHSA":false}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::Inconsistent(_)));

        let err = evaluate_str(
            r#"{"tool":"part_d","profile":{"eligible":true,"coverage":"no","creditable":"yes","gap":"no"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::Inconsistent(_)));
    }

    #[test]
    fn rejects_unknown_tool_and_bad_json() {
        assert!(matches!(
            evaluate_str(r#"{"tool":"part_c","profile":{}}"#),
            Err(BatchError::Parse(_))
        ));
        assert!(matches!(evaluate_str("not json"), Err(BatchError::Parse(_))));
    }

    #[test]
    fn document_shape_is_adjacently_tagged() {
        let document = ProfileDocument::PartD(PartDProfile {
            eligible: true,
            coverage: crate::engine::TriState::No,
            creditable: crate::engine::Creditable::Skipped,
            gap: crate::engine::TriState::No,
        });
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["tool"], "part_d");
        assert_eq!(json["profile"]["creditable"], "skipped");
    }

    #[tokio::test]
    async fn evaluates_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tool":"part_b","profile":{{"age":66,"currentlyWorking":false,"coverageSource":"retiree","contributingToHSA":false}}}}"#
        )
        .unwrap();
        let report = evaluate_file(file.path()).await.unwrap();
        assert_eq!(report.status, DecisionStatus::LikelyNotSafeToDelay);
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = evaluate_file(&dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, BatchError::Read { .. }));
    }
}
