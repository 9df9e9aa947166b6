//! Part B delay rules.
//!
//! An ordered decision list: the first rule whose predicate holds decides the
//! outcome, and anything no rule claims falls through to human review. Rule
//! order is significant; later rules are unreachable once an earlier one
//! matches.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::result::{DecisionResult, DecisionStatus};

/// Age at which Medicare eligibility typically begins.
pub const MEDICARE_AGE: u32 = 65;

pub type PartBResult = DecisionResult<DecisionStatus>;

// ── Profile ─────────────────────────────────────────────────────────

/// Where the user's current health coverage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageSource {
    EmployerSelf,
    EmployerSpouse,
    Cobra,
    Retiree,
    Marketplace,
    Medicaid,
    Va,
    Tricare,
    None,
    Unknown,
}

impl CoverageSource {
    pub const ALL: [CoverageSource; 10] = [
        Self::EmployerSelf,
        Self::EmployerSpouse,
        Self::Cobra,
        Self::Retiree,
        Self::Marketplace,
        Self::Medicaid,
        Self::Va,
        Self::Tricare,
        Self::None,
        Self::Unknown,
    ];

    /// Active employer coverage, either the user's own job or a spouse's.
    pub fn is_employer(&self) -> bool {
        matches!(self, Self::EmployerSelf | Self::EmployerSpouse)
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::EmployerSelf => "employer_self",
            Self::EmployerSpouse => "employer_spouse",
            Self::Cobra => "cobra",
            Self::Retiree => "retiree",
            Self::Marketplace => "marketplace",
            Self::Medicaid => "medicaid",
            Self::Va => "va",
            Self::Tricare => "tricare",
            Self::None => "none",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Option label used when asking the question.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmployerSelf => "Employer (self)",
            Self::EmployerSpouse => "Employer (spouse)",
            Self::Cobra => "COBRA",
            Self::Retiree => "Retiree",
            Self::Marketplace => "Marketplace",
            Self::Medicaid => "Medicaid",
            Self::Va => "VA",
            Self::Tricare => "TRICARE",
            Self::None => "None",
            Self::Unknown => "Unknown",
        }
    }

    /// Longer description used when summarizing the answers.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::EmployerSelf => "Employer plan (your job)",
            Self::EmployerSpouse => "Employer plan (spouse's job)",
            Self::Cobra => "COBRA continuation coverage",
            Self::Retiree => "Retiree health plan",
            Self::Marketplace => "Marketplace / ACA plan",
            Self::Medicaid => "Medicaid",
            Self::Va => "VA coverage",
            Self::Tricare => "TRICARE",
            Self::None => "No current coverage",
            Self::Unknown => "Unknown / not sure",
        }
    }
}

impl std::fmt::Display for CoverageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Whether the employer has at least 20 employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployerSizeBand {
    Lt20,
    Ge20,
    Unknown,
}

impl EmployerSizeBand {
    pub const ALL: [EmployerSizeBand; 3] = [Self::Lt20, Self::Ge20, Self::Unknown];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Lt20 => "lt20",
            Self::Ge20 => "ge20",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Lt20 => "Fewer than 20 employees",
            Self::Ge20 => "20 or more employees",
            Self::Unknown => "Unknown",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Lt20 => "Fewer than 20 employees",
            Self::Ge20 => "20 or more employees",
            Self::Unknown => "Not sure",
        }
    }
}

impl std::fmt::Display for EmployerSizeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A completed Part B questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBProfile {
    pub age: u32,
    /// The user, or the spouse when coverage is through the spouse.
    pub currently_working: bool,
    pub coverage_source: CoverageSource,
    /// Only present for employer coverage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_size_band: Option<EmployerSizeBand>,
    #[serde(rename = "contributingToHSA")]
    pub contributing_to_hsa: bool,
}

impl PartBProfile {
    /// Check that the employer size is set exactly when coverage is employer based.
    pub fn check_consistency(&self) -> Result<(), String> {
        match (self.coverage_source.is_employer(), self.employer_size_band) {
            (true, None) => Err(format!(
                "employerSizeBand is required when coverageSource is {}",
                self.coverage_source
            )),
            (false, Some(band)) => Err(format!(
                "employerSizeBand {} is not allowed when coverageSource is {}",
                band, self.coverage_source
            )),
            _ => Ok(()),
        }
    }
}

// ── Rules ───────────────────────────────────────────────────────────

struct Rule {
    name: &'static str,
    applies: fn(&PartBProfile) -> bool,
    decide: fn() -> PartBResult,
}

const RULES: &[Rule] = &[
    Rule {
        name: "under_65",
        applies: is_under_65,
        decide: under_65,
    },
    Rule {
        name: "cobra",
        applies: is_cobra,
        decide: cobra,
    },
    Rule {
        name: "retiree",
        applies: is_retiree,
        decide: retiree,
    },
    Rule {
        name: "employer_working_ge20",
        applies: is_working_for_large_employer,
        decide: large_employer,
    },
    Rule {
        name: "employer_working_lt20",
        applies: is_working_for_small_employer,
        decide: small_employer,
    },
];

/// Classify a completed profile.
///
/// Total over every profile: anything the rule list does not claim (other
/// coverage types, employer coverage while not working, unknown employer
/// size) lands on human review.
pub fn evaluate(profile: &PartBProfile) -> PartBResult {
    for rule in RULES {
        if (rule.applies)(profile) {
            debug!(rule = rule.name, age = profile.age, coverage = %profile.coverage_source, "Part B rule matched");
            return (rule.decide)();
        }
    }
    debug!(age = profile.age, coverage = %profile.coverage_source, "No Part B rule matched, deferring to review");
    needs_review()
}

fn is_under_65(p: &PartBProfile) -> bool {
    p.age < MEDICARE_AGE
}

fn is_cobra(p: &PartBProfile) -> bool {
    p.coverage_source == CoverageSource::Cobra
}

fn is_retiree(p: &PartBProfile) -> bool {
    p.coverage_source == CoverageSource::Retiree
}

fn is_working_for_large_employer(p: &PartBProfile) -> bool {
    p.coverage_source.is_employer()
        && p.currently_working
        && p.employer_size_band == Some(EmployerSizeBand::Ge20)
}

fn is_working_for_small_employer(p: &PartBProfile) -> bool {
    p.coverage_source.is_employer()
        && p.currently_working
        && p.employer_size_band == Some(EmployerSizeBand::Lt20)
}

fn under_65() -> PartBResult {
    DecisionResult::new(
        DecisionStatus::NeedsHumanReview,
        "You are not yet 65.",
        &[
            "Medicare eligibility typically begins at age 65.",
            "This tool is designed for people who are 65 or older.",
        ],
        &[
            "If you are approaching 65, review your enrollment timeline.",
            "Consider speaking with a Medicare advisor as you get closer to eligibility.",
        ],
    )
}

fn cobra() -> PartBResult {
    DecisionResult::new(
        DecisionStatus::LikelyNotSafeToDelay,
        "COBRA coverage usually does not allow you to delay Part B safely.",
        &[
            "COBRA is generally not considered active employer coverage for Medicare delay purposes.",
            "Delaying Part B while on COBRA can result in penalties.",
        ],
        &[
            "Contact Medicare or a licensed advisor immediately.",
            "Confirm your Special Enrollment Period eligibility.",
        ],
    )
}

fn retiree() -> PartBResult {
    DecisionResult::new(
        DecisionStatus::LikelyNotSafeToDelay,
        "Retiree coverage usually does not allow you to delay Part B safely.",
        &[
            "Retiree health plans are not the same as active employer coverage.",
            "Delaying Part B under retiree coverage may result in penalties.",
        ],
        &[
            "Speak with your benefits administrator.",
            "Confirm whether your coverage qualifies for a Special Enrollment Period.",
        ],
    )
}

fn large_employer() -> PartBResult {
    DecisionResult::new(
        DecisionStatus::LikelySafeToDelay,
        "You can likely delay Part B without penalty.",
        &[
            "You are covered under active employer insurance.",
            "The employer has 20 or more employees, which is typically the threshold for delaying Part B.",
        ],
        &[
            "Confirm with your HR department that your coverage is considered primary to Medicare.",
            "Keep documentation of your employer coverage.",
        ],
    )
    .with_caveats(&[
        "Rules can vary in special circumstances.",
        "Always confirm before making a final enrollment decision.",
    ])
}

fn small_employer() -> PartBResult {
    DecisionResult::new(
        DecisionStatus::LikelyNotSafeToDelay,
        "You may not be able to delay Part B safely.",
        &[
            "If the employer has fewer than 20 employees, Medicare may be primary.",
            "Delaying Part B in this situation can result in penalties.",
        ],
        &[
            "Confirm employer size with HR.",
            "Contact Medicare to verify whether you must enroll in Part B.",
        ],
    )
}

fn needs_review() -> PartBResult {
    DecisionResult::new(
        DecisionStatus::NeedsHumanReview,
        "Your situation requires individual review.",
        &["Your coverage type or employment status does not clearly fit standard delay rules."],
        &[
            "Contact Medicare directly.",
            "Speak with a licensed Medicare advisor.",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        age: u32,
        working: bool,
        coverage: CoverageSource,
        band: Option<EmployerSizeBand>,
    ) -> PartBProfile {
        PartBProfile {
            age,
            currently_working: working,
            coverage_source: coverage,
            employer_size_band: band,
            contributing_to_hsa: false,
        }
    }

    #[test]
    fn under_65_wins_over_everything() {
        let p = profile(64, true, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Ge20));
        let result = evaluate(&p);
        assert_eq!(result.classification, DecisionStatus::NeedsHumanReview);
        assert_eq!(result.headline, "You are not yet 65.");
    }

    #[test]
    fn cobra_is_not_safe_even_when_working() {
        let p = profile(66, true, CoverageSource::Cobra, None);
        assert_eq!(evaluate(&p).classification, DecisionStatus::LikelyNotSafeToDelay);
        assert!(evaluate(&p).headline.starts_with("COBRA"));
    }

    #[test]
    fn retiree_is_not_safe() {
        let p = profile(65, false, CoverageSource::Retiree, None);
        let result = evaluate(&p);
        assert_eq!(result.classification, DecisionStatus::LikelyNotSafeToDelay);
        assert!(result.headline.starts_with("Retiree"));
    }

    #[test]
    fn large_employer_is_safe_with_caveats() {
        let p = profile(67, true, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Ge20));
        let result = evaluate(&p);
        assert_eq!(result.classification, DecisionStatus::LikelySafeToDelay);
        assert!(!result.caveats.is_empty());
    }

    #[test]
    fn spouse_employer_counts_as_employer() {
        let p = profile(65, true, CoverageSource::EmployerSpouse, Some(EmployerSizeBand::Ge20));
        assert_eq!(evaluate(&p).classification, DecisionStatus::LikelySafeToDelay);
    }

    #[test]
    fn small_employer_is_not_safe() {
        let p = profile(67, true, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Lt20));
        let result = evaluate(&p);
        assert_eq!(result.classification, DecisionStatus::LikelyNotSafeToDelay);
        assert!(result.caveats.is_empty());
    }

    #[test]
    fn employer_not_working_falls_through_to_review() {
        let p = profile(67, false, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Ge20));
        let result = evaluate(&p);
        assert_eq!(result.classification, DecisionStatus::NeedsHumanReview);
        assert_eq!(result.headline, "Your situation requires individual review.");
    }

    #[test]
    fn employer_unknown_size_falls_through_to_review() {
        let p = profile(67, true, CoverageSource::EmployerSpouse, Some(EmployerSizeBand::Unknown));
        assert_eq!(evaluate(&p).classification, DecisionStatus::NeedsHumanReview);
    }

    #[test]
    fn unknown_coverage_defaults_to_review() {
        let p = profile(70, false, CoverageSource::Unknown, None);
        assert_eq!(evaluate(&p).classification, DecisionStatus::NeedsHumanReview);
    }

    #[test]
    fn every_profile_gets_exactly_one_status() {
        let bands = [
            None,
            Some(EmployerSizeBand::Lt20),
            Some(EmployerSizeBand::Ge20),
            Some(EmployerSizeBand::Unknown),
        ];
        for age in [0, 64, 65, 90] {
            for working in [true, false] {
                for coverage in CoverageSource::ALL {
                    for band in bands {
                        for hsa in [true, false] {
                            let p = PartBProfile {
                                age,
                                currently_working: working,
                                coverage_source: coverage,
                                employer_size_band: band,
                                contributing_to_hsa: hsa,
                            };
                            let result = evaluate(&p);
                            assert!(!result.headline.is_empty());
                            assert!(!result.rationale.is_empty());
                            assert!(!result.next_steps.is_empty());
                            if age < MEDICARE_AGE {
                                assert_eq!(result.classification, DecisionStatus::NeedsHumanReview);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn hsa_answer_does_not_change_outcome() {
        let mut p = profile(67, true, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Lt20));
        let without = evaluate(&p);
        p.contributing_to_hsa = true;
        assert_eq!(evaluate(&p), without);
    }

    #[test]
    fn profile_uses_camel_case_wire_names() {
        let p = profile(67, true, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Ge20));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["coverageSource"], "employer_self");
        assert_eq!(json["employerSizeBand"], "ge20");
        assert_eq!(json["contributingToHSA"], false);

        let p = profile(70, false, CoverageSource::Unknown, None);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("employerSizeBand").is_none());
    }

    #[test]
    fn consistency_requires_size_iff_employer() {
        assert!(profile(67, true, CoverageSource::EmployerSelf, None)
            .check_consistency()
            .is_err());
        assert!(profile(67, true, CoverageSource::Marketplace, Some(EmployerSizeBand::Ge20))
            .check_consistency()
            .is_err());
        assert!(profile(67, true, CoverageSource::EmployerSelf, Some(EmployerSizeBand::Unknown))
            .check_consistency()
            .is_ok());
        assert!(profile(67, true, CoverageSource::Va, None).check_consistency().is_ok());
    }

    #[test]
    fn coverage_keys_round_trip() {
        for coverage in CoverageSource::ALL {
            assert_eq!(CoverageSource::from_key(coverage.key()), Some(coverage));
            let json = serde_json::to_string(&coverage).unwrap();
            assert_eq!(json, format!("\"{coverage}\""));
        }
        assert_eq!(CoverageSource::from_key("employer"), None);
    }
}
