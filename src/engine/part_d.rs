//! Part D delay rules.
//!
//! Unlike Part B, the text bundle depends only on the outcome bucket, not on
//! which rule fired.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::result::{Classification, DecisionResult, DecisionStatus};

pub type PartDResult = DecisionResult<PartDOutcome>;

// ── Profile ─────────────────────────────────────────────────────────

/// A yes / no / not sure answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    Yes,
    No,
    NotSure,
}

impl TriState {
    pub const ALL: [TriState; 3] = [Self::Yes, Self::No, Self::NotSure];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotSure => "not_sure",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::NotSure => "Not sure",
        }
    }
}

impl std::fmt::Display for TriState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Creditable-coverage answer; `Skipped` when the user has no drug coverage
/// to ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Creditable {
    Yes,
    No,
    NotSure,
    Skipped,
}

impl Creditable {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::NotSure => "Not sure",
            Self::Skipped => "Skipped",
        }
    }
}

impl From<TriState> for Creditable {
    fn from(value: TriState) -> Self {
        match value {
            TriState::Yes => Self::Yes,
            TriState::No => Self::No,
            TriState::NotSure => Self::NotSure,
        }
    }
}

impl std::fmt::Display for Creditable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotSure => "not_sure",
            Self::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

/// A completed Part D questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDProfile {
    pub eligible: bool,
    pub coverage: TriState,
    pub creditable: Creditable,
    /// 63 or more consecutive days without creditable coverage.
    pub gap: TriState,
}

impl PartDProfile {
    pub fn outcome(&self) -> PartDOutcome {
        evaluate_part_d(self.coverage, self.creditable, self.gap)
    }

    pub fn evaluate(&self) -> PartDResult {
        part_d_result(self.outcome())
    }

    /// Check eligibility and that creditable is skipped exactly when there is
    /// no coverage to ask about.
    pub fn check_consistency(&self) -> Result<(), String> {
        if !self.eligible {
            return Err("the Part D check only applies to people who are Medicare-eligible now".into());
        }
        let skipped = self.creditable == Creditable::Skipped;
        match (self.coverage == TriState::Yes, skipped) {
            (true, true) => Err("creditable must be answered when coverage is yes".into()),
            (false, false) => Err(format!(
                "creditable must be skipped when coverage is {}",
                self.coverage
            )),
            _ => Ok(()),
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// A = safe to delay, B = caution, C = needs confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartDOutcome {
    A,
    B,
    C,
}

impl Classification for PartDOutcome {
    const FIELD: &'static str = "outcome";

    fn status(&self) -> DecisionStatus {
        match self {
            Self::A => DecisionStatus::LikelySafeToDelay,
            Self::B => DecisionStatus::LikelyNotSafeToDelay,
            Self::C => DecisionStatus::NeedsHumanReview,
        }
    }
}

impl std::fmt::Display for PartDOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        write!(f, "{s}")
    }
}

// ── Rules ───────────────────────────────────────────────────────────

struct Rule {
    name: &'static str,
    applies: fn(TriState, Creditable, TriState) -> bool,
    outcome: PartDOutcome,
}

const RULES: &[Rule] = &[
    Rule {
        name: "no_coverage",
        applies: no_coverage,
        outcome: PartDOutcome::B,
    },
    Rule {
        name: "unsure_coverage",
        applies: unsure_coverage,
        outcome: PartDOutcome::C,
    },
    Rule {
        name: "not_creditable",
        applies: not_creditable,
        outcome: PartDOutcome::B,
    },
    Rule {
        name: "unsure_creditable",
        applies: unsure_creditable,
        outcome: PartDOutcome::C,
    },
    Rule {
        name: "gap",
        applies: had_gap,
        outcome: PartDOutcome::B,
    },
    Rule {
        name: "unsure_gap",
        applies: unsure_gap,
        outcome: PartDOutcome::C,
    },
];

/// Classify a set of Part D answers. First match wins; no match is A.
pub fn evaluate_part_d(coverage: TriState, creditable: Creditable, gap: TriState) -> PartDOutcome {
    for rule in RULES {
        if (rule.applies)(coverage, creditable, gap) {
            debug!(rule = rule.name, outcome = %rule.outcome, "Part D rule matched");
            return rule.outcome;
        }
    }
    debug!("No Part D risk rule matched, delay likely appropriate");
    PartDOutcome::A
}

fn no_coverage(coverage: TriState, _: Creditable, _: TriState) -> bool {
    coverage == TriState::No
}

fn unsure_coverage(coverage: TriState, _: Creditable, _: TriState) -> bool {
    coverage == TriState::NotSure
}

fn not_creditable(_: TriState, creditable: Creditable, _: TriState) -> bool {
    creditable == Creditable::No
}

fn unsure_creditable(_: TriState, creditable: Creditable, _: TriState) -> bool {
    creditable == Creditable::NotSure
}

fn had_gap(_: TriState, _: Creditable, gap: TriState) -> bool {
    gap == TriState::Yes
}

fn unsure_gap(_: TriState, _: Creditable, gap: TriState) -> bool {
    gap == TriState::NotSure
}

/// The fixed text bundle for an outcome bucket.
pub fn part_d_result(outcome: PartDOutcome) -> PartDResult {
    match outcome {
        PartDOutcome::A => DecisionResult::new(
            outcome,
            "Your current drug coverage appears creditable with no penalty-triggering gap, so delaying Part D may be reasonable.",
            &[
                "You reported having prescription drug coverage and that it is creditable.",
                "You have not had 63 or more consecutive days without creditable coverage since you became eligible.",
                "Under Medicare's rules, delaying Part D while you keep creditable coverage generally does not lead to a late-enrollment penalty when you enroll later.",
            ],
            &[
                "Keep proof of creditable coverage (e.g., annual notice, plan documents).",
                "Re-check whenever your drug coverage changes or ends.",
                "When you lose creditable coverage, enroll in Part D within 63 days to avoid a penalty.",
                "Confirm your plan's written \"creditable coverage\" notice is current and accurate.",
                "Confirm you understand when your coverage will end so you can enroll in Part D in time.",
            ],
        ),
        PartDOutcome::B => DecisionResult::new(
            outcome,
            "Your answers suggest a risk of a Part D late-enrollment penalty. Confirm your situation before delaying Part D.",
            &[
                "You either have no current drug coverage, your coverage is not creditable, or you have had 63+ consecutive days without creditable coverage since becoming eligible.",
                "Medicare may charge a Part D late-enrollment penalty for months you were without creditable coverage when you could have enrolled; the penalty is added to your premium for as long as you have Part D.",
                "Enrolling in Part D soon, or getting written confirmation that your current coverage is creditable, can help you avoid or limit the penalty.",
            ],
            &[
                "If you have no coverage or it's not creditable: compare Part D plans and consider enrolling during an open or special enrollment period.",
                "If you had a 63+ day gap: gather dates and proof of when you had or lost coverage.",
                "Request a written \"creditable coverage\" determination from your current plan or employer if you believe your coverage is creditable.",
                "Confirm exact dates of any period without creditable coverage.",
                "Confirm whether you're in a valid enrollment period (initial, open, or special enrollment period).",
            ],
        ),
        PartDOutcome::C => DecisionResult::new(
            outcome,
            "Your situation isn't clear enough to say whether delaying Part D is safe. Gather a few details and confirm with your plan or Medicare.",
            &[
                "You indicated \"Not sure\" for at least one of: having drug coverage, whether it's creditable, or whether you've had 63+ days without creditable coverage.",
                "The Part D penalty depends on creditable coverage and gaps; without clarity, we can't tell if you're at risk.",
                "A written creditable-coverage notice plus your coverage dates will clarify next steps.",
            ],
            &[
                "Request a written \"creditable coverage\" notice from your plan or employer.",
                "Gather start/end dates for any past drug coverage to see if you had 63+ consecutive days without creditable coverage.",
                "Call Medicare (1-800-MEDICARE) or your State Health Insurance Assistance Program (SHIP) to review your dates and coverage.",
                "Confirm whether your coverage meets Medicare's definition of creditable.",
                "Confirm whether you've ever had 63+ consecutive days without creditable coverage since you became eligible.",
            ],
        ),
    }
}
