//! Decision results shared by both tools.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// The three-way classification every check ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    LikelySafeToDelay,
    LikelyNotSafeToDelay,
    NeedsHumanReview,
}

impl DecisionStatus {
    /// Short badge text shown above the headline.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LikelySafeToDelay => "Delay likely appropriate",
            Self::LikelyNotSafeToDelay => "Caution advised",
            Self::NeedsHumanReview => "Needs confirmation",
        }
    }
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LikelySafeToDelay => "likely_safe_to_delay",
            Self::LikelyNotSafeToDelay => "likely_not_safe_to_delay",
            Self::NeedsHumanReview => "needs_human_review",
        };
        write!(f, "{s}")
    }
}

/// A tool-specific classification that maps onto a [`DecisionStatus`].
pub trait Classification: Copy + PartialEq + std::fmt::Debug + std::fmt::Display {
    /// Key the classification is written under in a serialized result.
    const FIELD: &'static str;

    fn status(&self) -> DecisionStatus;
}

impl Classification for DecisionStatus {
    const FIELD: &'static str = "status";

    fn status(&self) -> DecisionStatus {
        *self
    }
}

/// Outcome of a rule evaluator. Immutable once produced.
///
/// The classification is keyed by [`Classification::FIELD`], so a Part B
/// result carries `status` and a Part D result carries `outcome`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult<C> {
    #[serde(alias = "status", alias = "outcome")]
    pub classification: C,
    /// One-sentence answer.
    pub headline: String,
    pub rationale: Vec<String>,
    pub next_steps: Vec<String>,
    /// Soft warnings. Empty for most branches.
    #[serde(default)]
    pub caveats: Vec<String>,
}

impl<C: Classification + Serialize> Serialize for DecisionResult<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.caveats.is_empty() { 4 } else { 5 };
        let mut state = serializer.serialize_struct("DecisionResult", len)?;
        state.serialize_field(C::FIELD, &self.classification)?;
        state.serialize_field("headline", &self.headline)?;
        state.serialize_field("rationale", &self.rationale)?;
        state.serialize_field("nextSteps", &self.next_steps)?;
        if self.caveats.is_empty() {
            state.skip_field("caveats")?;
        } else {
            state.serialize_field("caveats", &self.caveats)?;
        }
        state.end()
    }
}

impl<C: Classification> DecisionResult<C> {
    pub fn new(classification: C, headline: &str, rationale: &[&str], next_steps: &[&str]) -> Self {
        Self {
            classification,
            headline: headline.to_string(),
            rationale: to_owned_lines(rationale),
            next_steps: to_owned_lines(next_steps),
            caveats: Vec::new(),
        }
    }

    pub fn with_caveats(mut self, caveats: &[&str]) -> Self {
        self.caveats = to_owned_lines(caveats);
        self
    }

    pub fn status(&self) -> DecisionStatus {
        self.classification.status()
    }
}

fn to_owned_lines(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}
