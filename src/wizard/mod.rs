//! Step-by-step questionnaires that collect a profile.
//!
//! Each tool has a Profile Accumulator (`*Answers`) holding partial answers and
//! a Step Sequencer (`*Wizard`) that owns it. The sequencer decides where
//! "next" and "back" lead given the current answers, guards forward moves on
//! the current step being answered, and runs the rule evaluator once the last
//! question is confirmed.
//!
//! Position indices follow the step count the user sees: the landing page is
//! `-1`, questions are `0..N`, and the result is `N`, where `N` depends on
//! which conditional steps are active.

pub mod part_b;
pub mod part_d;
pub mod question;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::report::Report;

pub use part_b::{PartBAnswers, PartBStep, PartBWizard};
pub use part_d::{PartDAnswers, PartDStep, PartDWizard};
pub use question::{AnswerKind, Choice, Question};

/// Which check is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    PartB,
    PartD,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Self::PartB, Self::PartD];

    pub fn title(&self) -> &'static str {
        match self {
            Self::PartB => "Part B Delay Check",
            Self::PartD => "Part D Coverage Check",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::PartB => {
                "Answer a few questions and get a clear, printable summary of what to confirm before you delay Part B, especially if you're working or covered by an employer plan."
            }
            Self::PartD => {
                "Check whether your drug coverage meets Medicare's requirements and when to enroll."
            }
        }
    }

    /// Heading shown on the landing page before the first question.
    pub fn landing_heading(&self) -> &'static str {
        match self {
            Self::PartB => "Should you delay Medicare Part B?",
            Self::PartD => "Should you delay Medicare Part D?",
        }
    }

    pub fn landing_text(&self) -> &'static str {
        match self {
            Self::PartB => {
                "Answer a few questions and get a clear, printable summary of what to confirm before you delay, especially if you're working or covered by an employer plan."
            }
            Self::PartD => {
                "Answer a few questions to see whether delaying Part D may be reasonable or could lead to a late-enrollment penalty."
            }
        }
    }

    /// A fresh wizard for this tool, positioned on its landing page.
    pub fn new_wizard(&self) -> Box<dyn Questionnaire + Send> {
        match self {
            Self::PartB => Box::new(PartBWizard::new()),
            Self::PartD => Box::new(PartDWizard::new()),
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PartB => "part_b",
            Self::PartD => "part_d",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "part-b" | "part_b" | "partb" | "b" => Ok(Self::PartB),
            "part-d" | "part_d" | "partd" | "d" => Ok(Self::PartD),
            other => Err(format!("unknown tool '{other}', expected part-b or part-d")),
        }
    }
}

/// One question step of a tool.
pub trait Step: Copy + Eq + std::fmt::Debug + std::fmt::Display {
    /// Short name used in progress announcements.
    fn label(&self) -> &'static str;
    fn question(&self) -> Question;
}

/// Where a wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position<S> {
    Landing,
    Question(S),
    Result,
}

impl<S> Default for Position<S> {
    fn default() -> Self {
        Self::Landing
    }
}

impl<S: Step> Position<S> {
    /// Index within the currently active steps: -1 for landing, N for result.
    ///
    /// A question step that is not active has no index.
    pub fn index(&self, active: &[S]) -> Option<isize> {
        match self {
            Self::Landing => Some(-1),
            Self::Question(step) => active.iter().position(|s| s == step).map(|i| i as isize),
            Self::Result => Some(active.len() as isize),
        }
    }

    pub fn step(&self) -> Option<S> {
        match self {
            Self::Question(step) => Some(*step),
            _ => None,
        }
    }
}

impl<S: std::fmt::Display> std::fmt::Display for Position<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Landing => write!(f, "landing"),
            Self::Question(step) => write!(f, "{step}"),
            Self::Result => write!(f, "result"),
        }
    }
}

/// Move forward through `active` steps, skipping inactive ones.
pub(crate) fn forward<S: Step>(position: Position<S>, order: &[S], active: &[S]) -> Position<S> {
    match position {
        Position::Landing => active
            .first()
            .map(|s| Position::Question(*s))
            .unwrap_or(Position::Result),
        Position::Question(step) => {
            let start = order.iter().position(|s| *s == step).map_or(order.len(), |i| i + 1);
            order[start..]
                .iter()
                .find(|s| active.contains(s))
                .map(|s| Position::Question(*s))
                .unwrap_or(Position::Result)
        }
        Position::Result => Position::Result,
    }
}

/// Move backward through `active` steps, skipping inactive ones.
pub(crate) fn backward<S: Step>(position: Position<S>, order: &[S], active: &[S]) -> Position<S> {
    match position {
        Position::Landing => Position::Landing,
        Position::Question(step) => {
            let end = order.iter().position(|s| *s == step).unwrap_or(0);
            order[..end]
                .iter()
                .rev()
                .find(|s| active.contains(s))
                .map(|s| Position::Question(*s))
                .unwrap_or(Position::Landing)
        }
        Position::Result => active
            .last()
            .map(|s| Position::Question(*s))
            .unwrap_or(Position::Landing),
    }
}

/// Tool-independent view of a wizard, used by the presentation layer.
pub trait Questionnaire {
    fn tool(&self) -> Tool;

    /// -1 on the landing page, 0..N on questions, N on the result.
    fn index(&self) -> isize;

    /// Number of question steps given the current answers.
    fn total_steps(&self) -> usize;

    fn is_landing(&self) -> bool {
        self.index() < 0
    }

    fn is_complete(&self) -> bool {
        self.index() == self.total_steps() as isize
    }

    fn step_label(&self) -> Option<&'static str>;

    fn question(&self) -> Option<Question>;

    /// Informational message about the current step, e.g. why the user
    /// cannot continue.
    fn notice(&self) -> Option<&'static str> {
        None
    }

    /// Record free-form input as the answer to the current question.
    fn answer(&mut self, input: &str) -> Result<(), WizardError>;

    fn can_advance(&self) -> bool;

    /// Leave the landing page or confirm the current answer.
    fn advance(&mut self) -> Result<(), WizardError>;

    fn back(&mut self);

    /// Discard every answer and the result, and return to the landing page.
    fn reset(&mut self);

    /// The printable report once the result has been computed.
    fn report(&self) -> Option<Report>;
}
