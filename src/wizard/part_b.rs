//! Part B questionnaire: age, working status, coverage source, employer size
//! (employer coverage only), and HSA contributions.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::part_b::{self, CoverageSource, EmployerSizeBand, PartBProfile, PartBResult};
use crate::error::WizardError;
use crate::report::Report;

use super::question::{Choice, Question, parse_age};
use super::{Position, Questionnaire, Step, Tool, backward, forward};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartBStep {
    Age,
    Working,
    Coverage,
    EmployerSize,
    Hsa,
}

impl PartBStep {
    pub const ORDER: [PartBStep; 5] = [
        Self::Age,
        Self::Working,
        Self::Coverage,
        Self::EmployerSize,
        Self::Hsa,
    ];
}

impl Step for PartBStep {
    fn label(&self) -> &'static str {
        match self {
            Self::Age => "Your age",
            Self::Working => "Working status",
            Self::Coverage => "Coverage source",
            Self::EmployerSize => "Employer size",
            Self::Hsa => "HSA contribution",
        }
    }

    fn question(&self) -> Question {
        match self {
            Self::Age => Question {
                id: "age",
                label: self.label(),
                prompt: "Your age",
                help: None,
                kind: super::AnswerKind::Number,
            },
            Self::Working => Question::choice(
                "working",
                self.label(),
                "Are you currently working (or is your spouse working if coverage is through them)?",
                None,
                Choice::yes_no(),
            ),
            Self::Coverage => Question::choice(
                "coverage_source",
                self.label(),
                "Where is your current health coverage from?",
                None,
                CoverageSource::ALL
                    .iter()
                    .map(|c| Choice::new(c.key(), c.label()))
                    .collect(),
            ),
            Self::EmployerSize => Question::choice(
                "employer_size",
                self.label(),
                "Does the employer have 20 or more employees?",
                None,
                EmployerSizeBand::ALL
                    .iter()
                    .map(|b| Choice::new(b.key(), b.label()))
                    .collect(),
            ),
            Self::Hsa => Question::choice(
                "hsa",
                self.label(),
                "Are you currently contributing to an HSA?",
                None,
                Choice::yes_no(),
            ),
        }
    }
}

impl std::fmt::Display for PartBStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Age => "age",
            Self::Working => "working",
            Self::Coverage => "coverage",
            Self::EmployerSize => "employer_size",
            Self::Hsa => "hsa",
        };
        write!(f, "{s}")
    }
}

pub type PartBPosition = Position<PartBStep>;

// ── Answers ─────────────────────────────────────────────────────────

/// Partial Part B answers.
///
/// The employer size is only ever held alongside employer coverage: choosing
/// any other coverage source drops it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartBAnswers {
    age: Option<u32>,
    currently_working: Option<bool>,
    coverage_source: Option<CoverageSource>,
    employer_size_band: Option<EmployerSizeBand>,
    contributing_to_hsa: Option<bool>,
}

impl PartBAnswers {
    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn currently_working(&self) -> Option<bool> {
        self.currently_working
    }

    pub fn coverage_source(&self) -> Option<CoverageSource> {
        self.coverage_source
    }

    pub fn employer_size_band(&self) -> Option<EmployerSizeBand> {
        self.employer_size_band
    }

    pub fn contributing_to_hsa(&self) -> Option<bool> {
        self.contributing_to_hsa
    }

    /// Parse and store the age. Invalid input clears any previous age.
    pub fn set_age(&mut self, input: &str) -> Result<u32, WizardError> {
        match parse_age("age", input) {
            Ok(age) => {
                self.age = Some(age);
                Ok(age)
            }
            Err(e) => {
                self.age = None;
                Err(e)
            }
        }
    }

    pub fn set_currently_working(&mut self, working: bool) {
        self.currently_working = Some(working);
    }

    pub fn set_coverage_source(&mut self, source: CoverageSource) {
        self.coverage_source = Some(source);
        if !source.is_employer() {
            self.employer_size_band = None;
        }
    }

    pub fn set_employer_size_band(&mut self, band: EmployerSizeBand) -> Result<(), WizardError> {
        if !self.shows_employer_step() {
            return Err(WizardError::InvalidAnswer {
                step: "employer_size".into(),
                input: band.to_string(),
                reason: "employer size only applies to employer coverage".into(),
            });
        }
        self.employer_size_band = Some(band);
        Ok(())
    }

    pub fn set_contributing_to_hsa(&mut self, contributing: bool) {
        self.contributing_to_hsa = Some(contributing);
    }

    pub fn shows_employer_step(&self) -> bool {
        self.coverage_source.is_some_and(|c| c.is_employer())
    }

    /// Question steps in order, given the answers so far.
    pub fn active_steps(&self) -> Vec<PartBStep> {
        PartBStep::ORDER
            .into_iter()
            .filter(|s| *s != PartBStep::EmployerSize || self.shows_employer_step())
            .collect()
    }

    pub fn total_steps(&self) -> usize {
        if self.shows_employer_step() { 5 } else { 4 }
    }

    pub fn is_answered(&self, step: PartBStep) -> bool {
        match step {
            PartBStep::Age => self.age.is_some(),
            PartBStep::Working => self.currently_working.is_some(),
            PartBStep::Coverage => self.coverage_source.is_some(),
            PartBStep::EmployerSize => self.employer_size_band.is_some(),
            PartBStep::Hsa => self.contributing_to_hsa.is_some(),
        }
    }

    /// Freeze the answers into a profile.
    pub fn to_profile(&self) -> Result<PartBProfile, WizardError> {
        let missing = |field: &str| WizardError::IncompleteProfile {
            field: field.to_string(),
        };
        let coverage_source = self.coverage_source.ok_or_else(|| missing("coverageSource"))?;
        let employer_size_band = if coverage_source.is_employer() {
            Some(self.employer_size_band.ok_or_else(|| missing("employerSizeBand"))?)
        } else {
            None
        };
        Ok(PartBProfile {
            age: self.age.ok_or_else(|| missing("age"))?,
            currently_working: self
                .currently_working
                .ok_or_else(|| missing("currentlyWorking"))?,
            coverage_source,
            employer_size_band,
            contributing_to_hsa: self
                .contributing_to_hsa
                .ok_or_else(|| missing("contributingToHSA"))?,
        })
    }
}

// ── Transitions ─────────────────────────────────────────────────────

/// Where "next" leads from `position`. The employer size step is skipped
/// unless coverage is employer based; the last question leads to the result.
pub fn next_step(position: PartBPosition, answers: &PartBAnswers) -> PartBPosition {
    forward(position, &PartBStep::ORDER, &answers.active_steps())
}

/// Where "back" leads from `position`; the inverse of [`next_step`].
pub fn previous_step(position: PartBPosition, answers: &PartBAnswers) -> PartBPosition {
    backward(position, &PartBStep::ORDER, &answers.active_steps())
}

// ── Wizard ──────────────────────────────────────────────────────────

/// Step sequencer for the Part B check.
#[derive(Debug, Clone, Default)]
pub struct PartBWizard {
    position: PartBPosition,
    answers: PartBAnswers,
    completed: Option<(PartBProfile, PartBResult)>,
}

impl PartBWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> PartBPosition {
        self.position
    }

    pub fn answers(&self) -> &PartBAnswers {
        &self.answers
    }

    pub fn profile(&self) -> Option<&PartBProfile> {
        self.completed.as_ref().map(|(profile, _)| profile)
    }

    pub fn result(&self) -> Option<&PartBResult> {
        self.completed.as_ref().map(|(_, result)| result)
    }

    pub fn set_age(&mut self, input: &str) -> Result<u32, WizardError> {
        let before = self.answers.clone();
        let outcome = self.answers.set_age(input);
        self.answers_changed(&before);
        outcome
    }

    pub fn set_currently_working(&mut self, working: bool) {
        let before = self.answers.clone();
        self.answers.set_currently_working(working);
        self.answers_changed(&before);
    }

    pub fn set_coverage_source(&mut self, source: CoverageSource) {
        let before = self.answers.clone();
        self.answers.set_coverage_source(source);
        if before.employer_size_band.is_some() && self.answers.employer_size_band.is_none() {
            info!(coverage = %source, "Cleared employer size for non-employer coverage");
        }
        self.answers_changed(&before);
    }

    pub fn set_employer_size_band(&mut self, band: EmployerSizeBand) -> Result<(), WizardError> {
        let before = self.answers.clone();
        self.answers.set_employer_size_band(band)?;
        self.answers_changed(&before);
        Ok(())
    }

    pub fn set_contributing_to_hsa(&mut self, contributing: bool) {
        let before = self.answers.clone();
        self.answers.set_contributing_to_hsa(contributing);
        self.answers_changed(&before);
    }

    /// Keep the position and result in step with edited answers: a computed
    /// result is dropped in favour of the last question, and a step that is
    /// no longer asked gives way to the one before it.
    fn answers_changed(&mut self, before: &PartBAnswers) {
        if self.answers == *before {
            return;
        }
        let active = self.answers.active_steps();
        let target = match self.position {
            PartBPosition::Result => {
                self.completed = None;
                previous_step(self.position, &self.answers)
            }
            PartBPosition::Question(step) if !active.contains(&step) => {
                previous_step(self.position, &self.answers)
            }
            _ => return,
        };
        info!(tool = "part_b", from = %self.position, to = %target, "Answers changed, repositioned");
        self.position = target;
    }

    /// Move forward, evaluating the profile when leaving the last question.
    pub fn next(&mut self) -> Result<PartBPosition, WizardError> {
        let step = match self.position {
            PartBPosition::Landing => {
                self.position = next_step(self.position, &self.answers);
                info!(tool = "part_b", to = %self.position, "Wizard started");
                return Ok(self.position);
            }
            PartBPosition::Question(step) => step,
            PartBPosition::Result => {
                return Err(WizardError::NotAtQuestion {
                    position: self.position.to_string(),
                });
            }
        };

        if !self.answers.is_answered(step) {
            return Err(WizardError::StepIncomplete {
                step: step.to_string(),
            });
        }

        let target = next_step(self.position, &self.answers);
        if target == PartBPosition::Result {
            let profile = self.answers.to_profile()?;
            let result = part_b::evaluate(&profile);
            info!(tool = "part_b", status = %result.classification, "Check completed");
            self.completed = Some((profile, result));
        }
        info!(tool = "part_b", from = %self.position, to = %target, "Wizard advanced");
        self.position = target;
        Ok(target)
    }

    /// Move backward. Leaving the result discards it.
    pub fn back(&mut self) -> PartBPosition {
        if self.position == PartBPosition::Result {
            self.completed = None;
        }
        let target = previous_step(self.position, &self.answers);
        info!(tool = "part_b", from = %self.position, to = %target, "Wizard went back");
        self.position = target;
        target
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        info!(tool = "part_b", "Wizard reset");
    }
}

fn is_yes(key: &str) -> bool {
    key == "yes"
}

impl Questionnaire for PartBWizard {
    fn tool(&self) -> Tool {
        Tool::PartB
    }

    fn index(&self) -> isize {
        self.position
            .index(&self.answers.active_steps())
            .unwrap_or(-1)
    }

    fn total_steps(&self) -> usize {
        self.answers.total_steps()
    }

    fn step_label(&self) -> Option<&'static str> {
        self.position.step().map(|s| s.label())
    }

    fn question(&self) -> Option<Question> {
        self.position.step().map(|s| s.question())
    }

    fn answer(&mut self, input: &str) -> Result<(), WizardError> {
        let step = self.position.step().ok_or_else(|| WizardError::NotAtQuestion {
            position: self.position.to_string(),
        })?;
        let question = step.question();
        let outcome = match step {
            PartBStep::Age => self.set_age(input).map(|_| ()),
            PartBStep::Working => question
                .resolve_choice(input)
                .map(|key| self.set_currently_working(is_yes(key))),
            PartBStep::Coverage => question.resolve_choice(input).and_then(|key| {
                let source = CoverageSource::from_key(key).ok_or_else(|| {
                    WizardError::InvalidAnswer {
                        step: question.id.to_string(),
                        input: input.to_string(),
                        reason: "unknown coverage source".into(),
                    }
                })?;
                self.set_coverage_source(source);
                Ok(())
            }),
            PartBStep::EmployerSize => question.resolve_choice(input).and_then(|key| {
                let band = EmployerSizeBand::from_key(key).ok_or_else(|| {
                    WizardError::InvalidAnswer {
                        step: question.id.to_string(),
                        input: input.to_string(),
                        reason: "unknown employer size".into(),
                    }
                })?;
                self.set_employer_size_band(band)
            }),
            PartBStep::Hsa => question
                .resolve_choice(input)
                .map(|key| self.set_contributing_to_hsa(is_yes(key))),
        };
        if let Err(ref e) = outcome {
            warn!(tool = "part_b", step = %step, error = %e, "Rejected answer");
        }
        outcome
    }

    fn can_advance(&self) -> bool {
        match self.position {
            PartBPosition::Landing => true,
            PartBPosition::Question(step) => self.answers.is_answered(step),
            PartBPosition::Result => false,
        }
    }

    fn advance(&mut self) -> Result<(), WizardError> {
        self.next().map(|_| ())
    }

    fn back(&mut self) {
        PartBWizard::back(self);
    }

    fn reset(&mut self) {
        PartBWizard::reset(self);
    }

    fn report(&self) -> Option<Report> {
        self.completed
            .as_ref()
            .map(|(profile, result)| Report::part_b(profile, result))
    }
}
