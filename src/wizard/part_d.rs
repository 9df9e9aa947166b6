//! Part D questionnaire: eligibility, drug coverage, creditable coverage
//! (only when there is coverage), and coverage gaps.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::part_d::{Creditable, PartDProfile, PartDResult, TriState};
use crate::error::WizardError;
use crate::report::Report;

use super::question::{Choice, Question};
use super::{Position, Questionnaire, Step, Tool, backward, forward};

/// Shown on the eligibility step after a "no" answer.
pub const INELIGIBLE_NOTICE: &str = "This tool is for people 65 and older. If you're under 65 and have Medicare due to disability or ESRD, a future version may cover your situation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartDStep {
    Eligibility,
    Coverage,
    Creditable,
    Gap,
}

impl PartDStep {
    pub const ORDER: [PartDStep; 4] = [Self::Eligibility, Self::Coverage, Self::Creditable, Self::Gap];
}

fn tri_state_choices() -> Vec<Choice> {
    TriState::ALL
        .iter()
        .map(|t| Choice::new(t.key(), t.label()))
        .collect()
}

impl Step for PartDStep {
    fn label(&self) -> &'static str {
        match self {
            Self::Eligibility => "Eligibility",
            Self::Coverage => "Drug coverage",
            Self::Creditable => "Creditable",
            Self::Gap => "63+ day gap",
        }
    }

    fn question(&self) -> Question {
        match self {
            Self::Eligibility => Question::choice(
                "eligible",
                self.label(),
                "Are you Medicare-eligible now?",
                Some("This tool is for people 65 or older."),
                Choice::yes_no(),
            ),
            Self::Coverage => Question::choice(
                "coverage",
                self.label(),
                "Do you currently have prescription drug coverage?",
                Some("This includes employer plans, VA, TRICARE, union plans, or other drug coverage, not just Medicare Part D."),
                tri_state_choices(),
            ),
            Self::Creditable => Question::choice(
                "creditable",
                self.label(),
                "Is your drug coverage \"creditable\"?",
                Some("Creditable means your plan is expected to pay at least as much as Medicare's standard Part D coverage. Your plan or employer should tell you in writing (e.g., a \"creditable coverage\" notice)."),
                tri_state_choices(),
            ),
            Self::Gap => Question::choice(
                "gap",
                self.label(),
                "Have you gone 63 or more days in a row without creditable drug coverage since you first became eligible for Medicare?",
                Some("A gap of 63+ consecutive days without creditable coverage can trigger a Part D late-enrollment penalty when you later join a Part D plan."),
                tri_state_choices(),
            ),
        }
    }
}

impl std::fmt::Display for PartDStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Eligibility => "eligibility",
            Self::Coverage => "coverage",
            Self::Creditable => "creditable",
            Self::Gap => "gap",
        };
        write!(f, "{s}")
    }
}

pub type PartDPosition = Position<PartDStep>;

// ── Answers ─────────────────────────────────────────────────────────

/// Partial Part D answers. A creditable answer is only held while coverage
/// is "yes".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartDAnswers {
    eligible: Option<bool>,
    coverage: Option<TriState>,
    creditable: Option<TriState>,
    gap: Option<TriState>,
}

impl PartDAnswers {
    pub fn eligible(&self) -> Option<bool> {
        self.eligible
    }

    pub fn coverage(&self) -> Option<TriState> {
        self.coverage
    }

    pub fn creditable(&self) -> Option<TriState> {
        self.creditable
    }

    pub fn gap(&self) -> Option<TriState> {
        self.gap
    }

    pub fn set_eligible(&mut self, eligible: bool) {
        self.eligible = Some(eligible);
    }

    pub fn set_coverage(&mut self, coverage: TriState) {
        self.coverage = Some(coverage);
        if coverage != TriState::Yes {
            self.creditable = None;
        }
    }

    pub fn set_creditable(&mut self, creditable: TriState) -> Result<(), WizardError> {
        if !self.shows_creditable_step() {
            return Err(WizardError::InvalidAnswer {
                step: "creditable".into(),
                input: creditable.to_string(),
                reason: "only asked when you have drug coverage".into(),
            });
        }
        self.creditable = Some(creditable);
        Ok(())
    }

    pub fn set_gap(&mut self, gap: TriState) {
        self.gap = Some(gap);
    }

    pub fn shows_creditable_step(&self) -> bool {
        self.coverage == Some(TriState::Yes)
    }

    pub fn active_steps(&self) -> Vec<PartDStep> {
        PartDStep::ORDER
            .into_iter()
            .filter(|s| *s != PartDStep::Creditable || self.shows_creditable_step())
            .collect()
    }

    pub fn total_steps(&self) -> usize {
        if self.shows_creditable_step() { 4 } else { 3 }
    }

    /// Eligibility only counts as answered once the user said yes.
    pub fn is_answered(&self, step: PartDStep) -> bool {
        match step {
            PartDStep::Eligibility => self.eligible == Some(true),
            PartDStep::Coverage => self.coverage.is_some(),
            PartDStep::Creditable => self.creditable.is_some(),
            PartDStep::Gap => self.gap.is_some(),
        }
    }

    pub fn to_profile(&self) -> Result<PartDProfile, WizardError> {
        let missing = |field: &str| WizardError::IncompleteProfile {
            field: field.to_string(),
        };
        match self.eligible {
            Some(true) => {}
            Some(false) => return Err(WizardError::Ineligible),
            None => return Err(missing("eligible")),
        }
        let coverage = self.coverage.ok_or_else(|| missing("coverage"))?;
        let creditable = if coverage == TriState::Yes {
            Creditable::from(self.creditable.ok_or_else(|| missing("creditable"))?)
        } else {
            Creditable::Skipped
        };
        Ok(PartDProfile {
            eligible: true,
            coverage,
            creditable,
            gap: self.gap.ok_or_else(|| missing("gap"))?,
        })
    }
}

// ── Transitions ─────────────────────────────────────────────────────

/// Where "next" leads from `position`; the creditable step is skipped unless
/// coverage is "yes".
pub fn next_step(position: PartDPosition, answers: &PartDAnswers) -> PartDPosition {
    forward(position, &PartDStep::ORDER, &answers.active_steps())
}

pub fn previous_step(position: PartDPosition, answers: &PartDAnswers) -> PartDPosition {
    backward(position, &PartDStep::ORDER, &answers.active_steps())
}

// ── Wizard ──────────────────────────────────────────────────────────

/// Step sequencer for the Part D check.
#[derive(Debug, Clone, Default)]
pub struct PartDWizard {
    position: PartDPosition,
    answers: PartDAnswers,
    completed: Option<(PartDProfile, PartDResult)>,
}

impl PartDWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> PartDPosition {
        self.position
    }

    pub fn answers(&self) -> &PartDAnswers {
        &self.answers
    }

    pub fn profile(&self) -> Option<&PartDProfile> {
        self.completed.as_ref().map(|(profile, _)| profile)
    }

    pub fn result(&self) -> Option<&PartDResult> {
        self.completed.as_ref().map(|(_, result)| result)
    }

    /// Record eligibility. A "yes" on the eligibility step moves straight on
    /// to the coverage question.
    pub fn set_eligible(&mut self, eligible: bool) -> PartDPosition {
        let before = self.answers.clone();
        self.answers.set_eligible(eligible);
        if self.position == PartDPosition::Question(PartDStep::Eligibility) {
            if eligible {
                let target = next_step(self.position, &self.answers);
                info!(tool = "part_d", from = %self.position, to = %target, "Eligible, moving on");
                self.position = target;
            } else {
                info!(tool = "part_d", "Not eligible, staying on eligibility step");
            }
        } else {
            self.answers_changed(&before);
        }
        self.position
    }

    pub fn set_coverage(&mut self, coverage: TriState) {
        let before = self.answers.clone();
        self.answers.set_coverage(coverage);
        if before.creditable.is_some() && self.answers.creditable.is_none() {
            info!(coverage = %coverage, "Cleared creditable answer");
        }
        self.answers_changed(&before);
    }

    pub fn set_creditable(&mut self, creditable: TriState) -> Result<(), WizardError> {
        let before = self.answers.clone();
        self.answers.set_creditable(creditable)?;
        self.answers_changed(&before);
        Ok(())
    }

    pub fn set_gap(&mut self, gap: TriState) {
        let before = self.answers.clone();
        self.answers.set_gap(gap);
        self.answers_changed(&before);
    }

    /// Drop a stale result for the last question, and step back off a
    /// question that is no longer asked.
    fn answers_changed(&mut self, before: &PartDAnswers) {
        if self.answers == *before {
            return;
        }
        let active = self.answers.active_steps();
        let target = match self.position {
            PartDPosition::Result => {
                self.completed = None;
                previous_step(self.position, &self.answers)
            }
            PartDPosition::Question(step) if !active.contains(&step) => {
                previous_step(self.position, &self.answers)
            }
            _ => return,
        };
        info!(tool = "part_d", from = %self.position, to = %target, "Answers changed, repositioned");
        self.position = target;
    }

    pub fn next(&mut self) -> Result<PartDPosition, WizardError> {
        let step = match self.position {
            PartDPosition::Landing => {
                self.position = next_step(self.position, &self.answers);
                info!(tool = "part_d", to = %self.position, "Wizard started");
                return Ok(self.position);
            }
            PartDPosition::Question(step) => step,
            PartDPosition::Result => {
                return Err(WizardError::NotAtQuestion {
                    position: self.position.to_string(),
                });
            }
        };

        if step == PartDStep::Eligibility && self.answers.eligible == Some(false) {
            return Err(WizardError::Ineligible);
        }
        if !self.answers.is_answered(step) {
            return Err(WizardError::StepIncomplete {
                step: step.to_string(),
            });
        }

        let target = next_step(self.position, &self.answers);
        if target == PartDPosition::Result {
            let profile = self.answers.to_profile()?;
            let result = profile.evaluate();
            info!(tool = "part_d", outcome = %result.classification, "Check completed");
            self.completed = Some((profile, result));
        }
        info!(tool = "part_d", from = %self.position, to = %target, "Wizard advanced");
        self.position = target;
        Ok(target)
    }

    pub fn back(&mut self) -> PartDPosition {
        if self.position == PartDPosition::Result {
            self.completed = None;
        }
        let target = previous_step(self.position, &self.answers);
        info!(tool = "part_d", from = %self.position, to = %target, "Wizard went back");
        self.position = target;
        target
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        info!(tool = "part_d", "Wizard reset");
    }
}

impl Questionnaire for PartDWizard {
    fn tool(&self) -> Tool {
        Tool::PartD
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

    fn notice(&self) -> Option<&'static str> {
        let on_eligibility = self.position == PartDPosition::Question(PartDStep::Eligibility);
        (on_eligibility && self.answers.eligible == Some(false)).then_some(INELIGIBLE_NOTICE)
    }

    fn answer(&mut self, input: &str) -> Result<(), WizardError> {
        let step = self.position.step().ok_or_else(|| WizardError::NotAtQuestion {
            position: self.position.to_string(),
        })?;
        let question = step.question();
        let outcome = question.resolve_choice(input).and_then(|key| {
            if step == PartDStep::Eligibility {
                self.set_eligible(key == "yes");
                return Ok(());
            }
            let value = TriState::from_key(key).ok_or_else(|| WizardError::InvalidAnswer {
                step: question.id.to_string(),
                input: input.to_string(),
                reason: "expected yes, no or not_sure".into(),
            })?;
            match step {
                PartDStep::Coverage => self.set_coverage(value),
                PartDStep::Creditable => self.set_creditable(value)?,
                PartDStep::Gap => self.set_gap(value),
                PartDStep::Eligibility => {}
            }
            Ok(())
        });
        if let Err(ref e) = outcome {
            warn!(tool = "part_d", step = %step, error = %e, "Rejected answer");
        }
        outcome
    }

    fn can_advance(&self) -> bool {
        match self.position {
            PartDPosition::Landing => true,
            PartDPosition::Question(step) => self.answers.is_answered(step),
            PartDPosition::Result => false,
        }
    }

    fn advance(&mut self) -> Result<(), WizardError> {
        self.next().map(|_| ())
    }

    fn back(&mut self) {
        PartDWizard::back(self);
    }

    fn reset(&mut self) {
        PartDWizard::reset(self);
    }

    fn report(&self) -> Option<Report> {
        self.completed
            .as_ref()
            .map(|(profile, result)| Report::part_d(profile, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PartDOutcome;

    fn started() -> PartDWizard {
        let mut wizard = PartDWizard::new();
        wizard.next().unwrap();
        wizard
    }

    #[test]
    fn total_steps_depend_on_coverage() {
        let mut answers = PartDAnswers::default();
        assert_eq!(answers.total_steps(), 3);
        answers.set_coverage(TriState::Yes);
        assert_eq!(answers.total_steps(), 4);
        answers.set_coverage(TriState::NotSure);
        assert_eq!(answers.total_steps(), 3);
    }

    #[test]
    fn eligible_yes_auto_advances() {
        let mut wizard = started();
        assert_eq!(
            wizard.set_eligible(true),
            PartDPosition::Question(PartDStep::Coverage)
        );
        assert_eq!(Questionnaire::index(&wizard), 1);
    }

    #[test]
    fn eligible_no_blocks_with_notice() {
        let mut wizard = started();
        wizard.answer("no").unwrap();
        assert_eq!(wizard.position(), PartDPosition::Question(PartDStep::Eligibility));
        assert_eq!(Questionnaire::notice(&wizard), Some(INELIGIBLE_NOTICE));
        assert!(!Questionnaire::can_advance(&wizard));
        assert_eq!(wizard.next(), Err(WizardError::Ineligible));

        wizard.answer("yes").unwrap();
        assert_eq!(wizard.position(), PartDPosition::Question(PartDStep::Coverage));
        assert_eq!(Questionnaire::notice(&wizard), None);
    }

    #[test]
    fn no_coverage_skips_creditable_both_ways() {
        let mut wizard = started();
        wizard.set_eligible(true);
        wizard.set_coverage(TriState::No);
        assert_eq!(wizard.next(), Ok(PartDPosition::Question(PartDStep::Gap)));
        assert_eq!(Questionnaire::index(&wizard), 2);
        assert_eq!(wizard.back(), PartDPosition::Question(PartDStep::Coverage));
    }

    #[test]
    fn creditable_asked_when_covered() {
        let mut wizard = started();
        wizard.set_eligible(true);
        wizard.set_coverage(TriState::Yes);
        assert_eq!(
            wizard.next(),
            Ok(PartDPosition::Question(PartDStep::Creditable))
        );
        assert!(wizard.next().is_err());
        wizard.set_creditable(TriState::Yes).unwrap();
        assert_eq!(wizard.next(), Ok(PartDPosition::Question(PartDStep::Gap)));
        assert_eq!(Questionnaire::index(&wizard), 3);
        assert_eq!(
            wizard.back(),
            PartDPosition::Question(PartDStep::Creditable)
        );
    }

    #[test]
    fn changing_coverage_clears_creditable() {
        let mut answers = PartDAnswers::default();
        answers.set_coverage(TriState::Yes);
        answers.set_creditable(TriState::No).unwrap();
        answers.set_coverage(TriState::NotSure);
        assert_eq!(answers.creditable(), None);
        answers.set_coverage(TriState::Yes);
        assert_eq!(answers.creditable(), None);
        assert!(answers.set_creditable(TriState::Yes).is_ok());
    }

    #[test]
    fn creditable_rejected_without_coverage() {
        let mut answers = PartDAnswers::default();
        answers.set_coverage(TriState::No);
        assert!(answers.set_creditable(TriState::Yes).is_err());
    }

    #[test]
    fn completes_with_skipped_creditable() {
        let mut wizard = started();
        wizard.set_eligible(true);
        wizard.set_coverage(TriState::No);
        wizard.next().unwrap();
        wizard.set_gap(TriState::No);
        assert_eq!(wizard.next(), Ok(PartDPosition::Result));
        assert_eq!(wizard.profile().unwrap().creditable, Creditable::Skipped);
        assert_eq!(wizard.result().unwrap().classification, PartDOutcome::B);
        assert_eq!(Questionnaire::index(&wizard), 3);
        assert!(wizard.is_complete());
    }

    #[test]
    fn back_from_result_returns_to_gap() {
        let mut wizard = started();
        wizard.set_eligible(true);
        wizard.set_coverage(TriState::Yes);
        wizard.next().unwrap();
        wizard.set_creditable(TriState::Yes).unwrap();
        wizard.next().unwrap();
        wizard.set_gap(TriState::No);
        wizard.next().unwrap();
        assert_eq!(wizard.result().unwrap().classification, PartDOutcome::A);

        assert_eq!(wizard.back(), PartDPosition::Question(PartDStep::Gap));
        assert!(wizard.result().is_none());
    }

    #[test]
    fn back_from_first_question_returns_to_landing() {
        let mut wizard = started();
        assert_eq!(wizard.back(), PartDPosition::Landing);
        assert!(wizard.is_landing());
    }

    #[test]
    fn reset_clears_conditional_answers() {
        let mut wizard = started();
        wizard.set_eligible(true);
        wizard.set_coverage(TriState::Yes);
        wizard.set_creditable(TriState::NotSure).unwrap();
        wizard.reset();
        assert_eq!(wizard.answers(), &PartDAnswers::default());
        assert_eq!(wizard.position(), PartDPosition::Landing);
    }

    fn fully_answered(coverage: TriState) -> PartDWizard {
        let mut wizard = PartDWizard::new();
        wizard.set_eligible(true);
        wizard.set_coverage(coverage);
        if coverage == TriState::Yes {
            wizard.set_creditable(TriState::Yes).unwrap();
        }
        wizard.set_gap(TriState::No);
        wizard
    }

    fn walk_to(wizard: &mut PartDWizard, target: PartDPosition) {
        while wizard.position() != target {
            wizard.next().unwrap();
        }
    }

    #[test]
    fn next_then_back_round_trips_from_every_step() {
        for coverage in TriState::ALL {
            let active = fully_answered(coverage).answers().active_steps();
            for step in active {
                let mut wizard = fully_answered(coverage);
                walk_to(&mut wizard, PartDPosition::Question(step));
                let answers = wizard.answers().clone();
                wizard.next().unwrap();
                wizard.back();
                assert_eq!(
                    wizard.position(),
                    PartDPosition::Question(step),
                    "coverage={coverage} step={step}"
                );
                assert_eq!(wizard.answers(), &answers, "coverage={coverage} step={step}");
            }
        }
    }

    #[test]
    fn dropping_coverage_on_creditable_step_steps_back() {
        let mut wizard = fully_answered(TriState::Yes);
        walk_to(&mut wizard, PartDPosition::Question(PartDStep::Creditable));

        wizard.set_coverage(TriState::No);
        assert_eq!(wizard.position(), PartDPosition::Question(PartDStep::Coverage));
        assert_eq!(Questionnaire::index(&wizard), 1);
        assert!(!wizard.is_landing());
        assert_eq!(Questionnaire::step_label(&wizard), Some("Drug coverage"));
    }

    #[test]
    fn editing_an_answer_at_result_discards_it() {
        let mut wizard = fully_answered(TriState::Yes);
        walk_to(&mut wizard, PartDPosition::Result);
        assert_eq!(wizard.result().unwrap().classification, PartDOutcome::A);

        wizard.set_gap(TriState::Yes);
        assert!(wizard.result().is_none());
        assert!(Questionnaire::report(&wizard).is_none());
        assert_eq!(wizard.position(), PartDPosition::Question(PartDStep::Gap));

        assert_eq!(wizard.next(), Ok(PartDPosition::Result));
        assert_eq!(wizard.result().unwrap().classification, PartDOutcome::B);
    }

    #[test]
    fn turning_ineligible_at_result_blocks_reevaluation() {
        let mut wizard = fully_answered(TriState::No);
        walk_to(&mut wizard, PartDPosition::Result);

        wizard.set_eligible(false);
        assert!(wizard.result().is_none());
        assert_eq!(wizard.position(), PartDPosition::Question(PartDStep::Gap));
        assert_eq!(wizard.next(), Err(WizardError::Ineligible));
        assert_eq!(wizard.position(), PartDPosition::Question(PartDStep::Gap));
    }

    #[test]
    fn gap_question_has_help_text() {
        let question = PartDStep::Gap.question();
        assert!(question.help.is_some_and(|h| h.contains("late-enrollment penalty")));
    }
}
