//! Question catalogue entries and answer matching.

use serde::Serialize;

use crate::error::WizardError;

/// A selectable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub key: &'static str,
    pub label: &'static str,
}

impl Choice {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }

    pub fn yes_no() -> Vec<Choice> {
        vec![Self::new("yes", "Yes"), Self::new("no", "No")]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerKind {
    /// A non-negative number.
    Number,
    Choice { options: Vec<Choice> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    pub kind: AnswerKind,
}

impl Question {
    pub fn choice(
        id: &'static str,
        label: &'static str,
        prompt: &'static str,
        help: Option<&'static str>,
        options: Vec<Choice>,
    ) -> Self {
        Self {
            id,
            label,
            prompt,
            help,
            kind: AnswerKind::Choice { options },
        }
    }

    pub fn options(&self) -> &[Choice] {
        match &self.kind {
            AnswerKind::Choice { options } => options,
            AnswerKind::Number => &[],
        }
    }

    /// Resolve user input to an option key.
    ///
    /// Accepts the key, the label, or the 1-based option number, ignoring
    /// case; "y" and "n" stand in for yes and no.
    pub fn resolve_choice(&self, input: &str) -> Result<&'static str, WizardError> {
        let input = input.trim();
        let options = self.options();
        let expanded = match input.to_ascii_lowercase().as_str() {
            "y" => "yes".to_string(),
            "n" => "no".to_string(),
            other => other.replace(' ', "_"),
        };

        if let Some(choice) = options
            .iter()
            .find(|c| c.key == expanded || c.label.eq_ignore_ascii_case(input))
        {
            return Ok(choice.key);
        }

        if let Some(choice) = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
        {
            return Ok(choice.key);
        }

        let expected: Vec<&str> = options.iter().map(|c| c.key).collect();
        Err(WizardError::InvalidAnswer {
            step: self.id.to_string(),
            input: input.to_string(),
            reason: format!("expected one of: {}", expected.join(", ")),
        })
    }
}

/// Parse a non-negative age, rounding fractional input down.
pub fn parse_age(step: &str, input: &str) -> Result<u32, WizardError> {
    let trimmed = input.trim();
    let invalid = |reason: &str| WizardError::InvalidAnswer {
        step: step.to_string(),
        input: trimmed.to_string(),
        reason: reason.to_string(),
    };
    let value: f64 = trimmed.parse().map_err(|_| invalid("enter a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid("enter a non-negative number"));
    }
    if value > f64::from(u32::MAX) {
        return Err(invalid("age is out of range"));
    }
    Ok(value.floor() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage_like() -> Question {
        Question::choice(
            "coverage",
            "Drug coverage",
            "Do you currently have prescription drug coverage?",
            None,
            vec![
                Choice::new("yes", "Yes"),
                Choice::new("no", "No"),
                Choice::new("not_sure", "Not sure"),
            ],
        )
    }

    #[test]
    fn resolves_key_label_and_number() {
        let q = coverage_like();
        assert_eq!(q.resolve_choice("no"), Ok("no"));
        assert_eq!(q.resolve_choice("Not sure"), Ok("not_sure"));
        assert_eq!(q.resolve_choice("not sure"), Ok("not_sure"));
        assert_eq!(q.resolve_choice("3"), Ok("not_sure"));
        assert_eq!(q.resolve_choice(" Y "), Ok("yes"));
    }

    #[test]
    fn rejects_out_of_range_and_unknown() {
        let q = coverage_like();
        assert!(q.resolve_choice("0").is_err());
        assert!(q.resolve_choice("4").is_err());
        let err = q.resolve_choice("maybe").unwrap_err();
        match err {
            WizardError::InvalidAnswer { step, reason, .. } => {
                assert_eq!(step, "coverage");
                assert!(reason.contains("not_sure"));
            }
            other => panic!("Expected InvalidAnswer, got {:?}", other),
        }
    }

    #[test]
    fn parse_age_floors_and_rejects_negative() {
        assert_eq!(parse_age("age", "67"), Ok(67));
        assert_eq!(parse_age("age", " 65.9 "), Ok(65));
        assert_eq!(parse_age("age", "0"), Ok(0));
        assert!(parse_age("age", "-1").is_err());
        assert!(parse_age("age", "").is_err());
        assert!(parse_age("age", "sixty").is_err());
        assert!(parse_age("age", "NaN").is_err());
        assert!(parse_age("age", "inf").is_err());
    }

    #[test]
    fn question_serializes_kind_tag() {
        let json = serde_json::to_value(coverage_like()).unwrap();
        assert_eq!(json["kind"]["type"], "choice");
        assert_eq!(json["kind"]["options"][2]["key"], "not_sure");
        assert!(json.get("help").is_none());
    }
}
