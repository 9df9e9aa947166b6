//! Printable summary of a completed check.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{
    Classification, DecisionResult, DecisionStatus, PartBProfile, PartBResult, PartDProfile,
    PartDResult,
};
use crate::wizard::Tool;

const METHOD: &str =
    "Method: Decision logic reflects Medicare's published guidance (see Medicare.gov links).";

const PART_B_DISCLAIMER: &str = "This is educational guidance, not legal or medical advice. Always confirm enrollment decisions with Medicare or a licensed advisor.";

const PART_D_DISCLAIMER: &str = "This is educational guidance, not legal or medical advice. Always confirm enrollment and penalty questions with Medicare or a licensed advisor.";

// ── Part B lists ────────────────────────────────────────────────────

const PART_B_EMPLOYER_QUESTIONS: &[&str] = &[
    "Is our employer plan considered primary to Medicare at my age?",
    "Will you complete CMS Form L564 if I delay Part B?",
    "What happens to my coverage when I retire or stop working?",
];

const PART_B_OTHER_QUESTIONS: &[&str] = &[
    "Does this coverage qualify me for a Special Enrollment Period?",
    "When does my enrollment window begin and end?",
    "What documentation will Medicare require from me?",
];

const PART_B_EMPLOYER_DOCUMENTS: &[&str] = &[
    "Proof of employer coverage (plan documents, ID card, or confirmation letter)",
    "Employer size confirmation (20+ threshold)",
    "Coverage start date",
    "HR contact information",
];

const PART_B_OTHER_DOCUMENTS: &[&str] = &[
    "COBRA / retiree plan documents",
    "Coverage start and termination dates",
    "Any Medicare correspondence",
];

const PART_B_RECHECK: &[&str] = &[
    "If you stop working",
    "If employer size changes",
    "If you drop employer coverage",
    "If you begin receiving Social Security",
];

// ── Part D lists ────────────────────────────────────────────────────

const PART_D_QUESTIONS: &[&str] = &[
    "Is my drug coverage considered creditable for Medicare Part D?",
    "When does my current drug coverage end?",
    "Do I qualify for a special enrollment period if my coverage ends?",
    "Have you recorded any gaps in my creditable coverage history?",
];

const PART_D_DOCUMENTS: &[&str] = &[
    "Written \"creditable coverage\" notice(s) from your plan or employer (current and past, if relevant).",
    "Proof of prescription drug coverage (plan name, ID, coverage dates).",
    "Any letters or notices from Medicare about Part D or penalties.",
    "Notes with dates if you had a period without drug coverage (start/end).",
];

const PART_D_RECHECK: &[&str] = &[
    "You lose or change your prescription drug coverage.",
    "Your plan or employer says your coverage is no longer creditable.",
    "You're approaching 63 days without creditable coverage.",
    "You turn 65 or first become eligible and don't have drug coverage.",
    "You get a letter from Medicare about Part D or a penalty.",
];

// ── Types ───────────────────────────────────────────────────────────

/// One humanized answer in "What this is based on".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub label: String,
    pub value: String,
}

impl Fact {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub title: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

const PART_B_RESOURCES: &[Resource] = &[
    Resource {
        title: "When can I sign up for Medicare?",
        url: "https://www.medicare.gov/basics/get-started-with-medicare/sign-up/when-can-i-sign-up-for-medicare",
        description: "Medicare.gov: explains initial and special enrollment periods.",
    },
    Resource {
        title: "Avoid late enrollment penalties",
        url: "https://www.medicare.gov/basics/costs/medicare-costs/avoid-penalties",
        description: "Medicare.gov: how to avoid extra costs from signing up late.",
    },
    Resource {
        title: "COBRA coverage",
        url: "https://www.medicare.gov/basics/get-started-with-medicare/medicare-basics/working-past-65/cobra-coverage",
        description: "Medicare.gov: how COBRA works with Medicare and enrollment timing.",
    },
    Resource {
        title: "Medicare & You 2026 (PDF)",
        url: "https://www.medicare.gov/publications/10050-medicare-and-you.pdf",
        description: "Official handbook: benefits, costs, and your rights.",
    },
    Resource {
        title: "Enrolling in Medicare Part A & Part B (PDF)",
        url: "https://www.medicare.gov/publications/11036-Enrolling-Part-A-Part-B.pdf",
        description: "Step-by-step enrollment guide and special situations.",
    },
    Resource {
        title: "Sign up for Part B only",
        url: "https://www.ssa.gov/medicare/sign-up/part-b-only",
        description: "SSA: add Part B when you already have Part A.",
    },
];

/// Everything the result page shows, in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub tool: Tool,
    pub title: &'static str,
    pub generated_at: DateTime<Utc>,
    pub status: DecisionStatus,
    /// Tool-specific classification: the status key for Part B, the outcome
    /// letter for Part D.
    pub classification: String,
    pub label: &'static str,
    pub headline: String,
    pub summary: &'static str,
    pub rationale: Vec<String>,
    pub based_on: Vec<Fact>,
    pub questions_to_ask: Vec<&'static str>,
    pub documents_to_keep: Vec<&'static str>,
    pub when_to_recheck: Vec<&'static str>,
    pub next_steps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caveats: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    pub disclaimer: &'static str,
}

fn bullets<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

impl Report {
    fn from_result<C: Classification>(
        tool: Tool,
        title: &'static str,
        summary: &'static str,
        result: &DecisionResult<C>,
    ) -> Self {
        let status = result.status();
        Self {
            tool,
            title,
            generated_at: Utc::now(),
            status,
            classification: result.classification.to_string(),
            label: status.label(),
            headline: result.headline.clone(),
            summary,
            rationale: result.rationale.clone(),
            based_on: Vec::new(),
            questions_to_ask: Vec::new(),
            documents_to_keep: Vec::new(),
            when_to_recheck: Vec::new(),
            next_steps: result.next_steps.clone(),
            caveats: result.caveats.clone(),
            resources: Vec::new(),
            disclaimer: "",
        }
    }

    pub fn part_b(profile: &PartBProfile, result: &PartBResult) -> Self {
        let summary = match result.status() {
            DecisionStatus::LikelySafeToDelay => {
                "Based on your answers, delaying Part B may be reasonable. Here's what to confirm to avoid surprises."
            }
            DecisionStatus::LikelyNotSafeToDelay => {
                "Based on your answers, delaying Part B may expose you to late-enrollment penalties. Here's what to confirm before deciding."
            }
            DecisionStatus::NeedsHumanReview => {
                "Your situation doesn't fit a standard pattern. Here's what to gather and who to ask."
            }
        };

        let employer_related = profile.coverage_source.is_employer();
        let mut based_on = vec![
            Fact::new("Age", profile.age.to_string()),
            Fact::new("Currently working", yes_no(profile.currently_working)),
            Fact::new("Coverage", profile.coverage_source.describe()),
        ];
        if employer_related {
            let size = profile
                .employer_size_band
                .map_or("Not sure", |band| band.describe());
            based_on.push(Fact::new("Employer size", size));
        }
        based_on.push(Fact::new(
            "Contributing to an HSA",
            yes_no(profile.contributing_to_hsa),
        ));

        let (questions, documents) = if employer_related {
            (PART_B_EMPLOYER_QUESTIONS, PART_B_EMPLOYER_DOCUMENTS)
        } else {
            (PART_B_OTHER_QUESTIONS, PART_B_OTHER_DOCUMENTS)
        };

        Self {
            based_on,
            questions_to_ask: questions.to_vec(),
            documents_to_keep: documents.to_vec(),
            when_to_recheck: PART_B_RECHECK.to_vec(),
            resources: PART_B_RESOURCES.to_vec(),
            disclaimer: PART_B_DISCLAIMER,
            ..Self::from_result(Tool::PartB, "Medicare Part B Delay Check", summary, result)
        }
    }

    pub fn part_d(profile: &PartDProfile, result: &PartDResult) -> Self {
        let summary = match result.status() {
            DecisionStatus::LikelySafeToDelay => {
                "Based on your answers, delaying Part D may be reasonable. Here's what to confirm to avoid surprises."
            }
            DecisionStatus::LikelyNotSafeToDelay => {
                "Based on your answers, delaying Part D may expose you to a late-enrollment penalty. Here's what to confirm before deciding."
            }
            DecisionStatus::NeedsHumanReview => {
                "Your situation isn't clear enough from these answers. Here's what to gather and who to ask."
            }
        };

        let based_on = vec![
            Fact::new("Medicare-eligible now", yes_no(profile.eligible)),
            Fact::new("Current drug coverage", profile.coverage.label()),
            Fact::new("Coverage is creditable", profile.creditable.label()),
            Fact::new("63+ day gap without creditable coverage", profile.gap.label()),
        ];

        Self {
            based_on,
            questions_to_ask: PART_D_QUESTIONS.to_vec(),
            documents_to_keep: PART_D_DOCUMENTS.to_vec(),
            when_to_recheck: PART_D_RECHECK.to_vec(),
            disclaimer: PART_D_DISCLAIMER,
            ..Self::from_result(Tool::PartD, "Medicare Part D Coverage Check", summary, result)
        }
    }

    fn questions_heading(&self) -> &'static str {
        match self.tool {
            Tool::PartB => "Questions to ask HR or Medicare",
            Tool::PartD => "Questions to ask your plan or Medicare",
        }
    }

    /// Render the report as markdown for the terminal or a saved file.
    pub fn to_markdown(&self) -> String {
        let mut parts = vec![format!(
            "# {}\n\nGenerated: {}",
            self.title,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )];

        parts.push(format!(
            "**{}**\n\n## {}\n\n{}",
            self.label, self.headline, self.summary
        ));
        parts.push(format!(
            "### Why this result\n\n{}",
            bullets(self.rationale.iter().map(String::as_str))
        ));

        let facts: Vec<String> = self
            .based_on
            .iter()
            .map(|f| format!("- **{}:** {}", f.label, f.value))
            .collect();
        parts.push(format!("### What this is based on\n\n{}", facts.join("\n")));

        parts.push(format!(
            "### {}\n\n{}",
            self.questions_heading(),
            bullets(self.questions_to_ask.iter().copied())
        ));
        parts.push(format!(
            "### Documents to keep\n\n{}",
            bullets(self.documents_to_keep.iter().copied())
        ));
        parts.push(format!(
            "### When to re-check\n\n{}",
            bullets(self.when_to_recheck.iter().copied())
        ));
        parts.push(format!(
            "### Recommended next steps\n\n{}",
            bullets(self.next_steps.iter().map(String::as_str))
        ));

        if !self.caveats.is_empty() {
            parts.push(format!(
                "#### Caveats\n\n{}",
                bullets(self.caveats.iter().map(String::as_str))
            ));
        }

        if !self.resources.is_empty() {
            let links: Vec<String> = self
                .resources
                .iter()
                .map(|r| format!("- [{}]({})\n  {}", r.title, r.url, r.description))
                .collect();
            parts.push(format!("### Official resources\n\n{}", links.join("\n")));
        }

        parts.push(METHOD.to_string());
        parts.push(format!("_{}_", self.disclaimer));

        parts.join("\n\n")
    }
}
