//! CLI channel: drives a questionnaire over a line reader and a writer.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::debug;

use crate::config::OutputFormat;
use crate::error::ChannelError;
use crate::report::Report;
use crate::wizard::{Questionnaire, Tool};

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    EndOfInput,
}

/// A line-oriented terminal channel.
pub struct CliChannel<R, W> {
    lines: Lines<R>,
    writer: W,
    format: OutputFormat,
}

impl CliChannel<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), format)
    }
}

impl<R, W> CliChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, format: OutputFormat) -> Self {
        Self {
            lines: reader.lines(),
            writer,
            format,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn say(&mut self, text: &str) -> Result<(), ChannelError> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Print the prompt and read one trimmed line. `None` at end of input.
    async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        self.writer.write_all(b"> ").await?;
        self.writer.flush().await?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    /// Ask which check to run. `None` if the user quits or input ends.
    pub async fn choose_tool(&mut self) -> Result<Option<Tool>, ChannelError> {
        let mut menu = vec!["Choose a check:".to_string()];
        for (i, tool) in Tool::ALL.iter().enumerate() {
            menu.push(format!("  {}. {}: {}", i + 1, tool.title(), tool.description()));
        }
        self.say(&menu.join("\n")).await?;

        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            if is_quit(&line) {
                return Ok(None);
            }
            let by_number = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Tool::ALL.get(i).copied());
            match by_number.map_or_else(|| line.parse::<Tool>(), Ok) {
                Ok(tool) => return Ok(Some(tool)),
                Err(e) => self.say(&format!("{e}. Enter 1 or 2.")).await?,
            }
        }
    }

    /// Run one questionnaire until the user quits or input ends.
    ///
    /// Empty input continues. Answering a question moves on to the next one
    /// unless the answer already moved the wizard or cannot move it.
    pub async fn run_session(
        &mut self,
        wizard: &mut dyn Questionnaire,
    ) -> Result<SessionEnd, ChannelError> {
        let mut reported = false;

        loop {
            if wizard.is_complete() {
                if !reported {
                    if let Some(report) = wizard.report() {
                        self.write_report(&report).await?;
                    }
                    self.say("Type 'back' to review your answers, 'reset' to start over, or 'quit' to exit.")
                        .await?;
                    reported = true;
                }
            } else if wizard.is_landing() {
                let tool = wizard.tool();
                self.say(&format!(
                    "\n{}\n\n{}\n\nPress Enter to start.",
                    tool.landing_heading(),
                    tool.landing_text()
                ))
                .await?;
            } else {
                self.show_question(wizard).await?;
            }

            let Some(line) = self.read_line().await? else {
                return Ok(SessionEnd::EndOfInput);
            };
            debug!(tool = %wizard.tool(), index = wizard.index(), input = %line, "CLI input");

            match line.to_ascii_lowercase().as_str() {
                cmd if is_quit(cmd) => return Ok(SessionEnd::Quit),
                "back" => {
                    wizard.back();
                    reported = false;
                }
                "reset" => {
                    wizard.reset();
                    reported = false;
                }
                _ if wizard.is_complete() => {
                    if !line.is_empty() {
                        self.say("Unknown command. Type 'back', 'reset', or 'quit'.")
                            .await?;
                    }
                }
                _ if wizard.is_landing() || line.is_empty() => {
                    if let Err(e) = wizard.advance() {
                        self.say(&e.to_string()).await?;
                    }
                }
                _ => {
                    let before = wizard.index();
                    match wizard.answer(&line) {
                        Ok(()) => {
                            if wizard.index() == before && wizard.can_advance() {
                                if let Err(e) = wizard.advance() {
                                    self.say(&e.to_string()).await?;
                                }
                            }
                        }
                        Err(e) => self.say(&e.to_string()).await?,
                    }
                }
            }
        }
    }

    async fn show_question(&mut self, wizard: &dyn Questionnaire) -> Result<(), ChannelError> {
        let Some(question) = wizard.question() else {
            return Ok(());
        };
        let mut parts = vec![format!(
            "\nStep {} of {}: {}",
            wizard.index() + 1,
            wizard.total_steps(),
            question.label
        )];
        parts.push(question.prompt.to_string());
        if let Some(help) = question.help {
            parts.push(format!("({help})"));
        }
        for (i, choice) in question.options().iter().enumerate() {
            parts.push(format!("  {}. {}", i + 1, choice.label));
        }
        if let Some(notice) = wizard.notice() {
            parts.push(format!("Note: {notice}"));
        }
        if wizard.index() > 0 {
            parts.push("(type 'back' for the previous question)".to_string());
        }
        self.say(&parts.join("\n")).await
    }

    async fn write_report(&mut self, report: &Report) -> Result<(), ChannelError> {
        let text = match self.format {
            OutputFormat::Text => report.to_markdown(),
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
        };
        self.say(&format!("\n{text}\n")).await
    }
}

fn is_quit(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "quit" | "exit" | "/quit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::part_d::INELIGIBLE_NOTICE;
    use crate::wizard::{PartBWizard, PartDWizard};

    async fn run(
        input: &str,
        format: OutputFormat,
        wizard: &mut dyn Questionnaire,
    ) -> (SessionEnd, String) {
        let mut channel = CliChannel::new(input.as_bytes(), Vec::new(), format);
        let end = channel.run_session(wizard).await.unwrap();
        let output = String::from_utf8(channel.into_writer()).unwrap();
        (end, output)
    }

    #[tokio::test]
    async fn part_b_session_reaches_report() {
        let mut wizard = PartBWizard::new();
        let (end, output) = run("\n67\nyes\n1\n2\nno\n", OutputFormat::Text, &mut wizard).await;

        assert_eq!(end, SessionEnd::EndOfInput);
        assert!(output.contains("Should you delay Medicare Part B?"));
        assert!(output.contains("Step 1 of 4: Your age"));
        assert!(output.contains("Step 4 of 5: Employer size"));
        assert!(output.contains("Step 5 of 5: HSA contribution"));
        assert!(output.contains("**Delay likely appropriate**"));
        assert!(wizard.report().is_some());
    }

    #[tokio::test]
    async fn part_d_ineligible_then_eligible() {
        let mut wizard = PartDWizard::new();
        let (end, output) = run("\nno\nyes\nno\nno\nquit\n", OutputFormat::Text, &mut wizard).await;

        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains(INELIGIBLE_NOTICE));
        assert!(output.contains("Step 2 of 3: Drug coverage"));
        assert!(output.contains("Step 3 of 3: 63+ day gap"));
        assert!(output.contains("Caution advised"));
        assert!(wizard.is_complete());
    }

    #[tokio::test]
    async fn invalid_answer_keeps_step() {
        let mut wizard = PartBWizard::new();
        let (_, output) = run("\nabc\n", OutputFormat::Text, &mut wizard).await;
        assert!(output.contains("Invalid answer 'abc' for step 'age'"));
        assert_eq!(wizard.index(), 0);
    }

    #[tokio::test]
    async fn empty_input_on_unanswered_step_reports_incomplete() {
        let mut wizard = PartDWizard::new();
        let (_, output) = run("\n\n", OutputFormat::Text, &mut wizard).await;
        assert!(output.contains("needs an answer"));
        assert_eq!(wizard.index(), 0);
    }

    #[tokio::test]
    async fn back_and_reset_commands() {
        let mut wizard = PartBWizard::new();
        let (_, _) = run("\n70\nback\n", OutputFormat::Text, &mut wizard).await;
        assert_eq!(wizard.index(), 0);

        let (_, _) = run("reset\n", OutputFormat::Text, &mut wizard).await;
        assert!(wizard.is_landing());
    }

    #[tokio::test]
    async fn json_report_output() {
        let mut wizard = PartDWizard::new();
        let (_, output) = run("\nyes\nyes\nyes\nno\n", OutputFormat::Json, &mut wizard).await;
        assert!(output.contains("\"classification\": \"A\""));
        assert!(output.contains("\"tool\": \"part_d\""));
    }

    #[tokio::test]
    async fn choose_tool_accepts_number_or_name() {
        let mut channel = CliChannel::new("3\npart-d\n".as_bytes(), Vec::new(), OutputFormat::Text);
        assert_eq!(channel.choose_tool().await.unwrap(), Some(Tool::PartD));
        let output = String::from_utf8(channel.into_writer()).unwrap();
        assert!(output.contains("1. Part B Delay Check"));
        assert!(output.contains("unknown tool '3'"));

        let mut channel = CliChannel::new("1\n".as_bytes(), Vec::new(), OutputFormat::Text);
        assert_eq!(channel.choose_tool().await.unwrap(), Some(Tool::PartB));

        let mut channel = CliChannel::new("quit\n".as_bytes(), Vec::new(), OutputFormat::Text);
        assert_eq!(channel.choose_tool().await.unwrap(), None);
    }
}
