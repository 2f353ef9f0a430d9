//! # Completeness Scorer
//!
//! Pure classification of answer quality against fixed policy thresholds.
//! An answer is "solid" once its trimmed length reaches 300 characters, and
//! the questionnaire is "ready to commit" once 24 of the 30 answers are
//! solid. Both thresholds are policy constants, not derived values.

/// Minimum trimmed character count for an answer to count as solid.
pub const SOLID_MIN_CHARS: usize = 300;

/// How many solid answers (out of 30) are recommended before committing.
pub const READY_TARGET: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStrength {
    Empty,
    Short,
    Solid,
}

/// Classifies a single answer by its trimmed character count.
pub fn classify(text: &str) -> AnswerStrength {
    let len = text.trim().chars().count();
    if len == 0 {
        AnswerStrength::Empty
    } else if len < SOLID_MIN_CHARS {
        AnswerStrength::Short
    } else {
        AnswerStrength::Solid
    }
}

/// Aggregate readiness over a snapshot of all answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletenessReport {
    /// Answers at or above the solid threshold.
    pub solid: usize,
    /// Answers with any non-whitespace content.
    pub started: usize,
}

impl CompletenessReport {
    pub fn is_ready(&self) -> bool {
        self.solid >= READY_TARGET
    }

    /// The human-readable readiness signal shown next to the questionnaire.
    pub fn readiness_message(&self) -> String {
        if self.is_ready() {
            "Ready to commit".to_string()
        } else {
            format!(
                "Add {} more solid answers to hit target",
                READY_TARGET - self.solid
            )
        }
    }
}

/// Scores a snapshot of answers. The caller supplies whatever text is
/// current for each question, which lets a UI substitute an in-flight
/// unsaved edit for the stored value.
pub fn assess<'a, I>(answers: I) -> CompletenessReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut solid = 0;
    let mut started = 0;
    for answer in answers {
        match classify(answer) {
            AnswerStrength::Empty => {}
            AnswerStrength::Short => started += 1,
            AnswerStrength::Solid => {
                started += 1;
                solid += 1;
            }
        }
    }
    CompletenessReport { solid, started }
}
