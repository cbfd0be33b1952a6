//! Exercise requests and parsing of generated exercise text
//!
//! Nothing here touches retrieval. A model response is first cleaned
//! ([`clean_content`]); if it is not JSON, the parser for the requested
//! exercise kind turns the text into [`Question`]s.
//!
//! Each kind has its own grammar:
//!
//! ```text
//! multiple choice   1. question          Answer Key:
//!                   a) option            1. b
//!                   b) option            2. (c)
//! true/false        1. True or False: statement (True)
//! short/long        1. question
//! fill in blanks    1. sentence ____     Answer Key:  word
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

mod clean;
mod parse;

pub use clean::*;
pub use parse::*;

/// Exercise types understood by the parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseKind {
    #[serde(rename = "Multiple Choice")]
    MultipleChoice,
    #[serde(rename = "True/False")]
    TrueFalse,
    #[serde(rename = "Short Answer")]
    ShortAnswer,
    #[serde(rename = "Long Questions")]
    LongAnswer,
    #[serde(rename = "Fill in the Blanks")]
    FillInTheBlanks,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 5] = [
        ExerciseKind::MultipleChoice,
        ExerciseKind::TrueFalse,
        ExerciseKind::ShortAnswer,
        ExerciseKind::LongAnswer,
        ExerciseKind::FillInTheBlanks,
    ];

    /// Resolve a user-supplied exercise type name, case-insensitively.
    #[must_use]
    pub fn from_alias(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.aliases().contains(&name.as_str()))
    }

    /// Accepted names for this kind (lowercase)
    #[must_use]
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ExerciseKind::MultipleChoice => &["multiple choice", "mcq", "mcqs"],
            ExerciseKind::TrueFalse => &["true/false", "true_false", "true false", "tf"],
            ExerciseKind::ShortAnswer => {
                &["short answer", "short_questions", "short question", "sqs"]
            }
            ExerciseKind::LongAnswer => {
                &["long questions", "long_questions", "long question", "lqs"]
            }
            ExerciseKind::FillInTheBlanks => {
                &["fill in the blanks", "fill_blanks", "fill blank", "blanks"]
            }
        }
    }

    /// Human-readable label, also used as the `type` of parsed questions
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseKind::MultipleChoice => "Multiple Choice",
            ExerciseKind::TrueFalse => "True/False",
            ExerciseKind::ShortAnswer => "Short Answer",
            ExerciseKind::LongAnswer => "Long Questions",
            ExerciseKind::FillInTheBlanks => "Fill in the Blanks",
        }
    }

    /// Parse generated text with this kind's grammar.
    pub fn parse(&self, text: &str) -> Result<Vec<Question>, ParseError> {
        match self {
            ExerciseKind::MultipleChoice => parse_multiple_choice(text),
            ExerciseKind::TrueFalse => parse_true_false(text),
            ExerciseKind::ShortAnswer => parse_short_answer(text),
            ExerciseKind::LongAnswer => parse_long_answer(text),
            ExerciseKind::FillInTheBlanks => parse_fill_in_the_blanks(text),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A request to generate exercises about a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRequest {
    pub topic: String,
    /// Exercise type as the user wrote it, e.g. "mcq" or "fill in the blanks"
    #[serde(default = "default_exercise_type")]
    pub exercise_type: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_exercise_type() -> String {
    "mcq".to_string()
}

fn default_num_questions() -> u32 {
    5
}

fn default_difficulty() -> String {
    "medium".to_string()
}

impl ExerciseRequest {
    /// A request for five medium MCQs about `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            exercise_type: default_exercise_type(),
            num_questions: default_num_questions(),
            difficulty: default_difficulty(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, exercise_type: impl Into<String>) -> Self {
        self.exercise_type = exercise_type.into();
        self
    }

    #[must_use]
    pub fn with_count(mut self, num_questions: u32) -> Self {
        self.num_questions = num_questions;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    /// The parsed exercise kind, if the type name is recognised.
    #[must_use]
    pub fn kind(&self) -> Option<ExerciseKind> {
        ExerciseKind::from_alias(&self.exercise_type)
    }

    #[must_use]
    pub fn is_multiple_choice(&self) -> bool {
        self.kind() == Some(ExerciseKind::MultipleChoice)
    }
}

/// One parsed exercise question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    pub question: String,
    /// Answer options, multiple choice only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Text of the correct option, multiple choice only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<String>,
    /// Expected answer for true/false and fill-in-the-blank questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Question {
    pub(crate) fn new(id: u32, kind: ExerciseKind, question: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            question: question.into(),
            options: Vec::new(),
            correct: None,
            answer: None,
        }
    }
}

/// A generated exercise response after interpretation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExerciseSet {
    /// Text parsed into questions
    Questions(Vec<Question>),
    /// The model answered with JSON; passed through as-is
    Json(Value),
    /// Cleaned text that no parser accepted
    Text(String),
}

/// Clean a model response and parse it with the grammar of `kind`.
///
/// Falls back to the cleaned text when the kind is unknown or the text
/// does not follow its grammar.
pub fn interpret(kind: Option<ExerciseKind>, response: &str) -> ExerciseSet {
    let text = match clean_content(response) {
        Cleaned::Json(value) => return ExerciseSet::Json(value),
        Cleaned::Text(text) => text,
    };

    let Some(kind) = kind else {
        return ExerciseSet::Text(text);
    };

    match kind.parse(&text) {
        Ok(questions) => ExerciseSet::Questions(questions),
        Err(e) => {
            debug!(%kind, error = %e, "keeping exercise response as text");
            ExerciseSet::Text(text)
        }
    }
}
