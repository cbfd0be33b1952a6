use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::exercise::{ExerciseKind, Question};

static ANSWER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)answer key:").expect("valid regex"));
static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s+(.*)$").expect("valid regex"));
static OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(?([a-dA-D])\)\s*(.+)$").expect("valid regex"));
static OPTION_ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[.)]\s*\(?([a-dA-D])\b").expect("valid regex"));
static KEY_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid regex"));
static TRUE_FALSE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^true or false:\s*").expect("valid regex"));
static TRUE_FALSE_ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d+[.)]|[()\s])*(true|false)").expect("valid regex"));
static INLINE_VERDICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((true|false)\)").expect("valid regex"));

/// Why generated text could not be turned into questions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The grammar needs an `Answer Key:` section and there is none
    #[error("no answer key section")]
    MissingAnswerKey,

    /// No item matched the grammar
    #[error("no questions found")]
    NoQuestions,
}

/// A numbered item: `N. head` plus the lines up to the next item.
#[derive(Debug)]
struct Item {
    number: u32,
    head: String,
    body: Vec<String>,
}

impl Item {
    fn text(&self) -> String {
        let mut text = self.head.clone();
        for line in &self.body {
            text.push('\n');
            text.push_str(line);
        }
        text.trim().to_string()
    }
}

/// Split text into numbered items; anything before the first item is
/// preamble and dropped.
fn numbered_items(block: &str) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();
    for line in block.lines() {
        let start = ITEM
            .captures(line)
            .and_then(|caps| Some((caps[1].parse::<u32>().ok()?, caps[2].trim().to_string())));
        if let Some((number, head)) = start {
            items.push(Item {
                number,
                head,
                body: Vec::new(),
            });
        } else if let Some(item) = items.last_mut() {
            item.body.push(line.to_string());
        }
    }
    items
}

/// Split at the first `Answer Key:` marker.
fn split_answer_key(text: &str) -> Option<(&str, &str)> {
    ANSWER_KEY
        .find(text)
        .map(|m| (&text[..m.start()], &text[m.end()..]))
}

fn key_lines(key: &str) -> impl Iterator<Item = &str> {
    key.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn non_empty(questions: Vec<Question>) -> Result<Vec<Question>, ParseError> {
    if questions.is_empty() {
        Err(ParseError::NoQuestions)
    } else {
        Ok(questions)
    }
}

/// Parse multiple-choice questions with lettered options and a required
/// answer key.
///
/// Items without options are skipped. `correct` holds the text of the
/// option the key points at, or `None` if the key has no usable entry.
pub fn parse_multiple_choice(text: &str) -> Result<Vec<Question>, ParseError> {
    let (questions_block, key) = split_answer_key(text).ok_or(ParseError::MissingAnswerKey)?;

    let answers: HashMap<u32, char> = key_lines(key)
        .filter_map(|line| {
            let caps = OPTION_ANSWER.captures(line)?;
            let number = caps[1].parse().ok()?;
            let label = caps[2].chars().next()?.to_ascii_lowercase();
            Some((number, label))
        })
        .collect();

    let mut questions = Vec::new();
    for item in numbered_items(questions_block) {
        let mut stem = vec![item.head.clone()];
        let mut options: Vec<(char, String)> = Vec::new();
        for line in &item.body {
            match OPTION.captures(line) {
                Some(caps) => {
                    let label = caps[1].chars().next().map_or('?', |c| c.to_ascii_lowercase());
                    options.push((label, caps[2].trim().to_string()));
                }
                None if options.is_empty() && !line.trim().is_empty() => {
                    stem.push(line.trim().to_string());
                }
                None => {}
            }
        }
        if options.is_empty() {
            continue;
        }

        let correct = answers.get(&item.number).and_then(|answer| {
            options
                .iter()
                .find(|(label, _)| label == answer)
                .map(|(_, option)| option.clone())
        });

        let mut question =
            Question::new(item.number, ExerciseKind::MultipleChoice, stem.join("\n"));
        question.options = options.into_iter().map(|(_, option)| option).collect();
        question.correct = correct;
        questions.push(question);
    }

    non_empty(questions)
}

fn parse_open(text: &str, kind: ExerciseKind) -> Result<Vec<Question>, ParseError> {
    non_empty(
        numbered_items(text)
            .iter()
            .map(|item| Question::new(item.number, kind, item.text()))
            .collect(),
    )
}

/// Parse numbered short-answer questions.
pub fn parse_short_answer(text: &str) -> Result<Vec<Question>, ParseError> {
    parse_open(text, ExerciseKind::ShortAnswer)
}

/// Parse numbered long-answer questions.
pub fn parse_long_answer(text: &str) -> Result<Vec<Question>, ParseError> {
    parse_open(text, ExerciseKind::LongAnswer)
}

/// Parse fill-in-the-blank sentences.
///
/// With an answer key, the n-th non-empty key line answers the n-th
/// sentence and questions are renumbered from 1. Without one, every answer
/// is empty.
pub fn parse_fill_in_the_blanks(text: &str) -> Result<Vec<Question>, ParseError> {
    let kind = ExerciseKind::FillInTheBlanks;

    let Some((questions_block, key)) = split_answer_key(text) else {
        return non_empty(
            numbered_items(text)
                .iter()
                .map(|item| {
                    let mut question = Question::new(item.number, kind, item.text());
                    question.answer = Some(String::new());
                    question
                })
                .collect(),
        );
    };

    let answers: Vec<String> = key_lines(key)
        .map(|line| KEY_NUMBERING.replace(line, "").trim().to_string())
        .collect();

    non_empty(
        numbered_items(questions_block)
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut question = Question::new(i as u32 + 1, kind, item.text());
                question.answer = Some(answers.get(i).cloned().unwrap_or_default());
                question
            })
            .collect(),
    )
}

/// Parse `True or False:` statements.
///
/// Answers come from an answer key when present (renumbering questions
/// from 1), otherwise from an inline `(True)` / `(False)` marker, which is
/// removed from the statement. Items without the prefix are skipped.
pub fn parse_true_false(text: &str) -> Result<Vec<Question>, ParseError> {
    let kind = ExerciseKind::TrueFalse;

    let statements = |block: &str| -> Vec<(u32, String)> {
        numbered_items(block)
            .iter()
            .filter_map(|item| {
                let text = item.text();
                let prefix = TRUE_FALSE_PREFIX.find(&text)?;
                Some((item.number, text[prefix.end()..].trim().to_string()))
            })
            .collect()
    };

    if let Some((questions_block, key)) = split_answer_key(text) {
        let answers: Vec<String> = key_lines(key)
            .map(|line| match TRUE_FALSE_ANSWER.captures(line) {
                Some(caps) => capitalize(&caps[1]),
                None => capitalize(line),
            })
            .collect();

        return non_empty(
            statements(questions_block)
                .into_iter()
                .enumerate()
                .map(|(i, (_, statement))| {
                    let mut question = Question::new(i as u32 + 1, kind, statement);
                    question.answer = Some(answers.get(i).cloned().unwrap_or_default());
                    question
                })
                .collect(),
        );
    }

    non_empty(
        statements(text)
            .into_iter()
            .map(|(number, statement)| {
                let (statement, answer) = match INLINE_VERDICT.captures(&statement) {
                    Some(caps) => {
                        let answer = capitalize(&caps[1]);
                        let stripped = INLINE_VERDICT.replace(&statement, "").trim().to_string();
                        (stripped, answer)
                    }
                    None => (statement, String::new()),
                };
                let mut question = Question::new(number, kind, statement);
                question.answer = Some(answer);
                question
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MCQ: &str = "Here are your questions:

1. What organelle produces energy?
a) Nucleus
b) Mitochondria
c) Ribosome
d) Golgi body

2. Which molecule stores genetic information?
A) Lipid
B) Glucose
C) DNA
D) Water

Answer Key:
1. b
2) (C)
";

    #[test]
    fn test_multiple_choice() {
        let questions = parse_multiple_choice(MCQ).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[0].kind, ExerciseKind::MultipleChoice);
        assert_eq!(questions[0].question, "What organelle produces energy?");
        assert_eq!(
            questions[0].options,
            vec!["Nucleus", "Mitochondria", "Ribosome", "Golgi body"]
        );
        assert_eq!(questions[0].correct.as_deref(), Some("Mitochondria"));
        assert_eq!(questions[1].correct.as_deref(), Some("DNA"));
    }

    #[test]
    fn test_multiple_choice_requires_key() {
        let text = "1. Question?\na) yes\nb) no";
        assert_eq!(parse_multiple_choice(text), Err(ParseError::MissingAnswerKey));
    }

    #[test]
    fn test_multiple_choice_skips_items_without_options() {
        let text = "1. Orphan question\n2. Real one?\na) x\nb) y\nanswer key:\n2. a\n1. c";
        let questions = parse_multiple_choice(text).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 2);
        assert_eq!(questions[0].correct.as_deref(), Some("x"));
    }

    #[test]
    fn test_multiple_choice_unmatched_key_entry() {
        let text = "1. Pick one\na) x\nb) y\nAnswer Key:\n1. d";
        let questions = parse_multiple_choice(text).unwrap();
        assert_eq!(questions[0].correct, None);
    }

    #[test]
    fn test_multiple_choice_without_questions() {
        assert_eq!(
            parse_multiple_choice("Nothing here\nAnswer Key:\n1. a"),
            Err(ParseError::NoQuestions)
        );
    }

    #[test]
    fn test_short_answer_drops_preamble() {
        let text =
            "Sure! Here you go.\n1. Define osmosis.\n2. Explain diffusion\nin two sentences.\n";
        let questions = parse_short_answer(text).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Define osmosis.");
        assert_eq!(questions[1].question, "Explain diffusion\nin two sentences.");
        assert_eq!(questions[1].kind, ExerciseKind::ShortAnswer);
        assert_eq!(questions[1].answer, None);
    }

    #[test]
    fn test_long_answer() {
        let questions = parse_long_answer("1. Discuss the causes of World War I.").unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].kind, ExerciseKind::LongAnswer);
    }

    #[test]
    fn test_open_questions_need_items() {
        assert_eq!(parse_short_answer("no numbering at all"), Err(ParseError::NoQuestions));
    }

    #[test]
    fn test_fill_in_the_blanks_with_key() {
        let text = "1. Plants make food by ____.\n2. The powerhouse of the cell is the ____.\n3. Water boils at ____ degrees.\n\nAnswer Key:\n1. photosynthesis\n\nmitochondria\n";
        let questions = parse_fill_in_the_blanks(text).unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].answer.as_deref(), Some("photosynthesis"));
        assert_eq!(questions[1].answer.as_deref(), Some("mitochondria"));
        assert_eq!(questions[2].answer.as_deref(), Some(""));
        assert_eq!(questions[2].id, 3);
    }

    #[test]
    fn test_fill_in_the_blanks_without_key() {
        let questions = parse_fill_in_the_blanks("4. The ____ orbits the Earth.").unwrap();
        assert_eq!(questions[0].id, 4);
        assert_eq!(questions[0].answer.as_deref(), Some(""));
    }

    #[test]
    fn test_true_false_with_key() {
        let text = "1. True or False: The Earth is flat.\n2. true or false: Water is wet.\n3. Not a statement\n\nAnswer Key:\n1. FALSE\n2. (True)\n";
        let questions = parse_true_false(text).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "The Earth is flat.");
        assert_eq!(questions[0].answer.as_deref(), Some("False"));
        assert_eq!(questions[1].question, "Water is wet.");
        assert_eq!(questions[1].answer.as_deref(), Some("True"));
    }

    #[test]
    fn test_true_false_inline() {
        let text = "1. True or False: Light travels faster than sound. (True)\n2. True or False: Ice sinks in water. (false) Ice is less dense.\n3. True or False: Undecided.";
        let questions = parse_true_false(text).unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question, "Light travels faster than sound.");
        assert_eq!(questions[0].answer.as_deref(), Some("True"));
        assert_eq!(questions[1].question, "Ice sinks in water.  Ice is less dense.");
        assert_eq!(questions[1].answer.as_deref(), Some("False"));
        assert_eq!(questions[2].answer.as_deref(), Some(""));
    }

    #[test]
    fn test_true_false_needs_prefix() {
        assert_eq!(parse_true_false("1. The sky is green."), Err(ParseError::NoQuestions));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("tRUE"), "True");
        assert_eq!(capitalize(""), "");
    }
}
