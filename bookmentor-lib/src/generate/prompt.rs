//! Prompt builders for exercise and question generation

use crate::exercise::ExerciseRequest;

/// Grounding instruction prepended to question-answering prompts
pub const QA_SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that answers questions based on provided book content. Be accurate and cite the relevant parts of the content when possible.";

const ANSWER_KEY_FORMAT: &str = "At the end, include an 'Answer Key' section in the following format:
Answer Key:
1. b
2. c
...";

/// Prompt for multiple-choice questions grounded in `context`.
#[must_use]
pub fn multiple_choice_prompt(request: &ExerciseRequest, context: &str) -> String {
    format!(
        "Based on the following book content, create {count} {kind} questions about: {topic}.

For each question, provide:
- The question text
- Four options labeled a), b), c), d)
{ANSWER_KEY_FORMAT}

Book Content:
{context}

Topic: {topic}
Exercise Type: {kind}
Number of Questions: {count}
Difficulty Level: {difficulty}",
        count = request.num_questions,
        kind = request.exercise_type,
        topic = request.topic,
        difficulty = request.difficulty,
    )
}

/// Prompt for any other exercise type grounded in `context`.
#[must_use]
pub fn exercise_prompt(request: &ExerciseRequest, context: &str) -> String {
    format!(
        "Based on the following book content, create {count} {kind} questions about: {topic}.
For each question, provide the necessary details as per the exercise type.

Book Content:
{context}

Topic: {topic}
Exercise Type: {kind}
Number of Questions: {count}
Difficulty Level: {difficulty}",
        count = request.num_questions,
        kind = request.exercise_type,
        topic = request.topic,
        difficulty = request.difficulty,
    )
}

/// Prompt used when no book content is available.
#[must_use]
pub fn fallback_prompt(request: &ExerciseRequest) -> String {
    let mut prompt = format!(
        "Create {} {} questions about: {}.",
        request.num_questions, request.exercise_type, request.topic
    );
    if request.is_multiple_choice() {
        prompt.push_str(" For each question, provide four options labeled a), b), c), d). ");
        prompt.push_str(ANSWER_KEY_FORMAT);
    }
    prompt
}

/// Prompt for answering a question from `context`.
#[must_use]
pub fn question_prompt(question: &str, context: &str) -> String {
    format!(
        "Based on the following book content, answer the question:

Book Content:
{context}

Question: {question}

Please provide a comprehensive answer based on the book content."
    )
}

/// Prepend a system instruction to a prompt, for requests that carry it
/// inline.
#[must_use]
pub fn with_system(system: Option<&str>, prompt: &str) -> String {
    match system.map(str::trim).filter(|s| !s.is_empty()) {
        Some(system) => format!("{system}\n\n{prompt}"),
        None => prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_choice_prompt() {
        let request = ExerciseRequest::new("photosynthesis").with_count(3).with_difficulty("hard");
        let prompt = multiple_choice_prompt(&request, "Plants convert light.");

        assert!(prompt.starts_with(
            "Based on the following book content, create 3 mcq questions about: photosynthesis."
        ));
        assert!(prompt.contains("Answer Key:\n1. b"));
        assert!(prompt.contains("Book Content:\nPlants convert light.\n"));
        assert!(prompt.ends_with("Difficulty Level: hard"));
    }

    #[test]
    fn test_fallback_prompt_formats_only_mcq() {
        let mcq = fallback_prompt(&ExerciseRequest::new("cells"));
        assert!(mcq.contains("a), b), c), d)"));
        assert!(mcq.contains("Answer Key:"));

        let tf = fallback_prompt(&ExerciseRequest::new("cells").with_type("tf").with_count(2));
        assert_eq!(tf, "Create 2 tf questions about: cells.");
    }

    #[test]
    fn test_with_system() {
        assert_eq!(with_system(Some("Be brief."), "Q"), "Be brief.\n\nQ");
        assert_eq!(with_system(Some("  "), "Q"), "Q");
        assert_eq!(with_system(None, "Q"), "Q");
    }
}
