use crate::assessment::types::AnswerInput;
use crate::error::{AssessmentError, Result};
use crate::program::QuestionKind;

/// Decides whether a submitted answer is correct for a question type
pub trait AnswerEvaluator: Send + Sync {
    fn evaluate(&self, kind: &QuestionKind, answer: &AnswerInput) -> Result<bool>;
}

/// Grades against the answer key snapshotted into the question pool
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedAnswerEvaluator;

impl AnswerEvaluator for KeyedAnswerEvaluator {
    fn evaluate(&self, kind: &QuestionKind, answer: &AnswerInput) -> Result<bool> {
        match kind {
            QuestionKind::MultipleChoice {
                options,
                correct_index,
            } => evaluate_multiple_choice(options, *correct_index, answer),
            QuestionKind::OneWordAnswer { accepted_answers } => {
                evaluate_one_word(accepted_answers, answer)
            }
            QuestionKind::VerbalEvaluation => evaluate_verbal(answer),
        }
    }
}

fn evaluate_multiple_choice(
    options: &[String],
    correct_index: usize,
    answer: &AnswerInput,
) -> Result<bool> {
    let correct = options.get(correct_index).ok_or_else(|| {
        AssessmentError::Internal(format!(
            "answer key index {} out of range for {} options",
            correct_index,
            options.len()
        ))
    })?;

    match answer {
        AnswerInput::Choice(index) => {
            if *index >= options.len() {
                return Err(AssessmentError::Validation(format!(
                    "option {} does not exist",
                    index
                )));
            }
            Ok(*index == correct_index)
        }
        AnswerInput::Text(text) => Ok(text.trim() == correct.trim()),
        AnswerInput::Verdict(_) => Err(AssessmentError::Validation(
            "multiple choice questions expect an option, not a verdict".to_string(),
        )),
    }
}

fn evaluate_one_word(accepted_answers: &[String], answer: &AnswerInput) -> Result<bool> {
    match answer {
        AnswerInput::Text(text) => {
            let given = text.trim().to_lowercase();
            Ok(accepted_answers
                .iter()
                .any(|accepted| accepted.trim().to_lowercase() == given))
        }
        _ => Err(AssessmentError::Validation(
            "one word answer questions expect a text answer".to_string(),
        )),
    }
}

fn evaluate_verbal(answer: &AnswerInput) -> Result<bool> {
    match answer {
        AnswerInput::Verdict(verdict) => Ok(*verdict),
        _ => Err(AssessmentError::Validation(
            "verbal evaluation questions expect a true/false verdict".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice_kind() -> QuestionKind {
        QuestionKind::MultipleChoice {
            options: vec!["red".to_string(), "green".to_string(), "blue".to_string()],
            correct_index: 1,
        }
    }

    #[test]
    fn test_multiple_choice_by_index_and_text() {
        let evaluator = KeyedAnswerEvaluator;
        let kind = choice_kind();

        assert!(evaluator.evaluate(&kind, &AnswerInput::Choice(1)).unwrap());
        assert!(!evaluator.evaluate(&kind, &AnswerInput::Choice(0)).unwrap());
        assert!(
            evaluator
                .evaluate(&kind, &AnswerInput::Text(" green ".to_string()))
                .unwrap()
        );
        assert!(
            !evaluator
                .evaluate(&kind, &AnswerInput::Text("Green".to_string()))
                .unwrap()
        );
    }

    #[test]
    fn test_multiple_choice_rejects_bad_input() {
        let evaluator = KeyedAnswerEvaluator;
        let kind = choice_kind();

        assert!(evaluator.evaluate(&kind, &AnswerInput::Choice(7)).is_err());
        assert!(evaluator.evaluate(&kind, &AnswerInput::Verdict(true)).is_err());
    }

    #[test]
    fn test_one_word_is_case_insensitive_and_trimmed() {
        let evaluator = KeyedAnswerEvaluator;
        let kind = QuestionKind::OneWordAnswer {
            accepted_answers: vec!["Paris".to_string(), "paris city".to_string()],
        };

        assert!(
            evaluator
                .evaluate(&kind, &AnswerInput::Text("  PARIS ".to_string()))
                .unwrap()
        );
        assert!(
            !evaluator
                .evaluate(&kind, &AnswerInput::Text("Lyon".to_string()))
                .unwrap()
        );
        assert!(evaluator.evaluate(&kind, &AnswerInput::Choice(0)).is_err());
    }

    #[test]
    fn test_verbal_takes_verdict() {
        let evaluator = KeyedAnswerEvaluator;
        let kind = QuestionKind::VerbalEvaluation;

        assert!(evaluator.evaluate(&kind, &AnswerInput::Verdict(true)).unwrap());
        assert!(!evaluator.evaluate(&kind, &AnswerInput::Verdict(false)).unwrap());
        assert!(
            evaluator
                .evaluate(&kind, &AnswerInput::Text("yes".to_string()))
                .is_err()
        );
    }
}
