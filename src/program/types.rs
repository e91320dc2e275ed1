use serde::{Deserialize, Serialize};

/// Identifier of a learning program in the catalog
pub type ProgramId = String;

/// Identifier of a question within a program's question bank
pub type QuestionId = String;

/// A multi-level learning program with a question bank per level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub levels: Vec<Level>,
}

/// One ordinal skill tier of a program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// 0-indexed level number
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A question as authored in the master question bank, grading key included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_points() -> u32 {
    1
}

/// Question type together with its grading key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Single-select; the answer must match the option at `correct_index`
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    /// Free text compared case-insensitively against accepted strings
    OneWordAnswer { accepted_answers: Vec<String> },
    /// Judged by a rater; the submitted verdict is taken as-is
    VerbalEvaluation,
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
            QuestionKind::OneWordAnswer { .. } => "one_word_answer",
            QuestionKind::VerbalEvaluation => "verbal_evaluation",
        }
    }

    /// Options safe to show a student, if the type has any
    pub fn public_options(&self) -> Option<Vec<String>> {
        match self {
            QuestionKind::MultipleChoice { options, .. } => Some(options.clone()),
            _ => None,
        }
    }
}

impl Program {
    /// Whether any level carries at least one question
    pub fn has_questions(&self) -> bool {
        self.levels.iter().any(|level| !level.questions.is_empty())
    }

    pub fn total_questions(&self) -> usize {
        self.levels.iter().map(|level| level.questions.len()).sum()
    }
}
