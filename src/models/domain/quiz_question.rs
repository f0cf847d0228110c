use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

pub const OPTIONS_PER_QUESTION: usize = 4;

/// A four-option multiple choice question about an image.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn new(question: &str, options: [&str; OPTIONS_PER_QUESTION], correct_answer: usize, explanation: &str) -> Self {
        QuizQuestion {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
            explanation: explanation.to_string(),
        }
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_answer)
    }
}

/// Question as shown to someone taking the quiz: no answer, no explanation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, SimpleObject)]
pub struct QuestionForTaking {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
}

impl QuestionForTaking {
    pub fn from_question(index: usize, question: &QuizQuestion) -> Self {
        QuestionForTaking {
            index,
            question: question.question.clone(),
            options: question.options.clone(),
        }
    }
}
