use serde::Deserialize;
use serde_json::Value;

use crate::{
    models::domain::{quiz_question::OPTIONS_PER_QUESTION, QuizQuestion},
    providers::{ProviderError, ProviderResult},
};

const NO_EXPLANATION: &str = "No explanation provided";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_answer: Option<Value>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Span from the first `[` to the last `]`, which tolerates prose or code
/// fences around the array.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse and validate the question array in a model response.
pub fn parse_quiz_questions(text: &str) -> ProviderResult<Vec<QuizQuestion>> {
    let json = extract_json_array(text)
        .ok_or_else(|| ProviderError::Parse("No valid JSON found in response".to_string()))?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| ProviderError::Parse("Response is not an array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_question(index, item))
        .collect()
}

fn validate_question(index: usize, item: &Value) -> ProviderResult<QuizQuestion> {
    let raw: RawQuestion = serde_json::from_value(item.clone()).map_err(|_| {
        ProviderError::Parse(format!("Invalid question structure at index {}", index))
    })?;

    let question = raw
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            ProviderError::Parse(format!("Invalid question structure at index {}", index))
        })?;

    let options = raw
        .options
        .filter(|o| o.len() == OPTIONS_PER_QUESTION)
        .ok_or_else(|| {
            ProviderError::Parse(format!("Invalid question structure at index {}", index))
        })?;

    let correct_answer = raw
        .correct_answer
        .as_ref()
        .and_then(Value::as_u64)
        .filter(|a| (*a as usize) < OPTIONS_PER_QUESTION)
        .ok_or_else(|| ProviderError::Parse(format!("Invalid correctAnswer at index {}", index)))?
        as usize;

    let explanation = raw
        .explanation
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| NO_EXPLANATION.to_string());

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_array_wrapped_in_prose() {
        let text = r#"Sure! Here are your questions:
```json
[{"question": "What animal is shown?", "options": ["Cat", "Dog", "Bird", "Fish"], "correctAnswer": 0, "explanation": "Whiskers."}]
```
Enjoy."#;

        let questions = parse_quiz_questions(text).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options[0], "Cat");
        assert_eq!(questions[0].correct_answer, 0);
    }

    #[test]
    fn test_missing_explanation_gets_default() {
        let text = r#"[{"question": "Q?", "options": ["a","b","c","d"], "correctAnswer": 3}]"#;
        let questions = parse_quiz_questions(text).unwrap();
        assert_eq!(questions[0].explanation, NO_EXPLANATION);
    }

    #[test]
    fn test_rejects_wrong_option_count() {
        let text = r#"[{"question": "Q?", "options": ["a","b","c"], "correctAnswer": 0}]"#;
        let err = parse_quiz_questions(text).unwrap_err();
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn test_rejects_out_of_range_or_non_numeric_answer() {
        let out_of_range = r#"[{"question": "Q?", "options": ["a","b","c","d"], "correctAnswer": 4}]"#;
        assert!(parse_quiz_questions(out_of_range).is_err());

        let textual = r#"[{"question": "Q?", "options": ["a","b","c","d"], "correctAnswer": "B"}]"#;
        assert!(parse_quiz_questions(textual).is_err());
    }

    #[test]
    fn test_rejects_text_without_array() {
        assert!(matches!(
            parse_quiz_questions("I cannot see the image."),
            Err(ProviderError::Parse(_))
        ));
    }
}
