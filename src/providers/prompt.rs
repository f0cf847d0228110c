use crate::models::domain::GenerationOptions;

/// Instruction sent to vision-capable providers.
pub fn build_quiz_prompt(options: &GenerationOptions) -> String {
    let n = options.num_questions;
    format!(
        r#"Analyze the provided image and generate {n} quiz questions about what you see in the image.

Requirements:
- Generate {n} questions of multiple choice format
- Difficulty level: {difficulty}
- Subject focus: {subject}
- Each question should have 4 answer options (A, B, C, D)
- Mark the correct answer clearly
- Questions should be based on observable elements in the image
- Make questions educational and engaging

Format your response as a JSON array with this structure:
[
  {{
    "question": "What is the main subject of this image?",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correctAnswer": 1,
    "explanation": "Brief explanation of why this answer is correct"
  }}
]

Please ensure the JSON is valid and properly formatted."#,
        difficulty = options.difficulty.prompt_text(),
        subject = options.subject,
    )
}

/// Text-only variant for providers that cannot see the image.
pub fn build_text_prompt(options: &GenerationOptions) -> String {
    format!(
        "Generate {} multiple choice quiz questions about images. Difficulty: {}. Subject: {}. \
         Each question has exactly 4 options. Return only a JSON array of objects with the keys \
         \"question\", \"options\", \"correctAnswer\" (0-3) and \"explanation\".",
        options.num_questions,
        options.difficulty.prompt_text(),
        options.subject,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Difficulty;

    #[test]
    fn test_prompt_mentions_count_difficulty_and_subject() {
        let options = GenerationOptions {
            num_questions: 3,
            difficulty: Difficulty::Easy,
            subject: "wildlife".to_string(),
        };
        let prompt = build_quiz_prompt(&options);

        assert!(prompt.contains("generate 3 quiz questions"));
        assert!(prompt.contains("easy (suitable for beginners)"));
        assert!(prompt.contains("Subject focus: wildlife"));
        assert!(prompt.contains("\"correctAnswer\": 1"));
    }

    #[test]
    fn test_text_prompt_requests_json_array() {
        let prompt = build_text_prompt(&GenerationOptions::default());
        assert!(prompt.starts_with("Generate 5 multiple choice"));
        assert!(prompt.contains("JSON array"));
    }
}
