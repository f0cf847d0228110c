use crate::models::domain::QuizQuestion;

const FALLBACK_EXPLANATION: &str =
    "This is a fallback question. AI services are temporarily unavailable.";

/// Returned when every provider has failed.
pub fn fallback_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "What is the main subject or focus of this image?",
            [
                "A person or people",
                "An animal or animals",
                "A landscape or building",
                "An object or abstract art",
            ],
            0,
            FALLBACK_EXPLANATION,
        ),
        QuizQuestion::new(
            "What colors appear to be most prominent in this image?",
            [
                "Warm colors (red, orange, yellow)",
                "Cool colors (blue, green, purple)",
                "Neutral colors (black, white, gray)",
                "Bright, vibrant colors",
            ],
            1,
            FALLBACK_EXPLANATION,
        ),
        QuizQuestion::new(
            "What is the general composition or framing of this image?",
            [
                "Close-up or detailed view",
                "Wide or panoramic view",
                "Portrait orientation",
                "Landscape orientation",
            ],
            3,
            FALLBACK_EXPLANATION,
        ),
        QuizQuestion::new(
            "Based on the visual style, what type of image does this appear to be?",
            [
                "Photograph or realistic image",
                "Digital art or illustration",
                "Abstract or artistic design",
                "Technical diagram or chart",
            ],
            0,
            FALLBACK_EXPLANATION,
        ),
        QuizQuestion::new(
            "What mood or atmosphere does this image likely convey?",
            [
                "Peaceful and calm",
                "Energetic and dynamic",
                "Mysterious or dramatic",
                "Cheerful and bright",
            ],
            2,
            FALLBACK_EXPLANATION,
        ),
    ]
}
