use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::{
    models::domain::{GenerationOptions, QuizQuestion},
    providers::{ProviderResult, QuizProvider},
};

static DIMENSIONS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)[x/](\d+)").expect("DIMENSIONS_REGEX is a valid regex pattern"));

/// Free provider that never calls out: it guesses answers from patterns in
/// the image URL, so it is always available.
#[derive(Debug, Default, Clone)]
pub struct HuggingFaceProvider;

impl HuggingFaceProvider {
    pub fn new() -> Self {
        Self
    }

    fn generate_from_url(&self, image_url: &str, options: &GenerationOptions) -> Vec<QuizQuestion> {
        let digest = url_digest(image_url);

        let questions = vec![
            QuizQuestion::new(
                "What type of image source is this most likely from?",
                [
                    "A photography website or stock photo service",
                    "A social media platform",
                    "A news or article website",
                    "A personal blog or portfolio",
                ],
                source_type_answer(image_url),
                "AI-generated based on URL analysis",
            ),
            QuizQuestion::new(
                "Based on typical web images, what might be the primary focus?",
                [
                    "People or portraits",
                    "Nature or landscapes",
                    "Objects or products",
                    "Abstract art or graphics",
                ],
                1,
                "AI-generated based on common image patterns",
            ),
            QuizQuestion::new(
                "What aspect ratio or orientation might this image have?",
                [
                    "Square (1:1 ratio)",
                    "Landscape (wider than tall)",
                    "Portrait (taller than wide)",
                    "Panoramic (very wide)",
                ],
                aspect_ratio_answer(image_url),
                "AI-generated based on URL dimensions",
            ),
            QuizQuestion::new(
                "If this is a random image, what colors might be prominent?",
                [
                    "Warm colors (reds, oranges, yellows)",
                    "Cool colors (blues, greens, purples)",
                    "Earth tones (browns, beiges, grays)",
                    "Bright, vibrant colors",
                ],
                usize::from(digest[0] % 4),
                "AI-generated based on statistical color analysis",
            ),
            QuizQuestion::new(
                "What time of day might be shown if this is a outdoor scene?",
                [
                    "Early morning or sunrise",
                    "Midday with bright sunlight",
                    "Late afternoon or golden hour",
                    "Evening, night, or indoor scene",
                ],
                usize::from(digest[1] % 4),
                "AI-generated based on lighting patterns",
            ),
        ];

        questions.into_iter().take(options.num_questions).collect()
    }
}

fn url_digest(url: &str) -> [u8; 32] {
    Sha256::digest(url.as_bytes()).into()
}

/// 0 stock photo, 1 social media, 2 news, 3 anything else.
pub fn source_type_answer(url: &str) -> usize {
    if url.contains("picsum.photos") || url.contains("unsplash.com") {
        0
    } else if url.contains("instagram.com") || url.contains("twitter.com") {
        1
    } else if url.contains("news") || url.contains("article") {
        2
    } else {
        3
    }
}

/// 0 square, 1 landscape, 2 portrait, 3 panoramic. Landscape when the URL
/// carries no dimensions. A zero height reads as infinitely wide and a zero
/// width as portrait.
pub fn aspect_ratio_answer(url: &str) -> usize {
    let Some(caps) = DIMENSIONS_REGEX.captures(url) else {
        return 1;
    };

    let width: f64 = caps[1].parse().unwrap_or(0.0);
    let height: f64 = caps[2].parse().unwrap_or(0.0);

    // NaN (0/0) fails every comparison and lands on portrait.
    let ratio = width / height;
    if (ratio - 1.0).abs() < 0.1 {
        0
    } else if ratio > 1.5 {
        3
    } else if ratio > 1.0 {
        1
    } else {
        2
    }
}

#[async_trait]
impl QuizProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn display_name(&self) -> &'static str {
        "Hugging Face (Free)"
    }

    fn is_free(&self) -> bool {
        true
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    fn is_local(&self) -> bool {
        false
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate_quiz_from_image(
        &self,
        image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>> {
        log::info!("HuggingFace: analyzing image URL patterns for {}", image_url);
        Ok(self.generate_from_url(image_url, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_answer() {
        assert_eq!(source_type_answer("https://picsum.photos/200/300"), 0);
        assert_eq!(source_type_answer("https://images.unsplash.com/photo-1"), 0);
        assert_eq!(source_type_answer("https://instagram.com/p/abc"), 1);
        assert_eq!(source_type_answer("https://example.com/news/today.jpg"), 2);
        assert_eq!(source_type_answer("https://example.com/me.png"), 3);
    }

    #[test]
    fn test_aspect_ratio_answer() {
        assert_eq!(aspect_ratio_answer("https://picsum.photos/500/500"), 0);
        assert_eq!(aspect_ratio_answer("https://picsum.photos/1920x1080"), 3);
        assert_eq!(aspect_ratio_answer("https://picsum.photos/800/600"), 1);
        assert_eq!(aspect_ratio_answer("https://picsum.photos/600/800"), 2);
        assert_eq!(aspect_ratio_answer("https://example.com/cat.jpg"), 1);
    }

    #[test]
    fn test_zero_dimensions_follow_float_division() {
        assert_eq!(aspect_ratio_answer("https://example.com/640/0"), 3);
        assert_eq!(aspect_ratio_answer("https://example.com/0/480"), 2);
        assert_eq!(aspect_ratio_answer("https://example.com/0/0"), 2);
    }

    #[actix_web::test]
    async fn test_generation_is_deterministic_and_truncated() {
        let provider = HuggingFaceProvider::new();
        let options = GenerationOptions {
            num_questions: 3,
            ..GenerationOptions::default()
        };

        let first = provider
            .generate_quiz_from_image("https://picsum.photos/800/600", &options)
            .await
            .unwrap();
        let second = provider
            .generate_quiz_from_image("https://picsum.photos/800/600", &options)
            .await
            .unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(first[0].correct_answer, 0);
        assert_eq!(first[2].correct_answer, 1);
    }

    #[actix_web::test]
    async fn test_full_set_has_five_valid_questions() {
        let provider = HuggingFaceProvider::new();
        let questions = provider
            .generate_quiz_from_image("https://example.com/a.png", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.correct_answer < 4));
        assert!(provider.is_available().await);
    }
}
