//! Food-image classifier trait and its fixed prompts.

use async_trait::async_trait;

use crate::workflow::encoder::EncodedImage;
use crate::Result;

/// System instruction sent with every classification request.
pub const SYSTEM_PROMPT: &str = "You are a diabetes nutrition assistant. The user will ask about Indian foods. You are given the nutrition values (carbs, fat, protein, sugar, GI, etc.). Classify the food as Green (safe), Yellow (moderate), or Red (avoid) for diabetics. If the food is Yellow or Red, suggest a healthier alternative from the dataset.";

/// User text sent alongside the image.
pub const USER_INSTRUCTION: &str = "What all ingredients are in this dish? break down the contents into the different macronutrients (carbs, fats, proteins, vegetables) contained in them. Also suggest some alternatives for thefood in image and why those alternatives are better. Tell the user if the dish is safe for the diabetic patient.";

/// System instruction for the Hindi translation request.
pub const TRANSLATE_PROMPT: &str =
    "You are a translator. Translate the following English text into simple Hindi.";

/// Classification text used when the response envelope has no message.
pub const NO_RESPONSE: &str = "No response";

/// Translation text used when the response envelope has no message.
pub const NO_TRANSLATION: &str = "अनुवाद उपलब्ध नहीं है";

/// A hosted model that classifies food images for diabetic suitability.
///
/// A response whose envelope lacks the expected message yields the
/// fallback literal instead of an error; only transport failures error.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one image, returning the free-text verdict.
    async fn classify(&self, image: &EncodedImage) -> Result<String>;

    /// Translate a verdict into simple Hindi.
    async fn translate(&self, text: &str) -> Result<String>;
}
