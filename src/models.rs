use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyleParameters {
    pub primary_color: String, // #RRGGBB
    pub outline_width: f64,    // 0..=10, applied client-side
}

/// Caller input that already passed boundary validation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    #[serde(rename = "iconSVGCode")]
    pub source_svg_code: String,
    pub source_icon_name: String,
    #[serde(rename = "userPrompt")]
    pub user_instructions: String,
    #[serde(rename = "systemPrompt", default)]
    pub explicit_system_prompt: Option<String>,
    #[serde(default)]
    pub style_preset: Option<String>,
    #[serde(rename = "selectedModel")]
    pub model_id: String,
    #[serde(rename = "parameters")]
    pub style_parameters: StyleParameters,
}

impl GenerationInput {
    /// The explicit system prompt, if one was supplied and is non-empty.
    pub fn system_prompt_override(&self) -> Option<&str> {
        self.explicit_system_prompt.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Fields recovered by one cascade stage, not yet validated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedPayload {
    pub svg: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub svg: String,
    pub explanation: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelPricing {
    pub prompt: f64,
    pub completion: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub context_length: u64,
    pub pricing: ModelPricing,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
