use crate::models::{GenerationInput, PromptPair};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert SVG designer. Produce clean, valid SVG markup based on a source icon and style constraints.

Core Principles:
- Declarative Graphics: Describe shapes using XML tags.
- Infinite Canvas: Use viewBox to define the visible window.
- Portability: Use SVG attributes (fill=\"...\", stroke=\"...\") instead of CSS.

Technical Standards:
- ALWAYS include a viewBox (e.g., \"0 0 24 24\").
- Use <path> for complex shapes, but <rect>/<circle> for primitives.
- Use stroke-linecap=\"round\" and stroke-linejoin=\"round\" for smoother lines.
- Include a <title> tag for accessibility.
- Use 'currentColor' for strokes/fills to allow client-side styling.";

pub const DEFAULT_USER_INSTRUCTIONS: &str = "Enhance the icon based on parameters.";

/// Build the system/user prompt pair for one generation.
///
/// When the caller supplies its own system prompt it already embeds the
/// source markup, so the user prompt leaves it out.
pub fn build_prompts(input: &GenerationInput) -> PromptPair {
    let explicit = input.system_prompt_override();
    let system_prompt = explicit.unwrap_or(DEFAULT_SYSTEM_PROMPT).to_string();

    let mut lines: Vec<String> = vec![
        "TASK: Generate a valid SVG icon based on the source and parameters below.".into(),
        "OUTPUT FORMAT: JSON object with keys 'svg' (string) and 'explanation' (string).".into(),
        String::new(),
        "INPUTS:".into(),
        format!("1. Source Icon Name: {}", input.source_icon_name),
    ];
    if explicit.is_none() {
        lines.push(format!("2. Source SVG Code: {}", input.source_svg_code));
    }

    let instructions = if input.user_instructions.trim().is_empty() {
        DEFAULT_USER_INSTRUCTIONS
    } else {
        input.user_instructions.as_str()
    };
    lines.extend([
        String::new(),
        "PARAMETERS:".into(),
        "- Use 'currentColor' for all stroke/fill colors.".into(),
        "- Use standard stroke-width=\"2\" (will be adjusted by client).".into(),
        String::new(),
        format!("USER INSTRUCTIONS: {instructions}"),
        String::new(),
        "CONSTRAINTS:".into(),
        "- Return ONLY valid SVG code in the 'svg' field.".into(),
        "- Do not use <style> tags or external CSS.".into(),
        "- Ensure the SVG scales correctly (viewBox='0 0 24 24').".into(),
        "- NO markdown formatting in the JSON response.".into(),
        "- JSON ONLY. Do not include any conversational text before or after the JSON object.".into(),
    ]);

    PromptPair { system_prompt, user_prompt: lines.join("\n") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StyleParameters;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"<svg viewBox="0 0 24 24"><path d="M12 2v20"/></svg>"#;

    fn input(system_prompt: Option<&str>, instructions: &str) -> GenerationInput {
        GenerationInput {
            source_svg_code: SOURCE.to_string(),
            source_icon_name: "Zap".to_string(),
            user_instructions: instructions.to_string(),
            explicit_system_prompt: system_prompt.map(str::to_string),
            style_preset: None,
            model_id: "openai/gpt-4o".to_string(),
            style_parameters: StyleParameters { primary_color: "#112233".into(), outline_width: 1.5 },
        }
    }

    #[test]
    fn same_input_gives_identical_prompts() {
        let a = build_prompts(&input(None, "make it bolder"));
        let b = build_prompts(&input(None, "make it bolder"));
        assert_eq!(a, b);
    }

    #[test]
    fn default_mode_inlines_source_once() {
        let prompts = build_prompts(&input(None, "make it bolder"));
        assert_eq!(prompts.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(prompts.user_prompt.matches(SOURCE).count(), 1);
        assert!(prompts.user_prompt.contains("1. Source Icon Name: Zap"));
        assert!(prompts.user_prompt.contains("USER INSTRUCTIONS: make it bolder"));
    }

    #[test]
    fn explicit_system_prompt_omits_source() {
        let custom = format!("Custom designer prompt.\n{SOURCE}");
        let prompts = build_prompts(&input(Some(&custom), "x"));
        assert_eq!(prompts.system_prompt, custom);
        assert!(!prompts.user_prompt.contains(SOURCE));
        assert!(!prompts.user_prompt.contains("Source SVG Code"));
    }

    #[test]
    fn empty_explicit_prompt_falls_back_to_default() {
        let prompts = build_prompts(&input(Some(""), "x"));
        assert_eq!(prompts.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(prompts.user_prompt.contains(SOURCE));
    }

    #[test]
    fn blank_instructions_use_default_phrase() {
        let prompts = build_prompts(&input(None, "  \n\t"));
        assert!(prompts.user_prompt.contains(&format!("USER INSTRUCTIONS: {DEFAULT_USER_INSTRUCTIONS}")));
    }

    #[test]
    fn sections_keep_their_order() {
        let prompt = build_prompts(&input(None, "x")).user_prompt;
        let order = ["TASK:", "OUTPUT FORMAT:", "INPUTS:", "PARAMETERS:", "USER INSTRUCTIONS:", "CONSTRAINTS:"];
        let positions: Vec<usize> = order.iter().map(|s| prompt.find(s).expect("section present")).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.ends_with("before or after the JSON object."));
        assert!(prompt.contains("viewBox='0 0 24 24'"));
    }
}
