//! Boundary validation for inbound requests and upstream model listings.
//!
//! Every issue is collected rather than stopping at the first, so a caller
//! sees the whole list of problems with its payload in one response.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{GenerationInput, ModelInfo, StyleParameters};

pub const MIN_OUTLINE_WIDTH: f64 = 0.0;
pub const MAX_OUTLINE_WIDTH: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self { message: "Validation failed".to_string(), issues }
    }

    pub fn first_message(&self) -> &str {
        self.issues.first().map(|i| i.message.as_str()).unwrap_or(&self.message)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for issue in &self.issues {
            if issue.path.is_empty() {
                write!(f, "\n  - {}", issue.message)?;
            } else {
                write!(f, "\n  - {}: {}", issue.path, issue.message)?;
            }
        }
        Ok(())
    }
}

fn hex_color() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern compiles"))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.0.push(ValidationIssue { path: path.to_string(), message: message.into() });
    }

    fn required_str(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        match obj.get(key) {
            None => { self.push(path, "Required"); None }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => { self.push(path, format!("Expected string, received {}", type_name(other))); None }
        }
    }

    fn non_empty_str(&mut self, obj: &Map<String, Value>, path: &str, key: &str, empty_message: &str) -> Option<String> {
        let s = self.required_str(obj, path, key)?;
        if s.is_empty() {
            self.push(path, empty_message);
            return None;
        }
        Some(s)
    }

    fn optional_str(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Result<Option<String>, ()> {
        match obj.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => { self.push(path, format!("Expected string, received {}", type_name(other))); Err(()) }
        }
    }

    fn required_number(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<f64> {
        match obj.get(key) {
            None => { self.push(path, "Required"); None }
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => { self.push(path, format!("Expected number, received {}", type_name(other))); None }
        }
    }

    fn object<'a>(&mut self, value: Option<&'a Value>, path: &str) -> Option<&'a Map<String, Value>> {
        match value {
            None => { self.push(path, "Required"); None }
            Some(Value::Object(map)) => Some(map),
            Some(other) => { self.push(path, format!("Expected object, received {}", type_name(other))); None }
        }
    }
}

fn style_parameters(issues: &mut Issues, obj: &Map<String, Value>) -> Option<StyleParameters> {
    let outline_width = issues.required_number(obj, "parameters.outlineWidth", "outlineWidth").and_then(|w| {
        if w < MIN_OUTLINE_WIDTH {
            issues.push("parameters.outlineWidth", "Outline width must be at least 0");
            None
        } else if w > MAX_OUTLINE_WIDTH {
            issues.push("parameters.outlineWidth", "Outline width cannot exceed 10");
            None
        } else {
            Some(w)
        }
    });
    let primary_color = issues.required_str(obj, "parameters.primaryColor", "primaryColor").and_then(|c| {
        if hex_color().is_match(&c) {
            Some(c)
        } else {
            issues.push("parameters.primaryColor", "Primary color must be a valid hex color (e.g., #FF5733)");
            None
        }
    });
    Some(StyleParameters { primary_color: primary_color?, outline_width: outline_width? })
}

/// Validate a raw generation request body into a [`GenerationInput`].
pub fn validate_generation_request(body: &Value) -> Result<GenerationInput, ValidationFailure> {
    let mut issues = Issues::default();
    let Some(obj) = issues.object(Some(body), "") else {
        return Err(ValidationFailure::from_issues(issues.0));
    };

    let source_svg_code = issues.non_empty_str(obj, "iconSVGCode", "iconSVGCode", "Icon SVG code is required");
    let source_icon_name = issues.non_empty_str(obj, "sourceIconName", "sourceIconName", "Source icon name is required");
    let style_preset = issues.optional_str(obj, "stylePreset", "stylePreset");
    let user_instructions = issues.required_str(obj, "userPrompt", "userPrompt");
    let explicit_system_prompt = issues.optional_str(obj, "systemPrompt", "systemPrompt");
    let model_id = issues.non_empty_str(obj, "selectedModel", "selectedModel", "Model selection is required");
    let style_parameters = issues
        .object(obj.get("parameters"), "parameters")
        .and_then(|params| style_parameters(&mut issues, params));

    if !issues.0.is_empty() {
        return Err(ValidationFailure::from_issues(issues.0));
    }
    match (source_svg_code, source_icon_name, style_preset, user_instructions, explicit_system_prompt, model_id, style_parameters) {
        (Some(source_svg_code), Some(source_icon_name), Ok(style_preset), Some(user_instructions), Ok(explicit_system_prompt), Some(model_id), Some(style_parameters)) => {
            Ok(GenerationInput {
                source_svg_code,
                source_icon_name,
                user_instructions,
                explicit_system_prompt,
                style_preset,
                model_id,
                style_parameters,
            })
        }
        _ => Err(ValidationFailure::from_issues(vec![ValidationIssue {
            path: String::new(),
            message: "An unexpected validation error occurred".to_string(),
        }])),
    }
}

/// Check a normalized upstream model entry.
pub fn validate_model(model: &ModelInfo) -> Result<(), ValidationFailure> {
    let mut issues = Issues::default();
    if model.id.is_empty() {
        issues.push("id", "Model ID is required");
    }
    if model.name.is_empty() {
        issues.push("name", "Model name is required");
    }
    if model.context_length == 0 {
        issues.push("context_length", "Context length must be a positive integer");
    }
    if issues.0.is_empty() { Ok(()) } else { Err(ValidationFailure::from_issues(issues.0)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelPricing;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "iconSVGCode": "<svg viewBox=\"0 0 24 24\"><circle cx=\"12\" cy=\"12\" r=\"10\"/></svg>",
            "sourceIconName": "Sun",
            "userPrompt": "add rays",
            "selectedModel": "anthropic/claude-3.5-sonnet",
            "parameters": { "primaryColor": "#FF5733", "outlineWidth": 2 }
        })
    }

    fn paths(failure: &ValidationFailure) -> Vec<&str> {
        failure.issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let input = validate_generation_request(&valid_body()).expect("valid");
        assert_eq!(input.source_icon_name, "Sun");
        assert_eq!(input.model_id, "anthropic/claude-3.5-sonnet");
        assert_eq!(input.explicit_system_prompt, None);
        assert_eq!(input.style_parameters, StyleParameters { primary_color: "#FF5733".into(), outline_width: 2.0 });
    }

    #[test]
    fn empty_body_reports_every_required_field_in_order() {
        let failure = validate_generation_request(&json!({})).unwrap_err();
        assert_eq!(paths(&failure), vec!["iconSVGCode", "sourceIconName", "userPrompt", "selectedModel", "parameters"]);
        assert!(failure.issues.iter().all(|i| i.message == "Required"));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let failure = validate_generation_request(&json!([1, 2])).unwrap_err();
        assert_eq!(failure.first_message(), "Expected object, received array");
    }

    #[test]
    fn empty_strings_use_field_messages() {
        let mut body = valid_body();
        body["iconSVGCode"] = json!("");
        body["selectedModel"] = json!("");
        let failure = validate_generation_request(&body).unwrap_err();
        assert_eq!(paths(&failure), vec!["iconSVGCode", "selectedModel"]);
        assert_eq!(failure.first_message(), "Icon SVG code is required");
    }

    #[test]
    fn style_parameter_bounds_are_enforced() {
        let mut body = valid_body();
        body["parameters"] = json!({ "primaryColor": "red", "outlineWidth": 11 });
        let failure = validate_generation_request(&body).unwrap_err();
        assert_eq!(
            failure.to_string(),
            "Validation failed\n  - parameters.outlineWidth: Outline width cannot exceed 10\n  - parameters.primaryColor: Primary color must be a valid hex color (e.g., #FF5733)"
        );

        body["parameters"] = json!({ "primaryColor": "#00ff00", "outlineWidth": -0.5 });
        let failure = validate_generation_request(&body).unwrap_err();
        assert_eq!(failure.first_message(), "Outline width must be at least 0");

        body["parameters"] = json!({ "primaryColor": "#00ff00", "outlineWidth": 10 });
        assert!(validate_generation_request(&body).is_ok());
    }

    #[test]
    fn wrong_types_are_named() {
        let mut body = valid_body();
        body["userPrompt"] = json!(42);
        body["systemPrompt"] = json!(null);
        let failure = validate_generation_request(&body).unwrap_err();
        assert_eq!(failure.issues[0].message, "Expected string, received number");
        assert_eq!(failure.issues[1].message, "Expected string, received null");
    }

    #[test]
    fn models_need_id_name_and_context() {
        let model = ModelInfo {
            id: String::new(),
            name: "x".into(),
            context_length: 0,
            pricing: ModelPricing { prompt: 0.0, completion: 0.0 },
        };
        let failure = validate_model(&model).unwrap_err();
        assert_eq!(paths(&failure), vec!["id", "context_length"]);
    }
}
