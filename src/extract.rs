//! Recovery of `{ svg, explanation }` from a raw model completion.
//!
//! Completions are untrusted: they may be clean JSON, JSON inside a markdown
//! fence, JSON wrapped in chatter, or bare markup with no JSON at all. The
//! probes below are tried in a fixed order and the first one that yields SVG
//! markup wins. A probe that cannot parse its input yields `None`; only the
//! exhaustion of every probe is an error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::GenerationError, models::{ExtractedPayload, GenerationResult}};

pub const SVG_NAMESPACE_ATTR: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

type Probe = fn(&str) -> Option<ExtractedPayload>;

const CASCADE: [(&str, Probe); 4] = [
    ("direct-json", direct_json),
    ("fenced-json", fenced_json),
    ("brace-span", brace_span_json),
    ("bare-markup", bare_markup),
];

fn fence_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("fence pattern compiles"))
}

fn svg_region_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(?is)<svg.*?</svg>").expect("svg pattern compiles"))
}

// Opening root tag, including self-closing `<svg .../>`.
fn svg_root_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(?i)<svg[\s/>]").expect("svg root pattern compiles"))
}

// Any quoting and spacing of the namespace declaration.
fn namespace_attr_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(r#"(?i)\sxmlns\s*=\s*["']http://www\.w3\.org/2000/svg["']"#).expect("namespace pattern compiles")
    })
}

/// Run the cascade over `raw` and normalize the winner.
pub fn extract(raw: &str) -> Result<GenerationResult, GenerationError> {
    let mut explanation: Option<String> = None;

    for (stage, probe) in CASCADE {
        let Some(payload) = probe(raw) else { continue };
        if explanation.is_none() {
            explanation = payload.explanation.filter(|e| !e.is_empty());
        }
        if let Some(svg) = payload.svg.filter(|s| has_svg_root(s)) {
            debug!(stage, svg_len = svg.len(), "svg recovered from completion");
            return Ok(normalize(&svg, explanation.as_deref().unwrap_or_default()));
        }
    }

    warn!(raw_len = raw.len(), "no extractable svg in completion");
    Err(GenerationError::no_extractable_svg(raw))
}

fn normalize(svg: &str, explanation: &str) -> GenerationResult {
    GenerationResult {
        svg: ensure_namespace(svg.trim()),
        explanation: explanation.trim().to_string(),
    }
}

fn has_svg_root(s: &str) -> bool {
    !s.is_empty() && svg_root_re().is_match(s)
}

/// Parse `text` as a JSON object and read its string fields.
fn parse_payload(text: &str) -> Option<ExtractedPayload> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;
    let field = |key: &str| obj.get(key).and_then(Value::as_str).map(|s| s.trim().to_string());
    Some(ExtractedPayload { svg: field("svg"), explanation: field("explanation") })
}

fn direct_json(raw: &str) -> Option<ExtractedPayload> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    parse_payload(trimmed)
}

fn fenced_json(raw: &str) -> Option<ExtractedPayload> {
    let caps = fence_re().captures(raw.trim())?;
    let inner = caps.get(1)?.as_str().trim();
    if inner.is_empty() {
        return None;
    }
    parse_payload(inner)
}

// Outermost span only; braces inside the payload are not balanced.
fn brace_span_json(raw: &str) -> Option<ExtractedPayload> {
    let trimmed = raw.trim();
    let first = trimmed.find('{')?;
    let last = trimmed.rfind('}')?;
    if last <= first {
        return None;
    }
    parse_payload(&trimmed[first..=last])
}

fn bare_markup(raw: &str) -> Option<ExtractedPayload> {
    let m = svg_region_re().find(raw)?;
    let prose = format!("{}{}", &raw[..m.start()], &raw[m.end()..]);
    Some(ExtractedPayload {
        svg: Some(m.as_str().trim().to_string()),
        explanation: Some(prose.trim().to_string()),
    })
}

/// Declare the SVG namespace on the root tag unless it already does.
pub fn ensure_namespace(svg: &str) -> String {
    let Some(start) = svg_root_re().find(svg).map(|m| m.start()) else {
        return svg.to_string();
    };
    let open_end = svg[start..].find('>').map(|i| start + i).unwrap_or(svg.len());
    if namespace_attr_re().is_match(&svg[start..open_end]) {
        return svg.to_string();
    }
    let at = start + "<svg".len();
    format!("{} {}{}", &svg[..at], SVG_NAMESPACE_ATTR, &svg[at..])
}
