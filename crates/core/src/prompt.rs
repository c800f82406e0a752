//! Instruction template and response parsing for prompt refinement.
//!
//! The refinement model sees the product photo plus [`INSTRUCTION_TEMPLATE`]
//! and must answer with a two-field JSON object. [`parse_refined_prompts`]
//! is the only accepted way to turn that answer into [`RefinedPrompts`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Fixed instruction sent alongside every product photo.
pub const INSTRUCTION_TEMPLATE: &str = "\
Analyze this product image. Your task is to generate two distinct prompts for a professional marketing showcase.
1. \"imagePrompt\": A vibrant, high-end text-to-image prompt for a static professional showcase.
2. \"videoPrompt\": A cinematic image-to-video motion prompt. Focus on slow camera movements (e.g., pan, tilt, or zoom-in), subtle subject actions (e.g., steam rising, light sweeping across the surface, or gentle rotation), and atmospheric effects.

Return ONLY a valid JSON object in this format:
{\"imagePrompt\": \"...\", \"videoPrompt\": \"...\"}";

/// Prompts produced by the refinement service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedPrompts {
    /// Prompt for the static marketing image.
    pub image_prompt: String,
    /// Camera/motion prompt for a follow-up image-to-video step.
    pub video_prompt: String,
}

/// Build the full instruction text for one submission.
pub fn build_instruction(description: &str) -> String {
    format!("{INSTRUCTION_TEMPLATE} \n Product Context: {description}")
}

/// Wire shape before field validation; both fields may be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrompts {
    image_prompt: Option<String>,
    video_prompt: Option<String>,
}

/// Parse the refinement service's text answer.
///
/// Accepts a bare JSON object, optionally wrapped in a Markdown code fence.
/// Fails when the text is not JSON or either prompt is missing or blank.
pub fn parse_refined_prompts(text: &str) -> Result<RefinedPrompts, CoreError> {
    let body = strip_code_fence(text.trim());

    let raw: RawPrompts = serde_json::from_str(body).map_err(|e| CoreError::Upstream {
        service: "Prompt refinement",
        message: format!("response is not valid JSON: {e}"),
    })?;

    let image_prompt = require_prompt(raw.image_prompt, "imagePrompt")?;
    let video_prompt = require_prompt(raw.video_prompt, "videoPrompt")?;

    Ok(RefinedPrompts {
        image_prompt,
        video_prompt,
    })
}

fn require_prompt(value: Option<String>, field: &str) -> Result<String, CoreError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::Upstream {
            service: "Prompt refinement",
            message: format!("response is missing '{field}'"),
        }),
    }
}

/// Strip a surrounding ```` ```json ... ``` ```` fence if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
