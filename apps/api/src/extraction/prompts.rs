// Prompt constants for the extraction call.

/// Extraction prompt template. Replace `{description}` before sending.
///
/// The user's text sits inside a `"""` span so it cannot be read as instructions.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"
You are a product analyst. Extract structured app requirements from the user's description.
Return STRICT JSON with exactly these keys:
{
  "appName": string,
  "entities": string[],
  "roles": string[],
  "features": string[]
}
Guidelines: invent a short sensible appName if not given; entities are key data objects; roles are user types; features are main actions.
User description:
"""{description}""""#;

pub fn build_extraction_prompt(description: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{description}", description)
}
