// Skill extraction prompt templates.

/// Longest slice of document text sent to the model.
pub const MAX_INPUT_CHARS: usize = 10_000;

pub const EXTRACT_SKILLS_PROMPT: &str = "\
Extract all key technical skills from the text below. \
Include programming languages, libraries, frameworks, and tools. \
Return ONLY a JSON array format like this: [\"Python\", \"JavaScript\", \"React\"]

Text:
{text}";
