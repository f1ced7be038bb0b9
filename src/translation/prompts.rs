/*!
 * Prompt construction for chunk translation requests.
 *
 * A request is split in three parts so the provider can cache the large,
 * repeated part:
 * - the system prompt, fixed for every chunk
 * - the style profile block, identical for every chunk of a run
 * - the chunk instructions, carrying context and the entries to translate
 */

use crate::language_utils;
use crate::subtitle_processor::SubtitleEntry;
use crate::translation::core::ChunkRequest;

/// Marker opening the entries to translate
pub const BEGIN_MARKER: &str = "---BEGIN SUBTITLES TO TRANSLATE---";

/// Marker closing the entries to translate
pub const END_MARKER: &str = "---END SUBTITLES TO TRANSLATE---";

/// System prompt demanding the echo format and nothing else
pub const SYSTEM_PROMPT: &str = "You are a precise subtitle translator. You MUST:
1. Preserve all subtitle numbers and timestamps EXACTLY
2. Translate text naturally for spoken language
3. Keep translations concise for on-screen readability
4. Output ONLY the translated subtitles with NO additional text
5. Maintain the exact format: [index] timestamp --> timestamp\\ntext";

const GUIDELINES: &str = "## SUBTITLE TRANSLATION GUIDELINES

You are translating VIDEO SUBTITLES.

CRITICAL RULES:
1. **Preserve subtitle structure**: Each subtitle must have same [index] and timestamps
2. **Concise translation**: Subtitles must be readable on screen (aim for similar length)
3. **Natural spoken language**: Translate as if speaking, not writing
4. **Context awareness**: Consider previous and upcoming subtitles for flow
5. **Character limits**: Keep lines under 42 characters when possible for readability
6. **Technical terms**: Follow brand terminology exactly (see style guide above)
7. **NO explanations**: Output ONLY the translated subtitles in exact same format

CHARACTER LIMIT GUIDELINES:
- Ideal: 35-42 characters per line
- Maximum: 50 characters per line";

const OUTPUT_FORMAT: &str = "Now translate ONLY the subtitles between the BEGIN/END markers.
Output format (EXACTLY like this):

[index] HH:MM:SS,mmm --> HH:MM:SS,mmm
Translated text here

[next_index] HH:MM:SS,mmm --> HH:MM:SS,mmm
Translated text here

Translation:";

/// The rendered parts of one chunk request
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPrompt {
    /// System prompt
    pub system: String,

    /// Style profile text, sent as a cacheable block; may be empty
    pub profile: String,

    /// Per-chunk instructions and entries
    pub instructions: String,
}

impl ChunkPrompt {
    /// Render the prompt for a chunk request
    pub fn build(request: &ChunkRequest<'_>) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            profile: request.style_profile.to_string(),
            instructions: render_instructions(request),
        }
    }
}

/// `[index] text` lines for a context section
fn render_context(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("[{}] {}", e.seq_num, e.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `[index] start --> end` blocks for the entries to translate
pub fn render_body(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("[{}] {} --> {}\n{}", e.seq_num, e.format_start_time(), e.format_end_time(), e.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn target_language_label(code: &str) -> String {
    match language_utils::get_language_name(code) {
        Ok(name) => format!("{} ({})", code.to_uppercase(), name),
        Err(_) => code.to_uppercase(),
    }
}

fn render_instructions(request: &ChunkRequest<'_>) -> String {
    let chunk = &request.chunk;
    let mut sections = Vec::new();

    sections.push(format!("---\n\nTARGET LANGUAGE: {}", target_language_label(request.target_language)));
    sections.push(GUIDELINES.to_string());

    let mut context_info = Vec::new();
    if let Some(title) = request.title.filter(|t| !t.trim().is_empty()) {
        context_info.push(format!("Video title: {}", title));
    }
    let (first, last) = chunk.position_range();
    context_info.push(format!(
        "This is chunk {} of {} (subtitles {}-{})",
        chunk.number, chunk.total, first, last
    ));
    sections.push(context_info.join("\n"));

    if !chunk.previous_context.is_empty() {
        sections.push(format!(
            "PREVIOUS CONTEXT (already translated, for continuity):\n{}",
            render_context(chunk.previous_context)
        ));
    }

    sections.push(format!("{}\n{}\n{}", BEGIN_MARKER, render_body(chunk.entries), END_MARKER));

    if !chunk.next_context.is_empty() {
        sections.push(format!(
            "UPCOMING CONTEXT (will be translated next, for flow):\n{}",
            render_context(chunk.next_context)
        ));
    }

    sections.push(OUTPUT_FORMAT.to_string());
    sections.join("\n\n")
}
