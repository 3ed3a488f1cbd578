//! Parsing of the synthesizer's structured reply.
//!
//! The synthesis prompt asks the model to format its reply with
//! `## Synthesized Response` and `## Synthesis Methodology` headers.
//! Models mostly comply, but the parser must tolerate replies without
//! the markers: the whole reply then becomes the content.

/// Fallback methodology note when the reply carries no methodology section
pub const DEFAULT_METHODOLOGY: &str = "Combined insights from all models";

const CONTENT_HEADER: &str = "## Synthesized Response";
const METHODOLOGY_HEADER: &str = "## Synthesis Methodology";
const STRENGTHS_HEADER: &str = "## Strengths from Each Model";

/// Split a synthesizer reply into `(content, methodology)`.
pub fn parse_synthesis_reply(reply: &str) -> (String, String) {
    let content = section(reply, CONTENT_HEADER, &[METHODOLOGY_HEADER, STRENGTHS_HEADER])
        .unwrap_or_else(|| reply.trim().to_string());

    let methodology = section(reply, METHODOLOGY_HEADER, &[STRENGTHS_HEADER])
        .unwrap_or_else(|| DEFAULT_METHODOLOGY.to_string());

    (content, methodology)
}

/// Extract the text between `header` and the first of `terminators` (or EOF)
fn section(reply: &str, header: &str, terminators: &[&str]) -> Option<String> {
    let start = reply.find(header)? + header.len();
    let rest = &reply[start..];

    let end = terminators
        .iter()
        .filter_map(|t| rest.find(t))
        .min()
        .unwrap_or(rest.len());

    let text = rest[..end].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
