//! Prompt templates for orchestration, synthesis and coaching

use crate::coaching::entities::InterviewTemplate;
use crate::orchestration::value_objects::ModelAnswer;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the fan-out phase
    pub fn answer_system() -> &'static str {
        r#"You are a knowledgeable assistant answering a user's question.
Provide a thoughtful, well-reasoned response. Be concise but comprehensive.
Support your points with reasoning and examples where appropriate."#
    }

    /// User prompt for the fan-out phase; prepends free-text context when given
    pub fn answer_query(query: &str, context: Option<&str>) -> String {
        match context {
            Some(ctx) if !ctx.trim().is_empty() => {
                format!("Context:\n{}\n\nQuestion:\n{}", ctx, query)
            }
            _ => query.to_string(),
        }
    }

    /// System prompt for the synthesis call
    pub fn synthesis_system() -> &'static str {
        "You are a meta-AI synthesizer that combines insights from multiple \
         AI models to produce superior responses."
    }

    /// User prompt for the synthesis call, embedding every successful answer
    pub fn synthesis_prompt(query: &str, answers: &[&ModelAnswer]) -> String {
        let mut prompt = format!(
            r#"You are a meta-AI synthesizer. Your job is to analyze multiple AI model responses to the same query and create the BEST possible synthesized response.

ORIGINAL QUERY:
{}

RESPONSES FROM DIFFERENT MODELS:
"#,
            query
        );

        for answer in answers {
            prompt.push_str(&format!(
                "\n=== {} ===\n{}\n",
                answer.model.as_str().to_uppercase(),
                answer.response
            ));
        }

        prompt.push_str(
            r#"
YOUR TASK:
1. Analyze all responses and identify:
   - Common themes and agreements
   - Unique insights from each model
   - Any contradictions or differing approaches

2. Create a SYNTHESIZED response that:
   - Combines the best ideas from all models
   - Resolves any contradictions with reasoning
   - Is more comprehensive than any single response
   - Is actionable and well-structured

3. Provide a brief methodology note explaining how you combined the responses.

FORMAT YOUR RESPONSE AS:

## Synthesized Response
[Your best-of-all-models answer]

## Synthesis Methodology
[Brief explanation of how you combined responses]

## Strengths from Each Model
[One bullet per model naming its key contribution]"#,
        );

        prompt
    }

    /// System prompt for the interview coach, embedding template context
    pub fn coach_system(template: Option<&InterviewTemplate>) -> String {
        let mut prompt = String::from(
            r#"You are acting as an interview coach running a mock interview.

Instructions:
- Ask one question at a time.
- After each candidate response, provide concise structured feedback using this exact format:
QUESTION: <next interview question>
FEEDBACK:
- Clarity: <0-10 score> - <comment>
- Completeness: <0-10 score> - <comment>
- Technical Alignment: <0-10 score> - <comment>
NEXT_STEP: <encouraging suggestion or follow-up direction>

Session context:
"#,
        );

        match template {
            Some(t) => {
                prompt.push_str(&format!("- Template Title: {}\n", t.title));
                if let Some(description) = &t.description {
                    prompt.push_str(&format!("- Description: {}\n", description));
                }
                if let Some(focus_area) = &t.focus_area {
                    prompt.push_str(&format!("- Focus Area: {}\n", focus_area));
                }
                if let Some(persona) = &t.persona {
                    prompt.push_str(&format!("- Candidate Persona: {}\n", persona));
                }
            }
            None => prompt.push_str("- Template Title: General Interview\n"),
        }

        prompt.push_str(
            "\nKeep responses under 180 words. Encourage the learner and remain professional.",
        );
        prompt
    }

    /// Opening instruction when the client starts a session without a message
    pub fn coach_opening() -> &'static str {
        "Please begin the interview by asking the first question aligned with \
         the template focus area. Do not provide feedback yet."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::TokenUsage;
    use crate::core::model::Model;

    #[test]
    fn test_answer_query_with_context() {
        let q = PromptTemplate::answer_query("What is Rust?", Some("A systems language quiz"));
        assert!(q.starts_with("Context:"));
        assert!(q.contains("What is Rust?"));

        let bare = PromptTemplate::answer_query("What is Rust?", None);
        assert_eq!(bare, "What is Rust?");
    }

    #[test]
    fn test_synthesis_prompt_embeds_answers() {
        let a = ModelAnswer::success(Model::Gpt4o, "use tokio", TokenUsage::default(), 1);
        let b = ModelAnswer::success(Model::ClaudeSonnet4, "use async-std", TokenUsage::default(), 1);
        let prompt = PromptTemplate::synthesis_prompt("which runtime?", &[&a, &b]);

        assert!(prompt.contains("=== GPT-4O ==="));
        assert!(prompt.contains("use tokio"));
        assert!(prompt.contains("=== CLAUDE-SONNET-4 ==="));
        assert!(prompt.contains("## Synthesized Response"));
    }

    #[test]
    fn test_coach_system_embeds_template() {
        let mut template = InterviewTemplate::new("Backend Engineer Screen");
        template.focus_area = Some("API design".to_string());
        let prompt = PromptTemplate::coach_system(Some(&template));

        assert!(prompt.contains("Backend Engineer Screen"));
        assert!(prompt.contains("API design"));

        let bare = PromptTemplate::coach_system(None);
        assert!(bare.contains("General Interview"));
    }
}
