//! Prompt rendering for generation requests.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::feedback::Feedback;

const GENERATE_TEMPLATE: &str = include_str!("prompts/generate.md");

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("generate", GENERATE_TEMPLATE)
            .expect("generate template should be valid");
        Self { env }
    }
}

/// Render the generation prompt: the test source plus, when present, the
/// previous attempt's failure text.
pub fn render_prompt(test_source: &str, feedback: &Feedback) -> Result<String> {
    let engine = PromptEngine::new();
    let template = engine.env.get_template("generate")?;
    let rendered = template.render(context! {
        test_source => test_source.trim(),
        failure => feedback.error().map(str::trim).filter(|s| !s.is_empty()),
    })?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_renders_without_a_failure_section() {
        let prompt = render_prompt("mod adder;\n", &Feedback::none()).expect("render");
        assert!(prompt.contains("<tests>"));
        assert!(prompt.contains("mod adder;"));
        assert!(!prompt.contains("<failure>"));
    }

    #[test]
    fn retry_attempt_embeds_the_failure_text() {
        let feedback = Feedback::from_failure("expected 4, got 5");
        let prompt = render_prompt("mod adder;\n", &feedback).expect("render");
        assert!(prompt.contains("<failure>"));
        assert!(prompt.contains("expected 4, got 5"));
    }

    #[test]
    fn empty_failure_text_is_treated_as_absent() {
        let feedback = Feedback::from_failure("   ");
        let prompt = render_prompt("mod adder;\n", &feedback).expect("render");
        assert!(!prompt.contains("<failure>"));
    }
}
