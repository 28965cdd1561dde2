//! Deterministic prompt rendering for the lineup generator.

use anyhow::Result;
use minijinja::{Environment, context};
use tracing::debug;

use crate::core::types::Position;

const GENERATOR_TEMPLATE: &str = include_str!("prompts/generator.md");

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("generator", GENERATOR_TEMPLATE)
            .expect("generator template should be valid");
        Self { env }
    }

    fn render_generator(&self, roster_text: &str) -> Result<String> {
        let positions: Vec<&str> = Position::ALL.iter().map(|p| p.as_str()).collect();
        let template = self.env.get_template("generator")?;
        let rendered = template.render(context! {
            positions => positions,
            players => roster_text.trim(),
        })?;
        Ok(rendered.trim().to_string())
    }
}

/// Builds the instruction sent to the model for one generator attempt.
///
/// The roster text is passed through verbatim (trimmed); no delimiter grammar
/// is imposed. The same input always yields the same prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_generator(&self, roster_text: &str) -> Result<String> {
        let prompt = PromptEngine::new().render_generator(roster_text)?;
        debug!(bytes = prompt.len(), "rendered generator prompt");
        Ok(prompt)
    }
}
