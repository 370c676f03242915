//! Template-driven Generation Service.
//!
//! Stands in for a model-backed generator: each category maps to a canned
//! reply, and categories without one get the rendered prompt back. Templates
//! may reference `{category}`, `{text}` and `{user}`; `{user}` is left for the
//! personalization pass.

use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use triage_core::config::{GenerationSettings, DEFAULT_PROMPT};
use triage_core::{Context, Generator};

/// Render the prompt a model-backed generator would receive for a categorised query.
pub fn category_prompt(category: &str, text: &str) -> String {
    render(DEFAULT_PROMPT, category, text)
}

fn render(template: &str, category: &str, text: &str) -> String {
    template.replace("{category}", category).replace("{text}", text)
}

pub struct TemplateGenerator {
    prompt: String,
    responses: HashMap<String, String>,
    free_response: String,
}

impl TemplateGenerator {
    pub fn new(prompt: impl Into<String>, responses: HashMap<String, String>, free_response: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), responses, free_response: free_response.into() }
    }

    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self::new(settings.prompt.clone(), settings.responses.clone(), settings.free_response.clone())
    }
}

impl Generator for TemplateGenerator {
    fn generate(&self, category: &str, text: &str, _context: &Context) -> Result<String> {
        let template = self.responses.get(category).unwrap_or(&self.prompt);
        debug!(category, canned = self.responses.contains_key(category), "generating response");
        Ok(render(template, category, text))
    }

    fn generate_free(&self, text: &str, _context: &Context) -> Result<String> {
        Ok(render(&self.free_response, "", text))
    }
}
