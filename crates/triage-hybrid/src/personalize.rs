use triage_core::config::PersonalizationSettings;
use triage_core::Context;

/// Post-processing applied to synthesized response text.
pub trait Personalizer: Send + Sync {
    fn personalize(&self, response: &str, context: &Context) -> String;
}

impl<F> Personalizer for F
where
    F: Fn(&str, &Context) -> String + Send + Sync,
{
    fn personalize(&self, response: &str, context: &Context) -> String { self(response, context) }
}

/// Replaces a placeholder with the user's name from the context.
#[derive(Debug, Clone)]
pub struct UsernamePersonalizer {
    placeholder: String,
    context_key: String,
    default_name: String,
}

impl UsernamePersonalizer {
    pub fn new(settings: &PersonalizationSettings) -> Self {
        Self {
            placeholder: settings.placeholder.clone(),
            context_key: settings.context_key.clone(),
            default_name: settings.default_name.clone(),
        }
    }
}

impl Default for UsernamePersonalizer {
    fn default() -> Self { Self::new(&PersonalizationSettings::default()) }
}

impl Personalizer for UsernamePersonalizer {
    fn personalize(&self, response: &str, context: &Context) -> String {
        let name = context.get(&self.context_key).map_or(self.default_name.as_str(), String::as_str);
        response.replace(&self.placeholder, name)
    }
}

/// Keep only the text after the last `Bot:` marker, trimmed.
pub fn clean_response(response: &str) -> String {
    response.rsplit("Bot:").next().unwrap_or(response).trim().to_string()
}
