pub const GROQ_HOST: &str = "https://api.groq.com";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";

/// Request configuration for the Groq OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    /// Advertise the browser search tool and pin the sampling parameters
    /// the endpoint requires for it.
    pub web_search: bool,
}

impl GroqProviderConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        GroqProviderConfig {
            host: GROQ_HOST.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            web_search: false,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_web_search(mut self, web_search: bool) -> Self {
        self.web_search = web_search;
        self
    }
}
