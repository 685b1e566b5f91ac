use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Maximum number of articles kept after aggregation
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// Newest entries taken from each source
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

fn default_max_articles() -> usize {
    10
}

fn default_per_source_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    /// Keywords highlighted when they appear in an entry title
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisConfig {
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
    /// Upper bound on the narration script, in characters
    #[serde(default = "default_max_script_chars")]
    pub max_script_chars: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            model_id: default_model_id(),
            api_url: default_api_url(),
            artifact_path: default_artifact_path(),
            max_script_chars: default_max_script_chars(),
        }
    }
}

fn default_voice() -> String {
    "rachel".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_api_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_artifact_path() -> String {
    "data/briefing.mp3".to_string()
}

fn default_max_script_chars() -> usize {
    4800
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        assert_eq!(default_max_articles(), 10);
        assert_eq!(default_per_source_limit(), 5);
        assert_eq!(default_max_script_chars(), 4800);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            max_articles = 12
            per_source_limit = 3

            [[sources]]
            name = "Test Source"
            url = "https://example.com/feed.xml"
            keywords = ["AI", "LLM"]

            [[sources]]
            name = "Another Source"
            url = "https://example.org/rss"

            [synthesis]
            voice = "paul"
            artifact_path = "out/news.mp3"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.max_articles, 12);
        assert_eq!(config.per_source_limit, 3);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name, "Test Source");
        assert_eq!(config.sources[0].keywords, vec!["AI", "LLM"]);
        assert!(config.sources[1].keywords.is_empty());
        assert_eq!(config.synthesis.voice, "paul");
        assert_eq!(config.synthesis.artifact_path, "out/news.mp3");
        // Unset synthesis fields keep their defaults
        assert_eq!(config.synthesis.model_id, "eleven_multilingual_v2");
        assert_eq!(config.synthesis.api_url, "https://api.elevenlabs.io/v1");
    }

    #[test]
    fn test_load_config_with_default_limits() {
        let content = r#"
            [[sources]]
            name = "Test Source"
            url = "https://example.com/feed.xml"
        "#;

        let config = Config::from_str(content).unwrap();

        assert_eq!(config.max_articles, 10);
        assert_eq!(config.per_source_limit, 5);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.synthesis.voice, "rachel");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_required_fields() {
        let content = r#"
            [[sources]]
            name = "Test Source"
            # Missing url field
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_sources_list() {
        let content = "sources = []";

        let config = Config::from_str(content).unwrap();
        assert!(config.sources.is_empty());
    }
}
