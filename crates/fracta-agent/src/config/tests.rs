#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_default_llm_is_local_only() {
        let llm = LlmConfig::default();
        assert_eq!(default_llm_mode(), "local_only");
        assert!(llm.is_local_only());
        assert_eq!(llm.ollama.unwrap().base_url, "http://localhost:11434");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.database.path, "db/papers.sqlite");
        assert_eq!(config.extraction.max_input_tokens, 512);
        assert_eq!(config.extraction.max_new_tokens, 220);
        assert_eq!(config.summary.min_length, 150);
        assert_eq!(config.summary.max_length, 200);
        assert!(config.security.audit_llm_calls);
        assert!(config.llm.ollama.is_some());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/tmp/fractures.sqlite"

            [llm]
            mode = "remote"
            default_backend = "openai"

            [llm.openai]
            model = "gpt-4o-mini"

            [extraction]
            min_abstract_words = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, "/tmp/fractures.sqlite");
        assert!(!config.llm.is_local_only());
        assert_eq!(config.llm.local_backend, "ollama");
        let openai = config.llm.openai.unwrap();
        assert_eq!(openai.api_key, "");
        assert_eq!(openai.timeout_secs, 120);
        assert_eq!(config.extraction.min_abstract_words, 80);
        assert_eq!(config.extraction.min_conclusion_words, 30);
    }

    #[test]
    fn test_min_length_below_max_length() {
        let s = SummarySettings::default();
        assert!(s.min_length < s.max_length,
            "min_length ({}) should be below max_length ({})", s.min_length, s.max_length);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.llm.mode, "local_only");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fracta.toml");
        std::fs::write(&path, "[llm]\nmode = \"disabled\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.llm.is_disabled());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[llm\nmode = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_unknown_llm_mode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.toml");
        std::fs::write(&path, "[llm]\nmode = \"local-only\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("local-only"));
    }

    #[test]
    fn test_known_llm_modes_validate() {
        for mode in LLM_MODES {
            let llm = LlmConfig { mode: mode.to_string(), ..LlmConfig::default() };
            assert!(llm.validate().is_ok(), "{mode} should be accepted");
        }
        assert!(LlmConfig::default().validate().is_ok());
    }
}
