use super::{Config, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_pipeline();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid STUDYBUDDY_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_TEMPERATURE") {
            match v.parse::<f32>() {
                Ok(t) => self.llm.temperature = t,
                Err(_) => tracing::warn!("ignoring invalid STUDYBUDDY_LLM_TEMPERATURE value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_MAX_TOKENS") {
            match v.parse::<u32>() {
                Ok(n) => self.llm.max_tokens = n,
                Err(_) => tracing::warn!("ignoring invalid STUDYBUDDY_LLM_MAX_TOKENS value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("STUDYBUDDY_LLM_API_KEY")
            && !v.is_empty()
        {
            self.secrets.llm_api_key = Some(Secret::new(v));
        }
    }

    fn apply_env_overrides_pipeline(&mut self) {
        if let Ok(v) = std::env::var("STUDYBUDDY_CORPUS_DIR") {
            self.corpus.directory = v.into();
        }
        override_number("STUDYBUDDY_CORPUS_MAX_FILE_SIZE", &mut self.corpus.max_file_size);
        override_number(
            "STUDYBUDDY_CORPUS_LOAD_CONCURRENCY",
            &mut self.corpus.load_concurrency,
        );
        override_number("STUDYBUDDY_CHUNK_SIZE", &mut self.chunking.chunk_size);
        override_number("STUDYBUDDY_CHUNK_OVERLAP", &mut self.chunking.chunk_overlap);
        override_number("STUDYBUDDY_QA_TOP_K", &mut self.retrieval.qa_top_k);
        override_number("STUDYBUDDY_QUIZ_TOP_K", &mut self.retrieval.quiz_top_k);
        override_number(
            "STUDYBUDDY_SCOPED_CANDIDATE_POOL",
            &mut self.retrieval.scoped_candidate_pool,
        );
        override_number(
            "STUDYBUDDY_EMBED_CONCURRENCY",
            &mut self.retrieval.embed_concurrency,
        );
        override_number("STUDYBUDDY_TIMEOUT_LLM", &mut self.timeouts.llm_seconds);
        override_number(
            "STUDYBUDDY_TIMEOUT_EMBEDDING",
            &mut self.timeouts.embedding_seconds,
        );
    }
}

fn override_number<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(v) = std::env::var(key) {
        match v.parse::<T>() {
            Ok(n) => *target = n,
            Err(_) => tracing::warn!("ignoring invalid {key} value: {v}"),
        }
    }
}
