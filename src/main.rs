use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use studybuddy_core::config::{Config, ProviderKind};
use studybuddy_core::{
    CorpusSource, LoadSummary, QuizRequest, Session, Settings, StudyError, parse_question_count,
};
use studybuddy_llm::CallScope;
use studybuddy_llm::any::AnyProvider;
use studybuddy_llm::compatible::CompatibleProvider;
use studybuddy_llm::ollama::OllamaProvider;
use studybuddy_llm::retry::retry_transient;
use studybuddy_memory::LoaderRegistry;
use tokio_util::sync::CancellationToken;

const MAX_RETRIES: u32 = 3;
const DEFAULT_QUESTIONS: u32 = 5;

#[derive(Debug, Parser)]
#[command(name = "studybuddy", version, about = "Cited answers and practice quizzes from your notes")]
struct Cli {
    /// Configuration file (defaults to $STUDYBUDDY_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the file extensions that can be loaded
    Formats,
    /// Load the corpus and list its source files
    Sources {
        /// A directory, or one or more files (defaults to the configured directory)
        paths: Vec<PathBuf>,
    },
    /// Answer a question from the corpus, with sources
    Ask {
        paths: Vec<PathBuf>,
        #[arg(long, short)]
        question: String,
    },
    /// Generate multiple-choice practice questions
    Quiz {
        paths: Vec<PathBuf>,
        /// Number of questions to ask for
        #[arg(long, short = 'n', default_value_t = DEFAULT_QUESTIONS, value_parser = parse_question_count)]
        questions: u32,
        /// Only use content from this source file (exact name or unique fragment)
        #[arg(long, short)]
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    run(cli.command, &config).await
}

async fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Formats => {
            let registry = LoaderRegistry::with_defaults(config.corpus.max_file_size);
            for ext in registry.supported_extensions() {
                println!(".{ext}");
            }
        }
        Command::Sources { paths } => {
            let (mut session, scope) = open_session(config).await?;
            load(&mut session, &paths, config, &scope).await?;
            for (i, file) in session.list_source_files().iter().enumerate() {
                println!("{}. {file}", i + 1);
            }
        }
        Command::Ask { paths, question } => {
            let (mut session, scope) = open_session(config).await?;
            load(&mut session, &paths, config, &scope).await?;
            let answer = retry_transient(MAX_RETRIES, || session.answer(&question, &scope))
                .await
                .map_err(describe)?;
            println!("{answer}");
            if answer.is_not_found() {
                eprintln!("note: the loaded notes do not seem to cover this question");
            }
        }
        Command::Quiz {
            paths,
            questions,
            file,
        } => {
            let (mut session, scope) = open_session(config).await?;
            load(&mut session, &paths, config, &scope).await?;
            let scope_file = file.map(|f| resolve_scope_file(&session, &f)).transpose()?;
            let request = QuizRequest::new(i64::from(questions), scope_file)?;
            let quiz = retry_transient(MAX_RETRIES, || session.quiz(&request, &scope))
                .await
                .map_err(describe)?;
            if let Some(file) = &quiz.scope_file {
                eprintln!("Quiz from: {file}");
            }
            println!("{quiz}");
            let detected = quiz.detected_questions();
            if detected != questions as usize {
                eprintln!("note: asked for {questions} question(s), the model produced {detected}");
            }
        }
    }
    Ok(())
}

/// Build the provider and session, and a call scope cancelled by ctrl-c.
async fn open_session(config: &Config) -> anyhow::Result<(Session<AnyProvider>, CallScope)> {
    let provider = create_provider(config)?;
    health_check(&provider).await;
    let session = Session::new(provider, Settings::from(config));

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());
    Ok((session, CallScope::unbounded().with_cancel(cancel)))
}

async fn load(
    session: &mut Session<AnyProvider>,
    paths: &[PathBuf],
    config: &Config,
    scope: &CallScope,
) -> anyhow::Result<()> {
    let source = corpus_source(paths, &config.corpus.directory);
    let shared: &Session<AnyProvider> = session;
    let prepared = match retry_transient(MAX_RETRIES, || shared.prepare_corpus(&source, scope)).await
    {
        Ok(prepared) => prepared,
        Err(StudyError::NoCorpusFound { warnings }) => {
            for warning in &warnings {
                eprintln!("  {warning}");
            }
            bail!("no documents could be loaded from {}", describe_source(&source));
        }
        Err(e) => return Err(describe(e)),
    };
    report(&session.install(prepared));
    Ok(())
}

fn report(summary: &LoadSummary) {
    for warning in &summary.warnings {
        eprintln!("  {warning}");
    }
    for failure in &summary.embed_failures {
        eprintln!(
            "  left out a chunk of {}: {}",
            failure.metadata.source_file, failure.reason
        );
    }
    eprintln!(
        "Loaded {} file(s): {} chunk(s), {} indexed",
        summary.files_loaded, summary.chunks, summary.indexed
    );
}

/// No paths means the configured directory; a single directory is loaded as
/// one; anything else is an explicit file list.
fn corpus_source(paths: &[PathBuf], default_dir: &Path) -> CorpusSource {
    match paths {
        [] => CorpusSource::Directory(default_dir.to_path_buf()),
        [single] if single.is_dir() => CorpusSource::Directory(single.clone()),
        _ => CorpusSource::Files(paths.to_vec()),
    }
}

fn describe_source(source: &CorpusSource) -> String {
    match source {
        CorpusSource::Directory(dir) => dir.display().to_string(),
        CorpusSource::Files(files) => format!("{} file(s)", files.len()),
    }
}

/// Pick the indexed file a `--file` argument refers to. Unknown names pass
/// through unchanged so the quiz reports them as unmatched.
fn resolve_scope_file(session: &Session<AnyProvider>, requested: &str) -> anyhow::Result<String> {
    let matches = session.match_source_files(requested);
    match matches.as_slice() {
        [] => Ok(requested.to_owned()),
        [single] => Ok(single.clone()),
        many => bail!(
            "{requested:?} matches several files: {}; use the exact name",
            many.join(", ")
        ),
    }
}

fn describe(err: StudyError) -> anyhow::Error {
    let hint = if err.is_transient() {
        "service error, try again later"
    } else {
        err.kind().as_str()
    };
    anyhow::Error::new(err).context(format!("request failed ({hint})"))
}

fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let llm = &config.llm;
    match llm.provider {
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(OllamaProvider::new(
            &llm.base_url,
            llm.model.clone(),
            llm.embedding_model.clone(),
        ))),
        ProviderKind::Compatible => Ok(AnyProvider::Compatible(CompatibleProvider::new(
            "compatible".into(),
            config
                .secrets
                .llm_api_key
                .as_ref()
                .map(|key| key.expose().to_owned()),
            &llm.base_url,
            llm.model.clone(),
            Some(llm.embedding_model.clone()).filter(|m| !m.is_empty()),
        ))),
        #[cfg(feature = "mock")]
        ProviderKind::Mock => Ok(AnyProvider::Mock(
            studybuddy_llm::mock::MockProvider::default(),
        )),
        #[allow(unreachable_patterns)]
        other => bail!("LLM provider {other} not available (feature not enabled)"),
    }
}

async fn health_check(provider: &AnyProvider) {
    if let AnyProvider::Ollama(ollama) = provider {
        match ollama.health_check().await {
            Ok(()) => tracing::debug!("ollama health check passed"),
            Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
        }
    }
}

fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        cancel.cancel();
    });
}

fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("STUDYBUDDY_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use studybuddy_llm::LlmProvider;

    use super::*;

    #[test]
    fn config_loading_from_default_toml() {
        let config = Config::load(Path::new("config/default.toml"));
        assert!(config.is_ok());
    }

    #[test]
    fn create_provider_ollama() {
        let config = Config::load(Path::new("/nonexistent")).unwrap();
        let provider = create_provider(&config).unwrap();
        assert!(matches!(provider, AnyProvider::Ollama(_)));
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn create_provider_compatible() {
        let mut config = Config::load(Path::new("/nonexistent")).unwrap();
        config.llm.provider = ProviderKind::Compatible;
        config.llm.base_url = "http://localhost:1234/v1".into();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "compatible");
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn corpus_source_modes() {
        let dir = tempfile::tempdir().unwrap();
        let default = Path::new("files");
        assert_eq!(
            corpus_source(&[], default),
            CorpusSource::Directory(PathBuf::from("files"))
        );
        assert_eq!(
            corpus_source(&[dir.path().to_path_buf()], default),
            CorpusSource::Directory(dir.path().to_path_buf())
        );
        let files = vec![PathBuf::from("a.pdf"), PathBuf::from("b.md")];
        assert_eq!(
            corpus_source(&files, default),
            CorpusSource::Files(files.clone())
        );
        assert_eq!(
            corpus_source(&files[..1], default),
            CorpusSource::Files(vec![PathBuf::from("a.pdf")])
        );
    }

    #[test]
    fn cli_parses_quiz_arguments() {
        let cli = Cli::try_parse_from(["studybuddy", "quiz", "notes/", "-n", "3", "--file", "bio"])
            .unwrap();
        let Command::Quiz {
            paths,
            questions,
            file,
        } = cli.command
        else {
            panic!("expected quiz command");
        };
        assert_eq!(paths, vec![PathBuf::from("notes/")]);
        assert_eq!(questions, 3);
        assert_eq!(file.as_deref(), Some("bio"));
    }

    #[test]
    fn cli_defaults_to_five_questions() {
        let cli = Cli::try_parse_from(["studybuddy", "quiz"]).unwrap();
        assert!(matches!(cli.command, Command::Quiz { questions: 5, .. }));
    }

    #[test]
    fn cli_rejects_non_positive_question_count() {
        assert!(Cli::try_parse_from(["studybuddy", "quiz", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["studybuddy", "quiz", "-n", "many"]).is_err());
    }

    #[test]
    fn cli_requires_question_for_ask() {
        assert!(Cli::try_parse_from(["studybuddy", "ask"]).is_err());
        let cli = Cli::try_parse_from(["studybuddy", "--config", "x.toml", "ask", "-q", "why?"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
