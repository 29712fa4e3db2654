use anyhow::Context;
use clap::Parser;
use edital_qa_core::{
    load_or_build, read_env_file, AgentConfig, AnswerGenerator, HybridRetriever, LlmConfig,
    SentenceEmbedder, DEFAULT_CHAT_MODEL, NO_MATCH_ANSWER,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "edital-qa", version)]
#[command(about = "Answers one question about the admissions regulations, grounded in the PDFs.")]
struct Cli {
    /// Question about the admissions process, in natural language.
    question: String,

    /// Folder containing the regulation PDFs.
    #[arg(long, default_value = "dados")]
    docs_dir: PathBuf,

    /// Folder where the persisted index artifacts live.
    #[arg(long, default_value = ".")]
    cache_dir: PathBuf,

    /// Language-model API key.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// KEY=VALUE file consulted when --api-key and GROQ_API_KEY are absent.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Chat model identifier.
    #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
    model: String,

    /// Similarity score cutoff; candidates scoring above it are dropped.
    #[arg(long, default_value_t = 8.0)]
    score_threshold: f32,

    /// Maximum number of context passages fed to the model.
    #[arg(long, default_value_t = 20)]
    max_context: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Credential check happens before any document or network work.
    let api_key = resolve_api_key(&cli)?;

    let mut llm = LlmConfig::new(api_key);
    llm.model = cli.model.clone();
    let mut config = AgentConfig::new(cli.docs_dir.clone(), &cli.cache_dir, llm);
    config.retrieval.score_threshold = cli.score_threshold;
    config.retrieval.max_context_chunks = cli.max_context;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %chrono::Utc::now().to_rfc3339(),
        docs_dir = %config.docs_dir.display(),
        "edital-qa boot"
    );

    let mut embedder =
        SentenceEmbedder::new().context("failed to initialize the embedding model")?;

    let base = load_or_build(&config, &mut embedder)
        .context("failed to load or build the document index")?;

    let retriever = HybridRetriever::new(config.retrieval);
    let context = retriever
        .retrieve(&mut embedder, &base, &cli.question)
        .context("retrieval failed")?;

    if context.is_empty() {
        info!("no passage survived filtering");
        println!("{NO_MATCH_ANSWER}");
        return Ok(());
    }

    info!(passages = context.len(), "generating answer");
    let generator = AnswerGenerator::new(config.llm);
    let answer = generator
        .answer(&cli.question, &context)
        .context("language model call failed")?;

    println!("{answer}");
    Ok(())
}

fn resolve_api_key(cli: &Cli) -> anyhow::Result<String> {
    if let Some(key) = cli.api_key.as_deref() {
        let key = key.trim();
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }

    if let Some(path) = &cli.env_file {
        let variables = read_env_file(path)
            .with_context(|| format!("failed to read env file {}", path.display()))?;
        if let Some(key) = variables.get("GROQ_API_KEY") {
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
    }

    anyhow::bail!(
        "GROQ_API_KEY is not configured; pass --api-key, set the environment variable, \
         or point --env-file at a file that defines it"
    )
}
