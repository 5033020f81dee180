use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gencompare::config::EmbedderMode;
use gencompare::{
    parse_references, ByteTokenizer, CompareConfig, ComparisonPipeline, Embedder, HfTokenizer,
    HttpEmbedder, LlamaServerGenerator, StubEmbedder, Tokenizer,
};

/// Compare what a model answers for two inputs.
#[derive(Debug, Parser)]
#[command(name = "gencompare", version)]
struct Cli {
    /// YAML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Embed the two inputs directly instead of generating answers for them.
    #[arg(long)]
    embed_only: bool,

    /// Rank the answer for INPUT_A against `label:text` lines from this file.
    #[arg(long, conflicts_with_all = ["embed_only", "input_b"])]
    references: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    input_a: String,

    #[arg(required_unless_present = "references")]
    input_b: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CompareConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CompareConfig::default(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let pipeline = build_pipeline(&config)?;
    let sampling = &config.sampling;

    if let Some(path) = &cli.references {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let references = parse_references(&content);
        let ranking = pipeline
            .compare_against_references(&cli.input_a, &config.prompt, sampling, &references)
            .await
            .map_err(report)?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&ranking)?);
        } else {
            println!("answer: {}", ranking.answer.text());
            for entry in &ranking.entries {
                match &entry.similarity {
                    Ok(score) => println!("{score:.4}  {}", entry.reference.label),
                    Err(err) => println!("  n/a   {} ({err})", entry.reference.label),
                }
            }
        }
        return Ok(());
    }

    let input_b = cli.input_b.as_deref().unwrap_or_default();
    let result = if cli.embed_only {
        pipeline.compare_texts(&cli.input_a, input_b).await
    } else {
        pipeline
            .compare(&cli.input_a, input_b, &config.prompt, sampling)
            .await
    }
    .map_err(report)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{result}");
        for side in result.soft_failures() {
            eprintln!("warning: answer {side} is empty after cleaning");
        }
    }
    Ok(())
}

fn build_pipeline(config: &CompareConfig) -> anyhow::Result<ComparisonPipeline> {
    let generator = LlamaServerGenerator::new(&config.generator)
        .context("building llama.cpp server client")?;

    let tokenizer: Arc<dyn Tokenizer> = match &config.tokenizer.path {
        Some(path) => Arc::new(
            HfTokenizer::from_file(path)?.with_special_tokens(config.tokenizer.add_special_tokens),
        ),
        None => Arc::new(ByteTokenizer),
    };

    let embedder: Arc<dyn Embedder> = match config.embedder.mode {
        EmbedderMode::Stub => Arc::new(StubEmbedder::new(config.embedder.stub_dim)),
        EmbedderMode::Http => Arc::new(HttpEmbedder::new(config.embedder.http.clone())?),
    };

    Ok(ComparisonPipeline::new(
        Arc::new(generator),
        tokenizer,
        embedder,
        config.pipeline.clone(),
    ))
}

/// Name the failure kind and side before handing the error to anyhow.
fn report(err: gencompare::PipelineError) -> anyhow::Error {
    match err.side() {
        Some(side) => tracing::error!(side = %side, kind = err.kind(), "comparison_failed"),
        None => tracing::error!(kind = err.kind(), "comparison_failed"),
    }
    anyhow::Error::new(err)
}
