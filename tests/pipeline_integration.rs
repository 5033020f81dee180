use std::sync::Arc;

use gencompare::{
    AnomalyTag, ByteTokenizer, ComparisonPipeline, PipelineConfig, PromptTemplate, Reference,
    SamplingConfig, Script, ScriptedGenerator, Side, StubEmbedder,
};

fn pipeline_with(generator: ScriptedGenerator, embedder: Arc<StubEmbedder>) -> ComparisonPipeline {
    ComparisonPipeline::new(
        Arc::new(generator),
        Arc::new(ByteTokenizer),
        embedder,
        PipelineConfig::default(),
    )
}

#[tokio::test]
async fn identical_answers_score_one() {
    let generator = ScriptedGenerator::new(Script::complete(["unused"]))
        .on("hunter2", Script::complete(["weak ", "password"]))
        .on("letmein", Script::complete(["Result: weak password"]));
    let embedder = Arc::new(StubEmbedder::default());
    let pipeline = pipeline_with(generator, embedder.clone());

    let result = pipeline
        .compare(
            "hunter2",
            "letmein",
            &PromptTemplate::default(),
            &SamplingConfig::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.answer_a.text(), "weak password");
    assert_eq!(result.answer_b.text(), "weak password");
    assert!(result.answer_b.has_tag(AnomalyTag::PromptEchoArtifact));
    assert!((result.score().unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(result.transcript(Side::A), result.transcript(Side::B));
    assert_eq!(embedder.calls(), 2);
}

#[tokio::test]
async fn orthogonal_vectors_score_zero() {
    let generator = ScriptedGenerator::new(Script::complete(["unused"]))
        .on("alpha", Script::complete(["north"]))
        .on("beta", Script::complete(["east"]));
    let embedder = Arc::new(
        StubEmbedder::new(3)
            .with_vector("north", vec![1.0, 0.0, 0.0])
            .with_vector("east", vec![0.0, 1.0, 0.0]),
    );
    let pipeline = pipeline_with(generator, embedder);

    let result = pipeline
        .compare("alpha", "beta", &PromptTemplate::default(), &SamplingConfig::default())
        .await
        .unwrap();

    assert_eq!(result.score(), Some(0.0));
    assert!(result.soft_failures().is_empty());
}

#[tokio::test]
async fn transcript_renders_multibyte_answers_whole() {
    let generator = ScriptedGenerator::new(Script::complete(["né"]));
    let pipeline = pipeline_with(generator, Arc::new(StubEmbedder::new(8)));

    let result = pipeline
        .compare("x", "y", &PromptTemplate::default(), &SamplingConfig::default())
        .await
        .unwrap();

    assert_eq!(result.tokens_a, vec!["n", "", "é"]);
    assert_eq!(result.tokens_a.concat(), "né");
}

#[tokio::test]
async fn result_serializes_for_reporting() {
    let generator = ScriptedGenerator::new(Script::complete(["Label\nanswer"]));
    let pipeline = pipeline_with(generator, Arc::new(StubEmbedder::new(8)));

    let result = pipeline
        .compare("x", "y", &PromptTemplate::default(), &SamplingConfig::default())
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["answer_a"]["text"], "answer");
    assert_eq!(json["answer_a"]["tags"][0], "multiline_hallucination");
    assert!(json["similarity"]["Ok"].is_number());
}

#[tokio::test]
async fn references_rank_closest_first() {
    let generator = ScriptedGenerator::new(Script::complete(["north"]));
    let embedder = Arc::new(
        StubEmbedder::new(2)
            .with_vector("north", vec![1.0, 0.0])
            .with_vector("up", vec![0.9, 0.1])
            .with_vector("sideways", vec![0.0, 1.0])
    );
    let pipeline = pipeline_with(generator, embedder);
    let references = gencompare::parse_references("far: sideways\nnear: up\nblank\n");

    let ranking = pipeline
        .compare_against_references(
            "where",
            &PromptTemplate::default(),
            &SamplingConfig::default(),
            &references,
        )
        .await
        .unwrap();

    let labels: Vec<&str> = ranking
        .entries
        .iter()
        .map(|entry| entry.reference.label.as_str())
        .collect();
    assert_eq!(labels, vec!["near", "far", "blank"]);
    assert_eq!(ranking.best().map(|e| &e.reference), Some(&Reference::new("near", "up")));
    assert!(ranking.entries[2].similarity.is_err());
}
