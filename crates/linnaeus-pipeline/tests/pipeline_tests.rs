//! End-to-end pipeline tests over the deterministic mock embedding model

use linnaeus_domain::comparison_key;
use linnaeus_embedding::MockEmbeddingModel;
use linnaeus_pipeline::{ConceptPipeline, PipelineConfig, RunOutcome, RunReport};
use linnaeus_preprocess::Document;
use std::sync::Arc;

const PAPER_TEXT: &str = "Convolutional neural networks are a type of deep neural network. \
    Deep neural networks are trained on large corpora. \
    Convolutional neural networks excel at image recognition.";

fn papers() -> Vec<Document> {
    vec![
        Document::new("paper-1", PAPER_TEXT),
        Document::new("paper-2", PAPER_TEXT),
    ]
}

fn pipeline(model: MockEmbeddingModel) -> ConceptPipeline<MockEmbeddingModel> {
    ConceptPipeline::new(Arc::new(model), PipelineConfig::default()).unwrap()
}

async fn completed_run(documents: &[Document]) -> Box<RunReport> {
    let outcome = pipeline(MockEmbeddingModel::new(384))
        .run(documents)
        .await
        .unwrap();
    match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::NoInput { .. } => panic!("expected a completed run"),
    }
}

fn find_level<'a>(
    report: &'a RunReport,
    key: &str,
) -> Option<&'a linnaeus_domain::Concept> {
    report
        .hierarchy
        .concepts()
        .values()
        .find(|c| comparison_key(&c.canonical_label) == key)
}

#[tokio::test]
async fn test_hierarchical_relation_orients_the_tree() {
    let report = completed_run(&papers()).await;

    let child = find_level(&report, "convolutional neural network")
        .expect("child concept should be extracted");
    let parent = find_level(&report, "deep neural network")
        .expect("parent concept should be extracted");

    assert_eq!(parent.level, 0, "suggested parent should be a root");
    assert!(parent.is_root());
    assert_eq!(child.parent_id, Some(parent.id));
    assert_eq!(child.level, 1);
    assert!(parent.children_ids.contains(&child.id));
}

#[tokio::test]
async fn test_agreeing_strategies_raise_confidence() {
    let report = completed_run(&papers()).await;

    let child = find_level(&report, "convolutional neural network").unwrap();
    // Rule-based and statistical both see the phrase; the combination
    // must not fall below either contribution
    assert!(child.supporting_strategies.len() >= 2);
    assert!(child.confidence >= 0.9);
    assert!(child.confidence <= 1.0);
}

#[tokio::test]
async fn test_confidence_bounds_after_filtering() {
    let report = completed_run(&papers()).await;

    for concept in report.hierarchy.concepts().values() {
        assert!(concept.confidence >= 0.5, "{}", concept.canonical_label);
        assert!(concept.confidence <= 1.0);
    }
}

#[tokio::test]
async fn test_hierarchy_is_structurally_valid() {
    let report = completed_run(&papers()).await;

    assert!(report.hierarchy.validate().is_ok());
    assert!(!report.hierarchy.roots().is_empty());

    for concept in report.hierarchy.concepts().values() {
        if let Some(parent_id) = concept.parent_id {
            let parent = report.hierarchy.get(parent_id).unwrap();
            assert!(concept.level > parent.level);
            assert!(parent.children_ids.contains(&concept.id));
        }
    }
}

#[tokio::test]
async fn test_evidence_traceable_to_input_documents() {
    let report = completed_run(&papers()).await;

    for concept in report.hierarchy.concepts().values() {
        assert!(!concept.evidence.is_empty(), "{}", concept.canonical_label);
        for link in &concept.evidence {
            assert!(
                link.unit.document_id == "paper-1" || link.unit.document_id == "paper-2",
                "evidence points at unknown document {}",
                link.unit.document_id
            );
            assert!((0.0..=1.0).contains(&link.confidence));
        }
    }
}

#[tokio::test]
async fn test_embedding_outage_still_produces_hierarchy() {
    let outcome = pipeline(MockEmbeddingModel::new(384).failing())
        .run(&papers())
        .await
        .unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::NoInput { .. } => panic!("expected a completed run"),
    };

    assert!(!report.hierarchy.roots().is_empty());
    assert!(report.hierarchy.validate().is_ok());
    // Two of three strategies contributed; operators can see the
    // degradation in the metrics
    assert!(report.metrics.strategy_coverage < 1.0);
    assert!(report.metrics.strategy_coverage >= 2.0 / 3.0 - 1e-9);
}

#[tokio::test]
async fn test_zero_documents_returns_no_input() {
    let outcome = pipeline(MockEmbeddingModel::new(384))
        .run(&[])
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        RunOutcome::NoInput {
            documents_skipped: 0
        }
    ));
}

#[tokio::test]
async fn test_short_document_skipped_and_counted() {
    let outcome = pipeline(MockEmbeddingModel::new(384))
        .run(&[Document::new("tiny", "Only ten words of content here.")])
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        RunOutcome::NoInput {
            documents_skipped: 1
        }
    ));
}

#[tokio::test]
async fn test_short_document_does_not_abort_collection() {
    let mut documents = papers();
    documents.push(Document::new("tiny", "Too short."));

    let report = completed_run(&documents).await;

    assert_eq!(report.metadata.documents_skipped, 1);
    assert_eq!(report.metadata.documents_in, 3);
    // Coverage reflects the skipped document
    assert!(report.metrics.coverage < 1.0);
}

#[tokio::test]
async fn test_quality_metrics_attached_to_metadata() {
    let report = completed_run(&papers()).await;

    let quality = &report.hierarchy.metadata.quality;
    assert!(quality.contains_key("coverage"));
    assert!(quality.contains_key("strategy_coverage"));
    assert_eq!(
        quality["strategy_coverage"],
        report.metrics.strategy_coverage
    );
}

#[tokio::test]
async fn test_hierarchy_serializes_for_consumers() {
    let report = completed_run(&papers()).await;

    let json = serde_json::to_string(&report.hierarchy).unwrap();
    let restored: linnaeus_domain::ConceptHierarchy = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.len(), report.hierarchy.len());
    assert!(restored.validate().is_ok());
}

#[tokio::test]
async fn test_reruns_agree_on_structure() {
    let first = completed_run(&papers()).await;
    let second = completed_run(&papers()).await;

    let labels = |report: &RunReport| -> Vec<String> {
        report
            .hierarchy
            .concepts()
            .values()
            .map(|c| format!("{}@{}", c.canonical_label, c.level))
            .collect()
    };

    assert_eq!(labels(&first), labels(&second));
}

#[tokio::test]
async fn test_invalid_configuration_rejected_eagerly() {
    let mut config = PipelineConfig::default();
    config.coordinator.acceptance_threshold = 3.0;

    let result = ConceptPipeline::new(Arc::new(MockEmbeddingModel::new(384)), config);
    assert!(result.is_err());
}
