//! Ranking and persistence properties of the vector index.

use std::collections::HashMap;
use std::fs;

use docchat_rag::document::{Chunk, IndexEntry};
use docchat_rag::index::{IndexProfile, SimilarityMetric, VectorIndex};
use docchat_rag::RagError;
use proptest::prelude::*;

const DIM: usize = 16;

fn profile(metric: SimilarityMetric) -> IndexProfile {
    IndexProfile {
        metric,
        embedding_model: "test-model".to_string(),
        dimensions: DIM,
        chunk_size: 100,
        chunk_overlap: 20,
    }
}

fn entry(i: usize, embedding: Vec<f32>) -> IndexEntry {
    IndexEntry::new(
        Chunk {
            id: format!("doc_{i}"),
            text: format!("chunk {i}"),
            metadata: HashMap::new(),
            document_id: "doc".to_string(),
            start: i,
            end: i + 1,
        },
        embedding,
    )
}

fn unit(axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[axis] = 1.0;
    v
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn arb_metric() -> impl Strategy<Value = SimilarityMetric> {
    prop_oneof![Just(SimilarityMetric::Cosine), Just(SimilarityMetric::L2)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn results_ordered_descending_and_bounded_by_k(
        embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 0..20),
        query in arb_normalized_embedding(DIM),
        metric in arb_metric(),
        k in 0usize..25,
    ) {
        let count = embeddings.len();
        let entries = embeddings.into_iter().enumerate().map(|(i, e)| entry(i, e)).collect();
        let index = VectorIndex::with_entries(profile(metric), entries).unwrap();

        let results = index.query(&query, k).unwrap();

        prop_assert_eq!(results.len(), k.min(count));
        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    #[test]
    fn persist_then_restore_preserves_rankings(
        embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        metric in arb_metric(),
    ) {
        let entries = embeddings.into_iter().enumerate().map(|(i, e)| entry(i, e)).collect();
        let index = VectorIndex::with_entries(profile(metric), entries).unwrap();
        let temp = tempfile::tempdir().unwrap();

        index.persist(temp.path()).unwrap();
        let restored = VectorIndex::restore(temp.path(), &profile(metric)).unwrap().unwrap();

        let before = index.query(&query, index.len()).unwrap();
        let after = restored.query(&query, restored.len()).unwrap();
        let before_ids: Vec<&str> = before.iter().map(|n| n.entry.id.as_str()).collect();
        let after_ids: Vec<&str> = after.iter().map(|n| n.entry.id.as_str()).collect();
        prop_assert_eq!(before_ids, after_ids);
        for (b, a) in before.iter().zip(after.iter()) {
            prop_assert!((b.score - a.score).abs() < 1e-6);
        }
    }
}

#[test]
fn equal_scores_keep_insertion_order() {
    let entries = (0..5).map(|i| entry(i, unit(0))).collect();
    let index = VectorIndex::with_entries(profile(SimilarityMetric::Cosine), entries).unwrap();

    let ids: Vec<String> =
        index.query(&unit(0), 5).unwrap().iter().map(|n| n.entry.id.clone()).collect();
    assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2", "doc_3", "doc_4"]);
}

#[test]
fn query_with_wrong_dimension_is_an_error() {
    let index = VectorIndex::new(profile(SimilarityMetric::Cosine));
    let err = index.query(&[1.0, 0.0], 3).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: DIM, found: 2 }));
}

#[test]
fn build_rejects_mixed_dimensions_and_keeps_old_entries() {
    let mut index =
        VectorIndex::with_entries(profile(SimilarityMetric::Cosine), vec![entry(0, unit(1))])
            .unwrap();
    let err = index.build(vec![entry(1, unit(2)), entry(2, vec![1.0; 3])]).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { .. }));
    assert_eq!(index.len(), 1);
    assert_eq!(index.entries()[0].id, "doc_0");
}

#[test]
fn restore_from_missing_directory_is_absent() {
    let temp = tempfile::tempdir().unwrap();
    let restored =
        VectorIndex::restore(&temp.path().join("nothing"), &profile(SimilarityMetric::Cosine))
            .unwrap();
    assert!(restored.is_none());
}

#[test]
fn empty_index_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    VectorIndex::new(profile(SimilarityMetric::Cosine)).persist(temp.path()).unwrap();
    let restored =
        VectorIndex::restore(temp.path(), &profile(SimilarityMetric::Cosine)).unwrap().unwrap();
    assert!(restored.is_empty());
}

#[test]
fn restore_rejects_malformed_manifest() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("manifest.json"), "{ not json").unwrap();
    let err = VectorIndex::restore(temp.path(), &profile(SimilarityMetric::Cosine)).unwrap_err();
    assert!(matches!(err, RagError::CorruptIndex { .. }));
}

#[test]
fn restore_rejects_tampered_entries() {
    let temp = tempfile::tempdir().unwrap();
    VectorIndex::with_entries(profile(SimilarityMetric::Cosine), vec![entry(0, unit(0))])
        .unwrap()
        .persist(temp.path())
        .unwrap();
    fs::write(temp.path().join("index.json"), "[]").unwrap();

    let err = VectorIndex::restore(temp.path(), &profile(SimilarityMetric::Cosine)).unwrap_err();
    assert!(matches!(err, RagError::CorruptIndex { .. }));
}

#[test]
fn restore_rejects_missing_entries_file() {
    let temp = tempfile::tempdir().unwrap();
    VectorIndex::new(profile(SimilarityMetric::Cosine)).persist(temp.path()).unwrap();
    fs::remove_file(temp.path().join("index.json")).unwrap();

    let err = VectorIndex::restore(temp.path(), &profile(SimilarityMetric::Cosine)).unwrap_err();
    assert!(matches!(err, RagError::CorruptIndex { .. }));
}

#[test]
fn restore_rejects_profile_changes() {
    let temp = tempfile::tempdir().unwrap();
    VectorIndex::new(profile(SimilarityMetric::Cosine)).persist(temp.path()).unwrap();

    let err = VectorIndex::restore(temp.path(), &profile(SimilarityMetric::L2)).unwrap_err();
    assert!(matches!(err, RagError::IncompatibleIndex { field: "metric", .. }));

    let other_model =
        IndexProfile { embedding_model: "other".into(), ..profile(SimilarityMetric::Cosine) };
    let err = VectorIndex::restore(temp.path(), &other_model).unwrap_err();
    assert!(matches!(err, RagError::IncompatibleIndex { field: "embedding_model", .. }));

    let other_dims = IndexProfile { dimensions: DIM * 2, ..profile(SimilarityMetric::Cosine) };
    let err = VectorIndex::restore(temp.path(), &other_dims).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { .. }));

    let other_chunking = IndexProfile { chunk_size: 512, ..profile(SimilarityMetric::Cosine) };
    let err = VectorIndex::restore(temp.path(), &other_chunking).unwrap_err();
    assert!(err.is_index_fault());
}

#[test]
fn remove_persisted_is_a_noop_when_absent() {
    let temp = tempfile::tempdir().unwrap();
    VectorIndex::remove_persisted(&temp.path().join("missing")).unwrap();
}

#[test]
fn remove_persisted_only_deletes_index_files() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("shared");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("notes.txt"), "keep me").unwrap();
    VectorIndex::new(profile(SimilarityMetric::Cosine)).persist(&dir).unwrap();

    VectorIndex::remove_persisted(&dir).unwrap();

    assert!(dir.join("notes.txt").exists());
    assert!(!dir.join("manifest.json").exists());
    assert!(!dir.join("index.json").exists());
    assert!(VectorIndex::restore(&dir, &profile(SimilarityMetric::Cosine)).unwrap().is_none());
}
