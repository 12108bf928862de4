//! Result fusion
//!
//! Implements Reciprocal Rank Fusion (RRF) for combining the vector and
//! lexical ranked lists into a single deterministic ordering.

use crate::types::{DocumentId, FusedResult, RankedHit, SourceList};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Reciprocal Rank Fusion parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrfConfig {
    /// Smoothing constant k (default: 60)
    pub k: usize,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: 60 }
    }
}

impl RrfConfig {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Contribution of a hit at 1-based `rank`
    pub fn contribution(&self, rank: usize) -> f64 {
        1.0 / (self.k as f64 + rank as f64)
    }
}

/// Accumulated fused scores, keyed by document id.
///
/// Each document appears at most once; its score is the sum of its per-list
/// contributions.
pub type FusedScores = HashMap<DocumentId, FusedResult>;

/// Accumulate RRF contributions from every list.
///
/// Ranks are taken from `source_rank` as produced by the backend adapter.
/// A document repeated inside one list only counts at its first (best) rank.
pub fn accumulate_scores(ranked_lists: &[Vec<RankedHit>], config: &RrfConfig) -> FusedScores {
    let capacity = ranked_lists.iter().map(Vec::len).sum();
    let mut scores: FusedScores = HashMap::with_capacity(capacity);

    for hits in ranked_lists {
        for hit in hits {
            let fused = scores
                .entry(hit.document_id.clone())
                .or_insert_with(|| FusedResult {
                    document_id: hit.document_id.clone(),
                    rrf_score: 0.0,
                    vector_rank: None,
                    lexical_rank: None,
                });

            let slot = match hit.source_list {
                SourceList::Vector => &mut fused.vector_rank,
                SourceList::Lexical => &mut fused.lexical_rank,
            };
            if slot.is_some() {
                continue;
            }
            *slot = Some(hit.source_rank);
            fused.rrf_score += config.contribution(hit.source_rank);
        }
    }

    scores
}

/// Total order used for the fused ranking.
///
/// Score descending, then presence in the vector list, then smaller minimum
/// rank, then document id ascending.
pub fn compare_fused(a: &FusedResult, b: &FusedResult) -> Ordering {
    b.rrf_score
        .total_cmp(&a.rrf_score)
        .then_with(|| b.in_vector_list().cmp(&a.in_vector_list()))
        .then_with(|| a.min_rank().cmp(&b.min_rank()))
        .then_with(|| a.document_id.cmp(&b.document_id))
}

/// Order accumulated scores and keep the best `top_k`
pub fn rank_fused(scores: FusedScores, top_k: usize) -> Vec<FusedResult> {
    let mut results: Vec<FusedResult> = scores.into_values().collect();
    results.sort_by(compare_fused);
    results.truncate(top_k);
    results
}

/// Compute the fused top-K ranking for one or two ranked lists.
///
/// RRF score = Σ 1/(k + rank_r(d)) over the lists r containing d.
/// Empty input yields an empty ranking.
pub fn reciprocal_rank_fusion(
    ranked_lists: &[Vec<RankedHit>],
    config: &RrfConfig,
    top_k: usize,
) -> Vec<FusedResult> {
    rank_fused(accumulate_scores(ranked_lists, config), top_k)
}

/// Convert raw `(id, score)` pairs in backend order to ranked hits
pub fn to_ranked_hits(results: &[(DocumentId, f32)], list: SourceList) -> Vec<RankedHit> {
    results
        .iter()
        .enumerate()
        .map(|(rank, (document_id, score))| RankedHit {
            document_id: document_id.clone(),
            source_rank: rank + 1, // 1-indexed ranks
            source_list: list,
            backend_score: *score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(ids: &[&str], list: SourceList) -> Vec<RankedHit> {
        let raw: Vec<(String, f32)> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), 10.0 - i as f32))
            .collect();
        to_ranked_hits(&raw, list)
    }

    fn ids(fused: &[FusedResult]) -> Vec<&str> {
        fused.iter().map(|f| f.document_id.as_str()).collect()
    }

    #[test]
    fn test_rrf_two_list_scenario() {
        let vector = hits(&["doc1", "doc2"], SourceList::Vector);
        let lexical = hits(&["doc2", "doc3"], SourceList::Lexical);

        let fused = reciprocal_rank_fusion(&[vector, lexical], &RrfConfig::default(), 5);

        assert_eq!(ids(&fused), vec!["doc2", "doc1", "doc3"]);
        assert!((fused[0].rrf_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-12);
        assert!((fused[1].rrf_score - 1.0 / 61.0).abs() < 1e-12);
        assert!((fused[2].rrf_score - 1.0 / 62.0).abs() < 1e-12);
        assert!((fused[0].rrf_score - 0.03252).abs() < 1e-5);
        assert_eq!(fused[0].vector_rank, Some(2));
        assert_eq!(fused[0].lexical_rank, Some(1));
    }

    #[test]
    fn test_lexical_only_passthrough() {
        let lexical = hits(&["docA", "docB"], SourceList::Lexical);
        let fused = reciprocal_rank_fusion(&[Vec::new(), lexical], &RrfConfig::default(), 5);
        assert_eq!(ids(&fused), vec!["docA", "docB"]);
        assert!((fused[0].rrf_score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_both_lists_empty() {
        let fused = reciprocal_rank_fusion(&[Vec::new(), Vec::new()], &RrfConfig::default(), 5);
        assert!(fused.is_empty());

        let fused = reciprocal_rank_fusion(&[], &RrfConfig::default(), 5);
        assert!(fused.is_empty());
    }

    #[test]
    fn test_truncates_to_top_k() {
        let vector = hits(&["a", "b", "c", "d", "e"], SourceList::Vector);
        let lexical = hits(&["f", "g", "h", "a", "b"], SourceList::Lexical);
        let fused = reciprocal_rank_fusion(&[vector, lexical], &RrfConfig::default(), 5);
        assert_eq!(fused.len(), 5);
        // a and b appear twice and must lead
        assert_eq!(&ids(&fused)[..2], &["a", "b"]);
    }

    #[test]
    fn test_tie_prefers_vector_list() {
        // x is vector rank 1, y is lexical rank 1: identical scores
        let vector = hits(&["x"], SourceList::Vector);
        let lexical = hits(&["y"], SourceList::Lexical);
        let fused = reciprocal_rank_fusion(&[lexical, vector], &RrfConfig::default(), 5);
        assert_eq!(fused[0].rrf_score, fused[1].rrf_score);
        assert_eq!(ids(&fused), vec!["x", "y"]);
    }

    #[test]
    fn test_tie_breaks_on_document_id() {
        let a = FusedResult {
            document_id: "b".to_string(),
            rrf_score: 0.5,
            vector_rank: None,
            lexical_rank: Some(1),
        };
        let mut b = a.clone();
        b.document_id = "a".to_string();
        assert_eq!(compare_fused(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_tie_breaks_on_min_rank() {
        let a = FusedResult {
            document_id: "a".to_string(),
            rrf_score: 0.5,
            vector_rank: Some(3),
            lexical_rank: None,
        };
        let b = FusedResult {
            document_id: "b".to_string(),
            rrf_score: 0.5,
            vector_rank: Some(2),
            lexical_rank: None,
        };
        assert_eq!(compare_fused(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_single_list_preserves_order_with_smaller_k() {
        let vector = hits(&["q", "w", "e", "r"], SourceList::Vector);
        let fused = reciprocal_rank_fusion(&[vector], &RrfConfig::new(1), 10);
        assert_eq!(ids(&fused), vec!["q", "w", "e", "r"]);
    }

    #[test]
    fn test_duplicate_in_one_list_counts_once() {
        let mut lexical = hits(&["a", "b"], SourceList::Lexical);
        lexical.push(RankedHit {
            document_id: "a".to_string(),
            source_rank: 3,
            source_list: SourceList::Lexical,
            backend_score: 0.1,
        });
        let scores = accumulate_scores(&[lexical], &RrfConfig::default());
        let a = &scores["a"];
        assert_eq!(a.lexical_rank, Some(1));
        assert!((a.rrf_score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_ranked_hits_is_one_based() {
        let ranked = to_ranked_hits(
            &[("x".to_string(), 3.5), ("y".to_string(), 1.0)],
            SourceList::Lexical,
        );
        assert_eq!(ranked[0].source_rank, 1);
        assert_eq!(ranked[1].source_rank, 2);
        assert_eq!(ranked[1].source_list, SourceList::Lexical);
    }
}
