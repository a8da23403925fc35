//! Reciprocal Rank Fusion (RRF) for combining two ranked lists.

use std::cmp::Ordering;
use std::collections::HashMap;

use retrieval_core::{FusedResult, RankedResult};

/// Per-query fusion parameters.
///
/// `k` is the standard RRF constant (60) balancing high vs. low ranks;
/// the weights scale each source's `weight / (k + rank)` contribution.
#[derive(Debug, Clone)]
pub struct FusionParams {
    pub k: f32,
    pub vector_weight: f32,
    pub lexical_weight: f32,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            k: 60.0,
            vector_weight: 1.0,
            lexical_weight: 1.0,
        }
    }
}

/// Deduplication key: blake3 hash of the whitespace-trimmed text.
///
/// Exact trimmed-text equality is the dedup contract; near-duplicates
/// differing in punctuation or interior whitespace stay distinct.
pub fn dedup_key(text: &str) -> blake3::Hash {
    blake3::hash(text.trim().as_bytes())
}

/// Collapse duplicates within one list, keeping the best (lowest) rank
/// seen for each trimmed text.
fn dedup_best_rank(list: &[RankedResult]) -> HashMap<blake3::Hash, (String, usize)> {
    let mut best: HashMap<blake3::Hash, (String, usize)> = HashMap::new();
    for result in list {
        let trimmed = result.text.trim();
        let entry = best
            .entry(dedup_key(trimmed))
            .or_insert_with(|| (trimmed.to_string(), result.rank));
        if result.rank < entry.1 {
            entry.1 = result.rank;
        }
    }
    best
}

/// Absent-from-source sentinel 0 sorts last, not first.
fn effective_rank(rank: usize) -> usize {
    if rank == 0 {
        usize::MAX
    } else {
        rank
    }
}

/// Fuse a vector ranking and a lexical ranking into one list.
///
/// For each distinct trimmed text,
/// `rrf_score = Σ weight_source / (k + rank_source)`, summing only over
/// the sources where the text appears; absence contributes exactly 0,
/// not a worst-case rank. The fused list is sorted descending by score;
/// ties break by smaller vector rank, then smaller lexical rank, then
/// corpus insertion order (`corpus_order`, keyed by `dedup_key`), then
/// text, so the output order is total and deterministic. Truncated to
/// `top_k` with `final_rank` assigned 1..=K.
pub fn reciprocal_rank_fusion(
    vector: &[RankedResult],
    lexical: &[RankedResult],
    params: &FusionParams,
    corpus_order: &HashMap<blake3::Hash, usize>,
    top_k: usize,
) -> Vec<FusedResult> {
    let vector_best = dedup_best_rank(vector);
    let lexical_best = dedup_best_rank(lexical);

    struct Candidate {
        key: blake3::Hash,
        text: String,
        rrf_score: f32,
        vector_rank: usize,
        lexical_rank: usize,
    }

    let mut candidates: HashMap<blake3::Hash, Candidate> = HashMap::new();

    for (key, (text, rank)) in &vector_best {
        candidates.insert(
            *key,
            Candidate {
                key: *key,
                text: text.clone(),
                rrf_score: params.vector_weight / (params.k + *rank as f32),
                vector_rank: *rank,
                lexical_rank: 0,
            },
        );
    }

    for (key, (text, rank)) in &lexical_best {
        let contribution = params.lexical_weight / (params.k + *rank as f32);
        match candidates.get_mut(key) {
            Some(candidate) => {
                candidate.rrf_score += contribution;
                candidate.lexical_rank = *rank;
            }
            None => {
                candidates.insert(
                    *key,
                    Candidate {
                        key: *key,
                        text: text.clone(),
                        rrf_score: contribution,
                        vector_rank: 0,
                        lexical_rank: *rank,
                    },
                );
            }
        }
    }

    let mut fused: Vec<Candidate> = candidates.into_values().collect();
    fused.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| effective_rank(a.vector_rank).cmp(&effective_rank(b.vector_rank)))
            .then_with(|| effective_rank(a.lexical_rank).cmp(&effective_rank(b.lexical_rank)))
            .then_with(|| {
                let pos_a = corpus_order.get(&a.key).copied().unwrap_or(usize::MAX);
                let pos_b = corpus_order.get(&b.key).copied().unwrap_or(usize::MAX);
                pos_a.cmp(&pos_b)
            })
            .then_with(|| a.text.cmp(&b.text))
    });
    fused.truncate(top_k);

    fused
        .into_iter()
        .enumerate()
        .map(|(i, c)| FusedResult {
            text: c.text,
            rrf_score: c.rrf_score,
            vector_rank: c.vector_rank,
            lexical_rank: c.lexical_rank,
            final_rank: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(items: &[&str]) -> Vec<RankedResult> {
        items
            .iter()
            .enumerate()
            .map(|(i, text)| RankedResult {
                text: text.to_string(),
                score: 1.0 / (i + 1) as f32,
                rank: i + 1,
            })
            .collect()
    }

    fn no_order() -> HashMap<blake3::Hash, usize> {
        HashMap::new()
    }

    #[test]
    fn test_rank_one_in_both_lists() {
        let vector = ranked(&["shared", "v-only"]);
        let lexical = ranked(&["shared", "l-only"]);
        let params = FusionParams::default();

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 10);

        assert_eq!(fused[0].text, "shared");
        assert_eq!(fused[0].vector_rank, 1);
        assert_eq!(fused[0].lexical_rank, 1);
        let expected = 1.0 / 61.0 + 1.0 / 61.0;
        assert!((fused[0].rrf_score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_absence_contributes_zero_not_penalty() {
        let vector = ranked(&["a", "b", "vector-only"]);
        let lexical = ranked(&["a"]);
        let params = FusionParams::default();

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 10);

        let only = fused.iter().find(|f| f.text == "vector-only").unwrap();
        assert_eq!(only.lexical_rank, 0);
        assert!((only.rrf_score - 1.0 / 63.0).abs() < 1e-6);
    }

    #[test]
    fn test_weights_scale_contributions() {
        let vector = ranked(&["v"]);
        let lexical = ranked(&["l"]);
        let params = FusionParams {
            k: 60.0,
            vector_weight: 2.0,
            lexical_weight: 0.5,
        };

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 10);

        let v = fused.iter().find(|f| f.text == "v").unwrap();
        let l = fused.iter().find(|f| f.text == "l").unwrap();
        assert!((v.rrf_score - 2.0 / 61.0).abs() < 1e-6);
        assert!((l.rrf_score - 0.5 / 61.0).abs() < 1e-6);
        assert_eq!(fused[0].text, "v");
    }

    #[test]
    fn test_dedup_within_one_list_keeps_best_rank() {
        // The corpus can hold duplicate chunks, so one engine's list can
        // carry the same trimmed text twice.
        let vector = vec![
            RankedResult {
                text: "duplicate chunk".to_string(),
                score: 0.9,
                rank: 1,
            },
            RankedResult {
                text: "  duplicate chunk  ".to_string(),
                score: 0.5,
                rank: 2,
            },
        ];
        let lexical = ranked(&["duplicate chunk"]);
        let params = FusionParams::default();

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 10);

        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].text, "duplicate chunk");
        assert_eq!(fused[0].vector_rank, 1);
        assert_eq!(fused[0].lexical_rank, 1);
    }

    #[test]
    fn test_tie_breaks_prefer_vector_rank_then_lexical() {
        // Same rrf score, different sources: present-in-vector sorts first.
        let vector = ranked(&["from-vector"]);
        let lexical = ranked(&["from-lexical"]);
        let params = FusionParams::default();

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 10);

        assert_eq!(fused[0].text, "from-vector");
        assert_eq!(fused[1].text, "from-lexical");
    }

    #[test]
    fn test_tie_breaks_fall_back_to_corpus_order() {
        // Two lexical-only results at equal ranks across dedup cannot
        // happen within one list, so force the tie with equal weights on
        // disjoint single-entry lists and corpus positions reversed
        // relative to text order.
        let vector = ranked(&["zebra chunk"]);
        let lexical = ranked(&["apple chunk"]);
        let params = FusionParams::default();

        let mut corpus_order = HashMap::new();
        corpus_order.insert(dedup_key("apple chunk"), 0);
        corpus_order.insert(dedup_key("zebra chunk"), 1);

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &corpus_order, 10);

        // Vector-presence still wins before corpus order is consulted.
        assert_eq!(fused[0].text, "zebra chunk");
    }

    #[test]
    fn test_truncation_and_final_ranks() {
        let vector = ranked(&["a", "b", "c", "d"]);
        let lexical = ranked(&["c", "d", "e"]);
        let params = FusionParams::default();

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 3);

        assert_eq!(fused.len(), 3);
        let ranks: Vec<usize> = fused.iter().map(|f| f.final_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        for pair in fused.windows(2) {
            assert!(pair[0].rrf_score >= pair[1].rrf_score);
        }
    }

    #[test]
    fn test_both_lists_empty_fuses_to_nothing() {
        let fused =
            reciprocal_rank_fusion(&[], &[], &FusionParams::default(), &no_order(), 5);
        assert!(fused.is_empty());
    }

    #[test]
    fn test_symmetric_ranks_yield_equal_scores() {
        let vector = ranked(&["a", "b"]);
        let lexical = ranked(&["b", "a"]);
        let params = FusionParams::default();

        let fused = reciprocal_rank_fusion(&vector, &lexical, &params, &no_order(), 10);

        assert!((fused[0].rrf_score - fused[1].rrf_score).abs() < 1e-6);
    }
}
