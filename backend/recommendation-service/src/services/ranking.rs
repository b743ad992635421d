use crate::models::ScoredCandidate;
use std::collections::HashSet;

/// Sort by score descending and keep the top `limit`.
///
/// The sort is stable; order among equal scores is not part of the contract.
pub fn rank_and_truncate(mut scored: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Number of distinct values present in both slices
pub fn intersection_count(left: &[String], right: &[String]) -> usize {
    if left.is_empty() || right.is_empty() {
        return 0;
    }
    let left: HashSet<&str> = left.iter().map(String::as_str).collect();
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    left.intersection(&right).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentMetadata, ContentType, Language};
    use chrono::Utc;
    use uuid::Uuid;

    fn scored(score: f64) -> ScoredCandidate {
        ScoredCandidate::new(
            ContentMetadata {
                content_id: Uuid::new_v4(),
                content_type: ContentType::Article,
                difficulty: None,
                language: Language::En,
                techniques: Vec::new(),
                keywords: Vec::new(),
                tags: Vec::new(),
                quality_score: 0.0,
                popularity_score: 0.0,
                created_at: Utc::now(),
            },
            score,
        )
    }

    #[test]
    fn test_rank_and_truncate() {
        let ranked = rank_and_truncate(vec![scored(1.0), scored(5.0), scored(3.0)], 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].score, 5.0);
        assert_eq!(ranked[1].score, 3.0);
    }

    #[test]
    fn test_rank_keeps_all_ties() {
        let ranked = rank_and_truncate(vec![scored(2.0), scored(2.0), scored(2.0)], 10);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|c| c.score == 2.0));
    }

    #[test]
    fn test_rank_tolerates_nan_scores() {
        let mut pool: Vec<ScoredCandidate> = (0..40).map(|i| scored(i as f64)).collect();
        pool[13].score = f64::NAN;

        let ranked = rank_and_truncate(pool, 5);

        assert_eq!(ranked.len(), 5);
        let finite: Vec<f64> = ranked.iter().map(|c| c.score).filter(|s| !s.is_nan()).collect();
        assert_eq!(finite, vec![39.0, 38.0, 37.0, 36.0]);
    }

    #[test]
    fn test_rank_empty_and_zero_limit() {
        assert!(rank_and_truncate(Vec::new(), 5).is_empty());
        assert!(rank_and_truncate(vec![scored(1.0)], 0).is_empty());
    }

    #[test]
    fn test_intersection_count_ignores_duplicates() {
        let left = vec!["a".to_string(), "b".to_string(), "b".to_string()];
        let right = vec!["b".to_string(), "c".to_string(), "a".to_string()];
        assert_eq!(intersection_count(&left, &right), 2);
        assert_eq!(intersection_count(&left, &[]), 0);
    }
}
