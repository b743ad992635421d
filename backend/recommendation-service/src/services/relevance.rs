// ============================================
// Relevance Scorer (related content)
// ============================================
//
// score = (techniques * 20 + keywords * 15 + tags * 10 + same difficulty 10)
//         * (1 + type affinity)
//         + quality * 0.2 + popularity * 0.1
//
// Same-type candidates get affinity 0.7, cross-type 0.3.

use super::ranking::{intersection_count, rank_and_truncate};
use super::weights::RelevanceWeights;
use crate::models::{ContentMetadata, ScoredCandidate};
use tracing::{debug, info};

pub struct RelevanceScorer {
    weights: RelevanceWeights,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(RelevanceWeights::default())
    }
}

impl RelevanceScorer {
    pub fn new(weights: RelevanceWeights) -> Self {
        Self { weights }
    }

    /// Rank `pool` by similarity to `source`, never returning the source itself
    pub fn score_related(
        &self,
        source: &ContentMetadata,
        pool: Vec<ContentMetadata>,
        limit: usize,
    ) -> Vec<ScoredCandidate> {
        let source_key = source.key();
        let input_count = pool.len();

        let scored: Vec<ScoredCandidate> = pool
            .into_iter()
            .filter(|candidate| candidate.key() != source_key)
            .map(|candidate| {
                let score = self.score(source, &candidate);
                ScoredCandidate::new(candidate, score)
            })
            .collect();

        let ranked = rank_and_truncate(scored, limit);

        info!(
            source_id = %source.content_id,
            source_type = %source.content_type,
            input_count = input_count,
            output_count = ranked.len(),
            "Related content scored"
        );

        ranked
    }

    /// Similarity of one candidate to the source
    pub fn score(&self, source: &ContentMetadata, candidate: &ContentMetadata) -> f64 {
        let w = &self.weights;

        let shared_techniques = intersection_count(&source.techniques, &candidate.techniques);
        let shared_keywords = intersection_count(&source.keywords, &candidate.keywords);
        let shared_tags = intersection_count(&source.tags, &candidate.tags);

        let mut score = shared_techniques as f64 * w.shared_technique
            + shared_keywords as f64 * w.shared_keyword
            + shared_tags as f64 * w.shared_tag;

        let difficulty_matches = candidate.difficulty == source.difficulty
            && (source.difficulty.is_some() || w.match_unset_difficulty);
        if difficulty_matches {
            score += w.same_difficulty;
        }

        let affinity = if candidate.content_type == source.content_type {
            w.same_type_affinity
        } else {
            w.cross_type_affinity
        };
        score *= 1.0 + affinity;

        score += candidate.quality_score * w.quality;
        score += candidate.popularity_score * w.popularity;

        debug!(
            content_id = %candidate.content_id,
            shared_techniques = shared_techniques,
            shared_keywords = shared_keywords,
            shared_tags = shared_tags,
            score = score,
            "Similarity score computed"
        );

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, Difficulty, Language};
    use chrono::Utc;
    use uuid::Uuid;

    const EPS: f64 = 1e-9;

    fn create_metadata(content_type: ContentType, techniques: &[&str]) -> ContentMetadata {
        ContentMetadata {
            content_id: Uuid::new_v4(),
            content_type,
            difficulty: None,
            language: Language::Fa,
            techniques: techniques.iter().map(|t| t.to_string()).collect(),
            keywords: Vec::new(),
            tags: Vec::new(),
            quality_score: 0.0,
            popularity_score: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_score_formula() {
        let scorer = RelevanceScorer::default();
        let mut source = create_metadata(ContentType::Article, &["a", "b"]);
        source.keywords = vec!["k".to_string()];
        source.tags = vec!["t1".to_string(), "t2".to_string()];
        source.difficulty = Some(Difficulty::Intermediate);

        let mut candidate = create_metadata(ContentType::Article, &["a"]);
        candidate.keywords = vec!["k".to_string()];
        candidate.tags = vec!["t2".to_string()];
        candidate.difficulty = Some(Difficulty::Intermediate);
        candidate.quality_score = 50.0;
        candidate.popularity_score = 100.0;

        // (20 + 15 + 10 + 10) * 1.7 + 10 + 10
        let expected = 55.0 * 1.7 + 50.0 * 0.2 + 100.0 * 0.1;
        assert!((scorer.score(&source, &candidate) - expected).abs() < EPS);
    }

    #[test]
    fn test_type_affinity_multipliers() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Course, &["a"]);
        let same_type = create_metadata(ContentType::Course, &["a"]);
        let cross_type = create_metadata(ContentType::Artwork, &["a"]);

        // both unset, so difficulty matches
        assert!((scorer.score(&source, &same_type) - 30.0 * 1.7).abs() < EPS);
        assert!((scorer.score(&source, &cross_type) - 30.0 * 1.3).abs() < EPS);
    }

    #[test]
    fn test_affinity_not_applied_to_quality_and_popularity() {
        let scorer = RelevanceScorer::default();
        let mut source = create_metadata(ContentType::Course, &[]);
        source.difficulty = Some(Difficulty::Beginner);
        let mut candidate = create_metadata(ContentType::Course, &[]);
        candidate.difficulty = Some(Difficulty::Advanced);
        candidate.quality_score = 10.0;
        candidate.popularity_score = 10.0;

        assert!((scorer.score(&source, &candidate) - 3.0).abs() < EPS);
    }

    #[test]
    fn test_unset_difficulty_on_both_sides_matches() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Article, &[]);
        let candidate = create_metadata(ContentType::Article, &[]);

        assert!((scorer.score(&source, &candidate) - 10.0 * 1.7).abs() < EPS);
    }

    #[test]
    fn test_unset_difficulty_match_can_be_disabled() {
        let scorer = RelevanceScorer::new(RelevanceWeights {
            match_unset_difficulty: false,
            ..RelevanceWeights::default()
        });
        let source = create_metadata(ContentType::Article, &[]);
        let candidate = create_metadata(ContentType::Article, &[]);
        assert_eq!(scorer.score(&source, &candidate), 0.0);

        let mut graded_source = source.clone();
        graded_source.difficulty = Some(Difficulty::Beginner);
        let mut graded = candidate.clone();
        graded.difficulty = Some(Difficulty::Beginner);
        assert!((scorer.score(&graded_source, &graded) - 10.0 * 1.7).abs() < EPS);
    }

    #[test]
    fn test_set_and_unset_difficulty_do_not_match() {
        let scorer = RelevanceScorer::default();
        let mut source = create_metadata(ContentType::Article, &[]);
        source.difficulty = Some(Difficulty::Advanced);
        let candidate = create_metadata(ContentType::Article, &[]);

        assert_eq!(scorer.score(&source, &candidate), 0.0);
    }

    #[test]
    fn test_non_finite_quality_does_not_break_ranking() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Article, &["A"]);
        let pool: Vec<ContentMetadata> = (0..40)
            .map(|i| {
                let mut item = create_metadata(ContentType::Article, &["A"]);
                item.quality_score = if i == 17 { f64::NAN } else { i as f64 };
                item
            })
            .collect();

        let ranked = scorer.score_related(&source, pool, 10);

        assert_eq!(ranked.len(), 10);
        let finite: Vec<f64> = ranked
            .iter()
            .map(|c| c.score)
            .filter(|s| s.is_finite())
            .collect();
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_same_type_full_overlap_beats_cross_type_partial() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Article, &["A", "B"]);
        let candidate1 = create_metadata(ContentType::Article, &["A", "B"]);
        let candidate2 = create_metadata(ContentType::Course, &["A"]);
        let id1 = candidate1.content_id;

        let ranked = scorer.score_related(&source, vec![candidate2, candidate1], 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].metadata.content_id, id1);
    }

    #[test]
    fn test_source_never_returned() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Article, &["A"]);
        let other = create_metadata(ContentType::Article, &["A"]);

        let ranked = scorer.score_related(&source, vec![source.clone(), other], 10);

        assert_eq!(ranked.len(), 1);
        assert!(ranked.iter().all(|c| c.metadata.key() != source.key()));
    }

    #[test]
    fn test_limit_and_ordering() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Article, &["A", "B", "C"]);
        let pool = vec![
            create_metadata(ContentType::Article, &["A"]),
            create_metadata(ContentType::Article, &["A", "B", "C"]),
            create_metadata(ContentType::Course, &["A", "B"]),
            create_metadata(ContentType::Artwork, &[]),
        ];

        let ranked = scorer.score_related(&source, pool, 3);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_empty_pool() {
        let scorer = RelevanceScorer::default();
        let source = create_metadata(ContentType::Article, &["A"]);

        assert!(scorer.score_related(&source, Vec::new(), 5).is_empty());
    }
}
