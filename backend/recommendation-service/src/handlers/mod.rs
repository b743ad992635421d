pub mod recommendation;

// Re-export handlers for convenience
pub use recommendation::{
    configure, get_personalized, get_related, PersonalizedQuery, RecommendationHandlerState,
    RelatedQuery, USER_ID_HEADER,
};
