// src/cache.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::quiz::Quiz;

/// Explicit cache of fully resolved quizzes, shared via `AppState`.
///
/// Quiz definitions are read on every fetch and every submission but change
/// rarely, so they are cached here. Admin handlers call [`invalidate`] after
/// every quiz mutation; there is no TTL.
///
/// [`invalidate`]: QuizCache::invalidate
#[derive(Clone, Default)]
pub struct QuizCache {
    inner: Arc<RwLock<HashMap<i64, Arc<Quiz>>>>,
}

impl QuizCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, quiz_id: i64) -> Option<Arc<Quiz>> {
        self.inner.read().await.get(&quiz_id).cloned()
    }

    pub async fn insert(&self, quiz: Quiz) -> Arc<Quiz> {
        let quiz = Arc::new(quiz);
        self.inner.write().await.insert(quiz.id, quiz.clone());
        quiz
    }

    pub async fn invalidate(&self, quiz_id: i64) {
        self.inner.write().await.remove(&quiz_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(id: i64) -> Quiz {
        Quiz {
            id,
            title: format!("Quiz {}", id),
            description: String::new(),
            questions: vec![],
            created_at: None,
        }
    }

    #[tokio::test]
    async fn insert_get_invalidate() {
        let cache = QuizCache::new();
        assert!(cache.get(1).await.is_none());

        cache.insert(quiz(1)).await;
        assert_eq!(cache.get(1).await.unwrap().id, 1);

        cache.invalidate(1).await;
        assert!(cache.get(1).await.is_none());
    }
}
