// src/analytics.rs

use std::collections::HashMap;

use serde::Serialize;
use sqlx::prelude::FromRow;

/// Maximum number of users on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Label shown for attempts whose quiz has since been deleted.
const DELETED_QUIZ_LABEL: &str = "Deleted quiz";

/// Label shown when the user's profile can no longer be resolved.
const UNKNOWN_USER_LABEL: &str = "Unknown user";

/// One historical attempt, denormalized with its quiz title and username.
/// The title/name are `None` when the joined row no longer exists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttemptRecord {
    pub quiz_id: i64,
    pub user_id: i64,
    pub quiz_title: Option<String>,
    pub username: Option<String>,
    pub score: i64,
    pub total_points: i64,
}

/// Aggregate performance of one quiz across all its attempts.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct QuizPerformance {
    pub quiz_id: i64,
    pub title: String,
    pub attempts: i64,
    pub average_score: i64,
}

/// Aggregate performance of one user across all their attempts.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserStanding {
    pub user_id: i64,
    pub username: String,
    pub attempts: i64,
    pub average_score: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResult {
    /// Raw number of attempts scanned, independent of grouping.
    pub total_attempts: usize,
    /// One entry per quiz with at least one attempt, in the order quizzes
    /// were first encountered while scanning.
    pub quiz_performance: Vec<QuizPerformance>,
    /// Top users by average score, descending, at most [`LEADERBOARD_SIZE`].
    pub leaderboard: Vec<UserStanding>,
}

/// Running sums for one group (a quiz or a user).
struct Group {
    label: String,
    attempts: i64,
    score_sum: i64,
    points_sum: i64,
}

impl Group {
    fn new(label: String) -> Self {
        Group {
            label,
            attempts: 0,
            score_sum: 0,
            points_sum: 0,
        }
    }

    fn add(&mut self, score: i64, total_points: i64) {
        self.attempts += 1;
        self.score_sum += score;
        self.points_sum += total_points;
    }

    /// Percentage from summed scores over summed points, rounded to the
    /// nearest integer. Summing before dividing weights attempts by their
    /// point volume instead of averaging per-attempt percentages. A group
    /// whose points sum to zero reports 0 rather than dividing by zero.
    fn average_score(&self) -> i64 {
        if self.points_sum == 0 {
            return 0;
        }
        (100.0 * self.score_sum as f64 / self.points_sum as f64).round() as i64
    }
}

/// Accumulates groups in first-encounter order.
struct GroupedSums {
    index: HashMap<i64, usize>,
    groups: Vec<(i64, Group)>,
}

impl GroupedSums {
    fn new() -> Self {
        GroupedSums {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn add(&mut self, key: i64, label: &Option<String>, fallback: &str, score: i64, points: i64) {
        let idx = *self.index.entry(key).or_insert_with(|| {
            let label = label.clone().unwrap_or_else(|| fallback.to_string());
            self.groups.push((key, Group::new(label)));
            self.groups.len() - 1
        });
        self.groups[idx].1.add(score, points);
    }
}

/// Summarizes a full attempt history into per-quiz performance and a top-N
/// user leaderboard.
///
/// Pure function: retrieval and denormalization of the history (joining quiz
/// titles and usernames onto attempts) is the caller's job.
pub fn summarize(attempts: &[AttemptRecord]) -> AnalyticsResult {
    let mut by_quiz = GroupedSums::new();
    let mut by_user = GroupedSums::new();

    for attempt in attempts {
        by_quiz.add(
            attempt.quiz_id,
            &attempt.quiz_title,
            DELETED_QUIZ_LABEL,
            attempt.score,
            attempt.total_points,
        );
        by_user.add(
            attempt.user_id,
            &attempt.username,
            UNKNOWN_USER_LABEL,
            attempt.score,
            attempt.total_points,
        );
    }

    let quiz_performance = by_quiz
        .groups
        .into_iter()
        .map(|(quiz_id, group)| QuizPerformance {
            quiz_id,
            average_score: group.average_score(),
            title: group.label,
            attempts: group.attempts,
        })
        .collect();

    let mut leaderboard: Vec<UserStanding> = by_user
        .groups
        .into_iter()
        .map(|(user_id, group)| UserStanding {
            user_id,
            average_score: group.average_score(),
            username: group.label,
            attempts: group.attempts,
        })
        .collect();

    // sort_by is stable, so ties keep first-encounter order.
    leaderboard.sort_by(|a, b| b.average_score.cmp(&a.average_score));
    leaderboard.truncate(LEADERBOARD_SIZE);

    AnalyticsResult {
        total_attempts: attempts.len(),
        quiz_performance,
        leaderboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(quiz_id: i64, user_id: i64, score: i64, total_points: i64) -> AttemptRecord {
        AttemptRecord {
            quiz_id,
            user_id,
            quiz_title: Some(format!("Quiz {}", quiz_id)),
            username: Some(format!("user{}", user_id)),
            score,
            total_points,
        }
    }

    #[test]
    fn empty_history_yields_empty_result() {
        let result = summarize(&[]);
        assert_eq!(result.total_attempts, 0);
        assert!(result.quiz_performance.is_empty());
        assert!(result.leaderboard.is_empty());
    }

    #[test]
    fn zero_total_points_guards_division() {
        let attempts = vec![attempt(1, 1, 0, 0), attempt(1, 2, 0, 0)];
        let result = summarize(&attempts);
        assert_eq!(result.quiz_performance.len(), 1);
        assert_eq!(result.quiz_performance[0].average_score, 0);
        assert_eq!(result.leaderboard[0].average_score, 0);
    }

    #[test]
    fn average_weights_by_point_volume() {
        // Summed: 10 of 100 points -> 10%, not the per-attempt mean of 50%.
        let attempts = vec![attempt(7, 1, 10, 10), attempt(7, 2, 0, 90)];
        let result = summarize(&attempts);
        assert_eq!(result.quiz_performance[0].average_score, 10);
    }

    #[test]
    fn average_is_rounded() {
        // 2/3 of the points -> 66.67% -> 67.
        let attempts = vec![attempt(1, 1, 2, 3)];
        let result = summarize(&attempts);
        assert_eq!(result.quiz_performance[0].average_score, 67);
    }

    #[test]
    fn quiz_groups_keep_first_encounter_order() {
        let attempts = vec![
            attempt(30, 1, 1, 2),
            attempt(10, 1, 1, 2),
            attempt(30, 2, 2, 2),
            attempt(20, 2, 0, 2),
        ];
        let result = summarize(&attempts);
        let order: Vec<i64> = result.quiz_performance.iter().map(|p| p.quiz_id).collect();
        assert_eq!(order, vec![30, 10, 20]);
        assert_eq!(result.quiz_performance[0].attempts, 2);
    }

    #[test]
    fn leaderboard_truncates_to_top_ten_descending() {
        // 15 users with strictly decreasing scores: user i gets i correct
        // out of 20, so user 15 leads.
        let attempts: Vec<AttemptRecord> =
            (1..=15).map(|i| attempt(1, i, i, 20)).collect();
        let result = summarize(&attempts);

        assert_eq!(result.leaderboard.len(), LEADERBOARD_SIZE);
        assert_eq!(result.leaderboard[0].user_id, 15);
        for pair in result.leaderboard.windows(2) {
            assert!(pair[0].average_score >= pair[1].average_score);
        }
        // Users 1..=5 fell off the board.
        assert!(result.leaderboard.iter().all(|s| s.user_id > 5));
    }

    #[test]
    fn total_attempts_counts_everything() {
        let attempts = vec![
            attempt(1, 1, 1, 1),
            attempt(1, 1, 0, 1),
            attempt(2, 2, 1, 1),
        ];
        let result = summarize(&attempts);
        assert_eq!(result.total_attempts, attempts.len());
    }

    #[test]
    fn deleted_quiz_and_unknown_user_get_placeholder_labels() {
        let attempts = vec![AttemptRecord {
            quiz_id: 1,
            user_id: 1,
            quiz_title: None,
            username: None,
            score: 1,
            total_points: 2,
        }];
        let result = summarize(&attempts);
        assert_eq!(result.quiz_performance[0].title, "Deleted quiz");
        assert_eq!(result.leaderboard[0].username, "Unknown user");
    }

    #[test]
    fn ties_keep_encounter_order() {
        let attempts = vec![attempt(1, 4, 5, 10), attempt(1, 9, 5, 10)];
        let result = summarize(&attempts);
        assert_eq!(result.leaderboard[0].user_id, 4);
        assert_eq!(result.leaderboard[1].user_id, 9);
    }
}
