// src/grading.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::quiz::Quiz;

/// One submitted answer: the test-taker picked `selected_option_id` for
/// `question_id`. At most one per question is expected, but duplicates are
/// accepted and graded independently (see note on [`grade`]).
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    pub question_id: i64,
    pub selected_option_id: i64,
}

/// An [`Answer`] augmented with its derived correctness. Immutable once
/// produced.
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_option_id: i64,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct GradedResult {
    pub score: i64,
    pub total_points: i64,
    pub answers: Vec<GradedAnswer>,
}

/// Grades a set of submitted answers against a fully resolved quiz.
///
/// Pure function: no I/O, no side effects. Persisting the resulting attempt
/// is the caller's job.
///
/// * Answers are processed in submission order and the graded output keeps
///   that order (not the quiz's question order).
/// * An answer whose `question_id` matches no question in the quiz is
///   dropped: it contributes to neither `score` nor `total_points` and does
///   not appear in the output.
/// * `total_points` counts answered questions flat at 1 apiece; the
///   question's configured `points` value is not consulted. Open product
///   question, preserved as observed.
/// * Duplicate `question_id`s are each graded and counted independently.
///   Deduplication is deliberately not done here; the client keeps only the
///   last selection per question, so duplicates should not normally arrive.
/// * An empty answer set yields score 0, total_points 0, no graded answers.
pub fn grade(quiz: &Quiz, answers: &[Answer]) -> GradedResult {
    let answer_key: HashMap<i64, i64> = quiz
        .questions
        .iter()
        .map(|q| (q.id, q.correct_option_id))
        .collect();

    let mut graded = Vec::with_capacity(answers.len());
    let mut score = 0;
    let mut total_points = 0;

    for answer in answers {
        let Some(&correct_option_id) = answer_key.get(&answer.question_id) else {
            continue;
        };

        // Option-id equality also covers the case where the selected option
        // does not exist on this question: a foreign id can never equal the
        // designated correct one.
        let is_correct = answer.selected_option_id == correct_option_id;

        total_points += 1;
        if is_correct {
            score += 1;
        }

        graded.push(GradedAnswer {
            question_id: answer.question_id,
            selected_option_id: answer.selected_option_id,
            is_correct,
        });
    }

    GradedResult {
        score,
        total_points,
        answers: graded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{Question, QuestionOption, Quiz};

    /// Builds a quiz where question i (1-based id) has options with ids
    /// 10*i+1 .. 10*i+3 and the first of those is correct.
    fn sample_quiz(question_count: i64) -> Quiz {
        let questions = (1..=question_count)
            .map(|i| Question {
                id: i,
                text: format!("Question {}", i),
                points: 1,
                options: (1..=3)
                    .map(|j| QuestionOption {
                        id: 10 * i + j,
                        text: format!("Option {}", j),
                    })
                    .collect(),
                correct_option_id: 10 * i + 1,
            })
            .collect();

        Quiz {
            id: 1,
            title: "Sample".to_string(),
            description: String::new(),
            questions,
            created_at: None,
        }
    }

    fn answer(question_id: i64, selected_option_id: i64) -> Answer {
        Answer {
            question_id,
            selected_option_id,
        }
    }

    #[test]
    fn empty_answer_set_yields_zeroes() {
        let result = grade(&sample_quiz(3), &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 0);
        assert!(result.answers.is_empty());
    }

    #[test]
    fn unknown_question_is_dropped() {
        let result = grade(&sample_quiz(2), &[answer(999, 11)]);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 0);
        assert!(result.answers.is_empty());
    }

    #[test]
    fn correct_answer_scores_one() {
        let result = grade(&sample_quiz(1), &[answer(1, 11)]);
        assert_eq!(result.score, 1);
        assert_eq!(result.total_points, 1);
        assert_eq!(result.answers.len(), 1);
        assert!(result.answers[0].is_correct);
    }

    #[test]
    fn wrong_answer_counts_toward_total_only() {
        let result = grade(&sample_quiz(1), &[answer(1, 12)]);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 1);
        assert!(!result.answers[0].is_correct);
    }

    #[test]
    fn nonexistent_option_grades_as_wrong() {
        // Question exists, option id belongs to no option of it.
        let result = grade(&sample_quiz(1), &[answer(1, 7777)]);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 1);
        assert!(!result.answers[0].is_correct);
    }

    #[test]
    fn graded_output_keeps_submission_order() {
        let quiz = sample_quiz(3);
        let answers = vec![answer(3, 31), answer(1, 12), answer(2, 21)];
        let result = grade(&quiz, &answers);
        let order: Vec<i64> = result.answers.iter().map(|a| a.question_id).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn duplicate_answers_count_independently() {
        // Observed legacy behavior: no deduplication, both entries count.
        let result = grade(&sample_quiz(1), &[answer(1, 11), answer(1, 11)]);
        assert_eq!(result.score, 2);
        assert_eq!(result.total_points, 2);
        assert_eq!(result.answers.len(), 2);
    }

    #[test]
    fn score_bounded_by_total_and_total_by_input_size() {
        let quiz = sample_quiz(5);
        let answers = vec![
            answer(1, 11),
            answer(2, 22),
            answer(999, 1),
            answer(3, 31),
        ];
        let result = grade(&quiz, &answers);
        assert!(result.total_points <= answers.len() as i64);
        assert!(result.score <= result.total_points);
        assert_eq!(result.total_points, 3);
        assert_eq!(result.score, 2);
    }
}
