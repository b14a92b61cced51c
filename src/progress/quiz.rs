//! Quiz grading.
//!
//! Grading is a pure read over the quiz content and a submission; it never
//! touches progress state. Only a pass feeds the completion path, and that
//! wiring lives in the engine.

use crate::course::{QuizAnswer, QuizQuestion};

use super::types::{AnswerResult, QuizResult, QuizSubmission};

/// Grade a submission against the quiz content.
///
/// No partial credit: a set-valued answer counts only when the submission is
/// a set of the same size whose every member appears in the expected set.
pub fn grade(questions: &[QuizQuestion], passing_score: u32, submission: &QuizSubmission) -> QuizResult {
    let mut correct_count = 0u32;
    let mut breakdown = Vec::with_capacity(questions.len());

    for question in questions {
        let submitted = submission.answers.get(&question.id);
        let is_correct = submitted
            .map(|answer| answer_matches(&question.correct_answer, answer))
            .unwrap_or(false);
        if is_correct {
            correct_count += 1;
        }
        breakdown.push(AnswerResult {
            question_id: question.id,
            is_correct,
            correct_answer: question.correct_answer.clone(),
            submitted_answer: submitted.cloned(),
            explanation: question.explanation.clone(),
        });
    }

    let total_questions = questions.len() as u32;
    let score = if total_questions == 0 {
        0
    } else {
        (f64::from(correct_count) / f64::from(total_questions) * 100.0).round() as u32
    };

    QuizResult {
        score,
        passing_score,
        passed: score >= passing_score,
        correct_count,
        total_questions,
        breakdown,
    }
}

fn answer_matches(expected: &QuizAnswer, submitted: &QuizAnswer) -> bool {
    match (expected, submitted) {
        (QuizAnswer::Many(expected), QuizAnswer::Many(submitted)) => {
            expected.len() == submitted.len()
                && expected.iter().all(|value| submitted.contains(value))
        }
        (QuizAnswer::One(expected), QuizAnswer::One(submitted)) => expected == submitted,
        _ => false,
    }
}
