//! Preference-quiz scoring. The backend runs the same tally; the local copy
//! lets the CLI explain results and keeps tests hermetic.

use crate::error::{ClientError, Result};
use crate::models::{Formula, ALL_FORMULAS};

/// The quiz always has exactly ten questions.
pub const QUIZ_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub recommended: Formula,
    /// Vote counts in the fixed red/blue/yellow/green order.
    pub breakdown: [(Formula, u32); 4],
}

/// Tally answers and pick the formula with the most votes. Ties resolve in
/// the fixed red, blue, yellow, green order so local results match the
/// backend's.
pub fn score_answers(answers: &[Formula]) -> Result<QuizOutcome> {
    if answers.len() != QUIZ_LENGTH {
        return Err(ClientError::Validation(format!(
            "expected {QUIZ_LENGTH} answers, got {}",
            answers.len()
        )));
    }

    let mut breakdown = ALL_FORMULAS.map(|formula| (formula, 0u32));
    for answer in answers {
        for entry in breakdown.iter_mut() {
            if entry.0 == *answer {
                entry.1 += 1;
            }
        }
    }

    // Strictly-greater comparison keeps the first maximum, matching the
    // backend's iteration order on ties.
    let mut best = breakdown[0];
    for entry in &breakdown[1..] {
        if entry.1 > best.1 {
            best = *entry;
        }
    }
    let recommended = best.0;

    Ok(QuizOutcome {
        recommended,
        breakdown,
    })
}
