/// Rounds `100 * part / whole` half-up to a whole percentage.
///
/// Returns 0 when `whole` is 0. `part` is clamped to `whole`.
#[must_use]
pub fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let pct = (200 * part + whole) / (2 * whole);
    u8::try_from(pct).unwrap_or(100)
}

/// Result of scoring a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    correct: usize,
    total: usize,
}

impl Score {
    #[must_use]
    pub fn new(correct: usize, total: usize) -> Self {
        Self {
            correct: correct.min(total),
            total,
        }
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        rounded_percentage(self.correct, self.total)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(rounded_percentage(1, 2), 50);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(4, 4), 100);
    }

    #[test]
    fn percentage_is_zero_without_total() {
        assert_eq!(rounded_percentage(0, 0), 0);
        assert_eq!(Score::new(0, 0).percentage(), 0);
        assert!(!Score::new(0, 0).is_perfect());
    }

    #[test]
    fn score_clamps_correct_to_total() {
        let score = Score::new(5, 2);
        assert_eq!(score.correct(), 2);
        assert_eq!(score.percentage(), 100);
    }
}
