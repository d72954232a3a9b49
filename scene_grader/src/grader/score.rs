use std::ops::AddAssign;

use crate::store::test_run::Verdict;

/// Running tally of a set of scene runs.
///
/// Indeterminate runs are counted apart and never enter the grade: they are neither a pass
/// nor an attempt.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Score {
    passed: u32,
    attempted: u32,
    indeterminate: u32,
}

impl Score {
    pub fn new(passed: u32, attempted: u32) -> Self {
        Self {
            passed,
            attempted,
            indeterminate: 0,
        }
    }

    pub fn from_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        let mut score = Self::default();
        for verdict in verdicts {
            score.record(verdict);
        }
        score
    }

    /// Scenes of ungraded directories count like any other: the verdict is all a stored run
    /// keeps, so a previous submission could not be scored any other way.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => {
                self.passed += 1;
                self.attempted += 1;
            }
            Verdict::Fail => self.attempted += 1,
            Verdict::Indeterminate => self.indeterminate += 1,
        }
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    pub fn indeterminate(&self) -> u32 {
        self.indeterminate
    }

    /// `passed / attempted`, or `None` when nothing was attempted.
    pub fn grade(&self) -> Option<f64> {
        if self.attempted == 0 {
            return None;
        }
        Some(self.passed as f64 / self.attempted as f64)
    }

    /// The grade rounded to three decimals and scaled to a percentage (2/3 gives 66.7).
    pub fn percentage(&self) -> Option<f64> {
        self.grade().map(|g| (g * 1000.0).round() / 10.0)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        self.passed += rhs.passed;
        self.attempted += rhs.attempted;
        self.indeterminate += rhs.indeterminate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod grade_tests {
        use super::*;

        #[test]
        fn should_compute_exact_ratio() {
            for (passed, attempted) in [(0, 4), (1, 4), (3, 7), (5, 5)] {
                let mut verdicts = vec![Verdict::Pass; passed as usize];
                verdicts.extend(vec![Verdict::Fail; (attempted - passed) as usize]);
                let score = Score::from_verdicts(verdicts);
                assert_eq!(score.grade(), Some(passed as f64 / attempted as f64));
            }
        }

        #[test]
        fn should_ignore_indeterminate_runs() {
            let score = Score::from_verdicts([
                Verdict::Pass,
                Verdict::Indeterminate,
                Verdict::Fail,
                Verdict::Indeterminate,
            ]);
            assert_eq!(score.passed(), 1);
            assert_eq!(score.attempted(), 2);
            assert_eq!(score.indeterminate(), 2);
            assert_eq!(score.grade(), Some(0.5));
        }

        #[test]
        fn should_have_no_grade_when_everything_is_indeterminate() {
            let score = Score::from_verdicts([Verdict::Indeterminate; 3]);
            assert_eq!(score.grade(), None);
            assert_eq!(score.percentage(), None);
            assert_eq!(Score::default().grade(), None);
        }
    }

    mod percentage_tests {
        use super::*;

        #[test]
        fn should_round_to_three_decimals_before_scaling() {
            assert_eq!(Score::new(2, 3).percentage(), Some(66.7));
            assert_eq!(Score::new(1, 3).percentage(), Some(33.3));
            assert_eq!(Score::new(1, 8).percentage(), Some(12.5));
            assert_eq!(Score::new(4, 4).percentage(), Some(100.0));
        }
    }

    #[test]
    fn should_add_assign_score_correctly() {
        let mut score = Score::new(1, 2);
        score += Score::from_verdicts([Verdict::Pass, Verdict::Indeterminate]);
        assert_eq!(score.passed(), 2);
        assert_eq!(score.attempted(), 3);
        assert_eq!(score.indeterminate(), 1);
    }
}
