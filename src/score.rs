//! Letter grades.
//!
//! The grade depends only on how many errors and warnings a skill has.

use serde::{Deserialize, Serialize};

/// Warning bands for zero-error grades.
pub mod bands {
    /// Highest warning count still graded `B`.
    pub const B_MAX_WARNINGS: usize = 2;
    /// Highest warning count still graded `C`.
    pub const C_MAX_WARNINGS: usize = 5;
}

/// A letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Grade a skill from its error and warning counts.
///
/// Any error is an `F`. Without errors, the grade drops one letter per
/// warning band: none, 1-2, 3-5, more than 5.
pub fn calculate(errors: usize, warnings: usize) -> Grade {
    if errors > 0 {
        return Grade::F;
    }
    match warnings {
        0 => Grade::A,
        w if w <= bands::B_MAX_WARNINGS => Grade::B,
        w if w <= bands::C_MAX_WARNINGS => Grade::C,
        _ => Grade::D,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(calculate(0, 0), Grade::A);
        assert_eq!(calculate(0, 1), Grade::B);
        assert_eq!(calculate(0, 2), Grade::B);
        assert_eq!(calculate(0, 3), Grade::C);
        assert_eq!(calculate(0, 5), Grade::C);
        assert_eq!(calculate(0, 6), Grade::D);
        assert_eq!(calculate(0, 100), Grade::D);
    }

    #[test]
    fn test_any_error_fails() {
        for warnings in 0..10 {
            assert_eq!(calculate(1, warnings), Grade::F);
            assert_eq!(calculate(7, warnings), Grade::F);
        }
    }

    #[test]
    fn test_grade_never_improves_with_more_warnings() {
        let mut previous = calculate(0, 0);
        for warnings in 1..20 {
            let grade = calculate(0, warnings);
            assert!(grade >= previous, "{} warnings improved the grade", warnings);
            previous = grade;
        }
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::C).unwrap(), "\"C\"");
    }
}
