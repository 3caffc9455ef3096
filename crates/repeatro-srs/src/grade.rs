use thiserror::Error;

/// Recall quality reported by the learner, 0 (blackout) to 5 (perfect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("grade must be between 0 and 5, got {0}")]
pub struct GradeOutOfRange(pub i32);

impl Grade {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 5;

    /// Grades below this value count as a lapse.
    pub const PASSING: u8 = 3;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_lapse(self) -> bool {
        self.0 < Self::PASSING
    }
}

impl TryFrom<i32> for Grade {
    type Error = GradeOutOfRange;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Grade)
            .ok_or(GradeOutOfRange(value))
    }
}

impl From<Grade> for i32 {
    fn from(grade: Grade) -> Self {
        i32::from(grade.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_zero_through_five() {
        for value in i32::from(Grade::MIN)..=i32::from(Grade::MAX) {
            let grade = Grade::try_from(value).unwrap();
            assert_eq!(i32::from(grade), value);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(Grade::try_from(-1), Err(GradeOutOfRange(-1)));
        assert_eq!(Grade::try_from(6), Err(GradeOutOfRange(6)));
        assert_eq!(Grade::try_from(256), Err(GradeOutOfRange(256)));
        assert_eq!(
            Grade::try_from(i32::from(Grade::MAX) + 1),
            Err(GradeOutOfRange(6))
        );
    }

    #[test]
    fn test_lapse_boundary() {
        assert!(Grade::try_from(2).unwrap().is_lapse());
        assert!(!Grade::try_from(3).unwrap().is_lapse());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            GradeOutOfRange(7).to_string(),
            "grade must be between 0 and 5, got 7"
        );
    }
}
