//! SRS (Spaced Repetition System) library for Repeatro
//!
//! This crate provides the SM-2 style scheduling algorithm that decides when a
//! flashcard is shown again, together with the scheduling state a card carries
//! between reviews.
//!
//! Everything here is pure: no I/O, no clock reads. Callers pass `now`
//! explicitly so the result is fully determined by the inputs.

mod grade;

pub use grade::{Grade, GradeOutOfRange};

use chrono::{DateTime, Duration, Utc};

/// Easiness factor assigned to a freshly created card.
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Lower bound for the easiness factor, enforced after every review.
pub const MIN_EASINESS: f64 = 1.3;

/// Interval (minutes) after a lapse.
pub const LAPSE_INTERVAL_MINUTES: i32 = 1;

/// Interval (minutes) after the first successful review since a reset.
pub const FIRST_INTERVAL_MINUTES: i32 = 5;

/// Interval (minutes) after the second consecutive successful review.
pub const SECOND_INTERVAL_MINUTES: i32 = 30;

/// The part of a flashcard that spaced repetition reads and writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulingState {
    /// Minutes until the next review once the card has been reviewed.
    pub interval: i32,
    /// Per-card difficulty multiplier, never below [`MIN_EASINESS`].
    pub easiness: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: i32,
    /// The card is due once `now >= next_review_at`.
    pub next_review_at: DateTime<Utc>,
}

impl SchedulingState {
    /// Default state for a card created at `created_at`.
    ///
    /// The card becomes due after `initial_delay`.
    pub fn new(created_at: DateTime<Utc>, initial_delay: Duration) -> Self {
        Self {
            interval: 0,
            easiness: DEFAULT_EASINESS,
            repetitions: 0,
            next_review_at: created_at + initial_delay,
        }
    }

    /// Whether the card may be reviewed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_at
    }

    /// Apply one graded review and return the replacement state.
    pub fn review(&self, now: DateTime<Utc>, grade: Grade) -> Self {
        compute_next_schedule(now, self.interval, self.easiness, self.repetitions, grade)
    }
}

/// Compute a card's next scheduling state from its previous one.
///
/// # Arguments
///
/// * `now` - Instant the review is recorded; base for the next due time
/// * `previous_interval` - Previous interval in minutes (non-negative)
/// * `previous_easiness` - Previous easiness factor (at least [`MIN_EASINESS`])
/// * `previous_repetitions` - Previous consecutive success count (non-negative)
/// * `grade` - Self-reported recall quality
///
/// # Algorithm
///
/// * Grade 0-2 (lapse): repetitions reset to 0, interval is 1 minute
/// * Grade 3-5 with 0 previous repetitions: 5 minutes
/// * Grade 3-5 with 1 previous repetition: 30 minutes
/// * Grade 3-5 otherwise: `round(previous_interval * previous_easiness)`
///
/// The easiness factor is updated on every review, lapses included:
///
/// `EF' = max(EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), 1.3)`
///
/// Interval growth multiplies by the easiness *before* this update.
pub fn compute_next_schedule(
    now: DateTime<Utc>,
    previous_interval: i32,
    previous_easiness: f64,
    previous_repetitions: i32,
    grade: Grade,
) -> SchedulingState {
    debug_assert!(previous_interval >= 0, "interval must be non-negative");
    debug_assert!(previous_repetitions >= 0, "repetitions must be non-negative");

    let (interval, repetitions) = if grade.is_lapse() {
        (LAPSE_INTERVAL_MINUTES, 0)
    } else {
        let interval = match previous_repetitions {
            0 => FIRST_INTERVAL_MINUTES,
            1 => SECOND_INTERVAL_MINUTES,
            _ => grow_interval(previous_interval, previous_easiness),
        };
        (interval, previous_repetitions + 1)
    };

    SchedulingState {
        interval,
        easiness: next_easiness(previous_easiness, grade),
        repetitions,
        next_review_at: now + Duration::minutes(i64::from(interval)),
    }
}

/// SM-2 easiness update, clamped to [`MIN_EASINESS`].
pub fn next_easiness(previous_easiness: f64, grade: Grade) -> f64 {
    let distance = f64::from(Grade::MAX - grade.value());
    let easiness = previous_easiness + (0.1 - distance * (0.08 + distance * 0.02));
    easiness.max(MIN_EASINESS)
}

// f64::round rounds half away from zero; the cast saturates.
fn grow_interval(previous_interval: i32, previous_easiness: f64) -> i32 {
    (f64::from(previous_interval) * previous_easiness).round() as i32
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn any_grade() -> impl Strategy<Value = Grade> {
        (0..=5i32).prop_map(|value| Grade::try_from(value).unwrap())
    }

    fn any_now() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
    }

    proptest! {
        #[test]
        fn easiness_never_below_floor(
            now in any_now(),
            interval in 0..100_000i32,
            easiness in MIN_EASINESS..5.0f64,
            repetitions in 0..50i32,
            grade in any_grade(),
        ) {
            let next = compute_next_schedule(now, interval, easiness, repetitions, grade);
            prop_assert!(next.easiness >= MIN_EASINESS);
        }

        #[test]
        fn lapse_resets_and_fixes_interval(
            now in any_now(),
            interval in 0..100_000i32,
            easiness in MIN_EASINESS..5.0f64,
            repetitions in 0..50i32,
            value in 0..3i32,
        ) {
            let grade = Grade::try_from(value).unwrap();
            let next = compute_next_schedule(now, interval, easiness, repetitions, grade);
            prop_assert_eq!(next.repetitions, 0);
            prop_assert_eq!(next.interval, LAPSE_INTERVAL_MINUTES);
        }

        #[test]
        fn success_steps_and_growth(
            now in any_now(),
            interval in 0..100_000i32,
            easiness in MIN_EASINESS..5.0f64,
            repetitions in 0..50i32,
            value in 3..=5i32,
        ) {
            let grade = Grade::try_from(value).unwrap();
            let next = compute_next_schedule(now, interval, easiness, repetitions, grade);
            let expected = match repetitions {
                0 => 5,
                1 => 30,
                _ => (f64::from(interval) * easiness).round() as i32,
            };
            prop_assert_eq!(next.interval, expected);
            prop_assert_eq!(next.repetitions, repetitions + 1);
        }

        #[test]
        fn due_time_is_now_plus_interval(
            now in any_now(),
            interval in 0..100_000i32,
            easiness in MIN_EASINESS..5.0f64,
            repetitions in 0..50i32,
            grade in any_grade(),
        ) {
            let next = compute_next_schedule(now, interval, easiness, repetitions, grade);
            prop_assert_eq!(next.next_review_at, now + Duration::minutes(i64::from(next.interval)));
            prop_assert!(next.interval >= 0);
        }

        #[test]
        fn identical_inputs_identical_outputs(
            now in any_now(),
            interval in 0..100_000i32,
            easiness in MIN_EASINESS..5.0f64,
            repetitions in 0..50i32,
            grade in any_grade(),
        ) {
            let a = compute_next_schedule(now, interval, easiness, repetitions, grade);
            let b = compute_next_schedule(now, interval, easiness, repetitions, grade);
            prop_assert_eq!(a.interval, b.interval);
            prop_assert_eq!(a.repetitions, b.repetitions);
            prop_assert_eq!(a.next_review_at, b.next_review_at);
            prop_assert_eq!(a.easiness.to_bits(), b.easiness.to_bits());
        }
    }
}
