use chrono::{DateTime, Utc};
use repeatro_db::{
    models::{Card, NewReview},
    repositories::{card as card_repo, review as review_repo},
};
use repeatro_srs::{Grade, SchedulingState};
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{AnswerReport, AnswerRequest, FailedAnswer};
use crate::{error::ApiError, metrics};

/// Largest batch accepted by `POST /cards/answers`.
pub const MAX_ANSWERS_PER_BATCH: usize = 500;

/// What to do with one graded answer for a loaded card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerDecision {
    /// The card is not due yet; nothing changes.
    Skip,
    /// The requester does not own the card.
    Forbidden,
    /// Persist this state and log the review.
    Apply(SchedulingState),
}

/// Decide the fate of an answer.
///
/// The due check runs before the ownership check, so a card that is not due
/// is skipped silently whoever submitted the answer.
pub fn decide(
    schedule: &SchedulingState,
    owner: Uuid,
    requester: Uuid,
    now: DateTime<Utc>,
    grade: Grade,
) -> AnswerDecision {
    if !schedule.is_due(now) {
        return AnswerDecision::Skip;
    }
    if owner != requester {
        return AnswerDecision::Forbidden;
    }
    AnswerDecision::Apply(schedule.review(now, grade))
}

/// Convert raw answers into validated grades, rejecting the batch on the first bad one.
pub fn parse_answers(answers: &[AnswerRequest]) -> Result<Vec<(Uuid, Grade)>, ApiError> {
    if answers.len() > MAX_ANSWERS_PER_BATCH {
        return Err(ApiError::Validation(format!(
            "At most {MAX_ANSWERS_PER_BATCH} answers can be submitted at once"
        )));
    }

    answers
        .iter()
        .map(|answer| -> Result<_, ApiError> {
            Ok((answer.card_id, Grade::try_from(answer.grade)?))
        })
        .collect()
}

#[derive(Debug)]
enum AnswerOutcome {
    Applied,
    Skipped,
}

/// Apply a batch of graded answers for `requester`.
///
/// Answers are processed in order, each in its own transaction. A failing
/// answer is reported in the result and does not affect the others.
pub async fn submit_answers(
    pool: &PgPool,
    requester: Uuid,
    answers: &[(Uuid, Grade)],
    now: DateTime<Utc>,
) -> AnswerReport {
    let mut report = AnswerReport::default();

    for &(card_id, grade) in answers {
        match process_answer(pool, requester, card_id, grade, now).await {
            Ok(AnswerOutcome::Applied) => {
                report.applied += 1;
                metrics::record_review_answer("applied");
                metrics::record_review_grade(grade.value());
            }
            Ok(AnswerOutcome::Skipped) => {
                report.skipped += 1;
                metrics::record_review_answer("skipped");
                tracing::debug!(%card_id, "card not due, answer skipped");
            }
            Err(err) => {
                metrics::record_review_answer(outcome_label(&err));
                if err.status_code().is_server_error() {
                    tracing::error!(%card_id, error = %err, "failed to apply answer");
                } else {
                    tracing::warn!(%card_id, error = %err, "answer rejected");
                }
                report.failed.push(FailedAnswer {
                    card_id,
                    error: err.public_message(),
                });
            }
        }
    }

    report.message = if report.failed.is_empty() {
        "Answers processed".to_string()
    } else {
        "Answers processed with errors".to_string()
    };

    tracing::info!(
        user_id = %requester,
        applied = report.applied,
        skipped = report.skipped,
        failed = report.failed.len(),
        "answer batch processed"
    );

    report
}

async fn process_answer(
    pool: &PgPool,
    requester: Uuid,
    card_id: Uuid,
    grade: Grade,
    now: DateTime<Utc>,
) -> Result<AnswerOutcome, ApiError> {
    let mut tx = pool.begin().await?;

    let card: Card = card_repo::find_card_for_update(&mut *tx, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let next = match decide(
        &card.scheduling_state(),
        card.created_by,
        requester,
        now,
        grade,
    ) {
        AnswerDecision::Skip => return Ok(AnswerOutcome::Skipped),
        AnswerDecision::Forbidden => {
            return Err(ApiError::Forbidden(
                "You can only review your own cards".to_string(),
            ));
        }
        AnswerDecision::Apply(next) => next,
    };

    card_repo::update_schedule(&mut *tx, card_id, &next).await?;

    // Logged in the same transaction: a failed insert rolls the schedule back
    review_repo::insert_review(
        &mut *tx,
        &NewReview {
            user_id: requester,
            deck_id: card.deck_id,
            card_id,
            grade: i32::from(grade),
            created_at: now,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::debug!(
        %card_id,
        grade = grade.value(),
        interval = next.interval,
        easiness = next.easiness,
        repetitions = next.repetitions,
        "answer applied"
    );

    Ok(AnswerOutcome::Applied)
}

fn outcome_label(err: &ApiError) -> &'static str {
    match err {
        ApiError::NotFound(_) => "not_found",
        ApiError::Forbidden(_) => "forbidden",
        _ => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn grade(value: i32) -> Grade {
        Grade::try_from(value).unwrap()
    }

    fn due_state() -> SchedulingState {
        SchedulingState::new(t0() - Duration::minutes(1), Duration::zero())
    }

    #[test]
    fn test_due_owned_card_is_applied() {
        let owner = Uuid::new_v4();
        let decision = decide(&due_state(), owner, owner, t0(), grade(4));

        match decision {
            AnswerDecision::Apply(next) => {
                assert_eq!(next.interval, 5);
                assert_eq!(next.repetitions, 1);
                assert_eq!(next.next_review_at, t0() + Duration::minutes(5));
            }
            other => panic!("expected Apply, got {other:?}"),
        }
    }

    #[test]
    fn test_card_due_exactly_now_is_applied() {
        let owner = Uuid::new_v4();
        let state = SchedulingState::new(t0(), Duration::zero());

        assert!(matches!(
            decide(&state, owner, owner, t0(), grade(3)),
            AnswerDecision::Apply(_)
        ));
    }

    #[test]
    fn test_not_due_card_is_skipped() {
        let owner = Uuid::new_v4();
        let state = SchedulingState::new(t0(), Duration::seconds(10));

        assert_eq!(
            decide(&state, owner, owner, t0(), grade(5)),
            AnswerDecision::Skip
        );
    }

    #[test]
    fn test_not_due_foreign_card_is_skipped_before_ownership_check() {
        let state = SchedulingState::new(t0(), Duration::minutes(30));

        assert_eq!(
            decide(&state, Uuid::new_v4(), Uuid::new_v4(), t0(), grade(5)),
            AnswerDecision::Skip
        );
    }

    #[test]
    fn test_due_foreign_card_is_forbidden() {
        assert_eq!(
            decide(&due_state(), Uuid::new_v4(), Uuid::new_v4(), t0(), grade(5)),
            AnswerDecision::Forbidden
        );
    }

    #[test]
    fn test_parse_answers_rejects_whole_batch() {
        let card_id = Uuid::new_v4();
        let answers = [
            AnswerRequest { card_id, grade: 4 },
            AnswerRequest { card_id, grade: 6 },
        ];

        assert!(matches!(
            parse_answers(&answers),
            Err(ApiError::Validation(_))
        ));

        let answers = [AnswerRequest { card_id, grade: -1 }];
        assert!(parse_answers(&answers).is_err());
    }

    #[test]
    fn test_parse_answers_keeps_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_answers(&[
            AnswerRequest { card_id: a, grade: 0 },
            AnswerRequest { card_id: b, grade: 5 },
        ])
        .unwrap();

        assert_eq!(parsed, vec![(a, grade(0)), (b, grade(5))]);
    }

    #[test]
    fn test_parse_answers_limits_batch_size() {
        let answers = vec![
            AnswerRequest {
                card_id: Uuid::new_v4(),
                grade: 3
            };
            MAX_ANSWERS_PER_BATCH + 1
        ];

        assert!(parse_answers(&answers).is_err());
    }
}
