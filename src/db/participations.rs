//! # 참가 기록 쿼리 모듈
//!
//! 참가자 한 명이 세션 하나에서 남긴 답안과 마지막으로 보던 문항 위치를 저장합니다.
//!
//! 참가 기록은 처음 필요할 때(세션이 진행 중/종료 상태에서 조회하거나 답안을 낼 때)
//! 문항 수만큼 빈 칸(`null`)을 채워 만들어집니다.

use crate::error::AppError;
use crate::models::{AnswerList, Participation};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct ParticipationRow {
    answers: String,
    current_question_index: i64,
}

impl ParticipationRow {
    /// JSON 답안을 풀고, 길이를 문항 수에 맞춥니다.
    fn into_participation(self, question_count: usize) -> Result<Participation, AppError> {
        let mut answers: AnswerList = serde_json::from_str(&self.answers)
            .map_err(|e| AppError::Internal(format!("Corrupt answers: {}", e)))?;
        answers.resize(question_count, None);
        Ok(Participation {
            answers,
            current_question_index: self.current_question_index.max(0) as usize,
        })
    }
}

/// 참가 기록을 조회하고, 없으면 빈 답안으로 만듭니다.
pub async fn ensure_participation(
    pool: &SqlitePool,
    session_id: &str,
    user_id: &str,
    question_count: usize,
) -> Result<Participation, AppError> {
    let empty = serde_json::to_string(&vec![None::<usize>; question_count])
        .map_err(|e| AppError::Internal(format!("Failed to encode answers: {}", e)))?;

    // 동시에 두 요청이 들어와도 한쪽만 INSERT되고 다른 쪽은 무시됩니다.
    sqlx::query(
        r#"
        INSERT INTO live_session_participations (session_id, user_id, answers)
        VALUES (?, ?, ?)
        ON CONFLICT (session_id, user_id) DO NOTHING
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(empty)
    .execute(pool)
    .await?;

    fetch(pool, session_id, user_id)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve participation".to_string(),
        ))?
        .into_participation(question_count)
}

async fn fetch(
    pool: &SqlitePool,
    session_id: &str,
    user_id: &str,
) -> Result<Option<ParticipationRow>, AppError> {
    let row = sqlx::query_as::<_, ParticipationRow>(
        r#"
        SELECT answers, current_question_index
        FROM live_session_participations
        WHERE session_id = ? AND user_id = ?
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// 문항 하나의 답을 기록하고, 기록 후의 전체 답안을 돌려줍니다.
///
/// 인덱스 범위 검사는 호출하는 쪽(라우트 핸들러)의 몫입니다.
/// `json_set`으로 한 칸만 바꾸므로 다른 문항에 대한 동시 제출이 서로 덮어쓰지 않습니다.
pub async fn save_answer(
    pool: &SqlitePool,
    session_id: &str,
    user_id: &str,
    question_count: usize,
    question_index: usize,
    answer_index: usize,
) -> Result<AnswerList, AppError> {
    ensure_participation(pool, session_id, user_id, question_count).await?;

    sqlx::query(
        r#"
        UPDATE live_session_participations
        SET answers = json_set(answers, ?, ?),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE session_id = ? AND user_id = ?
        "#,
    )
    .bind(format!("$[{}]", question_index))
    .bind(answer_index as i64)
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    let participation = fetch(pool, session_id, user_id)
        .await?
        .ok_or(AppError::NotFound)?
        .into_participation(question_count)?;

    Ok(participation.answers)
}

pub async fn save_current_question_index(
    pool: &SqlitePool,
    session_id: &str,
    user_id: &str,
    question_count: usize,
    question_index: usize,
) -> Result<usize, AppError> {
    ensure_participation(pool, session_id, user_id, question_count).await?;

    sqlx::query(
        r#"
        UPDATE live_session_participations
        SET current_question_index = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE session_id = ? AND user_id = ?
        "#,
    )
    .bind(question_index as i64)
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(question_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{live_sessions, test_pool, users};
    use crate::models::NewQuestion;
    use crate::models::user::ROLE_STUDENT;

    async fn seed(pool: &SqlitePool, question_count: usize) -> String {
        users::create_user(pool, "u1", "camila", None, "hash", ROLE_STUDENT)
            .await
            .unwrap();
        let questions: Vec<NewQuestion> = (0..question_count)
            .map(|i| NewQuestion {
                prompt: format!("Pregunta {i}"),
                options: vec!["a".into(), "b".into(), "c".into()],
            })
            .collect();
        live_sessions::create_live_session(pool, "Ensayo", 0, &questions)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn participation_starts_with_empty_slots() {
        let pool = test_pool().await;
        let session_id = seed(&pool, 4).await;

        let participation = ensure_participation(&pool, &session_id, "u1", 4).await.unwrap();
        assert_eq!(participation.answers, vec![None; 4]);
        assert_eq!(participation.current_question_index, 0);

        // 두 번째 호출은 기존 기록을 그대로 돌려줍니다.
        save_current_question_index(&pool, &session_id, "u1", 4, 2)
            .await
            .unwrap();
        let again = ensure_participation(&pool, &session_id, "u1", 4).await.unwrap();
        assert_eq!(again.current_question_index, 2);
    }

    #[tokio::test]
    async fn answers_are_recorded_per_slot() {
        let pool = test_pool().await;
        let session_id = seed(&pool, 3).await;

        let answers = save_answer(&pool, &session_id, "u1", 3, 1, 2).await.unwrap();
        assert_eq!(answers, vec![None, Some(2), None]);

        let answers = save_answer(&pool, &session_id, "u1", 3, 0, 0).await.unwrap();
        assert_eq!(answers, vec![Some(0), Some(2), None]);

        // 답을 바꾸면 같은 칸이 덮어써집니다.
        let answers = save_answer(&pool, &session_id, "u1", 3, 1, 1).await.unwrap();
        assert_eq!(answers, vec![Some(0), Some(1), None]);
    }
}
