//! # 라이브 세션 데이터베이스 쿼리 모듈
//!
//! 세션과 문항의 생성, 조회, 상태 변경을 담당하는 SQL 쿼리 함수들입니다.
//!
//! ## 저장 구조
//! ```text
//! live_sessions (1) ──< live_session_questions (N, position 순서)
//! ```
//! 문항의 선택지는 JSON 배열 텍스트로 저장합니다 (`["a", "b", "c"]`).

use crate::error::AppError;
use crate::models::{NewQuestion, Question, Session, SessionStatus, SessionSummary};
use sqlx::SqlitePool;

/// `live_sessions` 한 행. status는 문자열 그대로 읽은 뒤 `SessionStatus::parse`로 변환합니다.
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    title: String,
    status: String,
    scheduled_start: i64,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: String,
    prompt: String,
    options: String,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    title: String,
    status: String,
    scheduled_start: i64,
    question_count: i64,
}

/// 새 라이브 세션을 문항과 함께 만듭니다. 처음 상태는 항상 `scheduled`입니다.
///
/// 세션과 문항은 하나의 트랜잭션으로 저장되므로,
/// 중간에 실패하면 문항 일부만 남는 일이 없습니다.
pub async fn create_live_session(
    pool: &SqlitePool,
    title: &str,
    scheduled_start: i64,
    questions: &[NewQuestion],
) -> Result<Session, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    // pool.begin(): 트랜잭션 시작. commit() 전에 drop되면 자동으로 롤백됩니다.
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO live_sessions (id, title, status, scheduled_start)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(title)
    .bind(SessionStatus::Scheduled.as_str())
    .bind(scheduled_start)
    .execute(&mut *tx)
    .await?;

    for (position, question) in questions.iter().enumerate() {
        let options = serde_json::to_string(&question.options)
            .map_err(|e| AppError::Internal(format!("Failed to encode options: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO live_session_questions (session_id, position, id, prompt, options)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(position as i64)
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(&question.prompt)
        .bind(options)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_live_session(pool, &id)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve created live session".to_string(),
        ))
}

/// ID로 세션 하나를 문항까지 포함해 조회합니다.
///
/// 세션이 존재하면 `Some(Session)`, 없으면 `None`을 반환합니다.
pub async fn get_live_session(pool: &SqlitePool, id: &str) -> Result<Option<Session>, AppError> {
    let row = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT id, title, status, scheduled_start
        FROM live_sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    // let-else: 값이 없으면 바로 반환
    let Some(row) = row else {
        return Ok(None);
    };

    let questions = list_questions(pool, id).await?;
    Ok(Some(Session {
        id: row.id,
        title: row.title,
        status: SessionStatus::parse(&row.status),
        scheduled_start: row.scheduled_start,
        questions,
    }))
}

async fn list_questions(pool: &SqlitePool, session_id: &str) -> Result<Vec<Question>, AppError> {
    let rows = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT id, prompt, options
        FROM live_session_questions
        WHERE session_id = ?
        ORDER BY position ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let options: Vec<String> = serde_json::from_str(&row.options)
                .map_err(|e| AppError::Internal(format!("Corrupt question options: {}", e)))?;
            Ok(Question {
                id: row.id,
                prompt: row.prompt,
                options,
            })
        })
        .collect()
}

/// 관리자 목록용: 모든 세션을 시작 예정 시각 내림차순으로 조회합니다.
pub async fn list_live_sessions(pool: &SqlitePool) -> Result<Vec<SessionSummary>, AppError> {
    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT s.id, s.title, s.status, s.scheduled_start,
               COUNT(q.position) AS question_count
        FROM live_sessions s
        LEFT JOIN live_session_questions q ON q.session_id = s.id
        GROUP BY s.id
        ORDER BY s.scheduled_start DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SessionSummary {
            id: row.id,
            title: row.title,
            status: SessionStatus::parse(&row.status),
            scheduled_start: row.scheduled_start,
            question_count: row.question_count.max(0) as usize,
        })
        .collect())
}

/// 세션 상태를 바꿉니다. 상태 순서 검증은 하지 않습니다 (관리자가 기준).
///
/// ## 반환값
/// - `Ok(Some(Session))`: 변경 후 세션
/// - `Ok(None)`: 해당 ID의 세션이 없음
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: SessionStatus,
) -> Result<Option<Session>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE live_sessions
        SET status = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_live_session(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn questions(count: usize) -> Vec<NewQuestion> {
        (0..count)
            .map(|i| NewQuestion {
                prompt: format!("¿Cuánto es {i} + {i}?"),
                options: vec![format!("{}", i * 2), "0".into(), "1".into()],
            })
            .collect()
    }

    #[tokio::test]
    async fn created_session_keeps_question_order() {
        let pool = test_pool().await;
        let session = create_live_session(&pool, "Ensayo M1", 1_700_000_000_000, &questions(3))
            .await
            .unwrap();

        assert_eq!(session.status, SessionStatus::Scheduled);
        assert_eq!(session.questions.len(), 3);
        assert_eq!(session.questions[2].prompt, "¿Cuánto es 2 + 2?");
        assert_eq!(session.questions[2].options[0], "4");

        let loaded = get_live_session(&pool, &session.id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn status_updates_are_reflected_in_list() {
        let pool = test_pool().await;
        let session = create_live_session(&pool, "Ensayo M2", 0, &questions(2))
            .await
            .unwrap();

        let updated = update_status(&pool, &session.id, SessionStatus::Lobby)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, SessionStatus::Lobby);

        let summaries = list_live_sessions(&pool).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].question_count, 2);
        assert_eq!(summaries[0].status, SessionStatus::Lobby);
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let pool = test_pool().await;
        assert!(get_live_session(&pool, "nope").await.unwrap().is_none());
        assert!(update_status(&pool, "nope", SessionStatus::Active)
            .await
            .unwrap()
            .is_none());
    }
}
