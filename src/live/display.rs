//! 뷰에서 쓰는 순수 헬퍼: 상태 문구, 시작까지 남은 시간.

use chrono::Utc;

use crate::models::{Session, SessionStatus};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// 참가자에게 보여줄 세션 상태 문구
pub fn status_label(status: &SessionStatus) -> &'static str {
    match status {
        SessionStatus::Scheduled => "Programado",
        SessionStatus::Lobby => "Sala de espera",
        SessionStatus::Active => "En curso",
        SessionStatus::Completed => "Finalizado",
        SessionStatus::Cancelled => "Cancelado",
        SessionStatus::Unknown => "Estado desconocido",
    }
}

/// 지금부터 세션 시작까지 남은 분(내림). 이미 지났으면 0.
pub fn minutes_until_start(session: &Session) -> i64 {
    minutes_until(session.scheduled_start, Utc::now().timestamp_millis())
}

pub fn minutes_until(scheduled_start_ms: i64, now_ms: i64) -> i64 {
    (scheduled_start_ms.saturating_sub(now_ms) / MILLIS_PER_MINUTE).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_its_own_label() {
        let labels = [
            SessionStatus::Scheduled,
            SessionStatus::Lobby,
            SessionStatus::Active,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
            SessionStatus::Unknown,
        ]
        .map(|status| status_label(&status));
        let mut unique = labels.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), labels.len());
        assert_eq!(status_label(&SessionStatus::Active), "En curso");
    }

    #[test]
    fn minutes_are_floored_and_never_negative() {
        let now = 1_700_000_000_000;
        assert_eq!(minutes_until(now + 5 * 60_000, now), 5);
        assert_eq!(minutes_until(now + 5 * 60_000 + 59_999, now), 5);
        assert_eq!(minutes_until(now + 59_999, now), 0);
        assert_eq!(minutes_until(now - 10 * 60_000, now), 0);
    }

    #[test]
    fn past_session_reports_zero_minutes() {
        let session = Session {
            id: "s1".into(),
            title: "Ensayo".into(),
            status: SessionStatus::Completed,
            scheduled_start: 0,
            questions: Vec::new(),
        };
        assert_eq!(minutes_until_start(&session), 0);
    }
}
