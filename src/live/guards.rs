//! Guards: pure predicates over a context snapshot.
//!
//! The machine uses them to gate transitions and the facade uses the same
//! functions to derive `can_go_next` / `can_go_previous`, so a view never
//! enables a button the machine would refuse.

use crate::live::machine::LiveContext;
use crate::models::SessionStatus;

/// Preview override first, live status second.
fn phase_is(ctx: &LiveContext, status: SessionStatus) -> bool {
    if ctx.preview_mode {
        if let Some(forced) = ctx.preview_state {
            return forced == status;
        }
    }
    ctx.session
        .as_ref()
        .is_some_and(|session| session.status == status)
}

pub fn is_scheduled(ctx: &LiveContext) -> bool {
    phase_is(ctx, SessionStatus::Scheduled)
}

pub fn is_lobby(ctx: &LiveContext) -> bool {
    phase_is(ctx, SessionStatus::Lobby)
}

pub fn is_active(ctx: &LiveContext) -> bool {
    phase_is(ctx, SessionStatus::Active)
}

pub fn is_completed(ctx: &LiveContext) -> bool {
    phase_is(ctx, SessionStatus::Completed)
}

pub fn question_count(ctx: &LiveContext) -> usize {
    ctx.session
        .as_ref()
        .map_or(0, |session| session.questions.len())
}

pub fn can_go_next(ctx: &LiveContext) -> bool {
    ctx.current_question_index + 1 < question_count(ctx)
}

pub fn can_go_previous(ctx: &LiveContext) -> bool {
    ctx.current_question_index > 0
}

pub fn is_valid_question_index(ctx: &LiveContext, index: usize) -> bool {
    index < question_count(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, Session};

    fn ctx_with(status: SessionStatus, questions: usize, index: usize) -> LiveContext {
        let mut ctx = LiveContext::new("s1", None);
        ctx.session = Some(Session {
            id: "s1".into(),
            title: "Ensayo".into(),
            status,
            scheduled_start: 0,
            questions: (0..questions)
                .map(|i| Question {
                    id: format!("q{i}"),
                    prompt: format!("Pregunta {i}"),
                    options: vec!["a".into(), "b".into()],
                })
                .collect(),
        });
        ctx.current_question_index = index;
        ctx
    }

    #[test]
    fn phase_guards_follow_live_status() {
        let ctx = ctx_with(SessionStatus::Lobby, 3, 0);
        assert!(is_lobby(&ctx));
        assert!(!is_scheduled(&ctx));
        assert!(!is_active(&ctx));
        assert!(!is_completed(&ctx));
    }

    #[test]
    fn preview_state_overrides_live_status() {
        let mut ctx = ctx_with(SessionStatus::Scheduled, 3, 0);
        ctx.preview_mode = true;
        ctx.preview_state = Some(SessionStatus::Completed);
        assert!(is_completed(&ctx));
        assert!(!is_scheduled(&ctx));
    }

    #[test]
    fn preview_mode_without_state_uses_live_status() {
        let mut ctx = ctx_with(SessionStatus::Active, 3, 0);
        ctx.preview_mode = true;
        assert!(is_active(&ctx));
    }

    #[test]
    fn no_session_matches_no_phase() {
        let ctx = LiveContext::new("s1", None);
        assert!(!is_scheduled(&ctx) && !is_lobby(&ctx) && !is_active(&ctx) && !is_completed(&ctx));
        assert!(!can_go_next(&ctx));
        assert!(!can_go_previous(&ctx));
    }

    #[test]
    fn navigation_bounds() {
        assert!(can_go_next(&ctx_with(SessionStatus::Active, 5, 3)));
        assert!(!can_go_next(&ctx_with(SessionStatus::Active, 5, 4)));
        assert!(can_go_previous(&ctx_with(SessionStatus::Active, 5, 1)));
        assert!(!can_go_previous(&ctx_with(SessionStatus::Active, 5, 0)));

        let ctx = ctx_with(SessionStatus::Active, 5, 0);
        assert!(is_valid_question_index(&ctx, 4));
        assert!(!is_valid_question_index(&ctx, 5));
    }
}
