//! # 라이브 세션 파사드
//!
//! 뷰 코드가 쓰는 얇은 어댑터입니다.
//! - `LiveSessionView`: 현재 스냅샷을 불리언 플래그와 파생 값으로 펼친 것
//! - `LiveSession`: 이벤트 전송을 이름 있는 함수로 감싼 핸들
//!
//! 검증은 하지 않습니다. 가드 판단은 상태 머신이 하고,
//! `can_go_next`/`can_go_previous`만 같은 가드 함수로 미리 계산해 둡니다.

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::live::guards;
use crate::live::machine::{ActiveState, LiveCommand, LiveSnapshot, LiveState};
use crate::models::{AnswerList, Question, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSessionView {
    pub is_loading: bool,
    pub is_scheduled: bool,
    pub is_lobby: bool,
    pub is_active: bool,
    pub is_completed: bool,
    pub is_error: bool,
    pub is_exited: bool,
    pub is_navigating: bool,
    pub is_submitting: bool,

    pub session: Option<Session>,
    pub current_question: Option<Question>,
    pub current_question_index: usize,
    pub selected_answer: Option<usize>,
    pub my_answers: AnswerList,
    pub error: Option<String>,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

impl LiveSessionView {
    pub fn from_snapshot(snapshot: &LiveSnapshot) -> Self {
        let ctx = &snapshot.context;
        let state = snapshot.state;

        let current_question = ctx
            .session
            .as_ref()
            .and_then(|session| session.questions.get(ctx.current_question_index))
            .cloned();

        Self {
            is_loading: state == LiveState::Loading,
            is_scheduled: state == LiveState::Scheduled,
            is_lobby: state == LiveState::Lobby,
            is_active: matches!(state, LiveState::Active(_)),
            is_completed: state == LiveState::Completed,
            is_error: state == LiveState::Error,
            is_exited: state == LiveState::Exited,
            is_navigating: state == LiveState::Active(ActiveState::Navigating),
            is_submitting: state == LiveState::Active(ActiveState::SubmittingAnswer),
            session: ctx.session.clone(),
            current_question,
            current_question_index: ctx.current_question_index,
            selected_answer: ctx.selected_answer,
            my_answers: ctx.my_answers.clone(),
            error: ctx.error.clone(),
            can_go_next: guards::can_go_next(ctx),
            can_go_previous: guards::can_go_previous(ctx),
        }
    }
}

/// 라이브 세션 하나에 대한 핸들. 복제해도 같은 머신을 가리킵니다.
///
/// 모든 핸들이 drop되면 드라이버 태스크도 폴링을 멈추고 끝납니다.
#[derive(Clone)]
pub struct LiveSession {
    commands: mpsc::UnboundedSender<LiveCommand>,
    snapshots: watch::Receiver<LiveSnapshot>,
}

impl LiveSession {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<LiveCommand>,
        snapshots: watch::Receiver<LiveSnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshots,
        }
    }

    pub fn view(&self) -> LiveSessionView {
        LiveSessionView::from_snapshot(&self.snapshots.borrow())
    }

    /// 다음 전이가 공개될 때까지 기다립니다. 드라이버가 끝났으면 `false`.
    pub async fn changed(&mut self) -> bool {
        self.snapshots.changed().await.is_ok()
    }

    /// 조건을 만족하는 뷰가 나올 때까지 기다립니다 (현재 값부터 검사).
    /// 조건을 만족하기 전에 드라이버가 끝나면 `None`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&LiveSessionView) -> bool,
    ) -> Option<LiveSessionView> {
        let snapshot = self
            .snapshots
            .wait_for(|snapshot| predicate(&LiveSessionView::from_snapshot(snapshot)))
            .await
            .ok()?;
        Some(LiveSessionView::from_snapshot(&snapshot))
    }

    pub fn select_answer(&self, answer_index: usize) {
        self.dispatch(LiveCommand::SelectAnswer(answer_index));
    }

    pub fn next_question(&self) {
        self.dispatch(LiveCommand::NextQuestion);
    }

    pub fn previous_question(&self) {
        self.dispatch(LiveCommand::PreviousQuestion);
    }

    pub fn navigate_to_question(&self, question_index: usize) {
        self.dispatch(LiveCommand::NavigateToQuestion(question_index));
    }

    pub fn retry(&self) {
        self.dispatch(LiveCommand::Retry);
    }

    pub fn exit(&self) {
        self.dispatch(LiveCommand::Exit);
    }

    fn dispatch(&self, command: LiveCommand) {
        if self.commands.send(command).is_err() {
            debug!(?command, "Live session already finished, command dropped");
        }
    }
}
