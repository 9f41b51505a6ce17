//! # 라이브 세션 상태 머신
//!
//! 한 참가자가 보고 있는 라이브 세션 하나의 라이프사이클, 문항 이동, 답안 제출을
//! 관리하는 계층형 유한 상태 머신입니다.
//!
//! 이 모듈은 **순수 로직**만 담고 있습니다. 네트워크 호출이나 타이머를 직접 다루지 않고,
//! 전이 결과로 "해야 할 일"(`Effect`)을 돌려줍니다. 실제 실행은 `driver`가 맡습니다.
//!
//! ## 상태 구조
//! ```text
//! Loading ──ok──→ (determine_state) ─┬→ Scheduled ┐
//!    │                                ├→ Lobby     │  폴링으로 상태가 바뀌면
//!    └─err─→ Error ──Retry──→ Loading ├→ Active    │  다시 determine_state
//!                                     ├→ Completed ┘
//!                                     └→ Error (알 수 없는 상태)
//! Active = Idle | Navigating | SubmittingAnswer
//! 어느 상태에서든 Exit → Exited (종료, 이후 이벤트 무시)
//! ```
//!
//! ## 비동기 완료 이벤트
//! `Loading`, `Navigating`, `SubmittingAnswer`는 각각 하나의 게이트웨이 호출을 기다립니다.
//! 호출마다 `ticket`을 발급하고, 완료 이벤트의 ticket이 지금 기다리는 것과 다르면 버립니다.
//! 폴링 결과는 단계(phase)마다 바뀌는 `epoch`로 같은 방식으로 걸러냅니다.

use crate::error::GatewayError;
use crate::live::guards;
use crate::models::{AnswerList, LoadSessionResponse, Session, SessionStatus};
use tracing::{debug, warn};

/// `Active` 상태 안의 하위 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveState {
    /// 이동/답안 선택을 받을 수 있는 기본 상태
    Idle,
    /// 바뀐 문항 위치를 서버에 저장하는 중
    Navigating,
    /// 선택한 답안을 서버에 제출하는 중
    SubmittingAnswer,
}

/// 최상위 상태. 항상 정확히 하나만 활성화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Loading,
    Scheduled,
    Lobby,
    Active(ActiveState),
    Completed,
    Error,
    Exited,
}

impl LiveState {
    /// 이 단계에 머무는 동안 서버를 주기적으로 다시 조회하는지 여부
    pub fn is_polling_phase(&self) -> bool {
        matches!(
            self,
            LiveState::Scheduled | LiveState::Lobby | LiveState::Active(_) | LiveState::Completed
        )
    }

    /// 하위 상태를 무시하고 같은 최상위 단계인지 비교합니다.
    pub fn same_phase(&self, other: &LiveState) -> bool {
        match (self, other) {
            (LiveState::Active(_), LiveState::Active(_)) => true,
            (a, b) => a == b,
        }
    }
}

/// 미리보기(관리자/테스트용) 설정
///
/// 미리보기 모드에서는 폴링이 완전히 꺼지고,
/// `state`가 있으면 단계 판별이 서버 상태 대신 이 값을 따릅니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preview {
    pub state: Option<SessionStatus>,
}

/// 상태 머신이 단독으로 소유하는 작업 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveContext {
    pub session_id: String,
    pub session: Option<Session>,
    pub current_question_index: usize,
    /// 항상 `my_answers[current_question_index]`를 따라가며, 답안 선택 시에는 먼저(낙관적으로) 바뀝니다.
    pub selected_answer: Option<usize>,
    pub my_answers: AnswerList,
    /// 최초 로딩 실패(또는 판별 불가 상태)일 때만 채워집니다.
    pub error: Option<String>,
    pub preview_mode: bool,
    pub preview_state: Option<SessionStatus>,
}

impl LiveContext {
    pub fn new(session_id: impl Into<String>, preview: Option<Preview>) -> Self {
        Self {
            session_id: session_id.into(),
            session: None,
            current_question_index: 0,
            selected_answer: None,
            my_answers: Vec::new(),
            error: None,
            preview_mode: preview.is_some(),
            preview_state: preview.and_then(|p| p.state),
        }
    }

    /// 단계 판별에 실제로 쓰이는 상태 (미리보기 값이 우선)
    fn effective_status(&self) -> Option<SessionStatus> {
        match (self.preview_mode, self.preview_state) {
            (true, Some(forced)) => Some(forced),
            _ => self.session.as_ref().map(|s| s.status),
        }
    }
}

/// 사용자(뷰)가 보낼 수 있는 명령
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveCommand {
    NextQuestion,
    PreviousQuestion,
    NavigateToQuestion(usize),
    SelectAnswer(usize),
    Retry,
    Exit,
}

/// 상태 머신에 들어오는 모든 이벤트: 사용자 명령 + 게이트웨이 호출 완료
#[derive(Debug)]
pub enum LiveEvent {
    Command(LiveCommand),
    Loaded {
        ticket: u64,
        result: Result<LoadSessionResponse, GatewayError>,
    },
    Polled {
        epoch: u64,
        result: Result<LoadSessionResponse, GatewayError>,
    },
    IndexPersisted {
        ticket: u64,
        result: Result<usize, GatewayError>,
    },
    AnswerSubmitted {
        ticket: u64,
        result: Result<AnswerList, GatewayError>,
    },
}

impl From<LiveCommand> for LiveEvent {
    fn from(command: LiveCommand) -> Self {
        LiveEvent::Command(command)
    }
}

/// 전이 결과로 드라이버가 수행해야 할 일
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    LoadSession {
        ticket: u64,
    },
    StartPolling {
        epoch: u64,
    },
    StopPolling,
    PersistQuestionIndex {
        ticket: u64,
        question_index: usize,
    },
    SubmitAnswer {
        ticket: u64,
        question_index: usize,
        answer_index: usize,
    },
}

/// 뷰에 공개되는 시점별 사본
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSnapshot {
    pub state: LiveState,
    pub context: LiveContext,
}

/// 단계 판별(라우터). 부수 효과 없이 scheduled → lobby → active → completed 순서로
/// 검사하고 처음 맞는 단계를 고릅니다. 아무것도 맞지 않으면 `Error`입니다.
pub fn determine_state(ctx: &LiveContext) -> LiveState {
    if guards::is_scheduled(ctx) {
        LiveState::Scheduled
    } else if guards::is_lobby(ctx) {
        LiveState::Lobby
    } else if guards::is_active(ctx) {
        LiveState::Active(ActiveState::Idle)
    } else if guards::is_completed(ctx) {
        LiveState::Completed
    } else {
        LiveState::Error
    }
}

fn unroutable_message(ctx: &LiveContext) -> String {
    match ctx.effective_status() {
        Some(SessionStatus::Cancelled) => format!("session {} was cancelled", ctx.session_id),
        Some(status) => format!(
            "session {} reported an unsupported status: {}",
            ctx.session_id,
            status.as_str()
        ),
        None => format!("session {} has no data", ctx.session_id),
    }
}

/// 서버 답안 목록을 문항 수에 맞춥니다 (부족하면 `None`으로 채우고, 넘치면 자름).
fn fit_answers(mut answers: AnswerList, question_count: usize) -> AnswerList {
    answers.resize(question_count, None);
    answers
}

fn clamp_index(index: usize, question_count: usize) -> usize {
    index.min(question_count.saturating_sub(1))
}

pub struct LiveSessionMachine {
    state: LiveState,
    context: LiveContext,
    /// 현재 상태가 기다리는 게이트웨이 호출의 ticket
    pending: Option<u64>,
    next_ticket: u64,
    epoch: u64,
}

impl LiveSessionMachine {
    pub fn new(session_id: impl Into<String>, preview: Option<Preview>) -> Self {
        Self {
            state: LiveState::Loading,
            context: LiveContext::new(session_id, preview),
            pending: None,
            next_ticket: 0,
            epoch: 0,
        }
    }

    pub fn state(&self) -> LiveState {
        self.state
    }

    pub fn context(&self) -> &LiveContext {
        &self.context
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            state: self.state,
            context: self.context.clone(),
        }
    }

    /// 최초 로딩을 시작합니다. 두 번째 호출부터는 아무 일도 하지 않습니다.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.state != LiveState::Loading || self.pending.is_some() {
            return Vec::new();
        }
        let ticket = self.issue_ticket();
        vec![Effect::LoadSession { ticket }]
    }

    /// 이벤트 하나를 처리하고, 그 결과로 수행할 일을 돌려줍니다.
    pub fn send(&mut self, event: impl Into<LiveEvent>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state == LiveState::Exited {
            return effects;
        }

        let before = self.state;
        match event.into() {
            LiveEvent::Command(command) => self.on_command(command, &mut effects),
            LiveEvent::Loaded { ticket, result } => self.on_loaded(ticket, result),
            LiveEvent::Polled { epoch, result } => self.on_polled(epoch, result),
            LiveEvent::IndexPersisted { ticket, result } => self.on_index_persisted(ticket, result),
            LiveEvent::AnswerSubmitted { ticket, result } => {
                self.on_answer_submitted(ticket, result)
            }
        }
        self.settle(before, &mut effects);
        effects
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.pending = Some(self.next_ticket);
        self.next_ticket
    }

    fn is_waiting_for(&self, expected: LiveState, ticket: u64) -> bool {
        self.state == expected && self.pending == Some(ticket)
    }

    fn on_command(&mut self, command: LiveCommand, effects: &mut Vec<Effect>) {
        let idle = self.state == LiveState::Active(ActiveState::Idle);
        let index = self.context.current_question_index;

        match command {
            LiveCommand::Exit => self.state = LiveState::Exited,
            LiveCommand::Retry => {
                if self.state == LiveState::Error {
                    self.context.error = None;
                    self.state = LiveState::Loading;
                    let ticket = self.issue_ticket();
                    effects.push(Effect::LoadSession { ticket });
                }
            }
            LiveCommand::NextQuestion => {
                if idle && guards::can_go_next(&self.context) {
                    self.navigate_to(index + 1, effects);
                }
            }
            LiveCommand::PreviousQuestion => {
                if idle && guards::can_go_previous(&self.context) {
                    self.navigate_to(index - 1, effects);
                }
            }
            LiveCommand::NavigateToQuestion(target) => {
                if idle && guards::is_valid_question_index(&self.context, target) {
                    self.navigate_to(target, effects);
                }
            }
            LiveCommand::SelectAnswer(answer_index) => {
                if idle {
                    // 네트워크 응답 전에 먼저 반영
                    self.context.selected_answer = Some(answer_index);
                    self.state = LiveState::Active(ActiveState::SubmittingAnswer);
                    let ticket = self.issue_ticket();
                    effects.push(Effect::SubmitAnswer {
                        ticket,
                        question_index: index,
                        answer_index,
                    });
                }
            }
        }
    }

    fn navigate_to(&mut self, question_index: usize, effects: &mut Vec<Effect>) {
        self.context.current_question_index = question_index;
        self.context.selected_answer = self
            .context
            .my_answers
            .get(question_index)
            .copied()
            .flatten();
        self.state = LiveState::Active(ActiveState::Navigating);
        let ticket = self.issue_ticket();
        effects.push(Effect::PersistQuestionIndex {
            ticket,
            question_index,
        });
    }

    fn on_loaded(&mut self, ticket: u64, result: Result<LoadSessionResponse, GatewayError>) {
        if !self.is_waiting_for(LiveState::Loading, ticket) {
            return;
        }
        self.pending = None;

        match result {
            Ok(loaded) => {
                let count = loaded.session.questions.len();
                let index = clamp_index(loaded.current_question_index, count);
                self.context.my_answers = fit_answers(loaded.answers, count);
                self.context.current_question_index = index;
                self.context.selected_answer = self.context.my_answers.get(index).copied().flatten();
                self.context.session = Some(loaded.session);
                self.context.error = None;
                self.route();
            }
            Err(e) => {
                warn!(session_id = %self.context.session_id, error = %e, "Live session load failed");
                self.context.error = Some(e.to_string());
                self.state = LiveState::Error;
            }
        }
    }

    fn on_polled(&mut self, epoch: u64, result: Result<LoadSessionResponse, GatewayError>) {
        if epoch != self.epoch || !self.state.is_polling_phase() {
            return;
        }

        match result {
            Ok(polled) => {
                // 서버 답안이 우선, 현재 위치와 선택은 유지
                let count = polled.session.questions.len();
                self.context.my_answers = fit_answers(polled.answers, count);
                if count > 0 {
                    self.context.current_question_index =
                        clamp_index(self.context.current_question_index, count);
                }
                self.context.session = Some(polled.session);

                let next = determine_state(&self.context);
                if !next.same_phase(&self.state) {
                    self.enter(next);
                }
            }
            Err(e) => {
                warn!(session_id = %self.context.session_id, error = %e, "Live session poll failed");
            }
        }
    }

    fn on_index_persisted(&mut self, ticket: u64, result: Result<usize, GatewayError>) {
        if !self.is_waiting_for(LiveState::Active(ActiveState::Navigating), ticket) {
            return;
        }
        self.pending = None;
        if let Err(e) = result {
            warn!(
                session_id = %self.context.session_id,
                question_index = self.context.current_question_index,
                error = %e,
                "Failed to persist current question index"
            );
        }
        self.state = LiveState::Active(ActiveState::Idle);
    }

    fn on_answer_submitted(&mut self, ticket: u64, result: Result<AnswerList, GatewayError>) {
        if !self.is_waiting_for(LiveState::Active(ActiveState::SubmittingAnswer), ticket) {
            return;
        }
        self.pending = None;
        match result {
            Ok(answers) => {
                let count = guards::question_count(&self.context);
                self.context.my_answers = fit_answers(answers, count);
            }
            // 낙관적으로 바꾼 선택은 되돌리지 않음 (다시 선택하면 재제출)
            Err(e) => warn!(
                session_id = %self.context.session_id,
                question_index = self.context.current_question_index,
                error = %e,
                "Failed to submit answer"
            ),
        }
        self.state = LiveState::Active(ActiveState::Idle);
    }

    fn route(&mut self) {
        let next = determine_state(&self.context);
        self.enter(next);
    }

    fn enter(&mut self, next: LiveState) {
        if next == LiveState::Error {
            self.context.error = Some(unroutable_message(&self.context));
        }
        self.state = next;
    }

    /// 최상위 단계가 바뀌었으면 폴링을 정리/시작하고 epoch를 올립니다.
    fn settle(&mut self, before: LiveState, effects: &mut Vec<Effect>) {
        if before.same_phase(&self.state) {
            if before != self.state {
                debug!(session_id = %self.context.session_id, from = ?before, to = ?self.state, "Live session substate changed");
            }
            return;
        }

        if self.state != LiveState::Loading {
            self.pending = None;
        }
        let polls = !self.context.preview_mode;
        if polls && before.is_polling_phase() {
            effects.push(Effect::StopPolling);
        }
        self.epoch += 1;
        if polls && self.state.is_polling_phase() {
            effects.push(Effect::StartPolling { epoch: self.epoch });
        }
        debug!(session_id = %self.context.session_id, from = ?before, to = ?self.state, "Live session phase changed");
    }
}
