//! Driver + facade behaviour against a scripted in-process gateway.
//!
//! Every test runs with paused time so poll intervals and request timeouts
//! elapse instantly once all tasks are idle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use ensayo_live::error::GatewayError;
use ensayo_live::live::{spawn_live_session, LiveSessionOptions, Preview, SessionGateway};
use ensayo_live::models::{
    AnswerList, LoadSessionResponse, Question, QuestionIndexPayload, Session, SessionStatus,
    SubmitAnswerResponse,
};

struct Remote {
    status: SessionStatus,
    question_count: usize,
    answers: AnswerList,
    current_question_index: usize,
    failing_loads: usize,
}

struct ScriptedGateway {
    remote: Mutex<Remote>,
    load_calls: AtomicUsize,
    index_updates: AtomicUsize,
    submit_gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    fn new(status: SessionStatus, question_count: usize) -> Self {
        Self {
            remote: Mutex::new(Remote {
                status,
                question_count,
                answers: vec![None; question_count],
                current_question_index: 0,
                failing_loads: 0,
            }),
            load_calls: AtomicUsize::new(0),
            index_updates: AtomicUsize::new(0),
            submit_gate: None,
        }
    }

    fn with_index(self, index: usize) -> Self {
        self.remote.lock().unwrap().current_question_index = index;
        self
    }

    fn failing_first(self, loads: usize) -> Self {
        self.remote.lock().unwrap().failing_loads = loads;
        self
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.submit_gate = Some(gate);
        self
    }

    fn set_status(&self, status: SessionStatus) {
        self.remote.lock().unwrap().status = status;
    }

    fn loads(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    fn remote_index(&self) -> usize {
        self.remote.lock().unwrap().current_question_index
    }
}

#[async_trait]
impl SessionGateway for ScriptedGateway {
    async fn load_session(&self, session_id: &str) -> Result<LoadSessionResponse, GatewayError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let mut remote = self.remote.lock().unwrap();
        if remote.failing_loads > 0 {
            remote.failing_loads -= 1;
            return Err(GatewayError::Network("connection refused".into()));
        }

        let session = Session {
            id: session_id.to_string(),
            title: "Ensayo PAES Matemática".into(),
            status: remote.status,
            scheduled_start: 1_700_000_000_000,
            questions: (0..remote.question_count)
                .map(|i| Question {
                    id: format!("q{i}"),
                    prompt: format!("Pregunta {i}"),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                })
                .collect(),
        };
        let (answers, current_question_index) = if remote.status.has_participation() {
            (remote.answers.clone(), remote.current_question_index)
        } else {
            (Vec::new(), 0)
        };
        Ok(LoadSessionResponse {
            session,
            answers,
            current_question_index,
        })
    }

    async fn submit_answer(
        &self,
        _session_id: &str,
        question_index: usize,
        answer_index: usize,
    ) -> Result<SubmitAnswerResponse, GatewayError> {
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        let mut remote = self.remote.lock().unwrap();
        remote.answers[question_index] = Some(answer_index);
        Ok(SubmitAnswerResponse {
            answers: remote.answers.clone(),
        })
    }

    async fn update_current_question_index(
        &self,
        _session_id: &str,
        question_index: usize,
    ) -> Result<QuestionIndexPayload, GatewayError> {
        self.index_updates.fetch_add(1, Ordering::SeqCst);
        self.remote.lock().unwrap().current_question_index = question_index;
        Ok(QuestionIndexPayload { question_index })
    }
}

#[tokio::test(start_paused = true)]
async fn scheduled_session_then_exit_is_terminal() {
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Scheduled, 3));
    let mut live = spawn_live_session(gateway.clone(), "s1", LiveSessionOptions::default());

    let view = live.wait_for(|v| !v.is_loading).await.unwrap();
    assert!(view.is_scheduled);
    assert!(!view.is_lobby && !view.is_active && !view.is_completed);
    assert_eq!(view.session.unwrap().title, "Ensayo PAES Matemática");

    live.exit();
    let view = live.wait_for(|v| v.is_exited).await.unwrap();
    assert!(!view.is_scheduled);

    // Nothing revives an exited session, and polling is gone.
    let loads = gateway.loads();
    live.retry();
    live.next_question();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(gateway.loads(), loads);
    assert!(live.view().is_exited);
}

#[tokio::test(start_paused = true)]
async fn selected_answer_shows_before_the_server_confirms() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Active, 3).gated(gate.clone()));
    let mut live = spawn_live_session(gateway.clone(), "s1", LiveSessionOptions::default());

    live.wait_for(|v| v.is_active).await.unwrap();
    live.select_answer(2);

    let view = live.wait_for(|v| v.is_submitting).await.unwrap();
    assert_eq!(view.selected_answer, Some(2));
    assert_eq!(view.my_answers, vec![None, None, None]);

    gate.notify_one();
    let view = live
        .wait_for(|v| v.is_active && !v.is_submitting && v.my_answers[0].is_some())
        .await
        .unwrap();
    assert_eq!(view.my_answers, vec![Some(2), None, None]);
    assert_eq!(view.selected_answer, Some(2));
}

#[tokio::test(start_paused = true)]
async fn next_question_on_last_question_does_nothing() {
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Active, 3).with_index(2));
    let mut live = spawn_live_session(gateway.clone(), "s1", LiveSessionOptions::default());

    let view = live.wait_for(|v| v.is_active).await.unwrap();
    assert_eq!(view.current_question_index, 2);
    assert!(!view.can_go_next && view.can_go_previous);

    live.next_question();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let view = live.view();
    assert_eq!(view.current_question_index, 2);
    assert!(!view.is_navigating);
    assert_eq!(gateway.index_updates.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_load_recovers_through_retry() {
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Lobby, 3).failing_first(1));
    let mut live = spawn_live_session(gateway.clone(), "s1", LiveSessionOptions::default());

    let view = live.wait_for(|v| v.is_error).await.unwrap();
    assert!(view.error.unwrap().contains("connection refused"));

    live.retry();
    let view = live.wait_for(|v| v.is_lobby).await.unwrap();
    assert!(view.error.is_none());
    assert_eq!(gateway.loads(), 2);
}

#[tokio::test(start_paused = true)]
async fn polling_follows_the_server_and_keeps_local_position() {
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Lobby, 4));
    let mut live = spawn_live_session(gateway.clone(), "s1", LiveSessionOptions::default());

    live.wait_for(|v| v.is_lobby).await.unwrap();

    gateway.set_status(SessionStatus::Active);
    let view = live.wait_for(|v| v.is_active).await.unwrap();
    assert_eq!(view.my_answers.len(), 4);

    live.navigate_to_question(3);
    let view = live
        .wait_for(|v| v.is_active && !v.is_navigating && v.current_question_index == 3)
        .await
        .unwrap();
    assert!(!view.can_go_next);
    assert_eq!(gateway.remote_index(), 3);

    gateway.set_status(SessionStatus::Completed);
    let view = live.wait_for(|v| v.is_completed).await.unwrap();
    assert_eq!(view.current_question_index, 3);
}

#[tokio::test(start_paused = true)]
async fn preview_never_polls() {
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Active, 3));
    let options = LiveSessionOptions::default().with_preview(Preview {
        state: Some(SessionStatus::Completed),
    });
    let mut live = spawn_live_session(gateway.clone(), "s1", options);

    live.wait_for(|v| !v.is_loading).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let view = live.view();
    assert!(view.is_completed);
    assert_eq!(gateway.loads(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_polling() {
    let gateway = Arc::new(ScriptedGateway::new(SessionStatus::Lobby, 2));
    let mut live = spawn_live_session(gateway.clone(), "s1", LiveSessionOptions::default());
    let observer = live.clone();

    live.wait_for(|v| v.is_lobby).await.unwrap();
    tokio::time::sleep(Duration::from_millis(4500)).await;
    let loads = gateway.loads();
    assert!(loads >= 2);

    drop(live);
    drop(observer);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(gateway.loads(), loads);
}
