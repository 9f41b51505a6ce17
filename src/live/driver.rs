//! # 라이브 세션 드라이버
//!
//! 상태 머신 하나를 소유하는 tokio 태스크입니다.
//!
//! - 뷰의 명령(`LiveCommand`)과 게이트웨이 호출 완료 이벤트를 **한 번에 하나씩** 머신에 넣습니다.
//! - 머신이 돌려준 `Effect`를 실행합니다 (게이트웨이 호출은 각각 별도 태스크).
//! - 폴링 태스크는 단계마다 하나만 살아 있고, 단계를 벗어나거나 종료하면 abort됩니다.
//! - 전이가 끝날 때마다 스냅샷을 `watch` 채널로 공개합니다.
//!
//! 머신 상태를 바꾸는 경로가 이 태스크 하나뿐이므로 락이 필요 없습니다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{ClientConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::error::GatewayError;
use crate::live::facade::LiveSession;
use crate::live::gateway::SessionGateway;
use crate::live::machine::{
    Effect, LiveCommand, LiveEvent, LiveSessionMachine, LiveSnapshot, LiveState, Preview,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSessionOptions {
    /// 폴링 응답을 받은 뒤 다음 조회까지 기다리는 시간
    pub poll_interval: Duration,
    /// 게이트웨이 호출 하나의 제한 시간
    pub request_timeout: Duration,
    pub preview: Option<Preview>,
}

impl Default for LiveSessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            preview: None,
        }
    }
}

impl From<&ClientConfig> for LiveSessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            request_timeout: config.request_timeout,
            preview: None,
        }
    }
}

impl LiveSessionOptions {
    pub fn with_preview(mut self, preview: Preview) -> Self {
        self.preview = Some(preview);
        self
    }
}

/// 세션 하나(뷰 하나)당 머신 하나를 띄우고, 그 머신을 조작하는 핸들을 돌려줍니다.
///
/// tokio 런타임 안에서 호출해야 합니다.
pub fn spawn_live_session(
    gateway: Arc<dyn SessionGateway>,
    session_id: impl Into<String>,
    options: LiveSessionOptions,
) -> LiveSession {
    let machine = LiveSessionMachine::new(session_id, options.preview);
    let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();

    info!(
        session_id = %machine.context().session_id,
        preview = machine.context().preview_mode,
        "Starting live session"
    );

    let driver = Driver {
        machine,
        gateway,
        options,
        completions: completion_tx,
        snapshots: snapshot_tx,
        poller: None,
    };
    tokio::spawn(driver.run(command_rx, completion_rx));

    LiveSession::new(command_tx, snapshot_rx)
}

struct Driver {
    machine: LiveSessionMachine,
    gateway: Arc<dyn SessionGateway>,
    options: LiveSessionOptions,
    completions: mpsc::UnboundedSender<LiveEvent>,
    snapshots: watch::Sender<LiveSnapshot>,
    poller: Option<JoinHandle<()>>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<LiveCommand>,
        mut completions: mpsc::UnboundedReceiver<LiveEvent>,
    ) {
        let effects = self.machine.start();
        self.execute(effects);

        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => LiveEvent::Command(command),
                    None => {
                        debug!(session_id = %self.session_id(), "All live session handles dropped");
                        break;
                    }
                },
                Some(event) = completions.recv() => event,
            };

            let effects = self.machine.send(event);
            self.execute(effects);
            self.publish();

            if self.machine.state() == LiveState::Exited {
                debug!(session_id = %self.session_id(), "Live session exited");
                break;
            }
        }
    }

    fn session_id(&self) -> String {
        self.machine.context().session_id.clone()
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadSession { ticket } => {
                    let gateway = Arc::clone(&self.gateway);
                    let session_id = self.session_id();
                    let limit = self.options.request_timeout;
                    let tx = self.completions.clone();
                    tokio::spawn(async move {
                        let result = with_timeout(limit, gateway.load_session(&session_id)).await;
                        let _ = tx.send(LiveEvent::Loaded { ticket, result });
                    });
                }
                Effect::PersistQuestionIndex {
                    ticket,
                    question_index,
                } => {
                    let gateway = Arc::clone(&self.gateway);
                    let session_id = self.session_id();
                    let limit = self.options.request_timeout;
                    let tx = self.completions.clone();
                    tokio::spawn(async move {
                        let result = with_timeout(
                            limit,
                            gateway.update_current_question_index(&session_id, question_index),
                        )
                        .await
                        .map(|saved| saved.question_index);
                        let _ = tx.send(LiveEvent::IndexPersisted { ticket, result });
                    });
                }
                Effect::SubmitAnswer {
                    ticket,
                    question_index,
                    answer_index,
                } => {
                    let gateway = Arc::clone(&self.gateway);
                    let session_id = self.session_id();
                    let limit = self.options.request_timeout;
                    let tx = self.completions.clone();
                    tokio::spawn(async move {
                        let result = with_timeout(
                            limit,
                            gateway.submit_answer(&session_id, question_index, answer_index),
                        )
                        .await
                        .map(|submitted| submitted.answers);
                        let _ = tx.send(LiveEvent::AnswerSubmitted { ticket, result });
                    });
                }
                Effect::StartPolling { epoch } => {
                    self.stop_polling();
                    let handle = tokio::spawn(poll_loop(
                        Arc::clone(&self.gateway),
                        self.session_id(),
                        self.options.poll_interval,
                        self.options.request_timeout,
                        epoch,
                        self.completions.clone(),
                    ));
                    self.poller = Some(handle);
                }
                Effect::StopPolling => self.stop_polling(),
            }
        }
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// 일정한 간격으로 세션을 다시 조회합니다. 간격은 직전 응답을 받은 시점부터 잽니다.
async fn poll_loop(
    gateway: Arc<dyn SessionGateway>,
    session_id: String,
    interval: Duration,
    limit: Duration,
    epoch: u64,
    tx: mpsc::UnboundedSender<LiveEvent>,
) {
    loop {
        tokio::time::sleep(interval).await;
        let result = with_timeout(limit, gateway.load_session(&session_id)).await;
        if tx.send(LiveEvent::Polled { epoch, result }).is_err() {
            break;
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(GatewayError::Timeout(limit)))
}
