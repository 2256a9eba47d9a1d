//! 倒计时驱动
//!
//! 同一时间只有一个计时任务；启动新任务前先取消旧任务，
//! 会话离开 Running 后任务自行结束，不会把已结束的会话“救活”

use crate::workflow::test_session::{TestSession, TickOutcome};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// 多处共享的会话句柄
pub type SharedSession = Arc<Mutex<TestSession>>;

pub fn shared(session: TestSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// 锁住会话（锁从不跨 await 持有）
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, TestSession> {
    session
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 倒计时任务
#[derive(Default)]
pub struct SessionTimer {
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动每秒一次的倒计时
    ///
    /// 必须在 tokio 运行时内调用，否则不启动并返回 `false`
    pub fn start(&mut self, session: SharedSession) -> bool {
        self.cancel();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("没有可用的 tokio 运行时，倒计时未启动: {}", e);
                return false;
            }
        };

        self.handle = Some(runtime.spawn(run_countdown(session)));
        debug!("倒计时任务已启动");
        true
    }

    /// 取消当前倒计时（没有时什么也不做）
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("倒计时任务已取消");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_countdown(session: SharedSession) {
    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

    loop {
        interval.tick().await;

        let outcome = lock_session(&session).tick();
        match outcome {
            TickOutcome::Counting(_) => continue,
            TickOutcome::AutoSubmitted(score) => {
                info!("⏰ 倒计时结束，得分 {}", score);
                break;
            }
            TickOutcome::Ignored => {
                debug!("会话已不在进行中，倒计时结束");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionInstance;
    use crate::workflow::test_session::SessionStatus;

    fn running_session(minutes: u32) -> SharedSession {
        let mut session = TestSession::new(minutes);
        session.load_questions(vec![QuestionInstance::new(0, "Calculate 50% of 200", "100")]);
        session.start(None);
        shared(session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_auto_submits() {
        let session = running_session(1);
        lock_session(&session).record_answer(0, "100");

        let mut timer = SessionTimer::new();
        assert!(timer.start(session.clone()));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(lock_session(&session).status(), SessionStatus::Running);

        tokio::time::sleep(Duration::from_secs(35)).await;
        let guard = lock_session(&session);
        assert_eq!(guard.status(), SessionStatus::Submitted);
        assert_eq!(guard.remaining_seconds(), 0);
        assert_eq!(guard.score(), 1);
        drop(guard);
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let session = running_session(1);
        let mut timer = SessionTimer::new();
        timer.start(session.clone());

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        timer.cancel();
        let remaining = lock_session(&session).remaining_seconds();
        assert_eq!(remaining, 50);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(lock_session(&session).remaining_seconds(), remaining);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_timer() {
        let session = running_session(2);
        let mut timer = SessionTimer::new();
        timer.start(session.clone());
        timer.start(session.clone());

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(lock_session(&session).remaining_seconds(), 115);
    }

    #[test]
    fn test_start_without_runtime_is_rejected() {
        let session = running_session(1);
        let mut timer = SessionTimer::new();
        assert!(!timer.start(session));
        assert!(!timer.is_active());
    }
}
