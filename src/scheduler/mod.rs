//! 아웃박스 릴레이
//! 즉시 발행에 실패한 이벤트를 주기적으로 다시 발행한다.
// region:    --- Imports
use crate::event_store::OutboxDispatcher;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error};

// endregion: --- Imports

// region:    --- Outbox Relay
/// 아웃박스 릴레이 스케줄러
pub struct OutboxRelay {
    dispatcher: Arc<OutboxDispatcher>,
    period: Duration,
}

/// 아웃박스 릴레이 생성
impl OutboxRelay {
    pub fn new(dispatcher: Arc<OutboxDispatcher>, period: Duration) -> Self {
        Self { dispatcher, period }
    }

    /// 아웃박스 릴레이 시작
    pub fn start(&self) -> JoinHandle<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match dispatcher.flush_pending().await {
                    Ok(count) => debug!("{:<12} --> 릴레이 완료: {}건", "Relay", count),
                    Err(e) => error!("{:<12} --> 릴레이 중 오류 발생: {:?}", "Relay", e),
                }
            }
        })
    }
}
// endregion: --- Outbox Relay
