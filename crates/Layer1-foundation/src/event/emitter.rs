//! Event Emitter - 최소한의 동기 pub/sub

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

// ============================================================================
// ListenerId
// ============================================================================

/// 이벤트 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 리스너 콜백 타입
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// 등록된 리스너 정보
struct RegisteredListener {
    id: ListenerId,
    listener: Listener,
    once: bool,
}

// ============================================================================
// EventEmitter
// ============================================================================

/// 이벤트 이미터
///
/// 리스너는 구독 순서대로 호출됩니다. 발행 중에는 락을 잡지 않으므로
/// 리스너 안에서 `on`/`off`를 호출해도 안전합니다.
pub struct EventEmitter {
    /// 이벤트 이름별 리스너
    listeners: RwLock<HashMap<String, Vec<RegisteredListener>>>,

    /// 리스너 ID 카운터
    counter: AtomicU64,

    /// 발행된 이벤트 수
    emitted: AtomicU64,
}

impl EventEmitter {
    /// 새 이미터 생성
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
        }
    }

    /// 리스너 등록
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe(event.into(), Arc::new(listener), false)
    }

    /// 한 번만 호출되는 리스너 등록
    pub fn once<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe(event.into(), Arc::new(listener), true)
    }

    fn subscribe(&self, event: String, listener: Listener, once: bool) -> ListenerId {
        let id = ListenerId(self.counter.fetch_add(1, Ordering::SeqCst));
        trace!(event = %event, listener_id = %id, "Registering event listener");

        let mut listeners = self.listeners.write();
        listeners.entry(event).or_default().push(RegisteredListener {
            id,
            listener,
            once,
        });
        id
    }

    /// 리스너 해제
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let mut removed = false;
        for bucket in listeners.values_mut() {
            let before = bucket.len();
            bucket.retain(|l| l.id != id);
            removed |= bucket.len() != before;
        }
        listeners.retain(|_, bucket| !bucket.is_empty());
        removed
    }

    /// 이벤트 발행
    ///
    /// 호출된 리스너 수를 반환합니다.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        self.emitted.fetch_add(1, Ordering::SeqCst);

        let snapshot: Vec<Listener> = {
            let mut listeners = self.listeners.write();
            let Some(bucket) = listeners.get_mut(event) else {
                trace!(event = event, "Event emitted with no listeners");
                return 0;
            };
            let snapshot = bucket.iter().map(|l| Arc::clone(&l.listener)).collect();
            bucket.retain(|l| !l.once);
            if bucket.is_empty() {
                listeners.remove(event);
            }
            snapshot
        };

        trace!(event = event, listeners = snapshot.len(), "Emitting event");

        for listener in &snapshot {
            listener(payload);
        }
        snapshot.len()
    }

    /// 특정 이벤트의 리스너 수
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map(|b| b.len()).unwrap_or(0)
    }

    /// 리스너 전체 또는 특정 이벤트의 리스너 제거
    pub fn remove_all(&self, event: Option<&str>) {
        let mut listeners = self.listeners.write();
        match event {
            Some(name) => {
                listeners.remove(name);
            }
            None => listeners.clear(),
        }
    }

    /// 총 발행된 이벤트 수
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::SeqCst)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read();
        f.debug_struct("EventEmitter")
            .field("events", &listeners.keys().collect::<Vec<_>>())
            .field("emitted", &self.emitted_count())
            .finish()
    }
}

// ============================================================================
// 테스트
// ============================================================================
