//! 서버 검증 - 필드별 trailing debounce + 타임아웃
//!
//! 같은 필드에 대한 새 호출이 타이머 만료 전에 들어오면 이전 타이머를 취소하고
//! 이전 호출자는 `Error::Cancelled`를 받습니다. 이미 전송된 요청은 취소하지 않습니다.

use crate::types::{codes, ServerValidation, ValidationError, ValidationResult};
use async_trait::async_trait;
use formdown_core::FormData;
use formdown_foundation::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

// ============================================================================
// ServerValidator - 외부 협력자
// ============================================================================

/// 서버 검증 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRequest {
    pub endpoint: String,
    pub field: String,
    pub value: Value,
    pub form_data: FormData,
}

/// 서버 검증 전송 계층
///
/// `Err`는 전송 실패로 간주되어 `server_error` 코드로 변환됩니다.
#[async_trait]
pub trait ServerValidator: Send + Sync {
    async fn validate(&self, request: ServerRequest) -> Result<ValidationResult>;
}

// ============================================================================
// ServerDispatcher
// ============================================================================

type Reply = oneshot::Sender<Result<ValidationResult>>;

struct PendingCall {
    id: u64,
    timer: JoinHandle<()>,
    reply: Reply,
}

/// 디바운스 대기 중인 서버 호출 관리
pub(crate) struct ServerDispatcher {
    validator: Option<Arc<dyn ServerValidator>>,
    pending: Arc<Mutex<HashMap<String, PendingCall>>>,
    next_id: AtomicU64,
    debounce: Duration,
    timeout: Duration,
}

impl ServerDispatcher {
    pub(crate) fn new(debounce: Duration, timeout: Duration) -> Self {
        Self {
            validator: None,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            debounce,
            timeout,
        }
    }

    pub(crate) fn set_validator(&mut self, validator: Arc<dyn ServerValidator>) {
        self.validator = Some(validator);
    }

    /// 디바운스 후 서버 검증
    pub(crate) async fn dispatch(
        &self,
        field: &str,
        value: Value,
        form_data: FormData,
        config: &ServerValidation,
    ) -> Result<ValidationResult> {
        let validator = self
            .validator
            .clone()
            .ok_or_else(|| Error::Config("No server validator configured".to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let delay = config
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(self.debounce);
        let request = ServerRequest {
            endpoint: config.endpoint.clone(),
            field: field.to_string(),
            value,
            form_data,
        };

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if let Some(previous) = pending.remove(field) {
                trace!(field, id = previous.id, "Superseding pending server validation");
                previous.timer.abort();
                let _ = previous.reply.send(Err(Error::Cancelled));
            }

            let timer = tokio::spawn(fire(
                Arc::clone(&self.pending),
                validator,
                request,
                id,
                delay,
                self.timeout,
            ));
            pending.insert(
                field.to_string(),
                PendingCall {
                    id,
                    timer,
                    reply: tx,
                },
            );
        }

        rx.await.unwrap_or(Err(Error::Cancelled))
    }

    /// 대기 중인 타이머 수
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// 모든 대기 타이머 취소
    pub(crate) fn cancel_all(&self) {
        let drained: Vec<PendingCall> = self.pending.lock().drain().map(|(_, p)| p).collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "Cancelling pending server validations");
        }
        for call in drained {
            call.timer.abort();
            let _ = call.reply.send(Err(Error::Cancelled));
        }
    }
}

/// 타이머 만료 후 요청 전송
async fn fire(
    pending: Arc<Mutex<HashMap<String, PendingCall>>>,
    validator: Arc<dyn ServerValidator>,
    request: ServerRequest,
    id: u64,
    delay: Duration,
    timeout: Duration,
) {
    tokio::time::sleep(delay).await;

    let reply = {
        let mut pending = pending.lock();
        let current = pending.get(&request.field).map(|call| call.id) == Some(id);
        if current {
            pending.remove(&request.field).map(|call| call.reply)
        } else {
            None
        }
    };
    let Some(reply) = reply else {
        return;
    };

    let field = request.field.clone();
    let endpoint = request.endpoint.clone();
    let result = match tokio::time::timeout(timeout, validator.validate(request)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!(field = %field, endpoint = %endpoint, error = %e, "Server validation failed");
            ValidationResult::failure(ValidationError::new(
                &field,
                codes::SERVER_ERROR,
                format!("Server validation failed: {e}"),
            ))
        }
        Err(_) => {
            warn!(field = %field, timeout_ms = timeout.as_millis() as u64, "Server validation timed out");
            ValidationResult::failure(ValidationError::new(
                &field,
                codes::SERVER_TIMEOUT,
                "Server validation timed out",
            ))
        }
    };

    let _ = reply.send(Ok(result));
}
