//! Event System - 진단/라이프사이클 이벤트 발행/구독
//!
//! HookManager, PluginManager, ExtensionManager가 발생시키는 이벤트를
//! 외부 관찰자에게 전달합니다. 이벤트는 부수 효과일 뿐이며
//! 어떤 호출의 반환값에도 영향을 주지 않습니다.
//!
//! ## 사용법
//!
//! ```ignore
//! use formdown_foundation::event::EventEmitter;
//!
//! let emitter = EventEmitter::new();
//! let id = emitter.on("hook-registered", |payload| {
//!     println!("registered: {}", payload);
//! });
//!
//! emitter.emit("hook-registered", &serde_json::json!({ "name": "pre-parse" }));
//! emitter.off(id);
//! ```

pub mod emitter;

pub use emitter::{EventEmitter, Listener, ListenerId};
