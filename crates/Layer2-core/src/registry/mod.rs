//! # Field Type Registry
//!
//! 필드 타입 이름 → 동작 묶음([`FieldTypePlugin`]) 매핑
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  FieldTypeRegistry                                    │
//! │  order: [text, email, ..., range, toggle]             │
//! │  ┌──────────┬──────────┬──────────┬──────────┐        │
//! │  │ parser   │ generator│ validator│ schema   │ ...    │
//! │  └──────────┴──────────┴──────────┴──────────┘        │
//! │  styles / scripts 캐시 (타입별)                        │
//! └──────────────────────────────────────────────────────┘
//! ```

mod field_registry;
mod field_type;

pub use field_registry::FieldTypeRegistry;
pub use field_type::{
    DataCheck, DataOperation, DataProcessor, FieldTypePlugin, GeneratorFn, ParserFn, SchemaFn,
    ValidatorFn,
};
