//! Type-Safe Wrappers Module
//!
//! 提供类型安全的包装器，将取值范围从注释提升到类型系统层面。
//!
//! ## 模块列表
//! - `quality`: 有损编码质量 (1-100)

pub mod quality;

pub use quality::{Quality, QualityError};
