//! # Injection Abstractions
//!
//! 依赖注入容器核心的服务接口层。
//!
//! ## 核心接口
//!
//! - [`Context`] - 上下文接口，每个作用域一个实现
//! - [`ContextualInstance`] - 上下文实例的存储形态
//! - [`BeanResolution`] - 类型安全解析接口
//! - [`ProxyHandle`] - 客户端代理契约

pub mod context;
pub mod proxy;
pub mod resolution;
pub mod store;

pub use context::*;
pub use proxy::*;
pub use resolution::*;
pub use store::*;
