//! # Injection Impl
//!
//! 依赖注入容器核心的具体实现：Bean 注册表、类型安全解析器、
//! 作用域上下文、上下文实例管理器、客户端代理与装饰管道。
//!
//! ## 核心组件
//!
//! - [`BeanRegistry`] - 不可变的 Bean 注册表（构建期校验定义错误）
//! - [`BeanResolver`] - 带结果缓存的类型安全解析器
//! - [`ContextRegistry`] - 作用域到上下文实现的映射
//! - [`ContextualInstanceManager`] - "取出或创建"编排与注入器实现
//! - [`ClientProxy`] - 普通作用域 Bean 的稳定转发句柄

pub mod construction;
pub mod contexts;
pub mod manager;
pub mod matcher;
pub mod pipeline;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod stats;

pub use contexts::{ApplicationContext, BoundContext, ContextRegistry, UnscopedContext};
pub use manager::{BeanHandle, ContextualInstanceManager};
pub use proxy::{as_proxy, ClientProxy, ClientProxyFactory};
pub use registry::BeanRegistry;
pub use resolver::BeanResolver;
pub use stats::ContainerStats;
