//! # Injection Common
//!
//! 这个 crate 提供了 Lorn Inject 容器核心的公共数据模型与扩展 traits。
//!
//! ## 核心类型
//!
//! - [`BeanDescriptor`] - Bean 描述符（类型闭包、限定符、作用域、构建策略）
//! - [`TypeKey`] / [`Qualifier`] - 类型键与限定符
//! - [`ScopeId`] / [`ContextualKey`] - 作用域标识与上下文键
//! - [`Injector`] - 构建回调使用的注入器接口
//! - [`Decorator`] / [`MethodInterceptor`] - 横切包装扩展点
//!
//! ## 设计原则
//!
//! - 描述符在注册表构建后不可变
//! - 错误携带足够的结构化上下文（Bean 标识、作用域、限定符）
//! - 同步优先：线程是并发单位，不引入协作式调度

pub mod descriptor;
pub mod errors;
pub mod injection_point;
pub mod injector;
pub mod interceptor;
pub mod metadata;
pub mod qualifier;
pub mod scope;
pub mod typekey;

pub use descriptor::*;
pub use errors::*;
pub use injection_point::*;
pub use injector::*;
pub use interceptor::*;
pub use metadata::*;
pub use qualifier::*;
pub use scope::*;
pub use typekey::*;
