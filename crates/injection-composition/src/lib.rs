//! # Injection Composition
//!
//! 这个 crate 是依赖注入容器的组合层，负责把注册表、解析器、
//! 上下文与实例管理器组装成一个完整的、可运行的容器。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用构建者模式收集描述符与上下文并完成引导
//! - **容器门面**: 解析、作用域生命周期信号、统计与关闭入口
//! - **全局持有者**: 进程级只读的容器访问点
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use injection_common::{
//!     bean_instance, BeanDescriptor, ConstructionStrategy, QualifierSet, ScopeId, TypeKey,
//! };
//! use injection_composition::ContainerBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 创建并配置容器
//!     let container = ContainerBuilder::standard()
//!         .register_bean(BeanDescriptor::new(
//!             TypeKey::new("app::Config"),
//!             ScopeId::singleton(),
//!             ConstructionStrategy::constructor(|_| {
//!                 Ok(bean_instance(String::from("production")))
//!             }),
//!         ))
//!         .build()?;
//!
//!     // 解析并使用 Bean
//!     let handle = container.instance(&TypeKey::new("app::Config"), &QualifierSet::new())?;
//!     let config = handle.get_of::<String>()?;
//!     println!("当前配置: {}", config);
//!
//!     // 关闭容器
//!     container.shutdown();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod container;
pub mod global;

// 重新导出主要类型
pub use builder::ContainerBuilder;
pub use config::ContainerConfig;
pub use container::Container;
pub use global::{clear_global_container, get_global_container, set_global_container};

// 重新导出错误类型
pub use injection_common::ContainerError;
