//! 容器构建器
//!
//! 负责协调引导步骤：收集描述符与上下文、构建注册表并校验
//! 定义错误、激活单例上下文、预创建客户端代理

use crate::config::ContainerConfig;
use crate::container::Container;
use injection_abstractions::Context;
use injection_common::{
    BeanDescriptor, ContainerResult, ContextualKey, ScopeId, ScopeKind,
};
use injection_impl::{
    ApplicationContext, BeanRegistry, BeanResolver, BoundContext, ContextRegistry,
    ContextualInstanceManager, UnscopedContext,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 容器构建器
pub struct ContainerBuilder {
    config: ContainerConfig,
    descriptors: Vec<BeanDescriptor>,
    contexts: ContextRegistry,
}

impl ContainerBuilder {
    /// 创建空的构建器（不带任何上下文）
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            descriptors: Vec::new(),
            contexts: ContextRegistry::new(),
        }
    }

    /// 创建带全部内置上下文的构建器
    pub fn standard() -> Self {
        Self::new().with_standard_contexts()
    }

    /// 设置容器配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册 Bean 描述符
    pub fn register_bean(mut self, descriptor: BeanDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// 批量注册 Bean 描述符
    pub fn register_beans(
        mut self,
        descriptors: impl IntoIterator<Item = BeanDescriptor>,
    ) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// 注册上下文实现
    pub fn register_context(mut self, context: Arc<dyn Context>) -> Self {
        self.contexts.register(context);
        self
    }

    /// 注册全部内置上下文（单例、请求、依赖）
    pub fn with_standard_contexts(mut self) -> Self {
        self.contexts.register(Arc::new(ApplicationContext::new()));
        self.contexts
            .register(Arc::new(BoundContext::new(ScopeId::request())));
        self.contexts.register(Arc::new(UnscopedContext::new()));
        self
    }

    /// 构建容器
    ///
    /// 注册表构建阶段收集到的任何定义错误都会使构建失败，
    /// 容器不得启动
    pub fn build(self) -> ContainerResult<Container> {
        info!(
            "开始构建容器: {} 个描述符, {} 个上下文",
            self.descriptors.len(),
            self.contexts.len()
        );

        // 第一步：构建不可变的 Bean 注册表（含定义校验）
        let contexts = Arc::new(self.contexts);
        let registry = Arc::new(BeanRegistry::build(self.descriptors, &contexts)?);

        // 第二步：构建解析器与实例管理器
        let resolver = Arc::new(BeanResolver::new(registry.clone()));
        let manager = ContextualInstanceManager::new(
            registry.clone(),
            resolver,
            contexts.clone(),
            self.config.max_construction_depth,
        );

        // 第三步：激活单例上下文
        if let Some(context) = contexts.get(&ScopeId::singleton()) {
            context.activate(ContextualKey::nil())?;
        }

        // 第四步：预创建普通作用域 Bean 的客户端代理
        if self.config.eager_proxies {
            for descriptor in registry.iter() {
                if let Some(context) = contexts.get(&descriptor.scope) {
                    if context.kind() == ScopeKind::Normal {
                        manager.proxy_for(descriptor)?;
                        debug!("预创建客户端代理: {}", descriptor.id);
                    }
                }
            }
        }

        info!("容器构建完成: {} 个 Bean", registry.len());
        Ok(Container::new(contexts, manager))
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
