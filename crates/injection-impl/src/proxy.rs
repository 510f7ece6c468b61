//! 客户端代理
//!
//! 代理持有 (描述符, 实例管理器)，从不持有具体实例；
//! 每次调用都把操作转发给作用域上下文当前持有的实例，
//! 因此在作用域实例尚不存在或被替换之后引用依然有效

use crate::manager::ContextualInstanceManager;
use dashmap::DashMap;
use injection_abstractions::{ContextualInstance, ProxyHandle};
use injection_common::{
    BeanDescriptor, BeanId, BeanInstance, ContainerError, ContainerResult, ContextError,
    InvocationArgs, InvocationResult,
};
use std::sync::{Arc, Weak};

/// 客户端代理
///
/// 每个普通作用域描述符在容器生命周期内至多存在一个代理，
/// 所有引用该 Bean 的注入点复用同一个
pub struct ClientProxy {
    descriptor: Arc<BeanDescriptor>,
    manager: Weak<ContextualInstanceManager>,
}

impl ClientProxy {
    pub(crate) fn new(
        descriptor: Arc<BeanDescriptor>,
        manager: Weak<ContextualInstanceManager>,
    ) -> Self {
        Self {
            descriptor,
            manager,
        }
    }

    /// 在调用时解析当前上下文实例
    fn contextual(&self) -> ContainerResult<Arc<ContextualInstance>> {
        let manager = self
            .manager
            .upgrade()
            .ok_or_else(|| ContextError::NotActive {
                scope: self.descriptor.scope.clone(),
            })?;
        manager.get_or_create(&self.descriptor)
    }
}

impl ProxyHandle for ClientProxy {
    fn descriptor(&self) -> &Arc<BeanDescriptor> {
        &self.descriptor
    }

    fn current(&self) -> ContainerResult<BeanInstance> {
        Ok(self.contextual()?.instance().clone())
    }

    fn invoke(&self, method: &str, args: InvocationArgs) -> ContainerResult<InvocationResult> {
        self.contextual()?
            .invoke(method, args)
            .map_err(ContainerError::from)
    }
}

impl std::fmt::Debug for ClientProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientProxy")
            .field("bean", &self.descriptor.id)
            .field("scope", &self.descriptor.scope)
            .finish()
    }
}

/// 从注入得到的不透明实例还原客户端代理
///
/// 普通作用域 Bean 经注入器解析得到的实例就是它的代理对象
pub fn as_proxy(instance: &BeanInstance) -> Option<Arc<ClientProxy>> {
    instance.clone().downcast::<ClientProxy>().ok()
}

/// 客户端代理工厂
///
/// 按 Bean 标识记忆化；代理在首次解析时惰性创建，
/// 存活至容器结束
#[derive(Default)]
pub struct ClientProxyFactory {
    proxies: DashMap<BeanId, Arc<ClientProxy>>,
}

impl ClientProxyFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 取出或创建描述符对应的代理
    pub(crate) fn get_or_create(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        manager: Weak<ContextualInstanceManager>,
    ) -> Arc<ClientProxy> {
        self.proxies
            .entry(descriptor.id.clone())
            .or_insert_with(|| Arc::new(ClientProxy::new(descriptor.clone(), manager)))
            .clone()
    }

    /// 已创建的代理数量
    pub(crate) fn count(&self) -> usize {
        self.proxies.len()
    }
}
