//! 上下文实例管理器
//!
//! 面向解析结果编排"取出或创建"：找到作用域上下文、执行
//! 构建策略、套上装饰管道、存入上下文；同时实现构建回调
//! 使用的注入器接口

use crate::construction::{self, ConstructionGuard};
use crate::contexts::ContextRegistry;
use crate::pipeline;
use crate::proxy::{ClientProxy, ClientProxyFactory};
use crate::registry::BeanRegistry;
use crate::resolver::BeanResolver;
use crate::stats::InstanceCounters;
use injection_abstractions::{Context, ContextualInstance, ProxyHandle};
use injection_common::{
    BeanDescriptor, BeanInstance, ConstructionError, ConstructionStrategy, ContainerError,
    ContainerResult, ContextError, ContextualKey, DestructionError, InjectionPoint, Injector,
    InvocationArgs, InvocationResult, QualifierSet, ScopeKind, TypeKey,
};
use std::sync::{Arc, Weak};
use tracing::debug;

/// 上下文实例管理器
pub struct ContextualInstanceManager {
    registry: Arc<BeanRegistry>,
    resolver: Arc<BeanResolver>,
    contexts: Arc<ContextRegistry>,
    proxies: ClientProxyFactory,
    counters: InstanceCounters,
    max_depth: usize,
    self_ref: Weak<ContextualInstanceManager>,
}

impl ContextualInstanceManager {
    /// 创建新的实例管理器
    pub fn new(
        registry: Arc<BeanRegistry>,
        resolver: Arc<BeanResolver>,
        contexts: Arc<ContextRegistry>,
        max_depth: usize,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            registry,
            resolver,
            contexts,
            proxies: ClientProxyFactory::new(),
            counters: InstanceCounters::default(),
            max_depth,
            self_ref: self_ref.clone(),
        })
    }

    /// Bean 注册表
    pub fn registry(&self) -> &Arc<BeanRegistry> {
        &self.registry
    }

    /// 解析器
    pub fn resolver(&self) -> &Arc<BeanResolver> {
        &self.resolver
    }

    /// 上下文注册表
    pub fn contexts(&self) -> &Arc<ContextRegistry> {
        &self.contexts
    }

    /// 已创建的上下文实例数量
    pub fn instances_created(&self) -> u64 {
        self.counters.created()
    }

    /// 已创建的客户端代理数量
    pub fn proxies_created(&self) -> usize {
        self.proxies.count()
    }

    /// 取出或创建描述符的上下文实例
    ///
    /// 普通作用域路由到作用域上下文的槽位存储；伪作用域
    /// 每次构建新实例并挂到进行中的构建帧（如有）
    pub fn get_or_create(
        &self,
        descriptor: &Arc<BeanDescriptor>,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        let context = self.contexts.require(&descriptor.scope)?;
        match context.kind() {
            ScopeKind::Pseudo => self.create_dependent(descriptor, context),
            ScopeKind::Normal => {
                let key = context
                    .current_key()
                    .ok_or_else(|| ContextError::NotActive {
                        scope: descriptor.scope.clone(),
                    })?;
                // 先行循环检查：同线程对进行中槽位的递归请求
                // 必须在拿槽位锁之前失败，否则会在锁上自我阻塞
                if let Some(chain) = construction::detect_cycle(&descriptor.id, &key) {
                    return Err(ConstructionError::CircularDependency { chain }.into());
                }
                let descriptor_for_creator = descriptor.clone();
                context.get_or_create(descriptor, &key, &mut || {
                    self.construct(&descriptor_for_creator, key)
                })
            }
        }
    }

    /// 取描述符对应的客户端代理（仅普通作用域）
    pub fn proxy_for(
        &self,
        descriptor: &Arc<BeanDescriptor>,
    ) -> ContainerResult<Arc<ClientProxy>> {
        let context = self.contexts.require(&descriptor.scope)?;
        if context.kind() != ScopeKind::Normal {
            return Err(ContainerError::ProxyUnsupported {
                bean_id: descriptor.id.clone(),
            });
        }
        Ok(self
            .proxies
            .get_or_create(descriptor, self.self_ref.clone()))
    }

    /// 取描述符的注入用引用
    ///
    /// 普通作用域返回客户端代理（包装为不透明实例）；
    /// 伪作用域构建并返回新实例
    pub fn reference_for(
        &self,
        descriptor: &Arc<BeanDescriptor>,
    ) -> ContainerResult<BeanInstance> {
        let context = self.contexts.require(&descriptor.scope)?;
        match context.kind() {
            ScopeKind::Normal => {
                let proxy = self.proxy_for(descriptor)?;
                let instance: BeanInstance = proxy;
                Ok(instance)
            }
            ScopeKind::Pseudo => Ok(self.get_or_create(descriptor)?.instance().clone()),
        }
    }

    /// 解析得到 Bean 句柄
    pub fn handle_for(&self, descriptor: &Arc<BeanDescriptor>) -> ContainerResult<BeanHandle> {
        let context = self.contexts.require(&descriptor.scope)?;
        let proxy = match context.kind() {
            ScopeKind::Normal => Some(self.proxy_for(descriptor)?),
            ScopeKind::Pseudo => None,
        };
        Ok(BeanHandle {
            descriptor: descriptor.clone(),
            manager: self.self_ref.clone(),
            proxy,
        })
    }

    /// 销毁单个上下文实例
    ///
    /// 销毁策略严格执行一次并移除条目；对不存在或已销毁的
    /// 条目是空操作
    pub fn destroy(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        key: &ContextualKey,
    ) -> Vec<DestructionError> {
        match self.contexts.get(&descriptor.scope) {
            Some(context) => context.destroy(&descriptor.id, key),
            None => Vec::new(),
        }
    }

    /// 为伪作用域 Bean 构建新实例
    fn create_dependent(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        context: &Arc<dyn Context>,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        let key = context.current_key().unwrap_or_else(ContextualKey::nil);
        if let Some(chain) = construction::detect_cycle(&descriptor.id, &key) {
            return Err(ConstructionError::CircularDependency { chain }.into());
        }
        let descriptor_for_creator = descriptor.clone();
        let instance = context.get_or_create(descriptor, &key, &mut || {
            self.construct(&descriptor_for_creator, key)
        })?;
        construction::attach_dependent(instance.clone());
        Ok(instance)
    }

    /// 执行一次完整构建：策略 -> 装饰 -> 存储形态
    fn construct(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        key: ContextualKey,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        let guard = ConstructionGuard::enter(&descriptor.id, &key, self.max_depth)?;
        let raw = self.run_strategy(descriptor)?;
        let wrapped = pipeline::wrap(raw, descriptor)?;
        let dependents = guard.finish();
        let instance = Arc::new(ContextualInstance::new(
            descriptor.clone(),
            key,
            wrapped,
            dependents,
        ));
        self.counters.record_created();
        debug!("创建上下文实例: {} @ {}", descriptor.id, key);
        Ok(instance)
    }

    /// 按构建策略产生原始实例
    ///
    /// 回调内嵌套解析产生的容器错误（如循环依赖）原样向外
    /// 传播，不再套一层回调失败
    fn run_strategy(&self, descriptor: &Arc<BeanDescriptor>) -> ContainerResult<BeanInstance> {
        match &descriptor.construction {
            ConstructionStrategy::Constructor(callback)
            | ConstructionStrategy::Producer(callback) => {
                callback.as_ref()(self).map_err(|source| match source.downcast::<ContainerError>() {
                    Ok(container_error) => container_error,
                    Err(source) => ConstructionError::CallbackFailed {
                        bean_id: descriptor.id.clone(),
                        source,
                    }
                    .into(),
                })
            }
            ConstructionStrategy::Foreign(provider) => {
                provider.acquire(self).map_err(|source| {
                    match source.downcast::<ContainerError>() {
                        Ok(container_error) => container_error,
                        Err(source) => ConstructionError::ProviderFailed {
                            bean_id: descriptor.id.clone(),
                            provider: provider.name().to_string(),
                            source,
                        }
                        .into(),
                    }
                })
            }
        }
    }
}

impl Injector for ContextualInstanceManager {
    fn instance(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<BeanInstance> {
        let descriptor = self.resolver.resolve(required_type, qualifiers)?;
        self.reference_for(&descriptor)
    }

    fn instance_for(&self, point: &InjectionPoint) -> ContainerResult<Option<BeanInstance>> {
        if point.optional {
            return self.try_instance(&point.required_type, &point.qualifiers);
        }
        let descriptor = self
            .resolver
            .resolve(&point.required_type, &point.qualifiers)?;
        Ok(Some(self.reference_for(&descriptor)?))
    }

    fn try_instance(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<Option<BeanInstance>> {
        match self.resolver.try_resolve(required_type, qualifiers)? {
            Some(descriptor) => Ok(Some(self.reference_for(&descriptor)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for ContextualInstanceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextualInstanceManager")
            .field("beans", &self.registry.len())
            .field("proxies", &self.proxies.count())
            .finish()
    }
}

/// 解析得到的 Bean 句柄
///
/// 普通作用域经由稳定的客户端代理访问当前实例；
/// 伪作用域每次访问构建新实例，实例归调用方所有
pub struct BeanHandle {
    descriptor: Arc<BeanDescriptor>,
    manager: Weak<ContextualInstanceManager>,
    proxy: Option<Arc<ClientProxy>>,
}

impl BeanHandle {
    /// 句柄指向的描述符
    pub fn descriptor(&self) -> &Arc<BeanDescriptor> {
        &self.descriptor
    }

    /// 是否经由客户端代理
    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }

    /// 底层代理（仅普通作用域）
    pub fn proxy(&self) -> Option<&Arc<ClientProxy>> {
        self.proxy.as_ref()
    }

    fn manager(&self) -> ContainerResult<Arc<ContextualInstanceManager>> {
        self.manager
            .upgrade()
            .ok_or_else(|| ContextError::NotActive {
                scope: self.descriptor.scope.clone(),
            }
            .into())
    }

    /// 取实例
    ///
    /// 普通作用域返回当前上下文实例（每次调用重新解析）；
    /// 伪作用域构建新实例
    pub fn get(&self) -> ContainerResult<BeanInstance> {
        match &self.proxy {
            Some(proxy) => proxy.current(),
            None => Ok(self
                .manager()?
                .get_or_create(&self.descriptor)?
                .instance()
                .clone()),
        }
    }

    /// 取实例并向下转换为具体类型
    pub fn get_of<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.get()?
            .downcast::<T>()
            .map_err(|_| ContainerError::DowncastFailed {
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// 通过当前实例的拦截器链调用方法
    pub fn invoke(
        &self,
        method: &str,
        args: InvocationArgs,
    ) -> ContainerResult<InvocationResult> {
        match &self.proxy {
            Some(proxy) => proxy.invoke(method, args),
            None => self
                .manager()?
                .get_or_create(&self.descriptor)?
                .invoke(method, args)
                .map_err(ContainerError::from),
        }
    }
}

impl std::fmt::Debug for BeanHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanHandle")
            .field("bean", &self.descriptor.id)
            .field("proxied", &self.is_proxied())
            .finish()
    }
}
