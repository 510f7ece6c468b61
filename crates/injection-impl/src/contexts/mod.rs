//! 上下文实现
//!
//! 内置三种上下文：应用级（单例）、键控线程绑定（请求）、
//! 伪作用域（依赖）；注册表按作用域标识索引它们

pub mod application;
pub mod bound;
pub mod unscoped;

pub use application::ApplicationContext;
pub use bound::BoundContext;
pub use unscoped::UnscopedContext;

use dashmap::DashMap;
use injection_abstractions::{Context, ContextualInstance, Creator, DestructionReport};
use injection_common::{
    BeanId, ContainerResult, ContextError, ContextResult, DestructionError, ScopeId,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// 上下文注册表
///
/// 每个作用域一个上下文实现；引导完成后不可变
#[derive(Default)]
pub struct ContextRegistry {
    contexts: HashMap<ScopeId, Arc<dyn Context>>,
}

impl ContextRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 带全部内置上下文的注册表
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ApplicationContext::new()));
        registry.register(Arc::new(BoundContext::new(ScopeId::request())));
        registry.register(Arc::new(UnscopedContext::new()));
        registry
    }

    /// 注册上下文实现（按其作用域索引）
    pub fn register(&mut self, context: Arc<dyn Context>) {
        self.contexts.insert(context.scope().clone(), context);
    }

    /// 查找作用域的上下文
    pub fn get(&self, scope: &ScopeId) -> Option<&Arc<dyn Context>> {
        self.contexts.get(scope)
    }

    /// 查找作用域的上下文，未注册时报错
    pub fn require(&self, scope: &ScopeId) -> ContextResult<&Arc<dyn Context>> {
        self.contexts
            .get(scope)
            .ok_or_else(|| ContextError::UnknownScope {
                scope: scope.clone(),
            })
    }

    /// 迭代所有已注册的作用域
    pub fn scopes(&self) -> impl Iterator<Item = &ScopeId> {
        self.contexts.keys()
    }

    /// 已注册的上下文数量
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// 是否没有注册任何上下文
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("scopes", &self.contexts.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 单个上下文键的实例存储
///
/// 每个 Bean 槽位有自己的锁：同槽位的并发构建串行化，
/// 不同槽位互不阻塞（跨槽位的构建递归要求不能有整库锁）
#[derive(Default)]
pub(crate) struct InstanceStore {
    slots: DashMap<BeanId, Arc<Mutex<Option<Arc<ContextualInstance>>>>>,
}

impl InstanceStore {
    /// 查找已存储的实例
    pub(crate) fn get(&self, bean: &BeanId) -> Option<Arc<ContextualInstance>> {
        let slot = self.slots.get(bean)?.clone();
        let guard = slot.lock();
        guard.clone()
    }

    /// 取出或创建实例
    ///
    /// 槽位锁在构建期间一直持有，后到的同槽位请求在此阻塞；
    /// 构建失败时槽位保持为空，等待者醒来后自行重新构建，
    /// 结果收敛且不会出现并发重复构建
    pub(crate) fn get_or_create(
        &self,
        bean: &BeanId,
        creator: Creator<'_>,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        let slot = self.slots.entry(bean.clone()).or_default().clone();
        let mut guard = slot.lock();
        if let Some(instance) = guard.as_ref() {
            return Ok(instance.clone());
        }
        let instance = creator()?;
        *guard = Some(instance.clone());
        Ok(instance)
    }

    /// 销毁单个条目
    pub(crate) fn destroy(&self, bean: &BeanId) -> Vec<DestructionError> {
        match self.slots.remove(bean) {
            Some((_, slot)) => match slot.lock().take() {
                Some(instance) => instance.destroy(),
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// 销毁全部条目
    ///
    /// 单个失败只收集不中断，剩余条目仍会被销毁
    pub(crate) fn destroy_all(&self) -> DestructionReport {
        let mut report = DestructionReport::default();
        let beans: Vec<BeanId> = self.slots.iter().map(|entry| entry.key().clone()).collect();
        for bean in beans {
            if let Some((_, slot)) = self.slots.remove(&bean) {
                if let Some(instance) = slot.lock().take() {
                    report.destroyed += 1;
                    report.failures.extend(instance.destroy());
                }
            }
        }
        report
    }

    /// 已存储的条目数
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
