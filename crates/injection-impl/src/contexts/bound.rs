//! 键控线程绑定上下文（请求作用域）

use crate::contexts::InstanceStore;
use dashmap::DashMap;
use injection_abstractions::{Context, ContextualInstance, Creator, DestructionReport};
use injection_common::{
    BeanDescriptor, BeanId, ContainerResult, ContextError, ContextResult, ContextualKey,
    DestructionError, ScopeId, ScopeKind,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

thread_local! {
    /// 每线程的活动键栈，按作用域分组；栈结构支持重入嵌套激活
    static ACTIVE_KEYS: RefCell<HashMap<ScopeId, Vec<ContextualKey>>> =
        RefCell::new(HashMap::new());
}

/// 键控线程绑定上下文
///
/// 上下文键区分并发活动的多个作用域实例（如每个请求一个）。
/// 激活把键绑定到当前线程；同一键的存储跨激活共享，
/// 在该键于本线程完全退栈时销毁
pub struct BoundContext {
    scope: ScopeId,
    stores: DashMap<ContextualKey, Arc<InstanceStore>>,
}

impl BoundContext {
    /// 创建指定作用域的上下文
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            stores: DashMap::new(),
        }
    }

    fn thread_stack<R>(&self, f: impl FnOnce(&mut Vec<ContextualKey>) -> R) -> R {
        ACTIVE_KEYS.with(|active| {
            let mut active = active.borrow_mut();
            f(active.entry(self.scope.clone()).or_default())
        })
    }
}

impl Context for BoundContext {
    fn scope(&self) -> &ScopeId {
        &self.scope
    }

    fn kind(&self) -> ScopeKind {
        ScopeKind::Normal
    }

    fn activate(&self, key: ContextualKey) -> ContextResult<()> {
        self.stores.entry(key).or_default();
        self.thread_stack(|stack| stack.push(key));
        debug!("作用域 {} 激活上下文键 {}", self.scope, key);
        Ok(())
    }

    fn deactivate(&self, key: &ContextualKey) -> ContextResult<DestructionReport> {
        self.thread_stack(|stack| {
            if stack.last() == Some(key) {
                stack.pop();
                Ok(())
            } else {
                Err(ContextError::NotCurrent {
                    scope: self.scope.clone(),
                    key: *key,
                })
            }
        })?;

        // 重入嵌套：外层激活仍持有该键时不销毁存储
        let still_active = self.thread_stack(|stack| stack.contains(key));
        if still_active {
            return Ok(DestructionReport::default());
        }

        let report = match self.stores.remove(key) {
            Some((_, store)) => store.destroy_all(),
            None => DestructionReport::default(),
        };
        debug!(
            "作用域 {} 结束上下文键 {}: 销毁 {} 个实例, {} 个失败",
            self.scope,
            key,
            report.destroyed,
            report.failures.len()
        );
        Ok(report)
    }

    fn is_active(&self) -> bool {
        self.current_key().is_some()
    }

    fn current_key(&self) -> Option<ContextualKey> {
        self.thread_stack(|stack| stack.last().copied())
    }

    fn active_keys(&self) -> Vec<ContextualKey> {
        self.stores.iter().map(|entry| *entry.key()).collect()
    }

    fn get(&self, bean: &BeanId, key: &ContextualKey) -> Option<Arc<ContextualInstance>> {
        let store = self.stores.get(key)?.clone();
        store.get(bean)
    }

    fn get_or_create(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        key: &ContextualKey,
        creator: Creator<'_>,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        let store = self
            .stores
            .get(key)
            .map(|entry| entry.clone())
            .ok_or_else(|| ContextError::NotActive {
                scope: descriptor.scope.clone(),
            })?;
        store.get_or_create(&descriptor.id, creator)
    }

    fn destroy(&self, bean: &BeanId, key: &ContextualKey) -> Vec<DestructionError> {
        match self.stores.get(key) {
            Some(store) => {
                let store = store.clone();
                store.destroy(bean)
            }
            None => Vec::new(),
        }
    }
}
