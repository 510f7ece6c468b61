//! 应用级上下文（单例作用域）

use crate::contexts::InstanceStore;
use injection_abstractions::{Context, ContextualInstance, Creator, DestructionReport};
use injection_common::{
    BeanDescriptor, BeanId, ContainerResult, ContextError, ContextResult, ContextualKey,
    DestructionError, ScopeId, ScopeKind,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// 应用级上下文
///
/// 无键作用域：从引导时激活到容器关闭，所有线程共享
/// 同一批单例实例
pub struct ApplicationContext {
    scope: ScopeId,
    store: InstanceStore,
    active: AtomicBool,
}

impl ApplicationContext {
    /// 创建新的应用级上下文（未激活）
    pub fn new() -> Self {
        Self {
            scope: ScopeId::singleton(),
            store: InstanceStore::default(),
            active: AtomicBool::new(false),
        }
    }

    /// 已存储的单例数量
    pub fn stored(&self) -> usize {
        self.store.len()
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Context for ApplicationContext {
    fn scope(&self) -> &ScopeId {
        &self.scope
    }

    fn kind(&self) -> ScopeKind {
        ScopeKind::Normal
    }

    fn activate(&self, _key: ContextualKey) -> ContextResult<()> {
        self.active.store(true, Ordering::Release);
        info!("应用级上下文已激活: {}", self.scope);
        Ok(())
    }

    fn deactivate(&self, _key: &ContextualKey) -> ContextResult<DestructionReport> {
        // 重复停用是空操作
        if !self.active.swap(false, Ordering::AcqRel) {
            return Ok(DestructionReport::default());
        }
        let report = self.store.destroy_all();
        info!(
            "应用级上下文已结束: 销毁 {} 个实例, {} 个失败",
            report.destroyed,
            report.failures.len()
        );
        Ok(report)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn current_key(&self) -> Option<ContextualKey> {
        self.is_active().then(ContextualKey::nil)
    }

    fn active_keys(&self) -> Vec<ContextualKey> {
        if self.is_active() {
            vec![ContextualKey::nil()]
        } else {
            Vec::new()
        }
    }

    fn get(&self, bean: &BeanId, _key: &ContextualKey) -> Option<Arc<ContextualInstance>> {
        if !self.is_active() {
            return None;
        }
        self.store.get(bean)
    }

    fn get_or_create(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        _key: &ContextualKey,
        creator: Creator<'_>,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        if !self.is_active() {
            return Err(ContextError::NotActive {
                scope: descriptor.scope.clone(),
            }
            .into());
        }
        self.store.get_or_create(&descriptor.id, creator)
    }

    fn destroy(&self, bean: &BeanId, _key: &ContextualKey) -> Vec<DestructionError> {
        self.store.destroy(bean)
    }
}
