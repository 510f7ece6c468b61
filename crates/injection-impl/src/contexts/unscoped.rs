//! 伪作用域上下文（依赖作用域）

use injection_abstractions::{Context, ContextualInstance, Creator, DestructionReport};
use injection_common::{
    BeanDescriptor, BeanId, ContainerResult, ContextResult, ContextualKey, DestructionError,
    ScopeId, ScopeKind,
};
use std::sync::Arc;

/// 伪作用域上下文
///
/// 无持久存储：每次访问都运行创建回调产生新实例，
/// 实例归调用方（或其所属构建帧）所有，不使用代理
pub struct UnscopedContext {
    scope: ScopeId,
}

impl UnscopedContext {
    /// 创建内置依赖作用域的上下文
    pub fn new() -> Self {
        Self {
            scope: ScopeId::dependent(),
        }
    }

    /// 创建自定义伪作用域的上下文
    pub fn for_scope(scope: ScopeId) -> Self {
        Self { scope }
    }
}

impl Default for UnscopedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Context for UnscopedContext {
    fn scope(&self) -> &ScopeId {
        &self.scope
    }

    fn kind(&self) -> ScopeKind {
        ScopeKind::Pseudo
    }

    fn activate(&self, _key: ContextualKey) -> ContextResult<()> {
        // 无状态，激活是空操作
        Ok(())
    }

    fn deactivate(&self, _key: &ContextualKey) -> ContextResult<DestructionReport> {
        Ok(DestructionReport::default())
    }

    fn is_active(&self) -> bool {
        true
    }

    fn current_key(&self) -> Option<ContextualKey> {
        Some(ContextualKey::nil())
    }

    fn active_keys(&self) -> Vec<ContextualKey> {
        Vec::new()
    }

    fn get(&self, _bean: &BeanId, _key: &ContextualKey) -> Option<Arc<ContextualInstance>> {
        None
    }

    fn get_or_create(
        &self,
        _descriptor: &Arc<BeanDescriptor>,
        _key: &ContextualKey,
        creator: Creator<'_>,
    ) -> ContainerResult<Arc<ContextualInstance>> {
        creator()
    }

    fn destroy(&self, _bean: &BeanId, _key: &ContextualKey) -> Vec<DestructionError> {
        Vec::new()
    }
}
