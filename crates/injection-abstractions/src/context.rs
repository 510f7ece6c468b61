//! 上下文抽象接口
//!
//! 每个作用域对应一个上下文实现，负责上下文实例的
//! 创建、查找与销毁

use crate::store::ContextualInstance;
use injection_common::{
    BeanDescriptor, BeanId, ContainerResult, ContextResult, ContextualKey, DestructionError,
    ScopeId, ScopeKind,
};
use std::sync::Arc;

/// 实例创建回调
///
/// 由实例管理器提供；上下文在同一 (Bean, 键) 槽位上
/// 串行执行它，不同槽位互不阻塞
pub type Creator<'a> = &'a mut dyn FnMut() -> ContainerResult<Arc<ContextualInstance>>;

/// 批量销毁报告
///
/// 上下文结束时逐条销毁，单个失败只记录不中断
#[derive(Debug, Default)]
pub struct DestructionReport {
    /// 已移除的条目数
    pub destroyed: usize,
    /// 收集到的销毁失败
    pub failures: Vec<DestructionError>,
}

impl DestructionReport {
    /// 是否全部销毁成功
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: DestructionReport) {
        self.destroyed += other.destroyed;
        self.failures.extend(other.failures);
    }
}

/// 上下文 trait
///
/// 激活/结束由外围应用生命周期发出信号；核心不自行决定时机
pub trait Context: Send + Sync {
    /// 所属作用域
    fn scope(&self) -> &ScopeId;

    /// 作用域类别
    fn kind(&self) -> ScopeKind;

    /// 激活一个上下文实例；线程相关作用域绑定到当前线程，
    /// 同一作用域可重入嵌套激活
    fn activate(&self, key: ContextualKey) -> ContextResult<()>;

    /// 结束一个上下文实例，销毁其拥有的全部条目
    fn deactivate(&self, key: &ContextualKey) -> ContextResult<DestructionReport>;

    /// 当前线程是否有活动的上下文实例
    fn is_active(&self) -> bool;

    /// 当前线程的活动上下文键
    fn current_key(&self) -> Option<ContextualKey>;

    /// 所有活动的上下文键
    fn active_keys(&self) -> Vec<ContextualKey>;

    /// 查找已存储的实例
    fn get(&self, bean: &BeanId, key: &ContextualKey) -> Option<Arc<ContextualInstance>>;

    /// 取出或创建实例
    ///
    /// 对同一 (Bean, 键) 原子执行"有则返回、无则构建后存储"；
    /// 并发请求同一槽位时后到者阻塞等待，不会重复并发构建
    fn get_or_create(
        &self,
        descriptor: &Arc<BeanDescriptor>,
        key: &ContextualKey,
        creator: Creator<'_>,
    ) -> ContainerResult<Arc<ContextualInstance>>;

    /// 销毁单个条目并移除
    ///
    /// 销毁策略严格执行一次；对不存在或已销毁的条目是空操作
    fn destroy(&self, bean: &BeanId, key: &ContextualKey) -> Vec<DestructionError>;
}
