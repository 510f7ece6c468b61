//! 容器门面
//!
//! 对外提供解析、作用域生命周期信号与关闭入口

use crate::builder::ContainerBuilder;
use injection_abstractions::{Context, DestructionReport};
use injection_common::{
    BeanDescriptor, ContainerResult, ContextualKey, QualifierSet, ResolutionResult, ScopeId,
    TypeKey,
};
use injection_impl::{
    BeanHandle, BeanRegistry, ContainerStats, ContextRegistry, ContextualInstanceManager,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// 依赖注入容器
///
/// 引导完成后注册表与解析缓存都是进程级只读状态；
/// 作用域的激活与结束由外围应用生命周期驱动
pub struct Container {
    contexts: Arc<ContextRegistry>,
    manager: Arc<ContextualInstanceManager>,
    instances_destroyed: AtomicU64,
}

impl Container {
    pub(crate) fn new(
        contexts: Arc<ContextRegistry>,
        manager: Arc<ContextualInstanceManager>,
    ) -> Self {
        Self {
            contexts,
            manager,
            instances_destroyed: AtomicU64::new(0),
        }
    }

    /// 创建容器构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Bean 注册表
    pub fn registry(&self) -> &Arc<BeanRegistry> {
        self.manager.registry()
    }

    /// 实例管理器（高级用法）
    pub fn manager(&self) -> &Arc<ContextualInstanceManager> {
        &self.manager
    }

    /// 解析并返回 Bean 句柄
    pub fn instance(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<BeanHandle> {
        let descriptor = self.manager.resolver().resolve(required_type, qualifiers)?;
        self.manager.handle_for(&descriptor)
    }

    /// 容忍缺失的解析；依赖不满足时返回 None，歧义仍然报错
    pub fn try_instance(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<Option<BeanHandle>> {
        match self
            .manager
            .resolver()
            .try_resolve(required_type, qualifiers)?
        {
            Some(descriptor) => Ok(Some(self.manager.handle_for(&descriptor)?)),
            None => Ok(None),
        }
    }

    /// 按名称解析并返回 Bean 句柄
    pub fn instance_by_name(&self, name: &str) -> ContainerResult<BeanHandle> {
        let descriptor = self.manager.resolver().resolve_by_name(name)?;
        self.manager.handle_for(&descriptor)
    }

    /// 返回所有满足请求的 Bean 句柄（程序化迭代）
    pub fn instances_of(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<Vec<BeanHandle>> {
        self.manager
            .resolver()
            .resolve_all(required_type, qualifiers)
            .iter()
            .map(|descriptor| self.manager.handle_for(descriptor))
            .collect()
    }

    /// 描述符级解析（不创建实例与代理）
    pub fn select(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Arc<BeanDescriptor>> {
        self.manager.resolver().resolve(required_type, qualifiers)
    }

    /// 激活一个作用域上下文实例
    ///
    /// 由外围应用/请求处理层调用；核心不自行决定时机
    pub fn activate(&self, scope: &ScopeId, key: ContextualKey) -> ContainerResult<()> {
        self.contexts.require(scope)?.activate(key)?;
        Ok(())
    }

    /// 结束一个作用域上下文实例，销毁其全部条目
    pub fn deactivate(
        &self,
        scope: &ScopeId,
        key: &ContextualKey,
    ) -> ContainerResult<DestructionReport> {
        let report = self.contexts.require(scope)?.deactivate(key)?;
        self.instances_destroyed
            .fetch_add(report.destroyed as u64, Ordering::Relaxed);
        for failure in &report.failures {
            warn!("作用域 {} 结束时销毁失败: {}", scope, failure);
        }
        Ok(report)
    }

    /// 容器统计信息
    pub fn stats(&self) -> ContainerStats {
        let resolver = self.manager.resolver();
        ContainerStats {
            registered_beans: self.manager.registry().len(),
            resolution_cache_entries: resolver.cache_size(),
            resolution_cache_hits: resolver.cache_hits(),
            resolution_cache_misses: resolver.cache_misses(),
            proxies_created: self.manager.proxies_created(),
            instances_created: self.manager.instances_created(),
            instances_destroyed: self.instances_destroyed.load(Ordering::Relaxed),
        }
    }

    /// 关闭容器
    ///
    /// 结束单例上下文并销毁全部单例；单个销毁失败只记录
    /// 不中断。线程绑定作用域应由各自的激活线程结束。
    /// 重复关闭是空操作
    pub fn shutdown(&self) -> DestructionReport {
        info!("开始关闭容器");
        let report = match self.contexts.require(&ScopeId::singleton()) {
            Ok(context) => match context.deactivate(&ContextualKey::nil()) {
                Ok(report) => report,
                Err(error) => {
                    warn!("结束单例上下文失败: {}", error);
                    DestructionReport::default()
                }
            },
            Err(_) => DestructionReport::default(),
        };
        self.instances_destroyed
            .fetch_add(report.destroyed as u64, Ordering::Relaxed);
        for failure in &report.failures {
            warn!("关闭容器时销毁失败: {}", failure);
        }
        info!(
            "容器已关闭: 销毁 {} 个实例, {} 个失败",
            report.destroyed,
            report.failures.len()
        );
        report
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("beans", &self.manager.registry().len())
            .field("scopes", &self.contexts.len())
            .finish()
    }
}
