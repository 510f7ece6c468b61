//! 容器统计信息

use std::sync::atomic::{AtomicU64, Ordering};

/// 容器统计信息
#[derive(Debug, Clone, Default)]
pub struct ContainerStats {
    /// 已注册的 Bean 数量
    pub registered_beans: usize,
    /// 解析缓存条目数
    pub resolution_cache_entries: usize,
    /// 解析缓存命中次数
    pub resolution_cache_hits: u64,
    /// 解析缓存未命中次数
    pub resolution_cache_misses: u64,
    /// 已创建的客户端代理数量
    pub proxies_created: usize,
    /// 已创建的上下文实例数量
    pub instances_created: u64,
    /// 已销毁的上下文实例数量
    pub instances_destroyed: u64,
}

/// 实例计数器
#[derive(Debug, Default)]
pub(crate) struct InstanceCounters {
    created: AtomicU64,
}

impl InstanceCounters {
    pub(crate) fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
