//! 上下文实例存储形态
//!
//! 上下文实例携带销毁所需的全部状态：所属描述符、上下文键、
//! 构建期间产生的依赖实例

use chrono::{DateTime, Utc};
use injection_common::{
    BeanDescriptor, BeanInstance, ConstructionStrategy, ContextualKey, DestructionError,
    InterceptedTarget, InvocationArgs, InvocationError, InvocationResult,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// 上下文实例
///
/// 存入上下文的实例已完成装饰；销毁严格执行一次
pub struct ContextualInstance {
    descriptor: Arc<BeanDescriptor>,
    key: ContextualKey,
    instance: BeanInstance,
    created_at: DateTime<Utc>,
    destroyed: AtomicBool,
    dependents: Mutex<Vec<Arc<ContextualInstance>>>,
}

impl ContextualInstance {
    /// 创建新的上下文实例
    pub fn new(
        descriptor: Arc<BeanDescriptor>,
        key: ContextualKey,
        instance: BeanInstance,
        dependents: Vec<Arc<ContextualInstance>>,
    ) -> Self {
        Self {
            descriptor,
            key,
            instance,
            created_at: Utc::now(),
            destroyed: AtomicBool::new(false),
            dependents: Mutex::new(dependents),
        }
    }

    /// 所属描述符
    pub fn descriptor(&self) -> &Arc<BeanDescriptor> {
        &self.descriptor
    }

    /// 上下文键
    pub fn key(&self) -> ContextualKey {
        self.key
    }

    /// 实例对象（已装饰）
    pub fn instance(&self) -> &BeanInstance {
        &self.instance
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 是否已销毁
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// 追加依赖实例（构建期间产生的伪作用域实例）
    pub fn add_dependent(&self, dependent: Arc<ContextualInstance>) {
        self.dependents.lock().push(dependent);
    }

    /// 调用方法
    ///
    /// 存储实例是拦截目标（无装饰器）时直接进入拦截器链；
    /// 否则经方法分发器进入最外层装饰器，由显式转发实现
    /// 逐层委托到拦截目标。拦截器与目标方法的失败原样向外传播
    pub fn invoke(
        &self,
        method: &str,
        args: InvocationArgs,
    ) -> Result<InvocationResult, InvocationError> {
        let method_failed = |source: anyhow::Error| InvocationError::MethodFailed {
            bean_id: self.descriptor.id.clone(),
            method: method.to_string(),
            source,
        };
        if let Some(target) = self.instance.downcast_ref::<InterceptedTarget>() {
            return target.invoke(method, args).map_err(method_failed);
        }
        let dispatcher =
            self.descriptor
                .dispatcher
                .as_ref()
                .ok_or_else(|| InvocationError::NoDispatcher {
                    bean_id: self.descriptor.id.clone(),
                })?;
        dispatcher.as_ref()(&self.instance, method, args).map_err(method_failed)
    }

    /// 销毁实例
    ///
    /// 严格执行一次；重复调用是空操作。先执行自身销毁策略，
    /// 再按创建逆序销毁依赖实例；单个失败不会中断后续销毁，
    /// 全部失败被收集返回
    pub fn destroy(&self) -> Vec<DestructionError> {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Vec::new();
        }

        let mut failures = Vec::new();

        // 销毁回调拿到的是构建策略产出的实例；拦截目标是
        // 核心自己的包装，在这里剥掉
        let disposed = match self.instance.downcast_ref::<InterceptedTarget>() {
            Some(target) => target.raw().clone(),
            None => self.instance.clone(),
        };
        let outcome = match &self.descriptor.construction {
            ConstructionStrategy::Foreign(provider) => provider.release(disposed).map_err(
                |source| DestructionError::ReleaseFailed {
                    bean_id: self.descriptor.id.clone(),
                    provider: provider.name().to_string(),
                    source,
                },
            ),
            _ => match &self.descriptor.disposer {
                Some(disposer) => disposer.as_ref()(disposed).map_err(|source| {
                    DestructionError::DisposerFailed {
                        bean_id: self.descriptor.id.clone(),
                        source,
                    }
                }),
                None => Ok(()),
            },
        };
        if let Err(failure) = outcome {
            warn!("上下文实例销毁失败: {}", failure);
            failures.push(failure);
        }

        let dependents = std::mem::take(&mut *self.dependents.lock());
        for dependent in dependents.into_iter().rev() {
            failures.extend(dependent.destroy());
        }

        failures
    }
}

impl std::fmt::Debug for ContextualInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextualInstance")
            .field("bean", &self.descriptor.id)
            .field("key", &self.key)
            .field("created_at", &self.created_at)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
