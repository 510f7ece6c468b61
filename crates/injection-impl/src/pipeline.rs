//! 装饰管道（构建期）
//!
//! 新建实例在存入上下文之前先经过装饰器包装；调用期的
//! 拦截器链由 [`injection_abstractions::ContextualInstance::invoke`]
//! 组装执行

use injection_common::{
    bean_instance, BeanDescriptor, BeanInstance, ConstructionError, InterceptedTarget,
};
use std::sync::Arc;

/// 包装新建实例
///
/// 带拦截器绑定的 Bean 先把原始实例收进拦截目标（调用链的
/// 进入点），再按声明顺序从外到内应用装饰器：声明靠前的
/// 装饰器在最外层，因此从列表末尾向前折叠。任一装饰器失败
/// 都会中止整个实例的构建，部分装饰的实例不会被存储
pub fn wrap(
    raw: BeanInstance,
    descriptor: &Arc<BeanDescriptor>,
) -> Result<BeanInstance, ConstructionError> {
    let mut instance = if descriptor.interceptors.is_empty() {
        raw
    } else {
        bean_instance(InterceptedTarget::new(descriptor.clone(), raw))
    };
    for decorator in descriptor.decorators.iter().rev() {
        instance =
            decorator
                .decorate(instance)
                .map_err(|source| ConstructionError::DecorationFailed {
                    bean_id: descriptor.id.clone(),
                    decorator: decorator.name().to_string(),
                    source,
                })?;
    }
    Ok(instance)
}
