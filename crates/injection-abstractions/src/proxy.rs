//! 客户端代理契约
//!
//! 代理是稳定的转发句柄：持有描述符与实例管理器，从不持有
//! 具体实例；每次调用都把操作转发给上下文当前持有的实例

use injection_common::{
    BeanDescriptor, BeanInstance, ContainerError, ContainerResult, InvocationArgs,
    InvocationResult,
};
use std::sync::Arc;

/// 客户端代理 trait
pub trait ProxyHandle: Send + Sync {
    /// 代理指向的描述符
    fn descriptor(&self) -> &Arc<BeanDescriptor>;

    /// 取当前上下文实例
    ///
    /// 在调用时解析而不是在代理创建时解析；作用域实例被替换
    /// 或尚不存在时，代理引用依然有效
    fn current(&self) -> ContainerResult<BeanInstance>;

    /// 通过当前实例的拦截器链调用方法
    fn invoke(&self, method: &str, args: InvocationArgs) -> ContainerResult<InvocationResult>;
}

/// 客户端代理类型化扩展
///
/// 使用方按被代理类型的公开契约编写显式转发实现时，
/// 可借助这些辅助方法访问当前实例
pub trait ProxyHandleExt: ProxyHandle {
    /// 取当前实例并向下转换为具体类型
    fn current_of<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        let instance = self.current()?;
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::DowncastFailed {
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}

impl<P: ProxyHandle + ?Sized> ProxyHandleExt for P {}
