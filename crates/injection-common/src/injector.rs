//! 注入器接口
//!
//! 构建回调、生产者与外部提供者通过注入器递归解析自己的依赖

use crate::descriptor::BeanInstance;
use crate::errors::{ContainerError, ContainerResult};
use crate::injection_point::InjectionPoint;
use crate::qualifier::QualifierSet;
use crate::typekey::TypeKey;
use std::sync::Arc;

/// 注入器 trait（对象安全）
///
/// 普通作用域的解析结果是客户端代理对象；伪作用域的解析结果
/// 是每次访问新建的实例
pub trait Injector: Send + Sync {
    /// 解析并返回注入用实例
    fn instance(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<BeanInstance>;

    /// 解析注入点
    ///
    /// 可选注入点在依赖不满足时返回 None 而不是报错
    fn instance_for(&self, point: &InjectionPoint) -> ContainerResult<Option<BeanInstance>>;

    /// 容忍缺失的解析；依赖不满足时返回 None，歧义仍然报错
    fn try_instance(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<Option<BeanInstance>>;
}

/// 注入器类型化扩展
pub trait InjectorExt: Injector {
    /// 解析并向下转换为具体类型
    ///
    /// 仅对伪作用域 Bean 有意义；普通作用域的实例是代理对象，
    /// 应通过代理接口访问
    fn instance_of<T: Send + Sync + 'static>(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ContainerResult<Arc<T>> {
        let instance = self.instance(required_type, qualifiers)?;
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::DowncastFailed {
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}

impl<I: Injector + ?Sized> InjectorExt for I {}
