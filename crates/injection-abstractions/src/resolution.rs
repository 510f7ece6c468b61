//! 解析抽象接口

use injection_common::{BeanDescriptor, QualifierSet, ResolutionResult, TypeKey};
use std::sync::Arc;

/// 类型安全解析 trait
///
/// 对每个不同的 (类型, 限定符集合) 请求，解析结果在容器的
/// 整个生命周期内保持不变
pub trait BeanResolution: Send + Sync {
    /// 解析唯一满足请求的描述符
    fn resolve(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Arc<BeanDescriptor>>;

    /// 容忍缺失的解析；依赖不满足时返回 None，歧义仍然报错
    fn try_resolve(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Option<Arc<BeanDescriptor>>>;

    /// 按名称解析
    fn resolve_by_name(&self, name: &str) -> ResolutionResult<Arc<BeanDescriptor>>;

    /// 返回所有满足请求的描述符（不做消歧）
    fn resolve_all(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> Vec<Arc<BeanDescriptor>>;
}
