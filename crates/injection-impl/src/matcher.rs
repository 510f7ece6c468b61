//! 类型与限定符匹配
//!
//! 纯函数，无副作用，结果可缓存

use injection_common::{BeanDescriptor, QualifierSet, TypeArg, TypeKey};

/// 判断候选描述符是否满足注入请求
pub fn matches(
    required_type: &TypeKey,
    required_qualifiers: &QualifierSet,
    candidate: &BeanDescriptor,
) -> bool {
    type_matches(required_type, &candidate.type_closure)
        && qualifiers_match(required_qualifiers, &candidate.qualifiers)
}

/// 类型匹配：类型闭包中存在可赋值给请求类型的成员
pub fn type_matches(required: &TypeKey, closure: &[TypeKey]) -> bool {
    closure.iter().any(|provided| assignable(required, provided))
}

/// 类型可赋值判断
///
/// 名称一致且泛型参数兼容：具体参数不变（要求逐位相等），
/// 通配参数协变，原始请求（无参数）接受任意参数化
pub fn assignable(required: &TypeKey, provided: &TypeKey) -> bool {
    required.name == provided.name && args_compatible(&required.args, &provided.args)
}

fn args_compatible(required: &[TypeArg], provided: &[TypeArg]) -> bool {
    if required.is_empty() {
        return true;
    }
    if required.len() != provided.len() {
        return false;
    }
    required.iter().zip(provided).all(|(req, prov)| match (req, prov) {
        (TypeArg::Wildcard, _) => true,
        (TypeArg::Exact(_), TypeArg::Wildcard) => false,
        (TypeArg::Exact(a), TypeArg::Exact(b)) => a == b,
    })
}

/// 限定符匹配
///
/// 每个请求限定符都必须在候选集合中成员值相等地出现；
/// 候选方多出的限定符不阻碍匹配。空请求隐式要求 default，
/// any 请求只做类型匹配
pub fn qualifiers_match(required: &QualifierSet, candidate: &QualifierSet) -> bool {
    required
        .normalized_for_request()
        .iter()
        .all(|qualifier| qualifier.is_any() || candidate.contains(qualifier))
}
