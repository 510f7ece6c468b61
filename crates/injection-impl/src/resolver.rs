//! 类型安全解析器
//!
//! 对每个不同的 (类型, 限定符集合) 请求只计算一次解析结果；
//! 注册表不可变，缓存结果（包括终态错误）永不改变

use crate::matcher;
use crate::registry::BeanRegistry;
use dashmap::DashMap;
use injection_abstractions::BeanResolution;
use injection_common::{
    BeanDescriptor, QualifierSet, ResolutionError, ResolutionResult, TypeKey,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 解析缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    required_type: TypeKey,
    qualifiers: QualifierSet,
}

/// 缓存的解析结果
#[derive(Debug, Clone)]
enum CachedOutcome {
    Resolved(Arc<BeanDescriptor>),
    Failed(ResolutionError),
}

impl CachedOutcome {
    fn as_result(&self) -> ResolutionResult<Arc<BeanDescriptor>> {
        match self {
            CachedOutcome::Resolved(descriptor) => Ok(descriptor.clone()),
            CachedOutcome::Failed(error) => Err(error.clone()),
        }
    }
}

/// 类型安全解析器
///
/// 缓存是本组件唯一的可变状态；并发写入同一键会收敛到
/// 相同结果，重复计算无害
pub struct BeanResolver {
    registry: Arc<BeanRegistry>,
    cache: DashMap<ResolutionKey, CachedOutcome>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BeanResolver {
    /// 创建新的解析器
    pub fn new(registry: Arc<BeanRegistry>) -> Self {
        Self {
            registry,
            cache: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 解析唯一满足请求的描述符
    pub fn resolve(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Arc<BeanDescriptor>> {
        let key = ResolutionKey {
            required_type: required_type.clone(),
            qualifiers: qualifiers.clone(),
        };
        if let Some(cached) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.as_result();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let outcome = self.compute(required_type, qualifiers);
        let entry = self.cache.entry(key).or_insert(outcome);
        entry.as_result()
    }

    /// 容忍缺失的解析；依赖不满足时返回 None，歧义仍然报错
    pub fn try_resolve(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Option<Arc<BeanDescriptor>>> {
        match self.resolve(required_type, qualifiers) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(ResolutionError::Unsatisfied { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// 按名称解析
    pub fn resolve_by_name(&self, name: &str) -> ResolutionResult<Arc<BeanDescriptor>> {
        match self.registry.by_name(name) {
            [] => Err(ResolutionError::NoSuchName {
                name: name.to_string(),
            }),
            [single] => Ok(single.clone()),
            many => Err(ResolutionError::AmbiguousName {
                name: name.to_string(),
                candidates: many.iter().map(|bean| bean.id.clone()).collect(),
            }),
        }
    }

    /// 返回所有满足请求的描述符（不做消歧，不走缓存）
    pub fn resolve_all(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> Vec<Arc<BeanDescriptor>> {
        self.registry
            .iter()
            .filter(|candidate| matcher::matches(required_type, qualifiers, candidate))
            .cloned()
            .collect()
    }

    /// 缓存条目数
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// 缓存命中次数
    pub fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// 缓存未命中次数
    pub fn cache_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn compute(&self, required_type: &TypeKey, qualifiers: &QualifierSet) -> CachedOutcome {
        let candidates: Vec<Arc<BeanDescriptor>> = self
            .registry
            .iter()
            .filter(|candidate| matcher::matches(required_type, qualifiers, candidate))
            .cloned()
            .collect();
        debug!(
            "解析请求 {} {}: {} 个候选",
            required_type,
            qualifiers,
            candidates.len()
        );

        let mut survivors = if candidates.len() > 1 {
            Self::disambiguate(required_type, qualifiers, candidates)
        } else {
            candidates
        };

        match (survivors.pop(), survivors.is_empty()) {
            (None, _) => CachedOutcome::Failed(ResolutionError::Unsatisfied {
                required_type: required_type.clone(),
                qualifiers: qualifiers.clone(),
            }),
            (Some(descriptor), true) => CachedOutcome::Resolved(descriptor),
            (Some(descriptor), false) => {
                survivors.push(descriptor);
                CachedOutcome::Failed(ResolutionError::Ambiguous {
                    required_type: required_type.clone(),
                    qualifiers: qualifiers.clone(),
                    candidates: survivors.iter().map(|bean| bean.id.clone()).collect(),
                })
            }
        }
    }

    /// 按既定顺序消歧：备选实现优先、请求名称唯一匹配、
    /// 声明类型完全一致
    fn disambiguate(
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
        mut candidates: Vec<Arc<BeanDescriptor>>,
    ) -> Vec<Arc<BeanDescriptor>> {
        // 规则一：存在备选实现时优先于普通实现
        if candidates.iter().any(|bean| bean.alternative)
            && candidates.iter().any(|bean| !bean.alternative)
        {
            candidates.retain(|bean| bean.alternative);
        }
        if candidates.len() <= 1 {
            return candidates;
        }

        // 规则二：请求带命名限定符时，唯一名称匹配者胜出
        if let Some(name) = qualifiers.named_value() {
            let named: Vec<Arc<BeanDescriptor>> = candidates
                .iter()
                .filter(|bean| bean.name.as_deref() == Some(name))
                .cloned()
                .collect();
            if named.len() == 1 {
                return named;
            }
        }

        // 规则三：声明类型与请求类型完全一致者优先于
        // 仅通过闭包超类型匹配者
        let exact: Vec<Arc<BeanDescriptor>> = candidates
            .iter()
            .filter(|bean| bean.declared_type == *required_type)
            .cloned()
            .collect();
        if !exact.is_empty() && exact.len() < candidates.len() {
            return exact;
        }

        candidates
    }
}

impl BeanResolution for BeanResolver {
    fn resolve(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Arc<BeanDescriptor>> {
        BeanResolver::resolve(self, required_type, qualifiers)
    }

    fn try_resolve(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> ResolutionResult<Option<Arc<BeanDescriptor>>> {
        BeanResolver::try_resolve(self, required_type, qualifiers)
    }

    fn resolve_by_name(&self, name: &str) -> ResolutionResult<Arc<BeanDescriptor>> {
        BeanResolver::resolve_by_name(self, name)
    }

    fn resolve_all(
        &self,
        required_type: &TypeKey,
        qualifiers: &QualifierSet,
    ) -> Vec<Arc<BeanDescriptor>> {
        BeanResolver::resolve_all(self, required_type, qualifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::ContextRegistry;
    use injection_common::{
        bean_instance, BeanDescriptor, ConstructionStrategy, Qualifier, ScopeId,
    };

    fn constructor() -> ConstructionStrategy {
        ConstructionStrategy::constructor(|_| Ok(bean_instance(0_u32)))
    }

    fn registry(descriptors: Vec<BeanDescriptor>) -> Arc<BeanRegistry> {
        let contexts = ContextRegistry::standard();
        Arc::new(BeanRegistry::build(descriptors, &contexts).unwrap())
    }

    fn cache_key() -> TypeKey {
        TypeKey::new("svc::Cache")
    }

    #[test]
    fn unique_match_resolves_and_caches() {
        let resolver = BeanResolver::new(registry(vec![BeanDescriptor::new(
            cache_key(),
            ScopeId::singleton(),
            constructor(),
        )
        .with_id("cache")]));

        let first = resolver.resolve(&cache_key(), &QualifierSet::new()).unwrap();
        let second = resolver.resolve(&cache_key(), &QualifierSet::new()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cache_misses(), 1);
        assert_eq!(resolver.cache_hits(), 1);
        assert_eq!(resolver.cache_size(), 1);
    }

    #[test]
    fn no_candidate_is_unsatisfied_and_cached() {
        let resolver = BeanResolver::new(registry(Vec::new()));

        for _ in 0..2 {
            let error = resolver
                .resolve(&cache_key(), &QualifierSet::new())
                .unwrap_err();
            assert!(matches!(error, ResolutionError::Unsatisfied { .. }));
        }
        assert_eq!(resolver.cache_misses(), 1);
        assert_eq!(resolver.cache_hits(), 1);
    }

    #[test]
    fn unresolved_tie_reports_all_survivors() {
        let resolver = BeanResolver::new(registry(vec![
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("a"),
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("b"),
        ]));

        let error = resolver
            .resolve(&cache_key(), &QualifierSet::new())
            .unwrap_err();
        match error {
            ResolutionError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("预期歧义错误, 实际: {other}"),
        }
    }

    #[test]
    fn alternative_wins_over_plain_candidate() {
        let resolver = BeanResolver::new(registry(vec![
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("plain"),
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor())
                .with_id("alt")
                .as_alternative(),
        ]));

        let resolved = resolver.resolve(&cache_key(), &QualifierSet::new()).unwrap();
        assert_eq!(resolved.id.as_str(), "alt");
    }

    #[test]
    fn requested_name_breaks_tie() {
        let resolver = BeanResolver::new(registry(vec![
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor())
                .with_id("redis")
                .with_name("redis"),
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor())
                .with_id("memory")
                .with_qualifier(Qualifier::named("redis")),
        ]));

        let qualifiers = QualifierSet::of([Qualifier::named("redis")]);
        let resolved = resolver.resolve(&cache_key(), &qualifiers).unwrap();
        assert_eq!(resolved.id.as_str(), "redis");
    }

    #[test]
    fn exact_declared_type_breaks_tie() {
        let resolver = BeanResolver::new(registry(vec![
            BeanDescriptor::new(TypeKey::new("svc::RedisCache"), ScopeId::singleton(), constructor())
                .with_id("via_closure")
                .with_satisfied_type(cache_key()),
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("exact"),
        ]));

        let resolved = resolver.resolve(&cache_key(), &QualifierSet::new()).unwrap();
        assert_eq!(resolved.id.as_str(), "exact");
    }

    #[test]
    fn try_resolve_tolerates_absence_only() {
        let resolver = BeanResolver::new(registry(vec![
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("a"),
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("b"),
        ]));

        assert!(resolver
            .try_resolve(&TypeKey::new("svc::Missing"), &QualifierSet::new())
            .unwrap()
            .is_none());
        assert!(resolver
            .try_resolve(&cache_key(), &QualifierSet::new())
            .is_err());
    }

    #[test]
    fn resolve_by_name_requires_unique_name() {
        let resolver = BeanResolver::new(registry(vec![BeanDescriptor::new(
            cache_key(),
            ScopeId::singleton(),
            constructor(),
        )
        .with_id("cache")
        .with_name("cache")]));

        assert_eq!(
            resolver.resolve_by_name("cache").unwrap().id.as_str(),
            "cache"
        );
        assert!(matches!(
            resolver.resolve_by_name("missing"),
            Err(ResolutionError::NoSuchName { .. })
        ));
    }

    #[test]
    fn resolve_all_skips_disambiguation() {
        let resolver = BeanResolver::new(registry(vec![
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor()).with_id("plain"),
            BeanDescriptor::new(cache_key(), ScopeId::singleton(), constructor())
                .with_id("alt")
                .as_alternative(),
        ]));

        let all = resolver.resolve_all(&cache_key(), &QualifierSet::new());
        assert_eq!(all.len(), 2);
    }
}
