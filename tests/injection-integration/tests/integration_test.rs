//! 容器端到端集成测试

use injection_abstractions::ProxyHandleExt;
use injection_common::{
    bean_instance, BeanDescriptor, BeanInstance, ConstructionStrategy, ContainerError,
    ContextualKey, InjectionPoint, Injector, InstanceProvider, Qualifier, QualifierSet, ScopeId,
    TypeKey,
};
use injection_composition::{
    clear_global_container, get_global_container, set_global_container, ContainerBuilder,
    ContainerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT_LOGGING: Once = Once::new();

/// 初始化测试日志（幂等）
fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// 应用配置服务
#[derive(Debug)]
struct ConfigService {
    environment: String,
}

/// 请求会话
#[derive(Debug)]
struct Session {
    serial: usize,
}

fn config_type() -> TypeKey {
    TypeKey::new("app::ConfigService")
}

fn session_type() -> TypeKey {
    TypeKey::new("app::Session")
}

#[test]
fn container_resolves_by_type_and_name() {
    init_logging();
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                config_type(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| {
                    Ok(bean_instance(ConfigService {
                        environment: "production".to_string(),
                    }))
                }),
            )
            .with_id("config")
            .with_name("config"),
        )
        .build()
        .unwrap();

    let by_type = container
        .instance(&config_type(), &QualifierSet::new())
        .unwrap();
    assert_eq!(
        by_type.get_of::<ConfigService>().unwrap().environment,
        "production"
    );

    let by_name = container.instance_by_name("config").unwrap();
    assert_eq!(by_name.descriptor().id.as_str(), "config");

    // 命名限定符走同一条解析路径
    let by_qualifier = container
        .instance(&config_type(), &QualifierSet::of([Qualifier::named("config")]))
        .unwrap();
    assert_eq!(by_qualifier.descriptor().id.as_str(), "config");
}

#[test]
fn proxies_stay_valid_across_request_boundaries() {
    let serial = Arc::new(AtomicUsize::new(0));
    let serial_for_bean = serial.clone();
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                session_type(),
                ScopeId::request(),
                ConstructionStrategy::constructor(move |_| {
                    Ok(bean_instance(Session {
                        serial: serial_for_bean.fetch_add(1, Ordering::SeqCst),
                    }))
                }),
            )
            .with_id("session"),
        )
        .build()
        .unwrap();

    // 在任何请求开始之前就拿到句柄（代理）
    let handle = container
        .instance(&session_type(), &QualifierSet::new())
        .unwrap();
    assert!(handle.is_proxied());
    assert!(matches!(
        handle.get(),
        Err(ContainerError::Context { .. })
    ));

    let request_scope = ScopeId::request();

    let first_request = ContextualKey::new();
    container.activate(&request_scope, first_request).unwrap();
    let first = handle.get_of::<Session>().unwrap();
    let first_again = handle.get_of::<Session>().unwrap();
    assert_eq!(first.serial, first_again.serial);
    let report = container.deactivate(&request_scope, &first_request).unwrap();
    assert_eq!(report.destroyed, 1);

    let second_request = ContextualKey::new();
    container.activate(&request_scope, second_request).unwrap();
    let second = handle.get_of::<Session>().unwrap();
    container
        .deactivate(&request_scope, &second_request)
        .unwrap();

    // 同一个代理句柄横跨两个请求，解析到不同实例
    assert_ne!(first.serial, second.serial);
}

#[test]
fn alternative_implementation_wins_resolution() {
    let cache_type = TypeKey::new("app::Cache");
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                cache_type.clone(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| Ok(bean_instance("memory"))),
            )
            .with_id("memory_cache"),
        )
        .register_bean(
            BeanDescriptor::new(
                cache_type.clone(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| Ok(bean_instance("redis"))),
            )
            .with_id("redis_cache")
            .as_alternative(),
        )
        .build()
        .unwrap();

    let resolved = container.select(&cache_type, &QualifierSet::new()).unwrap();
    assert_eq!(resolved.id.as_str(), "redis_cache");
}

#[test]
fn qualifier_members_narrow_candidates() {
    let store_type = TypeKey::new("app::Store");
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                store_type.clone(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| Ok(bean_instance("cn"))),
            )
            .with_id("cn_store")
            .with_qualifier(Qualifier::new("region").with_member("value", "cn")),
        )
        .register_bean(
            BeanDescriptor::new(
                store_type.clone(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| Ok(bean_instance("us"))),
            )
            .with_id("us_store")
            .with_qualifier(Qualifier::new("region").with_member("value", "us")),
        )
        .build()
        .unwrap();

    let cn = container
        .select(
            &store_type,
            &QualifierSet::of([Qualifier::new("region").with_member("value", "cn")]),
        )
        .unwrap();
    assert_eq!(cn.id.as_str(), "cn_store");

    // 两个候选都没有 default 限定符：空请求不满足
    assert!(matches!(
        container.select(&store_type, &QualifierSet::new()),
        Err(injection_common::ResolutionError::Unsatisfied { .. })
    ));

    // any 请求可以枚举全部候选
    let all = container
        .instances_of(&store_type, &QualifierSet::of([Qualifier::any()]))
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn producer_and_disposer_pair_through_lifecycle() {
    let disposed = Arc::new(AtomicUsize::new(0));
    let disposed_for_bean = disposed.clone();
    let pool_type = TypeKey::new("app::Pool");
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                pool_type.clone(),
                ScopeId::singleton(),
                ConstructionStrategy::producer(|_| Ok(bean_instance(vec![1_u8, 2, 3]))),
            )
            .with_id("pool")
            .with_disposer(move |_| {
                disposed_for_bean.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .build()
        .unwrap();

    let handle = container.instance(&pool_type, &QualifierSet::new()).unwrap();
    assert_eq!(handle.get_of::<Vec<u8>>().unwrap().len(), 3);

    let report = container.shutdown();
    assert_eq!(report.destroyed, 1);
    assert!(report.is_clean());
    assert_eq!(disposed.load(Ordering::SeqCst), 1);

    // 重复关闭是空操作
    let report = container.shutdown();
    assert_eq!(report.destroyed, 0);
    assert_eq!(disposed.load(Ordering::SeqCst), 1);
}

/// 模拟外部组件模型的实例提供者
struct StubResourceProvider {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl InstanceProvider for StubResourceProvider {
    fn name(&self) -> &str {
        "stub-resource"
    }

    fn acquire(&self, _injector: &dyn Injector) -> anyhow::Result<BeanInstance> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(bean_instance("foreign-resource"))
    }

    fn release(&self, _instance: BeanInstance) -> anyhow::Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn foreign_provided_beans_follow_the_same_context_rules() {
    let acquired = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicUsize::new(0));
    let resource_type = TypeKey::new("app::Resource");
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                resource_type.clone(),
                ScopeId::singleton(),
                ConstructionStrategy::foreign(Arc::new(StubResourceProvider {
                    acquired: acquired.clone(),
                    released: released.clone(),
                })),
            )
            .with_id("resource"),
        )
        .build()
        .unwrap();

    let handle = container
        .instance(&resource_type, &QualifierSet::new())
        .unwrap();
    handle.get().unwrap();
    handle.get().unwrap();
    assert_eq!(acquired.load(Ordering::SeqCst), 1);

    container.shutdown();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn stats_reflect_container_activity() {
    let container = ContainerBuilder::standard()
        .with_config(ContainerConfig::new().with_max_construction_depth(32))
        .register_bean(
            BeanDescriptor::new(
                config_type(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| {
                    Ok(bean_instance(ConfigService {
                        environment: "test".to_string(),
                    }))
                }),
            )
            .with_id("config"),
        )
        .build()
        .unwrap();

    let handle = container
        .instance(&config_type(), &QualifierSet::new())
        .unwrap();
    handle.get().unwrap();
    handle.get().unwrap();
    // 第二次按类型解析命中缓存
    container
        .instance(&config_type(), &QualifierSet::new())
        .unwrap();

    let stats = container.stats();
    assert_eq!(stats.registered_beans, 1);
    assert_eq!(stats.proxies_created, 1);
    assert_eq!(stats.instances_created, 1);
    assert!(stats.resolution_cache_entries >= 1);
    assert!(stats.resolution_cache_hits >= 1);

    container.shutdown();
    assert_eq!(container.stats().instances_destroyed, 1);
}

#[test]
fn duplicate_names_abort_bootstrap() {
    let result = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                TypeKey::new("app::A"),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| Ok(bean_instance(0_u32))),
            )
            .with_id("a")
            .with_name("dup"),
        )
        .register_bean(
            BeanDescriptor::new(
                TypeKey::new("app::B"),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| Ok(bean_instance(0_u32))),
            )
            .with_id("b")
            .with_name("dup"),
        )
        .build();

    assert!(matches!(result, Err(ContainerError::Definition { .. })));
}

#[test]
fn optional_injection_points_tolerate_absence() {
    let container = ContainerBuilder::standard().build().unwrap();

    let optional = InjectionPoint::lookup(TypeKey::new("app::Missing")).optional();
    assert!(container.manager().instance_for(&optional).unwrap().is_none());

    let required = InjectionPoint::lookup(TypeKey::new("app::Missing"));
    assert!(container.manager().instance_for(&required).is_err());
}

#[test]
fn global_container_holder_roundtrip() {
    let container = ContainerBuilder::standard().build().unwrap();
    set_global_container(Arc::new(container));

    let shared = get_global_container().unwrap();
    assert_eq!(shared.registry().len(), 0);

    clear_global_container();
    assert!(get_global_container().is_none());
}

#[test]
fn injected_dependencies_resolve_recursively() {
    let greeting_type = TypeKey::new("app::Greeting");
    let config_type_for_bean = config_type();
    let container = ContainerBuilder::standard()
        .register_bean(
            BeanDescriptor::new(
                config_type(),
                ScopeId::singleton(),
                ConstructionStrategy::constructor(|_| {
                    Ok(bean_instance(ConfigService {
                        environment: "staging".to_string(),
                    }))
                }),
            )
            .with_id("config"),
        )
        .register_bean(
            BeanDescriptor::new(
                greeting_type.clone(),
                ScopeId::dependent(),
                ConstructionStrategy::constructor(move |injector| {
                    // 普通作用域依赖注入的是客户端代理
                    let config = injector.instance(&config_type_for_bean, &QualifierSet::new())?;
                    let proxy = injection_impl::as_proxy(&config)
                        .ok_or_else(|| anyhow::anyhow!("预期得到客户端代理"))?;
                    let environment = proxy.current_of::<ConfigService>()?.environment.clone();
                    Ok(bean_instance(format!("hello from {environment}")))
                }),
            )
            .with_id("greeting"),
        )
        .build()
        .unwrap();

    let handle = container
        .instance(&greeting_type, &QualifierSet::new())
        .unwrap();
    assert_eq!(
        handle.get_of::<String>().unwrap().as_str(),
        "hello from staging"
    );
}
