//! 客户端代理集成测试

use injection_abstractions::{Context, ProxyHandle, ProxyHandleExt};
use injection_common::{
    bean_instance, BeanDescriptor, BeanId, ConstructionStrategy, ContainerError, ContextualKey,
    QualifierSet, ScopeId, TypeKey,
};
use injection_impl::{
    as_proxy, BeanRegistry, BeanResolver, ContextRegistry, ContextualInstanceManager,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试服务
#[derive(Debug)]
struct TestService {
    serial: usize,
}

fn build_manager(
    descriptors: Vec<BeanDescriptor>,
) -> (Arc<ContextualInstanceManager>, Arc<ContextRegistry>) {
    let contexts = Arc::new(ContextRegistry::standard());
    let registry = Arc::new(BeanRegistry::build(descriptors, &contexts).unwrap());
    let resolver = Arc::new(BeanResolver::new(registry.clone()));
    let manager = ContextualInstanceManager::new(registry, resolver, contexts.clone(), 100);
    contexts
        .require(&ScopeId::singleton())
        .unwrap()
        .activate(ContextualKey::nil())
        .unwrap();
    (manager, contexts)
}

fn serial_constructor(counter: Arc<AtomicUsize>) -> ConstructionStrategy {
    ConstructionStrategy::constructor(move |_| {
        let serial = counter.fetch_add(1, Ordering::SeqCst);
        Ok(bean_instance(TestService { serial }))
    })
}

fn descriptor_by_id(
    manager: &Arc<ContextualInstanceManager>,
    id: &str,
) -> Arc<BeanDescriptor> {
    manager
        .registry()
        .by_id(&BeanId::new(id))
        .cloned()
        .unwrap()
}

#[test]
fn proxy_identity_is_memoized_per_bean() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (manager, _contexts) = build_manager(vec![BeanDescriptor::new(
        TypeKey::new("svc::Config"),
        ScopeId::singleton(),
        serial_constructor(counter),
    )
    .with_id("config")]);
    let descriptor = descriptor_by_id(&manager, "config");

    let first = manager.proxy_for(&descriptor).unwrap();
    let second = manager.proxy_for(&descriptor).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // 注入得到的不透明实例还原出同一个代理
    let injected = manager.reference_for(&descriptor).unwrap();
    let recovered = as_proxy(&injected).unwrap();
    assert!(Arc::ptr_eq(&first, &recovered));
}

#[test]
fn proxy_obtained_before_activation_stays_valid() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (manager, contexts) = build_manager(vec![BeanDescriptor::new(
        TypeKey::new("svc::Session"),
        ScopeId::request(),
        serial_constructor(counter),
    )
    .with_id("session")]);
    let descriptor = descriptor_by_id(&manager, "session");
    let request = contexts.require(&ScopeId::request()).unwrap();

    // 作用域尚未激活时就能拿到代理
    let proxy = manager.proxy_for(&descriptor).unwrap();
    let error = proxy.current().unwrap_err();
    assert!(matches!(error, ContainerError::Context { .. }));

    // 第一个作用域实例
    let key_one = ContextualKey::new();
    request.activate(key_one).unwrap();
    let first = proxy.current_of::<TestService>().unwrap();
    request.deactivate(&key_one).unwrap();

    // 第二个作用域实例：同一个代理解析到新实例
    let key_two = ContextualKey::new();
    request.activate(key_two).unwrap();
    let second = proxy.current_of::<TestService>().unwrap();
    request.deactivate(&key_two).unwrap();

    assert_ne!(first.serial, second.serial);
}

#[test]
fn proxy_current_follows_instance_replacement() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (manager, _contexts) = build_manager(vec![BeanDescriptor::new(
        TypeKey::new("svc::Config"),
        ScopeId::singleton(),
        serial_constructor(counter),
    )
    .with_id("config")]);
    let descriptor = descriptor_by_id(&manager, "config");

    let proxy = manager.proxy_for(&descriptor).unwrap();
    let before = proxy.current_of::<TestService>().unwrap();
    manager.destroy(&descriptor, &ContextualKey::nil());
    let after = proxy.current_of::<TestService>().unwrap();

    assert_ne!(before.serial, after.serial);
}

#[test]
fn pseudo_scoped_beans_have_no_proxy() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (manager, _contexts) = build_manager(vec![BeanDescriptor::new(
        TypeKey::new("svc::Task"),
        ScopeId::dependent(),
        serial_constructor(counter),
    )
    .with_id("task")]);
    let descriptor = descriptor_by_id(&manager, "task");

    assert!(matches!(
        manager.proxy_for(&descriptor),
        Err(ContainerError::ProxyUnsupported { .. })
    ));

    // 每次解析得到新实例
    let handle = manager.handle_for(&descriptor).unwrap();
    assert!(!handle.is_proxied());
    let first = handle.get_of::<TestService>().unwrap();
    let second = handle.get_of::<TestService>().unwrap();
    assert_ne!(first.serial, second.serial);
}

#[test]
fn handle_resolves_typed_instances() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (manager, _contexts) = build_manager(vec![BeanDescriptor::new(
        TypeKey::new("svc::Config"),
        ScopeId::singleton(),
        serial_constructor(counter),
    )
    .with_id("config")]);
    let descriptor = descriptor_by_id(&manager, "config");

    let handle = manager.handle_for(&descriptor).unwrap();
    assert!(handle.is_proxied());
    let first = handle.get_of::<TestService>().unwrap();
    let second = handle.get_of::<TestService>().unwrap();
    assert_eq!(first.serial, second.serial);

    assert!(matches!(
        handle.get_of::<String>(),
        Err(ContainerError::DowncastFailed { .. })
    ));
}

#[test]
fn injected_reference_for_normal_scope_is_the_proxy() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config_type = TypeKey::new("svc::Config");
    let config_type_for_consumer = config_type.clone();
    let (manager, _contexts) = build_manager(vec![
        BeanDescriptor::new(
            config_type.clone(),
            ScopeId::singleton(),
            serial_constructor(counter),
        )
        .with_id("config"),
        BeanDescriptor::new(
            TypeKey::new("svc::Consumer"),
            ScopeId::singleton(),
            ConstructionStrategy::constructor(move |injector| {
                use injection_common::Injector;
                let config = injector.instance(&config_type_for_consumer, &QualifierSet::new())?;
                Ok(bean_instance(config))
            }),
        )
        .with_id("consumer"),
    ]);
    let consumer = descriptor_by_id(&manager, "consumer");

    let instance = manager.get_or_create(&consumer).unwrap();
    let inner = instance
        .instance()
        .downcast_ref::<injection_common::BeanInstance>()
        .unwrap();
    assert!(as_proxy(inner).is_some());
}
