//! Bean 描述符定义
//!
//! 描述符由外部发现/引导层提供，注册表构建完成后不再变更

use crate::injector::Injector;
use crate::interceptor::{Decorator, InterceptorBinding, MethodDispatcher};
use crate::metadata::BeanMetadata;
use crate::qualifier::{Qualifier, QualifierSet};
use crate::scope::ScopeId;
use crate::typekey::TypeKey;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Bean 实例
///
/// 核心把实例当作不透明对象持有
pub type BeanInstance = Arc<dyn Any + Send + Sync>;

/// 把具体值包装为 Bean 实例
pub fn bean_instance<T: Send + Sync + 'static>(value: T) -> BeanInstance {
    Arc::new(value)
}

/// Bean 标识
///
/// 不透明的稳定标识；未显式给出时随机生成
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeanId(String);

impl BeanId {
    /// 创建指定标识
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 生成随机标识
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// 标识字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BeanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 构建回调
///
/// 回调可以通过注入器递归解析自己的依赖
pub type ConstructionFn =
    Arc<dyn Fn(&dyn Injector) -> anyhow::Result<BeanInstance> + Send + Sync>;

/// 销毁回调
pub type DisposerFn = Arc<dyn Fn(BeanInstance) -> anyhow::Result<()> + Send + Sync>;

/// 外部实例提供者 trait
///
/// 当 Bean 的实例由外部组件模型提供时（如会话 Bean、托管资源），
/// 核心把实例的获取与释放完全委托给提供者，实例本身视为不透明
pub trait InstanceProvider: Send + Sync {
    /// 提供者名称
    fn name(&self) -> &str;

    /// 获取实例；提供者可通过注入器解析自己的依赖
    fn acquire(&self, injector: &dyn Injector) -> anyhow::Result<BeanInstance>;

    /// 释放实例
    fn release(&self, instance: BeanInstance) -> anyhow::Result<()>;
}

/// 构建策略
///
/// 在注册表构建时选定一次，避免在解析/上下文路径上散落类型判断
#[derive(Clone)]
pub enum ConstructionStrategy {
    /// 构造注入
    Constructor(ConstructionFn),
    /// 生产者方法
    Producer(ConstructionFn),
    /// 外部提供的实例
    Foreign(Arc<dyn InstanceProvider>),
}

impl ConstructionStrategy {
    /// 构造注入策略
    pub fn constructor<F>(f: F) -> Self
    where
        F: Fn(&dyn Injector) -> anyhow::Result<BeanInstance> + Send + Sync + 'static,
    {
        ConstructionStrategy::Constructor(Arc::new(f))
    }

    /// 生产者策略
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn(&dyn Injector) -> anyhow::Result<BeanInstance> + Send + Sync + 'static,
    {
        ConstructionStrategy::Producer(Arc::new(f))
    }

    /// 外部提供者策略
    pub fn foreign(provider: Arc<dyn InstanceProvider>) -> Self {
        ConstructionStrategy::Foreign(provider)
    }
}

impl fmt::Debug for ConstructionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionStrategy::Constructor(_) => write!(f, "Constructor(<function>)"),
            ConstructionStrategy::Producer(_) => write!(f, "Producer(<function>)"),
            ConstructionStrategy::Foreign(provider) => {
                write!(f, "Foreign({})", provider.name())
            }
        }
    }
}

/// Bean 描述符
///
/// 注册表构建后不可变；所有权归注册表独有
#[derive(Clone)]
pub struct BeanDescriptor {
    /// Bean 标识
    pub id: BeanId,
    /// 声明类型
    pub declared_type: TypeKey,
    /// 类型闭包（始终包含声明类型）
    pub type_closure: Vec<TypeKey>,
    /// 限定符集合（注册表构建时规范化）
    pub qualifiers: QualifierSet,
    /// 作用域
    pub scope: ScopeId,
    /// 名称
    pub name: Option<String>,
    /// 是否为备选实现
    pub alternative: bool,
    /// 类型是否可代理
    pub proxyable: bool,
    /// 构建策略
    pub construction: ConstructionStrategy,
    /// 销毁回调
    pub disposer: Option<DisposerFn>,
    /// 装饰器列表（声明顺序 = 从外到内）
    pub decorators: Vec<Arc<dyn Decorator>>,
    /// 拦截器绑定（注册表构建时按优先级排序）
    pub interceptors: Vec<InterceptorBinding>,
    /// 方法分发器
    pub dispatcher: Option<MethodDispatcher>,
    /// 元数据
    pub metadata: BeanMetadata,
}

impl BeanDescriptor {
    /// 创建新的描述符
    pub fn new(
        declared_type: TypeKey,
        scope: ScopeId,
        construction: ConstructionStrategy,
    ) -> Self {
        Self {
            id: BeanId::random(),
            type_closure: vec![declared_type.clone()],
            declared_type,
            qualifiers: QualifierSet::new(),
            scope,
            name: None,
            alternative: false,
            proxyable: true,
            construction,
            disposer: None,
            decorators: Vec::new(),
            interceptors: Vec::new(),
            dispatcher: None,
            metadata: BeanMetadata::new(),
        }
    }

    /// 设置标识
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = BeanId::new(id);
        self
    }

    /// 追加可满足的类型（加入类型闭包）
    pub fn with_satisfied_type(mut self, key: TypeKey) -> Self {
        if !self.type_closure.contains(&key) {
            self.type_closure.push(key);
        }
        self
    }

    /// 添加限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.insert(qualifier);
        self
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 标记为备选实现
    pub fn as_alternative(mut self) -> Self {
        self.alternative = true;
        self
    }

    /// 标记类型不可代理
    pub fn non_proxyable(mut self) -> Self {
        self.proxyable = false;
        self
    }

    /// 设置销毁回调
    pub fn with_disposer<F>(mut self, disposer: F) -> Self
    where
        F: Fn(BeanInstance) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.disposer = Some(Arc::new(disposer));
        self
    }

    /// 添加装饰器
    pub fn with_decorator(mut self, decorator: Arc<dyn Decorator>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// 添加拦截器绑定
    pub fn with_interceptor(mut self, binding: InterceptorBinding) -> Self {
        self.interceptors.push(binding);
        self
    }

    /// 设置方法分发器
    pub fn with_dispatcher<F>(mut self, dispatcher: F) -> Self
    where
        F: Fn(&BeanInstance, &str, crate::interceptor::InvocationArgs) -> anyhow::Result<crate::interceptor::InvocationResult>
            + Send
            + Sync
            + 'static,
    {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// 设置元数据
    pub fn with_metadata(mut self, metadata: BeanMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl fmt::Debug for BeanDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDescriptor")
            .field("id", &self.id)
            .field("declared_type", &self.declared_type)
            .field("type_closure", &self.type_closure)
            .field("qualifiers", &self.qualifiers)
            .field("scope", &self.scope)
            .field("name", &self.name)
            .field("alternative", &self.alternative)
            .field("proxyable", &self.proxyable)
            .field("construction", &self.construction)
            .field("decorators", &self.decorators.len())
            .field("interceptors", &self.interceptors)
            .finish()
    }
}
