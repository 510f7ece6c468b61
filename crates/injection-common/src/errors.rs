//! 错误类型定义

use crate::descriptor::BeanId;
use crate::qualifier::QualifierSet;
use crate::scope::{ContextualKey, ScopeId};
use crate::typekey::TypeKey;
use thiserror::Error;

/// 定义错误类型
///
/// 注册表构建阶段发现的结构性问题；致命，容器不得启动
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Bean {bean_id} 的作用域 {scope} 没有注册上下文实现")]
    UnknownScope { bean_id: BeanId, scope: ScopeId },

    #[error("普通作用域 Bean {bean_id} 的类型不可代理")]
    UnproxyableType { bean_id: BeanId },

    #[error("Bean 标识重复: {bean_id}")]
    DuplicateBeanId { bean_id: BeanId },

    #[error("Bean 名称冲突: {name}, 冲突的 Bean: {bean_ids:?}")]
    ConflictingName { name: String, bean_ids: Vec<BeanId> },

    #[error("Bean {bean_id} 声明了拦截器绑定但缺少方法分发器")]
    MissingDispatcher { bean_id: BeanId },

    #[error("注册表构建失败，共 {} 个定义错误", .errors.len())]
    Aggregate { errors: Vec<DefinitionError> },
}

/// 解析错误类型
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    #[error("依赖不满足: 类型 {required_type}, 限定符 {qualifiers}")]
    Unsatisfied {
        required_type: TypeKey,
        qualifiers: QualifierSet,
    },

    #[error("依赖解析歧义: 类型 {required_type}, 限定符 {qualifiers}, 候选 Bean: {candidates:?}")]
    Ambiguous {
        required_type: TypeKey,
        qualifiers: QualifierSet,
        candidates: Vec<BeanId>,
    },

    #[error("不存在名称为 {name} 的 Bean")]
    NoSuchName { name: String },

    #[error("名称 {name} 对应多个 Bean: {candidates:?}")]
    AmbiguousName {
        name: String,
        candidates: Vec<BeanId>,
    },
}

/// 上下文错误类型
#[derive(Error, Debug, Clone)]
pub enum ContextError {
    #[error("作用域 {scope} 当前没有激活的上下文")]
    NotActive { scope: ScopeId },

    #[error("作用域 {scope} 未注册上下文实现")]
    UnknownScope { scope: ScopeId },

    #[error("作用域 {scope} 的上下文键 {key} 不是当前线程的活动键")]
    NotCurrent { scope: ScopeId, key: ContextualKey },
}

/// 构建错误类型
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("检测到循环依赖: {chain}")]
    CircularDependency { chain: String },

    #[error("构建递归深度超过上限 {limit}")]
    DepthExceeded { limit: usize },

    #[error("Bean {bean_id} 构建回调失败")]
    CallbackFailed {
        bean_id: BeanId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Bean {bean_id} 装饰失败, 装饰器: {decorator}")]
    DecorationFailed {
        bean_id: BeanId,
        decorator: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("外部提供者获取实例失败: Bean {bean_id}, 提供者: {provider}")]
    ProviderFailed {
        bean_id: BeanId,
        provider: String,
        #[source]
        source: anyhow::Error,
    },
}

/// 销毁错误类型
#[derive(Error, Debug)]
pub enum DestructionError {
    #[error("Bean {bean_id} 销毁回调失败")]
    DisposerFailed {
        bean_id: BeanId,
        #[source]
        source: anyhow::Error,
    },

    #[error("外部提供者释放实例失败: Bean {bean_id}, 提供者: {provider}")]
    ReleaseFailed {
        bean_id: BeanId,
        provider: String,
        #[source]
        source: anyhow::Error,
    },
}

/// 方法调用错误类型
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("Bean {bean_id} 未声明方法分发器")]
    NoDispatcher { bean_id: BeanId },

    #[error("Bean {bean_id} 方法 {method} 调用失败")]
    MethodFailed {
        bean_id: BeanId,
        method: String,
        #[source]
        source: anyhow::Error,
    },
}

/// 容器错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("定义错误: {source}")]
    Definition {
        #[from]
        source: DefinitionError,
    },

    #[error("解析错误: {source}")]
    Resolution {
        #[from]
        source: ResolutionError,
    },

    #[error("上下文错误: {source}")]
    Context {
        #[from]
        source: ContextError,
    },

    #[error("构建错误: {source}")]
    Construction {
        #[from]
        source: ConstructionError,
    },

    #[error("销毁错误: {source}")]
    Destruction {
        #[from]
        source: DestructionError,
    },

    #[error("方法调用错误: {source}")]
    Invocation {
        #[from]
        source: InvocationError,
    },

    #[error("伪作用域 Bean {bean_id} 不支持客户端代理")]
    ProxyUnsupported { bean_id: BeanId },

    #[error("实例类型转换失败: 期望 {expected}")]
    DowncastFailed { expected: String },
}

impl ContainerError {
    /// 是否为依赖不满足错误
    pub fn is_unsatisfied(&self) -> bool {
        matches!(
            self,
            ContainerError::Resolution {
                source: ResolutionError::Unsatisfied { .. }
            }
        )
    }

    /// 是否为解析歧义错误
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            ContainerError::Resolution {
                source: ResolutionError::Ambiguous { .. }
            }
        )
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(
            self,
            ContainerError::Construction {
                source: ConstructionError::CircularDependency { .. }
            }
        )
    }
}

/// 结果类型别名
pub type DefinitionResult<T> = Result<T, DefinitionError>;
pub type ResolutionResult<T> = Result<T, ResolutionError>;
pub type ContextResult<T> = Result<T, ContextError>;
pub type ConstructionResult<T> = Result<T, ConstructionError>;
pub type DestructionResult<T> = Result<T, DestructionError>;
pub type ContainerResult<T> = Result<T, ContainerError>;
