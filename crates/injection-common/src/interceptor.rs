//! 拦截器与装饰器定义
//!
//! 横切包装器在实例构建完成后、存入上下文之前套在实例外层；
//! 拦截器在方法调用时按优先级组成调用链

use crate::descriptor::{BeanDescriptor, BeanInstance};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 方法调用参数
pub type InvocationArgs = Vec<Box<dyn Any + Send>>;

/// 方法调用返回值
pub type InvocationResult = Box<dyn Any + Send>;

/// 方法分发器
///
/// 调用链的终点：把一次方法调用落到目标实例上。
/// 由使用方按被代理类型的公开契约提供显式转发实现
pub type MethodDispatcher = Arc<
    dyn Fn(&BeanInstance, &str, InvocationArgs) -> anyhow::Result<InvocationResult>
        + Send
        + Sync,
>;

/// 装饰器 trait
///
/// 按声明顺序从外到内包装新建实例，可选择委托给被包装对象
pub trait Decorator: Send + Sync {
    /// 装饰器名称
    fn name(&self) -> &str;

    /// 包装被委托实例，返回对外暴露的新实例
    fn decorate(&self, delegate: BeanInstance) -> anyhow::Result<BeanInstance>;
}

/// 方法拦截器 trait
pub trait MethodInterceptor: Send + Sync {
    /// 拦截器名称
    fn name(&self) -> &str;

    /// 拦截一次方法调用；通过 [`Invocation::proceed`] 继续调用链
    fn intercept(&self, invocation: Invocation<'_>) -> anyhow::Result<InvocationResult>;
}

/// 拦截方法筛选
#[derive(Debug, Clone)]
pub enum InterceptionFilter {
    /// 拦截全部方法
    All,
    /// 仅拦截列出的方法
    Methods(Vec<String>),
}

impl InterceptionFilter {
    /// 判断方法是否被拦截
    pub fn accepts(&self, method: &str) -> bool {
        match self {
            InterceptionFilter::All => true,
            InterceptionFilter::Methods(methods) => methods.iter().any(|m| m == method),
        }
    }
}

/// 拦截器绑定
///
/// 优先级数值越小越靠外（进入时先执行、返回时后执行）
#[derive(Clone)]
pub struct InterceptorBinding {
    /// 拦截器实现
    pub interceptor: Arc<dyn MethodInterceptor>,
    /// 优先级
    pub priority: i32,
    /// 方法筛选
    pub filter: InterceptionFilter,
}

impl InterceptorBinding {
    /// 创建拦截全部方法的绑定
    pub fn new(interceptor: Arc<dyn MethodInterceptor>, priority: i32) -> Self {
        Self {
            interceptor,
            priority,
            filter: InterceptionFilter::All,
        }
    }

    /// 限定被拦截的方法
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = String>) -> Self {
        self.filter = InterceptionFilter::Methods(methods.into_iter().collect());
        self
    }
}

impl fmt::Debug for InterceptorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorBinding")
            .field("interceptor", &self.interceptor.name())
            .field("priority", &self.priority)
            .field("filter", &self.filter)
            .finish()
    }
}

/// 一次方法调用
///
/// 由容器在调用链起点创建；每个拦截器通过 [`Invocation::proceed`]
/// 把控制权交给下一个拦截器，链尾落到方法分发器
pub struct Invocation<'a> {
    target: &'a BeanInstance,
    method: &'a str,
    args: InvocationArgs,
    chain: &'a [Arc<dyn MethodInterceptor>],
    dispatcher: &'a MethodDispatcher,
}

impl<'a> Invocation<'a> {
    /// 创建调用链起点
    pub fn new(
        target: &'a BeanInstance,
        method: &'a str,
        args: InvocationArgs,
        chain: &'a [Arc<dyn MethodInterceptor>],
        dispatcher: &'a MethodDispatcher,
    ) -> Self {
        Self {
            target,
            method,
            args,
            chain,
            dispatcher,
        }
    }

    /// 目标实例
    pub fn target(&self) -> &BeanInstance {
        self.target
    }

    /// 被调用的方法名
    pub fn method(&self) -> &str {
        self.method
    }

    /// 调用参数
    pub fn args(&self) -> &InvocationArgs {
        &self.args
    }

    /// 可变调用参数
    pub fn args_mut(&mut self) -> &mut InvocationArgs {
        &mut self.args
    }

    /// 继续调用链
    ///
    /// 链中还有拦截器时交给下一个，否则落到方法分发器；
    /// 任一环节的失败原样向外传播
    pub fn proceed(self) -> anyhow::Result<InvocationResult> {
        match self.chain.split_first() {
            Some((next, rest)) => next.intercept(Invocation {
                target: self.target,
                method: self.method,
                args: self.args,
                chain: rest,
                dispatcher: self.dispatcher,
            }),
            None => self.dispatcher.as_ref()(self.target, self.method, self.args),
        }
    }
}

/// 拦截目标
///
/// 方法调用链的进入点：按优先级排好序的拦截器从外到内执行，
/// 链尾经方法分发器落到原始实例。装饰器包装在拦截目标之外，
/// 因此调用顺序是 装饰器 -> 拦截器 -> 目标方法。
/// 最内层装饰器的被委托对象就是这个类型，显式转发实现通过
/// [`InterceptedTarget::invoke`] 把调用交还给链
pub struct InterceptedTarget {
    descriptor: Arc<BeanDescriptor>,
    raw: BeanInstance,
}

impl InterceptedTarget {
    /// 创建拦截目标
    pub fn new(descriptor: Arc<BeanDescriptor>, raw: BeanInstance) -> Self {
        Self { descriptor, raw }
    }

    /// 原始实例（未经装饰与拦截）
    pub fn raw(&self) -> &BeanInstance {
        &self.raw
    }

    /// 通过拦截器链调用方法
    pub fn invoke(&self, method: &str, args: InvocationArgs) -> anyhow::Result<InvocationResult> {
        let dispatcher = self.descriptor.dispatcher.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Bean {} 未声明方法分发器", self.descriptor.id)
        })?;
        let chain: Vec<Arc<dyn MethodInterceptor>> = self
            .descriptor
            .interceptors
            .iter()
            .filter(|binding| binding.filter.accepts(method))
            .map(|binding| binding.interceptor.clone())
            .collect();
        Invocation::new(&self.raw, method, args, &chain, dispatcher).proceed()
    }
}

impl fmt::Debug for InterceptedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedTarget")
            .field("bean", &self.descriptor.id)
            .field("interceptors", &self.descriptor.interceptors.len())
            .finish()
    }
}
