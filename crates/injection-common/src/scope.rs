//! 作用域定义
//!
//! 作用域决定上下文实例的生命周期与共享方式

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 内置单例作用域名称
pub const SINGLETON_SCOPE: &str = "singleton";
/// 内置请求作用域名称
pub const REQUEST_SCOPE: &str = "request";
/// 内置依赖作用域名称
pub const DEPENDENT_SCOPE: &str = "dependent";

/// 作用域类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// 普通作用域 - 实例存储于上下文中，通过客户端代理访问
    Normal,
    /// 伪作用域 - 无持久存储，每次访问产生新实例，不使用代理
    Pseudo,
}

/// 作用域标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(String);

impl ScopeId {
    /// 创建新的作用域标识
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 内置单例作用域
    pub fn singleton() -> Self {
        Self::new(SINGLETON_SCOPE)
    }

    /// 内置请求作用域
    pub fn request() -> Self {
        Self::new(REQUEST_SCOPE)
    }

    /// 内置依赖作用域
    pub fn dependent() -> Self {
        Self::new(DEPENDENT_SCOPE)
    }

    /// 作用域名称
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 上下文键
///
/// 区分同一作用域并发活动的多个上下文实例（如每个请求一个）；
/// 无键作用域使用 nil 键
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ContextualKey(Uuid);

impl ContextualKey {
    /// 创建新的上下文键
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 无键作用域使用的固定键
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// 是否为固定键
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ContextualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scope_ids() {
        assert_eq!(ScopeId::singleton().as_str(), SINGLETON_SCOPE);
        assert_eq!(ScopeId::request().as_str(), REQUEST_SCOPE);
        assert_eq!(ScopeId::dependent().as_str(), DEPENDENT_SCOPE);
    }

    #[test]
    fn contextual_keys_are_distinct() {
        assert_ne!(ContextualKey::new(), ContextualKey::new());
        assert_eq!(ContextualKey::nil(), ContextualKey::nil());
        assert!(ContextualKey::nil().is_nil());
    }
}
