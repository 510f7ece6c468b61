//! 类型键定义
//!
//! 以结构化形式表示可注入类型，供类型匹配与解析缓存使用

use serde::{Deserialize, Serialize};
use std::fmt;

/// 类型键的泛型参数
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeArg {
    /// 具体类型参数，匹配时不变（必须逐位相等）
    Exact(TypeKey),
    /// 通配参数，匹配时协变（接受任意实参）
    Wildcard,
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Exact(key) => write!(f, "{}", key),
            TypeArg::Wildcard => write!(f, "_"),
        }
    }
}

/// 类型键
///
/// 由外部发现层在构建 Bean 描述符时给出；类型闭包的每个成员
/// 都是一个类型键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    /// 类型名称（完整路径）
    pub name: String,
    /// 泛型参数列表；原始请求（无参数）可匹配任意参数化
    pub args: Vec<TypeArg>,
}

impl TypeKey {
    /// 创建新的类型键
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// 从 Rust 类型获取类型键
    pub fn of<T: 'static>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// 追加具体泛型参数
    pub fn with_arg(mut self, arg: TypeKey) -> Self {
        self.args.push(TypeArg::Exact(arg));
        self
    }

    /// 追加通配泛型参数
    pub fn with_wildcard_arg(mut self) -> Self {
        self.args.push(TypeArg::Wildcard);
        self
    }

    /// 是否为原始请求（不带泛型参数）
    pub fn is_raw(&self) -> bool {
        self.args.is_empty()
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        self.name.split("::").last().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}
