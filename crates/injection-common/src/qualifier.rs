//! 限定符定义
//!
//! 限定符在类型之外进一步收窄注入请求可接受的 Bean 集合

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 内置默认限定符名称
pub const DEFAULT_QUALIFIER: &str = "default";
/// 内置任意限定符名称
pub const ANY_QUALIFIER: &str = "any";
/// 内置命名限定符名称
pub const NAMED_QUALIFIER: &str = "named";

/// 限定符成员值
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualifierValue {
    /// 布尔值
    Bool(bool),
    /// 整数值
    Int(i64),
    /// 字符串值
    Str(String),
}

impl fmt::Display for QualifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualifierValue::Bool(v) => write!(f, "{}", v),
            QualifierValue::Int(v) => write!(f, "{}", v),
            QualifierValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for QualifierValue {
    fn from(value: bool) -> Self {
        QualifierValue::Bool(value)
    }
}

impl From<i64> for QualifierValue {
    fn from(value: i64) -> Self {
        QualifierValue::Int(value)
    }
}

impl From<&str> for QualifierValue {
    fn from(value: &str) -> Self {
        QualifierValue::Str(value.to_string())
    }
}

impl From<String> for QualifierValue {
    fn from(value: String) -> Self {
        QualifierValue::Str(value)
    }
}

/// 限定符
///
/// 带可选成员值的标签；成员值参与相等性比较
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Qualifier {
    /// 限定符名称
    pub name: String,
    /// 成员值
    pub members: BTreeMap<String, QualifierValue>,
}

impl Qualifier {
    /// 创建新的限定符
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }

    /// 添加成员值
    pub fn with_member(
        mut self,
        key: impl Into<String>,
        value: impl Into<QualifierValue>,
    ) -> Self {
        self.members.insert(key.into(), value.into());
        self
    }

    /// 内置默认限定符
    pub fn default_qualifier() -> Self {
        Self::new(DEFAULT_QUALIFIER)
    }

    /// 内置任意限定符
    pub fn any() -> Self {
        Self::new(ANY_QUALIFIER)
    }

    /// 内置命名限定符
    pub fn named(value: impl Into<String>) -> Self {
        Self::new(NAMED_QUALIFIER).with_member("value", value.into())
    }

    /// 是否为默认限定符
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_QUALIFIER
    }

    /// 是否为任意限定符
    pub fn is_any(&self) -> bool {
        self.name == ANY_QUALIFIER
    }

    /// 是否为命名限定符
    pub fn is_named(&self) -> bool {
        self.name == NAMED_QUALIFIER
    }

    /// 获取成员值
    pub fn member(&self, key: &str) -> Option<&QualifierValue> {
        self.members.get(key)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.members.is_empty() {
            write!(f, "(")?;
            for (i, (key, value)) in self.members.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// 限定符集合
///
/// 有序集合，可直接作为解析缓存键的一部分
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifierSet {
    qualifiers: BTreeSet<Qualifier>,
}

impl QualifierSet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 从迭代器创建集合
    pub fn of(qualifiers: impl IntoIterator<Item = Qualifier>) -> Self {
        Self {
            qualifiers: qualifiers.into_iter().collect(),
        }
    }

    /// 添加限定符
    pub fn insert(&mut self, qualifier: Qualifier) {
        self.qualifiers.insert(qualifier);
    }

    /// 是否包含指定限定符（含成员值比较）
    pub fn contains(&self, qualifier: &Qualifier) -> bool {
        self.qualifiers.contains(qualifier)
    }

    /// 迭代所有限定符
    pub fn iter(&self) -> impl Iterator<Item = &Qualifier> {
        self.qualifiers.iter()
    }

    /// 限定符数量
    pub fn len(&self) -> usize {
        self.qualifiers.len()
    }

    /// 是否为空集合
    pub fn is_empty(&self) -> bool {
        self.qualifiers.is_empty()
    }

    /// 获取命名限定符的 value 成员
    pub fn named_value(&self) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.is_named())
            .and_then(|q| q.member("value"))
            .and_then(|v| match v {
                QualifierValue::Str(s) => Some(s.as_str()),
                _ => None,
            })
    }

    /// Bean 侧规范化
    ///
    /// 除 any/named 之外没有其他限定符的集合隐式获得 default；
    /// 所有集合都隐式获得 any
    pub fn normalized_for_bean(mut self) -> Self {
        let needs_default = !self
            .qualifiers
            .iter()
            .any(|q| !q.is_any() && !q.is_named());
        if needs_default {
            self.qualifiers.insert(Qualifier::default_qualifier());
        }
        self.qualifiers.insert(Qualifier::any());
        self
    }

    /// 请求侧规范化：空集合等价于请求 default
    pub fn normalized_for_request(&self) -> Self {
        if self.qualifiers.is_empty() {
            Self::of([Qualifier::default_qualifier()])
        } else {
            self.clone()
        }
    }
}

impl FromIterator<Qualifier> for QualifierSet {
    fn from_iter<I: IntoIterator<Item = Qualifier>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl fmt::Display for QualifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, qualifier) in self.qualifiers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", qualifier)?;
        }
        write!(f, "]")
    }
}
