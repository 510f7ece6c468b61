//! 注入点定义
//!
//! 注入点只作为解析输入使用，核心不会修改它

use crate::descriptor::BeanId;
use crate::qualifier::{Qualifier, QualifierSet};
use crate::typekey::TypeKey;
use std::fmt;

/// 注入位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionPosition {
    /// 字段注入
    Field(String),
    /// 参数注入
    Parameter(usize),
    /// 程序化查找
    Lookup,
}

/// 注入点
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    /// 要求的类型
    pub required_type: TypeKey,
    /// 要求的限定符集合
    pub qualifiers: QualifierSet,
    /// 所属 Bean（根查找时为空）
    pub bean: Option<BeanId>,
    /// 注入位置
    pub position: InjectionPosition,
    /// 是否容忍缺失（可选注入）
    pub optional: bool,
}

impl InjectionPoint {
    /// 创建程序化查找注入点
    pub fn lookup(required_type: TypeKey) -> Self {
        Self {
            required_type,
            qualifiers: QualifierSet::new(),
            bean: None,
            position: InjectionPosition::Lookup,
            optional: false,
        }
    }

    /// 添加限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.insert(qualifier);
        self
    }

    /// 设置所属 Bean
    pub fn in_bean(mut self, bean: BeanId) -> Self {
        self.bean = Some(bean);
        self
    }

    /// 设置为字段注入
    pub fn at_field(mut self, name: impl Into<String>) -> Self {
        self.position = InjectionPosition::Field(name.into());
        self
    }

    /// 设置为参数注入
    pub fn at_parameter(mut self, index: usize) -> Self {
        self.position = InjectionPosition::Parameter(index);
        self
    }

    /// 标记为可选注入
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.required_type, self.qualifiers)?;
        if let Some(bean) = &self.bean {
            write!(f, " @ {}", bean)?;
        }
        Ok(())
    }
}
