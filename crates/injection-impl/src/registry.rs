//! Bean 注册表
//!
//! 由外部发现/引导层提供的描述符列表一次性构建，
//! 构建完成后不可变，是解析器的唯一数据来源

use crate::contexts::ContextRegistry;
use injection_common::{BeanDescriptor, BeanId, DefinitionError, Qualifier, ScopeKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Bean 注册表
pub struct BeanRegistry {
    beans: Vec<Arc<BeanDescriptor>>,
    by_id: HashMap<BeanId, Arc<BeanDescriptor>>,
    by_name: HashMap<String, Vec<Arc<BeanDescriptor>>>,
}

impl BeanRegistry {
    /// 构建注册表
    ///
    /// 规范化每个描述符（类型闭包、限定符集合、命名限定符、
    /// 拦截器排序），并收集全部定义错误；存在任何定义错误时
    /// 容器不得启动
    pub fn build(
        descriptors: Vec<BeanDescriptor>,
        contexts: &ContextRegistry,
    ) -> Result<Self, DefinitionError> {
        let mut errors = Vec::new();
        let mut beans = Vec::with_capacity(descriptors.len());

        for mut descriptor in descriptors {
            // 声明类型始终在类型闭包内
            if !descriptor.type_closure.contains(&descriptor.declared_type) {
                descriptor
                    .type_closure
                    .insert(0, descriptor.declared_type.clone());
            }
            // 有名称的 Bean 隐式获得命名限定符
            if let Some(name) = descriptor.name.clone() {
                descriptor.qualifiers.insert(Qualifier::named(name));
            }
            descriptor.qualifiers =
                std::mem::take(&mut descriptor.qualifiers).normalized_for_bean();
            // 优先级数值小的绑定靠外；稳定排序保留同优先级的声明顺序
            descriptor.interceptors.sort_by_key(|binding| binding.priority);

            match contexts.get(&descriptor.scope) {
                None => errors.push(DefinitionError::UnknownScope {
                    bean_id: descriptor.id.clone(),
                    scope: descriptor.scope.clone(),
                }),
                Some(context) => {
                    if context.kind() == ScopeKind::Normal && !descriptor.proxyable {
                        errors.push(DefinitionError::UnproxyableType {
                            bean_id: descriptor.id.clone(),
                        });
                    }
                }
            }
            if !descriptor.interceptors.is_empty() && descriptor.dispatcher.is_none() {
                errors.push(DefinitionError::MissingDispatcher {
                    bean_id: descriptor.id.clone(),
                });
            }

            beans.push(Arc::new(descriptor));
        }

        let mut by_id = HashMap::new();
        for bean in &beans {
            if by_id.insert(bean.id.clone(), bean.clone()).is_some() {
                errors.push(DefinitionError::DuplicateBeanId {
                    bean_id: bean.id.clone(),
                });
            }
        }

        let mut by_name: HashMap<String, Vec<Arc<BeanDescriptor>>> = HashMap::new();
        for bean in &beans {
            if let Some(name) = &bean.name {
                by_name.entry(name.clone()).or_default().push(bean.clone());
            }
        }
        for (name, candidates) in &by_name {
            if candidates.len() > 1 {
                errors.push(DefinitionError::ConflictingName {
                    name: name.clone(),
                    bean_ids: candidates.iter().map(|bean| bean.id.clone()).collect(),
                });
            }
        }

        if errors.is_empty() {
            info!("Bean 注册表构建完成: {} 个描述符", beans.len());
            Ok(Self {
                beans,
                by_id,
                by_name,
            })
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(DefinitionError::Aggregate { errors })
        }
    }

    /// 迭代所有描述符
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BeanDescriptor>> {
        self.beans.iter()
    }

    /// 按标识查找描述符
    pub fn by_id(&self, id: &BeanId) -> Option<&Arc<BeanDescriptor>> {
        self.by_id.get(id)
    }

    /// 按名称查找描述符
    pub fn by_name(&self, name: &str) -> &[Arc<BeanDescriptor>] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 描述符数量
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl std::fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanRegistry")
            .field("beans", &self.beans.len())
            .finish()
    }
}
