//! 容器配置

/// 容器配置
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// 构建递归深度上限
    pub max_construction_depth: usize,
    /// 构建容器时预创建普通作用域 Bean 的客户端代理
    pub eager_proxies: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_construction_depth: 100,
            eager_proxies: true,
        }
    }
}

impl ContainerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置构建递归深度上限
    pub fn with_max_construction_depth(mut self, depth: usize) -> Self {
        self.max_construction_depth = depth;
        self
    }

    /// 设置是否预创建客户端代理
    pub fn with_eager_proxies(mut self, enabled: bool) -> Self {
        self.eager_proxies = enabled;
        self
    }
}
