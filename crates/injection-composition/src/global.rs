//! 进程级容器持有者
//!
//! 引导步骤是唯一的写入方；设置之后的读取无须同步开销

use crate::container::Container;
use std::sync::Arc;

/// 全局容器
static GLOBAL_CONTAINER: once_cell::sync::Lazy<parking_lot::RwLock<Option<Arc<Container>>>> =
    once_cell::sync::Lazy::new(|| parking_lot::RwLock::new(None));

/// 设置全局容器
pub fn set_global_container(container: Arc<Container>) {
    *GLOBAL_CONTAINER.write() = Some(container);
}

/// 获取全局容器
pub fn get_global_container() -> Option<Arc<Container>> {
    GLOBAL_CONTAINER.read().clone()
}

/// 清除全局容器
pub fn clear_global_container() {
    *GLOBAL_CONTAINER.write() = None;
}
