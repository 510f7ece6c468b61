//! 构建递归跟踪
//!
//! 循环依赖通过按 (Bean 标识, 上下文键) 记录的进行中标记检测，
//! 不依赖调用栈检查，在直接构建与代理间接分发的构建路径上
//! 行为一致；标记在每条退出路径上都会被清理，失败后修正过的
//! 构建可以成功

use injection_abstractions::ContextualInstance;
use injection_common::{BeanId, ConstructionError, ContextualKey};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::warn;

struct Frame {
    bean: BeanId,
    key: ContextualKey,
    dependents: Vec<Arc<ContextualInstance>>,
}

thread_local! {
    static STACK: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
}

/// 检查进入 (Bean, 键) 是否构成循环
///
/// 构成循环时返回完整链路描述。必须在拿任何槽位锁之前调用：
/// 同线程对进行中槽位的递归请求会在槽位锁上自我阻塞
pub fn detect_cycle(bean: &BeanId, key: &ContextualKey) -> Option<String> {
    STACK.with(|stack| {
        let stack = stack.borrow();
        if stack
            .iter()
            .any(|frame| &frame.bean == bean && &frame.key == key)
        {
            let chain = stack
                .iter()
                .map(|frame| frame.bean.to_string())
                .chain([bean.to_string()])
                .collect::<Vec<_>>()
                .join(" -> ");
            Some(chain)
        } else {
            None
        }
    })
}

/// 把伪作用域实例挂到最内层进行中的构建帧
///
/// 没有进行中的构建（根查找）时返回 false，实例归调用方所有
pub fn attach_dependent(instance: Arc<ContextualInstance>) -> bool {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        match stack.last_mut() {
            Some(frame) => {
                frame.dependents.push(instance);
                true
            }
            None => false,
        }
    })
}

/// 当前线程的构建递归深度
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

/// 构建进行中标记（RAII）
///
/// 正常完成走 [`ConstructionGuard::finish`]；错误路径由 Drop
/// 清理标记并销毁本帧已产生的依赖实例
pub struct ConstructionGuard {
    finished: bool,
}

impl ConstructionGuard {
    /// 进入一次构建
    pub fn enter(
        bean: &BeanId,
        key: &ContextualKey,
        max_depth: usize,
    ) -> Result<Self, ConstructionError> {
        if let Some(chain) = detect_cycle(bean, key) {
            return Err(ConstructionError::CircularDependency { chain });
        }
        if depth() >= max_depth {
            return Err(ConstructionError::DepthExceeded { limit: max_depth });
        }
        STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                bean: bean.clone(),
                key: *key,
                dependents: Vec::new(),
            });
        });
        Ok(Self { finished: false })
    }

    /// 构建成功：弹出标记并取回本次构建产生的依赖实例
    pub fn finish(mut self) -> Vec<Arc<ContextualInstance>> {
        self.finished = true;
        STACK
            .with(|stack| stack.borrow_mut().pop())
            .map(|frame| frame.dependents)
            .unwrap_or_default()
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // 构建失败：清理标记，按创建逆序销毁已产生的依赖实例
        if let Some(frame) = STACK.with(|stack| stack.borrow_mut().pop()) {
            for dependent in frame.dependents.into_iter().rev() {
                for failure in dependent.destroy() {
                    warn!("构建失败清理依赖实例时出错: {}", failure);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bean(id: &str) -> BeanId {
        BeanId::new(id)
    }

    #[test]
    fn reentering_in_progress_key_is_a_cycle() {
        let key = ContextualKey::nil();
        let guard = ConstructionGuard::enter(&bean("a"), &key, 100).unwrap();
        assert!(detect_cycle(&bean("a"), &key).is_some());
        // 其他键不构成循环
        assert!(detect_cycle(&bean("b"), &key).is_none());
        assert!(detect_cycle(&bean("a"), &ContextualKey::new()).is_none());
        drop(guard);
    }

    #[test]
    fn marker_is_cleared_on_both_exit_paths() {
        let key = ContextualKey::nil();
        {
            let guard = ConstructionGuard::enter(&bean("a"), &key, 100).unwrap();
            let _ = guard.finish();
        }
        assert!(detect_cycle(&bean("a"), &key).is_none());

        {
            let _guard = ConstructionGuard::enter(&bean("a"), &key, 100).unwrap();
            // 错误路径：guard 直接丢弃
        }
        assert!(detect_cycle(&bean("a"), &key).is_none());
        assert_eq!(depth(), 0);
    }

    #[test]
    fn cycle_error_carries_the_chain() {
        let key = ContextualKey::nil();
        let _a = ConstructionGuard::enter(&bean("a"), &key, 100).unwrap();
        let _b = ConstructionGuard::enter(&bean("b"), &key, 100).unwrap();
        match ConstructionGuard::enter(&bean("a"), &key, 100) {
            Err(ConstructionError::CircularDependency { chain }) => {
                assert_eq!(chain, "a -> b -> a");
            }
            other => panic!("预期循环依赖错误, 实际: {:?}", other.err()),
        }
    }

    #[test]
    fn depth_limit_is_enforced() {
        let key = ContextualKey::nil();
        let _a = ConstructionGuard::enter(&bean("a"), &key, 2).unwrap();
        let _b = ConstructionGuard::enter(&bean("b"), &key, 2).unwrap();
        assert!(matches!(
            ConstructionGuard::enter(&bean("c"), &key, 2),
            Err(ConstructionError::DepthExceeded { limit: 2 })
        ));
    }
}
