//! 世界 trait
//!
//! 事件执行时可访问的业务状态（例如配置会话）。

use std::any::Any;

/// 调度世界：由业务层实现。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
