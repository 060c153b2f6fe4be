//! 内部 sealed 模块用于控制外部扩展边界。
//!
//! 公开的处理器 Trait 通过 `: crate::sealed::Sealed` 间接依赖该标记；当前对所有类型提供 blanket
//! 实现，不限制实现者，只为日后给 Trait 追加默认方法保留演进空间。
pub(crate) trait Sealed {}

impl<T: ?Sized> Sealed for T {}
