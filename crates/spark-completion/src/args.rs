//! 参数桶（Argument Bucket）与操作上下文（Operation Context）。
//!
//! # 模块定位（Why）
//! - 多阶段流水线中，后一阶段的请求参数常常来自前一阶段的结果（例如先打开文件再按返回的句柄读取）；
//!   参数桶就是这段“阶段间接力”的载体；
//! - 用户回调只通过 [`OperationContext`] 读写参数桶，看不到其内部结构。
//!
//! # 核心机制（How）
//! - 以 `(值类型的 TypeId, 槽位号)` 为键存放类型擦除的值；同一键至多一个值，后写覆盖先写；
//! - 参数桶经 [`SharedArgs`]（`Arc`）在相邻阶段之间共享，最后一个持有者释放时一并回收；
//! - 内部使用 `parking_lot::Mutex`。流水线按“本阶段写完、下一阶段才读”的顺序交接，
//!   锁在正常使用下不会发生争用，只负责让类型满足 `Sync` 以便放进 `Arc`。
//!
//! # 契约说明（What）
//! - 默认槽位为 [`PRIMARY_SLOT`]（值为 `1`）；
//! - 多于两个阶段同时读写同一参数桶不在本层保证范围内，需要外部同步。

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ArgError;

/// 默认槽位。
pub const PRIMARY_SLOT: i32 = 1;

/// 在相邻流水线阶段之间共享的参数桶。
pub type SharedArgs = Arc<ArgsContainer>;

type ArgKey = (TypeId, i32);

/// 按 `(类型, 槽位)` 索引的参数存储。
#[derive(Default)]
pub struct ArgsContainer {
    slots: Mutex<HashMap<ArgKey, Box<dyn Any + Send>>>,
}

impl ArgsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个空的共享参数桶。
    pub fn shared() -> SharedArgs {
        Arc::new(Self::new())
    }

    /// 写入 `slot` 上类型为 `T` 的参数，返回被覆盖的旧值。
    pub fn set_arg<T: Any + Send>(&self, slot: i32, value: T) -> Option<T> {
        tracing::trace!(
            target: "spark_completion::args",
            arg_type = type_name::<T>(),
            slot,
            "forwarding argument"
        );
        let previous = self
            .slots
            .lock()
            .insert((TypeId::of::<T>(), slot), Box::new(value))?;
        // 键中含有 `TypeId::of::<T>()`，旧值类型必然为 `T`。
        previous.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// 克隆出 `slot` 上类型为 `T` 的参数；类型或槽位不符时返回 `None`。
    pub fn get_arg<T: Any + Clone>(&self, slot: i32) -> Option<T> {
        let slots = self.slots.lock();
        let value = slots
            .get(&(TypeId::of::<T>(), slot))?
            .downcast_ref::<T>()
            .cloned();
        tracing::trace!(
            target: "spark_completion::args",
            arg_type = type_name::<T>(),
            slot,
            found = value.is_some(),
            "fetching argument"
        );
        value
    }

    /// 移出 `slot` 上类型为 `T` 的参数。
    pub fn take_arg<T: Any>(&self, slot: i32) -> Option<T> {
        let boxed = self.slots.lock().remove(&(TypeId::of::<T>(), slot))?;
        boxed.downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn has_arg<T: Any>(&self, slot: i32) -> bool {
        self.slots.lock().contains_key(&(TypeId::of::<T>(), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

impl fmt::Debug for ArgsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgsContainer")
            .field("len", &self.len())
            .finish()
    }
}

/// 暴露给用户回调的参数桶读写视图。
///
/// # 教案式说明
/// - **意图 (Why)**：回调既要读取上一阶段转发来的值，也要为下一阶段写入新值，
///   但不应持有或替换参数桶本身；
/// - **契约 (What)**：
///   - 不拥有参数桶，生命周期不超过一次回调调用；
///   - `forward*` 写入、`fetch*` 克隆读取、`take*` 移出读取，均不改变其他键；
///   - [`require`](Self::require) 在缺失时返回 [`ArgError::Missing`]，可直接 `?` 为 [`Status`](crate::Status)。
/// - **执行逻辑 (How)**：所有方法直接委托给底层 [`ArgsContainer`]。
pub struct OperationContext<'a> {
    args: &'a ArgsContainer,
}

impl<'a> OperationContext<'a> {
    pub fn new(args: &'a ArgsContainer) -> Self {
        Self { args }
    }

    /// 向默认槽位转发参数。
    pub fn forward<T: Any + Send>(&mut self, value: T) {
        self.forward_at(PRIMARY_SLOT, value);
    }

    pub fn forward_at<T: Any + Send>(&mut self, slot: i32, value: T) {
        self.args.set_arg(slot, value);
    }

    /// 从默认槽位读取参数。
    pub fn fetch<T: Any + Clone>(&self) -> Option<T> {
        self.fetch_at(PRIMARY_SLOT)
    }

    pub fn fetch_at<T: Any + Clone>(&self, slot: i32) -> Option<T> {
        self.args.get_arg(slot)
    }

    pub fn take<T: Any>(&mut self) -> Option<T> {
        self.take_at(PRIMARY_SLOT)
    }

    pub fn take_at<T: Any>(&mut self, slot: i32) -> Option<T> {
        self.args.take_arg(slot)
    }

    /// 读取必需参数，缺失时返回错误。
    pub fn require<T: Any + Clone>(&self, slot: i32) -> Result<T, ArgError> {
        self.fetch_at(slot).ok_or(ArgError::Missing {
            type_name: type_name::<T>(),
            slot,
        })
    }

    pub fn contains<T: Any>(&self, slot: i32) -> bool {
        self.args.has_arg::<T>(slot)
    }
}
