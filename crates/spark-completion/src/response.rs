//! 响应载荷、路由信息与标准响应类型。
//!
//! # 模块定位（Why）
//! - 传输层把每次操作的结果放进一个不透明的类型擦除盒子 [`AnyObject`] 中移交给完成回调，
//!   只有回调知道应当按什么类型取出；
//! - 重定向/负载均衡链路以 [`HostList`] 的形式随响应一起到达，完成回调层不解释其内容；
//! - [`ResponseValue`] 标记“可以被值型回调提取的响应类型”，并通过 [`stand_in`] 为每种类型提供
//!   失败路径上的替身值。
//!
//! # 契约说明（What）
//! - 只有当状态为成功时，载荷才保证持有期望类型的值；失败时载荷内容未定义，禁止读取；
//! - 替身值只用于维持统一的回调签名，永远不代表有意义的数据。

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

/// 类型擦除的响应载荷，持有零个或一个值。
///
/// # 契约说明（What）
/// - [`get`](Self::get)/[`take`](Self::take) 只在类型匹配时返回值；类型不符时返回 `None`，
///   且 `take` 不会移走原值；
/// - 载荷由传输层按值移交给完成回调，回调结束时随之释放。
#[derive(Default)]
pub struct AnyObject {
    value: Option<Box<dyn Any + Send>>,
}

impl AnyObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造持有 `value` 的载荷。
    pub fn with_value<T: Any + Send>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    /// 写入（或替换）载荷中的值。
    pub fn set<T: Any + Send>(&mut self, value: T) {
        self.value = Some(Box::new(value));
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// 以期望类型借出载荷中的值。
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.as_ref()?.downcast_ref::<T>()
    }

    /// 以期望类型移出载荷中的值。
    ///
    /// 类型不符时值保留在载荷内，随载荷一起释放。
    pub fn take<T: Any>(&mut self) -> Option<T> {
        match self.value.take()?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.value = Some(other);
                None
            }
        }
    }
}

impl fmt::Debug for AnyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyObject")
            .field("has_value", &self.has_value())
            .finish()
    }
}

/// 一跳路由信息：请求在到达最终数据服务器前经过的某个端点。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostInfo {
    pub url: String,
    pub flags: u32,
    pub protocol: u32,
    pub load_balancer: bool,
}

impl HostInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// 请求经过的端点序列（重定向链）。
pub type HostList = Vec<HostInfo>;

/// 可被值型完成回调提取的响应类型。
///
/// # 设计背景（Why）
/// - 值型回调在失败路径上需要一个“替身值”来维持 `(&Status, &R)` 签名，因此要求 `Default`；
/// - 替身值跨线程共享，因此要求 `Send + Sync + 'static`；
/// - 刻意不为 `()` 实现：`()` 表示“无值响应”，这类操作只接受不带响应参数的回调形态，
///   由此在编译期杜绝为无值响应注册值型回调。
///
/// # 契约说明（What）
/// - 下游类型只需写 `impl ResponseValue for MyResponse {}` 即可接入。
pub trait ResponseValue: Default + Send + Sync + 'static {}

macro_rules! response_values {
    ($($ty:ty),* $(,)?) => {
        $(impl ResponseValue for $ty {})*
    };
}

response_values!(String, Vec<u8>, u64, u32, i64, i32, bool);
response_values!(
    StatInfo,
    ChunkInfo,
    LocationInfo,
    DirectoryList,
    ProtocolInfo
);

/// 文件或目录的元数据。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatInfo {
    pub id: String,
    pub size: u64,
    pub flags: u32,
    pub mod_time: u64,
}

impl StatInfo {
    pub const FLAG_DIRECTORY: u32 = 0x02;
    pub const FLAG_OFFLINE: u32 = 0x08;
    pub const FLAG_READABLE: u32 = 0x10;
    pub const FLAG_WRITABLE: u32 = 0x20;

    pub fn test_flags(&self, flags: u32) -> bool {
        self.flags & flags == flags
    }
}

/// 一次读操作返回的数据块。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkInfo {
    pub offset: u64,
    pub length: u32,
    pub buffer: Vec<u8>,
}

/// 定位查询返回的位置条目。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub address: String,
    pub is_server: bool,
    pub writable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationInfo {
    pub locations: Vec<Location>,
}

/// 目录列表。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryList {
    pub parent: String,
    pub entries: Vec<DirectoryEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub host_address: String,
    pub name: String,
    pub stat: Option<StatInfo>,
}

/// 协议握手信息。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolInfo {
    pub version: u32,
    pub host_info: u32,
}

type StandInRegistry = RwLock<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>;

fn registry() -> &'static StandInRegistry {
    static REGISTRY: OnceLock<StandInRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// 返回类型 `R` 的进程级替身值。
///
/// # 设计背景（Why）
/// - 值型回调在失败路径上不能解引用无效载荷，但签名仍需一个 `&R`；
/// - 泛型函数中的 `static` 在 Rust 中不会按单态化拆分，因此改用以 [`TypeId`] 为键的注册表，
///   每种类型首次访问时构造一次默认值并泄漏为 `'static`。
///
/// # 契约说明（What）
/// - 返回值只读、永不修改、永不释放；同一类型的多次调用返回同一地址；
/// - 线程安全：并发首次访问只会有一个默认值被登记，落败线程构造的值会被丢弃；
/// - 替身值不具备业务含义，调用方必须先检查状态再信任结果。
///
/// # 设计取舍（Trade-offs）
/// - 每种响应类型泄漏一个默认值，数量以程序中出现的响应类型为上限；
/// - 读路径只持有读锁，首次登记时才升级为写锁。
pub fn stand_in<R: ResponseValue>() -> &'static R {
    let key = TypeId::of::<R>();
    if let Some(existing) = registry().read().get(&key).copied() {
        return downcast_stand_in(existing);
    }

    let mut guard = registry().write();
    let entry = *guard.entry(key).or_insert_with(|| {
        tracing::trace!(
            target: "spark_completion::response",
            response_type = type_name::<R>(),
            "registering stand-in response value"
        );
        let leaked: &'static R = Box::leak(Box::new(R::default()));
        leaked as &'static (dyn Any + Send + Sync)
    });
    downcast_stand_in(entry)
}

fn downcast_stand_in<R: ResponseValue>(entry: &'static (dyn Any + Send + Sync)) -> &'static R {
    match entry.downcast_ref::<R>() {
        Some(value) => value,
        // 注册表以 `TypeId::of::<R>()` 为键，条目类型必然是 `R`。
        None => unreachable!("stand-in registry entry does not match its TypeId key"),
    }
}
