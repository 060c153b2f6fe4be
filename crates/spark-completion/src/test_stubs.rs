//! 完成回调层的测试桩集合。
//!
//! # 设计定位（Why）
//! - 适配器测试反复需要“记录被调用次数的传统处理器”“可控的元数据句柄”“能证明已被释放的载荷”；
//!   集中在此维护，避免各测试文件重复定义，接口调整时也能获得集中编译错误提示。
//!
//! # 契约说明（What）
//! - 这些类型仅用于测试与示例，生产代码不应依赖；
//! - 所有计数均使用 `SeqCst` 原子操作，可在跨线程测试中直接断言。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::adapters::StatSource;
use crate::config::StatRefresh;
use crate::handler::ResponseHandler;
use crate::response::{AnyObject, HostList, StatInfo};
use crate::status::Status;

/// 记录所有调用的传统处理器。
///
/// - 分别统计两种调用形态的次数；
/// - 按调用顺序保存收到的状态与路由信息条数。
#[derive(Default)]
pub struct RecordingResponseHandler {
    plain_calls: AtomicUsize,
    routed_calls: AtomicUsize,
    statuses: Mutex<Vec<Status>>,
    host_counts: Mutex<Vec<usize>>,
}

impl RecordingResponseHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain_calls(&self) -> usize {
        self.plain_calls.load(Ordering::SeqCst)
    }

    pub fn routed_calls(&self) -> usize {
        self.routed_calls.load(Ordering::SeqCst)
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.statuses.lock().clone()
    }

    pub fn host_counts(&self) -> Vec<usize> {
        self.host_counts.lock().clone()
    }
}

impl ResponseHandler for RecordingResponseHandler {
    fn handle_response_with_hosts(
        &self,
        status: Status,
        response: Option<AnyObject>,
        hosts: HostList,
    ) {
        self.routed_calls.fetch_add(1, Ordering::SeqCst);
        self.host_counts.lock().push(hosts.len());
        drop(hosts);
        self.handle_response(status, response);
    }

    fn handle_response(&self, status: Status, response: Option<AnyObject>) {
        drop(response);
        self.plain_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses.lock().push(status);
    }
}

/// 返回预设结果并统计查询次数的元数据句柄。
pub struct FixedStatSource {
    outcome: Result<StatInfo, Status>,
    queries: AtomicUsize,
    last_refresh: Mutex<Option<StatRefresh>>,
}

impl FixedStatSource {
    pub fn returning(info: StatInfo) -> Self {
        Self::with_outcome(Ok(info))
    }

    pub fn failing(status: Status) -> Self {
        Self::with_outcome(Err(status))
    }

    fn with_outcome(outcome: Result<StatInfo, Status>) -> Self {
        Self {
            outcome,
            queries: AtomicUsize::new(0),
            last_refresh: Mutex::new(None),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn last_refresh(&self) -> Option<StatRefresh> {
        *self.last_refresh.lock()
    }
}

impl StatSource for FixedStatSource {
    fn stat(&self, refresh: StatRefresh) -> Result<StatInfo, Status> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh.lock() = Some(refresh);
        self.outcome.clone()
    }
}

/// 析构时递增共享计数的探针，放进载荷或参数桶即可证明其已被释放。
#[derive(Debug)]
pub struct DropProbe {
    drops: Arc<AtomicUsize>,
}

impl DropProbe {
    /// 返回探针及其共享计数。
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                drops: Arc::clone(&drops),
            },
            drops,
        )
    }
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
