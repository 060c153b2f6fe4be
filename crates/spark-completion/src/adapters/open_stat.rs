use std::sync::Arc;

use crate::args::OperationContext;
use crate::config::{OpenStatOptions, StatRefresh};
use crate::handler::{CompletionHandler, Forwarding};
use crate::response::{AnyObject, StatInfo, stand_in};
use crate::status::Status;

use super::trace_completion;

/// 可同步查询元数据的外部句柄，典型实现是刚刚打开的文件对象。
///
/// # 契约说明（What）
/// - `stat` 同步返回元数据；`refresh` 为 [`StatRefresh::Forced`] 时实现者应绕过缓存；
/// - 查询失败返回描述原因的 [`Status`]。
pub trait StatSource: Send + Sync {
    fn stat(&self, refresh: StatRefresh) -> Result<StatInfo, Status>;
}

/// 成功时查询一次元数据；失败时不查询。
///
/// 返回交给回调的状态与新鲜的元数据（若有）。查询本身失败时，回调看到的是查询的失败状态。
fn query_stat(
    source: &dyn StatSource,
    status: Status,
    options: OpenStatOptions,
) -> (Status, Option<StatInfo>) {
    if !status.is_ok() {
        return (status, None);
    }
    match source.stat(options.refresh) {
        Ok(info) => (status, Some(info)),
        Err(failure) => {
            tracing::debug!(
                target: "spark_completion::handler",
                %failure,
                "metadata query after open failed"
            );
            (failure, None)
        }
    }
}

/// 打开后查询元数据的适配器：`(&Status, &StatInfo)` 形态。
///
/// # 教案式说明
/// - **意图 (Why)**：打开操作本身没有有用的结果，调用方真正想要的是打开后的文件元数据；
///   适配器在成功时对外部句柄做一次同步查询，把元数据而非原始响应交给回调；
/// - **契约 (What)**：
///   - 成功：调用 [`StatSource::stat`]，把新鲜元数据传给回调，回调返回后立即释放；
///   - 失败：不查询，传入进程级的 `StatInfo` 替身值，替身值从不释放；
///   - 查询失败：回调收到查询返回的失败状态与替身值。
/// - **风险 (Trade-offs)**：查询在传输层线程上同步执行，实现者应保证其不阻塞过久。
pub struct OpenStatHandler<F> {
    source: Arc<dyn StatSource>,
    fun: F,
    options: OpenStatOptions,
    forwarding: Forwarding,
}

impl<F> OpenStatHandler<F>
where
    F: FnOnce(&Status, &StatInfo) + Send + 'static,
{
    pub fn new(source: Arc<dyn StatSource>, fun: F) -> Self {
        Self {
            source,
            fun,
            options: OpenStatOptions::default(),
            forwarding: Forwarding::new(),
        }
    }

    pub fn with_options(mut self, options: OpenStatOptions) -> Self {
        self.options = options;
        self
    }
}

impl<F> CompletionHandler for OpenStatHandler<F>
where
    F: FnOnce(&Status, &StatInfo) + Send + 'static,
{
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        drop(response);
        let Self {
            source,
            fun,
            options,
            ..
        } = *self;
        let (status, info) = query_stat(source.as_ref(), status, options);
        trace_completion("open-stat", &status);
        fun(&status, info.as_ref().unwrap_or_else(|| stand_in::<StatInfo>()));
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}

/// [`OpenStatHandler`] 的参数转发版本：`(&Status, &StatInfo, &mut OperationContext)` 形态。
pub struct OpenStatContextHandler<F> {
    source: Arc<dyn StatSource>,
    fun: F,
    options: OpenStatOptions,
    forwarding: Forwarding,
}

impl<F> OpenStatContextHandler<F>
where
    F: FnOnce(&Status, &StatInfo, &mut OperationContext<'_>) + Send + 'static,
{
    pub fn new(source: Arc<dyn StatSource>, fun: F) -> Self {
        Self {
            source,
            fun,
            options: OpenStatOptions::default(),
            forwarding: Forwarding::new(),
        }
    }

    pub fn with_options(mut self, options: OpenStatOptions) -> Self {
        self.options = options;
        self
    }
}

impl<F> CompletionHandler for OpenStatContextHandler<F>
where
    F: FnOnce(&Status, &StatInfo, &mut OperationContext<'_>) + Send + 'static,
{
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        drop(response);
        let Self {
            source,
            fun,
            options,
            forwarding,
        } = *self;
        let (status, info) = query_stat(source.as_ref(), status, options);
        trace_completion("open-stat-context", &status);
        let mut ctx = forwarding.context();
        fun(
            &status,
            info.as_ref().unwrap_or_else(|| stand_in::<StatInfo>()),
            &mut ctx,
        );
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}
