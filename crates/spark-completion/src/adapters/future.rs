use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::config::BridgeOptions;
use crate::error::PipelineError;
use crate::handler::{CompletionHandler, Forwarding};
use crate::response::{AnyObject, ResponseValue};
use crate::status::Status;

use super::{invalid_response, trace_completion};

type Promise<R> = oneshot::Sender<Result<R, PipelineError>>;

/// 可以经由阻塞等待桥接交付的结果类型。
///
/// # 契约说明（What）
/// - 所有 [`ResponseValue`] 自动满足：成功时从载荷中移出该类型的值；
/// - `()` 表示无值响应：成功时直接交付单位值，不读取载荷。
pub trait FutureValue: Send + Sized + 'static {
    /// 从成功状态附带的载荷中取出结果。
    fn from_payload(response: Option<AnyObject>) -> Result<Self, Status>;
}

impl<R: ResponseValue> FutureValue for R {
    fn from_payload(response: Option<AnyObject>) -> Result<Self, Status> {
        response
            .and_then(|mut payload| payload.take::<R>())
            .ok_or_else(invalid_response::<R>)
    }
}

impl FutureValue for () {
    fn from_payload(response: Option<AnyObject>) -> Result<Self, Status> {
        drop(response);
        Ok(())
    }
}

/// 阻塞等待桥接的消费端。
///
/// # 教案式说明
/// - **意图 (Why)**：让同步调用方在独立线程上等待异步完成，或让异步调用方直接 `.await`；
/// - **契约 (What)**：
///   - 作为 `Future` 输出 `Result<R, PipelineError>`；
///   - [`wait`](Self::wait) 阻塞当前线程直至桥接被解析；桥接无论成功、失败还是被放弃都会解析，
///     因此等待一定会返回；
///   - 结果只交付一次：[`wait`](Self::wait) 与 [`try_wait`](Self::try_wait) 均按值消费 future，
///     已取走结果的 future 无法再被查询，也就不会把“通道已空”误报为流水线被放弃。
/// - **风险 (Trade-offs)**：调用方必须处理 `Err`，不能假定 future 只在成功时完成。
#[must_use = "a PipelineFuture does nothing unless waited on or polled"]
pub struct PipelineFuture<R> {
    receiver: oneshot::Receiver<Result<R, PipelineError>>,
}

impl<R> PipelineFuture<R> {
    /// 阻塞当前线程直至结果可用。
    pub fn wait(self) -> Result<R, PipelineError> {
        futures::executor::block_on(self)
    }

    /// 非阻塞地查询结果。
    ///
    /// 已解析时消费 future 并返回 `Ok(结果)`；尚未解析时以 `Err(self)` 原样交还，可稍后再查。
    pub fn try_wait(mut self) -> Result<Result<R, PipelineError>, Self> {
        match self.receiver.try_recv() {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => Err(self),
            Err(oneshot::Canceled) => Ok(Err(PipelineError::abandoned())),
        }
    }
}

impl<R> Future for PipelineFuture<R> {
    type Output = Result<R, PipelineError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // 发送端只会在 `FutureHandler` 析构时离开，而析构总是先解析；此分支仅作兜底映射。
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(PipelineError::abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// 阻塞等待桥接：把完成回调接到一对 promise/future 上。
///
/// # 设计背景（Why）
/// - 同步 API 需要在异步传输之上“等一个结果”，而传输层不应感知阻塞语义；
/// - 桥接把一次完成转换为 future 的解析，失败以 [`PipelineError`] 交付，不依赖 panic 或旁路通道。
///
/// # 契约说明（What）
/// - 构造时立即创建 promise 并交出配对的 [`PipelineFuture`]，早于任何完成，等待方可以马上阻塞；
/// - 成功：结果值按移动语义写入 promise；`R = ()` 时交付单位值；
/// - 失败：以包装原始状态的 [`PipelineError`] 解析；
/// - 放弃：若在未被调用时析构（流水线中止、阶段被跳过、处理器被丢弃），`Drop` 以
///   [`Status::pipeline_failed`] 解析，保证等待方一定被唤醒；
/// - 调用与否由 `called` 标志记录，该标志在唯一一次调用的开头置位。
///
/// # 并发说明
/// - 解析可在传输层的任意线程发生，等待可在另一线程进行；oneshot 通道保证一次解析恰好唤醒一次等待。
pub struct FutureHandler<R: FutureValue> {
    promise: Option<Promise<R>>,
    called: bool,
    options: BridgeOptions,
    forwarding: Forwarding,
}

impl<R: FutureValue> FutureHandler<R> {
    /// 创建桥接及其配对的 future。
    pub fn channel() -> (Self, PipelineFuture<R>) {
        let (sender, receiver) = oneshot::channel();
        let handler = Self {
            promise: Some(sender),
            called: false,
            options: BridgeOptions::default(),
            forwarding: Forwarding::new(),
        };
        (handler, PipelineFuture { receiver })
    }

    /// 创建桥接，并立即把配对的 future 写入输出槽位。
    pub fn new(slot: &mut Option<PipelineFuture<R>>) -> Self {
        let (handler, future) = Self::channel();
        *slot = Some(future);
        handler
    }

    pub fn with_options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    fn resolve(&mut self, outcome: Result<R, PipelineError>) {
        let Some(promise) = self.promise.take() else {
            return;
        };
        if promise.send(outcome).is_err() {
            tracing::trace!(
                target: "spark_completion::bridge",
                "pipeline future dropped before the bridge resolved"
            );
        }
    }
}

impl<R: FutureValue> CompletionHandler for FutureHandler<R> {
    fn on_completion(mut self: Box<Self>, status: Status, response: Option<AnyObject>) {
        self.called = true;
        trace_completion("future", &status);

        let outcome = if status.is_ok() {
            R::from_payload(response).map_err(PipelineError::new)
        } else {
            drop(response);
            Err(PipelineError::new(status))
        };
        self.resolve(outcome);
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}

impl<R: FutureValue> Drop for FutureHandler<R> {
    fn drop(&mut self) {
        if self.called {
            return;
        }
        if self.options.report_abandoned {
            tracing::warn!(
                target: "spark_completion::bridge",
                response_type = std::any::type_name::<R>(),
                "completion handler abandoned before invocation; failing pipeline future"
            );
        } else {
            tracing::debug!(
                target: "spark_completion::bridge",
                response_type = std::any::type_name::<R>(),
                "completion handler abandoned before invocation; failing pipeline future"
            );
        }
        self.resolve(Err(PipelineError::abandoned()));
    }
}
