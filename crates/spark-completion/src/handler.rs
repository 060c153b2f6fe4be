use std::any::Any;
use std::sync::Arc;

use crate::args::{ArgsContainer, OperationContext, SharedArgs};
use crate::response::{AnyObject, HostList};
use crate::sealed::Sealed;
use crate::status::Status;

/// 传统响应处理器合约：由调用方长期持有、可被多次复用的完成对象。
///
/// # 设计背景（Why）
/// - 早期 API 要求调用方自行实现一个处理器对象，传输层完成后调用它；这类对象往往由调用方长期持有
///   （例如同步等待器、统计收集器），不会随一次调用而销毁；
/// - 完成回调层通过 [`WrappingHandler`](crate::adapters::WrappingHandler) 把它接入统一的
///   [`CompletionHandler`] 合约，且不获取其所有权。
///
/// # 契约说明（What）
/// - 方法接收 `&self`，实现者若需可变状态请自行使用内部可变性；
/// - `status`、`response`、`hosts` 均按值移交，由实现者消费或直接丢弃；
/// - [`handle_response_with_hosts`](Self::handle_response_with_hosts) 默认丢弃路由信息后委托给
///   [`handle_response`](Self::handle_response)。
///
/// # 前置/后置条件（Contract）
/// - **前置**：实现类型必须 `Send + Sync`，传输层会在其工作线程上调用；
/// - **后置**：调用返回后，本层不再持有任何传入参数。
pub trait ResponseHandler: Send + Sync + Sealed {
    /// 携带路由信息的完成通知。
    fn handle_response_with_hosts(
        &self,
        status: Status,
        response: Option<AnyObject>,
        hosts: HostList,
    ) {
        drop(hosts);
        self.handle_response(status, response);
    }

    /// 完成通知。
    fn handle_response(&self, status: Status, response: Option<AnyObject>);
}

/// 每个完成回调持有的参数桶句柄。
///
/// 默认构造一个全新的空参数桶；流水线组装阶段可以通过
/// [`CompletionHandler::share_args`] 把相邻阶段接到同一个参数桶上。
#[derive(Clone, Debug, Default)]
pub struct Forwarding {
    args: SharedArgs,
}

impl Forwarding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(args: SharedArgs) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &SharedArgs {
        &self.args
    }

    pub fn replace(&mut self, args: SharedArgs) -> SharedArgs {
        std::mem::replace(&mut self.args, args)
    }

    pub fn context(&self) -> OperationContext<'_> {
        OperationContext::new(&self.args)
    }
}

/// 完成回调的统一合约：传输层在一个流水线阶段结束时调用的唯一入口。
///
/// # 设计背景（Why）
/// - 传输层只认识这一种对象；传统处理器、各种形态的闭包与阻塞等待句柄都由
///   [`Resp`](crate::Resp) 工厂适配成它；
/// - 完成回调“持有自己直到唯一一次调用结束”：入口方法以 `self: Box<Self>` 接收所有权，
///   调用结束时处理器随之析构。第二次调用在类型层面无法表达，恰好一次释放由所有权保证。
///
/// # 契约说明（What）
/// - [`on_completion_with_routing`](Self::on_completion_with_routing)：默认丢弃 `hosts`
///   并委托给 [`on_completion`](Self::on_completion)；
/// - [`on_completion`](Self::on_completion)：消费 `status` 与 `response`，执行适配器自身动作，
///   最后释放处理器本身；
/// - 每个处理器持有一个 [`Forwarding`]，即本阶段可见的参数桶。
///
/// # 前置/后置条件（Contract）
/// - **前置**：实现类型 `Send + 'static`，可以被移交给传输层的任意工作线程；
/// - **后置**：调用返回时，状态、载荷与处理器本身均已释放；若处理器从未被调用就被丢弃，
///   其 `Drop` 负责了结它守护的资源（见 [`FutureHandler`](crate::adapters::FutureHandler)）。
///
/// # 风险提示（Trade-offs）
/// - 成功状态下若载荷缺失或类型不符，值型适配器会改报 `INVALID_RESPONSE`，而不是 panic。
pub trait CompletionHandler: Send + Sealed + 'static {
    /// 携带路由信息的完成通知。
    fn on_completion_with_routing(
        self: Box<Self>,
        status: Status,
        response: Option<AnyObject>,
        hosts: HostList,
    ) {
        drop(hosts);
        self.on_completion(status, response);
    }

    /// 完成通知。
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>);

    /// 本处理器的参数桶句柄。
    fn forwarding(&self) -> &Forwarding;

    fn forwarding_mut(&mut self) -> &mut Forwarding;

    /// 本阶段可见的参数桶。
    fn args(&self) -> &SharedArgs {
        self.forwarding().args()
    }

    /// 把本处理器接到给定的共享参数桶上，返回原先的参数桶。
    ///
    /// 流水线组装时对相邻两阶段的处理器传入同一个 [`SharedArgs`]，
    /// 前一阶段写入的值即可被后一阶段读取。
    fn share_args(&mut self, args: SharedArgs) -> SharedArgs {
        self.forwarding_mut().replace(args)
    }

    /// 构造覆盖本处理器参数桶的操作上下文。
    fn operation_context(&self) -> OperationContext<'_> {
        self.forwarding().context()
    }
}

/// [`CompletionHandler`] 上的泛型便捷方法。
pub trait CompletionHandlerExt: CompletionHandler {
    /// 直接向本处理器的参数桶写入参数，通常在流水线组装阶段为下一阶段预置值。
    fn fwd_arg<T: Any + Send>(&self, slot: i32, value: T) {
        self.args().set_arg(slot, value);
    }
}

impl<H: CompletionHandler + ?Sized> CompletionHandlerExt for H {}

/// 让相邻两阶段共享同一参数桶，返回该参数桶。
///
/// 以 `first` 当前的参数桶为准，`second` 原有的参数桶被丢弃。
pub fn chain_args(
    first: &mut dyn CompletionHandler,
    second: &mut dyn CompletionHandler,
) -> SharedArgs {
    let shared = Arc::clone(first.args());
    second.share_args(Arc::clone(&shared));
    shared
}

/// 为尚未创建处理器的阶段准备一个独立的参数桶。
pub fn fresh_args() -> SharedArgs {
    ArgsContainer::shared()
}
