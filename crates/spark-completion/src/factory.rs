//! 完成回调工厂：按输入形态选择并构造适配器。
//!
//! # 模块职责（Why）
//! - 流水线组装代码手里可能是传统处理器、已经符合合约的处理器、阻塞等待的输出槽位，
//!   或是四种参数形态之一的闭包；工厂把它们统一变成 `Box<dyn CompletionHandler>`；
//! - 工厂是纯粹的分派表，不持有任何运行时状态。
//!
//! # 使用方式（How）
//! 1. 已知输入形态时，直接调用对应的构造函数，例如 [`Resp::response_fn`]、[`Resp::future`]；
//! 2. 需要单一入口时使用 [`Resp::create`]：输入形态由 [`IntoCompletion`] 的标记类型参数在编译期选出，
//!    不做任何运行时类型检查。闭包参数需写明类型（如 `|st: &Status, v: &u64|`），编译器才能据此挑选形态。
//!
//! # 契约摘要（What）
//! - 无值响应（`R = ()`）只接受 `(&Status)` 与 `(&Status, &mut OperationContext)` 两种闭包；
//! - 值响应（`R: ResponseValue`）只接受 `(&Status, &R)` 与 `(&Status, &R, &mut OperationContext)`；
//! - 两组签名按 `R` 互斥，且一个闭包只有一种参数个数，因此不存在歧义：
//!   能匹配的签名就是参数最多、最具体的那一个；
//! - 已符合合约的处理器原样透传，不再包装。

use std::marker::PhantomData;
use std::sync::Arc;

use crate::adapters::{
    ContextFnHandler, FutureHandler, FutureValue, OpenStatContextHandler, OpenStatHandler,
    PipelineFuture, ResponseContextFnHandler, ResponseFnHandler, StatSource, StatusFnHandler,
    WrappingHandler,
};
use crate::args::OperationContext;
use crate::config::{BridgeOptions, OpenStatOptions};
use crate::handler::{CompletionHandler, ResponseHandler};
use crate::response::{ResponseValue, StatInfo};
use crate::status::Status;

/// 输入形态标记。只在类型层面使用，不可实例化。
pub mod shape {
    /// `Arc` 共享的传统处理器。
    pub enum Legacy {}
    /// `'static` 借用的传统处理器。
    pub enum LegacyStatic {}
    /// 已擦除的合约处理器，原样透传。
    pub enum Conformant {}
    /// 按值给出的合约处理器。
    pub enum Owned {}
    /// 阻塞等待的输出槽位。
    pub enum Blocking {}
    /// `(&Status)`。
    pub enum Status {}
    /// `(&Status, &mut OperationContext)`。
    pub enum StatusContext {}
    /// `(&Status, &R)`。
    pub enum Response {}
    /// `(&Status, &R, &mut OperationContext)`。
    pub enum ResponseContext {}
}

/// 可以转换为完成回调的输入。
///
/// `R` 为该阶段的响应类型，`Shape` 为 [`shape`] 中的标记类型，用于让同一类型在不同形态下的实现互不冲突。
pub trait IntoCompletion<R, Shape> {
    fn into_completion(self) -> Box<dyn CompletionHandler>;
}

impl<R, H> IntoCompletion<R, shape::Legacy> for Arc<H>
where
    H: ResponseHandler + 'static,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(WrappingHandler::shared(self))
    }
}

impl<R, H> IntoCompletion<R, shape::LegacyStatic> for &'static H
where
    H: ResponseHandler + 'static,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(WrappingHandler::borrowed(self))
    }
}

impl<R> IntoCompletion<R, shape::Conformant> for Box<dyn CompletionHandler> {
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        self
    }
}

impl<R, H> IntoCompletion<R, shape::Owned> for H
where
    H: CompletionHandler,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(self)
    }
}

impl<R> IntoCompletion<R, shape::Blocking> for &mut Option<PipelineFuture<R>>
where
    R: FutureValue,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(FutureHandler::new(self))
    }
}

impl<F> IntoCompletion<(), shape::Status> for F
where
    F: FnOnce(&Status) + Send + 'static,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(StatusFnHandler::new(self))
    }
}

impl<F> IntoCompletion<(), shape::StatusContext> for F
where
    F: FnOnce(&Status, &mut OperationContext<'_>) + Send + 'static,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(ContextFnHandler::new(self))
    }
}

impl<R, F> IntoCompletion<R, shape::Response> for F
where
    R: ResponseValue,
    F: FnOnce(&Status, &R) + Send + 'static,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(ResponseFnHandler::<R, F>::new(self))
    }
}

impl<R, F> IntoCompletion<R, shape::ResponseContext> for F
where
    R: ResponseValue,
    F: FnOnce(&Status, &R, &mut OperationContext<'_>) + Send + 'static,
{
    fn into_completion(self) -> Box<dyn CompletionHandler> {
        Box::new(ResponseContextFnHandler::<R, F>::new(self))
    }
}

/// 以响应类型 `R` 参数化的完成回调工厂。
///
/// # 教案式说明
/// - **意图 (Why)**：把“按输入形态挑选适配器”集中在一处，流水线组装代码只需说明阶段的响应类型；
/// - **契约 (What)**：所有构造函数返回可直接交给传输层的 `Box<dyn CompletionHandler>`；
///   工厂本身是零尺寸类型，从不实例化；
/// - **执行逻辑 (How)**：各构造函数直接实例化对应适配器；[`create`](Self::create) 经由
///   [`IntoCompletion`] 做静态分派。
pub struct Resp<R>(PhantomData<fn() -> R>);

impl<R> Resp<R> {
    /// 单一入口：输入形态由类型系统选出。
    pub fn create<M>(input: impl IntoCompletion<R, M>) -> Box<dyn CompletionHandler> {
        input.into_completion()
    }

    /// 包装 `Arc` 共享的传统处理器。
    pub fn legacy(handler: Arc<dyn ResponseHandler>) -> Box<dyn CompletionHandler> {
        Box::new(WrappingHandler::shared(handler))
    }

    /// 包装 `'static` 借用的传统处理器。
    pub fn legacy_static(handler: &'static dyn ResponseHandler) -> Box<dyn CompletionHandler> {
        Box::new(WrappingHandler::borrowed(handler))
    }

    /// 已符合合约的处理器：原样返回，不做包装。
    pub fn handler(handler: Box<dyn CompletionHandler>) -> Box<dyn CompletionHandler> {
        handler
    }

    /// 按值给出的合约处理器：仅装箱。
    pub fn from_handler<H: CompletionHandler>(handler: H) -> Box<dyn CompletionHandler> {
        Box::new(handler)
    }
}

impl<R: FutureValue> Resp<R> {
    /// 构造阻塞等待桥接，并立即把配对的 future 写入 `slot`。
    pub fn future(slot: &mut Option<PipelineFuture<R>>) -> Box<dyn CompletionHandler> {
        Box::new(FutureHandler::new(slot))
    }

    pub fn future_with(
        slot: &mut Option<PipelineFuture<R>>,
        options: BridgeOptions,
    ) -> Box<dyn CompletionHandler> {
        Box::new(FutureHandler::new(slot).with_options(options))
    }
}

impl Resp<()> {
    /// `(&Status)` 形态。
    pub fn status_fn<F>(fun: F) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status) + Send + 'static,
    {
        Box::new(StatusFnHandler::new(fun))
    }

    /// `(&Status, &mut OperationContext)` 形态。
    pub fn context_fn<F>(fun: F) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &mut OperationContext<'_>) + Send + 'static,
    {
        Box::new(ContextFnHandler::new(fun))
    }

    /// 打开操作完成后查询元数据，把元数据交给回调。
    pub fn open_stat<F>(source: Arc<dyn StatSource>, fun: F) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &StatInfo) + Send + 'static,
    {
        Self::open_stat_with(source, OpenStatOptions::default(), fun)
    }

    pub fn open_stat_with<F>(
        source: Arc<dyn StatSource>,
        options: OpenStatOptions,
        fun: F,
    ) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &StatInfo) + Send + 'static,
    {
        Box::new(OpenStatHandler::new(source, fun).with_options(options))
    }

    /// [`open_stat`](Self::open_stat) 的参数转发版本。
    pub fn open_stat_context<F>(source: Arc<dyn StatSource>, fun: F) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &StatInfo, &mut OperationContext<'_>) + Send + 'static,
    {
        Self::open_stat_context_with(source, OpenStatOptions::default(), fun)
    }

    pub fn open_stat_context_with<F>(
        source: Arc<dyn StatSource>,
        options: OpenStatOptions,
        fun: F,
    ) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &StatInfo, &mut OperationContext<'_>) + Send + 'static,
    {
        Box::new(OpenStatContextHandler::new(source, fun).with_options(options))
    }
}

impl<R: ResponseValue> Resp<R> {
    /// `(&Status, &R)` 形态。
    pub fn response_fn<F>(fun: F) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &R) + Send + 'static,
    {
        Box::new(ResponseFnHandler::<R, F>::new(fun))
    }

    /// `(&Status, &R, &mut OperationContext)` 形态。
    pub fn response_context_fn<F>(fun: F) -> Box<dyn CompletionHandler>
    where
        F: FnOnce(&Status, &R, &mut OperationContext<'_>) + Send + 'static,
    {
        Box::new(ResponseContextFnHandler::<R, F>::new(fun))
    }
}
