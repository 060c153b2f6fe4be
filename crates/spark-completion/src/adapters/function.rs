use std::marker::PhantomData;

use crate::args::OperationContext;
use crate::handler::{CompletionHandler, Forwarding};
use crate::response::{AnyObject, ResponseValue, stand_in};
use crate::status::Status;

use super::{take_response, trace_completion};

/// `(&Status)` 形态的闭包适配器，用于无值响应。
pub struct StatusFnHandler<F> {
    fun: F,
    forwarding: Forwarding,
}

impl<F> StatusFnHandler<F>
where
    F: FnOnce(&Status) + Send + 'static,
{
    pub fn new(fun: F) -> Self {
        Self {
            fun,
            forwarding: Forwarding::new(),
        }
    }
}

impl<F> CompletionHandler for StatusFnHandler<F>
where
    F: FnOnce(&Status) + Send + 'static,
{
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        drop(response);
        trace_completion("status-fn", &status);
        let Self { fun, .. } = *self;
        fun(&status);
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}

/// `(&Status, &R)` 形态的闭包适配器。
///
/// # 教案式说明
/// - **意图 (Why)**：让回调以统一签名拿到结果引用，同时保证失败路径不会解引用无效载荷；
/// - **契约 (What)**：
///   - 成功：从载荷移出 `R`，以引用传给回调，回调返回后释放；
///   - 失败：不读取载荷，传入 [`stand_in::<R>()`](stand_in)；回调必须先检查状态再信任结果；
///   - 成功但载荷缺失/类型不符：状态改为 `INVALID_RESPONSE`，同样传入替身值。
pub struct ResponseFnHandler<R, F> {
    fun: F,
    forwarding: Forwarding,
    _response: PhantomData<fn() -> R>,
}

impl<R, F> ResponseFnHandler<R, F>
where
    R: ResponseValue,
    F: FnOnce(&Status, &R) + Send + 'static,
{
    pub fn new(fun: F) -> Self {
        Self {
            fun,
            forwarding: Forwarding::new(),
            _response: PhantomData,
        }
    }
}

impl<R, F> CompletionHandler for ResponseFnHandler<R, F>
where
    R: ResponseValue,
    F: FnOnce(&Status, &R) + Send + 'static,
{
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        let (status, value) = take_response::<R>(status, response);
        trace_completion("response-fn", &status);
        let Self { fun, .. } = *self;
        fun(&status, value.as_ref().unwrap_or_else(|| stand_in::<R>()));
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}

/// `(&Status, &mut OperationContext)` 形态的闭包适配器。
///
/// 回调通过操作上下文读取上一阶段转发的值，或为下一阶段写入新值。
pub struct ContextFnHandler<F> {
    fun: F,
    forwarding: Forwarding,
}

impl<F> ContextFnHandler<F>
where
    F: FnOnce(&Status, &mut OperationContext<'_>) + Send + 'static,
{
    pub fn new(fun: F) -> Self {
        Self {
            fun,
            forwarding: Forwarding::new(),
        }
    }
}

impl<F> CompletionHandler for ContextFnHandler<F>
where
    F: FnOnce(&Status, &mut OperationContext<'_>) + Send + 'static,
{
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        drop(response);
        trace_completion("context-fn", &status);
        let Self { fun, forwarding } = *self;
        let mut ctx = forwarding.context();
        fun(&status, &mut ctx);
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}

/// `(&Status, &R, &mut OperationContext)` 形态的闭包适配器，
/// 结合了 [`ResponseFnHandler`] 的结果提取与 [`ContextFnHandler`] 的参数转发。
pub struct ResponseContextFnHandler<R, F> {
    fun: F,
    forwarding: Forwarding,
    _response: PhantomData<fn() -> R>,
}

impl<R, F> ResponseContextFnHandler<R, F>
where
    R: ResponseValue,
    F: FnOnce(&Status, &R, &mut OperationContext<'_>) + Send + 'static,
{
    pub fn new(fun: F) -> Self {
        Self {
            fun,
            forwarding: Forwarding::new(),
            _response: PhantomData,
        }
    }
}

impl<R, F> CompletionHandler for ResponseContextFnHandler<R, F>
where
    R: ResponseValue,
    F: FnOnce(&Status, &R, &mut OperationContext<'_>) + Send + 'static,
{
    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        let (status, value) = take_response::<R>(status, response);
        trace_completion("response-context-fn", &status);
        let Self { fun, forwarding, .. } = *self;
        let mut ctx = forwarding.context();
        fun(
            &status,
            value.as_ref().unwrap_or_else(|| stand_in::<R>()),
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
