use std::sync::Arc;

use crate::handler::{CompletionHandler, Forwarding, ResponseHandler};
use crate::response::{AnyObject, HostList};
use crate::status::Status;

use super::trace_completion;

/// 被包装的传统处理器。
///
/// - `Shared`：以 `Arc` 共享持有，对应“按指针传入”；
/// - `Static`：`'static` 借用，对应“按引用传入”，常见于 `OnceLock` 或全局单例。
///
/// 两种形态都不接管处理器的生命周期：完成回调结束只释放包装层自身。
#[derive(Clone)]
pub enum LegacyTarget {
    Shared(Arc<dyn ResponseHandler>),
    Static(&'static dyn ResponseHandler),
}

impl LegacyTarget {
    fn handler(&self) -> &dyn ResponseHandler {
        match self {
            LegacyTarget::Shared(handler) => handler.as_ref(),
            LegacyTarget::Static(handler) => *handler,
        }
    }
}

/// 把传统 [`ResponseHandler`] 接入 [`CompletionHandler`] 合约的代理。
///
/// # 工作方式（How）
/// - 两种调用形态均原样转发：携带路由信息的调用仍以带路由信息的形态到达被包装对象，
///   由被包装对象决定是否使用路由信息；
/// - 转发完成后包装层随 `Box<Self>` 析构，被包装对象不受影响。
///
/// # 契约说明（What）
/// - 参数桶只提供基础合约所需的能力，包装层不会读写其中的值。
pub struct WrappingHandler {
    target: LegacyTarget,
    forwarding: Forwarding,
}

impl WrappingHandler {
    pub fn new(target: LegacyTarget) -> Self {
        Self {
            target,
            forwarding: Forwarding::new(),
        }
    }

    pub fn shared(handler: Arc<dyn ResponseHandler>) -> Self {
        Self::new(LegacyTarget::Shared(handler))
    }

    pub fn borrowed(handler: &'static dyn ResponseHandler) -> Self {
        Self::new(LegacyTarget::Static(handler))
    }
}

impl CompletionHandler for WrappingHandler {
    fn on_completion_with_routing(
        self: Box<Self>,
        status: Status,
        response: Option<AnyObject>,
        hosts: HostList,
    ) {
        trace_completion("wrapping", &status);
        self.target
            .handler()
            .handle_response_with_hosts(status, response, hosts);
    }

    fn on_completion(self: Box<Self>, status: Status, response: Option<AnyObject>) {
        trace_completion("wrapping", &status);
        self.target.handler().handle_response(status, response);
    }

    fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }

    fn forwarding_mut(&mut self) -> &mut Forwarding {
        &mut self.forwarding
    }
}
