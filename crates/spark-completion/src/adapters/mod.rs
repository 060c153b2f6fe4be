//! 完成回调适配器家族。
//!
//! # 模块职责（Why）
//! - 每个适配器把一种外部形态（传统处理器、不同参数形态的闭包、打开后查询元数据的组合、
//!   阻塞等待句柄）接入统一的 [`CompletionHandler`](crate::CompletionHandler) 合约；
//! - 适配器由 [`Resp`](crate::Resp) 工厂按输入形态选择并构造，调用方一般不直接实例化。
//!
//! # 共同契约（What）
//! - 恰好调用一次：入口方法消费 `Box<Self>`；
//! - 调用结束前释放状态、载荷与路由信息，适配器随后析构；
//! - 失败路径上绝不读取载荷，需要结果引用的回调改为拿到 [`stand_in`](crate::stand_in) 替身值。

mod function;
mod future;
mod open_stat;
mod wrapping;

pub use function::{ContextFnHandler, ResponseContextFnHandler, ResponseFnHandler, StatusFnHandler};
pub use future::{FutureHandler, FutureValue, PipelineFuture};
pub use open_stat::{OpenStatContextHandler, OpenStatHandler, StatSource};
pub use wrapping::{LegacyTarget, WrappingHandler};

use std::any::{Any, type_name};

use crate::response::AnyObject;
use crate::status::{Status, StatusCode};

/// 记录一次完成回调调用。
pub(crate) fn trace_completion(adapter: &'static str, status: &Status) {
    tracing::debug!(
        target: "spark_completion::handler",
        adapter,
        ok = status.is_ok(),
        code = status.code().as_raw(),
        "completion handler invoked"
    );
}

/// 成功状态下载荷缺失或类型不符时改报的状态。
pub(crate) fn invalid_response<R>() -> Status {
    Status::error(StatusCode::INVALID_RESPONSE).with_message(format!(
        "expected a response of type `{}`",
        type_name::<R>()
    ))
}

/// 按状态从载荷中取出类型为 `R` 的结果。
///
/// - 失败状态：不触碰载荷，直接释放，返回原状态与 `None`；
/// - 成功状态且载荷持有 `R`：返回原状态与值；
/// - 成功状态但载荷缺失或类型不符：返回 [`invalid_response`] 与 `None`。
///
/// 载荷在函数返回前释放。
pub(crate) fn take_response<R: Any>(
    status: Status,
    response: Option<AnyObject>,
) -> (Status, Option<R>) {
    if !status.is_ok() {
        drop(response);
        return (status, None);
    }

    match response.and_then(|mut payload| payload.take::<R>()) {
        Some(value) => (status, Some(value)),
        None => {
            tracing::warn!(
                target: "spark_completion::handler",
                expected = type_name::<R>(),
                "successful completion carried no usable response"
            );
            (invalid_response::<R>(), None)
        }
    }
}
