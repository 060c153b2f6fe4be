//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 完成回调层的失败绝大多数以 [`Status`] 值的形式交给用户代码，只有两个地方需要独立的错误类型：
//!   阻塞等待桥接跨越同步边界时的 [`PipelineError`]，以及按槽位强制取参时的 [`ArgError`]；
//! - 两者均派生 `thiserror::Error`，可直接参与 `?` 传播并接入 `std::error::Error` 生态。
//!
//! ## 设计要求（What）
//! - `PipelineError` 必须完整携带原始状态，等待方可以据此区分业务失败与流水线被放弃；
//! - `ArgError` 需说明缺失参数的类型名与槽位，便于排查上一阶段漏转发的问题。

use thiserror::Error;

use crate::status::{Status, StatusCode};

/// 流水线失败信号：跨越阻塞等待边界传递的非成功状态。
///
/// # 教案式说明
/// - **意图 (Why)**：异步完成回调与同步等待方之间没有旁路通道，失败只能通过 future 本身的
///   `Result` 传递；本类型即 `Err` 分支的载体。
/// - **契约 (What)**：
///   - 包装且仅包装一个 [`Status`]；
///   - 来源有两种：操作本身失败（原样携带传输层状态），或完成回调在未被调用前被丢弃
///     （携带 [`Status::pipeline_failed`]）；
///   - `Clone + Send + Sync + 'static`，可在线程间自由移动。
/// - **风险 (Trade-offs)**：等待方不能假定 future 只在成功时完成，必须处理 `Err`。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("pipeline failed: {status}")]
pub struct PipelineError {
    status: Status,
}

impl PipelineError {
    pub fn new(status: Status) -> Self {
        Self { status }
    }

    /// 完成回调被放弃（从未调用即销毁）时使用的通用失败。
    pub fn abandoned() -> Self {
        Self::new(Status::pipeline_failed())
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn into_status(self) -> Status {
        self.status
    }

    /// 是否为“流水线被放弃”这一通用失败，而非操作自身返回的失败。
    pub fn is_abandoned(&self) -> bool {
        self.status.code() == StatusCode::PIPELINE_FAILED
    }
}

impl From<Status> for PipelineError {
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}

/// 参数桶访问错误。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArgError {
    /// 指定类型与槽位上没有可用的参数。
    #[error("argument `{type_name}` is not present in slot {slot}")]
    Missing { type_name: &'static str, slot: i32 },
}

impl From<ArgError> for Status {
    fn from(err: ArgError) -> Self {
        Status::error(StatusCode::NOT_FOUND).with_message(err.to_string())
    }
}
