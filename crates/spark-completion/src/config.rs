//! 适配器选项。
//!
//! ### 设计目标（Why）
//! - 完成回调层本身没有运行时状态，工厂是纯粹的分派表；少量可调行为以按值传入的选项结构表达，
//!   不引入全局配置；
//! - 所有选项实现 `Default`，调用方只需关注需要修改的字段。

/// 打开后查询元数据时是否强制刷新。
///
/// - `Cached`：允许句柄返回打开时已缓存的元数据（默认行为）；
/// - `Forced`：要求句柄向服务端重新查询。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatRefresh {
    #[default]
    Cached,
    Forced,
}

impl StatRefresh {
    pub fn is_forced(self) -> bool {
        matches!(self, StatRefresh::Forced)
    }
}

/// 打开并查询元数据适配器的选项。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenStatOptions {
    pub refresh: StatRefresh,
}

impl OpenStatOptions {
    pub fn with_refresh(mut self, refresh: StatRefresh) -> Self {
        self.refresh = refresh;
        self
    }
}

/// 阻塞等待桥接的选项。
///
/// ### 契约说明（What）
/// - `report_abandoned`：桥接在未被调用前被丢弃时，是否以 `warn` 级别记录（否则降为 `debug`）。
///   无论取值如何，等待方都会收到流水线失败。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgeOptions {
    pub report_abandoned: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            report_abandoned: true,
        }
    }
}

impl BridgeOptions {
    pub fn with_report_abandoned(mut self, report: bool) -> Self {
        self.report_abandoned = report;
        self
    }
}
