use std::borrow::Cow;
use std::fmt;

/// 状态的严重级别。
///
/// - `Ok`：操作成功；
/// - `Error`：可恢复失败，调用方可以选择重试；
/// - `Fatal`：不可恢复失败，通常意味着连接或会话已失效。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Error,
    Fatal,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Ok => "SUCCESS",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

/// 稳定的数值状态码。
///
/// # 设计背景（Why）
/// - 传输层以数值码表达失败原因，完成回调层只需识别其中少数几个（例如流水线失败、响应类型不符），
///   其余码值透明透传；
/// - 以新类型包装 `u16`，避免与 `errno` 等其它整数混用。
///
/// # 契约说明（What）
/// - 本模块只登记完成回调层自身会产生或检查的码值；
/// - 未登记码值的 [`description`](Self::description) 统一返回 `"unknown error"`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);
    pub const UNKNOWN: StatusCode = StatusCode(1);
    pub const INVALID_OPERATION: StatusCode = StatusCode(3);
    pub const NOT_FOUND: StatusCode = StatusCode(4);
    pub const INVALID_RESPONSE: StatusCode = StatusCode(301);
    pub const OPERATION_EXPIRED: StatusCode = StatusCode(206);
    pub const PIPELINE_FAILED: StatusCode = StatusCode(501);

    /// 以原始码值构造状态码，供传输层透传未登记的码值。
    pub const fn from_raw(raw: u16) -> Self {
        StatusCode(raw)
    }

    pub const fn as_raw(self) -> u16 {
        self.0
    }

    /// 返回码值的稳定人类可读描述。
    pub fn description(self) -> &'static str {
        match self {
            StatusCode::OK => "no error",
            StatusCode::UNKNOWN => "unknown error",
            StatusCode::INVALID_OPERATION => "invalid operation",
            StatusCode::NOT_FOUND => "not found",
            StatusCode::INVALID_RESPONSE => "invalid response",
            StatusCode::OPERATION_EXPIRED => "operation expired",
            StatusCode::PIPELINE_FAILED => "pipeline failed",
            _ => "unknown error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

/// 一次异步操作的结果状态（Outcome）。
///
/// # 设计背景（Why）
/// - 传输层以该值告知完成回调“成功与否”，完成回调层仅依赖 [`is_ok`](Self::is_ok) 与可渲染描述，
///   其余字段原样交给用户代码检查；
/// - 结构沿用客户端常见的“严重级别 + 状态码 + errno”三元组，并允许附带一段自由文本。
///
/// # 契约说明（What）
/// - 值语义、构造后不可变；`Clone + Send + Sync`，可跨线程、跨 future 边界携带；
/// - 由传输层按值移交给完成回调，回调结束时随之释放。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    severity: Severity,
    code: StatusCode,
    errno: u32,
    message: Option<Cow<'static, str>>,
}

impl Status {
    /// 成功状态。
    pub const fn ok() -> Self {
        Self {
            severity: Severity::Ok,
            code: StatusCode::OK,
            errno: 0,
            message: None,
        }
    }

    /// 可恢复失败。
    pub const fn error(code: StatusCode) -> Self {
        Self {
            severity: Severity::Error,
            code,
            errno: 0,
            message: None,
        }
    }

    /// 不可恢复失败。
    pub const fn fatal(code: StatusCode) -> Self {
        Self {
            severity: Severity::Fatal,
            code,
            errno: 0,
            message: None,
        }
    }

    /// 流水线整体失败的通用状态，阻塞等待桥接在被放弃时使用。
    pub const fn pipeline_failed() -> Self {
        Self::error(StatusCode::PIPELINE_FAILED)
    }

    pub fn with_errno(mut self, errno: u32) -> Self {
        self.errno = errno;
        self
    }

    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn errno(&self) -> u32 {
        self.errno
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("[SUCCESS]");
        }
        write!(f, "[{}] {}", self.severity.label(), self.code.description())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if self.errno != 0 {
            write!(f, " (errno {})", self.errno)?;
        }
        Ok(())
    }
}
