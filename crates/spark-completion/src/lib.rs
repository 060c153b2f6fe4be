#![deny(unsafe_code)]
#![allow(private_bounds)]
#![doc = "spark-completion: 异步 RPC 客户端的完成回调适配层。"]
#![doc = ""]
#![doc = "== 职责 =="]
#![doc = "1. 把传统处理器对象、不同参数形态的闭包与阻塞等待句柄统一适配为 [`CompletionHandler`]，传输层只需以同一种方式调用。"]
#![doc = "2. 通过参数桶（[`ArgsContainer`]）与操作上下文（[`OperationContext`]）在相邻流水线阶段之间转发值。"]
#![doc = "3. 通过阻塞等待桥接（[`FutureHandler`]）让同步调用方等待异步结果，传输层无需感知阻塞语义。"]
#![doc = ""]
#![doc = "== 不变量 =="]
#![doc = "- 每个完成回调恰好调用一次，资源恰好释放一次（由 `self: Box<Self>` 的所有权保证）；"]
#![doc = "- 阻塞等待方永不无限挂起：桥接即使被丢弃也会以流水线失败解析；"]
#![doc = "- 失败响应永远不会把无效的结果引用暴露给用户代码，改为传入替身值。"]
#![doc = ""]
#![doc = "传输引擎、重定向记录、文件对象与流水线图的构造均为外部协作者，本 crate 只定义其接口。"]

mod sealed;

pub mod adapters;
pub mod args;
pub mod config;
pub mod error;
pub mod factory;
pub mod handler;
pub mod response;
pub mod status;
/// 测试桩命名空间，集中暴露记录型传统处理器、可控元数据句柄与释放探针。
pub mod test_stubs;

pub use adapters::{
    ContextFnHandler, FutureHandler, FutureValue, LegacyTarget, OpenStatContextHandler,
    OpenStatHandler, PipelineFuture, ResponseContextFnHandler, ResponseFnHandler, StatSource,
    StatusFnHandler, WrappingHandler,
};
pub use args::{ArgsContainer, OperationContext, PRIMARY_SLOT, SharedArgs};
pub use config::{BridgeOptions, OpenStatOptions, StatRefresh};
pub use error::{ArgError, PipelineError};
pub use factory::{IntoCompletion, Resp, shape};
pub use handler::{
    CompletionHandler, CompletionHandlerExt, Forwarding, ResponseHandler, chain_args, fresh_args,
};
pub use response::{
    AnyObject, ChunkInfo, DirectoryEntry, DirectoryList, HostInfo, HostList, Location,
    LocationInfo, ProtocolInfo, ResponseValue, StatInfo, stand_in,
};
pub use status::{Severity, Status, StatusCode};
