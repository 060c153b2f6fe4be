//! 适配器家族的行为测试。
//!
//! # 教案级导览
//!
//! - **Why**：每个适配器都必须满足“恰好调用一次、调用后释放状态与载荷、失败时不读取载荷”三条合约；
//!   本文件针对值型、无值型、上下文型闭包适配器与传统处理器包装逐一验证。
//! - **How**：通过共享原子计数记录回调次数，通过 [`DropProbe`] 证明载荷已被释放，
//!   通过在失败载荷中放入“真实值”来证明适配器没有读取它。
//! - **What**：所有测试均同步执行，不依赖运行时。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use spark_completion::test_stubs::{DropProbe, RecordingResponseHandler};
use spark_completion::{
    AnyObject, CompletionHandler, ContextFnHandler, HostInfo, OperationContext, Resp,
    ResponseContextFnHandler, ResponseFnHandler, ResponseValue, Status, StatusCode,
    StatusFnHandler,
};

/// 携带释放探针的响应类型，用于证明载荷中的值随调用结束被释放。
#[derive(Debug, Default)]
struct Tracked {
    label: String,
    probe: Option<DropProbe>,
}

impl ResponseValue for Tracked {}

fn tracked_payload(label: &str) -> (AnyObject, Arc<AtomicUsize>) {
    let (probe, drops) = DropProbe::new();
    let payload = AnyObject::with_value(Tracked {
        label: label.to_owned(),
        probe: Some(probe),
    });
    (payload, drops)
}

/// ## 值型适配器：成功路径
///
/// - **意图 (Why)**：成功时回调必须拿到载荷中的真实值；
/// - **契约 (What)**：回调恰好一次，参数为 `(OK, V)`；调用结束后载荷已释放。
#[test]
fn response_fn_passes_value_on_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(None));
    let (payload, drops) = tracked_payload("payload-v");

    let handler = {
        let calls = Arc::clone(&calls);
        let seen = Arc::clone(&seen);
        Resp::<Tracked>::response_fn(move |status: &Status, value: &Tracked| {
            calls.fetch_add(1, Ordering::SeqCst);
            *seen.lock() = Some((status.is_ok(), value.label.clone()));
        })
    };

    handler.on_completion(Status::ok(), Some(payload));

    assert_eq!(calls.load(Ordering::SeqCst), 1, "回调必须恰好调用一次");
    assert_eq!(
        seen.lock().clone(),
        Some((true, String::from("payload-v"))),
        "成功时应传入载荷中的真实值"
    );
    assert_eq!(drops.load(Ordering::SeqCst), 1, "调用结束后载荷中的值必须已被释放");
}

/// ## 值型适配器：失败路径使用替身值
///
/// - **意图 (Why)**：失败时载荷内容未定义，适配器不得读取，必须改传替身值；
/// - **逻辑 (How)**：失败载荷中故意放入一个非默认的值，若回调观察到它，说明载荷被读取；
/// - **契约 (What)**：回调收到 `(失败状态, 默认值)`，且载荷依旧被释放。
#[test]
fn response_fn_uses_stand_in_on_failure_without_reading_payload() {
    let seen = Arc::new(Mutex::new(None));
    let (payload, drops) = tracked_payload("must-not-be-read");

    let handler = {
        let seen = Arc::clone(&seen);
        Resp::<Tracked>::response_fn(move |status: &Status, value: &Tracked| {
            *seen.lock() = Some((status.code(), value.label.clone(), value.probe.is_some()));
        })
    };

    handler.on_completion(Status::error(StatusCode::OPERATION_EXPIRED), Some(payload));

    assert_eq!(
        seen.lock().clone(),
        Some((StatusCode::OPERATION_EXPIRED, String::new(), false)),
        "失败时应传入替身值而非载荷内容"
    );
    assert_eq!(drops.load(Ordering::SeqCst), 1, "失败路径同样必须释放载荷");
}

/// ## 值型适配器：成功但载荷类型不符
///
/// - **契约 (What)**：不 panic，改报 `INVALID_RESPONSE` 并传入替身值。
#[test]
fn response_fn_reports_invalid_response_on_type_mismatch() {
    let seen = Arc::new(Mutex::new(None));
    let handler = {
        let seen = Arc::clone(&seen);
        Resp::<u64>::response_fn(move |status: &Status, value: &u64| {
            *seen.lock() = Some((status.code(), *value));
        })
    };

    handler.on_completion(Status::ok(), Some(AnyObject::with_value("not a number")));

    assert_eq!(
        *seen.lock(),
        Some((StatusCode::INVALID_RESPONSE, 0)),
        "类型不符应改报 INVALID_RESPONSE"
    );
}

/// ## 无值适配器只看到状态并释放载荷
#[test]
fn status_fn_sees_outcome_and_releases_payload() {
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let (probe, drops) = DropProbe::new();

    let handler = StatusFnHandler::new({
        let statuses = Arc::clone(&statuses);
        move |status: &Status| statuses.lock().push(status.clone())
    });
    Box::new(handler).on_completion(
        Status::fatal(StatusCode::UNKNOWN),
        Some(AnyObject::with_value(probe)),
    );

    assert_eq!(
        *statuses.lock(),
        vec![Status::fatal(StatusCode::UNKNOWN)],
        "回调应恰好收到一次原始状态"
    );
    assert_eq!(drops.load(Ordering::SeqCst), 1, "无值适配器同样必须释放载荷");
}

/// ## 路由信息形态默认被丢弃后委托
///
/// - **意图 (Why)**：闭包适配器不关心路由信息，默认实现应释放它并走普通完成路径。
#[test]
fn routing_variant_delegates_for_closure_adapters() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = ResponseFnHandler::<u32, _>::new({
        let calls = Arc::clone(&calls);
        move |status: &Status, value: &u32| {
            assert!(status.is_ok());
            assert_eq!(*value, 11);
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });

    Box::new(handler).on_completion_with_routing(
        Status::ok(),
        Some(AnyObject::with_value(11_u32)),
        vec![HostInfo::new("root://redirector:1094"), HostInfo::new("root://server:1094")],
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// ## 上下文适配器读写的是自身参数桶
#[test]
fn context_fn_operates_on_own_bucket() {
    let handler = ContextFnHandler::new(|status: &Status, ctx: &mut OperationContext<'_>| {
        assert!(status.is_ok());
        let previous: u64 = ctx.fetch().unwrap_or_default();
        ctx.forward(previous + 1);
    });
    let args = Arc::clone(handler.args());
    args.set_arg(1, 41_u64);

    Box::new(handler).on_completion(Status::ok(), None);

    assert_eq!(args.get_arg::<u64>(1), Some(42), "回调写入应落在处理器自身的参数桶中");
}

/// ## 上下文适配器同样释放载荷
#[test]
fn context_fn_releases_payload() {
    let (probe, drops) = DropProbe::new();
    let handler = ContextFnHandler::new(|_: &Status, ctx: &mut OperationContext<'_>| {
        ctx.forward(1_u8);
    });

    Box::new(handler).on_completion(
        Status::error(StatusCode::UNKNOWN),
        Some(AnyObject::with_value(probe)),
    );

    assert_eq!(drops.load(Ordering::SeqCst), 1, "上下文适配器必须释放载荷");
}

/// ## 值型上下文适配器：成功与失败路径都释放载荷
///
/// - **契约 (What)**：成功时回调拿到真实值并可转发；失败时拿到替身值；
///   两种路径下载荷都在调用返回前释放。
#[test]
fn response_context_fn_releases_payload_on_both_paths() {
    let labels = Arc::new(Mutex::new(Vec::new()));

    for (status, label) in [
        (Status::ok(), "delivered"),
        (Status::error(StatusCode::OPERATION_EXPIRED), "must-not-be-read"),
    ] {
        let (payload, drops) = tracked_payload(label);
        let handler = ResponseContextFnHandler::<Tracked, _>::new({
            let labels = Arc::clone(&labels);
            move |_: &Status, value: &Tracked, ctx: &mut OperationContext<'_>| {
                ctx.forward(value.label.clone());
                labels.lock().push(value.label.clone());
            }
        });

        Box::new(handler).on_completion(status, Some(payload));
        assert_eq!(drops.load(Ordering::SeqCst), 1, "值型上下文适配器必须释放载荷");
    }

    assert_eq!(
        *labels.lock(),
        vec![String::from("delivered"), String::new()],
        "成功传真实值，失败传替身值"
    );
}

/// ## 传统处理器包装：两种调用形态原样转发
///
/// - **契约 (What)**：普通形态只触达 `handle_response`；带路由形态先触达
///   `handle_response_with_hosts`，被包装对象的生命周期不受影响。
#[test]
fn wrapping_handler_forwards_both_shapes_verbatim() {
    let recorder = Arc::new(RecordingResponseHandler::new());

    Resp::<()>::legacy(recorder.clone()).on_completion(Status::ok(), None);
    assert_eq!(recorder.plain_calls(), 1);
    assert_eq!(recorder.routed_calls(), 0);

    Resp::<()>::legacy(recorder.clone()).on_completion_with_routing(
        Status::error(StatusCode::NOT_FOUND),
        None,
        vec![HostInfo::new("root://a:1094")],
    );
    assert_eq!(recorder.routed_calls(), 1);
    assert_eq!(recorder.plain_calls(), 2, "被包装对象的默认实现应再委托给普通形态");
    assert_eq!(recorder.host_counts(), vec![1]);
    assert_eq!(Arc::strong_count(&recorder), 1, "包装层析构后不应再持有被包装对象");
}

/// ## 未调用即丢弃的闭包适配器不会触发回调
#[test]
fn dropped_closure_adapter_never_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = {
        let calls = Arc::clone(&calls);
        Resp::<()>::status_fn(move |_: &Status| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    drop(handler);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
