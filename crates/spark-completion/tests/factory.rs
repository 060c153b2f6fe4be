//! 工厂分派测试。
//!
//! # 教案级导览
//!
//! - **Why**：流水线组装代码只通过 [`Resp`] 取得完成回调，分派一旦选错适配器，
//!   回调会以错误的形态被调用；
//! - **How**：对每种输入形态调用 [`Resp::create`] 与对应的显式构造函数，再以统一的
//!   `on_completion` 触发，断言观察到的行为来自预期的适配器；
//! - **What**：覆盖传统处理器（共享/静态借用）、合约处理器（透传/按值）、阻塞等待槽位与四种闭包形态。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use spark_completion::test_stubs::{DropProbe, RecordingResponseHandler};
use spark_completion::{
    AnyObject, CompletionHandler, HostInfo, HostList, OperationContext, PipelineFuture, Resp,
    ResponseHandler, Status, StatusCode, StatusFnHandler,
};

/// 把收到的路由信息与释放探针绑在一起的传统处理器。
///
/// 路由信息按值移交进来后与探针组成同一个值，探针计数即可反映路由信息何时被释放。
#[derive(Default)]
struct RoutingSink {
    probe: Mutex<Option<DropProbe>>,
    urls: Mutex<Vec<String>>,
}

struct RoutedHosts {
    hosts: HostList,
    _probe: Option<DropProbe>,
}

impl ResponseHandler for RoutingSink {
    fn handle_response_with_hosts(
        &self,
        status: Status,
        response: Option<AnyObject>,
        hosts: HostList,
    ) {
        let routed = RoutedHosts {
            hosts,
            _probe: self.probe.lock().take(),
        };
        self.urls
            .lock()
            .extend(routed.hosts.iter().map(|host| host.url.clone()));
        self.handle_response(status, response);
    }

    fn handle_response(&self, _status: Status, _response: Option<AnyObject>) {}
}

/// ## 无值闭包：恰好一次且不读取载荷
///
/// - **意图 (Why)**：无值操作的回调只关心状态，载荷即便存在也只需释放；
/// - **契约 (What)**：回调恰好被调用一次，收到原始成功状态；载荷随调用结束释放。
#[test]
fn status_closure_runs_once_and_releases_payload() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (probe, drops) = DropProbe::new();

    let handler = Resp::<()>::create({
        let calls = Arc::clone(&calls);
        move |status: &Status| {
            assert!(status.is_ok(), "应收到原始成功状态");
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });
    handler.on_completion(Status::ok(), Some(AnyObject::with_value(probe)));

    assert_eq!(calls.load(Ordering::SeqCst), 1, "回调必须恰好调用一次");
    assert_eq!(drops.load(Ordering::SeqCst), 1, "载荷必须在调用结束前释放");
}

/// ## 共享传统处理器：带路由形态只触达一次
///
/// - **契约 (What)**：带路由调用让 `routed_calls` 与 `plain_calls` 各增加一次
///   （后者来自被包装对象自身的委托），被包装对象在包装层析构后仍然存活。
#[test]
fn shared_legacy_handler_sees_routed_call_once() {
    let recorder = Arc::new(RecordingResponseHandler::new());

    let handler = Resp::<()>::create(Arc::clone(&recorder));
    handler.on_completion_with_routing(
        Status::ok(),
        None,
        vec![HostInfo::new("root://redirector:1094")],
    );

    assert_eq!(recorder.routed_calls(), 1);
    assert_eq!(recorder.plain_calls(), 1);
    assert_eq!(recorder.statuses(), vec![Status::ok()]);
    assert_eq!(Arc::strong_count(&recorder), 1, "包装层析构后只剩测试持有的引用");
}

/// ## 共享传统处理器：路由信息在调用结束前释放
///
/// - **契约 (What)**：路由信息按值到达被包装对象，调用返回时已经释放，
///   包装层与被包装对象都不再持有它。
#[test]
fn shared_legacy_handler_releases_routing_info() {
    let (probe, drops) = DropProbe::new();
    let sink = Arc::new(RoutingSink::default());
    *sink.probe.lock() = Some(probe);

    let handler = Resp::<()>::create(Arc::clone(&sink));
    handler.on_completion_with_routing(
        Status::ok(),
        None,
        vec![
            HostInfo::new("root://redirector:1094"),
            HostInfo::new("root://server:1094"),
        ],
    );

    assert_eq!(
        *sink.urls.lock(),
        vec![
            String::from("root://redirector:1094"),
            String::from("root://server:1094"),
        ],
        "被包装对象应收到完整的路由信息"
    );
    assert_eq!(drops.load(Ordering::SeqCst), 1, "调用返回时路由信息必须已释放");
    assert_eq!(Arc::strong_count(&sink), 1);
}

/// ## 静态借用的传统处理器
#[test]
fn static_legacy_handler_is_wrapped_without_ownership() {
    let recorder: &'static RecordingResponseHandler =
        Box::leak(Box::new(RecordingResponseHandler::new()));

    Resp::<()>::create(recorder).on_completion(Status::error(StatusCode::NOT_FOUND), None);
    Resp::<()>::legacy_static(recorder).on_completion(Status::ok(), None);

    assert_eq!(recorder.plain_calls(), 2);
    assert_eq!(
        recorder.statuses(),
        vec![Status::error(StatusCode::NOT_FOUND), Status::ok()]
    );
}

/// ## 已擦除的合约处理器原样透传
///
/// - **契约 (What)**：工厂返回的是同一个堆对象，而不是新的包装层。
#[test]
fn conformant_handler_passes_through_unchanged() {
    let original: Box<dyn CompletionHandler> = Box::new(StatusFnHandler::new(|_: &Status| {}));
    let before = &*original as *const dyn CompletionHandler as *const ();

    let returned = Resp::<u64>::create(original);
    let after = &*returned as *const dyn CompletionHandler as *const ();
    assert_eq!(before, after, "透传不应重新装箱");

    let again = Resp::<u64>::handler(returned);
    assert_eq!(&*again as *const dyn CompletionHandler as *const (), before);
}

/// ## 按值给出的合约处理器只做装箱
#[test]
fn owned_handler_is_boxed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let owned = StatusFnHandler::new({
        let calls = Arc::clone(&calls);
        move |_: &Status| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });

    Resp::<()>::create(owned).on_completion(Status::ok(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// ## 阻塞等待槽位
///
/// - **契约 (What)**：工厂返回后槽位中已有 future，完成后 future 以响应值解析。
#[test]
fn blocking_slot_is_published_immediately() {
    let mut slot: Option<PipelineFuture<u64>> = None;
    let handler = Resp::<u64>::create(&mut slot);
    let future = slot.take().expect("工厂返回前必须已写入 future");

    handler.on_completion(Status::ok(), Some(AnyObject::with_value(512_u64)));
    assert_eq!(future.wait(), Ok(512));
}

/// ## 四种闭包形态分别落到对应适配器
#[test]
fn closure_shapes_dispatch_by_signature() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));

    let status_ctx = Resp::<()>::create({
        let seen = Arc::clone(&seen);
        move |_: &Status, ctx: &mut OperationContext<'_>| {
            let value: u32 = ctx.fetch().unwrap_or_default();
            seen.lock().push(format!("status+ctx:{value}"));
        }
    });
    status_ctx.args().set_arg(1, 5_u32);
    status_ctx.on_completion(Status::ok(), None);

    let response = Resp::<String>::create({
        let seen = Arc::clone(&seen);
        move |_: &Status, value: &String| seen.lock().push(format!("response:{value}"))
    });
    response.on_completion(Status::ok(), Some(AnyObject::with_value(String::from("abc"))));

    let response_ctx = Resp::<i64>::create({
        let seen = Arc::clone(&seen);
        move |status: &Status, value: &i64, ctx: &mut OperationContext<'_>| {
            ctx.forward(*value * 2);
            seen.lock().push(format!("response+ctx:{}:{value}", status.is_ok()));
        }
    });
    let args = Arc::clone(response_ctx.args());
    response_ctx.on_completion(Status::ok(), Some(AnyObject::with_value(-4_i64)));

    assert_eq!(
        *seen.lock(),
        vec![
            String::from("status+ctx:5"),
            String::from("response:abc"),
            String::from("response+ctx:true:-4"),
        ]
    );
    assert_eq!(args.get_arg::<i64>(1), Some(-8));
}

/// ## 显式构造函数与单一入口行为一致
#[test]
fn explicit_constructors_match_create() {
    let seen = Arc::new(Mutex::new(Vec::new()));

    let via_create = Resp::<u32>::create({
        let seen = Arc::clone(&seen);
        move |status: &Status, value: &u32| seen.lock().push((status.code(), *value))
    });
    let via_named = Resp::<u32>::response_fn({
        let seen = Arc::clone(&seen);
        move |status: &Status, value: &u32| seen.lock().push((status.code(), *value))
    });

    via_create.on_completion(Status::error(StatusCode::UNKNOWN), Some(AnyObject::with_value(3_u32)));
    via_named.on_completion(Status::error(StatusCode::UNKNOWN), Some(AnyObject::with_value(3_u32)));

    assert_eq!(
        *seen.lock(),
        vec![(StatusCode::UNKNOWN, 0), (StatusCode::UNKNOWN, 0)],
        "失败路径两者都应传入替身值"
    );
}
