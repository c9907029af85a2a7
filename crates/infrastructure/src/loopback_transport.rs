use async_trait::async_trait;
use flint_core::{
    Data, ExpressCallback, FlintError, FlintResult, Interest, InterestArgs, InterestHandler,
    NackReason, Name, Replier, RequestOutcome, Transport,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::oneshot;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, warn};

/// 进程内回环传输
///
/// 在同一进程内模拟按名称路由的请求/响应网络，适用于嵌入式部署和测试。
/// 兴趣包按最长前缀匹配分发给已挂载且已注册路由的处理器，
/// 同一前缀上有多个处理器时轮流分发；
/// 没有路由时返回 Nack(NoRoute)，在途兴趣包超过上限时返回 Nack(Congestion)，
/// 生命周期内未收到回复则返回 Timeout。
pub struct LoopbackTransport {
    started: AtomicBool,
    /// 前缀 -> 处理器
    handlers: RwLock<Vec<(Name, Arc<dyn InterestHandler>)>>,
    /// 已注册的路由前缀
    routes: RwLock<HashSet<Name>>,
    /// 在途兴趣包数量
    pending: Arc<AtomicUsize>,
    /// 同前缀多处理器时的轮转计数
    next_handler: AtomicUsize,
    config: LoopbackTransportConfig,
}

#[derive(Debug, Clone)]
pub struct LoopbackTransportConfig {
    /// 在途兴趣包上限（0表示无限制）
    pub max_pending_interests: usize,
}

impl Default for LoopbackTransportConfig {
    fn default() -> Self {
        Self {
            max_pending_interests: 1024,
        }
    }
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::with_config(LoopbackTransportConfig::default())
    }

    pub fn with_config(config: LoopbackTransportConfig) -> Self {
        Self {
            started: AtomicBool::new(false),
            handlers: RwLock::new(Vec::new()),
            routes: RwLock::new(HashSet::new()),
            pending: Arc::new(AtomicUsize::new(0)),
            next_handler: AtomicUsize::new(0),
            config,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn pending_interests(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// 最长前缀匹配，只考虑已注册路由的前缀
    fn lookup(&self, name: &Name) -> FlintResult<Option<Arc<dyn InterestHandler>>> {
        let handlers = self
            .handlers
            .read()
            .map_err(|e| FlintError::Transport(format!("处理器表锁已损坏: {e}")))?;
        let routes = self
            .routes
            .read()
            .map_err(|e| FlintError::Transport(format!("路由表锁已损坏: {e}")))?;

        let matching: Vec<&(Name, Arc<dyn InterestHandler>)> = handlers
            .iter()
            .filter(|(prefix, _)| routes.contains(prefix) && prefix.is_prefix_of(name))
            .collect();
        let Some(longest) = matching.iter().map(|(prefix, _)| prefix.len()).max() else {
            return Ok(None);
        };
        let candidates: Vec<&Arc<dyn InterestHandler>> = matching
            .iter()
            .filter(|(prefix, _)| prefix.len() == longest)
            .map(|(_, handler)| handler)
            .collect();

        let index = self.next_handler.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Ok(Some(Arc::clone(candidates[index])))
    }

    fn nack_later(name: &Name, reason: NackReason, callback: ExpressCallback) {
        debug!("拒绝兴趣包 {}: {}", name, reason);
        tokio::spawn(async move {
            callback(RequestOutcome::Nack(reason));
        });
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn start(&self) -> FlintResult<()> {
        if !self.started.swap(true, Ordering::SeqCst) {
            info!("回环传输已启动");
        }
        Ok(())
    }

    async fn stop(&self) -> FlintResult<()> {
        if self.started.swap(false, Ordering::SeqCst) {
            info!("回环传输已停止");
        }
        Ok(())
    }

    fn express(&self, interest: Interest, callback: ExpressCallback) -> FlintResult<()> {
        if !self.is_started() {
            return Err(FlintError::TransportNotStarted);
        }

        let Some(handler) = self.lookup(interest.name())? else {
            Self::nack_later(interest.name(), NackReason::NoRoute, callback);
            return Ok(());
        };

        let max_pending = self.config.max_pending_interests;
        let admitted = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                (max_pending == 0 || pending < max_pending).then_some(pending + 1)
            });
        if admitted.is_err() {
            warn!("在途兴趣包已达上限 {}，拒绝 {}", max_pending, interest.name());
            Self::nack_later(interest.name(), NackReason::Congestion, callback);
            return Ok(());
        }

        let deadline = Instant::now() + interest.lifetime();
        let (tx, rx) = oneshot::channel::<Data>();
        let reply = Replier::new(move |data| {
            tx.send(data).map_err(|data| {
                FlintError::ReplyFailed(format!("{} 的请求方已不存在", data.name()))
            })
        });

        debug!("转发兴趣包 {}", interest.name());
        tokio::spawn(async move {
            handler.on_interest(InterestArgs { interest, reply }).await;
        });

        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            let outcome = match timeout_at(deadline, rx).await {
                Ok(Ok(data)) => RequestOutcome::Data(data),
                // 处理器丢弃了请求，请求方只能等到生命周期结束
                Ok(Err(_)) => {
                    sleep_until(deadline).await;
                    RequestOutcome::Timeout
                }
                Err(_) => RequestOutcome::Timeout,
            };
            pending.fetch_sub(1, Ordering::SeqCst);
            callback(outcome);
        });

        Ok(())
    }

    fn attach_handler(&self, prefix: Name, handler: Arc<dyn InterestHandler>) -> FlintResult<()> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|e| FlintError::Transport(format!("处理器表锁已损坏: {e}")))?;
        if handlers
            .iter()
            .any(|(existing, attached)| *existing == prefix && Arc::ptr_eq(attached, &handler))
        {
            return Err(FlintError::HandlerAttach {
                prefix: prefix.to_string(),
                reason: "该处理器已挂载".to_string(),
            });
        }
        debug!("已挂载处理器: {}", prefix);
        handlers.push((prefix, handler));
        Ok(())
    }

    async fn register_route(&self, prefix: &Name) -> FlintResult<()> {
        if !self.is_started() {
            return Err(FlintError::RouteRegistration {
                prefix: prefix.to_string(),
                reason: "传输层未启动".to_string(),
            });
        }
        let mut routes = self
            .routes
            .write()
            .map_err(|e| FlintError::Transport(format!("路由表锁已损坏: {e}")))?;
        routes.insert(prefix.clone());
        debug!("已注册路由: {}", prefix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_core::{DataConfig, InterestConfig};
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl InterestHandler for Echo {
        async fn on_interest(&self, args: InterestArgs) {
            let name = args.interest.name().clone();
            let content = name.to_string().into_bytes();
            let data = Data::build(name, &DataConfig::default(), content, None).unwrap();
            args.reply.reply(data).unwrap();
        }
    }

    struct Silent;

    #[async_trait]
    impl InterestHandler for Silent {
        async fn on_interest(&self, _args: InterestArgs) {}
    }

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn interest(s: &str, lifetime: Duration) -> Interest {
        let config = InterestConfig {
            must_be_fresh: true,
            lifetime,
            nonce: None,
        };
        Interest::build(name(s), &config, None, None).unwrap()
    }

    async fn express(transport: &LoopbackTransport, interest: Interest) -> RequestOutcome {
        let (tx, rx) = oneshot::channel();
        transport
            .express(
                interest,
                Box::new(move |outcome| {
                    let _ = tx.send(outcome);
                }),
            )
            .unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_express_before_start_fails() {
        let transport = LoopbackTransport::new();
        let result = transport.express(interest("/a", Duration::from_secs(1)), Box::new(|_| {}));
        assert!(matches!(result, Err(FlintError::TransportNotStarted)));
    }

    #[tokio::test]
    async fn test_route_registration_requires_start() {
        let transport = LoopbackTransport::new();
        let result = transport.register_route(&name("/a")).await;
        assert!(matches!(result, Err(FlintError::RouteRegistration { .. })));
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let transport = LoopbackTransport::new();
        transport.start().await.unwrap();
        transport.attach_handler(name("/app"), Arc::new(Silent)).unwrap();
        transport.attach_handler(name("/app/echo"), Arc::new(Echo)).unwrap();
        transport.register_route(&name("/app")).await.unwrap();
        transport.register_route(&name("/app/echo")).await.unwrap();

        match express(&transport, interest("/app/echo/1", Duration::from_secs(1))).await {
            RequestOutcome::Data(data) => assert_eq!(data.content_text(), "/app/echo/1"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrouted_handler_is_nacked() {
        let transport = LoopbackTransport::new();
        transport.start().await.unwrap();
        transport.attach_handler(name("/app/echo"), Arc::new(Echo)).unwrap();

        let outcome = express(&transport, interest("/app/echo/1", Duration::from_secs(1))).await;
        assert!(matches!(outcome, RequestOutcome::Nack(NackReason::NoRoute)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_handler_times_out_after_lifetime() {
        let transport = LoopbackTransport::new();
        transport.start().await.unwrap();
        transport.attach_handler(name("/app"), Arc::new(Silent)).unwrap();
        transport.register_route(&name("/app")).await.unwrap();

        let started = Instant::now();
        let outcome = express(&transport, interest("/app/x", Duration::from_secs(2))).await;
        assert!(matches!(outcome, RequestOutcome::Timeout));
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(transport.pending_interests(), 0);
    }

    #[tokio::test]
    async fn test_same_handler_attached_twice_rejected() {
        let transport = LoopbackTransport::new();
        let handler: Arc<dyn InterestHandler> = Arc::new(Echo);
        transport.attach_handler(name("/app"), Arc::clone(&handler)).unwrap();
        let result = transport.attach_handler(name("/app"), handler);
        assert!(matches!(result, Err(FlintError::HandlerAttach { .. })));
    }

    struct Tagged(&'static str);

    #[async_trait]
    impl InterestHandler for Tagged {
        async fn on_interest(&self, args: InterestArgs) {
            let name = args.interest.name().clone();
            let data = Data::build(name, &DataConfig::default(), self.0.as_bytes().to_vec(), None).unwrap();
            args.reply.reply(data).unwrap();
        }
    }

    #[tokio::test]
    async fn test_shared_prefix_rotates_between_handlers() {
        let transport = LoopbackTransport::new();
        transport.start().await.unwrap();
        transport.attach_handler(name("/app/add"), Arc::new(Tagged("one"))).unwrap();
        transport.attach_handler(name("/app/add"), Arc::new(Tagged("two"))).unwrap();
        transport.register_route(&name("/app/add")).await.unwrap();

        let mut seen = Vec::new();
        for i in 0..4 {
            match express(&transport, interest(&format!("/app/add/{i}"), Duration::from_secs(1))).await {
                RequestOutcome::Data(data) => seen.push(data.content_text()),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        seen.sort();
        assert_eq!(seen, vec!["one", "one", "two", "two"]);
    }

    #[tokio::test]
    async fn test_congestion_when_pending_limit_reached() {
        let transport = LoopbackTransport::with_config(LoopbackTransportConfig {
            max_pending_interests: 1,
        });
        transport.start().await.unwrap();
        transport.attach_handler(name("/app"), Arc::new(Silent)).unwrap();
        transport.register_route(&name("/app")).await.unwrap();

        transport
            .express(interest("/app/1", Duration::from_secs(30)), Box::new(|_| {}))
            .unwrap();
        let outcome = express(&transport, interest("/app/2", Duration::from_secs(30))).await;
        assert!(matches!(outcome, RequestOutcome::Nack(NackReason::Congestion)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_pending_limit_holds_under_concurrent_express() {
        const LIMIT: usize = 4;
        const CALLERS: usize = 32;

        let transport = Arc::new(LoopbackTransport::with_config(LoopbackTransportConfig {
            max_pending_interests: LIMIT,
        }));
        transport.start().await.unwrap();
        transport.attach_handler(name("/app"), Arc::new(Silent)).unwrap();
        transport.register_route(&name("/app")).await.unwrap();

        let congested = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(tokio::sync::Barrier::new(CALLERS));
        let mut callers = Vec::with_capacity(CALLERS);
        for i in 0..CALLERS {
            let transport = Arc::clone(&transport);
            let congested = Arc::clone(&congested);
            let barrier = Arc::clone(&barrier);
            callers.push(tokio::spawn(async move {
                barrier.wait().await;
                transport
                    .express(
                        interest(&format!("/app/{i}"), Duration::from_secs(60)),
                        Box::new(move |outcome| {
                            if matches!(outcome, RequestOutcome::Nack(NackReason::Congestion)) {
                                congested.fetch_add(1, Ordering::SeqCst);
                            }
                        }),
                    )
                    .unwrap();
            }));
        }
        for caller in callers {
            caller.await.unwrap();
        }

        assert_eq!(transport.pending_interests(), LIMIT);
        let wait_until = Instant::now() + Duration::from_secs(5);
        while congested.load(Ordering::SeqCst) < CALLERS - LIMIT && Instant::now() < wait_until {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(congested.load(Ordering::SeqCst), CALLERS - LIMIT);
    }
}
