//! End-to-end: a registry of services, a checker, and the probe endpoint on a
//! real socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dbprobe::{
    Adapter, AdapterError, AdapterKind, Config, Error, ProbeServer, ServiceDescriptor, ServiceRegistry,
    Session, create_liveness_checker,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct MongoSession(AtomicBool);

impl Session for MongoSession {
    fn is_connected(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

struct MongoAdapter(MongoSession);

impl MongoAdapter {
    fn new(connected: bool) -> Arc<Self> {
        Arc::new(Self(MongoSession(AtomicBool::new(connected))))
    }

    fn set_connected(&self, connected: bool) {
        self.0.0.store(connected, Ordering::SeqCst);
    }
}

impl Adapter for MongoAdapter {
    fn kind(&self) -> AdapterKind { AdapterKind::Mongo }
    fn session(&self) -> Result<&dyn Session, AdapterError> { Ok(&self.0) }
}

/// Not a Mongo adapter. Its session accessor must never be reached.
struct FakeAdapter;

impl Adapter for FakeAdapter {
    fn kind(&self) -> AdapterKind { AdapterKind::Custom("fake".into()) }
    fn session(&self) -> Result<&dyn Session, AdapterError> {
        panic!("this should not be called")
    }
}

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), Error>>,
}

impl Running {
    async fn stop(self) {
        let _ = self.stop.send(());
        self.handle.await.unwrap().unwrap();
    }
}

async fn start(registry: Arc<ServiceRegistry>) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = ProbeServer::new(create_liveness_checker(registry));
    let handle = tokio::spawn(server.serve(listener, async move {
        let _ = stopped.await;
    }));

    Running { addr, stop, handle }
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

#[tokio::test]
async fn answers_200_when_mongo_is_connected() {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(ServiceDescriptor::new("adapterMongo").with_adapter(MongoAdapter::new(true)));
    let server = start(registry).await;

    let res = get(server.addr, "/live").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");
    assert!(res.ends_with("ok"), "{res}");

    server.stop().await;
}

#[tokio::test]
async fn answers_200_when_no_adapter_is_found() {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(ServiceDescriptor::new("noAdapter"));
    let server = start(registry).await;

    let res = get(server.addr, "/live").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");

    server.stop().await;
}

#[tokio::test]
async fn only_mongo_adapters_are_inspected() {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(ServiceDescriptor::new("adapterMongo").with_adapter(MongoAdapter::new(true)));
    registry.register(ServiceDescriptor::new("adapterFake").with_adapter(Arc::new(FakeAdapter)));
    let server = start(registry).await;

    let res = get(server.addr, "/live").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");

    server.stop().await;
}

#[tokio::test]
async fn answers_503_when_mongo_drops() {
    let mongo = MongoAdapter::new(true);
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(ServiceDescriptor::new("posts").with_adapter(mongo.clone()));
    let server = start(registry).await;

    assert!(get(server.addr, "/live").await.starts_with("HTTP/1.1 200"));

    mongo.set_connected(false);
    let res = get(server.addr, "/live").await;
    assert!(res.starts_with("HTTP/1.1 503"), "{res}");
    assert!(res.contains("database adapter not connected"), "{res}");

    mongo.set_connected(true);
    assert!(get(server.addr, "/live").await.starts_with("HTTP/1.1 200"));

    server.stop().await;
}

#[tokio::test]
async fn other_paths_are_404() {
    let server = start(Arc::new(ServiceRegistry::new())).await;

    let res = get(server.addr, "/ready").await;
    assert!(res.starts_with("HTTP/1.1 404"), "{res}");

    server.stop().await;
}

#[tokio::test]
async fn binds_the_configured_address() {
    let config = Config::from_yaml_str("server:\n  addr: 127.0.0.1:0\n  live_path: /healthz/live\n").unwrap();
    let server = ProbeServer::from_config(
        create_liveness_checker(Arc::new(ServiceRegistry::new())),
        &config.server,
    );

    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    assert!(addr.ip().is_loopback(), "{addr}");

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async move {
        let _ = stopped.await;
    }));
    let running = Running { addr, stop, handle };

    let res = get(addr, "/healthz/live").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");
    assert!(get(addr, "/live").await.starts_with("HTTP/1.1 404"));

    running.stop().await;
}
