use std::future::Future;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Canned response served to every request of a test run.
#[derive(Clone)]
pub struct ResponsePlan {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponsePlan {
    pub fn ok() -> Self {
        Self {
            status: 200,
            reason: "OK",
            headers: Vec::new(),
            body: "{\"ok\":true}".to_owned(),
        }
    }

    pub fn rate_limited(retry_after: &str) -> Self {
        Self {
            status: 429,
            reason: "Too Many Requests",
            headers: vec![("Retry-After".to_owned(), retry_after.to_owned())],
            body: "slow down".to_owned(),
        }
    }
}

pub struct ServerHandle {
    hits: Arc<AtomicU64>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server for tests, or skip when the sandbox
/// forbids binding a loopback listener.
///
/// # Errors
///
/// Returns an error if the listener cannot be configured after binding.
pub fn spawn_http_server_or_skip(
    plan: ResponsePlan,
) -> Result<Option<(String, ServerHandle)>, String> {
    let listener = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener,
        Err(_) => return Ok(None),
    };
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let hits = Arc::new(AtomicU64::new(0));
    let hits_for_loop = Arc::clone(&hits);
    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            match listener.accept() {
                Ok((stream, _)) => {
                    hits_for_loop.fetch_add(1, Ordering::SeqCst);
                    let plan = plan.clone();
                    thread::spawn(move || handle_client(stream, &plan));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok(Some((
        format!("http://{}", addr),
        ServerHandle {
            hits,
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    )))
}

fn handle_client(mut stream: TcpStream, plan: &ResponsePlan) {
    let mut buffer = [0u8; 2048];
    if stream.read(&mut buffer).is_err() {
        return;
    }

    let mut response = format!("HTTP/1.1 {} {}\r\n", plan.status, plan.reason);
    for (name, value) in &plan.headers {
        response.push_str(name);
        response.push_str(": ");
        response.push_str(value);
        response.push_str("\r\n");
    }
    response.push_str("Content-Length: ");
    response.push_str(&plan.body.len().to_string());
    response.push_str("\r\nConnection: close\r\n\r\n");
    response.push_str(&plan.body);

    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    let _flush_result = stream.flush();
}

/// Reserve a loopback port with no listener behind it, for transport-failure
/// scenarios. Returns `None` when the sandbox forbids binding.
pub fn dead_endpoint_or_skip() -> Option<String> {
    let listener = TcpListener::bind("127.0.0.1:0").ok()?;
    let addr = listener.local_addr().ok()?;
    drop(listener);
    Some(format!("http://{}", addr))
}

/// Run an async test body on a fresh current-thread runtime.
///
/// # Errors
///
/// Propagates the test body's error, or a runtime construction failure.
pub fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime failed: {}", err))?;
    runtime.block_on(future)
}
