use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::sync::Arc;
use tokio::net::TcpListener;

use resource_pipeline::{config, logger, response, Dispatched, Middleware};

const CONNECTION_TIMEOUT_SECS: u64 = 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(serve(cfg))
}

async fn serve(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    let middleware = Arc::new(build_middleware(&cfg)?);
    let access_log = cfg.logging.access_log;

    logger::log_server_start(&addr, &cfg.middleware_config().root, cfg.targets.len());

    loop {
        match listener.accept().await {
            Ok((stream, _peer_addr)) => {
                handle_connection(stream, Arc::clone(&middleware), access_log);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Build the middleware from the declaratively configured targets.
fn build_middleware(cfg: &config::Config) -> Result<Middleware, Box<dyn std::error::Error>> {
    let targets = cfg
        .targets
        .iter()
        .map(config::TargetSpec::build)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Middleware::new(cfg.middleware_config(), targets))
}

/// Serve one connection in a spawned task, with a connection timeout.
fn handle_connection(stream: tokio::net::TcpStream, middleware: Arc<Middleware>, access_log: bool) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let conn = http1::Builder::new().serve_connection(
            io,
            service_fn(move |req| {
                let middleware = Arc::clone(&middleware);
                async move {
                    if access_log {
                        logger::log_request(req.method(), req.uri());
                    }
                    let resp = match middleware.dispatch(req).await {
                        Dispatched::Response(resp) => resp,
                        // End of the chain: nothing handled the request
                        Dispatched::Forward(_req) => response::build_404_response(),
                    };
                    if access_log {
                        let size = resp
                            .headers()
                            .get("Content-Length")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                        logger::log_response(resp.status().as_u16(), size);
                    }
                    Ok::<_, std::convert::Infallible>(resp)
                }
            }),
        );

        let timeout = std::time::Duration::from_secs(CONNECTION_TIMEOUT_SECS);
        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection timeout after {CONNECTION_TIMEOUT_SECS} seconds"
                ));
            }
        }
    });
}

/// Create a `TcpListener` with `SO_REUSEPORT` and `SO_REUSEADDR` enabled,
/// so a restarted dev server can rebind immediately.
fn create_reusable_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
