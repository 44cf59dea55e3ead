use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::EnvFilter;

use crate::aof::{self, Aof};
use crate::config::Config;
use crate::connection::Connection;
use crate::dispatch;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Rebuilds the store from the append-only file, then serves clients until the listener fails.
pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let store = Store::new();
    aof::replay(&config.aof, &store).await?;
    let aof = Aof::open(&config.aof, config.appendfsync).await?;
    info!("Appending writes to {}", aof.path().display());

    let listener = TcpListener::bind((config.bind, config.port)).await?;

    info!("Redis server listening on {}", listener.local_addr()?);

    serve(listener, store, aof, config.max_frame_size).await
}

/// Accepts connections on `listener`, one task per client. All clients share `store` and `aof`.
pub async fn serve(
    listener: TcpListener,
    store: Store,
    aof: Aof,
    max_frame_size: usize,
) -> Result<(), Error> {
    let aof = Arc::new(Mutex::new(aof));

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        let aof = aof.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, client_address, store, aof, max_frame_size).await
            {
                error!("Connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, aof, max_frame_size),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    aof: Arc<Mutex<Aof>>,
    max_frame_size: usize,
) -> Result<(), Error> {
    let mut conn = Connection::with_max_frame_size(stream, max_frame_size);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        debug!("Received frame from client: {}", frame);

        if let Some(res) = process(&frame, &store, &aof).await? {
            debug!("Sending response to client: {}", res);
            conn.write_frame(res).await?;
        }
    }

    info!("Connection closed");
    Ok(())
}

/// Runs one request and logs it when it is a successful write.
///
/// Writes hold the log lock from before execution until the entry is appended, so entries land in
/// the file in the order they were applied to the store.
async fn process(request: &Frame, store: &Store, aof: &Mutex<Aof>) -> Result<Option<Frame>, Error> {
    if !dispatch::is_write_request(request) {
        return Ok(dispatch::handle(request, store).map(|res| res.frame));
    }

    let mut aof = aof.lock().await;

    let Some(res) = dispatch::handle(request, store) else {
        return Ok(None);
    };

    if res.should_log {
        aof.append(request).await?;
    }

    Ok(Some(res.frame))
}
