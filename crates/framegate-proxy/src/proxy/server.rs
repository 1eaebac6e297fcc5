//! ProxyServer struct and main run loop.
//!
//! One listener serves both surfaces: requests under the mount path go to the
//! dispatcher, everything else to the admin API.

use super::client::create_http_client;
use super::dispatcher::{mount_sub_path, ProxyDispatcher};
use super::forwarding::Forwarder;
use super::network::create_listener;
use crate::admin_api::AdminApi;
use crate::config::Config;
use crate::target::TargetStore;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// The main proxy server struct.
pub struct ProxyServer {
    config: Arc<Config>,
    dispatcher: ProxyDispatcher,
    admin: AdminApi,
}

impl ProxyServer {
    /// Create a new ProxyServer from configuration and an initialised target store.
    pub fn new(config: Config, targets: Arc<TargetStore>) -> Result<Self, anyhow::Error> {
        let client = create_http_client(&config)?;
        let dispatcher = ProxyDispatcher::new(Arc::clone(&targets), Forwarder::new(client));
        let admin = AdminApi::new(targets, config.cors.allow_origin.clone());

        Ok(Self {
            config: Arc::new(config),
            dispatcher,
            admin,
        })
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.config.listen_addr()?;
        let listener = create_listener(addr)?;
        self.serve_with_shutdown(listener, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    ///
    /// In-flight connections are left to finish on their own tasks.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!("Listening on http://{}", local_addr);
        info!("Proxy mounted at http://{}/app", local_addr);

        let server = Arc::new(self);
        tokio::pin!(shutdown);

        loop {
            let (stream, remote_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => break,
            };
            let server = Arc::clone(&server);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move { Ok::<_, Infallible>(server.route(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }

        info!("Server stopped");
        Ok(())
    }

    /// Send a request to the dispatcher or the admin API by path.
    pub async fn route<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        if mount_sub_path(req.uri().path()).is_some() {
            self.dispatcher.handle(req).await
        } else {
            self.admin.handle(req).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::NoOpPersistence;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn server() -> ProxyServer {
        ProxyServer::new(
            Config::default(),
            Arc::new(TargetStore::new(Arc::new(NoOpPersistence))),
        )
        .unwrap()
    }

    fn get(path: &str) -> Request<Full<Bytes>> {
        Request::get(path).body(Full::new(Bytes::new())).unwrap()
    }

    #[tokio::test]
    async fn test_mount_routes_to_dispatcher() {
        let response = server().route(get("/app/anything")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("No app configured"));
    }

    #[tokio::test]
    async fn test_other_paths_route_to_admin() {
        assert_eq!(server().route(get("/health")).await.status(), StatusCode::OK);
        assert_eq!(server().route(get("/apple")).await.status(), StatusCode::NOT_FOUND);
    }
}
