//! In-process murmur instance for end-to-end tests

use std::net::SocketAddr;

use murmur_config::Config;
use murmur_server::Server;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const TRANSCRIPTIONS: &str = "/v1/audio/transcriptions";

/// murmur serving on an ephemeral loopback port until dropped
pub struct TestServer {
    base_url: String,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Serve `config` on its listen address, port 0 meaning any free port
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let router = Server::new(&config)?.into_router();
        let requested = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 0)));

        let listener = TcpListener::bind(requested).await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let shutdown = CancellationToken::new();
        let stopped = shutdown.clone().cancelled_owned();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).with_graceful_shutdown(stopped).await;
        });

        Ok(Self {
            base_url,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    /// Absolute URL for `path` on this instance
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST a JSON body to the transcription endpoint
    pub async fn transcribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(TRANSCRIPTIONS))
            .json(body)
            .send()
            .await
            .expect("request reaches test server")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
