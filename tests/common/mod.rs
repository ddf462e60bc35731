//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::fs;
use std::net::TcpListener as StdTcpListener;
use std::path::PathBuf;
use std::thread;

use tempfile::{tempdir, TempDir};

use tokserve::config::Config;
use tokserve::{HttpServer, RequestRouter, Service};

pub const BOS: u32 = 0;
pub const EOS: u32 = 1;
pub const USER_OPEN: u32 = 3;
pub const USER_CLOSE: u32 = 4;
pub const ASSISTANT: u32 = 5;
pub const IMAGE: u32 = 6;
pub const HELLO: u32 = 7;
pub const WORLD: u32 = 8;
pub const VOCAB_SIZE: u32 = 9;

const TOKENIZER_JSON: &str = include_str!("../fixtures/tokenizer.json");

const TOKENIZER_CONFIG_JSON: &str = include_str!("../fixtures/tokenizer_config.json");

const TEMPLATE_JSON: &str = include_str!("../fixtures/template.json");

/// Tokenizer artifact and template file in a temporary directory
pub struct Fixture {
    pub dir: TempDir,
    pub template: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tokenizer.json"), TOKENIZER_JSON).unwrap();
        fs::write(dir.path().join("tokenizer_config.json"), TOKENIZER_CONFIG_JSON).unwrap();

        let template = dir.path().join("template.json");
        fs::write(&template, TEMPLATE_JSON).unwrap();

        Self { dir, template }
    }

    /// Config serving this fixture with the chat template
    pub fn config(&self) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            tokenizer: self.dir.path().display().to_string(),
            template_file: Some(self.template.clone()),
            ..Default::default()
        }
    }
}

/// A server running on an ephemeral port for the lifetime of the test process
pub struct TestServer {
    pub base_url: String,
    _fixture: Fixture,
}

impl TestServer {
    pub fn start() -> Self {
        let fixture = Fixture::new();
        let config = fixture.config();
        Self::start_with(fixture, config)
    }

    pub fn start_with(fixture: Fixture, config: Config) -> Self {
        Self::start_with_router(fixture, config, |_| {})
    }

    /// Like [`TestServer::start_with`], with extra routes registered before serving
    pub fn start_with_router<F>(fixture: Fixture, config: Config, customize: F) -> Self
    where
        F: FnOnce(&mut RequestRouter),
    {
        let service = Service::load(config).unwrap();
        let mut router = service.router();
        customize(&mut router);
        let server = HttpServer::new(router, service.config().read_timeout);

        // Bound before the thread starts, so early connections just queue
        let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        listener.set_nonblocking(true).unwrap();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                server
                    .serve(listener, std::future::pending())
                    .await
                    .unwrap();
            });
        });

        Self {
            base_url: format!("http://{}", addr),
            _fixture: fixture,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn addr(&self) -> &str {
        self.base_url.trim_start_matches("http://")
    }
}
