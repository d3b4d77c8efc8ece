//! Shared test helpers for sourcing tests.

#![allow(dead_code)]

use std::error::Error;
use std::sync::Mutex;
use std::time::Duration;

use strapi_client::{RemoteFileFetcher, Reporter, StrapiClient, StrapiConfig};
use strapi_source::{MemoryCache, MemoryGraph, SourceContext};
use tracing_subscriber::EnvFilter;

/// Reporter that records every call.
#[derive(Default)]
pub struct RecordingReporter {
    infos: Mutex<Vec<String>>,
    panics: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn panics(&self) -> Vec<String> {
        self.panics.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn panic(&self, message: &str, error: &(dyn Error + 'static)) {
        self.panics
            .lock()
            .unwrap()
            .push(format!("{message}: {error}"));
    }
}

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn memory_graph() -> MemoryGraph {
    MemoryGraph::new(RemoteFileFetcher::new(Duration::from_secs(5)).unwrap())
}

/// Client, in-memory cache and graph, and a recording reporter.
pub struct Harness {
    pub client: StrapiClient,
    pub cache: MemoryCache,
    pub graph: MemoryGraph,
    pub reporter: RecordingReporter,
}

impl Harness {
    pub fn new(api_url: &str) -> Self {
        Self::with_config(StrapiConfig::new(api_url))
    }

    pub fn with_config(config: StrapiConfig) -> Self {
        init_tracing();
        Self {
            client: StrapiClient::new(config).unwrap(),
            cache: MemoryCache::new(),
            graph: memory_graph(),
            reporter: RecordingReporter::default(),
        }
    }

    pub fn ctx(&self) -> SourceContext<'_> {
        SourceContext::new(&self.client, &self.cache, &self.graph, &self.reporter)
    }
}
