#![allow(dead_code)]

use brrtdispatch::handler::{HandlerProvider, SharedHandler};
use brrtdispatch::interceptor::{
    ApplicationChain, ApplicationInterceptor, NetworkChain, NetworkInterceptor,
};
use brrtdispatch::server::{Reply, Request, Response};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Handler replying with its arguments as a JSON array
pub fn echo() -> Arc<dyn HandlerProvider> {
    Arc::new(SharedHandler::new(|args: Vec<Value>| -> anyhow::Result<Reply> {
        Ok(Reply::Value(Value::Array(args)))
    }))
}

/// Shared, ordered record of which links ran
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Handler that records its invocation before echoing
pub fn journaled_echo(journal: &Journal) -> Arc<dyn HandlerProvider> {
    let journal = journal.clone();
    Arc::new(SharedHandler::new(move |args: Vec<Value>| -> anyhow::Result<Reply> {
        journal.push("handler");
        Ok(Reply::Value(Value::Array(args)))
    }))
}

/// Network interceptor that records itself; optionally answers without
/// proceeding
pub struct RecordingNetwork {
    pub label: &'static str,
    pub journal: Journal,
    pub short_circuit: Option<u16>,
}

impl RecordingNetwork {
    pub fn new(label: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            label,
            journal: journal.clone(),
            short_circuit: None,
        })
    }

    pub fn answering(label: &'static str, journal: &Journal, status: u16) -> Arc<Self> {
        Arc::new(Self {
            label,
            journal: journal.clone(),
            short_circuit: Some(status),
        })
    }
}

impl NetworkInterceptor for RecordingNetwork {
    fn name(&self) -> &str {
        self.label
    }

    fn intercept(&self, request: Request, chain: NetworkChain<'_>) -> anyhow::Result<Response> {
        self.journal.push(format!("{}:{}", self.label, chain.remaining()));
        match self.short_circuit {
            Some(status) => Ok(Response::empty(status)),
            None => chain.proceed(request),
        }
    }
}

/// Application interceptor that records itself; optionally answers without
/// proceeding
pub struct RecordingApplication {
    pub label: &'static str,
    pub journal: Journal,
    pub short_circuit: Option<Value>,
}

impl RecordingApplication {
    pub fn new(label: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            label,
            journal: journal.clone(),
            short_circuit: None,
        })
    }

    pub fn answering(label: &'static str, journal: &Journal, value: Value) -> Arc<Self> {
        Arc::new(Self {
            label,
            journal: journal.clone(),
            short_circuit: Some(value),
        })
    }
}

impl ApplicationInterceptor for RecordingApplication {
    fn name(&self) -> &str {
        self.label
    }

    fn intercept(&self, chain: ApplicationChain<'_>) -> anyhow::Result<Reply> {
        self.journal
            .push(format!("{}:{}", self.label, chain.args().len()));
        match &self.short_circuit {
            Some(value) => Ok(Reply::Value(value.clone())),
            None => chain.proceed(),
        }
    }
}

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a temp file with the given extension
    pub fn create_temp_manifest(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtd_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "json")
    }
}
