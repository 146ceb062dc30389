//! Shared test doubles

#![allow(dead_code)]

use nfapi_core::driver::{DriverHost, DriverPaths};
use nfapi_core::{DialOption, DriverManager, Redirector};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Call observed by [`RecordingRedirector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register(String),
    Unregister(String),
    Dial(DialOption, String),
    Init,
    InitHttp,
    Free,
}

/// Holds `init` until the test opens it
#[derive(Default)]
pub struct InitGate {
    open: Mutex<bool>,
    opened: Condvar,
    entered: AtomicUsize,
}

impl InitGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }

    /// Number of init calls that reached the gate
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    /// Wait (async) until an init call is parked at the gate
    pub async fn wait_entered(&self) {
        while self.entered() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }

    fn pass(&self) {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
    }
}

/// Redirector double that records every call in order
pub struct RecordingRedirector {
    calls: Mutex<Vec<Call>>,
    rejected: HashSet<String>,
    init_result: bool,
    register_result: bool,
    init_gate: Option<Arc<InitGate>>,
}

impl Default for RecordingRedirector {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rejected: HashSet::new(),
            init_result: true,
            register_result: true,
            init_gate: None,
        }
    }
}

impl RecordingRedirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject add/bypass dials for these patterns
    pub fn rejecting(mut self, rules: &[&str]) -> Self {
        self.rejected = rules.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_init_result(mut self, ok: bool) -> Self {
        self.init_result = ok;
        self
    }

    /// Block `init`/`init_http` on `gate`
    pub fn with_init_gate(mut self, gate: Arc<InitGate>) -> Self {
        self.init_gate = Some(gate);
        self
    }

    pub fn with_register_result(mut self, ok: bool) -> Self {
        self.register_result = ok;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn dials(&self) -> Vec<(DialOption, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Dial(option, value) => Some((option, value)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, option: DialOption) -> usize {
        self.dials().iter().filter(|(o, _)| *o == option).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }
}

impl Redirector for RecordingRedirector {
    fn register(&self, name: &str) -> bool {
        self.calls.lock().push(Call::Register(name.to_string()));
        self.register_result
    }

    fn unregister(&self, name: &str) -> bool {
        self.calls.lock().push(Call::Unregister(name.to_string()));
        true
    }

    fn dial(&self, option: DialOption, value: &str) -> bool {
        self.calls.lock().push(Call::Dial(option, value.to_string()));
        let is_rule = matches!(option, DialOption::AddName | DialOption::BypassName);
        !(is_rule && self.rejected.contains(value))
    }

    fn init(&self) -> bool {
        self.calls.lock().push(Call::Init);
        if let Some(gate) = &self.init_gate {
            gate.pass();
        }
        self.init_result
    }

    fn init_http(&self) -> bool {
        self.calls.lock().push(Call::InitHttp);
        if let Some(gate) = &self.init_gate {
            gate.pass();
        }
        self.init_result
    }

    fn free(&self) -> bool {
        self.calls.lock().push(Call::Free);
        true
    }

    fn uploaded(&self) -> u64 {
        1024
    }

    fn downloaded(&self) -> u64 {
        4096
    }
}

/// In-memory file system and service manager
#[derive(Default)]
pub struct MemoryHost {
    files: Mutex<HashMap<PathBuf, Option<String>>>,
    pub copies: AtomicUsize,
    pub removals: AtomicUsize,
    pub service_stops: AtomicUsize,
}

impl MemoryHost {
    /// Add a file with an optional version resource
    pub fn with_file(self, path: impl Into<PathBuf>, version: Option<&str>) -> Self {
        self.files
            .lock()
            .insert(path.into(), version.map(str::to_string));
        self
    }

    pub fn version_of(&self, path: &Path) -> Option<String> {
        self.files.lock().get(path).cloned().flatten()
    }
}

impl DriverHost for MemoryHost {
    fn file_version(&self, path: &Path) -> Option<String> {
        self.version_of(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut files = self.files.lock();
        let version = files
            .get(from)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "source missing"))?;
        files.insert(to.to_path_buf(), version);
        self.copies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .lock()
            .remove(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not found"))?;
        self.removals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_service(&self, _name: &str) -> io::Result<()> {
        self.service_stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Lets a test keep inspecting the host after handing it to a manager
pub struct SharedHost(pub Arc<MemoryHost>);

impl DriverHost for SharedHost {
    fn file_version(&self, path: &Path) -> Option<String> {
        self.0.file_version(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.0.exists(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.0.copy_file(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.0.remove_file(path)
    }

    fn stop_service(&self, name: &str) -> io::Result<()> {
        self.0.stop_service(name)
    }
}

pub const BUNDLED: &str = "bin/nfdriver.sys";
pub const SYSTEM_DIR: &str = "C:/Windows/System32";

pub fn paths() -> DriverPaths {
    DriverPaths::for_system_dir(SYSTEM_DIR).with_bundled(BUNDLED)
}

pub fn system_driver() -> PathBuf {
    paths().system
}

/// Host with bundled and installed drivers at the given versions
pub fn host_with(bundled: Option<&str>, installed: Option<Option<&str>>) -> Arc<MemoryHost> {
    let mut host = MemoryHost::default();
    if let Some(version) = bundled {
        host = host.with_file(BUNDLED, Some(version));
    }
    if let Some(version) = installed {
        host = host.with_file(system_driver(), version);
    }
    Arc::new(host)
}

pub fn manager(host: &Arc<MemoryHost>) -> DriverManager {
    DriverManager::new(Box::new(SharedHost(Arc::clone(host))), paths())
}
