//! Single dedicated signal-handling thread (§4.10/C10). A handler registry
//! keyed by signal number, each entry a callable plus its program context;
//! on receipt of a signal the bridge thread looks the entry up and invokes
//! the callable in that context.
//!
//! Not grounded in the teacher repo (it has no process-signal handling) —
//! `signal-hook`'s iterator API is the standard ecosystem way to bridge OS
//! signals into ordinary Rust code, so it's adopted here the same way the
//! rest of the pack reaches for a dedicated crate where the teacher has
//! nothing to imitate.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use signal_hook::iterator::{Handle, Signals};

use strand_value::Callable;

#[derive(Debug)]
pub enum SignalError {
    Io(std::io::Error),
    AlreadyRunning,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::Io(e) => write!(f, "SIGNAL-BRIDGE-ERROR: {}", e),
            SignalError::AlreadyRunning => write!(f, "SIGNAL-BRIDGE-ERROR: bridge thread already started"),
        }
    }
}
impl std::error::Error for SignalError {}

impl From<std::io::Error> for SignalError {
    fn from(e: std::io::Error) -> Self {
        SignalError::Io(e)
    }
}

/// One installed handler: the callable to invoke plus a per-signal mutex
/// that installation waits on, so at most one handler body runs at a time
/// for a given signal (§4.10).
struct Handler {
    callable: Arc<dyn Callable>,
}

#[derive(Default)]
struct Registry {
    handlers: HashMap<i32, Arc<Mutex<Handler>>>,
}

pub struct SignalBridge {
    registry: Mutex<Registry>,
    shutdown: Arc<AtomicBool>,
    handle: Mutex<Option<Handle>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl SignalBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(SignalBridge {
            registry: Mutex::new(Registry::default()),
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
            thread: Mutex::new(None),
        })
    }

    /// Installs `callable` for `signum`, replacing any prior handler.
    /// Waits for an in-flight invocation of the previous handler (if any)
    /// to finish before swapping it out.
    pub fn install(&self, signum: i32, callable: Arc<dyn Callable>) {
        let mut registry = self.registry.lock();
        if let Some(previous) = registry.handlers.get(&signum) {
            let _wait_for_in_flight = previous.lock();
        }
        registry.handlers.insert(signum, Arc::new(Mutex::new(Handler { callable })));
    }

    /// Removes the handler for `signum`; the signal is no longer dispatched
    /// by the bridge once this returns.
    pub fn remove(&self, signum: i32) {
        let mut registry = self.registry.lock();
        if let Some(previous) = registry.handlers.remove(&signum) {
            let _wait_for_in_flight = previous.lock();
        }
    }

    pub fn is_installed(&self, signum: i32) -> bool {
        self.registry.lock().handlers.contains_key(&signum)
    }

    /// Starts the bridge thread watching `watched` signals. Re-running this
    /// on an already-started bridge is an error — reinstalling the handler
    /// mask for a live bridge goes through `reload` instead.
    pub fn start(self: &Arc<Self>, watched: &[i32]) -> Result<(), SignalError> {
        if self.thread.lock().is_some() {
            return Err(SignalError::AlreadyRunning);
        }
        let mut signals = Signals::new(watched)?;
        *self.handle.lock() = Some(signals.handle());

        let bridge = self.clone();
        let join = std::thread::Builder::new()
            .name("strand-signal-bridge".to_string())
            .spawn(move || {
                for signum in &mut signals {
                    if bridge.shutdown.load(Ordering::Acquire) {
                        break;
                    }
                    let entry = bridge.registry.lock().handlers.get(&signum).cloned();
                    if let Some(entry) = entry {
                        let handler = entry.lock();
                        let _ = handler.callable.invoke(Vec::new());
                    }
                }
            })
            .map_err(SignalError::Io)?;
        *self.thread.lock() = Some(join);
        Ok(())
    }

    /// Adds signals to the currently-watched set on the live registration
    /// (§4.10: "a reload command causes the thread to refresh the OS-level
    /// mask"). `signal-hook`'s `Handle` only supports adding signals to a
    /// running registration, not removing them, so this is additive-only.
    pub fn reload(&self, additional: &[i32]) -> Result<(), SignalError> {
        let handle = self.handle.lock();
        if let Some(handle) = handle.as_ref() {
            for &signum in additional {
                handle.add_signal(signum)?;
            }
        }
        Ok(())
    }

    /// Terminates the bridge thread (§4.10: "an exit command terminates
    /// it").
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.lock().take() {
            handle.close();
        }
        if let Some(join) = self.thread.lock().take() {
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_value::{ExceptionCore, ProgramContext, Value};

    struct TestProgram;
    impl ProgramContext for TestProgram {
        fn program_id(&self) -> u64 {
            1
        }
    }

    struct CountingHandler {
        count: Arc<std::sync::atomic::AtomicUsize>,
        program: Arc<dyn ProgramContext>,
    }
    impl Callable for CountingHandler {
        fn invoke(&self, _args: Vec<Value>) -> Result<Value, ExceptionCore> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Nothing)
        }
        fn program_context(&self) -> Arc<dyn ProgramContext> {
            self.program.clone()
        }
        fn name(&self) -> &str {
            "signal-handler"
        }
    }

    #[test]
    fn install_then_remove_tracks_presence() {
        let bridge = SignalBridge::new();
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let handler: Arc<dyn Callable> = Arc::new(CountingHandler { count, program });
        bridge.install(signal_hook::consts::SIGUSR1, handler);
        assert!(bridge.is_installed(signal_hook::consts::SIGUSR1));
        bridge.remove(signal_hook::consts::SIGUSR1);
        assert!(!bridge.is_installed(signal_hook::consts::SIGUSR1));
    }

    #[test]
    fn installing_over_an_existing_handler_replaces_it() {
        let bridge = SignalBridge::new();
        let count_a = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let handler_a: Arc<dyn Callable> = Arc::new(CountingHandler { count: count_a, program: program.clone() });
        bridge.install(signal_hook::consts::SIGUSR2, handler_a);
        let count_b = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let handler_b: Arc<dyn Callable> = Arc::new(CountingHandler { count: count_b.clone(), program });
        bridge.install(signal_hook::consts::SIGUSR2, handler_b);
        let entry = bridge.registry.lock().handlers.get(&signal_hook::consts::SIGUSR2).cloned().unwrap();
        entry.lock().callable.invoke(Vec::new()).unwrap();
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_twice_is_rejected() {
        let bridge = SignalBridge::new();
        bridge.start(&[signal_hook::consts::SIGUSR1]).unwrap();
        assert!(matches!(bridge.start(&[signal_hook::consts::SIGUSR1]), Err(SignalError::AlreadyRunning)));
        bridge.shutdown();
    }
}
