use tokio::sync::watch;

/// Cooperative shutdown flag. The worker checks a listener between steps and
/// races it against its sleeps; in-flight sends are never interrupted.
#[derive(Clone)]
pub struct Shutdown {
    flag: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag }
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            flag: self.flag.subscribe(),
        }
    }

    pub fn trigger(&self) {
        let _ = self.flag.send(true);
    }

    /// Wires CTRL+C (and SIGTERM on unix) to the flag.
    pub fn listen_for_signals(&self) {
        let on_ctrlc = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_ctrlc.trigger();
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let on_term = self.clone();
            tokio::spawn(async move {
                if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                    sigterm.recv().await;
                    on_term.trigger();
                }
            });
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct ShutdownListener {
    flag: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn is_shutdown(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once shutdown is requested; immediately if it already was.
    pub async fn wait(&mut self) {
        if *self.flag.borrow() {
            return;
        }
        let _ = self.flag.changed().await;
    }
}
