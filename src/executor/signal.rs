//! Operator shutdown signals
//!
//! Runners live in their own process groups, so terminal signals never reach
//! them directly. The driver listens for SIGINT, SIGTERM and SIGHUP instead
//! and tears the running group down itself.

use std::fmt;

/// Signal that asked the run to stop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Hangup => "SIGHUP",
        };
        f.write_str(name)
    }
}

#[cfg(unix)]
mod imp {
    use super::ShutdownSignal;
    use std::io;
    use tokio::signal::unix::{signal, Signal, SignalKind};

    /// Registered handlers; the default action of each signal is replaced
    /// from construction on.
    #[derive(Debug)]
    pub struct Signals {
        sigint: Signal,
        sigterm: Signal,
        sighup: Signal,
    }

    impl Signals {
        pub fn new() -> io::Result<Self> {
            Ok(Self {
                sigint: signal(SignalKind::interrupt())?,
                sigterm: signal(SignalKind::terminate())?,
                sighup: signal(SignalKind::hangup())?,
            })
        }

        /// Next shutdown signal; `None` once every stream has closed
        pub async fn recv(&mut self) -> Option<ShutdownSignal> {
            tokio::select! {
                Some(()) = self.sigint.recv() => Some(ShutdownSignal::Interrupt),
                Some(()) = self.sigterm.recv() => Some(ShutdownSignal::Terminate),
                Some(()) = self.sighup.recv() => Some(ShutdownSignal::Hangup),
                else => None,
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use super::ShutdownSignal;
    use std::io;

    #[derive(Debug)]
    pub struct Signals;

    impl Signals {
        pub fn new() -> io::Result<Self> {
            Ok(Self)
        }

        pub async fn recv(&mut self) -> Option<ShutdownSignal> {
            tokio::signal::ctrl_c()
                .await
                .ok()
                .map(|()| ShutdownSignal::Interrupt)
        }
    }
}

pub use imp::Signals;
