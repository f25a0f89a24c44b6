/*!
# Supervisor

Catches faults in a unit of work (an `Err` or a panic) and substitutes a
fallback with two ways out: retry the same unit, or go back to the landing
route. One supervisor wraps the whole application; a second one wraps the
wallet-dependent work so a chain or wallet fault does not take everything
down with it.
*/

use crate::route::Route;
use futures::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryScope {
    Application,
    Wallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackAction {
    Retry,
    ReturnToLanding,
}

/// What to show in place of the faulted unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub scope: BoundaryScope,
    pub title: &'static str,
    pub message: &'static str,
    /// The captured fault, for diagnostics
    pub detail: String,
    pub actions: [FallbackAction; 2],
}

#[derive(Debug)]
pub enum Rendered<T> {
    View(T),
    Fallback(Fallback),
}

impl<T> Rendered<T> {
    pub fn into_view(self) -> Option<T> {
        match self {
            Rendered::View(view) => Some(view),
            Rendered::Fallback(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct Supervisor {
    scope: BoundaryScope,
    fault: Option<String>,
    faults_seen: u32,
}

impl Supervisor {
    pub fn application() -> Self {
        Self::new(BoundaryScope::Application)
    }

    pub fn wallet() -> Self {
        Self::new(BoundaryScope::Wallet)
    }

    pub fn new(scope: BoundaryScope) -> Self {
        Self {
            scope,
            fault: None,
            faults_seen: 0,
        }
    }

    pub fn scope(&self) -> BoundaryScope {
        self.scope
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Total faults caught over this supervisor's lifetime
    pub fn faults_seen(&self) -> u32 {
        self.faults_seen
    }

    /// Run a unit of work unless a fault is being shown
    pub fn run<T, E, F>(&mut self, work: F) -> Rendered<T>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(fallback) = self.fallback() {
            return Rendered::Fallback(fallback);
        }
        match catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(view)) => Rendered::View(view),
            Ok(Err(err)) => self.record(err.to_string()),
            Err(panic) => self.record(panic_message(panic.as_ref())),
        }
    }

    /// Async variant of [`run`](Self::run)
    pub async fn run_async<T, E, Fut>(&mut self, work: Fut) -> Rendered<T>
    where
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(fallback) = self.fallback() {
            return Rendered::Fallback(fallback);
        }
        match AssertUnwindSafe(work).catch_unwind().await {
            Ok(Ok(view)) => Rendered::View(view),
            Ok(Err(err)) => self.record(err.to_string()),
            Err(panic) => self.record(panic_message(panic.as_ref())),
        }
    }

    /// Clear the fault so the next `run` executes again
    pub fn retry(&mut self) {
        if self.fault.take().is_some() {
            info!("{:?} supervisor retrying", self.scope);
        }
    }

    /// Clear the fault and hand back the route to navigate to
    pub fn return_to_landing(&mut self) -> Route {
        self.fault = None;
        Route::Landing
    }

    pub fn fallback(&self) -> Option<Fallback> {
        self.fault.as_deref().map(|detail| self.fallback_for(detail))
    }

    fn fallback_for(&self, detail: &str) -> Fallback {
        let (title, message) = match self.scope {
            BoundaryScope::Application => (
                "System Malfunction",
                "The gateway has encountered an unexpected error. Please try again or return to the main portal.",
            ),
            BoundaryScope::Wallet => (
                "Web3 Connection Error",
                "There was a problem connecting to the blockchain or wallet. Please check your network and try again.",
            ),
        };
        Fallback {
            scope: self.scope,
            title,
            message,
            detail: detail.to_string(),
            actions: [FallbackAction::Retry, FallbackAction::ReturnToLanding],
        }
    }

    fn record<T>(&mut self, detail: String) -> Rendered<T> {
        error!("{:?} supervisor caught a fault: {}", self.scope, detail);
        let fallback = self.fallback_for(&detail);
        self.fault = Some(detail);
        self.faults_seen += 1;
        Rendered::Fallback(fallback)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
