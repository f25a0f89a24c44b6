/*!
# Session

Runs a [`RouteController`] against real collaborators. Effects the controller
asks for (balance reads, profile get-or-create, delayed navigation) are
spawned as tokio tasks; their results come back through a channel and are fed
to the controller one at a time, so gate state is only ever touched from the
session owner.

Switching or clearing the account aborts the previous account's tasks. A
result that was already queued when that happened is still dropped: balance
results carry a read ticket and profile results carry the account epoch.
*/

use crate::{
    dashboard::{load_dashboard, Dashboard},
    error::{SessionError, SessionResult},
};
use nads_central_chain::{BalanceFetcher, ChainReader, ReadConfig};
use nads_central_gate::{
    account_from_provider, BalanceObservation, Effect, GateConfig, GateEvent, GateState,
    GateView, ReadTicket, Route, RouteController, WalletAddress,
};
use nads_central_store::{ensure_profile, update_profile, Backend, Profile, ProfileUpdate, StoreResult};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// Configuration for a session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub gate: GateConfig,
    pub read: ReadConfig,
}

/// Profile of the connected wallet, as far as this session knows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileState {
    Absent,
    Loading,
    Ready(Profile),
    Failed(String),
}

impl ProfileState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            ProfileState::Ready(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Balance reads failed and are no longer retrying
    BalanceReadFailed(String),
    /// The profile could not be loaded, created or saved
    ProfileFailed(String),
}

enum Completion {
    Gate(GateEvent),
    ProfileResolved {
        epoch: u64,
        result: StoreResult<Profile>,
    },
}

pub struct Session {
    controller: RouteController,
    fetcher: BalanceFetcher,
    store: Arc<dyn Backend>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    balance_task: Option<JoinHandle<()>>,
    profile_task: Option<JoinHandle<()>>,
    settle_task: Option<JoinHandle<()>>,
    profile: ProfileState,
    navigations: Vec<Route>,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        store: Arc<dyn Backend>,
        location: Route,
        config: SessionConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller: RouteController::with_config(location, config.gate),
            fetcher: BalanceFetcher::with_config(reader, config.read),
            store,
            tx,
            rx,
            balance_task: None,
            profile_task: None,
            settle_task: None,
            profile: ProfileState::Absent,
            navigations: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> GateView {
        self.controller.view()
    }

    pub fn state(&self) -> GateState {
        self.controller.state()
    }

    pub fn location(&self) -> Route {
        self.controller.location()
    }

    pub fn account(&self) -> Option<&WalletAddress> {
        self.controller.account()
    }

    pub fn profile(&self) -> &ProfileState {
        &self.profile
    }

    /// Navigations performed so far, oldest first
    pub fn navigations(&self) -> &[Route] {
        &self.navigations
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn store(&self) -> &Arc<dyn Backend> {
        &self.store
    }

    pub fn connect(&mut self, address: WalletAddress) {
        self.apply(GateEvent::AccountChanged(Some(address)));
    }

    pub fn disconnect(&mut self) {
        self.apply(GateEvent::AccountChanged(None));
    }

    /// Forward the wallet provider's current account; blank means none
    pub fn provider_account(&mut self, raw: Option<&str>) -> SessionResult<()> {
        let account = account_from_provider(raw)?;
        self.apply(GateEvent::AccountChanged(account));
        Ok(())
    }

    pub fn visit(&mut self, route: Route) {
        self.apply(GateEvent::Visited(route));
    }

    pub fn refresh_balance(&mut self) {
        self.apply(GateEvent::RefreshRequested);
    }

    /// Handle one completed task. Waits while tasks are still running and
    /// returns `false` once nothing is left to wait for.
    pub async fn process_next(&mut self) -> bool {
        let completion = match self.rx.try_recv() {
            Ok(completion) => completion,
            Err(TryRecvError::Disconnected) => return false,
            Err(TryRecvError::Empty) if self.has_running_tasks() => match self.rx.recv().await {
                Some(completion) => completion,
                None => return false,
            },
            // A task may have queued its result right before finishing
            Err(TryRecvError::Empty) => match self.rx.try_recv() {
                Ok(completion) => completion,
                Err(_) => return false,
            },
        };

        self.complete(completion);
        true
    }

    /// Process completions until every task has finished
    pub async fn run_until_idle(&mut self) {
        while self.process_next().await {}
    }

    /// Edit the connected wallet's profile
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> SessionResult<Profile> {
        let id = match &self.profile {
            ProfileState::Ready(profile) => profile.id.clone(),
            _ => return Err(SessionError::NoProfile),
        };

        match update_profile(&*self.store, &id, update).await {
            Ok(updated) => {
                self.profile = ProfileState::Ready(updated.clone());
                Ok(updated)
            }
            Err(e) => {
                warn!("Profile update failed: {}", e);
                self.notices.push(Notice::ProfileFailed(e.to_string()));
                Err(e.into())
            }
        }
    }

    pub async fn dashboard(&self) -> SessionResult<Dashboard> {
        let address = self.controller.account().ok_or(SessionError::NoAccount)?;
        Ok(load_dashboard(&*self.store, address).await)
    }

    fn apply(&mut self, event: GateEvent) {
        for effect in self.controller.handle(event) {
            self.execute(effect);
        }
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Gate(event) => self.apply(event),
            Completion::ProfileResolved { epoch, result } => {
                if epoch != self.controller.epoch() {
                    debug!("Discarding profile result for epoch {}", epoch);
                    return;
                }
                self.profile_task = None;
                self.profile = match result {
                    Ok(profile) => {
                        debug!("Profile {} ready", profile.id);
                        ProfileState::Ready(profile)
                    }
                    Err(e) => {
                        warn!("Profile unavailable: {}", e);
                        self.notices.push(Notice::ProfileFailed(e.to_string()));
                        ProfileState::Failed(e.to_string())
                    }
                };
            }
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::FetchBalance { ticket, owner } => {
                abort(&mut self.balance_task);
                self.balance_task = Some(self.spawn_balance_read(ticket, owner));
            }
            Effect::CancelBalanceFetch => abort(&mut self.balance_task),
            Effect::EnsureProfile { epoch, address } => {
                abort(&mut self.profile_task);
                self.profile = ProfileState::Loading;
                let store = self.store.clone();
                let tx = self.tx.clone();
                self.profile_task = Some(tokio::spawn(async move {
                    let result = ensure_profile(&*store, &address).await;
                    let _ = tx.send(Completion::ProfileResolved { epoch, result });
                }));
            }
            Effect::ClearProfile => {
                abort(&mut self.profile_task);
                self.profile = ProfileState::Absent;
            }
            Effect::ScheduleNavigation { ticket, to, after } => {
                debug!("Navigation to {} scheduled in {:?}", to, after);
                abort(&mut self.settle_task);
                let tx = self.tx.clone();
                self.settle_task = Some(tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Completion::Gate(GateEvent::SettleElapsed(ticket)));
                }));
            }
            Effect::CancelScheduledNavigation => abort(&mut self.settle_task),
            Effect::Navigate(route) => {
                info!("Route is now {}", route);
                self.navigations.push(route);
            }
            Effect::SurfaceReadError { message } => {
                self.notices.push(Notice::BalanceReadFailed(message));
            }
        }
    }

    fn spawn_balance_read(&self, ticket: ReadTicket, owner: WalletAddress) -> JoinHandle<()> {
        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let retry_tx = tx.clone();
            let result = fetcher
                .fetch_with_notify(&owner, |err, _wait: Duration| {
                    let _ = retry_tx.send(Completion::Gate(GateEvent::BalanceObserved {
                        ticket,
                        observation: BalanceObservation::Failed {
                            message: err.to_string(),
                            retrying: true,
                        },
                    }));
                })
                .await;

            let observation = match result {
                Ok(amount) => BalanceObservation::Loaded(amount),
                Err(e) => BalanceObservation::Failed {
                    message: e.to_string(),
                    retrying: false,
                },
            };
            let _ = tx.send(Completion::Gate(GateEvent::BalanceObserved {
                ticket,
                observation,
            }));
        })
    }

    fn has_running_tasks(&self) -> bool {
        [&self.balance_task, &self.profile_task, &self.settle_task]
            .into_iter()
            .flatten()
            .any(|task| !task.is_finished())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        abort(&mut self.balance_task);
        abort(&mut self.profile_task);
        abort(&mut self.settle_task);
    }
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(task) = task.take() {
        task.abort();
    }
}
