pub mod http;
pub mod memory;
pub mod service;

use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::{PlannerConfig, Theme};
use crate::message::{Effect, Message, Mutation};
use crate::planner::Planner;
use service::PlannerService;

/// Runs a [`Planner`] against a [`PlannerService`].
///
/// Remote calls are polled concurrently on the caller's task; each one
/// resolves to a [`Message`] that is fed back through [`Planner::update`].
pub struct SyncController {
    planner: Planner,
    service: Arc<dyn PlannerService>,
    pending: FuturesUnordered<BoxFuture<'static, Message>>,
    config: Option<(PlannerConfig, PathBuf)>,
}

impl SyncController {
    pub fn new(service: Arc<dyn PlannerService>, planner: Planner) -> Self {
        Self {
            planner,
            service,
            pending: FuturesUnordered::new(),
            config: None,
        }
    }

    /// Theme changes are written back to `path`.
    pub fn with_config(mut self, config: PlannerConfig, path: PathBuf) -> Self {
        self.config = Some((config, path));
        self
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Number of remote calls not yet resolved.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Issue the initial month and day loads.
    pub fn start(&mut self) {
        let effects = self.planner.start();
        self.run(effects);
    }

    pub fn dispatch(&mut self, message: Message) {
        let effects = self.planner.update(message);
        self.run(effects);
    }

    /// Apply the next remote result. Returns `false` when nothing is in flight.
    pub async fn step(&mut self) -> bool {
        match self.pending.next().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Apply results, including the reloads they trigger, until idle.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        let service = Arc::clone(&self.service);
        let task = match effect {
            Effect::LoadMonth { seq, month } => async move {
                let result = service.get_month_data(month.year(), month.month()).await;
                Message::MonthLoaded { seq, month, result }
            }
            .boxed(),
            Effect::LoadDay { seq, date } => async move {
                let result = service.get_day_data(date).await;
                Message::DayLoaded { seq, date, result }
            }
            .boxed(),
            Effect::AddNote { date, content } => async move {
                let result = service.add_note(date, &content).await;
                Message::MutationFinished {
                    mutation: Mutation::AddNote,
                    date,
                    result,
                }
            }
            .boxed(),
            Effect::CompleteNote { date, note_id } => async move {
                let result = service.complete_note(date, &note_id).await;
                Message::MutationFinished {
                    mutation: Mutation::CompleteNote,
                    date,
                    result,
                }
            }
            .boxed(),
            Effect::FetchOnThisDay { date } => async move {
                let result = service.fetch_and_store_on_this_day(date).await;
                Message::MutationFinished {
                    mutation: Mutation::FetchOnThisDay,
                    date,
                    result,
                }
            }
            .boxed(),
            Effect::PersistTheme(theme) => {
                self.persist_theme(theme);
                return;
            }
        };
        self.pending.push(task);
    }

    fn persist_theme(&mut self, theme: Theme) {
        let Some((config, path)) = self.config.as_mut() else {
            return;
        };
        config.theme = theme;
        if let Err(e) = config.save(path) {
            log::error!("Failed to save theme: {}", e);
        }
    }
}
