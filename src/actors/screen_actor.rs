use tokio::spawn;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::engine::{apply, DerivedView};
use crate::models::{FilterSpec, SortSpec};
use crate::storage::{RecordStore, Snapshot, SnapshotSubscription};

/// User-driven requests for a screen's view.
#[derive(Debug, Clone)]
pub enum ScreenCommand {
    SetFilter(FilterSpec),
    SetSort(SortSpec),
    /// Back to the unfiltered set; the sort order is kept.
    ClearFilters
}

/// One filter/sort/aggregate pipeline per screen.
///
/// Store snapshots and commands are handled by a single task, one at a time,
/// so the cached record set and the derived view are never touched
/// concurrently. Every step ends by publishing a fresh [`DerivedView`].
pub struct ScreenActor {
    sender: mpsc::UnboundedSender<ScreenCommand>,
    views: watch::Receiver<DerivedView>,
    handle: JoinHandle<DerivedView>
}

impl ScreenActor {
    /// Subscribes to `store` and spawns the screen task.
    pub fn new<S: RecordStore>(store: &S) -> Self {
        let subscription = store.observe_all();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (view_sender, views) = watch::channel(DerivedView::default());

        let handle = spawn(run(subscription, receiver, view_sender));

        Self {
            sender,
            views,
            handle
        }
    }

    /// Queues a command, returning `false` if the task is no longer running.
    pub fn accept(&self, command: ScreenCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    pub fn views(&self) -> watch::Receiver<DerivedView> {
        self.views.clone()
    }

    pub fn current(&self) -> DerivedView {
        self.views.borrow().clone()
    }

    /// Stops accepting commands, waits for the queued ones and returns the final view.
    pub async fn despawn(self) -> Result<DerivedView, JoinError> {
        drop(self.sender);
        self.handle.await
    }
}

struct ScreenState {
    all_records: Snapshot,
    filter: FilterSpec,
    sort: SortSpec
}

impl ScreenState {
    fn handle(&mut self, command: ScreenCommand) {
        debug!("Screen command [{command:?}] processed");

        match command {
            ScreenCommand::SetFilter(filter) => self.filter = filter,
            ScreenCommand::SetSort(sort) => self.sort = sort,
            ScreenCommand::ClearFilters => self.filter = FilterSpec::None
        }
    }

    fn recompute(&self) -> DerivedView {
        let view = apply(&self.all_records, &self.filter, self.sort);
        debug!("Screen view recomputed: [{}] of [{}] records", view.records.len(), self.all_records.len());
        view
    }
}

async fn run(
    mut subscription: SnapshotSubscription,
    mut commands: mpsc::UnboundedReceiver<ScreenCommand>,
    views: watch::Sender<DerivedView>
) -> DerivedView {
    let mut state = ScreenState {
        all_records: subscription.current(),
        filter: FilterSpec::None,
        sort: SortSpec::Unsorted
    };
    let mut store_open = true;

    views.send_replace(state.recompute());

    loop {
        select! {
            biased;

            snapshot = subscription.changed(), if store_open => match snapshot {
                Some(snapshot) => state.all_records = snapshot,
                None => {
                    debug!("Record store closed, screen keeps its last snapshot");
                    store_open = false;
                    continue;
                }
            },
            command = commands.recv() => match command {
                Some(command) => state.handle(command),
                None => break
            }
        }

        views.send_replace(state.recompute());
    }

    views.borrow().clone()
}
