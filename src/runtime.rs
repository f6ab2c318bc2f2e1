use crate::SharedNodeManager;
use log::{debug, info};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;

const STATUS_INTERVAL: Duration = Duration::from_secs(30);

/// Handles to the background tasks of the route authority.
pub struct TaskSet {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

/// Spawns the periodic route-update task and the status task. The first
/// recomputation happens immediately, then once per `update_interval`.
pub fn start_tasks(manager: SharedNodeManager, update_interval: Duration) -> TaskSet {
    let (shutdown_tx, _) = broadcast::channel(1);

    let handles = vec![
        start_route_update_task(manager.clone(), update_interval, shutdown_tx.subscribe()),
        start_status_task(manager, shutdown_tx.subscribe()),
    ];

    info!("routing tasks started");
    TaskSet {
        shutdown_tx,
        handles,
    }
}

fn start_route_update_task(
    manager: SharedNodeManager,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(period);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("route update task shutting down");
                    break;
                }
                _ = timer.tick() => {
                    manager.write().await.recalculate_routes();
                }
            }
        }
    })
}

fn start_status_task(
    manager: SharedNodeManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(STATUS_INTERVAL);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("status task shutting down");
                    break;
                }
                _ = timer.tick() => {
                    let manager = manager.read().await;
                    info!(
                        "status: {} active nodes, {} routes",
                        manager.registry().len(),
                        manager.routing_table().len()
                    );
                }
            }
        }
    })
}

impl TaskSet {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
