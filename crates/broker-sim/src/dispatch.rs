use kiwi_ports::TrDataEvent;
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::control::SimState;
use crate::model::ScriptedRecord;

/// One event raised on the dispatch thread
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Msg {
        screen: String,
        issuing_name: String,
        tr_code: String,
        text: String,
    },
    TrData {
        event: TrDataEvent,
        record: ScriptedRecord,
    },
    Chejan {
        gubun: String,
        item_count: i32,
        fid_list: String,
    },
}

#[derive(Debug)]
pub(crate) enum Dispatch {
    /// Raise the notifications in order once `delay` has elapsed
    Deliver {
        delay: Duration,
        notifications: Vec<Notification>,
    },
    Shutdown,
}

/// Drain the queue one batch at a time; batches never overlap
pub(crate) async fn run(state: Arc<SimState>, mut rx: UnboundedReceiver<Dispatch>) {
    info!("Simulated dispatch loop started");

    while let Some(command) = rx.recv().await {
        match command {
            Dispatch::Deliver {
                delay,
                notifications,
            } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                for notification in notifications {
                    deliver(&state, notification);
                }
            }
            Dispatch::Shutdown => break,
        }
    }

    info!("Simulated dispatch loop stopped");
}

fn deliver(state: &SimState, notification: Notification) {
    let Some(events) = state.events.read().clone() else {
        debug!("No event receiver registered, notification discarded");
        return;
    };
    state.counters.notifications.fetch_add(1, Ordering::Relaxed);

    match notification {
        Notification::Msg {
            screen,
            issuing_name,
            tr_code,
            text,
        } => events.on_receive_msg(&screen, &issuing_name, &tr_code, &text),
        Notification::Chejan {
            gubun,
            item_count,
            fid_list,
        } => events.on_receive_chejan_data(&gubun, item_count, &fid_list),
        Notification::TrData { event, record } => {
            // Readable via get_comm_data only for the duration of the callback
            state
                .active
                .lock()
                .insert(event.issuing_name.clone(), record);
            events.on_receive_tr_data(&event);
            state.active.lock().remove(&event.issuing_name);
        }
    }
}
