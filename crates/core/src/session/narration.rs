//! Cosmetic progress narration shown while the model works.
//!
//! The messages are not tied to real progress. Each enhancement owns one
//! [`NarrationTimers`] set; dropping it aborts whatever has not fired yet.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug)]
pub struct NarrationStep {
    /// Offset from the start of the enhancement.
    pub after: Duration,
    pub message: &'static str,
}

pub const NARRATION: [NarrationStep; 2] = [
    NarrationStep {
        after: Duration::from_millis(2000),
        message: "Simulating Sony A1 optical path...",
    },
    NarrationStep {
        after: Duration::from_millis(5000),
        message: "Refining skin texture and highlights...",
    },
];

/// Pending narration updates of a single enhancement.
pub(crate) struct NarrationTimers {
    handles: Vec<JoinHandle<()>>,
}

impl NarrationTimers {
    /// Spawns one timer per step; `apply` runs when a timer fires.
    pub(crate) fn schedule<F>(steps: &[NarrationStep], apply: F) -> Self
    where
        F: Fn(&'static str) + Send + Sync + 'static,
    {
        let apply = Arc::new(apply);
        let handles = steps
            .iter()
            .map(|step| {
                let apply = Arc::clone(&apply);
                let NarrationStep { after, message } = *step;
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    apply(message);
                })
            })
            .collect();

        Self { handles }
    }

    /// Aborts all timers that have not fired yet.
    pub(crate) fn cancel(self) {
        drop(self);
    }
}

impl Drop for NarrationTimers {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) + Send + Sync + 'static) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        (fired, move |message| sink.lock().unwrap().push(message))
    }

    #[tokio::test(start_paused = true)]
    async fn fires_in_schedule_order() {
        let (fired, apply) = recorder();
        let _timers = NarrationTimers::schedule(&NARRATION, apply);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock().unwrap(), vec![NARRATION[0].message]);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(
            *fired.lock().unwrap(),
            vec![NARRATION[0].message, NARRATION[1].message]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_pending_steps() {
        let (fired, apply) = recorder();
        let timers = NarrationTimers::schedule(&NARRATION, apply);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        timers.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(*fired.lock().unwrap(), vec![NARRATION[0].message]);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_everything() {
        let (fired, apply) = recorder();
        {
            let _timers = NarrationTimers::schedule(&NARRATION, apply);
        }
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(fired.lock().unwrap().is_empty());
    }
}
