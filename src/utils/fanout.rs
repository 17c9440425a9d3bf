use std::future::Future;

use futures::StreamExt;
use futures::future::join_all;

/// Runs `task` for every item concurrently and returns the outputs in input order.
///
/// `concurrency == 0` launches everything at once; otherwise at most
/// `concurrency` tasks are in flight.
pub(crate) async fn fan_out<I, F, Fut>(items: I, concurrency: usize, task: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    let tasks = items.into_iter().map(task);
    if concurrency == 0 {
        return join_all(tasks).await;
    }
    futures::stream::iter(tasks)
        .buffered(concurrency)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::fan_out;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn fan_out_preserves_input_order() {
        let out = fan_out(vec![30_u64, 10, 20], 0, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            ms
        })
        .await;
        assert_eq!(out, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn fan_out_bounds_in_flight_tasks() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let out = fan_out(0..12_usize, 3, |i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i
            }
        })
        .await;

        assert_eq!(out, (0..12).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
