//! Periodic status stream backing [`PlaybackController::on_time_change`].

use crate::controller::PlaybackController;
use crate::types::PlaybackStatus;
use core_async::sync::CancellationToken;
use core_async::time::{self, Duration, Interval};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

/// Infinite stream of `CONTINUE` snapshots, one per tick.
///
/// Holds only a weak reference to the controller and never mutates it. Ends
/// when the controller is destroyed or dropped.
pub struct TimeChangeStream {
    period: Duration,
    inner: BoxStream<'static, PlaybackStatus>,
}

struct TickState {
    controller: Weak<PlaybackController>,
    period: Duration,
    ticker: Option<Interval>,
    shutdown: CancellationToken,
}

impl TimeChangeStream {
    pub(crate) fn new(
        controller: Weak<PlaybackController>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let initial = TickState {
            controller,
            period,
            ticker: None,
            shutdown,
        };

        let inner = stream::unfold(initial, |mut tick| async move {
            // Created on first poll so the stream can be built outside a runtime.
            let ticker = tick.ticker.get_or_insert_with(|| time::ticker(tick.period));

            core_async::select! {
                biased;
                _ = tick.shutdown.cancelled() => return None,
                _ = ticker.tick() => {}
            }

            let status = tick.controller.upgrade()?.time_snapshot();
            Some((status, tick))
        })
        .boxed();

        Self { period, inner }
    }

    /// Interval between snapshots.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Stream for TimeChangeStream {
    type Item = PlaybackStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for TimeChangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeChangeStream")
            .field("period", &self.period)
            .finish()
    }
}
