//! Directive dispatch
//!
//! The [`Dispatcher`] scans a [`LineBuffer`] for directive lines and spawns
//! one task per directive. Each task resolves its directive through the
//! registered handler and writes the result back to the directive's own
//! line. The scan never waits on a task; the dispatcher waits once at the
//! end, for whichever comes first:
//!
//! 1. cancellation of the caller's token,
//! 2. the first recorded failure (later failures are dropped),
//! 3. completion of every task.
//!
//! Tasks still running when the wait ends early are aborted.

mod error;
mod slot;

pub use error::{DispatchError, ErrorKind};

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::document::LineBuffer;
use crate::handlers::{DirectiveContext, HandlerRegistry};
use crate::observability::Metrics;
use slot::ErrorSlot;

pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    marker: String,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        marker: impl Into<String>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            registry,
            marker: marker.into(),
            metrics,
        }
    }

    /// Resolve every directive in `buffer` in place.
    ///
    /// `source_name` names the document in diagnostics and anchors relative
    /// targets. On error the buffer contents are unspecified.
    pub async fn dispatch(
        &self,
        source_name: &str,
        buffer: Arc<LineBuffer>,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let failure = Arc::new(ErrorSlot::new());
        let mut tasks = JoinSet::new();

        while let Some(line) = buffer.next_non_empty() {
            let Some(command) = line.text.strip_prefix(self.marker.as_str()) else {
                continue;
            };
            let name = command.split_ascii_whitespace().next().unwrap_or_default();

            let handler = match self.registry.get(name) {
                Ok(handler) => handler,
                Err(_) => {
                    warn!(
                        source = source_name,
                        line = line.number,
                        command = %line.text,
                        "Unknown directive"
                    );
                    self.metrics.directive_unknown();
                    continue;
                }
            };

            debug!(
                source = source_name,
                line = line.number,
                directive = name,
                "Dispatching directive"
            );
            self.metrics.directive_dispatched();

            let index = line.index();
            let ctx = DirectiveContext {
                source_name: source_name.to_string(),
                line_number: line.number,
                name: name.to_string(),
                line: line.text,
            };
            let buffer = Arc::clone(&buffer);
            let failure = Arc::clone(&failure);

            tasks.spawn(async move {
                let source_name = ctx.source_name.clone();
                let line_number = ctx.line_number;

                let outcome = match handler.resolve(ctx).await {
                    Ok(text) => buffer.set(index, text).map_err(DispatchError::from),
                    Err(source) => Err(DispatchError::Directive {
                        source_name,
                        line: line_number,
                        source,
                    }),
                };

                if let Err(err) = outcome {
                    if !failure.record(err) {
                        debug!(line = line_number, "Dropping failure, one is already recorded");
                    }
                }
            });
        }

        debug!(source = source_name, tasks = tasks.len(), "Scan complete, waiting for directives");

        let drained = async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    failure.record(DispatchError::TaskFailed(err.to_string()));
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DispatchError::Cancelled),
            err = failure.wait() => Err(err),
            _ = drained => match failure.get() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{DirectiveHandler, FnHandler, HandlerError};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Echoes the directive's argument after a delay taken from the line number,
    /// so later lines finish first.
    struct SlowEcho;

    #[async_trait]
    impl DirectiveHandler for SlowEcho {
        async fn resolve(&self, ctx: DirectiveContext) -> Result<String, HandlerError> {
            let delay = 50u64.saturating_sub(ctx.line_number as u64 * 5);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(ctx.line.split_whitespace().skip(1).collect::<Vec<_>>().join(" "))
        }
    }

    struct Never;

    #[async_trait]
    impl DirectiveHandler for Never {
        async fn resolve(&self, _ctx: DirectiveContext) -> Result<String, HandlerError> {
            std::future::pending().await
        }
    }

    fn fail_handler() -> Arc<dyn DirectiveHandler> {
        Arc::new(FnHandler(|ctx: &DirectiveContext| -> Result<String, HandlerError> {
            Err(HandlerError::Failed(format!("failed at {}", ctx.line_number)))
        }))
    }

    fn dispatcher() -> (Dispatcher, Arc<Metrics>) {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", Arc::new(SlowEcho)).unwrap();
        registry.register("fail", fail_handler()).unwrap();
        registry.register("never", Arc::new(Never)).unwrap();

        let metrics = Arc::new(Metrics::new());
        (Dispatcher::new(Arc::new(registry), ".", Arc::clone(&metrics)), metrics)
    }

    fn buffer(text: &str) -> Arc<LineBuffer> {
        Arc::new(LineBuffer::parse(text).with_comment_prefix("//"))
    }

    #[tokio::test]
    async fn test_each_directive_writes_its_own_line() {
        let (dispatcher, metrics) = dispatcher();
        let lines = buffer("intro\n.echo one\n.echo two\n\n.echo three\noutro");

        dispatcher
            .dispatch("doc", Arc::clone(&lines), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lines.join(), "intro\none\ntwo\n\nthree\noutro");
        assert_eq!(metrics.snapshot().directives_dispatched, 3);
    }

    #[tokio::test]
    async fn test_no_directives_is_identity() {
        let (dispatcher, _) = dispatcher();
        let text = "plain\n\n// .echo commented\n  .echo indented";
        let lines = buffer(text);

        dispatcher
            .dispatch("doc", Arc::clone(&lines), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lines.join(), text);
    }

    #[tokio::test]
    async fn test_unknown_directive_is_not_fatal() {
        let (dispatcher, metrics) = dispatcher();
        let lines = buffer(".mystery thing\n.echo ok");

        dispatcher
            .dispatch("doc", Arc::clone(&lines), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lines.join(), ".mystery thing\nok");
        assert_eq!(metrics.snapshot().directives_unknown, 1);
    }

    #[tokio::test]
    async fn test_failure_reports_location() {
        let (dispatcher, _) = dispatcher();
        let lines = buffer(".echo fine\n\n.fail");

        let err = dispatcher
            .dispatch("talk.slide", lines, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "talk.slide:3: failed at 3");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_failure_does_not_wait_for_stuck_tasks() {
        let (dispatcher, _) = dispatcher();
        let lines = buffer(".never\n.fail");

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.dispatch("doc", lines, &CancellationToken::new()),
        )
        .await
        .expect("dispatch should stop at the first failure");

        assert!(matches!(result, Err(DispatchError::Directive { line: 2, .. })));
    }

    #[tokio::test]
    async fn test_only_one_of_many_failures_is_reported() {
        let (dispatcher, _) = dispatcher();
        let lines = buffer(".fail\n.fail\n.fail\n.fail");

        let err = dispatcher
            .dispatch("doc", lines, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Directive { line: 1..=4, .. }));
    }

    #[tokio::test]
    async fn test_cancellation_unblocks_wait() {
        let (dispatcher, _) = dispatcher();
        let lines = buffer(".never");
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = dispatcher.dispatch("doc", lines, &cancel).await.unwrap_err();
        assert_eq!(err, DispatchError::Cancelled);
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = dispatcher
            .dispatch("doc", buffer("no directives"), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Cancelled);
    }

    #[tokio::test]
    async fn test_custom_marker() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", Arc::new(SlowEcho)).unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry), "@", Arc::new(Metrics::new()));
        let lines = buffer(".echo stays\n@echo replaced");

        dispatcher
            .dispatch("doc", Arc::clone(&lines), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lines.join(), ".echo stays\nreplaced");
    }
}
