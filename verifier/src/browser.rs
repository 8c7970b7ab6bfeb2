//! Headless Chromium session that loads the page once and records what it
//! logged.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::log::{self as cdp_log, EventEntryAdded, LogEntryLevel};
use chromiumoxide::cdp::js_protocol::runtime::{
    self, ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown,
};
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::VerifyConfig;
use crate::report::{CheckResult, Report, PAGE_CHECKS};

type ErrorLog = Arc<Mutex<Vec<String>>>;

const COLLECTOR_DRAIN: Duration = Duration::from_secs(2);

/// Loads the configured page and builds the report. `on_loaded` receives the
/// page title as soon as navigation succeeds. The browser is shut down
/// whether or not the inspection succeeded.
pub async fn inspect(cfg: &VerifyConfig, on_loaded: impl FnOnce(&str)) -> Result<Report> {
    let mut builder = BrowserConfig::builder().new_headless_mode();
    if let Some(path) = &cfg.chrome_path {
        builder = builder.chrome_executable(path);
    }
    let browser_cfg = builder
        .build()
        .map_err(|e| anyhow!("failed to configure chromium: {e}"))?;

    let (mut browser, mut handler) = Browser::launch(browser_cfg)
        .await
        .context("failed to launch chromium")?;
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("cdp handler: {e}");
            }
        }
    });

    let outcome = inspect_page(&browser, cfg, on_loaded).await;

    if let Err(e) = browser.close().await {
        warn!("failed to close chromium: {e}");
    }
    let _ = browser.wait().await;
    handler_task.abort();

    outcome
}

async fn inspect_page(
    browser: &Browser,
    cfg: &VerifyConfig,
    on_loaded: impl FnOnce(&str),
) -> Result<Report> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("failed to open a page")?;
    page.execute(runtime::EnableParams::default())
        .await
        .context("failed to enable runtime events")?;
    page.execute(cdp_log::EnableParams::default())
        .await
        .context("failed to enable log events")?;

    let errors: ErrorLog = Arc::default();
    let (stop, stopped) = watch::channel(false);
    let collectors = start_collectors(&page, &errors, stopped).await?;

    info!(url = %cfg.page_url, "loading page");
    page.goto(cfg.page_url.as_str())
        .await
        .with_context(|| format!("failed to load {}", cfg.page_url))?;
    tokio::time::sleep(cfg.settle).await;

    let title = page
        .get_title()
        .await
        .context("failed to read page title")?
        .unwrap_or_default();
    on_loaded(&title);

    let mut results = Vec::with_capacity(PAGE_CHECKS.len());
    for check in PAGE_CHECKS {
        let matched = count_matches(&page, check.selector()).await?;
        debug!(selector = check.selector(), matched, "checked");
        results.push(CheckResult {
            check: *check,
            matched,
        });
    }

    // Collectors drain whatever is already buffered before they see the stop.
    let _ = stop.send(true);
    for mut task in collectors {
        match tokio::time::timeout(COLLECTOR_DRAIN, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("event collector failed: {e}"),
            Err(_) => {
                warn!("event collector did not drain in time");
                task.abort();
            }
        }
    }
    let console_errors = errors
        .lock()
        .map_err(|_| anyhow!("console error log poisoned"))?
        .clone();

    Ok(Report {
        results,
        console_errors,
        strict: cfg.strict,
    })
}

async fn count_matches(page: &Page, selector: &str) -> Result<usize> {
    let expr = format!(
        "document.querySelectorAll({}).length",
        serde_json::to_string(selector)?
    );
    page.evaluate(expr)
        .await
        .with_context(|| format!("failed to query {selector}"))?
        .into_value::<usize>()
        .with_context(|| format!("unexpected result querying {selector}"))
}

async fn start_collectors(
    page: &Page,
    errors: &ErrorLog,
    stop: watch::Receiver<bool>,
) -> Result<Vec<JoinHandle<()>>> {
    let console = page.event_listener::<EventConsoleApiCalled>().await?;
    let exceptions = page.event_listener::<EventExceptionThrown>().await?;
    let log_entries = page.event_listener::<EventEntryAdded>().await?;

    let sink = errors.clone();
    let console_task = spawn_collector(console, stop.clone(), move |event| {
        let text = console_text(
            event
                .args
                .iter()
                .map(|arg| (arg.value.as_ref(), arg.description.as_deref())),
        );
        if matches!(event.r#type, ConsoleApiCalledType::Error) {
            record(&sink, text);
        } else {
            debug!(kind = ?event.r#type, "console: {text}");
        }
    });

    let sink = errors.clone();
    let exception_task = spawn_collector(exceptions, stop.clone(), move |event| {
        let details = &event.exception_details;
        let thrown = details.exception.as_ref();
        let message = exception_message(
            thrown.and_then(|e| e.description.as_deref()),
            thrown.and_then(|e| e.value.as_ref()),
            &details.text,
        );
        record(&sink, message);
    });

    // Resource load failures surface here rather than through the console API.
    let sink = errors.clone();
    let log_task = spawn_collector(log_entries, stop, move |event| {
        if matches!(event.entry.level, LogEntryLevel::Error) {
            record(&sink, event.entry.text.clone());
        }
    });

    Ok(vec![console_task, exception_task, log_task])
}

/// Feeds every event to `on_event` until the stream ends or `stop` changes.
/// Events already buffered when the stop arrives are still delivered.
fn spawn_collector<T, S>(
    mut events: S,
    mut stop: watch::Receiver<bool>,
    mut on_event: impl FnMut(&T) + Send + 'static,
) -> JoinHandle<()>
where
    S: Stream<Item = Arc<T>> + Unpin + Send + 'static,
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                event = events.next() => match event {
                    Some(event) => on_event(&event),
                    None => break,
                },
                _ = stop.changed() => break,
            }
        }
    })
}

fn record(errors: &ErrorLog, message: String) {
    warn!("page error: {message}");
    if let Ok(mut errors) = errors.lock() {
        errors.push(message);
    }
}

fn remote_text(value: Option<&serde_json::Value>, description: Option<&str>) -> String {
    match (value, description) {
        (Some(serde_json::Value::String(s)), _) => s.clone(),
        (Some(value), _) => value.to_string(),
        (None, Some(description)) => description.to_string(),
        (None, None) => String::new(),
    }
}

fn console_text<'a>(
    args: impl Iterator<Item = (Option<&'a serde_json::Value>, Option<&'a str>)>,
) -> String {
    args.map(|(value, description)| remote_text(value, description))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Thrown errors carry a description with the stack below the first line;
/// thrown primitives only carry a value.
fn exception_message(
    description: Option<&str>,
    value: Option<&serde_json::Value>,
    text: &str,
) -> String {
    if let Some(first) = description.and_then(|d| d.lines().next()) {
        return first.to_string();
    }
    match value {
        Some(value) => format!("{} {}", text, remote_text(Some(value), None)),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn console_text_joins_values_and_descriptions() {
        let count = json!(3);
        let word = json!("loaded");
        let args = vec![
            (Some(&word), None),
            (Some(&count), Some("3")),
            (None, Some("HTMLDivElement")),
            (None, None),
        ];
        assert_eq!(console_text(args.into_iter()), "loaded 3 HTMLDivElement ");
    }

    #[test]
    fn thrown_errors_keep_only_the_first_description_line() {
        let message = exception_message(
            Some("TypeError: x is null\n    at init (main.js:4:9)"),
            None,
            "Uncaught",
        );
        assert_eq!(message, "TypeError: x is null");
    }

    #[test]
    fn thrown_primitives_report_their_value() {
        let boom = json!("boom");
        assert_eq!(exception_message(None, Some(&boom), "Uncaught"), "Uncaught boom");

        let code = json!(42);
        assert_eq!(exception_message(None, Some(&code), "Uncaught"), "Uncaught 42");
    }

    #[test]
    fn exceptions_without_payload_fall_back_to_the_text() {
        assert_eq!(exception_message(None, None, "Script error."), "Script error.");
    }

    #[tokio::test]
    async fn collector_drains_buffered_events_before_stopping() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<Arc<String>>();
        for text in ["first", "second", "third"] {
            tx.unbounded_send(Arc::new(text.to_string())).unwrap();
        }
        let (stop, stopped) = watch::channel(false);
        stop.send(true).unwrap();

        let seen: ErrorLog = Arc::default();
        let sink = seen.clone();
        let task = spawn_collector(rx, stopped, move |text: &String| {
            sink.lock().unwrap().push(text.clone());
        });
        task.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), ["first", "second", "third"]);
        drop(tx);
    }

    #[tokio::test]
    async fn collector_ends_with_its_stream() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<Arc<String>>();
        let (_stop, stopped) = watch::channel(false);
        let task = spawn_collector(rx, stopped, |_: &String| {});
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
