use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use task_status_monitor::app::{PageState, StatusMonitor};
use task_status_monitor::config::{PollConfig, Variant, DEFAULT_BASE_URL, DEFAULT_INTERVAL_MS};
use task_status_monitor::status::{Details, HttpStatusSource, PollOutcome, Poller};
use task_status_monitor::utils::curl_parser::{headers_from_lines, CurlParser};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "task-status-monitor")]
#[command(version)]
#[command(about = "Watch an asynchronous job until it finishes")]
struct Args {
    /// Which results page to drive
    #[arg(long, value_enum, env = "STATUS_VARIANT", default_value = "results")]
    variant: Variant,

    /// Base URL of the web application
    #[arg(long, env = "STATUS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Full status URL, overriding base URL and variant path
    #[arg(long)]
    url: Option<String>,

    /// Delay between status requests in milliseconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,

    /// Maximum number of status requests (0 = unbounded).
    /// Defaults to 50 for results and unbounded for task.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Consecutive failed requests tolerated before giving up
    #[arg(long, default_value_t = task_status_monitor::config::DEFAULT_MAX_TRANSPORT_RETRIES)]
    max_transport_retries: u32,

    /// Extra request header, e.g. "Cookie: sessionid=..." (repeatable)
    #[arg(long = "header", short = 'H')]
    headers: Vec<String>,

    /// File holding a "Copy as cURL" command for the status request
    #[arg(long)]
    curl_file: Option<PathBuf>,

    /// Poll in the terminal instead of opening a window
    #[arg(long)]
    headless: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_status_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "task status monitor failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    if args.headless {
        let rt = tokio::runtime::Runtime::new()?;
        return Ok(rt.block_on(run_headless(config)));
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 640.0])
            .with_min_inner_size([420.0, 500.0]),
        ..Default::default()
    };

    let title = config.variant.title();
    eframe::run_native(
        title,
        options,
        Box::new(move |cc| Box::new(StatusMonitor::new(cc, config))),
    )?;
    Ok(true)
}

fn build_config(args: &Args) -> Result<PollConfig, Box<dyn std::error::Error>> {
    let mut config = PollConfig::for_variant(args.variant, &args.base_url)
        .with_interval(Duration::from_millis(args.interval_ms))
        .with_max_transport_retries(args.max_transport_retries);

    if let Some(max_attempts) = args.max_attempts {
        config = config.with_max_attempts(max_attempts);
    }

    if let Some(path) = &args.curl_file {
        let curl_text = std::fs::read_to_string(path)?;
        let mut parser = CurlParser::new();
        parser.parse(&curl_text)?;
        if let Some(url) = parser.url {
            config = config.with_url(url);
        }
        if let Some(headers) = parser.headers {
            config = config.with_headers(headers);
        }
    }

    if let Some(url) = &args.url {
        config = config.with_url(url.clone());
    }
    Ok(config.with_headers(headers_from_lines(&args.headers)))
}

async fn run_headless(config: PollConfig) -> bool {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, stopping");
            ctrl_c.cancel();
        }
    });

    let source = HttpStatusSource::from_config(&config);
    let mut poller = Poller::with_cancellation(source, config, cancel);
    let mut page = PageState::default();
    let outcome = poller.run(&mut page).await;

    report(&page, &outcome)
}

/// Prints the final page to stdout. Returns whether the job succeeded.
fn report(page: &PageState, outcome: &PollOutcome) -> bool {
    let label = page.state_label.map(|l| l.text()).unwrap_or("PENDING");
    tracing::info!(state = label, attempts = outcome.attempts(), "polling stopped");

    match &page.details {
        Some(Details::Table(table)) => println!("{}", table.to_markup()),
        Some(Details::Error(detail)) => eprintln!("{}: {}", label, detail),
        None => {}
    }
    if let Some(reference) = &page.reference {
        println!("{}", reference);
    }

    page.state_label.is_some_and(|l| l.is_success())
}
