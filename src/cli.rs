//! Command line surface of `clipboard-bridge`.
//!
//! Every subcommand goes through [`ClipboardClient`] and the typed event
//! helpers, exactly like an embedding application would; the in-process
//! [`LocalClipboardHost`] plays the host runtime.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cb_app::{ClipboardClient, EventSubscriptions, MonitorLifecycle, PollMonitor, PollTarget, Subscription};
use cb_core::{BridgeConfig, ClipboardChange, ContentKind, ListenSelection, PresenceFlags};
use cb_platform::{InMemoryEventBus, LocalClipboardHost, MemoryClipboard, MemoryContent, SystemClipboard};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};

#[derive(Parser, Debug)]
#[command(name = "clipboard-bridge", version)]
#[command(about = "Typed clipboard access and per-kind change events", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/clipboard-bridge/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch clipboard changes and print every typed event
    Watch {
        /// Stop after this many per-kind events
        #[arg(short, long)]
        max_events: Option<usize>,
        /// Also deliver images as raw PNG bytes
        #[arg(long)]
        image_binary: bool,
        /// Do not let file copies claim the notification
        #[arg(long)]
        no_files: bool,
    },
    /// Print the clipboard content of one kind
    Read {
        /// text, html, rtf, files, image (base64 PNG) or image_binary (PNG to stdout)
        kind: ContentKind,
    },
    /// Replace the clipboard content
    Write {
        #[command(subcommand)]
        content: WriteContent,
    },
    /// Empty the clipboard
    Clear,
    /// List the kinds currently on the clipboard
    Types,
    /// Poll text or image content at a fixed interval
    Poll {
        #[arg(value_enum)]
        target: PollKind,
        /// Interval between reads (default from config)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Stop after this many changes
        #[arg(short, long)]
        max_events: Option<usize>,
    },
    /// Replay a few scripted copies on an in-memory clipboard
    Demo,
}

#[derive(Subcommand, Debug)]
pub enum WriteContent {
    Text { text: String },
    Html {
        html: String,
        /// Plain-text alternative written alongside the HTML
        #[arg(long)]
        text: Option<String>,
    },
    Rtf { rtf: String },
    /// Local file paths
    Files {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// file:// URIs (plain paths on Windows)
    Uris {
        #[arg(required = true)]
        uris: Vec<String>,
    },
    /// A PNG file
    Image { path: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    Text,
    Image,
}

impl From<PollKind> for PollTarget {
    fn from(kind: PollKind) -> Self {
        match kind {
            PollKind::Text => PollTarget::Text,
            PollKind::Image => PollTarget::Image,
        }
    }
}

#[derive(Debug)]
enum BridgeEvent {
    Presence(PresenceFlags),
    Change(ClipboardChange),
}

pub async fn run(cli: Cli, config: BridgeConfig) -> Result<()> {
    match cli.command {
        Commands::Demo => run_demo(&config).await,
        command => run_on_system_clipboard(command, config).await,
    }
}

async fn run_on_system_clipboard(command: Commands, config: BridgeConfig) -> Result<()> {
    let bus = Arc::new(InMemoryEventBus::new());
    let clipboard = SystemClipboard::new().context("Failed to open the system clipboard")?;
    let host = Arc::new(LocalClipboardHost::new(clipboard, bus.clone()));
    let client = ClipboardClient::new(host);

    match command {
        Commands::Watch {
            max_events,
            image_binary,
            no_files,
        } => {
            let selection = watch_selection(config.listen, image_binary, no_files);
            run_watch(client, bus, selection, max_events).await
        }
        Commands::Read { kind } => run_read(&client, kind).await,
        Commands::Write { content } => run_write(&client, content).await,
        Commands::Clear => {
            client.clear().await?;
            Ok(())
        }
        Commands::Types => {
            let flags = client.available_types().await?;
            println!("{}", describe_flags(&flags));
            Ok(())
        }
        Commands::Poll {
            target,
            delay_ms,
            max_events,
        } => {
            let target = PollTarget::from(target);
            let delay = delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| target.delay_from(&config.poll));
            run_poll(client, bus, target, delay, max_events).await
        }
        Commands::Demo => run_demo(&config).await,
    }
}

async fn run_demo(config: &BridgeConfig) -> Result<()> {
    for line in demo_transcript(config).await? {
        println!("{line}");
    }
    Ok(())
}

fn watch_selection(base: ListenSelection, image_binary: bool, no_files: bool) -> ListenSelection {
    let mut selection = base;
    if image_binary {
        selection = selection.with(ContentKind::ImageBinary, true);
    }
    if no_files {
        selection = selection.with(ContentKind::Files, false);
    }
    selection
}

async fn subscribe_all(
    subscriptions: &EventSubscriptions,
    selection: ListenSelection,
    tx: mpsc::UnboundedSender<BridgeEvent>,
) -> Result<Vec<Subscription>> {
    let mut handles = Vec::new();

    let presence_tx = tx.clone();
    handles.push(
        subscriptions
            .on_something_update(move |flags| {
                let _ = presence_tx.send(BridgeEvent::Presence(flags));
            })
            .await?,
    );

    for kind in ContentKind::ALL {
        if !selection.is_enabled(kind) {
            continue;
        }
        let change_tx = tx.clone();
        handles.push(
            subscriptions
                .on_change(kind, move |change| {
                    let _ = change_tx.send(BridgeEvent::Change(change));
                })
                .await?,
        );
    }

    Ok(handles)
}

async fn run_watch(
    client: ClipboardClient,
    bus: Arc<InMemoryEventBus>,
    selection: ListenSelection,
    max_events: Option<usize>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscriptions = EventSubscriptions::new(bus.clone());
    let handles = subscribe_all(&subscriptions, selection, tx).await?;

    let session = MonitorLifecycle::new(client, bus)
        .start_listening(selection)
        .await?;
    info!(?selection, "watching clipboard");
    println!("Watching clipboard, press Ctrl+C to stop");

    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Some(BridgeEvent::Presence(flags)) => println!("changed: {}", describe_flags(&flags)),
                Some(BridgeEvent::Change(change)) => {
                    println!("  {}", describe_change(&change));
                    seen += 1;
                    if max_events.is_some_and(|max| seen >= max) {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    session.stop().await?;
    for handle in handles {
        handle.unsubscribe();
    }
    Ok(())
}

async fn run_read(client: &ClipboardClient, kind: ContentKind) -> Result<()> {
    match kind {
        ContentKind::Text => println!("{}", client.read_text().await?),
        ContentKind::Html => println!("{}", client.read_html().await?),
        ContentKind::Rtf => println!("{}", client.read_rtf().await?),
        ContentKind::Files => {
            for path in client.read_files().await? {
                println!("{path}");
            }
        }
        ContentKind::Image => println!("{}", client.read_image_base64().await?),
        ContentKind::ImageBinary => {
            let png = client.read_image_bytes().await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&png).context("Failed to write image to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

async fn run_write(client: &ClipboardClient, content: WriteContent) -> Result<()> {
    match content {
        WriteContent::Text { text } => client.write_text(text).await?,
        WriteContent::Html { html, text: None } => client.write_html(html).await?,
        WriteContent::Html {
            html,
            text: Some(text),
        } => client.write_html_and_text(html, text).await?,
        WriteContent::Rtf { rtf } => client.write_rtf(rtf).await?,
        WriteContent::Files { paths } => client.write_files(paths).await?,
        WriteContent::Uris { uris } => client.write_files_uris(uris).await?,
        WriteContent::Image { path } => {
            let png = std::fs::read(&path)
                .with_context(|| format!("Failed to read image file: {}", path.display()))?;
            client.write_image_binary(png).await?
        }
    }
    Ok(())
}

async fn run_poll(
    client: ClipboardClient,
    bus: Arc<InMemoryEventBus>,
    target: PollTarget,
    delay: Duration,
    max_events: Option<usize>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let subscriptions = EventSubscriptions::new(bus.clone());
    let handle = match target {
        PollTarget::Text => {
            subscriptions
                .on_text_update(move |text| {
                    let _ = tx.send(format!("text: {}", preview(&text)));
                })
                .await?
        }
        PollTarget::Image => {
            subscriptions
                .on_image_update(move |base64| {
                    let _ = tx.send(format!("image: {} base64 chars", base64.len()));
                })
                .await?
        }
    };

    let mut monitor = PollMonitor::new(target, client, bus).with_delay(delay);
    monitor.start();
    println!(
        "Polling {target:?} every {} ms, press Ctrl+C to stop",
        delay.as_millis()
    );

    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = rx.recv() => match line {
                Some(line) => {
                    println!("{line}");
                    seen += 1;
                    if max_events.is_some_and(|max| seen >= max) {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    monitor.stop();
    monitor.join().await;
    handle.unsubscribe();
    Ok(())
}

/// Eight-byte PNG signature; the memory clipboard does not decode images.
const DEMO_PNG: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Run scripted copies against an in-memory clipboard and return what a
/// subscriber saw, one line per event.
pub async fn demo_transcript(config: &BridgeConfig) -> Result<Vec<String>> {
    let bus = Arc::new(InMemoryEventBus::new());
    let clipboard = Arc::new(MemoryClipboard::new());
    let host = Arc::new(LocalClipboardHost::from_shared(clipboard.clone(), bus.clone()));
    let client = ClipboardClient::new(host);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscriptions = EventSubscriptions::new(bus.clone());
    let handles = subscribe_all(&subscriptions, config.listen, tx).await?;
    let session = MonitorLifecycle::new(client, bus)
        .start_listening(config.listen)
        .await?;

    let steps = [
        ("copy plain text", MemoryContent::new().with_text("hello from clipboard-bridge")),
        (
            "copy a selection from a web page",
            MemoryContent::new()
                .with_html("<b>hello</b> world")
                .with_text("hello world"),
        ),
        (
            "copy two files",
            MemoryContent::new()
                .with_files(["file:///tmp/report.pdf", "file:///tmp/notes.txt"])
                .with_text("report.pdf\nnotes.txt"),
        ),
        ("copy an image", MemoryContent::new().with_image_png(DEMO_PNG.to_vec())),
    ];

    let mut transcript = Vec::new();
    for (label, content) in steps {
        transcript.push(format!("> {label}"));
        clipboard.replace(content);
        let span = info_span!("demo.step", step = label);
        drain_until_quiet(&mut rx, &mut transcript)
            .instrument(span)
            .await;
    }

    session.stop().await?;
    for handle in handles {
        handle.unsubscribe();
    }
    Ok(transcript)
}

async fn drain_until_quiet(rx: &mut mpsc::UnboundedReceiver<BridgeEvent>, out: &mut Vec<String>) {
    let quiet = Duration::from_millis(200);
    while let Ok(Some(event)) = tokio::time::timeout(quiet, rx.recv()).await {
        out.push(match event {
            BridgeEvent::Presence(flags) => format!("changed: {}", describe_flags(&flags)),
            BridgeEvent::Change(change) => format!("  {}", describe_change(&change)),
        });
    }
}

fn describe_flags(flags: &PresenceFlags) -> String {
    if flags.is_empty() {
        return "empty".to_string();
    }
    flags
        .present_kinds()
        .iter()
        .map(ContentKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_change(change: &ClipboardChange) -> String {
    match change {
        ClipboardChange::Text(text) => format!("text: {}", preview(text)),
        ClipboardChange::Html(html) => format!("html: {}", preview(html)),
        ClipboardChange::Rtf(rtf) => format!("rtf: {} chars", rtf.chars().count()),
        ClipboardChange::Files(paths) => format!("files: {}", paths.join(", ")),
        ClipboardChange::Image(base64) => format!("image: {} base64 chars", base64.len()),
        ClipboardChange::ImageBinary(png) => format!("image_binary: {} bytes", png.len()),
    }
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 60;
    let single_line = text.replace('\n', "\\n");
    if single_line.chars().count() <= MAX_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_CHARS).collect();
    format!("{cut}...")
}
