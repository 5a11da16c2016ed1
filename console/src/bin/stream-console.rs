use clap::{Parser, Subcommand};
use eyre::Context;
use live_input_console::stream_api::{
    CreateLiveInput, LifecycleStatus, LiveInput, RecordingMode, Video,
};
use live_input_console::{Config, StreamClient, StreamUrls};
use serde::Serialize;
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Manage Cloudflare Stream live inputs.
///
/// Credentials are read from CLOUDFLARE_ACCOUNT_ID, CLOUDFLARE_API_TOKEN and
/// CLOUDFLARE_CUSTOMER_CODE, or from a .env file in the working directory.
#[derive(Debug, Parser)]
#[command(name = "stream-console", version)]
struct Cli {
    /// Print raw JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new live input.
    Create {
        /// Defaults to "Live Stream".
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_name = "automatic|off")]
        recording_mode: Option<RecordingMode>,
        #[arg(long)]
        require_signed_urls: bool,
        #[arg(long)]
        prefer_low_latency: bool,
        /// Delete recordings after this many days (30 to 1096). Kept forever if unset.
        #[arg(long, value_name = "DAYS")]
        delete_recording_after_days: Option<u32>,
        /// Origin allowed to embed recordings. May be repeated.
        #[arg(long = "allowed-origin", value_name = "ORIGIN")]
        allowed_origins: Vec<String>,
    },
    /// List all live inputs.
    List,
    /// Show one live input.
    Get { id: String },
    /// List the videos recorded from a live input.
    Videos { id: String },
    /// Check whether a live input is live right now.
    Status { id: String },
    /// Delete a live input.
    Delete {
        id: String,
        /// Do not ask for confirmation.
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the playback URLs of a live input.
    Urls {
        id: String,
        /// Overrides CLOUDFLARE_CUSTOMER_CODE.
        #[arg(long)]
        customer_code: Option<String>,
    },
    /// Print URLs, live status and recordings of a live input.
    Watch { id: String },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
        }
    }

    let cli = Cli::parse();
    run(cli.command, Config::from_env(), cli.json).await
}

fn connect(config: Config) -> eyre::Result<StreamClient> {
    StreamClient::new(config).context("configure Cloudflare Stream client")
}

async fn run(command: Command, config: Config, json: bool) -> eyre::Result<()> {
    match command {
        // URL generation is the only thing that works without API credentials.
        Command::Urls { id, customer_code } => {
            let urls = config
                .stream_urls(&id, customer_code.as_deref())
                .context("generate stream URLs")?;
            output(json, &urls, || print_urls(&urls))
        }
        Command::Create {
            name,
            recording_mode,
            require_signed_urls,
            prefer_low_latency,
            delete_recording_after_days,
            allowed_origins,
        } => {
            let client = connect(config)?;
            let request = CreateLiveInput {
                name,
                recording_mode,
                require_signed_urls: Some(require_signed_urls),
                prefer_low_latency: Some(prefer_low_latency),
                delete_recording_after_days,
                allowed_origins: Some(allowed_origins).filter(|o| !o.is_empty()),
            };
            let input = client
                .create_live_input(&request)
                .await
                .context("create live input")?;
            output(json, &input, || print_created(&input))
        }
        Command::List => {
            let client = connect(config)?;
            let inputs = client
                .list_live_inputs()
                .await
                .context("list live inputs")?;
            output(json, &inputs, || {
                println!("Live Inputs ({})", inputs.len());
                if inputs.is_empty() {
                    println!("No live inputs found. Create your first live input to get started!");
                }
                for input in &inputs {
                    println!();
                    print_live_input(input, client.config().stream_urls(&input.uid, None).ok());
                }
            })
        }
        Command::Get { id } => {
            let client = connect(config)?;
            let input = client
                .get_live_input(&id)
                .await
                .context("fetch live input")?;
            let urls = client.config().stream_urls(&input.uid, None).ok();
            output(json, &input, || print_live_input(&input, urls))
        }
        Command::Videos { id } => {
            let videos = connect(config)?
                .list_live_input_videos(&id)
                .await
                .context("list live input videos")?;
            output(json, &videos, || print_videos(&videos))
        }
        Command::Status { id } => {
            let status = connect(config)?
                .get_live_input_status(&id)
                .await
                .context("check live input status")?;
            output(json, &status, || print_status(&status))
        }
        Command::Delete { id, yes } => {
            let client = connect(config)?;
            if !yes {
                let name = client
                    .get_live_input(&id)
                    .await
                    .ok()
                    .and_then(|i| i.name().map(str::to_string))
                    .unwrap_or_else(|| id.clone());
                let question = format!(
                    "Are you sure you want to delete \"{name}\"? This action cannot be undone."
                );
                if !confirm(&question).await.context("read confirmation")? {
                    eprintln!("Cancelled.");
                    return Ok(());
                }
            }
            client
                .delete_live_input(&id)
                .await
                .context("delete live input")?;
            eprintln!("Live input deleted successfully");
            Ok(())
        }
        Command::Watch { id } => {
            let report = watch(config, &id).await?;
            output(json, &report, || {
                print_urls(&report.urls);
                if let Some(status) = &report.status {
                    println!();
                    print_status(status);
                }
                if let Some(videos) = &report.videos {
                    println!();
                    print_videos(videos);
                }
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct WatchReport {
    urls: StreamUrls,
    status: Option<LifecycleStatus>,
    videos: Option<Vec<Video>>,
}

/// Gathers everything a viewer needs for one input.
///
/// Only the URLs are required. Status and recordings are skipped when they cannot be fetched,
/// including when no API credentials are configured.
async fn watch(config: Config, id: &str) -> eyre::Result<WatchReport> {
    let urls = config
        .stream_urls(id, None)
        .context("generate stream URLs")?;

    let client = match connect(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping live status and recordings: {e:#}");
            return Ok(WatchReport {
                urls,
                status: None,
                videos: None,
            });
        }
    };

    let status = client
        .get_live_input_status(id)
        .await
        .inspect_err(|e| eprintln!("Could not check live status: {e}"))
        .ok();
    let videos = client
        .list_live_input_videos(id)
        .await
        .inspect_err(|e| eprintln!("Could not list videos: {e}"))
        .ok();

    Ok(WatchReport {
        urls,
        status,
        videos,
    })
}

fn output<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> eyre::Result<()> {
    if json {
        let json = serde_json::to_string_pretty(value).context("serialize output as JSON")?;
        println!("{json}");
    } else {
        text();
    }
    Ok(())
}

async fn confirm(question: &str) -> eyre::Result<bool> {
    eprint!("{question} [y/N] ");
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("read from stdin")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

fn format_time(ts: Option<jiff::Timestamp>) -> String {
    match ts {
        Some(ts) => ts
            .to_zoned(jiff::tz::TimeZone::system())
            .strftime("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
        None => "unknown".to_string(),
    }
}

fn print_created(input: &LiveInput) {
    println!("Live Input Created Successfully!");
    println!("  Input ID:   {}", input.uid);
    println!("  Name:       {}", input.name().unwrap_or_default());
    println!("  Status:     {}", input.state().unwrap_or("Ready"));
    if let Some(rtmps) = &input.rtmps {
        println!();
        println!("RTMPS Configuration:");
        println!("  Server URL: {}", rtmps.url);
        println!("  Stream Key: {}", rtmps.stream_key);
        println!();
        println!("How to use with OBS Studio:");
        println!("  1. Open OBS Studio");
        println!("  2. Go to Settings -> Stream");
        println!("  3. Select \"Custom...\" as Service");
        println!("  4. Copy the Server URL above into the \"Server\" field");
        println!("  5. Copy the Stream Key above into the \"Stream Key\" field");
        println!("  6. Click OK and start streaming!");
    }
}

fn print_live_input(input: &LiveInput, urls: Option<StreamUrls>) {
    println!("{}", input.name().unwrap_or("Untitled Stream"));
    println!("  ID:             {}", input.uid);
    println!("  Created:        {}", format_time(input.created));
    println!("  Modified:       {}", format_time(input.modified));
    println!("  Recording Mode: {}", input.recording_mode());
    if input.requires_signed_urls() {
        println!("  Requires Signed URLs: Yes");
    }
    if input.prefer_low_latency == Some(true) {
        println!("  Low Latency:    Enabled");
    }
    if let Some(days) = input.delete_recording_after_days {
        println!("  Delete Recordings After: {days} days");
    }
    if let Some(rtmps) = &input.rtmps {
        println!("  RTMPS Server:   {}", rtmps.url);
        println!("  Stream Key:     {}", rtmps.stream_key);
    }
    if let Some(srt) = &input.srt {
        println!("  SRT URL:        {}", srt.url);
        println!("  SRT Stream ID:  {}", srt.stream_id);
    }
    if let Some(web_rtc) = &input.web_rtc {
        println!("  WebRTC (WHIP):  {}", web_rtc.url);
    }
    if let Some(urls) = urls {
        println!("  Player:         {}", urls.player_url);
        println!("  Watch:          {}", urls.watch_url);
    }
}

fn print_urls(urls: &StreamUrls) {
    println!("Player (iframe): {}", urls.player_url);
    println!("HLS manifest:    {}", urls.hls_url);
    println!("DASH manifest:   {}", urls.dash_url);
    println!("Watch page:      {}", urls.watch_url);
}

fn print_status(status: &LifecycleStatus) {
    println!("Status: {}", if status.live { "LIVE" } else { "OFFLINE" });
    if let Some(video_uid) = &status.video_uid {
        println!("Current Video ID: {video_uid}");
    }
}

fn print_videos(videos: &[Video]) {
    println!("Recordings ({})", videos.len());
    for (index, video) in videos.iter().enumerate() {
        println!(
            "  Video {}: {}",
            index + 1,
            video.name().unwrap_or("Untitled")
        );
        println!("    ID:      {}", video.uid);
        println!("    Status:  {}", video.state().unwrap_or("unknown"));
        println!("    Created: {}", format_time(video.created));
        if let Some(preview) = &video.preview {
            println!("    Preview: {preview}");
        }
    }
}
