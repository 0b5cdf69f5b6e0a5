//! Video Studio CLI: command-line client for the Video Studio backend.
//!
//! Set VSTUDIO_API_URL (or API_URL). Every request carries the session's
//! X-User-Id, persisted in VSTUDIO_USER_ID_FILE or overridden by VSTUDIO_USER_ID.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use vstudio_api_client::{ApiClient, CallbackParams, Session};
use vstudio_cli::{
    confirm, error_notification, init_tracing, print_json, publish_warning, render_video_table,
    settle, status_line,
};
use vstudio_core::captions::{supported_languages, transcript_from_srt, Language};
use vstudio_core::models::{
    CaptionFormat, GenerateMetadataRequest, ListVideosQuery, PublishRequest, VideoPatch,
};
use vstudio_core::{
    ClientConfig, LanguageSelection, LifecycleEvent, PrivacyStatus, Video, VideoId, VideoStatus,
};

#[derive(Parser)]
#[command(name = "vstudio", about = "Video Studio CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Video(VideoCommands),
    /// Session identity sent as X-User-Id
    User {
        #[command(subcommand)]
        sub: UserCommands,
    },
}

/// Commands that talk to the backend.
#[derive(Subcommand)]
enum VideoCommands {
    /// List your videos
    List {
        /// Filter by status, e.g. ready, captioning, published
        #[arg(long)]
        status: Option<VideoStatus>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show a single video
    Get { id: VideoId },
    /// Upload a local video file
    Upload { file: PathBuf },
    /// Create a video from a remote URL
    Ingest {
        url: String,
        /// Filename to record instead of the one in the URL
        #[arg(long)]
        filename: Option<String>,
    },
    /// Edit stored metadata
    Update {
        id: VideoId,
        #[command(flatten)]
        fields: MetadataFields,
        #[arg(long)]
        hashtags: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        thumbnail_prompt: Option<String>,
    },
    /// Delete a video
    Delete {
        id: VideoId,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Caption operations
    Captions {
        #[command(subcommand)]
        sub: CaptionCommands,
    },
    /// Generate title, description, tags and hashtags with AI
    Metadata {
        id: VideoId,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        tone: Option<String>,
        /// Ask for hashtags (true/false)
        #[arg(long)]
        hashtags: Option<bool>,
        /// Store the non-empty suggestions on the video
        #[arg(long)]
        apply: bool,
    },
    /// Scan the transcript for confidential content
    Confidentiality { id: VideoId },
    /// Linked YouTube account
    Youtube {
        #[command(subcommand)]
        sub: YouTubeCommands,
    },
    /// Publish a video to the connected account
    Publish {
        id: VideoId,
        #[command(flatten)]
        fields: MetadataFields,
        /// Skip confirmation prompts
        #[arg(long, short)]
        yes: bool,
        /// Poll until publishing finishes
        #[arg(long)]
        watch: bool,
    },
    /// Poll a video while it is captioning or publishing
    Watch { id: VideoId },
}

#[derive(clap::Args)]
struct MetadataFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    privacy: Option<PrivacyStatus>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    thumbnail_url: Option<String>,
}

#[derive(Subcommand)]
enum CaptionCommands {
    /// Transcribe the video and print the captions
    Request {
        id: VideoId,
        /// Source language code
        #[arg(long)]
        language: Option<String>,
        /// Store the captions on the video right away
        #[arg(long)]
        save: bool,
        /// Write the captions to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Store edited captions from a file and mark the video metadata_ready
    Save {
        id: VideoId,
        file: PathBuf,
        /// Transcript file; derived from the captions when omitted
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// List languages available for translation
    Languages {
        /// Mark languages this video already has
        #[arg(long)]
        video: Option<VideoId>,
    },
    /// Translate existing captions into more languages
    Translate {
        id: VideoId,
        /// Target language code (repeatable)
        #[arg(long = "lang")]
        languages: Vec<String>,
        /// Every supported language the video lacks
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum YouTubeCommands {
    /// Show connection status
    Status,
    /// Print the authorization URL to open in a browser
    Connect,
    /// Finish connecting with the redirect URL (or its query string)
    Callback { url: String },
    /// Disconnect the linked account
    Disconnect {
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Print the current identifier
    Show,
    /// Replace the stored identifier
    Set { user_id: String },
    /// Generate a fresh identifier
    Reset,
}

impl MetadataFields {
    fn into_patch(self) -> VideoPatch {
        VideoPatch {
            title: self.title,
            description: self.description,
            tags: self.tags,
            privacy_status: self.privacy,
            category: self.category,
            thumbnail_url: self.thumbnail_url,
            ..Default::default()
        }
    }

    fn apply_to(self, request: &mut PublishRequest) {
        if let Some(title) = self.title {
            request.title = Some(title);
        }
        if let Some(description) = self.description {
            request.description = Some(description);
        }
        if let Some(tags) = self.tags {
            request.tags = Some(tags);
        }
        if let Some(privacy) = self.privacy {
            request.privacy_status = Some(privacy);
        }
        if let Some(category) = self.category {
            request.category = Some(category);
        }
        if let Some(url) = self.thumbnail_url {
            request.thumbnail_url = Some(url);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("{}", error_notification(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;

    match cli.command {
        Commands::User { sub } => run_user(&config, sub),
        Commands::Video(command) => run_video(&config, command).await,
    }
}

async fn run_video(config: &ClientConfig, command: VideoCommands) -> anyhow::Result<()> {
    let session = Session::resolve(config)?;
    let client = ApiClient::from_config(config, session)
        .context("Failed to create API client. Check VSTUDIO_API_URL (or API_URL)")?;

    match command {
        VideoCommands::List {
            status,
            limit,
            offset,
            format,
        } => {
            let query = ListVideosQuery {
                status,
                limit,
                offset,
            };
            let videos = client.list_videos(&query).await?;
            match format {
                OutputFormat::Json => print_json(&videos)?,
                OutputFormat::Table => print!("{}", render_video_table(&videos)),
            }
        }
        VideoCommands::Get { id } => {
            let video = client.get_video(&id).await?;
            show_video(&video)?;
        }
        VideoCommands::Upload { file } => {
            let video = client.upload_video(&file).await?;
            show_video(&video)?;
        }
        VideoCommands::Ingest { url, filename } => {
            let video = client.ingest_from_url(&url, filename.as_deref()).await?;
            show_video(&video)?;
        }
        VideoCommands::Update {
            id,
            fields,
            hashtags,
            language,
            thumbnail_prompt,
        } => {
            let patch = VideoPatch {
                hashtags,
                language,
                thumbnail_prompt,
                ..fields.into_patch()
            };
            client.update_video(&id, &patch).await?;
            show_video(&client.get_video(&id).await?)?;
        }
        VideoCommands::Delete { id, yes } => {
            if !confirm(&format!("Delete video {}?", id), yes)? {
                eprintln!("Cancelled");
                return Ok(());
            }
            client.delete_video(&id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Video {} deleted", id) }),
            )?;
        }
        VideoCommands::Captions { sub } => run_captions(&client, sub, config).await?,
        VideoCommands::Metadata {
            id,
            prompt,
            model,
            tone,
            hashtags,
            apply,
        } => {
            let request = GenerateMetadataRequest {
                prompt,
                model,
                tone,
                hashtags,
                ..GenerateMetadataRequest::for_video(id.clone())
            };
            let response = client.generate_metadata(&request).await?;
            print_json(&response)?;

            if apply {
                let patch = response.as_patch();
                if patch.is_empty() {
                    eprintln!("No suggestions to apply");
                } else {
                    client.update_video(&id, &patch).await?;
                }
                follow(&client, client.get_video(&id).await?, config).await?;
            } else {
                refresh(&client, &id, config).await?;
            }
        }
        VideoCommands::Confidentiality { id } => {
            let result = client.check_confidentiality(&id).await?;
            eprintln!("{}", result.summary_or_default());
            print_json(&result)?;
            refresh(&client, &id, config).await?;
        }
        VideoCommands::Youtube { sub } => run_youtube(&client, sub).await?,
        VideoCommands::Publish {
            id,
            fields,
            yes,
            watch,
        } => {
            let (video, status) = tokio::try_join!(client.get_video(&id), client.youtube_status())?;

            let Some(account) = status.connected_account() else {
                bail!("No YouTube account connected. Run `vstudio youtube connect` first");
            };
            if !video.status.accepts_publish() {
                bail!("Video {} cannot be published while {}", video.id, video.status);
            }

            if let Some(warning) = publish_warning(&video) {
                eprintln!("warning: {}", warning);
                if !confirm("Publish anyway?", yes)? {
                    eprintln!("Cancelled");
                    return Ok(());
                }
            }
            let prompt = format!(
                "Publish \"{}\" to {}?",
                video.display_title(),
                account.account().label()
            );
            if !confirm(&prompt, yes)? {
                eprintln!("Cancelled");
                return Ok(());
            }

            let mut request = PublishRequest::from_video(&video);
            fields.apply_to(&mut request);
            let response = client.publish(&account, &request).await?;
            print_json(&response)?;

            if watch {
                follow(&client, client.get_video(&id).await?, config).await?;
            } else {
                refresh_once(&client, &id).await?;
            }
        }
        VideoCommands::Watch { id } => {
            let video = client.get_video(&id).await?;
            follow(&client, video, config).await?;
        }
    }

    Ok(())
}

/// Print a video as JSON, with its failure message on stderr.
fn show_video(video: &Video) -> anyhow::Result<()> {
    report_failure(video);
    print_json(video)
}

/// Poll while the video is in a transient state, then print the final snapshot.
async fn follow(client: &ApiClient, video: Video, config: &ClientConfig) -> anyhow::Result<()> {
    let latest = settle(Arc::new(client.clone()), video, config.poll_interval()).await;
    show_video(&latest)
}

/// Re-read the video after an action whose own output is already on stdout.
/// Status lines and any failure message go to stderr.
async fn refresh(client: &ApiClient, id: &VideoId, config: &ClientConfig) -> anyhow::Result<()> {
    let video = client.get_video(id).await?;
    let latest = settle(Arc::new(client.clone()), video, config.poll_interval()).await;
    report_failure(&latest);
    Ok(())
}

async fn refresh_once(client: &ApiClient, id: &VideoId) -> anyhow::Result<()> {
    let video = client.get_video(id).await?;
    eprintln!("{}", status_line(&video));
    report_failure(&video);
    Ok(())
}

fn report_failure(video: &Video) {
    if let Some(message) = video.inline_error() {
        eprintln!("error: video {} failed: {}", video.id, message);
    }
}

async fn run_captions(
    client: &ApiClient,
    sub: CaptionCommands,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    match sub {
        CaptionCommands::Request {
            id,
            language,
            save,
            output,
        } => {
            let video = client.get_video(&id).await?;
            video.status.transition(&LifecycleEvent::CaptionRequested)?;

            let response = client.request_captions(&id, language.as_deref()).await?;
            let format = match response.captions_format {
                CaptionFormat::Srt => "srt",
                CaptionFormat::Text => "text",
            };
            eprintln!("Captions received ({})", format);

            match output {
                Some(path) => std::fs::write(&path, &response.captions)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None if !save => println!("{}", response.captions),
                None => {}
            }

            if save {
                let transcript = transcript_from_srt(&response.captions);
                client
                    .save_captions(&id, response.captions, Some(transcript))
                    .await?;
                follow(client, client.get_video(&id).await?, config).await?;
            } else {
                refresh(client, &id, config).await?;
            }
        }
        CaptionCommands::Save {
            id,
            file,
            transcript,
        } => {
            let captions = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let transcript = match transcript {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => transcript_from_srt(&captions),
            };
            client.save_captions(&id, captions, Some(transcript)).await?;
            show_video(&client.get_video(&id).await?)?;
        }
        CaptionCommands::Languages { video } => {
            let languages = load_languages(client).await;
            let existing = match video {
                Some(id) => client.get_video(&id).await?.existing_caption_languages(),
                None => Default::default(),
            };
            for language in &languages {
                let mark = if existing.contains(&language.code) {
                    "*"
                } else {
                    " "
                };
                println!("{} {:<6} {}", mark, language.code, language.name);
            }
        }
        CaptionCommands::Translate { id, languages, all } => {
            let video = client.get_video(&id).await?;
            if video.caption_text().is_none() {
                bail!("Request captions first to enable translation");
            }

            let supported = load_languages(client).await;
            let mut selection = LanguageSelection::new(
                supported,
                video.existing_caption_languages(),
                video.source_language(),
            );
            if all {
                selection.select_all();
            }
            for code in &languages {
                selection.select(code);
            }
            let targets = selection.to_translate();
            if targets.is_empty() {
                bail!("Nothing to translate: every selected language already has captions");
            }

            let response = client
                .translate_captions(&id, targets, selection.source())
                .await?;
            eprintln!("Added: {}", response.languages_added.join(", "));
            show_video(&client.get_video(&id).await?)?;
        }
    }
    Ok(())
}

/// Supported languages from the backend, or the built-in list when it is unreachable.
async fn load_languages(client: &ApiClient) -> Vec<Language> {
    match client.supported_languages().await {
        Ok(languages) if !languages.is_empty() => languages,
        Ok(_) => supported_languages(),
        Err(err) => {
            tracing::warn!(error = %err, "Falling back to built-in language list");
            supported_languages()
        }
    }
}

async fn run_youtube(client: &ApiClient, sub: YouTubeCommands) -> anyhow::Result<()> {
    match sub {
        YouTubeCommands::Status => {
            let status = client.youtube_status().await?;
            match status.connected_account() {
                Some(account) => eprintln!("Connected as {}", account.account().label()),
                None => eprintln!("Not connected"),
            }
            print_json(&status)?;
        }
        YouTubeCommands::Connect => {
            let auth_url = client.start_oauth().await?;
            eprintln!("Open this URL to authorize, then run `vstudio youtube callback <redirect-url>`:");
            println!("{}", auth_url);
        }
        YouTubeCommands::Callback { url } => {
            let params = if url.starts_with("http://") || url.starts_with("https://") {
                CallbackParams::from_url(&url)?
            } else {
                CallbackParams::from_query(&url)?
            };
            let outcome = client.complete_oauth(&params).await;
            eprintln!("{}", outcome.headline());
            eprintln!("{}", outcome.message());
            outcome.into_result()?;
        }
        YouTubeCommands::Disconnect { yes } => {
            if !confirm("Disconnect the YouTube account?", yes)? {
                eprintln!("Cancelled");
                return Ok(());
            }
            client.disconnect_youtube().await?;
            eprintln!("Disconnected");
        }
    }
    Ok(())
}

fn run_user(config: &ClientConfig, sub: UserCommands) -> anyhow::Result<()> {
    let path = &config.user_id_file;
    let session = match sub {
        UserCommands::Show => {
            let session = Session::resolve(config)?;
            println!("{}", session.user_id());
            return Ok(());
        }
        UserCommands::Set { user_id } => Session::new(user_id)?,
        UserCommands::Reset => Session::generate(),
    };

    session.save(path)?;
    tracing::info!(user_id = %session.user_id(), path = %path.display(), "Stored user id");
    println!("{}", session.user_id());
    if config.user_id.is_some() {
        eprintln!("warning: VSTUDIO_USER_ID is set and overrides the stored identifier");
    }
    Ok(())
}
