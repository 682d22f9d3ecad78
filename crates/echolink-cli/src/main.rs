mod config;

use clap::Parser;
use config::EchoLinkConfig;
use dialoguer::Input;
use echolink_agent::{ConversationEngine, LlmClient};
use echolink_channels::{ChatClient, SlackChannel, TextNormalizer};
use echolink_core::EchoLinkResult;
use echolink_memory::{FileMemoryStore, MemoryStore};
use echolink_outreach::{
    CalendlyClient, FollowUpTarget, DatasetRecordStore, MessageSyncLoop, PersonaTemplate,
    RecordStore, SessionSummarizer, TimingPolicy,
};
use echolink_session::{ConversationSession, FileTranscriptStore, TranscriptStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "echolink", about = "EchoLink — scripted Slack outreach to professionals")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "echolink.toml")]
    config: PathBuf,

    /// Professional to contact (repeatable). Prompted for when omitted.
    #[arg(short, long)]
    email: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

/// Everything a single outreach session needs, built once per run.
struct Outreach {
    records: DatasetRecordStore,
    llm: Arc<LlmClient>,
    chat: Arc<dyn ChatClient>,
    normalizer: Arc<TextNormalizer>,
    persona: PersonaTemplate,
    timing: TimingPolicy,
    transcripts: FileTranscriptStore,
    summarizer: SessionSummarizer,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = EchoLinkConfig::load(&cli.config).await?;

    let emails = if cli.email.is_empty() {
        vec![Input::<String>::new()
            .with_prompt("Professional's email")
            .interact_text()?]
    } else {
        cli.email
    };

    let outreach = build(config).await?;

    for email in emails {
        let email = email.trim().to_lowercase();
        if let Err(e) = outreach.run(&email).await {
            warn!(email = %email, error = %e, "Outreach failed, moving on");
            println!("✗ {email}: {e}");
        }
    }

    Ok(())
}

async fn build(config: EchoLinkConfig) -> anyhow::Result<Outreach> {
    let records = DatasetRecordStore::load(&config.dataset_path).await?;

    let llm = Arc::new(LlmClient::new(config.model)?);
    let summary_llm = match config.summary_model {
        Some(model) => Arc::new(LlmClient::new(model)?),
        None => llm.clone(),
    };

    let mut slack = SlackChannel::new(config.slack.bot_token);
    if let Some(base) = config.slack.api_base {
        slack = slack.with_api_base(base);
    }
    let chat: Arc<dyn ChatClient> = Arc::new(slack);

    let normalizer = Arc::new(TextNormalizer::with_shortcodes(config.shortcodes)?);
    let transcripts = FileTranscriptStore::new(config.data_dir.join("transcripts")).await?;
    let memory: Arc<dyn MemoryStore> =
        Arc::new(FileMemoryStore::new(config.data_dir.join("memory.jsonl")).await?);

    let mut summarizer = SessionSummarizer::new(summary_llm, chat.clone(), memory, config.operator);
    match config.calendly {
        Some(calendly) => {
            let mut client = CalendlyClient::new(calendly.api_key, calendly.event_type_uuid);
            if let Some(base) = calendly.api_base {
                client = client.with_api_base(base);
            }
            summarizer = summarizer.with_scheduler(Arc::new(client));
        }
        None => info!("Calendly not configured, demo links are disabled"),
    }

    Ok(Outreach {
        records,
        llm,
        chat,
        normalizer,
        persona: config.persona,
        timing: config.timing,
        transcripts,
        summarizer,
    })
}

impl Outreach {
    /// One professional, start to finish. Missing records and unknown Slack
    /// users are skipped, not errors.
    async fn run(&self, email: &str) -> EchoLinkResult<()> {
        let Some(record) = self.records.find_by_email(email) else {
            warn!(email = %email, "No dataset record for this email, skipping");
            println!("- {email}: not in dataset, skipped");
            return Ok(());
        };

        let user_id = match self.chat.lookup_user_id_by_email(email).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(email = %email, "No Slack user for this email, skipping");
                println!("- {email}: no Slack user, skipped");
                return Ok(());
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Slack user lookup failed, skipping");
                println!("- {email}: lookup failed, skipped");
                return Ok(());
            }
        };
        let channel_id = self.chat.open_direct_channel(&user_id).await?;

        let persona = self.persona.render(&record);
        let mut engine =
            ConversationEngine::new(self.llm.clone(), ConversationSession::new(email, persona));
        engine.seed();
        println!("→ Talking to {} {} ({email})", record.first_name, record.last_name);

        let report = MessageSyncLoop::new(
            engine,
            self.chat.clone(),
            self.normalizer.clone(),
            self.timing.clone(),
            channel_id.clone(),
        )
        .run()
        .await;

        println!(
            "  Conversation ended: {} after {} replies ({}s)",
            report.outcome,
            report.replies_received,
            report.elapsed.as_secs()
        );

        self.transcripts.save(&report.transcript).await?;

        let target = FollowUpTarget {
            channel_id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
        };
        let summary = self.summarizer.summarize(&report.transcript, &target).await?;

        println!(
            "  Demo interest: {}{}",
            if summary.demo_interest { "yes" } else { "no" },
            if summary.booking_link.is_some() { ", link sent" } else { "" }
        );
        println!(
            "  Summary {}",
            if summary.summary.is_some() { "sent to operator" } else { "not sent" }
        );
        info!(
            session_id = %report.transcript.session_id,
            outcome = report.outcome.as_str(),
            "Outreach finished"
        );
        Ok(())
    }
}
