//! End-to-end tests for the sync loop and the summarizer with scripted model
//! and chat doubles. Loop tests run on Tokio's paused clock.

use async_trait::async_trait;
use echolink_agent::{ConversationEngine, LlmBackend, LlmClient};
use echolink_channels::{ChatClient, ChatMessage, TextNormalizer};
use echolink_core::{EchoLinkError, EchoLinkResult, Persona, Speaker, Stage};
use echolink_memory::{InMemoryMemoryStore, MemoryStore};
use echolink_outreach::{
    FollowUpTarget, MessageSyncLoop, OperatorContact, SchedulingLinkProvider, SessionSummarizer,
    TimingPolicy,
};
use echolink_session::{ConversationSession, SessionOutcome};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const CHANNEL: &str = "D-DANA";
const OPERATOR_CHANNEL: &str = "C-OPS";

// --- Scripted model ---

#[derive(Clone, Default)]
struct ScriptedModel {
    verdicts: Arc<Mutex<VecDeque<String>>>,
    replies: Arc<Mutex<VecDeque<EchoLinkResult<String>>>>,
    demo_answer: Arc<Mutex<Option<String>>>,
    summary: Arc<Mutex<Option<String>>>,
    classify_calls: Arc<AtomicU32>,
    generate_calls: Arc<AtomicU32>,
}

impl ScriptedModel {
    fn verdicts(self, vs: &[&str]) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .extend(vs.iter().map(|v| (*v).to_string()));
        self
    }

    fn replies(self, rs: &[&str]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .extend(rs.iter().map(|r| Ok((*r).to_string())));
        self
    }

    fn failing_reply(self) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(EchoLinkError::Http("400 Bad Request".into())));
        self
    }

    fn demo(self, answer: &str, summary: &str) -> Self {
        *self.demo_answer.lock().unwrap() = Some(answer.to_string());
        *self.summary.lock().unwrap() = Some(summary.to_string());
        self
    }

    fn client(&self) -> Arc<LlmClient> {
        Arc::new(LlmClient::from_backend(Box::new(self.clone())))
    }

    fn classify_calls(&self) -> u32 {
        self.classify_calls.load(Ordering::SeqCst)
    }

    fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedModel {
    async fn chat(&self, _system_prompt: Option<&str>, prompt: &str) -> EchoLinkResult<String> {
        let missing = || EchoLinkError::Agent("script exhausted".into());
        if prompt.contains("Only answer with a number") {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            return self.verdicts.lock().unwrap().pop_front().ok_or_else(missing);
        }
        if prompt.contains("Answer with only YES or NO") {
            return self.demo_answer.lock().unwrap().clone().ok_or_else(missing);
        }
        if prompt.contains("Write a concise summary") {
            return self.summary.lock().unwrap().clone().ok_or_else(missing);
        }
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(missing()))
    }
}

// --- Simulated direct channel ---

/// A channel log plus a professional who answers a fixed delay after each
/// agent message, until their script runs out.
///
/// The first `outages` fetches fail, and once `posts_left` runs out every
/// post to the direct channel is rejected.
#[derive(Clone)]
struct SimulatedChat {
    log: Arc<Mutex<Vec<(String, ChatMessage)>>>,
    last_agent_post: Arc<Mutex<Option<Instant>>>,
    script: Arc<Mutex<VecDeque<(Duration, String)>>>,
    fetches: Arc<AtomicU32>,
    outages: Arc<AtomicU32>,
    posts_left: Arc<Mutex<Option<u32>>>,
}

impl SimulatedChat {
    fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            last_agent_post: Arc::new(Mutex::new(None)),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fetches: Arc::new(AtomicU32::new(0)),
            outages: Arc::new(AtomicU32::new(0)),
            posts_left: Arc::new(Mutex::new(None)),
        }
    }

    fn unreachable_for(self, fetches: u32) -> Self {
        self.outages.store(fetches, Ordering::SeqCst);
        self
    }

    fn rejects_posts_after(self, posts: u32) -> Self {
        *self.posts_left.lock().unwrap() = Some(posts);
        self
    }

    fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn professional_answers(self, after: Duration, text: &str) -> Self {
        self.script.lock().unwrap().push_back((after, text.to_string()));
        self
    }

    fn preexisting(self, text: &str) -> Self {
        self.log
            .lock()
            .unwrap()
            .push((CHANNEL.to_string(), ChatMessage::from_professional(text)));
        self
    }

    fn posts_to(&self, channel: &str) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, m)| c == channel && m.from_agent)
            .map(|(_, m)| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatClient for SimulatedChat {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn lookup_user_id_by_email(&self, _email: &str) -> EchoLinkResult<Option<String>> {
        Ok(Some("U-DANA".into()))
    }

    async fn open_direct_channel(&self, _user_id: &str) -> EchoLinkResult<String> {
        Ok(CHANNEL.into())
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> EchoLinkResult<()> {
        if channel_id == CHANNEL {
            if let Some(left) = self.posts_left.lock().unwrap().as_mut() {
                if *left == 0 {
                    return Err(EchoLinkError::Channel("Slack API error: is_archived".into()));
                }
                *left -= 1;
            }
        }
        self.log
            .lock()
            .unwrap()
            .push((channel_id.to_string(), ChatMessage::from_agent(text)));
        if channel_id == CHANNEL {
            *self.last_agent_post.lock().unwrap() = Some(Instant::now());
        }
        Ok(())
    }

    async fn fetch_latest_messages(&self, channel_id: &str, limit: usize) -> Option<Vec<ChatMessage>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self
            .outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return None;
        }

        let last_post = *self.last_agent_post.lock().unwrap();
        let mut log = self.log.lock().unwrap();
        let agent_spoke_last = log
            .iter()
            .rev()
            .find(|(c, _)| c == channel_id)
            .is_some_and(|(_, m)| m.from_agent);

        if let (true, Some(posted)) = (agent_spoke_last, last_post) {
            let mut script = self.script.lock().unwrap();
            if let Some((after, _)) = script.front() {
                if posted.elapsed() >= *after {
                    let (_, text) = script.pop_front().unwrap();
                    log.push((channel_id.to_string(), ChatMessage::from_professional(text)));
                }
            }
        }

        Some(
            log.iter()
                .rev()
                .filter(|(c, _)| c == channel_id)
                .take(limit)
                .map(|(_, m)| m.clone())
                .collect(),
        )
    }
}

// --- Helpers ---

fn persona() -> Persona {
    Persona {
        name: "Sophia".into(),
        role: "product promoter".into(),
        team: "R&D".into(),
        conversation_type: "chat".into(),
        professional_name: "Dana".into(),
        purpose: "introduce the reporting product.".into(),
        talking_points: String::new(),
        stage_notes: Default::default(),
    }
}

fn sync_loop(model: &ScriptedModel, chat: &SimulatedChat) -> MessageSyncLoop {
    let mut engine = ConversationEngine::new(
        model.client(),
        ConversationSession::new("dana@example.com", persona()),
    );
    engine.seed();
    MessageSyncLoop::new(
        engine,
        Arc::new(chat.clone()),
        Arc::new(TextNormalizer::new().unwrap()),
        TimingPolicy::default(),
        CHANNEL,
    )
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

// --- Sync loop ---

#[tokio::test(start_paused = true)]
async fn test_silent_professional_is_unresponsive_once() {
    let model = ScriptedModel::default().replies(&["Hi Dana 👋"]);
    let chat = SimulatedChat::new();

    let report = sync_loop(&model, &chat).run().await;

    assert_eq!(report.outcome, SessionOutcome::Unresponsive);
    assert_eq!(report.replies_received, 0);
    assert!(report.elapsed > minutes(15));
    assert!(report.elapsed < minutes(15) + Duration::from_secs(10));
    assert_eq!(chat.posts_to(CHANNEL), vec!["Hi Dana 👋"]);
    // The sentinel was all the loop ever saw.
    assert_eq!(model.classify_calls(), 0);
    assert_eq!(model.generate_calls(), 1);
    assert_eq!(report.transcript.utterances.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_message_older_than_opening_is_ignored() {
    let model = ScriptedModel::default().replies(&["Hi Dana, quick intro from R&D"]);
    let chat = SimulatedChat::new().preexisting("I'm busy");

    let report = sync_loop(&model, &chat).run().await;

    assert_eq!(report.outcome, SessionOutcome::Unresponsive);
    assert_eq!(chat.posts_to(CHANNEL).len(), 1);
    assert_eq!(model.classify_calls(), 0);
    assert!(report.elapsed > minutes(15));
}

#[tokio::test(start_paused = true)]
async fn test_end_stage_completes_without_further_generation() {
    let model = ScriptedModel::default()
        .replies(&["Hi Dana!", "We have a new tool.", "What slows you down?", "A demo?"])
        .verdicts(&["2", "4", "7", "8"]);
    let chat = SimulatedChat::new()
        .professional_answers(Duration::from_secs(30), "Hi Sophia")
        .professional_answers(Duration::from_secs(30), "Tell me more")
        .professional_answers(Duration::from_secs(30), "Month-end close")
        .professional_answers(Duration::from_secs(30), "No thanks, all good");

    let report = sync_loop(&model, &chat).run().await;

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.replies_received, 4);
    assert_eq!(model.classify_calls(), 4);
    assert_eq!(model.generate_calls(), 4);
    assert_eq!(chat.posts_to(CHANNEL).len(), 4);
    assert_eq!(report.transcript.utterances.len(), 8);
    assert_eq!(report.transcript.final_stage, Stage::EndConversation);

    let speakers: Vec<Speaker> = report.transcript.utterances.iter().map(|u| u.speaker).collect();
    assert_eq!(speakers[0], Speaker::Agent);
    assert_eq!(speakers[7], Speaker::Professional);
}

#[tokio::test(start_paused = true)]
async fn test_quiet_after_replies_is_incomplete() {
    let model = ScriptedModel::default()
        .replies(&["Hi Dana!", "Great, what do you use today?"])
        .verdicts(&["2"]);
    let chat = SimulatedChat::new().professional_answers(minutes(2), "Hello");

    let report = sync_loop(&model, &chat).run().await;

    assert_eq!(report.outcome, SessionOutcome::Incomplete);
    assert_eq!(report.replies_received, 1);
    assert!(report.elapsed > minutes(30));
    assert_eq!(chat.posts_to(CHANNEL).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reply_after_hard_deadline_gets_final_answer() {
    let model = ScriptedModel::default()
        .replies(&["Hi Dana!", "How is the training going?", "Thanks, talk soon!"])
        .verdicts(&["4", "5"]);
    let chat = SimulatedChat::new()
        .professional_answers(minutes(10), "Hi, sorry, was in meetings")
        .professional_answers(minutes(16), "Training is fine");

    let report = sync_loop(&model, &chat).run().await;

    assert_eq!(report.outcome, SessionOutcome::Incomplete);
    assert_eq!(report.replies_received, 2);
    assert_eq!(chat.posts_to(CHANNEL).len(), 3);
    assert_eq!(model.generate_calls(), 3);
    assert!(report.elapsed >= minutes(25));
}

#[tokio::test(start_paused = true)]
async fn test_generation_failure_aborts_with_history_intact() {
    let model = ScriptedModel::default()
        .replies(&["Hi Dana!"])
        .failing_reply()
        .verdicts(&["3"]);
    let chat = SimulatedChat::new().professional_answers(Duration::from_secs(20), "Hi there");

    let report = sync_loop(&model, &chat).run().await;

    match &report.outcome {
        SessionOutcome::Aborted { reason } => assert!(reason.contains("400")),
        other => panic!("expected Aborted, got {other:?}"),
    }
    assert_eq!(report.transcript.utterances.len(), 2);
    assert_eq!(chat.posts_to(CHANNEL).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_outage_is_waited_out() {
    let model = ScriptedModel::default()
        .replies(&["Hi Dana!", "Glad to hear from you."])
        .verdicts(&["2"]);
    let chat = SimulatedChat::new()
        .professional_answers(Duration::from_secs(10), "Hi Sophia")
        .unreachable_for(6);

    let report = sync_loop(&model, &chat).run().await;

    // Six failed polls at 5s spacing, then the reply on the seventh.
    assert!(chat.fetches() >= 7);
    assert_eq!(report.outcome, SessionOutcome::Incomplete);
    assert_eq!(report.replies_received, 1);
    assert_eq!(model.classify_calls(), 1);
    assert_eq!(model.generate_calls(), 2);
    assert_eq!(
        chat.posts_to(CHANNEL),
        vec!["Hi Dana!", "Glad to hear from you."]
    );
    let texts: Vec<&str> = report.transcript.utterances.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts.len(), 3);
    assert!(texts[1].starts_with("Hi Sophia"));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_post_is_not_recorded() {
    let model = ScriptedModel::default()
        .replies(&["Hi Dana!", "Here is what's new."])
        .verdicts(&["2"]);
    let chat = SimulatedChat::new()
        .professional_answers(Duration::from_secs(20), "Hi")
        .rejects_posts_after(1);

    let report = sync_loop(&model, &chat).run().await;

    match &report.outcome {
        SessionOutcome::Aborted { reason } => assert!(reason.contains("is_archived")),
        other => panic!("expected Aborted, got {other:?}"),
    }
    assert_eq!(model.generate_calls(), 2);
    assert_eq!(chat.posts_to(CHANNEL), vec!["Hi Dana!"]);
    let speakers: Vec<Speaker> = report.transcript.utterances.iter().map(|u| u.speaker).collect();
    assert_eq!(speakers, vec![Speaker::Agent, Speaker::Professional]);
}

// --- Summarizer ---

struct FailingScheduler;

#[async_trait]
impl SchedulingLinkProvider for FailingScheduler {
    async fn create_single_use_booking_link(&self) -> EchoLinkResult<String> {
        Err(EchoLinkError::Scheduling("Calendly returned 500".into()))
    }
}

struct FixedScheduler;

#[async_trait]
impl SchedulingLinkProvider for FixedScheduler {
    async fn create_single_use_booking_link(&self) -> EchoLinkResult<String> {
        Ok("https://calendly.com/d/demo-123".into())
    }
}

fn finished_transcript() -> echolink_session::Transcript {
    let mut session = ConversationSession::new("dana@example.com", persona());
    session.push(echolink_core::Utterance::agent("Would you like a demo?"));
    session.push(echolink_core::Utterance::professional("Yes please"));
    session.freeze(SessionOutcome::Completed)
}

fn target() -> FollowUpTarget {
    FollowUpTarget {
        channel_id: CHANNEL.into(),
        first_name: "Dana".into(),
        last_name: "Lee".into(),
    }
}

fn operator() -> OperatorContact {
    OperatorContact {
        name: "Morgan".into(),
        channel_id: OPERATOR_CHANNEL.into(),
    }
}

#[tokio::test]
async fn test_scheduling_failure_still_sends_summary() {
    let model = ScriptedModel::default().demo("YES", "Dana asked for a demo.");
    let chat = SimulatedChat::new();
    let memory = Arc::new(InMemoryMemoryStore::new());

    let summarizer = SessionSummarizer::new(
        model.client(),
        Arc::new(chat.clone()),
        memory.clone(),
        operator(),
    )
    .with_scheduler(Arc::new(FailingScheduler));

    let report = summarizer.summarize(&finished_transcript(), &target()).await.unwrap();

    assert!(report.demo_interest);
    assert!(report.booking_link.is_none());
    assert!(chat.posts_to(CHANNEL).is_empty());
    assert_eq!(
        chat.posts_to(OPERATOR_CHANNEL),
        vec![
            "Hi Morgan, Below is the summary conversation happened with Dana Lee\n==========\nDana asked for a demo.\n==========="
        ]
    );
    assert_eq!(memory.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_demo_interest_sends_link_then_summary() {
    let model = ScriptedModel::default().demo(" yes.\n", "Demo wanted.");
    let chat = SimulatedChat::new();
    let memory = Arc::new(InMemoryMemoryStore::new());
    let transcript = finished_transcript();

    let summarizer = SessionSummarizer::new(
        model.client(),
        Arc::new(chat.clone()),
        memory.clone(),
        operator(),
    )
    .with_scheduler(Arc::new(FixedScheduler));

    let report = summarizer.summarize(&transcript, &target()).await.unwrap();

    assert_eq!(report.booking_link.as_deref(), Some("https://calendly.com/d/demo-123"));
    assert_eq!(
        chat.posts_to(CHANNEL),
        vec![
            "Below is the meeting link for demo Dana\n===========================================\n",
            "https://calendly.com/d/demo-123",
        ]
    );
    assert_eq!(chat.posts_to(OPERATOR_CHANNEL).len(), 1);
    assert_eq!(
        memory.render(Some(transcript.session_id)).await.unwrap(),
        "Sophia - Would you like a demo?\nDana - Yes please"
    );
}

#[tokio::test]
async fn test_non_yes_answer_skips_link() {
    let model = ScriptedModel::default().demo("Not really", "No demo.");
    let chat = SimulatedChat::new();

    let summarizer = SessionSummarizer::new(
        model.client(),
        Arc::new(chat.clone()),
        Arc::new(InMemoryMemoryStore::new()),
        operator(),
    )
    .with_scheduler(Arc::new(FixedScheduler));

    let report = summarizer.summarize(&finished_transcript(), &target()).await.unwrap();

    assert!(!report.demo_interest);
    assert!(report.booking_link.is_none());
    assert_eq!(report.summary.as_deref(), Some("No demo."));
    assert!(chat.posts_to(CHANNEL).is_empty());
}
