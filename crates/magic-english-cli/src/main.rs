//! magic-english CLI — learning server and terminal front end.
//!
//! ```text
//! magic-english serve [--port 2004] [--host 127.0.0.1]
//! magic-english topics
//! magic-english vocab fruits
//! magic-english story "Space Adventure"
//! magic-english say "The cat is cute."
//! magic-english learn
//! ```
//!
//! Every command that talks to the model reads the API key from
//! `--api-key` or `GEMINI_API_KEY`.

use std::io::Write;
use std::sync::{Arc, Mutex};

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use magic_english_lib::content::ContentClient;
use magic_english_lib::gemini::GeminiClient;
use magic_english_lib::magic_english_core::session::{
    AppMode, FlashcardDeck, LoadState, Session, SpeechGuard,
};
use magic_english_lib::magic_english_core::text_prep::story_read_aloud;
use magic_english_lib::magic_english_core::types::{
    DEFAULT_BASE_URL, DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VOICE, GenAiConfig,
    STORY_THEMES, StoryContent, TOPICS, find_topic,
};
use magic_english_lib::gemini::GenerativeBackend;
use magic_english_lib::player::{AudioPlayer, Playback};
use magic_english_lib::server::{ApiState, router};
use magic_english_lib::speech::SpeechClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// magic-english — English flashcards and stories for young learners
#[derive(Parser)]
#[command(name = "magic-english", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API for the web front end
    Serve {
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[command(flatten)]
        genai: GenAiArgs,
    },
    /// List the menu topics and story themes
    Topics,
    /// Generate flashcards for a topic (id like `fruits`, or free text)
    Vocab {
        topic: String,
        #[command(flatten)]
        genai: GenAiArgs,
    },
    /// Generate a short story
    Story {
        topic: String,
        #[command(flatten)]
        genai: GenAiArgs,
    },
    /// Read text aloud through the default output device
    Say {
        text: String,
        #[command(flatten)]
        genai: GenAiArgs,
    },
    /// Interactive flashcards and stories in the terminal
    Learn {
        #[command(flatten)]
        genai: GenAiArgs,
    },
}

#[derive(Args)]
struct GenAiArgs {
    /// Generative backend API key
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,
    /// Backend base URL
    #[arg(long, env = "MAGIC_ENGLISH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Model for flashcards and stories
    #[arg(long, default_value = DEFAULT_TEXT_MODEL)]
    text_model: String,
    /// Model for speech
    #[arg(long, default_value = DEFAULT_SPEECH_MODEL)]
    speech_model: String,
    /// Prebuilt voice name
    #[arg(long, env = "MAGIC_ENGLISH_VOICE", default_value = DEFAULT_VOICE)]
    voice: String,
}

impl GenAiArgs {
    fn into_config(self) -> GenAiConfig {
        GenAiConfig {
            api_key: self.api_key,
            base_url: self.base_url,
            text_model: self.text_model,
            speech_model: self.speech_model,
            voice: self.voice,
        }
    }
}

/// Content and speech clients sharing one HTTP client.
struct Clients {
    content: ContentClient<GeminiClient>,
    speech: SpeechClient<GeminiClient>,
}

impl Clients {
    fn new(args: GenAiArgs) -> Result<Self, BoxError> {
        let config = args.into_config();
        let backend = GeminiClient::new(&config)?;
        Ok(Self {
            content: ContentClient::new(backend.clone(), config.text_model),
            speech: SpeechClient::new(backend, config.speech_model, config.voice),
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "magic_english=info,magic_english_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    match cli.command {
        Command::Serve { port, host, genai } => {
            let clients = Clients::new(genai)?;
            let app = router(ApiState {
                content: clients.content,
                speech: clients.speech,
            });

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("magic-english listening on {addr}");
            axum::serve(listener, app).await?;
        }

        Command::Topics => {
            for topic in TOPICS {
                println!("{:<8} {} {}", topic.id, topic.emoji, topic.label);
            }
            println!();
            for theme in STORY_THEMES {
                println!("story    📖 {theme}");
            }
        }

        Command::Vocab { topic, genai } => {
            let clients = Clients::new(genai)?;
            match load_vocabulary(&clients.content, resolve_topic(&topic)).await {
                LoadState::Loaded(deck) => {
                    for item in deck.cards() {
                        println!("{} {:<12} {:<16} {}", item.emoji, item.word, item.vietnamese, item.sentence);
                    }
                }
                LoadState::RetryPrompt(message) => println!("{message}"),
                LoadState::Loading => {}
            }
        }

        Command::Story { topic, genai } => {
            let clients = Clients::new(genai)?;
            match load_story(&clients.content, resolve_topic(&topic)).await {
                LoadState::Loaded(story) => print_story(&story),
                LoadState::RetryPrompt(message) => println!("{message}"),
                LoadState::Loading => {}
            }
        }

        Command::Say { text, genai } => {
            let clients = Clients::new(genai)?;
            match clients.speech.speak(&text).await {
                Some(audio) => {
                    AudioPlayer::new().play(&audio);
                    tokio::time::sleep(audio.duration()).await;
                }
                None => eprintln!("(no audio available)"),
            }
        }

        Command::Learn { genai } => {
            let clients = Clients::new(genai)?;
            learn(clients).await?;
        }
    }

    Ok(())
}

/// Topic ids map to their menu label; anything else is passed through.
fn resolve_topic(topic: &str) -> &str {
    find_topic(topic).map(|t| t.label).unwrap_or(topic)
}

/// Generate flashcards; failures are logged and become the retry prompt.
async fn load_vocabulary<B: GenerativeBackend>(
    content: &ContentClient<B>,
    topic: &str,
) -> LoadState<FlashcardDeck> {
    let result = content
        .generate_vocabulary(topic)
        .await
        .inspect_err(|e| error!("vocabulary {topic:?}: {e}"));
    LoadState::from_vocabulary(result)
}

async fn load_story<B: GenerativeBackend>(
    content: &ContentClient<B>,
    theme: &str,
) -> LoadState<StoryContent> {
    let result = content
        .generate_story(theme)
        .await
        .inspect_err(|e| error!("story {theme:?}: {e}"));
    LoadState::from_story(result)
}

fn print_story(story: &StoryContent) {
    println!("📖 {}\n", story.title);
    println!("{}\n", story.content);
    println!("Tóm tắt (Summary): {}", story.vietnamese_summary);
}

// ─── Interactive session ──────────────────────────────────────────────────

struct Terminal {
    lines: Lines<BufReader<Stdin>>,
    clients: Clients,
    player: AudioPlayer,
    speech_guard: Arc<Mutex<SpeechGuard>>,
}

async fn learn(clients: Clients) -> Result<(), BoxError> {
    let mut term = Terminal {
        lines: BufReader::new(tokio::io::stdin()).lines(),
        clients,
        player: AudioPlayer::new(),
        speech_guard: Arc::new(Mutex::new(SpeechGuard::default())),
    };
    let mut session = Session::default();

    loop {
        match session.mode {
            AppMode::Menu => {
                print_menu();
                let Some(choice) = term.read_command().await? else {
                    return Ok(());
                };
                if choice == "q" {
                    return Ok(());
                }
                match parse_menu_choice(&choice) {
                    Some((mode, topic)) => session.navigate(mode, Some(topic)),
                    None => println!("?"),
                }
            }
            AppMode::Flashcards => {
                let topic = session.selected_topic.clone().unwrap_or_default();
                term.flashcards(&topic).await?;
                session.back_to_menu();
            }
            AppMode::Story => {
                let topic = session.selected_topic.clone().unwrap_or_default();
                term.story(&topic).await?;
                session.back_to_menu();
            }
        }
    }
}

fn print_menu() {
    println!("\n✨ Magic English ✨");
    for (i, topic) in TOPICS.iter().enumerate() {
        println!("  {}. {} {}", i + 1, topic.emoji, topic.label);
    }
    for (i, theme) in STORY_THEMES.iter().enumerate() {
        println!("  s{}. 📖 {theme}", i + 1);
    }
    println!("  q. Thoát (Exit)");
}

/// `3` → flashcards for the third topic, `s1` → the first story theme.
fn parse_menu_choice(choice: &str) -> Option<(AppMode, &'static str)> {
    if let Some(n) = choice.strip_prefix('s') {
        let idx = n.parse::<usize>().ok()?.checked_sub(1)?;
        return STORY_THEMES.get(idx).map(|theme| (AppMode::Story, *theme));
    }
    let idx = choice.parse::<usize>().ok()?.checked_sub(1)?;
    TOPICS.get(idx).map(|topic| (AppMode::Flashcards, topic.label))
}

impl Terminal {
    async fn read_command(&mut self) -> std::io::Result<Option<String>> {
        print!("> ");
        std::io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_lowercase()))
    }

    async fn flashcards(&mut self, topic: &str) -> Result<(), BoxError> {
        loop {
            println!("Đang tạo thẻ học... (Creating magic flashcards...)");
            let mut deck = match load_vocabulary(&self.clients.content, topic).await {
                LoadState::Loaded(deck) => deck,
                LoadState::RetryPrompt(message) => {
                    if self.offer_retry(message).await? {
                        continue;
                    }
                    return Ok(());
                }
                LoadState::Loading => continue,
            };

            self.show_card(&deck).await;
            loop {
                println!("[n] next  [p] prev  [f] flip  [s] speak  [b] back");
                let Some(cmd) = self.read_command().await? else {
                    return Ok(());
                };
                match cmd.as_str() {
                    "" | "n" => deck.next(),
                    "p" => deck.prev(),
                    "f" => {
                        deck.flip();
                        print_card(&deck);
                        continue;
                    }
                    "s" => {
                        self.say(&deck.current().word).await;
                        continue;
                    }
                    "b" => return Ok(()),
                    _ => continue,
                }
                self.show_card(&deck).await;
            }
        }
    }

    /// Show the retry prompt; true when the child asks to try again.
    async fn offer_retry(&mut self, message: &str) -> std::io::Result<bool> {
        println!("{message}  [r] Thử lại (Retry)  [b] Quay lại (Back)");
        Ok(self.read_command().await?.as_deref() == Some("r"))
    }

    async fn show_card(&self, deck: &FlashcardDeck) {
        print_card(deck);
        self.say(&deck.current().word).await;
    }

    async fn story(&mut self, theme: &str) -> Result<(), BoxError> {
        loop {
            println!("Đang viết chuyện cổ tích... (Writing a magical story...)");
            let story = match load_story(&self.clients.content, theme).await {
                LoadState::Loaded(story) => story,
                LoadState::RetryPrompt(message) => {
                    if self.offer_retry(message).await? {
                        continue;
                    }
                    return Ok(());
                }
                LoadState::Loading => continue,
            };

            print_story(&story);
            loop {
                println!("[r] Đọc Cho Bé (Read aloud)  [n] Truyện Mới (New story)  [b] back");
                match self.read_command().await?.as_deref() {
                    Some("r") => self.say(&story_read_aloud(&story)).await,
                    // New story: re-fetch in place for the same theme.
                    Some("n") => break,
                    Some("b") | None => return Ok(()),
                    _ => {}
                }
            }
        }
    }

    async fn say(&self, text: &str) {
        let outcome = say_guarded(&self.clients.speech, &self.player, &self.speech_guard, text).await;
        if outcome == SayOutcome::Busy {
            println!("(Đang Đọc... still reading)");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SayOutcome {
    Played,
    NoAudio,
    Busy,
}

/// Speak through the single-flight guard; overlapping requests are dropped.
async fn say_guarded<B, P>(
    speech: &SpeechClient<B>,
    player: &P,
    guard: &Arc<Mutex<SpeechGuard>>,
    text: &str,
) -> SayOutcome
where
    B: GenerativeBackend,
    P: Playback,
{
    if lock_guard(guard).begin().is_err() {
        return SayOutcome::Busy;
    }

    let audio = speech.speak(text).await;
    lock_guard(guard).resolved(audio.is_some());

    let Some(audio) = audio else {
        return SayOutcome::NoAudio;
    };
    player.play(&audio);
    let guard = guard.clone();
    let duration = audio.duration();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        lock_guard(&guard).finished();
    });
    SayOutcome::Played
}

fn lock_guard(guard: &Mutex<SpeechGuard>) -> std::sync::MutexGuard<'_, SpeechGuard> {
    guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn print_card(deck: &FlashcardDeck) {
    let (pos, total) = deck.position();
    let card = deck.current();
    if deck.is_flipped() {
        println!("[{pos}/{total}] {} {} — {}", card.emoji, card.word, card.vietnamese);
        println!("        \"{}\"", card.sentence);
    } else {
        println!("[{pos}/{total}] {}  {}", card.emoji, card.word);
    }
}
