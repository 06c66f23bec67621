use std::sync::Arc;

use dotenv::dotenv;
use lms_tutor_bot::assistant::completion::HttpCompletion;
use lms_tutor_bot::assistant::{Assistant, AssistantSession};
use lms_tutor_bot::dialogue::session::{typing_delay, TutorSession};
use lms_tutor_bot::settings::Settings;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, ChatId, KeyboardButton, KeyboardMarkup, KeyboardRemove},
};

type BotDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type CourseAssistant = Assistant<HttpCompletion>;

/// One chat is one widget. Leaving a mode drops its session.
#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveModeChoice,
    Tutor {
        session: TutorSession,
    },
    Assistant {
        session: AssistantSession,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    info!("Starting LMS tutor bot...");

    let settings = match Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    debug!("Loaded settings: {:?}", settings);

    let assistant: Arc<CourseAssistant> = Arc::new(match &settings.assistant {
        Some(config) => match HttpCompletion::new(config) {
            Ok(backend) => Assistant::new(backend, config),
            Err(err) => {
                warn!("Could not build completion client, answering locally: {}", err);
                Assistant::offline()
            }
        },
        None => {
            info!("ASSISTANT_API_KEY is not set, the course assistant will answer locally");
            Assistant::offline()
        }
    });

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(
                dptree::filter(|msg: Message| {
                    HostCommand::of(&msg) == Some(HostCommand::Start)
                })
                .endpoint(start),
            )
            .branch(
                dptree::filter(|msg: Message| {
                    HostCommand::of(&msg) == Some(HostCommand::Menu)
                })
                .endpoint(show_menu),
            )
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveModeChoice].endpoint(receive_mode_choice))
            .branch(dptree::case![State::Tutor { session }].endpoint(tutor_turn))
            .branch(dptree::case![State::Assistant { session }].endpoint(assistant_turn)),
    )
    .dependencies(dptree::deps![
        InMemStorage::<State>::new(),
        settings,
        assistant
    ])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

/// Commands the host handles itself in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostCommand {
    Start,
    Menu,
    Reset,
}

impl HostCommand {
    /// Accepts the bare command or the `/command@botname` form Telegram sends in groups.
    fn parse(text: &str) -> Option<Self> {
        let command = text.split_whitespace().next()?;
        let command = command.split('@').next().unwrap_or(command);
        match command {
            "/start" => Some(HostCommand::Start),
            "/menu" => Some(HostCommand::Menu),
            "/reset" => Some(HostCommand::Reset),
            _ => None,
        }
    }

    fn of(msg: &Message) -> Option<Self> {
        msg.text().and_then(Self::parse)
    }
}

const TUTOR_MODE: &str = "Study tutor";
const ASSISTANT_MODE: &str = "Course assistant";

const GREETING_TEXT: &str = "Hi! I'm your learning assistant. \
    Pick the study tutor to revise and take quizzes, or the course assistant for questions \
    about your courses. Send /menu at any time to switch.";

fn mode_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(TUTOR_MODE),
        KeyboardButton::new(ASSISTANT_MODE),
    ]])
}

async fn start(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(mode_keyboard())
        .await?;
    dialogue.update(State::ReceiveModeChoice).await?;
    Ok(())
}

async fn show_menu(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "What would you like to do?")
        .reply_markup(mode_keyboard())
        .await?;
    dialogue.update(State::ReceiveModeChoice).await?;
    Ok(())
}

async fn receive_mode_choice(
    bot: Bot,
    dialogue: BotDialogue,
    msg: Message,
    assistant: Arc<CourseAssistant>,
) -> HandlerResult {
    match msg.text() {
        Some(TUTOR_MODE) => {
            bot.send_message(
                msg.chat.id,
                "Study tutor here! Ask about cardiovascular, pathology, pharmacology or ethics, \
                 your schedule or deadlines. Say \"quiz me\" to practise and \"stop quiz\" to finish.",
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
            dialogue
                .update(State::Tutor {
                    session: TutorSession::new(),
                })
                .await?;
        }
        Some(ASSISTANT_MODE) => {
            bot.send_message(
                msg.chat.id,
                "Course assistant here! Ask me about your courses, grades, assignments or schedule.",
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
            dialogue
                .update(State::Assistant {
                    session: assistant.open_session(),
                })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please choose one of the options")
                .reply_markup(mode_keyboard())
                .await?;
        }
    }
    Ok(())
}

async fn tutor_turn(
    bot: Bot,
    dialogue: BotDialogue,
    mut session: TutorSession,
    msg: Message,
    settings: Arc<Settings>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send me your question as text")
            .await?;
        return Ok(());
    };

    if HostCommand::parse(text) == Some(HostCommand::Reset) {
        session.reset();
        bot.send_message(msg.chat.id, "Starting over. What would you like to study?")
            .await?;
        dialogue.update(State::Tutor { session }).await?;
        return Ok(());
    }

    let mut rng = StdRng::from_entropy();
    let Some(submission) = session.submit(text, &mut rng) else {
        return Ok(());
    };
    debug!("Tutor turn in chat {:?}: {:?}", msg.chat.id, submission.kind);
    // Keep the turn even if one of the sends below fails
    dialogue
        .update(State::Tutor {
            session: session.clone(),
        })
        .await?;

    show_typing(&bot, msg.chat.id).await;
    tokio::time::sleep(typing_delay(&settings.timing, &mut rng)).await;
    if let Some(reply) = session.deliver(submission.reply) {
        bot.send_message(msg.chat.id, reply).await?;
    }

    if let Some(scheduled) = submission.next_question {
        tokio::time::sleep(settings.timing.quiz_question_delay).await;
        if let Some(question) = session.ask_scheduled(scheduled, &mut rng) {
            bot.send_message(msg.chat.id, question).await?;
        }
    }

    dialogue.update(State::Tutor { session }).await?;
    Ok(())
}

async fn assistant_turn(
    bot: Bot,
    dialogue: BotDialogue,
    mut session: AssistantSession,
    msg: Message,
    assistant: Arc<CourseAssistant>,
    settings: Arc<Settings>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send me your question as text")
            .await?;
        return Ok(());
    };

    show_typing(&bot, msg.chat.id).await;
    if session.using_fallback() {
        // Local answers are instant, so pretend to type for a moment
        tokio::time::sleep(settings.timing.typing_delay_min).await;
    }

    let mut rng = StdRng::from_entropy();
    let lines = assistant.reply(&mut session, text, &mut rng).await;
    dialogue.update(State::Assistant { session }).await?;

    for line in lines {
        bot.send_message(msg.chat.id, line).await?;
    }
    Ok(())
}

async fn show_typing(bot: &Bot, chat_id: ChatId) {
    if let Err(err) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        debug!("Typing indicator failed in chat {:?}: {}", chat_id, err);
    }
}
