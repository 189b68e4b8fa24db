//! Line-based chat loop.

use std::io::Write as _;
use std::sync::{Arc, Weak};

use anyhow::{Context, Result};
use smartie_core::{Origin, TranscriptEvent};
use smartie_session::{IgnoreReason, Session, SubmitOutcome};
use smartie_voice::SpeakOutcome;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;

use crate::commands::{HELP, ReplCommand};
use crate::presentation::format_message;

type Input = Lines<BufReader<Stdin>>;

enum Flow {
    Continue,
    Quit,
}

/// Run the prompt until `/quit` or end of input.
pub async fn run(session: Arc<Session>) -> Result<()> {
    session.spawn_voice_bridge();
    let printer = spawn_voice_printer(&session);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let identity = session.identity();
    println!("Hi {}! Type /help for commands.", identity.display_name);
    let restored = session.transcript();
    if !restored.is_empty() {
        println!("Restored {} messages, /history to show them.", restored.len());
    }

    loop {
        prompt();
        let Some(line) = input.next_line().await.context("Failed to read input")? else {
            break;
        };
        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if matches!(execute(&session, command, &mut input).await?, Flow::Quit) {
            break;
        }
    }

    printer.abort();
    session.shutdown();
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

async fn execute(session: &Session, command: ReplCommand, input: &mut Input) -> Result<Flow> {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Ask(question) => ask(session, &question).await,
        ReplCommand::Rename(name) => match session.rename(&name) {
            Ok(identity) => println!("You are now {}.", identity.display_name),
            Err(e) => println!("{e}"),
        },
        ReplCommand::Avatar(avatar) => match session.set_avatar(&avatar) {
            Ok(identity) => println!("Avatar set to {}.", identity.avatar_ref),
            Err(e) => println!("{e}"),
        },
        ReplCommand::Theme(theme) => {
            session.set_theme(theme);
            println!("Theme set to {}.", theme.id());
        }
        ReplCommand::Font(font) => {
            session.set_font_size(font);
            println!("Font size set to {}.", font.id());
        }
        ReplCommand::Window(window) => {
            session.set_window_size(window);
            println!("Window size set to {}.", window.id());
        }
        ReplCommand::History => {
            let name = session.identity().display_name;
            let transcript = session.transcript();
            if transcript.is_empty() {
                println!("The transcript is empty.");
            }
            for (index, message) in transcript.iter().enumerate() {
                println!("{}", format_message(index, message, &name));
            }
        }
        ReplCommand::Speak(index) => match session.speak_message(index).await {
            Ok(SpeakOutcome::Playing) => println!("Speaking [{index}]."),
            Ok(SpeakOutcome::NothingToSay) => println!("[{index}] has nothing to say aloud."),
            Err(e) => println!("{e}"),
        },
        ReplCommand::Stop => {
            if !session.stop_speaking() {
                println!("Nothing is playing.");
            }
        }
        ReplCommand::Listen => match session.start_listening() {
            Ok(()) => println!("Listening..."),
            Err(e) => println!("{e}"),
        },
        ReplCommand::Clear => {
            print!("Delete the whole transcript? [y/N] ");
            let _ = std::io::stdout().flush();
            let answer = input.next_line().await.context("Failed to read input")?;
            if answer.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")) {
                session.clear_transcript();
                println!("Transcript cleared.");
            }
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn ask(session: &Session, question: &str) {
    println!("Thinking...");
    match session.submit(question, Origin::Typed).await {
        SubmitOutcome::Answered { index } | SubmitOutcome::Failed { index } => {
            if let Some(message) = session.transcript().get(index) {
                println!("{}", format_message(index, message, ""));
            }
        }
        SubmitOutcome::Ignored {
            reason: IgnoreReason::Busy,
        } => println!("Still waiting for the previous answer."),
        SubmitOutcome::Ignored {
            reason: IgnoreReason::Blank,
        } => {}
        SubmitOutcome::Discarded => println!("The answer arrived after the transcript was cleared."),
    }
}

/// Print spoken turns, which arrive through the voice bridge rather than the
/// prompt.
fn spawn_voice_printer(session: &Arc<Session>) -> JoinHandle<()> {
    let mut events = session.subscribe_transcript();
    let weak: Weak<Session> = Arc::downgrade(session);

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(session) = weak.upgrade() else {
                break;
            };
            match event {
                TranscriptEvent::Appended { index, message } if message.is_voice_origin => {
                    let name = session.identity().display_name;
                    println!("\n{}", format_message(index, &message, &name));
                }
                TranscriptEvent::Resolved { index, message } => {
                    let voice_turn = index
                        .checked_sub(1)
                        .and_then(|i| session.transcript().get(i).map(|m| m.is_voice_origin))
                        .unwrap_or(false);
                    if voice_turn {
                        println!("{}", format_message(index, &message, ""));
                        prompt();
                    }
                }
                _ => {}
            }
        }
    })
}
