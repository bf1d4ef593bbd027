//! Interactive chat on the terminal.
//!
//! Plain lines are sent as messages; lines starting with `/` change the
//! filters or the session.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use alma_chat::{ChatController, EarPhoto, Message, MessageContent};
use alma_models::{Idr, UseCase};

use crate::render::{print_ear_analysis, print_response};

const HELP: &str = "\
/budget MIN MAX   budget range in IDR (0 = no bound)
/use-case U       listening-music, commuting, professional-audio, gaming,
                  fitness-sports, video-calls, noise-cancellation, studio-recording
/photo PATH       attach an ear photo
/clear-photo      detach the ear photo
/preview          show preview files for the photo and the annotated image
/analyze          measure the attached photo only
/reset            default filters
/new              start a new chat
/help             this text
/quit             leave";

#[derive(Debug, PartialEq)]
enum Command {
    Budget(Idr, Idr),
    UseCase(UseCase),
    Photo(PathBuf),
    ClearPhoto,
    Preview,
    Analyze,
    Reset,
    New,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let command = match (name, args.as_slice()) {
        ("budget", [min, max]) => Command::Budget(parse_amount(min)?, parse_amount(max)?),
        ("budget", _) => return Err(anyhow!("Usage: /budget MIN MAX")),
        ("use-case", [use_case]) => Command::UseCase(use_case.parse()?),
        ("use-case", _) => return Err(anyhow!("Usage: /use-case U")),
        ("photo", []) => return Err(anyhow!("Usage: /photo PATH")),
        // Paths may contain spaces.
        ("photo", path) => Command::Photo(PathBuf::from(path.join(" "))),
        ("clear-photo", []) => Command::ClearPhoto,
        ("preview", []) => Command::Preview,
        ("analyze", []) => Command::Analyze,
        ("reset", []) => Command::Reset,
        ("new", []) => Command::New,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => return Err(anyhow!("Unknown command /{}; try /help", line.trim())),
    };
    Ok(command)
}

fn parse_amount(text: &str) -> Result<Idr> {
    text.replace(['_', '.'], "")
        .parse()
        .map_err(|_| anyhow!("'{}' is not an amount in IDR", text))
}

pub async fn run(mut controller: ChatController) -> Result<()> {
    if let Err(e) = controller.check_service().await {
        warn!("{:#}", e);
        println!("{} The service did not answer the health check", "!".yellow());
    }

    if let Some(greeting) = controller.session().last_message() {
        print_message(greeting);
    }
    println!("{}", "Type /help for commands.".dimmed());
    println!("{}", controller.session().filters().summary().dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            match parse_command(command) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Err(e) = apply(&mut controller, command).await {
                        println!("{} {:#}", "✗".red(), e);
                    }
                }
                Err(e) => println!("{} {}", "✗".red(), e),
            }
            continue;
        }

        println!("{}", "Thinking...".dimmed());
        if let Some(reply) = controller.submit(line).await {
            print_message(reply);
        }
    }

    Ok(())
}

async fn apply(controller: &mut ChatController, command: Command) -> Result<()> {
    let session = controller.session_mut();
    match command {
        Command::Budget(min, max) => {
            session.set_min_budget(min);
            session.set_max_budget(max);
        }
        Command::UseCase(use_case) => session.set_use_case(use_case),
        Command::Photo(path) => session.set_ear_photo(Some(EarPhoto::load(&path)?)),
        Command::ClearPhoto => session.set_ear_photo(None),
        Command::Preview => {
            match session.ear_photo_preview()? {
                Some(path) => println!("Ear photo: {}", path.display()),
                None => println!("No ear photo attached"),
            }
            match session.annotated_image_preview()? {
                Some(path) => println!("Annotated: {}", path.display()),
                None => println!("No annotated image yet"),
            }
            return Ok(());
        }
        Command::Analyze => {
            match controller.analyze_ear_photo().await? {
                Some(analysis) => print_ear_analysis(&analysis),
                None => println!("Attach a photo first with /photo PATH"),
            }
            return Ok(());
        }
        Command::Reset => session.reset_filters(),
        Command::New => {
            session.new_chat();
            if let Some(greeting) = session.last_message() {
                print_message(greeting);
            }
        }
        Command::Help => {
            println!("{}", HELP);
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }

    println!("{}", controller.session().filters().summary().dimmed());
    Ok(())
}

fn print_message(message: &Message) {
    match &message.content {
        MessageContent::Text(text) => println!("{} {}", "ALMA:".bold().magenta(), text),
        MessageContent::Recommendation(response) => print_response(response),
        MessageContent::Error { text, .. } => println!("{} {}", "✗".red(), text.red()),
    }
}
