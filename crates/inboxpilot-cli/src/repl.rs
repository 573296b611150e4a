//! Subcommand: `inboxpilot run` — interactive REPL.
//!
//! A small command loop over the five email operations.  The `reply`
//! command drives the full confirmation-gated workflow: summarize, draft,
//! show the draft verbatim, and send only on an explicit yes.

use std::io::{self, Write as _};

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use inboxpilot_tools::workflow::{Decision, ReplyContext, ReplyWorkflow};
use inboxpilot_tools::{InboxAssistant, ToolSurface};

use crate::config::Config;
use crate::{build_generator, build_mailbox};

const HELP: &str = "\
  Commands:
    list [n]          list the n most recent inbox emails (default from config)
    search <query>    search emails with a mailbox query string
    summarize <id>    fetch an email and summarize it
    reply <id>        summarize, draft a reply, and send after confirmation
    help              show this help
    quit              exit";

/// Run the interactive REPL.
pub async fn cmd_run(config: &Config) -> Result<()> {
    info!("starting inboxpilot");

    // 1. Build collaborators from config and environment.
    let mailbox = build_mailbox(config);
    let generator = build_generator(config);
    let assistant = InboxAssistant::new("inboxpilot", mailbox, generator);

    // 2. Print startup banner.
    let health = assistant.health_check().await;
    println!();
    println!("  Inboxpilot v{}", env!("CARGO_PKG_VERSION"));
    println!("  Provider: {}", config.llm.provider);
    println!("  Model: {}", config.llm.model);
    println!("  Health: {health}");
    println!("  Type 'help' for commands, 'quit' to exit.");
    println!();

    // 3. Set up Ctrl+C handler.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n  Interrupted. Goodbye!");
            std::process::exit(0);
        }
    });

    // 4. REPL loop.  One workflow per session; a new reply resets it.
    let mut workflow = ReplyWorkflow::new();
    let stdin = io::stdin();
    let mut line_buf = String::new();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        line_buf.clear();
        match stdin.read_line(&mut line_buf) {
            Ok(0) => {
                println!();
                info!("EOF received, exiting");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Error reading input: {e}");
                continue;
            }
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed == "quit" || trimmed == "exit" {
            info!("user requested exit");
            break;
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command {
            "help" => println!("{HELP}"),
            "list" => {
                let count = rest
                    .parse::<u32>()
                    .unwrap_or(config.assistant.default_list_count);
                if workflow.begin_browsing().is_err() {
                    workflow.reset();
                    let _ = workflow.begin_browsing();
                }
                print_emails(&assistant.list_recent_emails(count).await);
            }
            "search" => {
                if rest.is_empty() {
                    println!("  Usage: search <query>");
                    continue;
                }
                if workflow.begin_browsing().is_err() {
                    workflow.reset();
                    let _ = workflow.begin_browsing();
                }
                print_emails(
                    &assistant
                        .search_emails(rest, config.assistant.default_list_count)
                        .await,
                );
            }
            "summarize" => {
                if rest.is_empty() {
                    println!("  Usage: summarize <id>");
                    continue;
                }
                let result = assistant.summarize_email(rest).await;
                if result["status"] == "success" {
                    println!("  Subject: {}", result["subject"].as_str().unwrap_or(""));
                    println!("  From:    {}", result["sender_email"].as_str().unwrap_or(""));
                    println!();
                    println!("  {}", result["summary"].as_str().unwrap_or(""));
                } else {
                    print_error(&result);
                }
            }
            "reply" => {
                if rest.is_empty() {
                    println!("  Usage: reply <id>");
                    continue;
                }
                if let Err(e) = run_reply_flow(&assistant, &mut workflow, rest, &stdin).await {
                    warn!(error = %e, "reply flow aborted");
                    println!("  Reply aborted: {e}");
                    workflow.reset();
                }
            }
            _ => println!("  Unknown command '{command}'. Type 'help' for commands."),
        }
    }

    println!("  Goodbye!");
    Ok(())
}

/// The confirmation-gated reply flow for one email.
///
/// The draft is shown verbatim before the confirmation prompt; anything
/// other than an explicit yes drops it without sending.
async fn run_reply_flow(
    assistant: &InboxAssistant,
    workflow: &mut ReplyWorkflow,
    email_id: &str,
    stdin: &io::Stdin,
) -> Result<()> {
    workflow.reset();

    // Summarize the email and carry its context into the workflow.
    let summarized = assistant.summarize_email(email_id).await;
    if summarized["status"] != "success" {
        print_error(&summarized);
        return Ok(());
    }
    let context = ReplyContext {
        subject: summarized["subject"].as_str().unwrap_or("").to_string(),
        body: summarized["original_body"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        sender_email: summarized["sender_email"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        thread_id: summarized["thread_id"].as_str().unwrap_or("").to_string(),
        original_message_id: summarized["original_message_id"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        references: summarized["references"].as_str().unwrap_or("").to_string(),
    };
    println!("  Summary: {}", summarized["summary"].as_str().unwrap_or(""));
    workflow.record_summary(context)?;

    // Draft the reply.
    let drafted = assistant
        .generate_reply(
            summarized["subject"].as_str().unwrap_or(""),
            summarized["original_body"].as_str().unwrap_or(""),
        )
        .await;
    if drafted["status"] != "success" {
        print_error(&drafted);
        workflow.reset();
        return Ok(());
    }
    workflow.record_draft(drafted["reply_body"].as_str().unwrap_or("").to_string())?;

    // Show the draft verbatim and ask.
    let draft = workflow.surface_draft()?;
    println!();
    println!("  --- Draft reply ---");
    println!("{draft}");
    println!("  -------------------");
    print!("  Send this reply? [yes/no] ");
    io::stdout().flush().ok();

    let mut response = String::new();
    stdin.read_line(&mut response)?;

    match workflow.resolve_confirmation(response.trim())? {
        Decision::Send(auth) => {
            let sent = assistant
                .send_reply(
                    &auth.context.sender_email,
                    &auth.context.subject,
                    &auth.draft,
                    &auth.context.thread_id,
                    &auth.context.original_message_id,
                    &auth.context.references,
                )
                .await;
            if sent["status"] == "success" {
                let message_id = sent["message_id"].as_str().unwrap_or("").to_string();
                println!("  Sent (message id: {message_id}).");
                workflow.record_sent(message_id)?;
            } else {
                print_error(&sent);
                workflow.record_send_failure()?;
            }
        }
        Decision::Declined => {
            println!("  Not sent; draft discarded.");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn print_emails(result: &Value) {
    if result["status"] != "success" {
        print_error(result);
        return;
    }
    let emails = result["emails"].as_array().cloned().unwrap_or_default();
    if emails.is_empty() {
        println!("  No messages found.");
        return;
    }
    for email in &emails {
        println!(
            "  {}  {}  {}",
            email["id"].as_str().unwrap_or(""),
            email["date"].as_str().unwrap_or(""),
            email["subject"].as_str().unwrap_or(""),
        );
        println!("      from {}", email["from"].as_str().unwrap_or(""));
    }
    println!("  ({} message{})", emails.len(), plural(emails.len()));
}

fn print_error(result: &Value) {
    println!(
        "  Error: {}",
        result["error_message"].as_str().unwrap_or("unknown error")
    );
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
