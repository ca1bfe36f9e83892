use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use client_core::{load_settings, ChatSession, HttpApiClient, InboundReply, OutboundRequest};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod view;

use view::TerminalView;

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the SalyqAI tax assistant")]
struct Args {
    /// Settings file; defaults to ./client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    locale: Option<String>,
    #[arg(long)]
    no_greeting: bool,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, PartialEq)]
enum LineOutcome {
    Send(OutboundRequest),
    Rejected(&'static str),
    Idle,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }

    let client = HttpApiClient::from_settings(&settings).context("invalid api endpoints")?;
    match client.health().await {
        Ok(health) if health.is_up() => {
            info!(url = %client.endpoints().health, "startup: service is up")
        }
        Ok(health) => {
            warn!(status = %health.status, "startup: service reports unhealthy status")
        }
        Err(err) => warn!(error = %err, "startup: health probe failed"),
    }

    let mut session = ChatSession::from_settings(&settings);
    if !args.no_greeting {
        if let Some(greeting) = settings.greeting() {
            session.greet(greeting);
        }
    }

    let mut view = TerminalView::default();
    view.render(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<InboundReply>();

    loop {
        tokio::select! {
            Some(reply) = reply_rx.recv() => {
                session.complete(reply);
                view.render(&session);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if line.trim_start().starts_with("/calc") {
                    view.forget_inline_error();
                }
                match handle_line(&mut session, &line) {
                    LineOutcome::Send(request) => {
                        let api = client.clone();
                        let reply_tx = reply_tx.clone();
                        tokio::spawn(async move {
                            let reply = request.dispatch(&api).await;
                            if reply_tx.send(reply).is_err() {
                                warn!("shell: reply dropped after shutdown");
                            }
                        });
                    }
                    LineOutcome::Rejected(reason) => println!("[!] {reason}"),
                    LineOutcome::Idle => {}
                    LineOutcome::Quit => break,
                }
                view.render(&session);
            }
        }
    }

    if session.request_in_flight() {
        info!("shutdown: waiting for the pending reply");
        if let Some(reply) = reply_rx.recv().await {
            session.complete(reply);
            view.render(&session);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Maps one input line onto the session. Rejections never queue anything.
fn handle_line(session: &mut ChatSession, line: &str) -> LineOutcome {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match command {
        "/quit" => LineOutcome::Quit,
        "/cancel" => {
            if session.cancel_form() {
                LineOutcome::Idle
            } else {
                LineOutcome::Rejected("no open form to cancel")
            }
        }
        "/calc" => {
            let in_flight = session.request_in_flight();
            let Some((revenue, months_worked)) = split_calc_args(rest) else {
                return LineOutcome::Rejected("usage: /calc <revenue> <months worked>");
            };
            match session.submit_form(&revenue, months_worked) {
                Some(request) => LineOutcome::Send(request),
                None if in_flight => LineOutcome::Rejected("a request is already in flight"),
                None if !session.form().is_active() => {
                    LineOutcome::Rejected("no calculation form is open")
                }
                None => LineOutcome::Idle,
            }
        }
        _ => match session.submit_user_message(line) {
            Some(request) => LineOutcome::Send(request),
            None if line.is_empty() => LineOutcome::Idle,
            None if session.form().is_active() => {
                LineOutcome::Rejected("chat input is disabled while the calculation form is open")
            }
            None => LineOutcome::Rejected("waiting for the assistant to reply"),
        },
    }
}

/// The last token is months worked; everything before it is the revenue,
/// which may contain grouping spaces.
fn split_calc_args(rest: &str) -> Option<(String, &str)> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let (months_worked, revenue) = tokens.split_last()?;
    if revenue.is_empty() {
        return None;
    }
    Some((revenue.join(" "), *months_worked))
}

#[cfg(test)]
mod tests {
    use client_core::{FormInput, FormPhase};
    use shared::protocol::ChatTurnResponse;

    use super::*;

    fn session_with_open_form() -> ChatSession {
        let mut session = ChatSession::default();
        session.submit_user_message("calc").expect("request");
        session.complete(InboundReply::Chat(Ok(ChatTurnResponse::ShowCalculationForm {
            text: "form".into(),
        })));
        session
    }

    #[test]
    fn calc_args_keep_grouped_revenue() {
        assert_eq!(
            split_calc_args("1 500 000 3"),
            Some(("1 500 000".to_string(), "3"))
        );
        assert_eq!(split_calc_args("3"), None);
        assert_eq!(split_calc_args(""), None);
    }

    #[test]
    fn plain_text_starts_chat_turn() {
        let mut session = ChatSession::default();
        assert_eq!(
            handle_line(&mut session, "  hello "),
            LineOutcome::Send(OutboundRequest::Chat {
                message: "hello".into()
            })
        );
        assert_eq!(
            handle_line(&mut session, "again"),
            LineOutcome::Rejected("waiting for the assistant to reply")
        );
    }

    #[test]
    fn chat_is_rejected_while_form_open() {
        let mut session = session_with_open_form();
        assert!(matches!(
            handle_line(&mut session, "hello"),
            LineOutcome::Rejected(_)
        ));
    }

    #[test]
    fn calc_command_submits_form() {
        let mut session = session_with_open_form();
        assert_eq!(
            handle_line(&mut session, "/calc 100 000 3"),
            LineOutcome::Send(OutboundRequest::Calculate(FormInput {
                revenue: 100_000.0,
                months_worked: 3
            }))
        );
        assert_eq!(session.form().phase(), FormPhase::Submitting);
        assert_eq!(
            handle_line(&mut session, "/calc 1 1"),
            LineOutcome::Rejected("a request is already in flight")
        );
    }

    #[test]
    fn invalid_calc_stays_idle_with_inline_error() {
        let mut session = session_with_open_form();
        assert_eq!(handle_line(&mut session, "/calc 100 9"), LineOutcome::Idle);
        assert!(session.form().inline_error().is_some());
    }

    #[test]
    fn cancel_closes_form() {
        let mut session = session_with_open_form();
        assert_eq!(handle_line(&mut session, "/cancel"), LineOutcome::Idle);
        assert!(!session.form().is_active());
        assert_eq!(
            handle_line(&mut session, "/cancel"),
            LineOutcome::Rejected("no open form to cancel")
        );
    }

    #[test]
    fn view_reports_changes_once() {
        let mut session = session_with_open_form();
        let mut view = TerminalView::default();

        let first = view.changes(&session);
        assert!(first.iter().any(|line| line == view::FORM_HINT));
        assert!(first.iter().any(|line| line.starts_with("[disclaimer]")));
        assert!(view.changes(&session).is_empty());
    }
}
