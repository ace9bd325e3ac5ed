//! Terminal chat client for the document querying API.
//!
//! Without a subcommand it opens an interactive session; the other
//! subcommands run one request and print the result.

use std::io::Write;

use clap::Parser;
use core_config::FromEnv;
use core_config::tracing::{init_cli_tracing, install_color_eyre};
use domain_chat::{ChatConfig, ChatSession, QueryingClient};
use domain_completion::CompletionMode;
use domain_querying::DocumentQuery;
use eyre::Result;
use tokio::io::BufReader;
use tracing::info;

mod cli;
mod render;
mod repl;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    init_cli_tracing(cli.log_filter());

    let config = cli.apply(ChatConfig::from_env()?);
    let client = QueryingClient::new(&config)?;
    let mode = CompletionMode::from(cli.mode);

    info!(
        api = config.urls.base_url(),
        mode = mode.as_str(),
        "Chat client configured"
    );

    match cli.command() {
        Command::Chat => {
            if !client.check_api_status().await {
                eprintln!(
                    "warning: no answer from {}; questions will fail until it is up",
                    config.urls.base_url()
                );
            }

            let mut session = ChatSession::new(config.greeting.clone());
            let input = BufReader::new(tokio::io::stdin());
            repl::run(&client, &mut session, mode, input, &mut std::io::stdout()).await?;
        }

        Command::Status => {
            let (api_up, key_valid) =
                tokio::join!(client.check_api_status(), client.check_openai_key());
            println!("{}", render::status(api_up, key_valid));
        }

        Command::Collections => {
            println!("{}", render::collections(&client.get_all_collections().await));
        }

        Command::Models => {
            println!("{}", render::models(&client.get_available_llms().await));
        }

        Command::Ask { question } => {
            let mut session = ChatSession::new(config.greeting.clone());
            let mut stdout = std::io::stdout();
            session
                .ask(&client, &question, mode, |text| {
                    let _ = write!(stdout, "{text}").and_then(|_| stdout.flush());
                })
                .await?;
            println!();
        }

        Command::Query {
            collection,
            question,
            model,
            top_k,
        } => {
            let mut query =
                DocumentQuery::new(collection, question).with_similarity_top_k(top_k);
            if let Some(model) = model {
                query = query.with_model(model);
            }

            let answer = client.query_collection(&query).await?;
            println!("{}", render::query_answer(&answer));
        }
    }

    Ok(())
}
