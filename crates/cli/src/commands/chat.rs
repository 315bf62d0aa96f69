//! Chat command handler.
//!
//! Interactive loop over a single store: every line is a question unless it
//! starts with one of the slash commands below. New conversation entries are
//! printed as the store records them.

use super::{build_store, format_sources};
use clap::Args;
use portaria_core::{config::AppConfig, AppResult};
use portaria_render::{format_and_render, format_portaria_id, truncate_text};
use portaria_store::{ConversationEntry, PortariaStore, Role};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Comandos: /fontes, /doc <id>, /busca <termo>, /limpar, /ajuda, /sair";

/// Interactive conversation with the assistant
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Print answers as sanitized HTML instead of markdown
    #[arg(long)]
    pub html: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Question(&'a str),
    Sources,
    Document(&'a str),
    Search(&'a str),
    Clear,
    Help,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Question(line);
    }

    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match command {
        "/fontes" => ChatInput::Sources,
        "/doc" if !rest.is_empty() => ChatInput::Document(rest),
        "/busca" if !rest.is_empty() => ChatInput::Search(rest),
        "/limpar" => ChatInput::Clear,
        "/sair" | "/quit" => ChatInput::Quit,
        _ => ChatInput::Help,
    }
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive chat");

        let store = build_store(config)?;
        let mut printed = 0;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{}", HELP);
        while let Some(line) = lines.next_line().await? {
            match parse_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break,
                ChatInput::Help => println!("{}", HELP),
                ChatInput::Question(question) => {
                    store.submit_question(question).await;
                    printed = self.print_new_entries(&store, printed);
                }
                ChatInput::Sources => {
                    let sources = store.latest_sources();
                    if sources.is_empty() {
                        println!("Nenhuma fonte ainda.");
                    } else {
                        println!("{}", format_sources(&sources));
                    }
                }
                ChatInput::Document(id) => match store.fetch_document(id).await {
                    Some(document) => {
                        println!("{} [{}]\n", document.title, format_portaria_id(&document.id));
                        println!("{}", document.content);
                    }
                    None => {
                        let error = store.snapshot().fetch.error.unwrap_or_default();
                        println!("{}", error);
                    }
                },
                ChatInput::Search(query) => {
                    store.perform_search(query).await;
                    self.print_search(&store);
                }
                ChatInput::Clear => {
                    store.clear_selection();
                    println!("Seleção limpa.");
                }
            }
        }

        tracing::info!(
            "Chat finished after {} conversation entries",
            store.snapshot().conversation.len()
        );
        Ok(())
    }

    /// Print entries appended since `printed`; returns the new count.
    fn print_new_entries(&self, store: &PortariaStore, printed: usize) -> usize {
        let state = store.snapshot();
        for entry in state.conversation.iter().skip(printed) {
            if entry.role != Role::User {
                println!("{}", self.format_entry(entry));
            }
        }
        if state
            .conversation
            .last()
            .is_some_and(|entry| entry.role == Role::Assistant)
        {
            let sources = state.latest_sources();
            if !sources.is_empty() {
                println!("\nFontes:\n{}", format_sources(sources));
            }
        }
        state.conversation.len()
    }

    fn format_entry(&self, entry: &ConversationEntry) -> String {
        match entry.role {
            Role::Assistant if self.html => format_and_render(&entry.text),
            Role::Error => format!("Erro: {}", entry.text),
            _ => entry.text.clone(),
        }
    }

    fn print_search(&self, store: &PortariaStore) {
        let state = store.snapshot();
        if let Some(error) = &state.search.error {
            println!("Erro: {}", error);
            return;
        }
        if state.search_results.is_empty() {
            println!("Nenhum resultado encontrado.");
            return;
        }
        for result in &state.search_results {
            println!("- {} [{}]", result.title, format_portaria_id(&result.id));
            if let Some(snippet) = &result.snippet {
                println!("  {}", truncate_text(snippet, 80));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  "), ChatInput::Empty);
        assert_eq!(
            parse_input("O que é diária?"),
            ChatInput::Question("O que é diária?")
        );
        assert_eq!(parse_input("/fontes"), ChatInput::Sources);
        assert_eq!(parse_input("/doc portaria_42"), ChatInput::Document("portaria_42"));
        assert_eq!(parse_input("/busca  férias 2023 "), ChatInput::Search("férias 2023"));
        assert_eq!(parse_input("/sair"), ChatInput::Quit);
        assert_eq!(parse_input("/doc"), ChatInput::Help);
        assert_eq!(parse_input("/desconhecido"), ChatInput::Help);
    }

    #[test]
    fn test_format_entry() {
        let chat = ChatCommand { html: false };
        assert_eq!(
            chat.format_entry(&ConversationEntry::error("Erro do servidor: 500")),
            "Erro: Erro do servidor: 500"
        );

        let chat = ChatCommand { html: true };
        let html = chat.format_entry(&ConversationEntry::assistant("**sim**", vec![]));
        assert!(html.contains("<strong>sim</strong>"));
    }
}
