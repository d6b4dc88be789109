//! `chat` command: document a schema, then answer questions from stdin

use std::io::{BufRead, Write};

use metamind::Session;

use super::{GatewayArgs, SourceArgs};
use crate::error::CliError;

/// Handle the `chat` command
///
/// Reads one question per line until EOF or `exit`. A failed answer is
/// reported and the loop continues with the session intact.
pub fn handle_chat(source: &SourceArgs, gateway_args: &GatewayArgs) -> Result<(), CliError> {
    let mut session = Session::new(gateway_args.gateway()?, gateway_args.credentials());
    session.submit_schema(&source.to_source()?)?;

    eprintln!("Documenting schema...");
    println!("{}", session.generate_documentation()?);
    eprintln!("\nAsk a question about your schema (\"exit\" to quit).");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let question = line?;
        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match session.ask(question) {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => eprintln!("Failed to get a response from the AI: {}", e.user_message()),
        }
    }
    Ok(())
}
