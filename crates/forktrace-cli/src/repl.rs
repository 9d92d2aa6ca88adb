use std::io::{self, BufRead, Write};

use crate::dispatch::Session;

/// The cooperative read-dispatch loop. Reading stdin and rendering
/// the prompt are the line-editor/renderer's job in a real deployment;
/// here that's just `stdin.lines()`.
pub fn run(mut session: Session) {
    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        session.handle_line(&line);
        if session.should_exit {
            break;
        }
        print!("> ");
        let _ = io::stdout().flush();
    }
}
