use async_trait::async_trait;
use std::io::{BufRead, Write};
use valkyrie_core::Confirm;

/// Asks on stdin, anything but `y`/`yes` declines
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N]: ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        read_answer(|| std::io::stdin().lock()).await
    }
}

/// Read one line on a blocking thread and interpret it as an answer
async fn read_answer<F, R>(open: F) -> bool
where
    F: FnOnce() -> R + Send + 'static,
    R: BufRead,
{
    let answer = tokio::task::spawn_blocking(move || {
        let mut input = String::new();
        open().read_line(&mut input).map(|_| input)
    })
    .await;

    match answer {
        Ok(Ok(input)) => is_yes(&input),
        _ => false,
    }
}

fn is_yes(input: &str) -> bool {
    let answer = input.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
