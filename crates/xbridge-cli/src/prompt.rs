use eyre::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use xbridge_planner::parse_tx_count;

pub type StdinLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Ask the operator how many transactions to run per wallet.
pub async fn ask_tx_count<R, W>(lines: &mut Lines<R>, out: &mut W, question: &str) -> Result<u32>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{} ", question)?;
    out.flush()?;
    let answer = lines
        .next_line()
        .await
        .wrap_err("failed to read answer")?
        .unwrap_or_default();
    Ok(parse_tx_count(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_parses_answer() {
        let mut lines = BufReader::new(&b"4\n"[..]).lines();
        let mut out = Vec::new();

        let count = ask_tx_count(&mut lines, &mut out, "How many transactions per wallet?")
            .await
            .unwrap();

        assert_eq!(count, 4);
        assert_eq!(String::from_utf8(out).unwrap(), "How many transactions per wallet? ");
    }

    #[tokio::test]
    async fn test_prompt_falls_back_to_one() {
        for input in [&b"abc\n"[..], &b"0\n"[..], &b""[..]] {
            let mut lines = BufReader::new(input).lines();
            let count = ask_tx_count(&mut lines, &mut Vec::new(), "?").await.unwrap();
            assert_eq!(count, 1);
        }
    }
}
