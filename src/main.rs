use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use avl_wordfreq::{count_words, Order, WordCounts};

const MENU_PROMPT: &str =
    "Enter 1 for Pre-Order Traversal, 2 for In-Order, 3 for Post-Order, or 4 to exit:";

/// Count word frequencies in text and print the words in AVL tree order.
#[derive(FromArgs)]
struct Command {
    /// read text from this file instead of the first line of stdin
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// print a single traversal (pre, in or post) and exit instead of showing the menu
    #[argh(option, short = 'o')]
    order: Option<Order>,

    /// print the count next to each word
    #[argh(switch, short = 'c')]
    counts: bool,

    /// log debug messages to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let cmd: Command = argh::from_env();
    let log_level = if cmd.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let _ = WriteLogger::init(log_level, Config::default(), io::stderr());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut counts = WordCounts::new();

    let summary = match &cmd.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            count_words(BufReader::new(file), &mut counts)
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let line = lines.next().transpose()?.unwrap_or_default();
            count_words(line.as_bytes(), &mut counts)?
        }
    };
    info!(
        "{} distinct words from {} counted tokens, {} skipped",
        counts.len(),
        summary.counted,
        summary.skipped
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cmd.order {
        Some(order) => print_words(&mut out, &counts, order, cmd.counts)?,
        None => run_menu(&mut lines, &mut out, &counts, cmd.counts)?,
    }
    Ok(())
}

/// Prompts for a traversal until the user picks 4 or input runs out.
fn run_menu<I, W>(lines: &mut I, out: &mut W, counts: &WordCounts, with_counts: bool) -> Result<()>
where
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    loop {
        write!(out, "{}", MENU_PROMPT)?;
        out.flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let order = match line.trim() {
            "1" => Order::Pre,
            "2" => Order::In,
            "3" => Order::Post,
            "4" => break,
            _ => continue,
        };
        print_words(out, counts, order, with_counts)?;
    }
    Ok(())
}

fn print_words<W: Write>(
    out: &mut W,
    counts: &WordCounts,
    order: Order,
    with_counts: bool,
) -> Result<()> {
    for word in counts.traverse_keys(order) {
        if with_counts {
            writeln!(out, "{} {}", word, counts.find(word)?)?;
        } else {
            writeln!(out, "{}", word)?;
        }
    }
    Ok(())
}
