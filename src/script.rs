//! Command scripts for driving a session without a user interface.
//!
//! A script is a list of commands separated by newlines or semicolons.
//! Everything after a `#` on a line is a comment.
//!
//! ```text
//! walk e; walk e
//! run s          # follow the corridor
//! rest &         # until healed
//! travel 12 4
//! ```

use std::collections::VecDeque;

use anyhow::{bail, Context};
use engine::prelude::*;

const DIR_NAMES: [&str; 8] = ["n", "ne", "e", "se", "s", "sw", "w", "nw"];

/// Parse a script into a command queue.
pub fn parse(text: &str) -> anyhow::Result<VecDeque<Command>> {
    let mut ret = VecDeque::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for cmd in line.split(';') {
            let cmd = cmd.trim();
            if cmd.is_empty() {
                continue;
            }
            ret.push_back(
                command(cmd)
                    .with_context(|| format!("script line {}", n + 1))?,
            );
        }
    }

    Ok(ret)
}

fn command(text: &str) -> anyhow::Result<Command> {
    let mut words = text.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty command");
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (verb, &args[..]) {
        ("walk", [d]) => Command::Walk(dir(d)?),
        ("hold", []) => Command::Hold,
        ("open", [d]) => Command::Open(dir(d)?),
        ("close", [d]) => Command::Close(dir(d)?),
        ("rest", ["&"]) => Command::Rest(Rest::AsNeeded),
        ("rest", [n]) => Command::Rest(Rest::Turns(number(n)?)),
        ("run", [d]) => Command::Run(dir(d)?),
        ("travel", [x, y]) => Command::Travel(ivec2(number(x)?, number(y)?)),
        ("search", []) => Command::Search,
        ("fish", [n]) => Command::Fish(number(n)?),
        ("repeat", [n]) => Command::Repeat(number(n)?),
        ("stairs", []) => Command::TakeStairs,
        ("quit", []) => Command::Quit,
        _ => bail!("bad command {text:?}"),
    };
    Ok(cmd)
}

fn dir(name: &str) -> anyhow::Result<IVec2> {
    match DIR_NAMES.iter().position(|&n| n == name) {
        Some(i) => Ok(DIR_8[i]),
        None => bail!("bad direction {name:?}"),
    }
}

fn number(s: &str) -> anyhow::Result<i32> {
    s.parse().with_context(|| format!("bad number {s:?}"))
}
