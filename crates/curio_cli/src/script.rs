//! Edit script parsing for `curio replay`.

use anyhow::{bail, Context};

/// One scripted edit. Positions are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Select(usize),
    Move(usize),
    Delete(usize),
    Clear,
    Reset,
    Commit,
}

/// A parsed operation and the 1-based script line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub op: Op,
}

/// Parse a script: one operation per line, `#` starts a comment.
///
/// # Errors
/// Returns an error naming the line for unknown operations, missing or
/// non-numeric positions, and trailing arguments.
pub fn parse_script(text: &str) -> anyhow::Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let op = parse_op(content).with_context(|| format!("line {}: '{}'", line, content))?;
        steps.push(Step { line, op });
    }
    Ok(steps)
}

fn parse_op(content: &str) -> anyhow::Result<Op> {
    let mut words = content.split_whitespace();
    let name = words.next().unwrap_or("").to_ascii_lowercase();
    let argument = words.next();
    if let Some(extra) = words.next() {
        bail!("unexpected argument '{}'", extra);
    }

    let op = match (name.as_str(), argument) {
        ("select", Some(arg)) => Op::Select(position(arg)?),
        ("move", Some(arg)) => Op::Move(position(arg)?),
        ("delete", Some(arg)) => Op::Delete(position(arg)?),
        ("select" | "move" | "delete", None) => bail!("'{}' needs a position", name),
        ("clear", None) => Op::Clear,
        ("reset", None) => Op::Reset,
        ("commit", None) => Op::Commit,
        ("clear" | "reset" | "commit", Some(arg)) => {
            bail!("'{}' takes no argument, got '{}'", name, arg)
        }
        _ => bail!("unknown operation '{}'", name),
    };
    Ok(op)
}

fn position(arg: &str) -> anyhow::Result<usize> {
    arg.parse::<usize>()
        .with_context(|| format!("'{}' is not a position", arg))
}
