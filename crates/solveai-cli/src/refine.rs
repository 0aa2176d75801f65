//! Interactive refinement of one concept.
//!
//! Plain lines are chat messages; `/scan` runs the competitor scan, `/save`
//! writes the report, `/back` leaves (unsaved turns are dropped).

use anyhow::Context as _;
use solveai_core::{solver::Solver, store::ReportStore};
use solveai_session::{Error as SessionError, Session};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

use crate::render;

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
  Say(&'a str),
  Scan,
  Save,
  Back,
  Blank,
  Unknown(&'a str),
}

fn parse(line: &str) -> Line<'_> {
  let line = line.trim();
  match line {
    "" => Line::Blank,
    "/scan" => Line::Scan,
    "/save" => Line::Save,
    "/back" | "/quit" | "/exit" => Line::Back,
    cmd if cmd.starts_with('/') => Line::Unknown(cmd),
    text => Line::Say(text),
  }
}

/// Drive the open concept from `input` until `/back` or end of input.
pub async fn run<St, So, R>(session: &mut Session<St, So>, input: R) -> anyhow::Result<()>
where
  St: ReportStore,
  So: Solver,
  R: AsyncBufRead + Unpin,
{
  let concept = session
    .selected_concept()
    .context("no concept is open")?
    .name
    .clone();
  println!("Refining {concept}. Commands: /scan, /save, /back\n");
  if let Some(ledger) = session.current_ledger() {
    print!("{}", render::ledger(ledger));
  }

  let mut lines = input.lines();
  let mut dirty = false;
  while let Some(line) = lines.next_line().await.context("reading input")? {
    match parse(&line) {
      Line::Blank => {}
      Line::Say(text) => {
        let reply = session.send_message(text).await?;
        println!("assistant> {reply}");
        dirty = true;
      }
      Line::Scan => match session.scan_competitors().await {
        Ok(result) => {
          print!("{}", render::competitors(&result));
          dirty = true;
        }
        Err(SessionError::AlreadyAnalyzed) => {
          if let Some(result) = session.current_ledger().and_then(|l| l.competitor_analysis.as_ref()) {
            print!("{}", render::competitors(result));
          }
        }
        Err(e) => eprintln!("scan failed: {e}"),
      },
      Line::Save => match session.save().await {
        Ok(id) => {
          println!("Saved report {id}.");
          dirty = false;
        }
        Err(e) => eprintln!("save failed: {e}"),
      },
      Line::Back => break,
      Line::Unknown(cmd) => eprintln!("unknown command {cmd}"),
    }
  }

  if dirty {
    tracing::warn!("leaving {concept} with unsaved changes");
  }
  session.back()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lines_are_classified() {
    assert_eq!(parse("  hello there "), Line::Say("hello there"));
    assert_eq!(parse("/scan"), Line::Scan);
    assert_eq!(parse(" /save"), Line::Save);
    assert_eq!(parse("/back"), Line::Back);
    assert_eq!(parse("/quit"), Line::Back);
    assert_eq!(parse("   "), Line::Blank);
    assert_eq!(parse("/frobnicate"), Line::Unknown("/frobnicate"));
  }
}
