use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{Level, info, warn};
use vmlproto::wire::WireNode;
use vmlproto::{Node, TagNode};
use vmlterm::render;
use vmlterm::scrollback::DEFAULT_MAX_BREAKS;
use vmlterm::{LineItem, Piece, Scrollback, segment, segment_tree};

mod reader;

use reader::FeedReader;

#[derive(Clone, Debug)]
struct Config {
    input: Option<PathBuf>,
    max_breaks: usize,
    mode: Mode,
    dump_json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Document,
    Stream,
    Json,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "vml_replay\n\n\
USAGE:\n  vml_replay [--input PATH] [--max-breaks N] [--stream | --json] [--dump-json]\n\n\
Replays a captured VML stream (file or stdin) through parse -> segment ->\n\
scrollback and prints the retained pane.\n\n\
MODES:\n  (default)  whole input is one VML document\n  --stream   one message per line; `>` lines are local echo, `#` comments\n  --json     whole input is a pre-tokenized JSON tree\n\n\
ENV:\n  VML_REPLAY_INPUT       default stdin\n  VML_REPLAY_MAX_BREAKS  default 500\n"
    );
    std::process::exit(2);
}

fn parse_args() -> Config {
    let mut input = std::env::var("VML_REPLAY_INPUT").ok().map(PathBuf::from);
    let mut max_breaks = match std::env::var("VML_REPLAY_MAX_BREAKS") {
        Ok(v) => v.parse().unwrap_or_else(|_| usage_and_exit()),
        Err(_) => DEFAULT_MAX_BREAKS,
    };
    let mut mode = Mode::Document;
    let mut dump_json = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--input" => {
                let v = it.next().unwrap_or_else(|| usage_and_exit());
                input = Some(PathBuf::from(v));
            }
            "--max-breaks" => {
                let v = it.next().unwrap_or_else(|| usage_and_exit());
                max_breaks = v.parse().unwrap_or_else(|_| usage_and_exit());
            }
            "--stream" => mode = Mode::Stream,
            "--json" => mode = Mode::Json,
            "--dump-json" => dump_json = true,
            "-h" | "--help" => usage_and_exit(),
            _ => usage_and_exit(),
        }
    }

    Config {
        input,
        max_breaks,
        mode,
        dump_json,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_max_level(Level::INFO)
        .init();

    let cfg = parse_args();
    let mut sb = Scrollback::new(cfg.max_breaks);

    match cfg.mode {
        Mode::Document => {
            let text = read_all(cfg.input.as_deref()).await?;
            append_markup(&mut sb, &text);
        }
        Mode::Json => {
            let text = read_all(cfg.input.as_deref()).await?;
            let wire: WireNode = serde_json::from_str(&text).context("decoding json tree")?;
            let pieces: Vec<Piece> = wire.into_nodes().into_iter().map(Piece::Node).collect();
            sb.append(segment(&pieces));
        }
        Mode::Stream => {
            let mut fr = FeedReader::new(open_input(cfg.input.as_deref()).await?);
            let mut messages = 0usize;
            while let Some(msg) = fr.next_message().await.context("reading replay feed")? {
                let msg = String::from_utf8_lossy(&msg);
                let line = msg.as_ref();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some(echo) = line.strip_prefix("> ").or_else(|| line.strip_prefix('>')) {
                    append_echo(&mut sb, echo);
                } else {
                    append_markup(&mut sb, line);
                }
                messages += 1;
            }
            info!(messages, "replay feed drained");
        }
    }

    print_pane(&sb, cfg.dump_json)?;
    info!(items = sb.len(), breaks = sb.break_count(), "pane printed");
    Ok(())
}

async fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn AsyncRead + Unpin>> {
    match path {
        Some(p) => {
            let f = tokio::fs::File::open(p)
                .await
                .with_context(|| format!("opening {}", p.display()))?;
            Ok(Box::new(f))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

async fn read_all(path: Option<&Path>) -> anyhow::Result<String> {
    let mut r = open_input(path).await?;
    let mut text = String::new();
    r.read_to_string(&mut text).await.context("reading input")?;
    Ok(text)
}

/// One bad message never blocks the ones after it: log it and fall back to
/// rendering the raw string unparsed.
fn append_markup(sb: &mut Scrollback, raw: &str) {
    match vmlproto::parse(raw) {
        Ok(root) => sb.append(segment_tree(&root)),
        Err(e) => {
            warn!(err = %e, "unparseable markup; rendering raw");
            sb.append(segment(&[Piece::Text(raw.to_string())]));
        }
    }
}

/// Local echo of player input, shown the way the client shows what was
/// typed: wrapped in the renderer-reserved `sent-text` tag.
fn append_echo(sb: &mut Scrollback, text: &str) {
    let mut tag = TagNode::new("sent-text");
    tag.children.push(Node::text(text));
    sb.append(segment(&[Piece::from(tag)]));
}

fn print_pane(sb: &Scrollback, dump_json: bool) -> anyhow::Result<()> {
    if dump_json {
        let json = serde_json::to_string_pretty(sb.items()).context("encoding pane")?;
        println!("{json}");
        return Ok(());
    }

    let mut out = String::new();
    for item in sb.items() {
        match item {
            LineItem::Line(l) => out.push_str(&render::plain_text(l)),
            LineItem::Break(_) => out.push('\n'),
        }
    }
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_falls_back_to_raw() {
        let mut sb = Scrollback::new(10);
        append_markup(&mut sb, "{color}broken");
        append_markup(&mut sb, "The {npc}Orc{/npc} waits.");

        let texts: Vec<String> = sb
            .items()
            .iter()
            .filter_map(LineItem::as_line)
            .map(|l| l.flat_text())
            .collect();
        assert_eq!(texts, vec!["{color}broken", "The Orc waits."]);
    }

    #[test]
    fn multi_line_message_lands_as_separate_lines() {
        let mut sb = Scrollback::new(10);
        append_markup(&mut sb, "{room}The Square\nA quiet plaza.{/room}");

        let texts: Vec<String> = sb
            .items()
            .iter()
            .filter_map(LineItem::as_line)
            .map(|l| l.flat_text())
            .collect();
        assert_eq!(texts, vec!["The Square", "A quiet plaza."]);
        assert_eq!(sb.break_count(), 1);
    }

    #[test]
    fn echo_is_wrapped_in_sent_text() {
        let mut sb = Scrollback::new(10);
        append_echo(&mut sb, "look north");

        let line = sb.items()[0].as_line().expect("echo line");
        match &line.children[0] {
            Node::Tag(t) => {
                assert_eq!(t.name, "sent-text");
                assert_eq!(t.flat_text(), "look north");
            }
            other => panic!("expected sent-text tag, got {other:?}"),
        }
    }
}
