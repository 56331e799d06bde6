// Line-oriented remote control commands
//
// One command per line. The transport (socket, adb shell, test harness) is up
// to the host; this module only parses lines and renders replies.

use crate::session::PlaybackTiming;
use std::time::Duration;

pub const REPLY_OK: &str = "OK\n";
pub const REPLY_NOK: &str = "NOK\n";

/// A parsed remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Seek(u64),
    /// Report position, duration, state and the last message
    Stat,
    /// Report how long the last playback ran
    Bench,
    /// Replace the pipeline with the given description
    SetPipeline(String),
}

/// Why a line was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    /// `+SEEK` argument is not a decimal number
    BadSeekTarget(String),
    /// A `+`/`-` command this shim does not implement
    Unsupported(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::BadSeekTarget(arg) => write!(f, "invalid seek target '{}'", arg),
            ParseError::Unsupported(line) => write!(f, "unsupported command '{}'", line),
        }
    }
}

impl std::error::Error for ParseError {}

impl RemoteCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        if line.starts_with("+PLAY") {
            Ok(RemoteCommand::Play)
        } else if line.starts_with("+PAUSE") {
            Ok(RemoteCommand::Pause)
        } else if let Some(arg) = line.strip_prefix("+SEEK ") {
            // An empty target seeks to the start
            if arg.is_empty() {
                return Ok(RemoteCommand::Seek(0));
            }
            if !arg.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::BadSeekTarget(arg.to_string()));
            }
            arg.parse()
                .map(RemoteCommand::Seek)
                .map_err(|_| ParseError::BadSeekTarget(arg.to_string()))
        } else if line.starts_with("+STAT") {
            Ok(RemoteCommand::Stat)
        } else if line.starts_with("+BENCH") {
            Ok(RemoteCommand::Bench)
        } else if line.starts_with('+') || line.starts_with('-') {
            Err(ParseError::Unsupported(line.to_string()))
        } else {
            Ok(RemoteCommand::SetPipeline(line.to_string()))
        }
    }
}

/// `H:MM:SS.nnnnnnnnn`, or all nines when the value is unknown
pub fn format_stat_time(time: Option<Duration>) -> String {
    match time {
        Some(time) => {
            let secs = time.as_secs();
            format!(
                "{}:{:02}:{:02}.{:09}",
                secs / 3600,
                (secs / 60) % 60,
                secs % 60,
                time.subsec_nanos()
            )
        }
        None => "99:99:99.999999999".to_string(),
    }
}

/// Reply to `+BENCH`
pub fn format_bench(timing: PlaybackTiming) -> String {
    match timing {
        PlaybackTiming::NotPlayed => "Not yet played, no measurement\n".to_string(),
        PlaybackTiming::PlayingFor(span) => {
            format!("Has been playing for {}\n", format_stat_time(Some(span)))
        }
        PlaybackTiming::EndedAfter(span) => {
            format!("Last playback ended after {}\n", format_stat_time(Some(span)))
        }
    }
}

/// Multi-line status report answered to `+STAT`
pub fn format_status(
    position_ms: Option<u64>,
    duration_ms: Option<u64>,
    state_label: &str,
    last_message: Option<&str>,
) -> String {
    format!(
        "{} / {} @ {}\nLast message: {}\n",
        format_stat_time(position_ms.map(Duration::from_millis)),
        format_stat_time(duration_ms.map(Duration::from_millis)),
        state_label,
        last_message.unwrap_or("(NULL)")
    )
}
