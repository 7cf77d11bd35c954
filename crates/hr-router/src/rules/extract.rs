//! Argument extraction: targeted pattern rules per tool family.
//!
//! Every rule is optional. A tool may come out with its required arguments
//! only partially filled; the validator decides what survives.

use hr_protocol::{ParamType, ToolSchema};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::family::ToolFamily;

// Clause terminators shared by the free-text captures below.
const END: &str = r"(?:\s+(?:and|then)\b|[,.?!;]|$)";

// Single-digit minutes match here and are rejected in `parse_clock`.
static RE_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{1,2}))?\s*([ap])\.?m\b").unwrap()
});

static RE_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\bin\s+(.+?){END}")).unwrap());

static RE_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*(?:minutes?|mins?)\b").unwrap());

static RE_CONTACT_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:find|look\s+up|search\s+for)\s+(.+?)(?:\s+in\s+(?:my\s+)?contacts\b|{END})"
    ))
    .unwrap()
});

// Ordered: the first pattern yielding a plausible name wins.
static RE_RECIPIENT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bsend\b.*?\bto\s+([a-z][\w'-]*)",
        r"(?i)\bsend\s+([a-z][\w'-]*)\s+(?:a\s+)?(?:message|text|note)\b",
        r"(?i)\btext\s+([a-z][\w'-]*)",
        r"(?i)\bto\s+([a-z][\w'-]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static RE_MESSAGE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsaying\s+(.+)$").unwrap());

static RE_REMINDER_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bremind\s+me\s+(?:about|to)\s+(.+?)\s+at\s+(\d{1,2}(?::\d{1,2})?\s*[ap]\.?m\b)")
        .unwrap()
});

static RE_PLAY_SOME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bplay\s+some\s+(.+?)\s+music\b").unwrap());

static RE_PLAY_REST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bplay\s+(.+?)\s*$").unwrap());

/// Words a recipient pattern can capture that are never names.
const NOT_A_NAME: &[&str] = &[
    "a", "an", "the", "my", "your", "some", "this", "that", "message", "text", "note", "me",
];

/// A parsed 12-hour clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    /// 1–12.
    pub hour: u32,
    pub minute: u32,
    pub pm: bool,
}

impl ClockTime {
    /// 24-hour hour: 12 AM is 0, 12 PM is 12.
    pub fn hour24(&self) -> u32 {
        (self.hour % 12) + if self.pm { 12 } else { 0 }
    }

    /// Canonical text form, e.g. `3:00 PM`.
    pub fn display(&self) -> String {
        let suffix = if self.pm { "PM" } else { "AM" };
        format!("{}:{:02} {suffix}", self.hour, self.minute)
    }
}

/// Find the first `H(:MM)? am|pm` token in the text.
pub fn parse_clock(text: &str) -> Option<ClockTime> {
    RE_CLOCK.captures_iter(text).find_map(|caps| {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) if m.as_str().len() == 2 => m.as_str().parse().ok()?,
            Some(_) => return None,
            None => 0,
        };
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        Some(ClockTime { hour, minute, pm })
    })
}

/// Extract arguments for the winning tool from one clause.
pub fn extract_arguments(clause: &str, tool: &ToolSchema) -> Map<String, Value> {
    let mut args = Map::new();
    let Some(family) = ToolFamily::of(&tool.name) else {
        return args;
    };

    match family {
        ToolFamily::Weather => {
            if let Some(location) = capture_text(&RE_LOCATION, clause) {
                put(&mut args, tool, "location", ParamType::String, location.into());
            }
        }
        ToolFamily::Alarm => {
            if let Some(time) = parse_clock(clause) {
                put(&mut args, tool, "hour", ParamType::Integer, time.hour24().into());
                if tool.declares("minute") {
                    args.insert("minute".into(), time.minute.into());
                }
            }
        }
        ToolFamily::Timer => {
            if let Some(minutes) = RE_MINUTES
                .captures(clause)
                .and_then(|c| c[1].parse::<i64>().ok())
            {
                put(&mut args, tool, "minutes", ParamType::Integer, minutes.into());
            }
        }
        ToolFamily::Contact => {
            if let Some(query) = capture_text(&RE_CONTACT_QUERY, clause) {
                put(&mut args, tool, "query", ParamType::String, query.into());
            }
        }
        ToolFamily::Message => {
            if let Some(recipient) = extract_recipient(clause)
                && tool.declares("recipient")
            {
                args.insert("recipient".into(), recipient.into());
            }
            if let Some(body) = capture_text(&RE_MESSAGE_BODY, clause)
                && tool.declares("message")
            {
                args.insert("message".into(), body.into());
            }
        }
        ToolFamily::Reminder => extract_reminder(clause, tool, &mut args),
        ToolFamily::Music => {
            let song = capture_text(&RE_PLAY_SOME, clause)
                .or_else(|| capture_text(&RE_PLAY_REST, clause));
            if let Some(song) = song {
                put(&mut args, tool, "song", ParamType::String, song.into());
            }
        }
    }

    args
}

fn extract_recipient(clause: &str) -> Option<String> {
    RE_RECIPIENT.iter().find_map(|re| {
        let name = re.captures(clause)?.get(1)?.as_str();
        let lower = name.to_lowercase();
        (!NOT_A_NAME.contains(&lower.as_str())).then(|| name.to_string())
    })
}

fn extract_reminder(clause: &str, tool: &ToolSchema, args: &mut Map<String, Value>) {
    if let Some(caps) = RE_REMINDER_PAIR.captures(clause) {
        let title = clean(&caps[1]);
        if !title.is_empty() && tool.declares("title") {
            args.insert("title".into(), title.into());
        }
        if let Some(time) = parse_clock(&caps[2])
            && tool.declares("time")
        {
            args.insert("time".into(), time.display().into());
        }
        return;
    }

    if tool.declares("time")
        && let Some(time) = parse_clock(clause)
    {
        args.insert("time".into(), time.display().into());
    }
}

/// First capture group, cleaned; `None` when it is blank.
fn capture_text(re: &Regex, clause: &str) -> Option<String> {
    let caps = re.captures(clause)?;
    let text = clean(caps.get(1)?.as_str());
    (!text.is_empty()).then_some(text)
}

fn clean(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?', ',', ';'])
        .trim_matches(['"', '\''])
        .trim()
        .to_string()
}

/// Write `value` to `preferred` if the tool declares it, otherwise to the
/// first declared parameter of `kind`. Undeclared targets are skipped.
fn put(args: &mut Map<String, Value>, tool: &ToolSchema, preferred: &str, kind: ParamType, value: Value) {
    let target = if tool.declares(preferred) {
        Some(preferred.to_string())
    } else {
        tool.parameters
            .properties
            .iter()
            .find(|(name, spec)| spec.kind == kind && !args.contains_key(*name))
            .map(|(name, _)| name.clone())
    };
    if let Some(name) = target {
        args.insert(name, value);
    }
}
