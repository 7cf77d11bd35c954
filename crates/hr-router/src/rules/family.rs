//! Tool families recognised by inspecting tool names.
//!
//! A family bundles the name markers that identify it, the synonym
//! expansion unioned into its keyword profile, and the trigger phrases the
//! confidence estimator uses to count distinct intents.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolFamily {
    Weather,
    Alarm,
    Timer,
    Music,
    Message,
    Contact,
    Reminder,
}

impl ToolFamily {
    pub const ALL: [ToolFamily; 7] = [
        ToolFamily::Weather,
        ToolFamily::Alarm,
        ToolFamily::Timer,
        ToolFamily::Music,
        ToolFamily::Message,
        ToolFamily::Contact,
        ToolFamily::Reminder,
    ];

    /// Substrings of a tool name that place it in this family.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            ToolFamily::Weather => &["weather"],
            ToolFamily::Alarm => &["alarm"],
            ToolFamily::Timer => &["timer"],
            ToolFamily::Music => &["music", "play"],
            ToolFamily::Message => &["message"],
            ToolFamily::Contact => &["contact"],
            ToolFamily::Reminder => &["reminder"],
        }
    }

    /// Extra domain keywords unioned into a matching tool's profile.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            ToolFamily::Weather => &["weather", "forecast", "temperature", "rain", "sunny", "outside"],
            ToolFamily::Alarm => &["alarm", "wake", "morning", "am", "pm"],
            ToolFamily::Timer => &["timer", "countdown", "minute", "minutes"],
            ToolFamily::Music => &["music", "play", "song", "playlist", "listen"],
            ToolFamily::Message => &["message", "send", "text", "tell", "saying"],
            ToolFamily::Contact => &["contact", "contacts", "find", "look", "search", "lookup"],
            ToolFamily::Reminder => &["reminder", "remind", "remember"],
        }
    }

    /// Phrases whose presence in the utterance signals this family's intent.
    pub fn triggers(&self) -> &'static [&'static str] {
        match self {
            ToolFamily::Weather => &["weather", "forecast", "temperature"],
            ToolFamily::Alarm => &["alarm", "wake"],
            ToolFamily::Timer => &["timer", "countdown"],
            ToolFamily::Music => &["play", "music", "song"],
            ToolFamily::Message => &["send", "text", "message"],
            ToolFamily::Contact => &["find", "look up", "search", "contact"],
            ToolFamily::Reminder => &["remind", "reminder"],
        }
    }

    fn matches(&self, lower_name: &str) -> bool {
        self.markers().iter().any(|m| lower_name.contains(m))
    }

    /// Primary family of a tool, used to pick argument extraction rules.
    pub fn of(tool_name: &str) -> Option<ToolFamily> {
        let lower = tool_name.to_lowercase();
        Self::ALL.into_iter().find(|f| f.matches(&lower))
    }

    /// Every family whose markers appear in the tool name.
    pub fn all_of(tool_name: &str) -> Vec<ToolFamily> {
        let lower = tool_name.to_lowercase();
        Self::ALL.into_iter().filter(|f| f.matches(&lower)).collect()
    }
}
