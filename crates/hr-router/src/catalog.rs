//! Built-in tool catalog used by the demo binary and tests.

use hr_protocol::{ParamType, ToolSchema};

pub fn get_weather() -> ToolSchema {
    ToolSchema::new("get_weather", "Get current weather for a location").param(
        "location",
        ParamType::String,
        "City name",
        true,
    )
}

pub fn set_alarm() -> ToolSchema {
    ToolSchema::new("set_alarm", "Set an alarm for a given time")
        .param("hour", ParamType::Integer, "Hour to set the alarm for", true)
        .param("minute", ParamType::Integer, "Minute to set the alarm for", true)
}

pub fn send_message() -> ToolSchema {
    ToolSchema::new("send_message", "Send a message to a contact")
        .param(
            "recipient",
            ParamType::String,
            "Name of the person to send the message to",
            true,
        )
        .param(
            "message",
            ParamType::String,
            "The message content to send",
            true,
        )
}

pub fn create_reminder() -> ToolSchema {
    ToolSchema::new("create_reminder", "Create a reminder with a title and time")
        .param("title", ParamType::String, "Reminder title", true)
        .param(
            "time",
            ParamType::String,
            "Time for the reminder (e.g. 3:00 PM)",
            true,
        )
}

pub fn search_contacts() -> ToolSchema {
    ToolSchema::new("search_contacts", "Search for a contact by name").param(
        "query",
        ParamType::String,
        "Name to search for",
        true,
    )
}

pub fn play_music() -> ToolSchema {
    ToolSchema::new("play_music", "Play a song or playlist").param(
        "song",
        ParamType::String,
        "Song or playlist name",
        true,
    )
}

pub fn set_timer() -> ToolSchema {
    ToolSchema::new("set_timer", "Set a countdown timer").param(
        "minutes",
        ParamType::Integer,
        "Number of minutes",
        true,
    )
}

/// All seven built-in tools, in their canonical order.
pub fn default_tools() -> Vec<ToolSchema> {
    vec![
        get_weather(),
        set_alarm(),
        send_message(),
        create_reminder(),
        search_contacts(),
        play_music(),
        set_timer(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_protocol::check_tool_set;

    #[test]
    fn default_tools_are_well_formed() {
        let tools = default_tools();
        assert_eq!(tools.len(), 7);
        assert!(check_tool_set(&tools).is_ok());
    }

    #[test]
    fn alarm_declares_integer_fields() {
        let alarm = set_alarm();
        assert_eq!(alarm.param_type("hour"), Some(ParamType::Integer));
        assert_eq!(alarm.parameters.required, vec!["hour", "minute"]);
    }
}
