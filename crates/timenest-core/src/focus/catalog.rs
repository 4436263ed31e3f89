use serde::Serialize;

/// A named work-session mode with a default duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FocusTool {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_duration_minutes: u32,
}

impl FocusTool {
    pub const fn default_duration_ms(&self) -> u64 {
        self.default_duration_minutes as u64 * 60_000
    }
}

pub static FOCUS_TOOLS: [FocusTool; 4] = [
    FocusTool {
        id: "pomodoro",
        name: "Pomodoro (25 / 5)",
        description: "Work for 25 minutes, then take a 5 minute break.",
        default_duration_minutes: 25,
    },
    FocusTool {
        id: "deep-focus",
        name: "Deep Focus Mode",
        description: "Block distractions for a solid deep work session.",
        default_duration_minutes: 45,
    },
    FocusTool {
        id: "break-reminders",
        name: "Break Reminders",
        description: "Gentle nudges to stand, stretch, and reset.",
        default_duration_minutes: 10,
    },
    FocusTool {
        id: "ambient-sounds",
        name: "Ambient Sounds",
        description: "Rain, white noise, or café sounds to stay in flow.",
        default_duration_minutes: 20,
    },
];

/// Look a tool up by id.
pub fn find_tool(id: &str) -> Option<&'static FocusTool> {
    FOCUS_TOOLS.iter().find(|tool| tool.id == id)
}
