use crate::telegram::BotCommandSpec;

/// Reply to the onboarding commands.
pub const ONBOARDING_REPLY: &str = "Я помогу подготовить ответ на экзаменационный вопрос по дисциплине \"Операционные системы\".\nПришлите мне фотографию с вопросом или наберите его текстом.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommandDef {
    command: BotCommand,
    patterns: &'static [&'static str],
    reply: &'static str,
    telegram_spec: BotCommandSpec,
}

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        command: BotCommand::Start,
        patterns: &["/start", "start"],
        reply: ONBOARDING_REPLY,
        telegram_spec: BotCommandSpec {
            command: "start",
            description: "How to ask a question",
        },
    },
    CommandDef {
        command: BotCommand::Help,
        patterns: &["/help", "help"],
        reply: ONBOARDING_REPLY,
        telegram_spec: BotCommandSpec {
            command: "help",
            description: "How to ask a question",
        },
    },
];

/// Matches `text` against the command table.
///
/// Matching is exact and case-sensitive: no trimming, no `@bot` suffix.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    COMMAND_DEFS.iter().find_map(|def| {
        def.patterns
            .iter()
            .any(|pattern| *pattern == text)
            .then_some(def.command)
    })
}

pub fn reply_for(command: BotCommand) -> &'static str {
    COMMAND_DEFS
        .iter()
        .find(|def| def.command == command)
        .map_or(ONBOARDING_REPLY, |def| def.reply)
}

pub fn telegram_command_specs() -> Vec<BotCommandSpec> {
    COMMAND_DEFS.iter().map(|def| def.telegram_spec).collect()
}
