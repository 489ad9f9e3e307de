pub(crate) mod context;

pub use context::BotContext;
