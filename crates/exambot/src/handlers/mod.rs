pub(crate) mod message;

pub use message::{
    APOLOGY_REPLY, Outcome, UNSUPPORTED_REPLY, handle_update, handle_webhook_body,
};
