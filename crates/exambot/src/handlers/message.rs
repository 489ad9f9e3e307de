use tracing::{Instrument, info, info_span, warn};

use crate::bot::BotContext;
use crate::commands::{self, BotCommand};
use crate::error::{Error, Result};
use crate::prompt;
use crate::scratch::ScratchImage;
use crate::telegram::{Message, PhotoSize, Update};

/// Sent when the completion service fails.
pub const APOLOGY_REPLY: &str = "Я не смог подготовить ответ на экзаменационный вопрос.";

/// Sent for messages that carry neither text nor a photo.
pub const UNSUPPORTED_REPLY: &str = "Я могу обработать только текстовое сообщение или фотографию.";

/// Which branch an update took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A recognized command got its fixed reply.
    Command(BotCommand),
    /// A question (typed or photographed) got an answer or the apology.
    Answered,
    /// Neither text nor photo.
    Unsupported,
    /// Update without a message; nothing was sent.
    Ignored,
}

/// Parses a raw webhook body and handles the update.
///
/// # Errors
/// A malformed body is an [`Error::Parse`] and nothing is sent.
pub async fn handle_webhook_body(context: &BotContext, body: &[u8]) -> Result<Outcome> {
    let update: Update =
        serde_json::from_slice(body).map_err(|err| Error::parse("webhook update", err))?;
    handle_update(context, update).await
}

/// Classifies one update and drives the upstream clients.
///
/// Completion failures degrade to [`APOLOGY_REPLY`]. File lookup, download
/// and recognition failures are returned as errors and no reply is sent.
///
/// # Errors
/// Returns the first fatal upstream failure, including failed sends.
pub async fn handle_update(context: &BotContext, update: Update) -> Result<Outcome> {
    let Some(message) = update.message else {
        info!(update_id = update.update_id, "ignoring update without message");
        return Ok(Outcome::Ignored);
    };

    let span = info_span!(
        "update",
        update_id = update.update_id,
        chat_id = message.chat.id,
        message_id = message.message_id
    );
    handle_message(context, &message).instrument(span).await
}

async fn handle_message(context: &BotContext, message: &Message) -> Result<Outcome> {
    let chat_id = message.chat.id;
    let reply_to_message_id = message.message_id;

    if let Some(text) = message.non_empty_text() {
        if let Some(command) = commands::parse_command(text) {
            info!(?command, "answering command");
            context
                .telegram()
                .send_reply(chat_id, commands::reply_for(command), reply_to_message_id)
                .await?;
            return Ok(Outcome::Command(command));
        }

        info!(chars = text.chars().count(), "answering text question");
        let answer = answer_question(context, text).await;
        context
            .telegram()
            .send_reply(chat_id, &answer, reply_to_message_id)
            .await?;
        return Ok(Outcome::Answered);
    }

    let Some(photo) = message.largest_photo() else {
        info!("unsupported message");
        context
            .telegram()
            .send_reply(chat_id, UNSUPPORTED_REPLY, reply_to_message_id)
            .await?;
        return Ok(Outcome::Unsupported);
    };

    info!(file_id = %photo.file_id, width = photo.width, height = photo.height, "answering photo question");
    let question = recognize_photo(context, photo).await?;
    let answer = answer_question(context, &question).await;
    context
        .telegram()
        .send_reply(chat_id, &answer, reply_to_message_id)
        .await?;
    Ok(Outcome::Answered)
}

async fn recognize_photo(context: &BotContext, photo: &PhotoSize) -> Result<String> {
    let url = context.telegram().resolve_file_url(&photo.file_id).await?;
    let scratch = ScratchImage::create(context.scratch_dir(), &photo.file_id)?;
    context.telegram().download(&url, scratch.path()).await?;
    let image = scratch.read()?;
    drop(scratch);

    context.ocr().recognize(&image).await
}

async fn answer_question(context: &BotContext, question: &str) -> String {
    let system_prompt = prompt::load_system_prompt(context.system_prompt_file());
    match context.completion().complete(&system_prompt, question).await {
        Ok(answer) => answer,
        Err(err) => {
            warn!(error = %err, "completion failed, sending apology");
            APOLOGY_REPLY.to_string()
        }
    }
}
