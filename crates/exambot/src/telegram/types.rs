use serde::{Deserialize, Serialize};

/// One inbound webhook update. Fields the handler does not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    /// Photo variants, smallest to largest resolution.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// The message text, treating an empty string as absent.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    /// The highest-resolution photo variant: the last entry, by convention.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo.as_deref().and_then(<[PhotoSize]>::last)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramFile {
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Entry for `setMyCommands`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BotCommandSpec {
    pub command: &'static str,
    pub description: &'static str,
}
