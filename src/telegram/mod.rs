use crate::bot::RelayBot;
use crate::composer::{LinkButton, OutboundPayload};
use crate::config::TelegramConfig;
use crate::error::Result;
use log::{debug, error, info, warn};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode};
use url::Url;

/// Listens to the source chat and posts composed notifications to the
/// target chat.
pub struct TelegramRelay {
    bot: Bot,
    source_chat: ChatId,
    target_chat: ChatId,
    relay: Arc<RelayBot>,
}

impl TelegramRelay {
    pub fn new(config: &TelegramConfig, relay: Arc<RelayBot>) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
            source_chat: ChatId(config.source_chat_id),
            target_chat: ChatId(config.target_chat_id),
            relay,
        }
    }

    pub async fn start(self: Arc<Self>) -> Result<()> {
        let me = self.bot.get_me().await?;
        info!(
            "Telegram bot @{} relaying {} -> {}",
            me.username(),
            self.source_chat.0,
            self.target_chat.0
        );

        // groups deliver messages, channels deliver channel posts
        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_channel_post().endpoint(on_message));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.clone()])
            .default_handler(|_| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
        Ok(())
    }

    pub async fn handle_message(&self, msg: &Message) {
        if msg.chat.id != self.source_chat {
            return;
        }
        let Some(text) = msg.text() else {
            return;
        };
        let Some(payload) = self.relay.process(text).await else {
            debug!("Message {} in source chat is not a trade", msg.id.0);
            return;
        };

        if let Err(e) = self.send(&payload).await {
            error!("Failed to deliver notification: {}", e);
        }
        discard_chart(&payload).await;
    }

    #[allow(deprecated)]
    async fn send(&self, payload: &OutboundPayload) -> Result<()> {
        let markup = keyboard(payload.buttons());
        match payload {
            OutboundPayload::Photo { image, caption, .. } => {
                self.bot
                    .send_photo(self.target_chat, InputFile::file(image.clone()))
                    .caption(caption.clone())
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(markup)
                    .await?;
            }
            OutboundPayload::Text { body, .. } => {
                self.bot
                    .send_message(self.target_chat, body.clone())
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(markup)
                    .await?;
            }
        }
        Ok(())
    }
}

async fn on_message(msg: Message, relay: Arc<TelegramRelay>) -> ResponseResult<()> {
    relay.handle_message(&msg).await;
    Ok(())
}

async fn discard_chart(payload: &OutboundPayload) {
    if let Some(path) = payload.image() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Could not remove chart {}: {}", path.display(), e);
        }
    }
}

/// URL buttons, one row per input row. Buttons whose URL does not parse
/// are dropped, and so are rows left empty.
pub fn keyboard(rows: &[Vec<LinkButton>]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| match Url::parse(&button.url) {
                    Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
                    Err(e) => {
                        warn!("Dropping button '{}' with bad url {}: {}", button.label, button.url, e);
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    InlineKeyboardMarkup::new(rows)
}
