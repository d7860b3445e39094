// Report delivery
pub mod telegram;

pub use telegram::{split_message, TelegramNotifier, TELEGRAM_MESSAGE_LIMIT};

use crate::error::NotifyError;
use async_trait::async_trait;

/// Delivers a rendered text block somewhere a human will read it
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        (**self).send(text).await
    }
}

/// Prints reports to stdout (dry runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        println!("{}", text);
        Ok(())
    }
}
