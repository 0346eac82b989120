use async_trait::async_trait;
use concierge_core::SignalMessage;

/// Трейт, через который движок звонков отправляет кадры в relay.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Поставить кадр в очередь на отправку. Ошибки только логируются.
    async fn send(&self, msg: SignalMessage);
}
