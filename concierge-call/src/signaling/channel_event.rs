use concierge_core::SignalMessage;

/// События сигнального канала для движка звонков.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Соединение открыто, `register` уже отправлен.
    Connected,

    /// Соединение потеряно. Переподключение уже запланировано.
    Disconnected,

    /// Разобранный входящий кадр.
    Message(SignalMessage),

    /// Ошибка транспорта. Не фатальна.
    Error(String),
}
