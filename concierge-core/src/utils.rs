pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun2.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_4: &str = "stun:stun3.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_5: &str = "stun:stun4.l.google.com:19302";

/// Address the support desk registers under unless configured otherwise.
pub const DEFAULT_SUPPORT_ADDR: &str = "owner";

pub const CUSTOMER_ID_PREFIX: &str = "user_";
pub const CUSTOMER_ID_SUFFIX_LEN: usize = 9;

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:8080/ws";
pub const DEFAULT_RELAY_BIND: &str = "0.0.0.0:8080";
