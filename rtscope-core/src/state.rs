//! スレッド状態名の表

/// カーネルのスレッド状態コードに対応する名前（コード順）
pub const THREAD_STATES: [&str; 15] = [
    "READY",
    "CURRENT",
    "SUSPENDED",
    "WTSEM",
    "WTMTX",
    "WTCOND",
    "SLEEPING",
    "WTEXIT",
    "WTOREVT",
    "WTANDEVT",
    "SNDMSGQ",
    "SNDMSG",
    "WTMSG",
    "WTQUEUE",
    "FINAL",
];

/// 範囲外のコードに使う名前
pub const UNKNOWN_STATE: &str = "unknown";

/// 状態コードを名前に変換する
pub fn state_name(code: u64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| THREAD_STATES.get(i))
        .copied()
        .unwrap_or(UNKNOWN_STATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_name() {
        assert_eq!(state_name(0), "READY");
        assert_eq!(state_name(1), "CURRENT");
        assert_eq!(state_name(6), "SLEEPING");
        assert_eq!(state_name(14), "FINAL");
    }

    #[test]
    fn test_state_name_out_of_range() {
        assert_eq!(state_name(15), "unknown");
        assert_eq!(state_name(99), "unknown");
        assert_eq!(state_name(u64::MAX), "unknown");
    }
}
