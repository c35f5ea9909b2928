//! REPLコマンド

/// REPLコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// スレッド一覧表示
    Threads,
    /// タイマ一覧表示
    Timers,
    /// トレースバッファ表示
    Trace,
    /// ヘルプ表示
    Help,
    /// 終了
    Quit,
}

impl Command {
    /// コマンド文字列をパースする
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() != 1 {
            return None;
        }

        match parts[0] {
            "threads" | "th" => Some(Command::Threads),
            "timers" | "vt" => Some(Command::Timers),
            "trace" | "tb" => Some(Command::Trace),
            "help" | "h" | "?" => Some(Command::Help),
            "quit" | "q" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("threads"), Some(Command::Threads));
        assert_eq!(Command::parse("th"), Some(Command::Threads));
        assert_eq!(Command::parse("  vt "), Some(Command::Timers));
        assert_eq!(Command::parse("trace"), Some(Command::Trace));
        assert_eq!(Command::parse("?"), Some(Command::Help));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_invalid_commands() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("threads now"), None);
        assert_eq!(Command::parse("continue"), None);
    }
}
