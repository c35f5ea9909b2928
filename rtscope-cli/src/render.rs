//! 収集結果の表形式での表示

use rtscope_core::{ThreadMap, TimerMap, TraceMap};
use std::fmt::Write as _;

/// アドレスを16進数で整形する
fn addr(value: u64) -> String {
    format!("0x{:08x}", value)
}

/// スレッド一覧を表にする
pub fn threads(threads: &ThreadMap) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<10} {:<16} {:<10} {:>5} {:>5} {:>5} {:>10} {:<10}",
        "Address", "Stack", "Name", "State", "Flags", "Prio", "Refs", "Time", "Wait"
    );

    for record in threads.values() {
        let stack = record.stack.value().map_or_else(|| "-".to_string(), |&v| addr(v));
        let wait = record
            .wait_object
            .value()
            .map_or_else(|| "-".to_string(), |&v| addr(v));
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:<16} {:<10} {:>5} {:>5} {:>5} {:>10} {:<10}",
            addr(record.address),
            stack,
            record.name.to_string(),
            record.state.name(),
            record.flags,
            record.priority,
            record.refs.to_string(),
            record.time.to_string(),
            wait,
        );
    }

    let _ = write!(out, "{} thread(s)", threads.len());
    out
}

/// タイマ一覧を表にする
pub fn timers(timers: &TimerMap) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:<10} {:<10}",
        "Address", "Delta", "Function", "Argument"
    );

    for record in timers.values() {
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:<10} {:<10}",
            addr(record.address),
            record.delta,
            addr(record.func),
            addr(record.par),
        );
    }

    let _ = write!(out, "{} timer(s)", timers.len());
    out
}

/// トレースイベントを古い順に表にする
pub fn trace(events: &TraceMap) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:>10} {:<10} {:<10} {:<10}",
        "Index", "Time", "Thread", "State", "Wait"
    );

    for event in events.values() {
        let _ = writeln!(
            out,
            "{:>6} {:>10} {:<10} {:<10} {:<10}",
            event.index,
            event.time,
            addr(event.thread),
            event.state.name(),
            addr(event.wait_object),
        );
    }

    let _ = write!(out, "{} event(s)", events.len());
    out
}
