//! トレースバッファ読み取りのテスト

use rtscope_core::{
    read_trace_buffer, KernelLayout, ReplaySession, SessionError, TraceBufferError,
};

const START: u64 = 0x2000_3000;
const EVENT_SIZE: u64 = 16;

fn slot(i: u64) -> u64 {
    START + EVENT_SIZE * i
}

/// 容量 `threads.len()` のリングを作る。`threads[i]` が 0 のスロットは未使用
fn ring(threads: &[u64], write_slot: u64) -> ReplaySession {
    let layout = KernelLayout::default();
    let capacity = threads.len() as u64;

    let mut session = ReplaySession::new()
        .with_value("(uint32_t)ch_dbg_trace_buffer.tb_size", capacity.to_string())
        .with_value("(uint32_t)sizeof (ch_swc_event_t)", EVENT_SIZE.to_string())
        .with_value("(uint32_t)ch_dbg_trace_buffer.tb_buffer", START.to_string())
        .with_value(
            format!("(uint32_t)&ch_dbg_trace_buffer.tb_buffer[{}]", capacity),
            slot(capacity).to_string(),
        )
        .with_value("(uint32_t)ch_dbg_trace_buffer.tb_ptr", slot(write_slot).to_string());

    for (i, &thread) in threads.iter().enumerate() {
        let at = slot(i as u64);
        session.set_value(layout.trace_event_field(at, "se_time"), (1000 + i).to_string());
        session.set_value(layout.trace_event_field(at, "se_tp"), thread.to_string());
        session.set_value(layout.trace_event_field(at, "se_wtobjp"), "0");
        session.set_value(layout.trace_event_field(at, "se_state"), "6");
    }

    session
}

#[test]
fn test_sweep_order_from_write_pointer() {
    // スロット2が次の書き込み位置で未使用
    let threads = [0xa0, 0xa1, 0, 0xa3];
    let mut session = ring(&threads, 2);

    let events = read_trace_buffer(&mut session, &KernelLayout::default())
        .unwrap()
        .unwrap();

    // スロット 3, 0, 1 の順（古い順）
    assert_eq!(events.keys().copied().collect::<Vec<_>>(), vec![-2, -1, 0]);
    assert_eq!(events.key_strings(), vec!["-2", "-1", "0"]);
    let thread_order: Vec<u64> = events.values().map(|e| e.thread).collect();
    assert_eq!(thread_order, vec![0xa3, 0xa0, 0xa1]);

    let newest = events.get(&0).unwrap();
    assert_eq!(newest.index, 0);
    assert_eq!(newest.time, 1001);
    assert_eq!(newest.state.name(), "SLEEPING");
}

#[test]
fn test_empty_slots_are_skipped() {
    let threads = [0, 0xb1, 0, 0, 0xb4, 0xb5, 0, 0];
    let written = threads.iter().filter(|&&t| t != 0).count();
    let mut session = ring(&threads, 0);

    let events = read_trace_buffer(&mut session, &KernelLayout::default())
        .unwrap()
        .unwrap();

    assert_eq!(events.len(), written);
    assert!(events.values().all(|e| e.thread != 0));
}

#[test]
fn test_never_written_ring_is_empty() {
    let mut session = ring(&[0; 4], 0);
    let events = read_trace_buffer(&mut session, &KernelLayout::default())
        .unwrap()
        .unwrap();
    assert!(events.is_empty());
}

#[test]
fn test_full_ring_visits_write_slot_twice() {
    // capacity + 1 回読むので、書き込み位置のスロットは先頭と末尾の両方に現れる
    let threads = [0xc0, 0xc1, 0xc2, 0xc3];
    let mut session = ring(&threads, 1);

    let events = read_trace_buffer(&mut session, &KernelLayout::default())
        .unwrap()
        .unwrap();

    assert_eq!(events.keys().copied().collect::<Vec<_>>(), vec![-3, -2, -1, 0, 1]);
    assert_eq!(events.get(&-3).unwrap().thread, 0xc1);
    assert_eq!(events.get(&1).unwrap().thread, 0xc1);
    assert_eq!(events.get(&0).unwrap().thread, 0xc0);
}

#[test]
fn test_sweep_round_trips() {
    let threads = [0xd0, 0xd1, 0xd2];
    let mut session = ring(&threads, 0);
    read_trace_buffer(&mut session, &KernelLayout::default())
        .unwrap()
        .unwrap();

    // 形状5回 + (容量+1)スロット × 4フィールド
    assert_eq!(session.transcript().len(), 5 + 4 * 4);
}

#[test]
fn test_trace_buffer_not_present() {
    let mut session = ReplaySession::new();
    let err = read_trace_buffer(&mut session, &KernelLayout::default()).unwrap_err();

    assert!(matches!(err, TraceBufferError::NotPresent { .. }));
    assert_eq!(err.to_string(), "trace buffer not found on target");
}

#[test]
fn test_slot_read_failure_propagates() {
    let layout = KernelLayout::default();
    let mut session = ring(&[0xe0, 0xe1], 0);
    let expr = layout.trace_event_field(slot(1), "se_state");
    session.remove_value(&expr);

    assert_eq!(
        read_trace_buffer(&mut session, &layout),
        Err(TraceBufferError::Session(SessionError::EvaluationFailed { expr }))
    );
}

#[test]
fn test_running_target_returns_none() {
    let mut session = ring(&[0xf0, 0xf1], 0);
    session.set_running(true);

    assert_eq!(read_trace_buffer(&mut session, &KernelLayout::default()), Ok(None));
    assert!(session.transcript().is_empty());
}
