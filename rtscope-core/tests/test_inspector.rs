//! 記録済みダンプを使ったインスペクタのテスト

use rtscope_core::{Field, Inspector, KernelLayout, ReplaySession, ThreadName};

/// アイドルスレッドとメインスレッド、タイマ1つ、容量2のトレースバッファ
const DUMP: &str = r#"
# registry
(uint32_t)&rlist = 536872960
(uint32_t)((Thread *)536872960)->p_newer = 536873472
(uint32_t)((Thread *)536873472)->p_older = 536872960
(uint32_t)((Thread *)536873472)->p_ctx.r13 = 0x200008f0
(uint32_t)((Thread *)536873472)->p_name = 0x08002000 <ch_idle_thread_name>
(uint32_t)((Thread *)536873472)->p_state = 0
(uint32_t)((Thread *)536873472)->p_flags = 0
(uint32_t)((Thread *)536873472)->p_prio = 1
(uint32_t)((Thread *)536873472)->p_refs = 1
(uint32_t)((Thread *)536873472)->p_time = 5000
(uint32_t)((Thread *)536873472)->p_newer = 536873984
(uint32_t)((Thread *)536873984)->p_older = 536873472
(uint32_t)((Thread *)536873984)->p_ctx.r13 = 0x20000af0
(uint32_t)((Thread *)536873984)->p_name = 0
(uint32_t)((Thread *)536873984)->p_state = 1
(uint32_t)((Thread *)536873984)->p_flags = 0
(uint32_t)((Thread *)536873984)->p_prio = 64
(uint32_t)((Thread *)536873984)->p_refs = 1
(uint32_t)((Thread *)536873984)->p_time = 12
(uint32_t)((Thread *)536873984)->p_u.wtobjp = 0
(uint32_t)((Thread *)536873984)->p_newer = 536872960
(uint32_t)((Thread *)536872960)->p_older = 536873984
@0x08002000 "idle\0"

# timers
(uint32_t)&vtlist = 536871168
(uint32_t)((VirtualTimer *)536871168)->vt_next = 536871424
(uint32_t)((VirtualTimer *)536871424)->vt_prev = 536871168
(uint32_t)((VirtualTimer *)536871424)->vt_time = 250
(uint32_t)((VirtualTimer *)536871424)->vt_func = 0x08000401 <blink_cb>
(uint32_t)((VirtualTimer *)536871424)->vt_par = 0
(uint32_t)((VirtualTimer *)536871424)->vt_next = 536871168
(uint32_t)((VirtualTimer *)536871168)->vt_prev = 536871424

# trace buffer
(uint32_t)ch_dbg_trace_buffer.tb_size = 2
(uint32_t)sizeof (ch_swc_event_t) = 12
(uint32_t)ch_dbg_trace_buffer.tb_buffer = 4096
(uint32_t)&ch_dbg_trace_buffer.tb_buffer[2] = 4120
(uint32_t)ch_dbg_trace_buffer.tb_ptr = 4108
(uint32_t)((ch_swc_event_t *)4108)->se_time = 0
(uint32_t)((ch_swc_event_t *)4108)->se_tp = 0
(uint32_t)((ch_swc_event_t *)4108)->se_wtobjp = 0
(uint32_t)((ch_swc_event_t *)4108)->se_state = 0
(uint32_t)((ch_swc_event_t *)4096)->se_time = 77
(uint32_t)((ch_swc_event_t *)4096)->se_tp = 536873984
(uint32_t)((ch_swc_event_t *)4096)->se_wtobjp = 0
(uint32_t)((ch_swc_event_t *)4096)->se_state = 6
"#;

fn inspector() -> Inspector<ReplaySession> {
    Inspector::new(DUMP.parse().unwrap())
}

#[test]
fn test_threads_from_dump() {
    let mut inspector = inspector();
    let threads = inspector.threads().unwrap().unwrap();

    assert_eq!(threads.key_strings(), vec!["536873472", "536873984"]);

    let idle = threads.get(&536873472).unwrap();
    assert_eq!(idle.name, ThreadName::Named("idle".to_string()));
    assert_eq!(idle.state.name(), "READY");
    assert_eq!(idle.wait_object, Field::Missing);

    let main = threads.get(&536873984).unwrap();
    assert_eq!(main.name.to_string(), "<no name>");
    assert_eq!(main.state.name(), "CURRENT");
    assert_eq!(main.stack, Field::Present(0x2000_0af0));
}

#[test]
fn test_timers_from_dump() {
    let mut inspector = inspector();
    let timers = inspector.timers().unwrap().unwrap();

    assert_eq!(timers.len(), 1);
    let timer = timers.get(&536871424).unwrap();
    assert_eq!(timer.delta, 250);
    assert_eq!(timer.func, 0x0800_0401);
    assert_eq!(timer.par, 0);
}

#[test]
fn test_trace_from_dump() {
    let mut inspector = inspector();
    let events = inspector.trace().unwrap().unwrap();

    // スロット 4108(-1, 空), 4096(0), 4108(1, 空)
    assert_eq!(events.key_strings(), vec!["0"]);
    let event = events.get(&0).unwrap();
    assert_eq!(event.time, 77);
    assert_eq!(event.thread, 536873984);
    assert_eq!(event.state.name(), "SLEEPING");
}

#[test]
fn test_running_target_yields_no_data() {
    let mut inspector = inspector();
    inspector.session_mut().set_running(true);

    assert_eq!(inspector.threads(), Ok(None));
    assert_eq!(inspector.timers(), Ok(None));
    assert_eq!(inspector.trace(), Ok(None));

    inspector.session_mut().set_running(false);
    assert!(inspector.threads().unwrap().is_some());
}

#[test]
fn test_layout_swap() {
    let mut inspector = inspector();
    inspector.set_layout(KernelLayout::default().with_registry_symbol("ch.rlist"));

    assert!(inspector.threads().is_err());
    assert_eq!(inspector.layout().registry_symbol, "ch.rlist");
}
