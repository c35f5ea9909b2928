//! 仮想タイマのデルタリスト走査のテスト

use rtscope_core::{
    read_timers, Corruption, KernelLayout, ReplaySession, SessionError, TimerListError,
    TimerRecord,
};

const VTLIST: u64 = 0x2000_0100;

fn field(node: u64, member: &str) -> String {
    KernelLayout::default().timer_field(node, member)
}

fn timer_at(i: usize) -> u64 {
    0x2000_2000 + 0x40 * i as u64
}

/// ヘッドと `count` 個のタイマからなる正しいデルタリストを作る
fn delta_list(count: usize) -> ReplaySession {
    let mut session = ReplaySession::new().with_value("(uint32_t)&vtlist", format!("{:#x}", VTLIST));

    let ring: Vec<u64> = std::iter::once(VTLIST)
        .chain((0..count).map(timer_at))
        .collect();
    for (i, &node) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()];
        let prev = ring[(i + ring.len() - 1) % ring.len()];
        session.set_value(field(node, "vt_next"), next.to_string());
        session.set_value(field(node, "vt_prev"), prev.to_string());
    }

    for i in 0..count {
        let node = timer_at(i);
        session.set_value(field(node, "vt_time"), (5 * (i + 1)).to_string());
        session.set_value(field(node, "vt_func"), format!("0x{:x} <timer_cb>", 0x0800_0100 + i));
        session.set_value(field(node, "vt_par"), node.to_string());
    }

    session
}

#[test]
fn test_walk_returns_every_timer_in_order() {
    for count in [1, 2, 6] {
        let mut session = delta_list(count);
        let timers = read_timers(&mut session, &KernelLayout::default())
            .unwrap()
            .unwrap();

        let expected: Vec<u64> = (0..count).map(timer_at).collect();
        assert_eq!(timers.keys().copied().collect::<Vec<_>>(), expected);
    }
}

#[test]
fn test_timer_fields() {
    let mut session = delta_list(2);
    let timers = read_timers(&mut session, &KernelLayout::default())
        .unwrap()
        .unwrap();

    assert_eq!(
        timers.get(&timer_at(1)),
        Some(&TimerRecord {
            address: timer_at(1),
            delta: 10,
            func: 0x0800_0101,
            par: timer_at(1),
        })
    );
}

#[test]
fn test_mandatory_field_failure_aborts() {
    for member in ["vt_time", "vt_func", "vt_par"] {
        let mut session = delta_list(3);
        let expr = field(timer_at(1), member);
        session.remove_value(&expr);

        assert_eq!(
            read_timers(&mut session, &KernelLayout::default()),
            Err(TimerListError::Session(SessionError::EvaluationFailed {
                expr: expr.clone()
            }))
        );
        // 失敗したノードの先は読まない
        assert!(!session
            .transcript()
            .contains(&field(timer_at(2), "vt_prev")));
    }
}

#[test]
fn test_malformed_field_value() {
    let mut session = delta_list(1);
    session.set_value(field(timer_at(0), "vt_time"), "<optimized out>");

    assert!(matches!(
        read_timers(&mut session, &KernelLayout::default()),
        Err(TimerListError::Session(SessionError::Malformed { .. }))
    ));
}

#[test]
fn test_back_link_mismatch() {
    let mut session = delta_list(2);
    session.set_value(field(VTLIST, "vt_prev"), timer_at(0).to_string());

    let err = read_timers(&mut session, &KernelLayout::default()).unwrap_err();
    assert_eq!(
        err,
        TimerListError::Corrupt(Corruption::LinkMismatch {
            node: VTLIST,
            expected: timer_at(1),
            found: timer_at(0),
        })
    );
    assert!(err.to_string().contains("double linked list violation"));
}

#[test]
fn test_null_links() {
    let mut session = delta_list(2);
    session.set_value(field(timer_at(0), "vt_next"), "0");
    assert!(matches!(
        read_timers(&mut session, &KernelLayout::default()),
        Err(TimerListError::Corrupt(Corruption::NullLink { link: "vt_next", .. }))
    ));

    let mut session = delta_list(2);
    session.set_value(field(timer_at(1), "vt_prev"), "0");
    let err = read_timers(&mut session, &KernelLayout::default()).unwrap_err();
    assert!(matches!(
        err,
        TimerListError::Corrupt(Corruption::NullLink { link: "vt_prev", .. })
    ));
    assert!(err.to_string().contains("NULL pointer"));
}

#[test]
fn test_running_target_returns_none() {
    let mut session = delta_list(2);
    session.set_running(true);

    assert_eq!(read_timers(&mut session, &KernelLayout::default()), Ok(None));
}
