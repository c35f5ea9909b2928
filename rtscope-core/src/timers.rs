//! 仮想タイマのデルタリストの走査

use crate::errors::TimerListError;
use crate::layout::KernelLayout;
use crate::list::{self, CircularList};
use crate::probe::{settle, Halt, Probe};
use crate::record::{TimerMap, TimerRecord};
use rtscope_target::{SessionError, TargetSession};
use tracing::debug;

/// 仮想タイマのデルタリスト
struct DeltaList<'a> {
    layout: &'a KernelLayout,
}

impl DeltaList<'_> {
    /// 必須フィールドを読む。失敗は走査全体の失敗になる
    fn required<S: TargetSession + ?Sized>(
        &self,
        probe: &mut Probe<'_, S>,
        node: u64,
        member: &str,
    ) -> Result<u64, Halt<TimerListError>> {
        probe
            .value(&self.layout.timer_field(node, member))
            .map_err(Halt::widen::<TimerListError>)
    }
}

impl CircularList for DeltaList<'_> {
    type Record = TimerRecord;
    type Error = TimerListError;

    const FORWARD: &'static str = "vt_next";
    const BACKWARD: &'static str = "vt_prev";

    fn head_expr(&self) -> String {
        self.layout.timer_list_head()
    }

    fn head_missing(&self, source: SessionError) -> TimerListError {
        TimerListError::KernelNotPresent {
            symbol: self.layout.timer_list_symbol.clone(),
            source,
        }
    }

    fn link_expr(&self, node: u64, link: &str) -> String {
        self.layout.timer_field(node, link)
    }

    fn decode<S: TargetSession + ?Sized>(
        &self,
        probe: &mut Probe<'_, S>,
        node: u64,
    ) -> Result<TimerRecord, Halt<TimerListError>> {
        Ok(TimerRecord {
            address: node,
            delta: self.required(probe, node, "vt_time")?,
            func: self.required(probe, node, "vt_func")?,
            par: self.required(probe, node, "vt_par")?,
        })
    }
}

/// デルタリストを走査して待機中のタイマの一覧を返す
///
/// 戻り値のキーはタイマブロックのアドレスで、満了順（デルタリストの順）に並ぶ。
/// ターゲットが実行中なら `Ok(None)`。
pub fn read_timers<S>(session: &mut S, layout: &KernelLayout) -> Result<Option<TimerMap>, TimerListError>
where
    S: TargetSession + ?Sized,
{
    let mut probe = Probe::new(session);
    let timers = settle(list::walk(&DeltaList { layout }, &mut probe), "delta list")?;
    if let Some(timers) = &timers {
        debug!(count = timers.len(), "Delta list scanned");
    }
    Ok(timers)
}
