//! スレッドレジストリの走査
//!
//! レジストリはすべての生存スレッドをつなぐ双方向循環リストで、
//! `p_newer` / `p_older` メンバーでリンクされています。
//! カーネルのビルド設定やバージョンによって存在しないメンバーがあるため、
//! 省略可能なフィールドは候補を順に試し、すべて失敗したら `-` にします。

use crate::errors::RegistryError;
use crate::layout::KernelLayout;
use crate::list::{self, CircularList};
use crate::probe::{settle, tolerate, Halt, Probe};
use crate::record::{Field, ThreadMap, ThreadName, ThreadRecord, ThreadState};
use rtscope_target::{SessionError, TargetSession};
use tracing::debug;

/// 省略可能な数値フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Optional {
    Refs,
    Time,
    WaitObject,
}

/// 省略可能なフィールドとメンバー候補の表
const OPTIONAL_MEMBERS: [(Optional, &[&str]); 3] = [
    (Optional::Refs, &["p_refs"]),
    (Optional::Time, &["p_time"]),
    (Optional::WaitObject, &["p_u.wtobjp"]),
];

/// スレッドレジストリ
struct Registry<'a> {
    layout: &'a KernelLayout,
}

impl Registry<'_> {
    fn field(&self, node: u64, member: &str) -> String {
        self.layout.thread_field(node, member)
    }
}

impl CircularList for Registry<'_> {
    type Record = ThreadRecord;
    type Error = RegistryError;

    const FORWARD: &'static str = "p_newer";
    const BACKWARD: &'static str = "p_older";

    fn head_expr(&self) -> String {
        self.layout.registry_head()
    }

    fn head_missing(&self, source: SessionError) -> RegistryError {
        RegistryError::KernelNotPresent {
            symbol: self.layout.registry_symbol.clone(),
            source,
        }
    }

    fn link_expr(&self, node: u64, link: &str) -> String {
        self.field(node, link)
    }

    // p_newer はレジストリが無効なカーネルには存在しない
    fn forward_missing(&self, source: SessionError) -> RegistryError {
        RegistryError::TraceabilityDisabled { source }
    }

    fn decode<S: TargetSession + ?Sized>(
        &self,
        probe: &mut Probe<'_, S>,
        node: u64,
    ) -> Result<ThreadRecord, Halt<RegistryError>> {
        let stack = probe.first_of::<_, RegistryError>(
            self.layout
                .stack_members
                .iter()
                .map(|member| self.field(node, member)),
        )?;

        let name = self.decode_name(probe, node)?;

        let state = probe
            .value(&self.field(node, "p_state"))
            .map_err(Halt::widen::<RegistryError>)?;
        let flags = probe
            .value(&self.field(node, "p_flags"))
            .map_err(Halt::widen::<RegistryError>)?;
        let priority = probe
            .value(&self.field(node, "p_prio"))
            .map_err(Halt::widen::<RegistryError>)?;

        let mut record = ThreadRecord {
            address: node,
            stack,
            name,
            state: ThreadState::new(state),
            flags,
            priority,
            refs: Field::Missing,
            time: Field::Missing,
            wait_object: Field::Missing,
        };

        for (slot, members) in OPTIONAL_MEMBERS {
            let candidates = members.iter().map(|member| self.field(node, member));
            let value = probe.first_of::<_, RegistryError>(candidates)?;
            match slot {
                Optional::Refs => record.refs = value,
                Optional::Time => record.time = value,
                Optional::WaitObject => record.wait_object = value,
            }
        }

        Ok(record)
    }
}

impl Registry<'_> {
    /// 名前ポインタを読み、NULLでなければ指す文字列を読む
    fn decode_name<S: TargetSession + ?Sized>(
        &self,
        probe: &mut Probe<'_, S>,
        node: u64,
    ) -> Result<ThreadName, Halt<RegistryError>> {
        let pointer = probe.value(&self.field(node, "p_name"));
        let name = match tolerate::<_, RegistryError>(pointer)? {
            None => ThreadName::Missing,
            Some(0) => ThreadName::Anonymous,
            Some(address) => {
                let text = probe.string(address, self.layout.name_max_len);
                match tolerate::<_, RegistryError>(text)? {
                    Some(name) => ThreadName::Named(name),
                    None => ThreadName::Missing,
                }
            }
        };
        Ok(name)
    }
}

/// スレッドレジストリを走査してスレッドの一覧を返す
///
/// 戻り値のキーはスレッド制御ブロックのアドレスで、レジストリの登録順に並ぶ。
///
/// # Returns
/// * `Ok(None)` - ターゲットが実行中（後で再試行する）
///
/// # Errors
/// * `KernelNotPresent` - レジストリのシンボルが解決できない
/// * `TraceabilityDisabled` - カーネルでレジストリが無効
/// * `Corrupt` - リンクの整合性違反
/// * `Session` - 必須フィールドの読み取り失敗
pub fn read_threads<S>(session: &mut S, layout: &KernelLayout) -> Result<Option<ThreadMap>, RegistryError>
where
    S: TargetSession + ?Sized,
{
    let mut probe = Probe::new(session);
    let threads = settle(list::walk(&Registry { layout }, &mut probe), "registry")?;
    if let Some(threads) = &threads {
        debug!(count = threads.len(), "Registry scanned");
    }
    Ok(threads)
}
