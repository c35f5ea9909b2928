//! 収集したカーネルオブジェクトのレコード

use crate::state::state_name;
use std::fmt;

/// 読み取れなかったフィールドを表す記号
pub const MISSING: &str = "-";

/// カーネルのビルドによっては存在しないフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    /// 読み取れた値
    Present(T),
    /// メンバーが存在しないか評価に失敗した（`-` と表示）
    Missing,
}

impl<T> Field<T> {
    /// 値があれば取得する
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Missing, Field::Present)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Present(v) => fmt::Display::fmt(v, f),
            Field::Missing => f.write_str(MISSING),
        }
    }
}

/// スレッド名
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadName {
    /// 名前の文字列
    Named(String),
    /// 名前ポインタがNULL（`<no name>` と表示）
    Anonymous,
    /// 名前メンバーが存在しないか読み取りに失敗した（`-` と表示）
    Missing,
}

impl fmt::Display for ThreadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadName::Named(name) => f.write_str(name),
            ThreadName::Anonymous => f.write_str("<no name>"),
            ThreadName::Missing => f.write_str(MISSING),
        }
    }
}

/// スレッド状態コード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadState {
    pub code: u64,
}

impl ThreadState {
    pub fn new(code: u64) -> Self {
        Self { code }
    }

    /// 状態名（範囲外なら `unknown`）
    pub fn name(&self) -> &'static str {
        state_name(self.code)
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// レジストリ上のスレッド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    /// スレッド制御ブロックのアドレス
    pub address: u64,
    /// 保存されたスタックポインタ
    pub stack: Field<u64>,
    pub name: ThreadName,
    pub state: ThreadState,
    pub flags: u64,
    pub priority: u64,
    /// 参照カウント
    pub refs: Field<u64>,
    /// 稼働時間カウンタ
    pub time: Field<u64>,
    /// 待機中のオブジェクト
    pub wait_object: Field<u64>,
}

/// デルタリスト上の仮想タイマ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRecord {
    /// タイマブロックのアドレス
    pub address: u64,
    /// 直前のタイマからの相対ティック数
    pub delta: u64,
    /// コールバック関数
    pub func: u64,
    /// コールバック引数
    pub par: u64,
}

/// トレースバッファのコンテキストスイッチイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// 最新イベントからの相対インデックス
    pub index: i64,
    pub time: u64,
    /// 切り替え先のスレッド
    pub thread: u64,
    pub wait_object: u64,
    pub state: ThreadState,
}

/// 挿入順を保持するレコードの集合
///
/// キーの順序は走査順そのものなので、ハッシュ順の集合は使わない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Records<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Records<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 挿入順にキーを取得する
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// 挿入順に値を取得する
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// 挿入順にエントリを取得する
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: PartialEq, V> Records<K, V> {
    /// エントリを追加する
    ///
    /// 既存のキーなら位置を保ったまま値を置き換え、古い値を返す。
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

impl<K: fmt::Display, V> Records<K, V> {
    /// キーを10進数テキストで取得する
    pub fn key_strings(&self) -> Vec<String> {
        self.keys().map(|k| k.to_string()).collect()
    }
}

impl<K, V> Default for Records<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> IntoIterator for Records<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// スレッドアドレス -> スレッド
pub type ThreadMap = Records<u64, ThreadRecord>;

/// タイマアドレス -> タイマ
pub type TimerMap = Records<u64, TimerRecord>;

/// 相対インデックス -> トレースイベント
pub type TraceMap = Records<i64, TraceEvent>;
