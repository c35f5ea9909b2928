//! ターゲットに送る式の構築
//!
//! デバッガの評価器が理解する C 形式の式を組み立てます。
//! 評価そのものはターゲット側で行われ、ここでは式テキストを生成するだけです。

use std::fmt;

/// 評価結果を整数として受け取るためのキャスト先
pub const SCALAR: &str = "uint32_t";

/// C 形式の式の抽象構文木
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// シンボル名: `rlist`
    Symbol(String),
    /// 整数リテラル（アドレス）: `536873984`
    Literal(u64),
    /// アドレス取得: `&x`
    AddressOf(Box<Expression>),
    /// キャスト: `(T)x`
    Cast { ty: String, inner: Box<Expression> },
    /// 型のサイズ: `sizeof (T)`
    SizeOf(String),
    /// メンバーアクセス: `obj.field`
    Member {
        base: Box<Expression>,
        field: String,
    },
    /// ポインタ経由のメンバーアクセス: `ptr->field`
    Arrow {
        base: Box<Expression>,
        field: String,
    },
    /// 配列インデックスアクセス: `arr[0]`
    Index {
        base: Box<Expression>,
        index: u64,
    },
}

impl Expression {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::Symbol(name.into())
    }

    pub fn literal(value: u64) -> Self {
        Expression::Literal(value)
    }

    pub fn size_of(ty: impl Into<String>) -> Self {
        Expression::SizeOf(ty.into())
    }

    /// `address` を `T *` として扱う: `((T *)address)`
    pub fn pointer(ty: &str, address: u64) -> Self {
        Expression::literal(address).cast(format!("{} *", ty))
    }

    pub fn address_of(self) -> Self {
        Expression::AddressOf(Box::new(self))
    }

    pub fn cast(self, ty: impl Into<String>) -> Self {
        Expression::Cast {
            ty: ty.into(),
            inner: Box::new(self),
        }
    }

    pub fn member(self, field: impl Into<String>) -> Self {
        Expression::Member {
            base: Box::new(self),
            field: field.into(),
        }
    }

    pub fn arrow(self, field: impl Into<String>) -> Self {
        Expression::Arrow {
            base: Box::new(self),
            field: field.into(),
        }
    }

    pub fn index(self, index: u64) -> Self {
        Expression::Index {
            base: Box::new(self),
            index,
        }
    }

    /// 整数として評価されるようにキャストする
    pub fn scalar(self) -> Self {
        self.cast(SCALAR)
    }

    /// 後置演算子のオペランドとして括弧が必要か
    fn is_prefix(&self) -> bool {
        matches!(
            self,
            Expression::AddressOf(_) | Expression::Cast { .. } | Expression::SizeOf(_)
        )
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_prefix() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Symbol(name) => f.write_str(name),
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::AddressOf(inner) => write!(f, "&{}", inner),
            Expression::Cast { ty, inner } => write!(f, "({}){}", ty, inner),
            Expression::SizeOf(ty) => write!(f, "sizeof ({})", ty),
            Expression::Member { base, field } => {
                base.fmt_operand(f)?;
                write!(f, ".{}", field)
            }
            Expression::Arrow { base, field } => {
                base.fmt_operand(f)?;
                write!(f, "->{}", field)
            }
            Expression::Index { base, index } => {
                base.fmt_operand(f)?;
                write!(f, "[{}]", index)
            }
        }
    }
}
