//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum shared by every client crate.

use serde::Serialize;

/// エラー種別の列挙体
///
/// クライアント側で扱うエラーの分類を定義します。
/// リモートの ID サービスから返る失敗も、ローカルの設定エラーも、
/// いずれかのバリアントに分類されます。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.as_str(), "Not Found");
/// assert!(!kind.is_retryable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 入力値が不正
    InvalidInput,
    /// 認証されていない / 認証情報が無効
    Unauthenticated,
    /// 対象が存在しない
    NotFound,
    /// 現在の状態と競合（既に存在する等）
    Conflict,
    /// 期限切れ（確認コード、トークン等）
    Expired,
    /// レート制限超過
    RateLimited,
    /// タイムアウト
    Timeout,
    /// リモートサービス利用不可
    Unavailable,
    /// 内部エラー
    Internal,
}

impl ErrorKind {
    /// ユーザー向けの文字列表現を取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::InvalidInput.as_str(), "Invalid Input");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid Input",
            ErrorKind::Unauthenticated => "Unauthenticated",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Expired => "Expired",
            ErrorKind::RateLimited => "Rate Limited",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::Internal => "Internal",
        }
    }

    /// HTTP ステータスコードから種別を推定
    ///
    /// リモートサービスがエラー種別を返さなかった場合に使用します。
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::InvalidInput,
            401 | 403 => ErrorKind::Unauthenticated,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            408 | 504 => ErrorKind::Timeout,
            410 => ErrorKind::Expired,
            429 => ErrorKind::RateLimited,
            502 | 503 => ErrorKind::Unavailable,
            _ => ErrorKind::Internal,
        }
    }

    /// 再試行で解消し得るエラーかどうか
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::Timeout | ErrorKind::Unavailable
        )
    }

    /// ユーザーの操作（入力の修正等）で解消すべきエラーかどうか
    ///
    /// これ以外のエラーはログに記録すべきです。
    #[inline]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidInput
                | ErrorKind::Unauthenticated
                | ErrorKind::NotFound
                | ErrorKind::Conflict
                | ErrorKind::Expired
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
