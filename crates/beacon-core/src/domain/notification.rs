//! Notification - スケジューラが運ぶ 1 件のアラート
//!
//! payload（送金者・金額・メッセージなど）はスケジューラにとって不透明。
//! `kind` だけが表示時間の決定に使われる。

use serde::{Deserialize, Serialize};

/// Category of a support alert; selects how long it stays on screen.
///
/// Unrecognised wire values deserialize to `Unknown`, which is displayed for
/// the `Normal` duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportKind {
    Normal,
    Video,
    Ads,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One alert addressed to a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub from: String,
    #[serde(rename = "type", default)]
    pub kind: SupportKind,
    /// Raw token units. Carried as a decimal string on the wire since
    /// uint256-scale values overflow JSON numbers.
    #[serde(with = "decimal_string")]
    pub amount: u128,
    pub decimals: u8,
    pub symbol: String,
    pub message: String,
    pub network: String,
    #[serde(default)]
    pub ref_id: Option<String>,
}

impl Notification {
    const SAMPLE_SENDER: &'static str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
    const SAMPLE_MESSAGE: &'static str = "This is a test message This is a test message This is a test message This is a test message This is a test message This is a test message";

    /// Canned alert used by the dashboard "test alert" button.
    pub fn sample(kind: SupportKind, ref_id: Option<String>) -> Self {
        Self {
            from: Self::SAMPLE_SENDER.to_string(),
            kind,
            amount: 12_400_000,
            decimals: 6,
            symbol: "USDC".to_string(),
            message: Self::SAMPLE_MESSAGE.to_string(),
            network: "BASE".to_string(),
            ref_id,
        }
    }
}

mod decimal_string {
    use std::fmt;

    use serde::{Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl de::Visitor<'_> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or its decimal string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }
    }
}
