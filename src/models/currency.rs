use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Currencies a ledger row or reference series may be denominated in.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Chf,
    Cad,
    Aud,
    Nzd,
    Hkd,
    Sgd,
    Inr,
    Cny,
    Krw,
    Twd,
    Sek,
    Nok,
    Dkk,
    Pln,
    Zar,
    Mxn,
    Brl,
}

impl Currency {
    pub fn parse_code(code: &str) -> Option<Currency> {
        code.trim().parse().ok()
    }
}
