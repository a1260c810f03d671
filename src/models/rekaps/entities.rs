use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::recalculator::RekapCounts;
use crate::config::HonorConfig;
use crate::errors::{RekapError, Result};

// 酬金档位
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export, export_to = "rekap.ts")]
pub enum HonorTier {
    A,
    B,
    C,
    D,
    E,
}

impl std::fmt::Display for HonorTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HonorTier::A => "A",
            HonorTier::B => "B",
            HonorTier::C => "C",
            HonorTier::D => "D",
            HonorTier::E => "E",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for HonorTier {
    type Err = RekapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(HonorTier::A),
            "B" => Ok(HonorTier::B),
            "C" => Ok(HonorTier::C),
            "D" => Ok(HonorTier::D),
            "E" => Ok(HonorTier::E),
            _ => Err(RekapError::invalid_tier(format!(
                "Unknown honor tier '{s}', expected one of A, B, C, D, E"
            ))),
        }
    }
}

/// 档位 → 每次课费率表
///
/// 由配置构造并注入存储层，测试可自行覆盖。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HonorRates {
    rates: [i64; 5],
}

impl HonorRates {
    pub fn new(a: i64, b: i64, c: i64, d: i64, e: i64) -> Self {
        Self {
            rates: [a, b, c, d, e],
        }
    }

    pub fn rate_for(&self, tier: HonorTier) -> i64 {
        let idx = match tier {
            HonorTier::A => 0,
            HonorTier::B => 1,
            HonorTier::C => 2,
            HonorTier::D => 3,
            HonorTier::E => 4,
        };
        self.rates[idx]
    }

    /// 解析档位并返回 (档位, 费率)，无法识别时返回 `InvalidTier`
    pub fn resolve(&self, tier: &str) -> Result<(HonorTier, i64)> {
        let tier: HonorTier = tier.parse()?;
        Ok((tier, self.rate_for(tier)))
    }
}

impl Default for HonorRates {
    fn default() -> Self {
        Self::from(&HonorConfig::default())
    }
}

impl From<&HonorConfig> for HonorRates {
    fn from(config: &HonorConfig) -> Self {
        Self::new(config.a, config.b, config.c, config.d, config.e)
    }
}

// 助教考勤汇总
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "rekap.ts")]
pub struct Rekap {
    pub id: i64,
    pub assistant_id: i64,
    pub count_present: i64,
    pub count_excused: i64,
    pub count_absent: i64,
    pub count_substitute: i64,
    pub honor_tier: Option<HonorTier>,
    pub rate_per_session: i64,
    // 派生值，只能由计数与费率计算得出
    pub total_honor: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Rekap {
    pub fn counts(&self) -> RekapCounts {
        RekapCounts {
            present: self.count_present,
            excused: self.count_excused,
            absent: self.count_absent,
            substitute: self.count_substitute,
        }
    }

    /// 汇总行是否满足 total_honor = rate * (present + substitute)
    pub fn is_consistent(&self) -> bool {
        self.total_honor == self.counts().total_honor(self.rate_per_session)
    }
}
