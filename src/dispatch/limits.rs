use crate::config::LimitsConfig;
use crate::types::{AppError, AppResult, SizeTier};

/// Tier-aware view over the configured byte ceilings.
#[derive(Debug, Clone, Copy)]
pub struct SizeLimits {
    config: LimitsConfig,
}

impl SizeLimits {
    pub fn new(config: LimitsConfig) -> Self {
        Self { config }
    }

    pub fn limit_for(&self, tier: SizeTier) -> u64 {
        match tier {
            SizeTier::Upload => self.config.max_upload_bytes,
            SizeTier::Inline | SizeTier::ConvertedPdf => self.config.max_inline_bytes,
            SizeTier::Conversion => self.config.max_conversion_bytes,
        }
    }

    /// A size equal to the limit passes; only strictly larger sizes fail.
    pub fn check(&self, tier: SizeTier, size: u64) -> AppResult<()> {
        let limit = self.limit_for(tier);
        if size > limit {
            return Err(AppError::PayloadTooLarge { tier, size, limit });
        }
        Ok(())
    }
}
