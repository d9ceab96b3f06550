// Mon Oct 19 2026 - Alex

use crate::abi::{AbiProfile, SizeClass};
use crate::error::LayoutError;
use crate::layout::{BaseLayoutPolicy, PolicyKind};
use crate::output::OffsetFormat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundamentalOverride {
    pub size: u64,
    pub align: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profile: String,
    /// Keyed by fundamental spelling, e.g. `"long double"`.
    pub overrides: IndexMap<String, FundamentalOverride>,
    pub pointer_size: Option<u64>,
    pub base_policy: PolicyKind,
    pub cache_layouts: bool,
    pub offset_format: OffsetFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: "lp64".to_string(),
            overrides: IndexMap::new(),
            pointer_size: None,
            base_policy: PolicyKind::default(),
            cache_layouts: true,
            offset_format: OffsetFormat::Decimal,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_profile(mut self, profile: &str) -> Self {
        self.profile = profile.to_string();
        self
    }

    pub fn with_override(mut self, spelling: &str, size: u64, align: u64) -> Self {
        self.overrides.insert(spelling.to_string(), FundamentalOverride { size, align });
        self
    }

    pub fn with_pointer_size(mut self, size: u64) -> Self {
        self.pointer_size = Some(size);
        self
    }

    pub fn with_base_policy(mut self, policy: PolicyKind) -> Self {
        self.base_policy = policy;
        self
    }

    pub fn with_cache_layouts(mut self, enabled: bool) -> Self {
        self.cache_layouts = enabled;
        self
    }

    pub fn with_offset_format(mut self, format: OffsetFormat) -> Self {
        self.offset_format = format;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.abi_profile().map(|_| ()).map_err(|e| e.to_string())
    }

    /// The preset named by `profile` with every override applied.
    pub fn abi_profile(&self) -> Result<AbiProfile, LayoutError> {
        let preset = AbiProfile::preset(&self.profile)?;
        if self.overrides.is_empty() && self.pointer_size.is_none() {
            return Ok(preset);
        }

        let mut builder = AbiProfile::builder(preset);
        for (spelling, value) in &self.overrides {
            let class = SizeClass::from_spelling(spelling)
                .ok_or_else(|| LayoutError::InvalidProfile(format!("unknown fundamental type `{}`", spelling)))?;
            builder = builder.with_size_class(class, value.size, value.align);
        }
        if let Some(size) = self.pointer_size {
            builder = builder.with_pointer_size(size);
        }
        builder.build()
    }

    pub fn base_policy(&self) -> &'static dyn BaseLayoutPolicy {
        self.base_policy.policy()
    }
}
