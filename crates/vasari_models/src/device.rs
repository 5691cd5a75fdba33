//! Accelerator selection for in-process backends.

/// Where model weights live and decoding runs.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceKind {
    /// Host CPU
    Cpu,
    /// First CUDA device
    #[default]
    Cuda,
    /// Apple Metal (`mps` is accepted as an alias)
    #[strum(to_string = "metal", serialize = "mps")]
    #[serde(alias = "mps")]
    Metal,
}

impl DeviceKind {
    /// Whether this device is an accelerator.
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, DeviceKind::Cpu)
    }
}
