//! Backend selection.
//!
//! Every dispatching function in this crate summons its archmage token on
//! each call (archmage caches the CPU probe) and falls back to the scalar
//! implementation when the token is unavailable. Kernels that run many
//! operations back to back should summon once with [`simd_token`] and call
//! the backend modules directly.

use core::fmt;

/// Run `$simd` with the native backend bound to `$backend` and its token to
/// `$token`, returning its value; otherwise evaluate `$scalar`.
///
/// Both backends export the same function names, so one expression serves
/// x86-64 and AArch64.
macro_rules! simd_dispatch {
    ($token:ident, $backend:ident => $simd:expr; $scalar:expr) => {{
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            use crate::simd_sse as $backend;
            use archmage::SimdToken as _;
            if let Some($token) = archmage::X64V3Token::summon() {
                return $simd;
            }
        }
        #[cfg(all(feature = "simd", target_arch = "aarch64"))]
        {
            use crate::simd_neon as $backend;
            use archmage::SimdToken as _;
            if let Some($token) = archmage::NeonToken::summon() {
                return $simd;
            }
        }
        $scalar
    }};
}

pub(crate) use simd_dispatch;

/// Token type for the native backend on this target.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub type SimdTokenType = Option<archmage::X64V3Token>;

/// Token type for the native backend on this target.
#[cfg(all(feature = "simd", target_arch = "aarch64"))]
pub type SimdTokenType = Option<archmage::NeonToken>;

/// Token type for the native backend on this target.
#[cfg(not(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64"))))]
pub type SimdTokenType = Option<()>;

/// Summon the native backend token, if the CPU supports it.
#[inline]
pub fn simd_token() -> SimdTokenType {
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        use archmage::SimdToken;
        archmage::X64V3Token::summon()
    }

    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    {
        use archmage::SimdToken;
        archmage::NeonToken::summon()
    }

    #[cfg(not(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64"))))]
    {
        None
    }
}

/// Which implementation the dispatching functions currently run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdBackend {
    /// x86-64 SSE path (x86-64-v3 token).
    Sse,
    /// AArch64 NEON path.
    Neon,
    /// Portable scalar fallback.
    Scalar,
}

impl SimdBackend {
    /// Probe the CPU and report the backend dispatching functions will use.
    pub fn detect() -> Self {
        let backend = match simd_token() {
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Some(_) => SimdBackend::Sse,
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Some(_) => SimdBackend::Neon,
            _ => SimdBackend::Scalar,
        };
        log::debug!(
            "zenvec backend: {backend} (overread masking {})",
            if crate::overread::MASKING_ENABLED {
                "on"
            } else {
                "off"
            }
        );
        backend
    }

    /// Whether this backend uses vector instructions.
    pub fn is_simd(self) -> bool {
        !matches!(self, SimdBackend::Scalar)
    }
}

impl fmt::Display for SimdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimdBackend::Sse => "sse",
            SimdBackend::Neon => "neon",
            SimdBackend::Scalar => "scalar",
        })
    }
}
