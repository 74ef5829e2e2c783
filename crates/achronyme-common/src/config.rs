/// Engine-wide tunables. No files, no environment variables: hosts build
/// one of these and hand it to the engine at construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// When true (the default), `ifft` of a spectrum whose inverse has a
    /// non-negligible imaginary part is an error; when false the complex
    /// result is returned as-is.
    pub strict_ifft: bool,
    /// Upper bound on any FFT working-buffer length (the chirp-z
    /// convolution size for non-power-of-two transforms). A transform
    /// that would exceed this fails with `Overflow` instead of
    /// attempting the allocation.
    pub max_fft_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strict_ifft: true,
            max_fft_len: 1 << 24,
        }
    }
}
