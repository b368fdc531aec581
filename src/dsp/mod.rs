/// Signal processing core: spectrum → waveform, spectrum → filtered spectrum.
///
/// ```text
///   Spectrum ──► lowpass::LowPass::apply ──► Spectrum
///      │                                        │
///      └──────────► synthesis::synthesize ◄─────┘
///                          │
///                          ▼
///                        Signal
/// ```

pub mod lowpass;
pub mod synthesis;
