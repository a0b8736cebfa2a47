//! Fixed K-matrix tables for the four waves of the ηπ analysis.
//!
//! Purpose
//! -------
//! Provide the published pole masses, couplings, and background terms for
//! the f0, f2, a0, and a2 waves as validated [`WaveConfig`] values.
//!
//! Conventions
//! -----------
//! - Channel masses are PDG values in GeV: π⁰ 0.13498, π 0.26995 (2π
//!   system), K 0.49368 / 0.49761, η 0.54786, η′ 0.95778.
//! - Couplings are listed per resonance, one entry per channel.
//! - The KK̄ channel is the output channel of every wave: index 2 for f0 and
//!   f2, index 1 for a0 and a2.
//!
//! Testing notes
//! -------------
//! - Tests check that every table validates and has the expected shape; the
//!   a2 reference kinematics are pinned in `models::resonance`.
use crate::kmatrix::{
    core::{
        channel::Channel,
        config::{AdlerZero, Resonance, WaveConfig},
        numeric::Float,
    },
    errors::KMatrixResult,
};
use nalgebra::DMatrix;

const PI0: Float = 0.13498;
const PI2: Float = 0.26995;
const K_CH: Float = 0.49368;
const K_NEUTRAL: Float = 0.49761;
const ETA: Float = 0.54786;
const ETA_PRIME: Float = 0.95778;

/// Adler zero of the f0 wave.
pub const F0_ADLER_ZERO: AdlerZero = AdlerZero::new(0.0091125, 1.0);

/// Output (KK̄) channel index for the isoscalar waves.
pub const F_OUTPUT_CHANNEL: usize = 2;

/// Output (KK̄) channel index for the isovector waves.
pub const A_OUTPUT_CHANNEL: usize = 1;

fn f_channels(n: usize) -> Vec<Channel> {
    [
        Channel::new(PI0, PI0),
        Channel::new(PI2, PI2),
        Channel::new(K_CH, K_NEUTRAL),
        Channel::new(ETA, ETA),
        Channel::new(ETA, ETA_PRIME),
    ]
    .into_iter()
    .take(n)
    .collect()
}

fn poles(rows: &[(&str, Float, &[Float])]) -> Vec<Resonance> {
    rows.iter().map(|&(name, mass, g)| Resonance::new(name, mass, g.to_vec())).collect()
}

/// f0 wave: J = 0, five channels, five poles, Adler zero.
pub fn f0_config() -> KMatrixResult<WaveConfig> {
    let resonances = poles(&[
        ("f0(500)", 0.51461, &[0.74987, 0.06401, -0.23417, 0.01570, -0.14242]),
        ("f0(980)", 0.90630, &[-0.01257, 0.00204, -0.01032, 0.26700, 0.22780]),
        ("f0(1370)", 1.23089, &[0.02736, 0.77413, 0.72283, 0.09214, 0.15981]),
        ("f0(1500)", 1.46104, &[-0.15102, 0.50999, 0.11934, 0.02742, 0.16272]),
        ("f0(1710)", 1.69611, &[0.36103, 0.13112, 0.36792, -0.04025, -0.17397]),
    ]);
    #[rustfmt::skip]
    let background = DMatrix::from_row_slice(5, 5, &[
        0.03728, 0.0, -0.01398, -0.02203, 0.01397,
        0.0, 0.0, 0.0, 0.0, 0.0,
        -0.01398, 0.0, 0.02349, 0.03101, -0.04003,
        -0.02203, 0.0, 0.03101, -0.13769, -0.06722,
        0.01397, 0.0, -0.04003, -0.06722, -0.28401,
    ]);
    WaveConfig::new(0, f_channels(5), resonances, background, F_OUTPUT_CHANNEL, Some(F0_ADLER_ZERO))
}

/// f2 wave: J = 2, the first four f0 channels, four poles.
pub fn f2_config() -> KMatrixResult<WaveConfig> {
    let resonances = poles(&[
        ("f2(1270)", 1.15299, &[0.40033, 0.01820, -0.06709, -0.49924]),
        ("f2(1525)", 1.48359, &[0.15479, 0.17300, 0.22941, 0.19295]),
        ("f2(1810)", 1.72923, &[-0.08900, 0.32393, -0.43133, 0.27975]),
        ("f2(1950)", 1.96700, &[-0.00113, 0.15256, 0.23721, -0.03987]),
    ]);
    #[rustfmt::skip]
    let background = DMatrix::from_row_slice(4, 4, &[
        -0.04319, 0.0, 0.00984, 0.01028,
        0.0, 0.0, 0.0, 0.0,
        0.00984, 0.0, -0.07344, 0.05533,
        0.01028, 0.0, 0.05533, -0.05183,
    ]);
    WaveConfig::new(2, f_channels(4), resonances, background, F_OUTPUT_CHANNEL, None)
}

/// a0 wave: J = 0, ηπ and KK̄, two poles, no background.
pub fn a0_config() -> KMatrixResult<WaveConfig> {
    let channels = vec![Channel::new(PI0, ETA), Channel::new(K_CH, K_NEUTRAL)];
    let resonances = poles(&[
        ("a0(980)", 0.95395, &[0.43215, 0.19000]),
        ("a0(1450)", 1.26767, &[-0.28825, 0.43372]),
    ]);
    WaveConfig::new(0, channels, resonances, DMatrix::zeros(2, 2), A_OUTPUT_CHANNEL, None)
}

/// a2 wave: J = 2, ηπ, KK̄ and η′π, two poles.
pub fn a2_config() -> KMatrixResult<WaveConfig> {
    let channels = vec![
        Channel::new(PI0, ETA),
        Channel::new(K_CH, K_NEUTRAL),
        Channel::new(PI0, ETA_PRIME),
    ];
    let resonances = poles(&[
        ("a2(1320)", 1.30080, &[0.30073, 0.21426, -0.09162]),
        ("a2(1700)", 1.75351, &[0.68567, 0.12543, 0.00184]),
    ]);
    #[rustfmt::skip]
    let background = DMatrix::from_row_slice(3, 3, &[
        -0.40184, 0.00033, -0.08707,
        0.00033, -0.21416, -0.06193,
        -0.08707, -0.06193, -0.17435,
    ]);
    WaveConfig::new(2, channels, resonances, background, A_OUTPUT_CHANNEL, None)
}
