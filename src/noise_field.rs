//! Multi-octave coherent noise sampled on the unit sphere.

use glam::DVec3;
use noise::{NoiseFn, Perlin};

use crate::seeds::WorldSeeds;

/// Octave weights, each octave at double the previous frequency.
const OCTAVES: [f64; 4] = [0.5, 0.25, 0.15, 0.1];

/// Independent noise channels. Each is a fixed shift of the sample domain so
/// the fields they drive do not correlate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Elevation,
    Aridity,
    DeepOceanPrimary,
    DeepOceanSecondary,
    DeepIslandPrimary,
    DeepIslandSecondary,
}

impl Channel {
    fn shift(self) -> f64 {
        match self {
            Channel::Elevation => 0.0,
            Channel::Aridity => 100.0,
            Channel::DeepOceanPrimary => 200.0,
            Channel::DeepIslandPrimary => 300.0,
            Channel::DeepOceanSecondary => 400.0,
            Channel::DeepIslandSecondary => 500.0,
        }
    }

    /// Sampling frequency for single-octave band tests.
    fn band_frequency(self) -> f64 {
        match self {
            Channel::DeepOceanPrimary | Channel::DeepOceanSecondary => 0.5,
            _ => 1.0,
        }
    }
}

/// Seeded Perlin noise with a per-world domain offset.
pub struct NoiseField {
    perlin: Perlin,
    offset: f64,
}

impl NoiseField {
    pub fn new(seeds: &WorldSeeds) -> Self {
        Self {
            perlin: Perlin::new(seeds.noise as u32),
            offset: seeds.noise_offset(),
        }
    }

    /// Raw single-octave sample at frequency 1.
    pub fn sample(&self, channel: Channel, pos: DVec3) -> f64 {
        self.sample_at(channel, pos, 1.0)
    }

    /// Single-octave sample at the channel's band frequency.
    pub fn band(&self, channel: Channel, pos: DVec3) -> f64 {
        self.sample_at(channel, pos, channel.band_frequency())
    }

    /// Sum of the weighted octaves, roughly in [-1, 1].
    pub fn fractal(&self, channel: Channel, pos: DVec3) -> f64 {
        let mut frequency = 1.0;
        let mut total = 0.0;
        for weight in OCTAVES {
            total += self.sample_at(channel, pos, frequency) * weight;
            frequency *= 2.0;
        }
        total
    }

    fn sample_at(&self, channel: Channel, pos: DVec3, frequency: f64) -> f64 {
        let p = pos * frequency;
        self.perlin
            .get([p.x + self.offset + channel.shift(), p.y, p.z])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_sampling() {
        let seeds = WorldSeeds::from_master(42);
        let a = NoiseField::new(&seeds);
        let b = NoiseField::new(&seeds);
        let pos = DVec3::new(0.3, -0.4, 0.866).normalize();
        assert_eq!(a.fractal(Channel::Elevation, pos), b.fractal(Channel::Elevation, pos));
    }

    #[test]
    fn test_fractal_bounded() {
        let field = NoiseField::new(&WorldSeeds::from_master(3));
        for i in 0..50 {
            let t = i as f64 * 0.37;
            let pos = DVec3::new(t.cos(), t.sin(), (t * 0.5).sin()).normalize();
            let v = field.fractal(Channel::Aridity, pos);
            assert!(v.abs() <= 1.5, "fractal noise out of range: {}", v);
        }
    }

    #[test]
    fn test_channels_differ() {
        let field = NoiseField::new(&WorldSeeds::from_master(9));
        let pos = DVec3::new(0.57, 0.57, 0.59).normalize();
        assert_ne!(
            field.sample(Channel::Elevation, pos),
            field.sample(Channel::Aridity, pos)
        );
    }
}
