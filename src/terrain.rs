//! Terrain classification and per-class properties.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainKind {
    DeepOcean,
    Ocean,
    Beach,
    Desert,
    Savanna,
    Grassland,
    Forest,
    Rainforest,
    Mountain,
    SnowMountain,
    Tundra,
    Swamp,
    Volcano,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 13] = [
        TerrainKind::DeepOcean,
        TerrainKind::Ocean,
        TerrainKind::Beach,
        TerrainKind::Desert,
        TerrainKind::Savanna,
        TerrainKind::Grassland,
        TerrainKind::Forest,
        TerrainKind::Rainforest,
        TerrainKind::Mountain,
        TerrainKind::SnowMountain,
        TerrainKind::Tundra,
        TerrainKind::Swamp,
        TerrainKind::Volcano,
    ];

    pub fn is_water(self) -> bool {
        matches!(self, TerrainKind::DeepOcean | TerrainKind::Ocean)
    }

    /// Display colour for renderers.
    pub fn color(self) -> &'static str {
        match self {
            TerrainKind::DeepOcean => "#000080",
            TerrainKind::Ocean => "#0077be",
            TerrainKind::Beach => "#ffd700",
            TerrainKind::Desert => "#f4a460",
            TerrainKind::Savanna => "#deb887",
            TerrainKind::Grassland => "#90ee90",
            TerrainKind::Forest => "#228b22",
            TerrainKind::Rainforest => "#004d00",
            TerrainKind::Mountain => "#808080",
            TerrainKind::SnowMountain => "#fffafa",
            TerrainKind::Tundra => "#e0ffff",
            TerrainKind::Swamp => "#2f4f4f",
            TerrainKind::Volcano => "#8b0000",
        }
    }

    /// Unperturbed properties of this class.
    pub fn base_properties(self) -> TerrainProperties {
        // (temperature, humidity, fertility, elevation, habitability, water, vegetation)
        let (temperature, humidity, fertility, elevation, habitability, water_level, vegetation) =
            match self {
                TerrainKind::DeepOcean => (10.0, 100.0, 20.0, -1000.0, 0.0, 100.0, 10.0),
                TerrainKind::Ocean => (15.0, 95.0, 30.0, -200.0, 0.0, 90.0, 20.0),
                TerrainKind::Beach => (25.0, 70.0, 40.0, 0.0, 60.0, 30.0, 30.0),
                TerrainKind::Desert => (40.0, 10.0, 5.0, 400.0, 20.0, 5.0, 5.0),
                TerrainKind::Savanna => (30.0, 40.0, 50.0, 500.0, 70.0, 30.0, 50.0),
                TerrainKind::Grassland => (25.0, 60.0, 70.0, 300.0, 90.0, 50.0, 70.0),
                TerrainKind::Forest => (22.0, 80.0, 90.0, 600.0, 80.0, 60.0, 90.0),
                TerrainKind::Rainforest => (28.0, 90.0, 100.0, 400.0, 60.0, 80.0, 100.0),
                TerrainKind::Mountain => (10.0, 40.0, 20.0, 2000.0, 30.0, 20.0, 30.0),
                TerrainKind::SnowMountain => (-10.0, 30.0, 10.0, 3000.0, 10.0, 10.0, 5.0),
                TerrainKind::Tundra => (-5.0, 20.0, 15.0, 100.0, 20.0, 40.0, 20.0),
                TerrainKind::Swamp => (23.0, 95.0, 80.0, 50.0, 30.0, 85.0, 80.0),
                TerrainKind::Volcano => (45.0, 10.0, 60.0, 1500.0, 0.0, 0.0, 0.0),
            };
        TerrainProperties {
            kind: self,
            temperature,
            humidity,
            fertility,
            elevation,
            habitability,
            water_level,
            vegetation_density: vegetation,
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerrainKind::DeepOcean => "deep ocean",
            TerrainKind::Ocean => "ocean",
            TerrainKind::Beach => "beach",
            TerrainKind::Desert => "desert",
            TerrainKind::Savanna => "savanna",
            TerrainKind::Grassland => "grassland",
            TerrainKind::Forest => "forest",
            TerrainKind::Rainforest => "rainforest",
            TerrainKind::Mountain => "mountain",
            TerrainKind::SnowMountain => "snow mountain",
            TerrainKind::Tundra => "tundra",
            TerrainKind::Swamp => "swamp",
            TerrainKind::Volcano => "volcano",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainProperties {
    pub kind: TerrainKind,
    /// Degrees Celsius, [-50, 50].
    pub temperature: f64,
    /// Percent, [0, 100].
    pub humidity: f64,
    pub fertility: f64,
    /// Metres relative to sea level.
    pub elevation: f64,
    pub habitability: f64,
    pub water_level: f64,
    pub vegetation_density: f64,
}

/// Classify a tile from its three noise samples, each in [0, 1).
pub fn classify(elevation: f64, moisture: f64, temperature: f64) -> TerrainKind {
    if elevation < 0.1 {
        return TerrainKind::DeepOcean;
    }
    if elevation < 0.2 {
        return TerrainKind::Ocean;
    }
    if elevation < 0.22 {
        return TerrainKind::Beach;
    }

    if elevation > 0.8 {
        if temperature < 0.3 {
            return TerrainKind::SnowMountain;
        }
        if temperature > 0.8 {
            return TerrainKind::Volcano;
        }
        return TerrainKind::Mountain;
    }

    if temperature < 0.2 {
        TerrainKind::Tundra
    } else if moisture < 0.2 {
        TerrainKind::Desert
    } else if moisture < 0.4 {
        TerrainKind::Savanna
    } else if moisture > 0.8 && temperature > 0.6 {
        TerrainKind::Rainforest
    } else if moisture > 0.8 {
        TerrainKind::Swamp
    } else if moisture > 0.6 {
        TerrainKind::Forest
    } else {
        TerrainKind::Grassland
    }
}

/// Base properties of `kind` shifted by the local samples.
pub fn perturb(kind: TerrainKind, moisture: f64, temperature: f64) -> TerrainProperties {
    let mut props = kind.base_properties();
    props.temperature = (props.temperature + ((temperature - 0.5) * 10.0).round()).clamp(-50.0, 50.0);
    props.humidity = (props.humidity + ((moisture - 0.5) * 20.0).round()).clamp(0.0, 100.0);
    props
}

/// Hash-like value noise in [0, 1).
pub fn noise(x: f64, y: f64, seed: u64) -> f64 {
    let shift = (seed % 100_003) as f64 * 0.137;
    let value = ((x + shift) * 12.9898 + (y - shift) * 78.233).sin() * 43_758.545_312_3;
    let fraction = value - value.floor();
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_bands() {
        assert_eq!(classify(0.05, 0.5, 0.5), TerrainKind::DeepOcean);
        assert_eq!(classify(0.15, 0.5, 0.5), TerrainKind::Ocean);
        assert_eq!(classify(0.21, 0.5, 0.5), TerrainKind::Beach);
    }

    #[test]
    fn highlands() {
        assert_eq!(classify(0.9, 0.5, 0.1), TerrainKind::SnowMountain);
        assert_eq!(classify(0.9, 0.5, 0.9), TerrainKind::Volcano);
        assert_eq!(classify(0.9, 0.5, 0.5), TerrainKind::Mountain);
    }

    #[test]
    fn lowland_priority() {
        assert_eq!(classify(0.5, 0.1, 0.1), TerrainKind::Tundra);
        assert_eq!(classify(0.5, 0.1, 0.5), TerrainKind::Desert);
        assert_eq!(classify(0.5, 0.3, 0.5), TerrainKind::Savanna);
        assert_eq!(classify(0.5, 0.9, 0.7), TerrainKind::Rainforest);
        assert_eq!(classify(0.5, 0.9, 0.6), TerrainKind::Swamp);
        assert_eq!(classify(0.5, 0.9, 0.3), TerrainKind::Swamp);
        assert_eq!(classify(0.5, 0.7, 0.5), TerrainKind::Forest);
        assert_eq!(classify(0.5, 0.5, 0.5), TerrainKind::Grassland);
    }

    #[test]
    fn perturbation_is_bounded() {
        let hot = perturb(TerrainKind::Volcano, 0.0, 0.999);
        assert_eq!(hot.temperature, 50.0);
        let wet = perturb(TerrainKind::DeepOcean, 0.999, 0.5);
        assert_eq!(wet.humidity, 100.0);
        let neutral = perturb(TerrainKind::Grassland, 0.5, 0.5);
        assert_eq!(neutral, TerrainKind::Grassland.base_properties());
    }

    #[test]
    fn every_kind_is_listed_once() {
        let distinct: std::collections::BTreeSet<_> = TerrainKind::ALL.iter().collect();
        assert_eq!(distinct.len(), TerrainKind::ALL.len());

        let water: Vec<_> = TerrainKind::ALL.into_iter().filter(|k| k.is_water()).collect();
        assert_eq!(water, vec![TerrainKind::DeepOcean, TerrainKind::Ocean]);

        for elevation in [0.05, 0.15, 0.21, 0.5, 0.9] {
            for moisture in [0.1, 0.5, 0.9] {
                for temperature in [0.1, 0.5, 0.9] {
                    let kind = classify(elevation, moisture, temperature);
                    assert!(TerrainKind::ALL.contains(&kind));
                    assert_eq!(kind.is_water(), elevation < 0.2);
                }
            }
        }
    }

    #[test]
    fn noise_is_deterministic_and_unit() {
        for x in 0..20 {
            for y in 0..20 {
                let a = noise(x as f64, y as f64, 42);
                assert_eq!(a, noise(x as f64, y as f64, 42));
                assert!((0.0..1.0).contains(&a));
            }
        }
    }
}
