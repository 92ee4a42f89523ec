use std::fmt;

use serde::{Deserialize, Serialize};

pub const VITAL_MAX: f64 = 100.0;
pub const HUNGER_RATE: f64 = 0.1;
pub const REST_RECOVERY: f64 = 0.5;
pub const STARVATION_THRESHOLD: f64 = 80.0;
pub const STARVATION_DAMAGE: f64 = 0.1;
pub const HEALTH_RECOVERY: f64 = 0.05;

const EXHAUSTED_BELOW: f64 = 10.0;
const HUNGRY_ABOVE: f64 = 80.0;
const WEAK_BELOW: f64 = 30.0;
const TIRED_BELOW: f64 = 30.0;

/// Health, energy and hunger, each held in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    health: f64,
    energy: f64,
    hunger: f64,
}

impl VitalSigns {
    pub fn new(health: f64, energy: f64, hunger: f64) -> Self {
        Self {
            health: clamp_vital(health),
            energy: clamp_vital(energy),
            hunger: clamp_vital(hunger),
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn adjust_health(&mut self, delta: f64) {
        self.health = clamp_vital(self.health + delta);
    }

    pub fn adjust_energy(&mut self, delta: f64) {
        self.energy = clamp_vital(self.energy + delta);
    }

    pub fn adjust_hunger(&mut self, delta: f64) {
        self.hunger = clamp_vital(self.hunger + delta);
    }

    /// Per-tick metabolism.
    pub fn update(&mut self, resting: bool) {
        self.adjust_hunger(HUNGER_RATE);
        if resting {
            self.adjust_energy(REST_RECOVERY);
        }
        if self.hunger > STARVATION_THRESHOLD {
            self.adjust_health(-STARVATION_DAMAGE);
        } else {
            self.adjust_health(HEALTH_RECOVERY);
        }
    }

    pub fn status(&self) -> VitalStatus {
        if self.energy < EXHAUSTED_BELOW {
            VitalStatus::Exhausted
        } else if self.hunger > HUNGRY_ABOVE {
            VitalStatus::Hungry
        } else if self.health < WEAK_BELOW {
            VitalStatus::Weak
        } else if self.energy < TIRED_BELOW {
            VitalStatus::Tired
        } else {
            VitalStatus::Normal
        }
    }
}

impl Default for VitalSigns {
    fn default() -> Self {
        Self::new(VITAL_MAX, VITAL_MAX, 0.0)
    }
}

fn clamp_vital(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, VITAL_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
    Exhausted,
    Hungry,
    Weak,
    Tired,
    Normal,
}

impl VitalStatus {
    pub fn label(self) -> &'static str {
        match self {
            VitalStatus::Exhausted => "exhausted",
            VitalStatus::Hungry => "hungry",
            VitalStatus::Weak => "weak",
            VitalStatus::Tired => "tired",
            VitalStatus::Normal => "normal",
        }
    }
}

impl fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_clamps() {
        let v = VitalSigns::new(150.0, -4.0, f64::NAN);
        assert_eq!((v.health(), v.energy(), v.hunger()), (100.0, 0.0, 0.0));
    }

    #[test]
    fn starving_loses_health() {
        let mut v = VitalSigns::new(50.0, 50.0, 90.0);
        v.update(false);
        assert!(v.health() < 50.0);
        assert!((v.hunger() - 90.1).abs() < 1e-9);
    }

    #[test]
    fn fed_recovers_health() {
        let mut v = VitalSigns::new(50.0, 50.0, 10.0);
        v.update(false);
        assert!(v.health() > 50.0);
    }

    #[test]
    fn resting_recovers_energy() {
        let mut v = VitalSigns::new(100.0, 40.0, 0.0);
        v.update(true);
        assert_eq!(v.energy(), 40.5);
        v.update(false);
        assert_eq!(v.energy(), 40.5);
    }

    #[test]
    fn hunger_caps_at_max() {
        let mut v = VitalSigns::new(100.0, 100.0, 99.95);
        v.update(false);
        assert_eq!(v.hunger(), 100.0);
    }

    #[test]
    fn status_thresholds_in_priority_order() {
        assert_eq!(VitalSigns::new(10.0, 5.0, 95.0).status(), VitalStatus::Exhausted);
        assert_eq!(VitalSigns::new(10.0, 50.0, 95.0).status(), VitalStatus::Hungry);
        assert_eq!(VitalSigns::new(10.0, 20.0, 10.0).status(), VitalStatus::Weak);
        assert_eq!(VitalSigns::new(80.0, 20.0, 10.0).status(), VitalStatus::Tired);
        assert_eq!(VitalSigns::default().status(), VitalStatus::Normal);
        assert_eq!(VitalStatus::Hungry.to_string(), "hungry");
    }
}
