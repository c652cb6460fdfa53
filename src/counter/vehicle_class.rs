//! Closed set of countable vehicle classes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Object categories eligible for counting. Anything else a detector
/// reports is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Truck,
    Bus,
    Motorcycle,
}

impl VehicleClass {
    /// Every countable class, in output order.
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Truck,
        VehicleClass::Bus,
        VehicleClass::Motorcycle,
    ];

    /// Map a detector label to a class. Labels are matched exactly.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "car" => Some(Self::Car),
            "truck" => Some(Self::Truck),
            "bus" => Some(Self::Bus),
            "motorcycle" => Some(Self::Motorcycle),
            _ => None,
        }
    }

    /// Get the detector label for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Bus => "bus",
            Self::Motorcycle => "motorcycle",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class totals, every class present from the start.
///
/// Serializes as `{"car": n, "truck": n, "bus": n, "motorcycle": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub car: u64,
    pub truck: u64,
    pub bus: u64,
    pub motorcycle: u64,
}

impl ClassCounts {
    /// Get the total for one class.
    pub fn get(&self, class: VehicleClass) -> u64 {
        match class {
            VehicleClass::Car => self.car,
            VehicleClass::Truck => self.truck,
            VehicleClass::Bus => self.bus,
            VehicleClass::Motorcycle => self.motorcycle,
        }
    }

    /// Add one to a class total.
    pub fn increment(&mut self, class: VehicleClass) {
        let slot = match class {
            VehicleClass::Car => &mut self.car,
            VehicleClass::Truck => &mut self.truck,
            VehicleClass::Bus => &mut self.bus,
            VehicleClass::Motorcycle => &mut self.motorcycle,
        };
        *slot += 1;
    }

    /// Sum over all classes.
    pub fn total(&self) -> u64 {
        VehicleClass::ALL.iter().map(|&c| self.get(c)).sum()
    }
}
