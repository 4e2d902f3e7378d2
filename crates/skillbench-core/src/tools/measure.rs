//! Tape measure

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skillbench_spatial::Point3D;

use crate::validator::{Rejection, Validator, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Millimeters,
    Centimeters,
    #[default]
    Meters,
    Inches,
    Feet,
}

impl LengthUnit {
    pub fn meters_per_unit(&self) -> f32 {
        match self {
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Centimeters => 0.01,
            LengthUnit::Meters => 1.0,
            LengthUnit::Inches => 0.0254,
            LengthUnit::Feet => 0.3048,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
        }
    }

    pub fn from_meters(&self, meters: f32) -> f32 {
        meters / self.meters_per_unit()
    }

    pub fn to_meters(&self, value: f32) -> f32 {
        value * self.meters_per_unit()
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" => Ok(LengthUnit::Millimeters),
            "cm" | "centimeters" => Ok(LengthUnit::Centimeters),
            "m" | "meters" => Ok(LengthUnit::Meters),
            "in" | "inches" => Ok(LengthUnit::Inches),
            "ft" | "feet" => Ok(LengthUnit::Feet),
            other => Err(format!("unknown length unit '{other}'")),
        }
    }
}

/// A distance reading, stored in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Measurement {
    meters: f32,
}

impl Measurement {
    pub fn from_meters(meters: f32) -> Self {
        Self { meters }
    }

    pub fn meters(&self) -> f32 {
        self.meters
    }

    pub fn in_unit(&self, unit: LengthUnit) -> f32 {
        unit.from_meters(self.meters)
    }

    /// e.g. `"12.50in"`
    pub fn display(&self, unit: LengthUnit) -> String {
        format!("{:.2}{}", self.in_unit(unit), unit)
    }
}

/// Hook one end somewhere, read the distance to wherever the body is
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasuringTape {
    hook: Option<Point3D>,
}

impl MeasuringTape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hook_to(&mut self, point: Point3D) {
        self.hook = Some(point);
    }

    pub fn unhook(&mut self) {
        self.hook = None;
    }

    pub fn hook(&self) -> Option<Point3D> {
        self.hook
    }

    /// Distance from the hook to `body`; `None` while unhooked
    pub fn read(&self, body: Point3D) -> Option<Measurement> {
        self.hook.map(|hook| Measurement::from_meters(hook.distance(&body)))
    }
}

/// Expected length with a symmetric tolerance, in `unit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceCheck {
    pub expected: f32,
    pub tolerance: f32,
    pub unit: LengthUnit,
}

impl ToleranceCheck {
    pub fn new(expected: f32, tolerance: f32, unit: LengthUnit) -> Self {
        Self {
            expected,
            tolerance,
            unit,
        }
    }
}

/// Reading must land within a [`ToleranceCheck`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WithinTolerance;

impl Validator<Measurement, ToleranceCheck> for WithinTolerance {
    fn evaluate(&self, subject: &Measurement, target: &ToleranceCheck) -> Verdict {
        let measured = subject.in_unit(target.unit);
        if (measured - target.expected).abs() <= target.tolerance {
            Verdict::Approved
        } else {
            Verdict::Rejected(Rejection::OutOfTolerance {
                measured,
                expected: target.expected,
                tolerance: target.tolerance,
                unit: target.unit,
            })
        }
    }
}

impl ToleranceCheck {
    pub fn check(&self, measurement: &Measurement) -> Verdict {
        WithinTolerance.evaluate(measurement, self)
    }
}
