//! Surface preparation (stripping, deburring, cleaning a contact)

use serde::Serialize;
use skillbench_spatial::Point3D;

use crate::validator::{Rejection, Validator, Verdict};

/// A spot that needs preparing before work can continue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepTarget {
    name: String,
    work_point: Point3D,
    prepared: bool,
    #[serde(skip)]
    initially_prepared: bool,
}

impl PrepTarget {
    pub fn new(name: impl Into<String>, work_point: Point3D) -> Self {
        Self {
            name: name.into(),
            work_point,
            prepared: false,
            initially_prepared: false,
        }
    }

    pub fn with_prepared(mut self, prepared: bool) -> Self {
        self.prepared = prepared;
        self.initially_prepared = prepared;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn work_point(&self) -> Point3D {
        self.work_point
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Back to the state it was created in
    pub(crate) fn reset(&mut self) {
        self.prepared = self.initially_prepared;
    }
}

/// Where the tool's tip is and how close it must get
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePrepTool {
    pub tip: Point3D,
    pub activation_distance: f32,
}

/// Tip must be within the activation distance of an unprepared target
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfacePrep;

impl Validator<SurfacePrepTool, PrepTarget> for SurfacePrep {
    fn evaluate(&self, tool: &SurfacePrepTool, target: &PrepTarget) -> Verdict {
        let distance = tool.tip.distance(&target.work_point);
        if distance > tool.activation_distance {
            return Verdict::Rejected(Rejection::TooFar {
                distance,
                limit: tool.activation_distance,
            });
        }
        if target.prepared {
            return Verdict::Rejected(Rejection::AlreadyDone {
                target: target.name.clone(),
            });
        }
        Verdict::Approved
    }
}

impl SurfacePrep {
    /// Validate and, when approved, mark the target prepared
    pub fn apply(&self, tool: &SurfacePrepTool, target: &mut PrepTarget) -> Verdict {
        let verdict = self.evaluate(tool, target);
        if verdict.is_approved() {
            target.prepared = true;
        }
        verdict
    }
}
