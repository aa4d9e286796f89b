//! Calculation and configuration commands. These are written only; the engine
//! never hands them back to us.

use serde::{Deserialize, Serialize};

use super::{flag, tags};
use crate::xml::Element;

/// Which analyses to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub calc_case: bool,
    pub calc_construction_stage: bool,
    pub calc_imperfection: bool,
    pub calc_comb: bool,
    pub calc_ground_acc: bool,
    pub calc_stability: bool,
    pub calc_frequency: bool,
    pub calc_seismic: bool,
    pub calc_design: bool,
    pub calc_footfall: bool,
}

impl Analysis {
    /// Linear static analysis of load cases and load combinations
    pub fn static_analysis() -> Self {
        Self {
            calc_case: true,
            calc_comb: true,
            ..Default::default()
        }
    }

    pub fn frequency() -> Self {
        Self {
            calc_frequency: true,
            ..Default::default()
        }
    }

    fn to_element(&self) -> Element {
        Element::new("analysis")
            .attr("calcCase", flag(self.calc_case))
            .attr("calcCStage", flag(self.calc_construction_stage))
            .attr("calcImpf", flag(self.calc_imperfection))
            .attr("calcComb", flag(self.calc_comb))
            .attr("calcGMax", flag(self.calc_ground_acc))
            .attr("calcStab", flag(self.calc_stability))
            .attr("calcFreq", flag(self.calc_frequency))
            .attr("calcSeis", flag(self.calc_seismic))
            .attr("calcDesign", flag(self.calc_design))
            .attr("calcFootfall", flag(self.calc_footfall))
    }
}

/// Design calculation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    pub auto_design: bool,
    pub check: bool,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            auto_design: false,
            check: true,
        }
    }
}

impl Design {
    fn to_element(&self) -> Element {
        Element::new("design")
            .attr("autodesign", flag(self.auto_design))
            .attr("check", flag(self.check))
    }
}

/// Run analysis and/or design on the open model
#[derive(Debug, Clone, PartialEq)]
pub struct CmdCalculation {
    pub analysis: Option<Analysis>,
    pub design: Option<Design>,
}

impl CmdCalculation {
    pub const COMMAND: &'static str = "; CXL $MODULE CALC";

    pub fn new(analysis: Option<Analysis>, design: Option<Design>) -> Self {
        Self { analysis, design }
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new(tags::CALCULATION).attr("command", Self::COMMAND);
        if let Some(analysis) = &self.analysis {
            element = element.child(analysis.to_element());
        }
        if let Some(design) = &self.design {
            element = element.child(design.to_element());
        }
        element
    }
}

/// Global meshing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CmdGlobalCfg {
    pub adjust_mesh_to_loads: bool,
    pub auto_regenerate_mesh: bool,
    pub peak_smoothing: bool,
    pub auto_element_size: bool,
    /// Average element size factor, used when `auto_element_size` is off
    pub element_size_factor: f64,
}

impl Default for CmdGlobalCfg {
    fn default() -> Self {
        Self {
            adjust_mesh_to_loads: false,
            auto_regenerate_mesh: true,
            peak_smoothing: false,
            auto_element_size: true,
            element_size_factor: 1.0,
        }
    }
}

impl CmdGlobalCfg {
    pub const COMMAND: &'static str = "$ FEM $CODE GLOBALCFG";

    pub fn to_element(&self) -> Element {
        Element::new(tags::GLOBAL_CFG)
            .attr("command", Self::COMMAND)
            .child(
                Element::new("mesh_general")
                    .attr("fAdjustToLoads", flag(self.adjust_mesh_to_loads))
                    .attr("fAutoRegen", flag(self.auto_regenerate_mesh))
                    .attr("fPeakSmoothing", flag(self.peak_smoothing)),
            )
            .child(
                Element::new("mesh_elements")
                    .attr("fAutoSize", flag(self.auto_element_size))
                    .attr("rSizeFactor", format!("{:.3}", self.element_size_factor)),
            )
    }
}
