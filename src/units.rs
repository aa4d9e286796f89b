//! Result units and output location options written into list-generation
//! batch files

use serde::{Deserialize, Serialize};

use crate::error::{FdError, FdResult};
use crate::xml::Element;

/// A unit with a fixed symbol on the wire
pub trait UnitSymbol: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn symbol(self) -> &'static str;

    fn from_symbol(raw: &str) -> FdResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.symbol() == raw)
            .ok_or_else(|| FdError::SchemaViolation(format!("unknown unit '{}'", raw)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    M,
    Cm,
    Mm,
    Ft,
    Inch,
}

impl UnitSymbol for LengthUnit {
    const ALL: &'static [Self] = &[Self::M, Self::Cm, Self::Mm, Self::Ft, Self::Inch];

    fn symbol(self) -> &'static str {
        match self {
            LengthUnit::M => "m",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::Ft => "ft",
            LengthUnit::Inch => "inch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    Rad,
    Deg,
}

impl UnitSymbol for AngleUnit {
    const ALL: &'static [Self] = &[Self::Rad, Self::Deg];

    fn symbol(self) -> &'static str {
        match self {
            AngleUnit::Rad => "rad",
            AngleUnit::Deg => "deg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceUnit {
    N,
    KN,
    MN,
    Lbf,
    Kips,
}

impl UnitSymbol for ForceUnit {
    const ALL: &'static [Self] = &[Self::N, Self::KN, Self::MN, Self::Lbf, Self::Kips];

    fn symbol(self) -> &'static str {
        match self {
            ForceUnit::N => "N",
            ForceUnit::KN => "kN",
            ForceUnit::MN => "MN",
            ForceUnit::Lbf => "lbf",
            ForceUnit::Kips => "kips",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassUnit {
    Kg,
    T,
    Lb,
}

impl UnitSymbol for MassUnit {
    const ALL: &'static [Self] = &[Self::Kg, Self::T, Self::Lb];

    fn symbol(self) -> &'static str {
        match self {
            MassUnit::Kg => "kg",
            MassUnit::T => "t",
            MassUnit::Lb => "lb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressUnit {
    Pa,
    KPa,
    MPa,
    GPa,
}

impl UnitSymbol for StressUnit {
    const ALL: &'static [Self] = &[Self::Pa, Self::KPa, Self::MPa, Self::GPa];

    fn symbol(self) -> &'static str {
        match self {
            StressUnit::Pa => "Pa",
            StressUnit::KPa => "kPa",
            StressUnit::MPa => "MPa",
            StressUnit::GPa => "GPa",
        }
    }
}

/// Units the engine should use when listing results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitResults {
    pub length: LengthUnit,
    pub angle: AngleUnit,
    pub sectional_data: LengthUnit,
    pub force: ForceUnit,
    pub mass: MassUnit,
    pub displacement: LengthUnit,
    pub stress: StressUnit,
}

impl Default for UnitResults {
    fn default() -> Self {
        Self {
            length: LengthUnit::M,
            angle: AngleUnit::Deg,
            sectional_data: LengthUnit::M,
            force: ForceUnit::KN,
            mass: MassUnit::Kg,
            displacement: LengthUnit::M,
            stress: StressUnit::Pa,
        }
    }
}

impl UnitResults {
    pub const TAG: &'static str = "units";

    pub fn to_element(&self) -> Element {
        Element::new(Self::TAG)
            .attr("length", self.length.symbol())
            .attr("angle", self.angle.symbol())
            .attr("sectionaldata", self.sectional_data.symbol())
            .attr("force", self.force.symbol())
            .attr("mass", self.mass.symbol())
            .attr("displacement", self.displacement.symbol())
            .attr("stress", self.stress.symbol())
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        element.expect_name(Self::TAG)?;
        Ok(Self {
            length: LengthUnit::from_symbol(element.require_attr("length")?)?,
            angle: AngleUnit::from_symbol(element.require_attr("angle")?)?,
            sectional_data: LengthUnit::from_symbol(element.require_attr("sectionaldata")?)?,
            force: ForceUnit::from_symbol(element.require_attr("force")?)?,
            mass: MassUnit::from_symbol(element.require_attr("mass")?)?,
            displacement: LengthUnit::from_symbol(element.require_attr("displacement")?)?,
            stress: StressUnit::from_symbol(element.require_attr("stress")?)?,
        })
    }
}

/// Where along bars results are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarResultPoints {
    OnlyNodes,
    ByStep,
}

/// Where on shell elements results are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceResultPoints {
    Center,
    Vertices,
}

/// Output location options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub bar: BarResultPoints,
    /// Step length along bars in metres, used with `BarResultPoints::ByStep`
    pub step: f64,
    pub surface: SurfaceResultPoints,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bar: BarResultPoints::ByStep,
            step: 0.5,
            surface: SurfaceResultPoints::Vertices,
        }
    }
}

impl Options {
    pub const TAG: &'static str = "options";

    pub fn to_element(&self) -> Element {
        let bar = match self.bar {
            BarResultPoints::OnlyNodes => "0",
            BarResultPoints::ByStep => "1",
        };
        let surface = match self.surface {
            SurfaceResultPoints::Center => "0",
            SurfaceResultPoints::Vertices => "1",
        };
        Element::new(Self::TAG)
            .attr("bar", bar)
            .attr("step", format!("{:.3}", self.step))
            .attr("surface", surface)
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        element.expect_name(Self::TAG)?;
        let bar = match element.require_attr("bar")? {
            "0" => BarResultPoints::OnlyNodes,
            "1" => BarResultPoints::ByStep,
            other => {
                return Err(FdError::SchemaViolation(format!("invalid bar option '{}'", other)))
            }
        };
        let surface = match element.require_attr("surface")? {
            "0" => SurfaceResultPoints::Center,
            "1" => SurfaceResultPoints::Vertices,
            other => {
                return Err(FdError::SchemaViolation(format!(
                    "invalid surface option '{}'",
                    other
                )))
            }
        };
        let raw_step = element.require_attr("step")?;
        let step = raw_step
            .parse::<f64>()
            .map_err(|_| FdError::SchemaViolation(format!("invalid step '{}'", raw_step)))?;
        Ok(Self { bar, step, surface })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_units() {
        let element = UnitResults::default().to_element();
        assert_eq!(element.get_attr("length"), Some("m"));
        assert_eq!(element.get_attr("angle"), Some("deg"));
        assert_eq!(element.get_attr("force"), Some("kN"));
        assert_eq!(element.get_attr("stress"), Some("Pa"));
        assert_eq!(UnitResults::from_element(&element).unwrap(), UnitResults::default());
    }

    #[test]
    fn test_unknown_unit_symbol() {
        assert!(ForceUnit::from_symbol("tonnes").is_err());
        assert_eq!(ForceUnit::from_symbol("MN").unwrap(), ForceUnit::MN);
    }

    #[test]
    fn test_options_wire_form() {
        let options = Options {
            bar: BarResultPoints::OnlyNodes,
            step: 0.25,
            surface: SurfaceResultPoints::Center,
        };
        let element = options.to_element();
        assert_eq!(element.get_attr("bar"), Some("0"));
        assert_eq!(element.get_attr("step"), Some("0.250"));
        assert_eq!(Options::from_element(&element).unwrap(), options);
    }
}
